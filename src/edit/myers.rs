//! Myers' O(ND) shortest edit script over lines.

/// What an edit script entry does to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
  Equal,
  Delete,
  Insert
}

/// One step of an edit script.
///
/// `orig_index` and `new_index` are 0-based positions in the two sequences.
/// For a deletion `new_index` is where the line would have been in the new
/// sequence, for an insertion `orig_index` is the matching position in the
/// original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit<'a> {
  pub kind:       EditKind,
  pub line:       &'a str,
  pub orig_index: usize,
  pub new_index:  usize
}

impl Edit<'_> {
  pub fn is_change(&self) -> bool {
    self.kind != EditKind::Equal
  }
}

/// Splits text into lines on `\n`, without a phantom line after a final newline.
pub fn split_lines(text: &str) -> Vec<&str> {
  let mut lines: Vec<&str> = text.split('\n').collect();
  if text.ends_with('\n') || text.is_empty() {
    lines.pop();
  }
  lines
}

/// Computes a minimal edit script turning `a` into `b`.
///
/// Deletions are preferred over insertions when both reach equally far, so a
/// replaced line comes out as `-old` followed by `+new`.
pub fn diff_lines<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<Edit<'a>> {
  let n = a.len() as isize;
  let m = b.len() as isize;
  let max = n + m;

  if max == 0 {
    return Vec::new();
  }

  let offset = max;
  let index = |k: isize| (k + offset) as usize;

  // v[k] is the furthest x reached on diagonal k = x - y. trace[d] holds
  // diagonals -d..=d+1 of v as it stood before round d; backtracking never
  // looks further out.
  let mut v = vec![0isize; 2 * max as usize + 2];
  let mut trace: Vec<Vec<isize>> = Vec::new();

  'search: for d in 0..=max {
    trace.push(v[index(-d)..=index(d + 1)].to_vec());

    for k in (-d..=d).step_by(2) {
      let mut x = if k == -d || (k != d && v[index(k - 1)] < v[index(k + 1)]) {
        v[index(k + 1)]
      } else {
        v[index(k - 1)] + 1
      };
      let mut y = x - k;

      while x < n && y < m && a[x as usize] == b[y as usize] {
        x += 1;
        y += 1;
      }

      v[index(k)] = x;

      if x >= n && y >= m {
        break 'search;
      }
    }
  }

  backtrack(a, b, &trace)
}

fn backtrack<'a>(a: &[&'a str], b: &[&'a str], trace: &[Vec<isize>]) -> Vec<Edit<'a>> {
  let mut x = a.len() as isize;
  let mut y = b.len() as isize;
  let mut edits = Vec::with_capacity(a.len().max(b.len()));

  for (d, v) in trace.iter().enumerate().rev() {
    let d = d as isize;
    let at = |k: isize| v[(k + d) as usize];
    let k = x - y;

    let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
      k + 1
    } else {
      k - 1
    };
    let prev_x = at(prev_k);
    let prev_y = prev_x - prev_k;

    while x > prev_x && y > prev_y {
      x -= 1;
      y -= 1;
      edits.push(Edit { kind: EditKind::Equal, line: a[x as usize], orig_index: x as usize, new_index: y as usize });
    }

    if d > 0 {
      if x == prev_x {
        edits.push(Edit {
          kind:       EditKind::Insert,
          line:       b[prev_y as usize],
          orig_index: prev_x as usize,
          new_index:  prev_y as usize
        });
      } else {
        edits.push(Edit {
          kind:       EditKind::Delete,
          line:       a[prev_x as usize],
          orig_index: prev_x as usize,
          new_index:  prev_y as usize
        });
      }
    }

    x = prev_x;
    y = prev_y;
  }

  edits.reverse();
  edits
}
