//! Unified diff rendering of an edit script.

use super::myers::{diff_lines, split_lines, Edit, EditKind};

/// Unchanged lines shown around each hunk unless configured otherwise.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Renders the difference between two versions of one file.
#[derive(Debug, Clone)]
pub struct UnifiedDiff<'a> {
  path:          &'a str,
  context_lines: usize
}

impl<'a> UnifiedDiff<'a> {
  pub fn new(path: &'a str) -> Self {
    Self { path, context_lines: DEFAULT_CONTEXT_LINES }
  }

  pub fn context_lines(mut self, context_lines: usize) -> Self {
    self.context_lines = context_lines;
    self
  }

  /// Returns the unified diff, or an empty string when the texts have the
  /// same lines.
  pub fn render(&self, original: &str, formatted: &str) -> String {
    let a = split_lines(original);
    let b = split_lines(formatted);
    let edits = diff_lines(&a, &b);

    let hunks = group_hunks(&edits, self.context_lines);
    if hunks.is_empty() {
      return String::new();
    }

    let mut out = format!("--- a/{path}\n+++ b/{path}\n", path = self.path);

    for (start, end) in hunks {
      write_hunk(&mut out, &edits, start, end);
    }

    out
  }
}

/// Renders a unified diff with the default amount of context.
pub fn unified_diff(path: &str, original: &str, formatted: &str) -> String {
  UnifiedDiff::new(path).render(original, formatted)
}

/// Groups change positions into hunks and widens each by the context.
///
/// Returns inclusive `(start, end)` index pairs into `edits`.
fn group_hunks(edits: &[Edit<'_>], context: usize) -> Vec<(usize, usize)> {
  let changes: Vec<usize> = edits
    .iter()
    .enumerate()
    .filter(|(_, edit)| edit.is_change())
    .map(|(i, _)| i)
    .collect();

  let Some((&head, rest)) = changes.split_first() else {
    return Vec::new();
  };

  let mut groups = Vec::new();
  let (mut first, mut last) = (head, head);
  for &i in rest {
    if i - last <= context.saturating_mul(2).saturating_add(1) {
      last = i;
    } else {
      groups.push((first, last));
      first = i;
      last = i;
    }
  }
  groups.push((first, last));

  let end_of_script = edits.len() - 1;
  groups
    .into_iter()
    .map(|(first, last)| (first.saturating_sub(context), last.saturating_add(context).min(end_of_script)))
    .collect()
}

/// 1-based start line of a hunk side; an empty side names the line before it.
fn hunk_start(lines_before: usize, count: usize) -> usize {
  if count == 0 {
    lines_before
  } else {
    lines_before + 1
  }
}

fn write_hunk(out: &mut String, edits: &[Edit<'_>], start: usize, end: usize) {
  let on_orig = |e: &&Edit<'_>| e.kind != EditKind::Insert;
  let on_new = |e: &&Edit<'_>| e.kind != EditKind::Delete;

  let orig_before = edits[..start].iter().filter(on_orig).count();
  let new_before = edits[..start].iter().filter(on_new).count();
  let orig_count = edits[start..=end].iter().filter(on_orig).count();
  let new_count = edits[start..=end].iter().filter(on_new).count();

  out.push_str(&format!(
    "@@ -{},{} +{},{} @@\n",
    hunk_start(orig_before, orig_count),
    orig_count,
    hunk_start(new_before, new_count),
    new_count
  ));

  for edit in &edits[start..=end] {
    let prefix = match edit.kind {
      EditKind::Equal => ' ',
      EditKind::Delete => '-',
      EditKind::Insert => '+'
    };
    out.push(prefix);
    out.push_str(edit.line);
    out.push('\n');
  }
}
