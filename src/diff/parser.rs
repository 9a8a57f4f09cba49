//! Zero-context unified diff parsing.
//!
//! Only two productions matter: `+++ <prefix>/<path>` file headers and
//! `@@ -a[,b] +c[,d] @@` hunk headers. Everything else is skipped.

use crate::range::{DiffRange, FileDiff};

/// Extracts the path from a `+++ ` file header line.
///
/// Returns `Some(None)` for `+++ /dev/null` (the file no longer exists),
/// `None` when the line is not a file header at all.
fn parse_file_header(line: &str) -> Option<Option<String>> {
  let rest = line.strip_prefix("+++ ")?;

  if rest.trim_end() == "/dev/null" {
    return Some(None);
  }

  let (prefix, path) = rest.split_once('/')?;
  if prefix.is_empty() || prefix.contains(char::is_whitespace) || path.is_empty() {
    return None;
  }

  // git appends a tab when the path has trailing whitespace
  let path = path.strip_suffix('\t').unwrap_or(path);
  Some(Some(path.to_string()))
}

/// Parses `<start>[,<count>]`, defaulting the count to 1.
fn parse_hunk_side(side: &str) -> Option<(usize, usize)> {
  match side.split_once(',') {
    Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
    None => Some((side.parse().ok()?, 1))
  }
}

/// Reads the new-side range of a hunk header.
///
/// The range may still be invalid (count or start of zero); callers decide.
fn parse_hunk_header(line: &str) -> Option<DiffRange> {
  let rest = line.strip_prefix("@@ ")?;
  let mut parts = rest.split_whitespace();

  let old = parts.next()?.strip_prefix('-')?;
  let new = parts.next()?.strip_prefix('+')?;
  if parts.next()? != "@@" {
    return None;
  }

  parse_hunk_side(old)?;
  let (start, count) = parse_hunk_side(new)?;
  Some(DiffRange::new(start, count))
}

/// Parse a zero-context unified diff into the changed line ranges per file.
///
/// Files appear in first-seen order, ranges in the order their hunks were
/// listed. Files without a single usable hunk are dropped. Never fails:
/// anything that is not a recognised header is ignored.
pub fn parse_diff(diff_text: &str) -> Vec<FileDiff> {
  let mut files: Vec<FileDiff> = Vec::new();
  let mut current: Option<usize> = None;

  log::debug!("Parsing diff with {} lines", diff_text.lines().count());

  for line in diff_text.split('\n') {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(header) = parse_file_header(line) {
      current = header.map(|path| {
        files.iter().position(|file| file.path == path).unwrap_or_else(|| {
          log::trace!("Found file in diff: {path}");
          files.push(FileDiff { path, ranges: Vec::new() });
          files.len() - 1
        })
      });
      continue;
    }

    if !line.starts_with("@@ ") {
      continue;
    }

    let Some(range) = parse_hunk_header(line) else {
      log::trace!("Skipping malformed hunk header: {line}");
      continue;
    };

    let Some(index) = current else {
      log::trace!("Skipping hunk without a file header: {line}");
      continue;
    };

    if !range.is_valid() {
      log::trace!("Skipping hunk with no new-side lines: {line}");
      continue;
    }

    files[index].ranges.push(range);
  }

  files.retain(|file| !file.ranges.is_empty());
  log::debug!("Parsed {} files from diff", files.len());
  files
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_single_hunk() {
    let diff = "+++ b/test.cs\n@@ -10,5 +20,3 @@\n";
    let files = parse_diff(diff);
    assert_eq!(files, vec![FileDiff {
      path:   "test.cs".to_string(),
      ranges: vec![DiffRange::new(20, 3)]
    }]);
  }

  #[test]
  fn test_missing_count_means_one_line() {
    let files = parse_diff("+++ b/test.cs\n@@ -15 +25 @@\n");
    assert_eq!(files[0].ranges, vec![DiffRange::new(25, 1)]);
  }

  #[test]
  fn test_empty_input() {
    assert!(parse_diff("").is_empty());
    assert!(parse_diff("\n\n").is_empty());
  }

  #[test]
  fn test_file_without_hunks_is_dropped() {
    let diff = "+++ b/a.cs\n+++ b/b.cs\n@@ -1 +1 @@\n";
    let files = parse_diff(diff);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "b.cs");
  }

  #[test]
  fn test_pure_deletions_are_skipped() {
    let diff = "+++ b/a.cs\n@@ -3,2 +2,0 @@\n@@ -1 +0,0 @@\n";
    assert!(parse_diff(diff).is_empty());
  }

  #[test]
  fn test_hunk_before_any_file_is_ignored() {
    let diff = "@@ -1 +1,4 @@\n+++ b/a.cs\n@@ -8 +9,2 @@\n";
    let files = parse_diff(diff);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].ranges, vec![DiffRange::new(9, 2)]);
  }

  #[test]
  fn test_path_with_spaces() {
    let diff = "+++ b/My Project/Some File.cs\n@@ -1 +1 @@\n";
    assert_eq!(parse_diff(diff)[0].path, "My Project/Some File.cs");
  }

  #[test]
  fn test_crlf_parses_identically() {
    let lf = "diff --git a/x.cs b/x.cs\n--- a/x.cs\n+++ b/x.cs\n@@ -1,2 +1,3 @@\n+a\n@@ -9 +10 @@\n";
    let crlf = lf.replace('\n', "\r\n");
    let mixed = "diff --git a/x.cs b/x.cs\r\n--- a/x.cs\n+++ b/x.cs\r\n@@ -1,2 +1,3 @@\n+a\r\n@@ -9 +10 @@\n";
    assert_eq!(parse_diff(lf), parse_diff(&crlf));
    assert_eq!(parse_diff(lf), parse_diff(mixed));
    assert_eq!(parse_diff(lf)[0].ranges, vec![DiffRange::new(1, 3), DiffRange::new(10, 1)]);
  }

  #[test]
  fn test_ranges_keep_hunk_order() {
    let diff = "+++ b/a.cs\n@@ -50 +50 @@\n@@ -2 +2,2 @@\n";
    assert_eq!(parse_diff(diff)[0].ranges, vec![DiffRange::new(50, 1), DiffRange::new(2, 2)]);
  }

  #[test]
  fn test_files_keep_first_seen_order() {
    let diff = "+++ b/z.cs\n@@ -1 +1 @@\n+++ b/a.cs\n@@ -1 +1 @@\n+++ b/z.cs\n@@ -7 +7 @@\n";
    let files = parse_diff(diff);
    assert_eq!(files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(), vec!["z.cs", "a.cs"]);
    assert_eq!(files[0].ranges, vec![DiffRange::new(1, 1), DiffRange::new(7, 1)]);
  }

  #[test]
  fn test_deleted_file_does_not_capture_hunks() {
    let diff = "+++ b/keep.cs\n@@ -1 +1 @@\n--- a/gone.cs\n+++ /dev/null\n@@ -1,4 +0,0 @@\n@@ -1 +1,2 @@\n";
    let files = parse_diff(diff);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].ranges, vec![DiffRange::new(1, 1)]);
  }

  #[test]
  fn test_malformed_headers_are_skipped() {
    let diff = "+++ b/a.cs\n@@ -x +1 @@\n@@ -1 +y,2 @@\n@@ -1 +3,2\n@@@ -1 +1 @@\n@@ -1 +4,2 @@\n";
    assert_eq!(parse_diff(diff)[0].ranges, vec![DiffRange::new(4, 2)]);
  }

  #[test]
  fn test_git_patch_with_bodies() {
    let diff = r#"diff --git a/src/main.cs b/src/main.cs
index 1234567..abcdefg 100644
--- a/src/main.cs
+++ b/src/main.cs
@@ -1 +1,2 @@
-    Console.WriteLine("Hello");
+    Console.WriteLine("Hello, world!");
+    Console.WriteLine("New line");
diff --git a/Program.cs b/Program.cs
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/Program.cs
@@ -0,0 +1,3 @@
+class Program
+{
+}
"#;

    let files = parse_diff(diff);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, "src/main.cs");
    assert_eq!(files[0].ranges, vec![DiffRange::new(1, 2)]);
    assert_eq!(files[1].path, "Program.cs");
    assert_eq!(files[1].ranges, vec![DiffRange::new(1, 3)]);
  }

  #[test]
  fn test_huge_line_numbers_parse() {
    let files = parse_diff("+++ b/a.cs\n@@ -1 +18446744073709551615,2 @@\n");
    assert_eq!(files[0].ranges, vec![DiffRange::new(usize::MAX, 2)]);
    assert_eq!(files[0].ranges[0].end_line(), usize::MAX - 1);
  }

  #[test]
  fn test_hook_style_prefixes() {
    let diff = "+++ i/test.md\n@@ -0,0 +1 @@\n";
    assert_eq!(parse_diff(diff)[0].path, "test.md");
  }
}
