//! Line ranges, file diffs and text spans.
//!
//! Lines are 1-based and inclusive. Text spans are byte offsets into the
//! source, end-exclusive.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

/// A block of changed lines on the new side of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffRange {
  pub start_line: usize,
  pub line_count: usize
}

impl DiffRange {
  pub fn new(start_line: usize, line_count: usize) -> Self {
    Self { start_line, line_count }
  }

  /// Last line covered by the range, inclusive.
  pub fn end_line(&self) -> usize {
    self.start_line.saturating_add(self.line_count).saturating_sub(1)
  }

  /// Zero-length ranges and ranges starting at line 0 never address a line.
  pub fn is_valid(&self) -> bool {
    self.start_line > 0 && self.line_count > 0
  }
}

impl From<LineRange> for DiffRange {
  fn from(range: LineRange) -> Self {
    DiffRange::new(range.start, range.end - range.start + 1)
  }
}

/// Changed ranges of one file, in the order the diff listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
  pub path:   String,
  pub ranges: Vec<DiffRange>
}

/// A contiguous region of source text, `start..end` in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextSpan {
  pub start: usize,
  pub end:   usize
}

impl TextSpan {
  pub fn new(start: usize, end: usize) -> Self {
    debug_assert!(start <= end, "span start {start} after end {end}");
    Self { start, end }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn contains(&self, other: TextSpan) -> bool {
    self.start <= other.start && other.end <= self.end
  }

  /// Clamps the span into `bounds`.
  pub fn clamp_to(&self, bounds: TextSpan) -> TextSpan {
    let start = self.start.clamp(bounds.start, bounds.end);
    let end = self.end.clamp(start, bounds.end);
    TextSpan::new(start, end)
  }
}

impl fmt::Display for TextSpan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}..{})", self.start, self.end)
  }
}

/// Byte offsets of every line in a source text.
///
/// A line's span excludes its terminating `\n` (and a `\r` right before it).
#[derive(Debug, Clone)]
pub struct LineIndex {
  lines: Vec<TextSpan>
}

impl LineIndex {
  pub fn new(source: &str) -> Self {
    let mut lines = Vec::new();
    let mut start = 0;

    for (offset, byte) in source.bytes().enumerate() {
      if byte == b'\n' {
        let end = if offset > start && source.as_bytes()[offset - 1] == b'\r' {
          offset - 1
        } else {
          offset
        };
        lines.push(TextSpan::new(start, end));
        start = offset + 1;
      }
    }

    if start < source.len() {
      lines.push(TextSpan::new(start, source.len()));
    }

    Self { lines }
  }

  pub fn line_count(&self) -> usize {
    self.lines.len()
  }

  /// Span of the 1-based line `line`, if it exists.
  pub fn line(&self, line: usize) -> Option<TextSpan> {
    line.checked_sub(1).and_then(|i| self.lines.get(i)).copied()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

/// A `start:end` line range, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
  pub start: usize,
  pub end:   usize
}

impl FromStr for LineRange {
  type Err = FormatError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || FormatError::InvalidLineRange(s.to_string());

    let (start, end) = s.trim().split_once(':').ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;

    if start == 0 || end < start {
      return Err(invalid());
    }

    Ok(LineRange { start, end })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_end_line() {
    assert_eq!(DiffRange::new(20, 3).end_line(), 22);
    assert_eq!(DiffRange::new(25, 1).end_line(), 25);
    assert_eq!(DiffRange::new(usize::MAX, 2).end_line(), usize::MAX - 1);
  }

  #[test]
  fn test_validity() {
    assert!(DiffRange::new(1, 1).is_valid());
    assert!(!DiffRange::new(0, 4).is_valid());
    assert!(!DiffRange::new(7, 0).is_valid());
  }

  #[test]
  fn test_line_index_handles_crlf_and_missing_trailing_newline() {
    let index = LineIndex::new("ab\r\ncd\nef");
    assert_eq!(index.line_count(), 3);
    assert_eq!(index.line(1), Some(TextSpan::new(0, 2)));
    assert_eq!(index.line(2), Some(TextSpan::new(4, 6)));
    assert_eq!(index.line(3), Some(TextSpan::new(7, 9)));
    assert_eq!(index.line(0), None);
    assert_eq!(index.line(4), None);
  }

  #[test]
  fn test_line_index_empty_lines() {
    let index = LineIndex::new("a\n\nb\n");
    assert_eq!(index.line_count(), 3);
    assert_eq!(index.line(2), Some(TextSpan::new(2, 2)));
    assert!(LineIndex::new("").is_empty());
  }

  #[test]
  fn test_line_range_parse() {
    let range: LineRange = "10:20".parse().unwrap();
    assert_eq!(range, LineRange { start: 10, end: 20 });
    assert_eq!(DiffRange::from(range), DiffRange::new(10, 11));

    let single: LineRange = "5:5".parse().unwrap();
    assert_eq!(DiffRange::from(single), DiffRange::new(5, 1));
  }

  #[test]
  fn test_line_range_rejects_garbage() {
    assert!("10".parse::<LineRange>().is_err());
    assert!("a:b".parse::<LineRange>().is_err());
    assert!("0:3".parse::<LineRange>().is_err());
    assert!("9:3".parse::<LineRange>().is_err());
  }

  #[test]
  fn test_span_clamp() {
    let bounds = TextSpan::new(0, 10);
    assert_eq!(TextSpan::new(5, 40).clamp_to(bounds), TextSpan::new(5, 10));
    assert_eq!(TextSpan::new(30, 40).clamp_to(bounds), TextSpan::new(10, 10));
  }
}
