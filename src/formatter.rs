//! The formatter seam.
//!
//! A [`Formatter`] receives the whole source, its syntax tree and the spans it
//! may touch, and returns the complete new text. [`WhitespaceFormatter`] is the
//! built-in one: it normalises indentation and trailing whitespace inside the
//! spans and leaves everything else byte-for-byte.

use crate::config::Settings;
use crate::error::{FormatError, Result};
use crate::range::TextSpan;
use crate::syntax::ArenaTree;

pub trait Formatter: Send + Sync {
  fn format(&self, source: &str, tree: &ArenaTree, spans: &[TextSpan]) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceFormatter {
  pub tab_width:   usize,
  pub expand_tabs: bool
}

impl WhitespaceFormatter {
  pub fn new(tab_width: usize, expand_tabs: bool) -> Self {
    Self { tab_width: tab_width.max(1), expand_tabs }
  }

  pub fn from_settings(settings: &Settings) -> Self {
    Self::new(settings.tab_width, settings.expand_tabs)
  }

  /// Rewrites one line fragment; `line_start`/`line_end` say whether the
  /// fragment touches the start/end of its line.
  fn format_fragment(&self, out: &mut String, fragment: &str, line_start: bool, line_end: bool) {
    let (body, ending) = split_line_ending(fragment);
    let line_end = line_end || !ending.is_empty();
    let body = if line_end { body.trim_end_matches([' ', '\t']) } else { body };

    if line_start && self.expand_tabs {
      let indent_len = body.len() - body.trim_start_matches([' ', '\t']).len();
      let mut column = 0;
      for c in body[..indent_len].chars() {
        let width = if c == '\t' { self.tab_width - column % self.tab_width } else { 1 };
        out.extend(std::iter::repeat(' ').take(width));
        column += width;
      }
      out.push_str(&body[indent_len..]);
    } else {
      out.push_str(body);
    }

    out.push_str(ending);
  }
}

fn split_line_ending(fragment: &str) -> (&str, &str) {
  if let Some(body) = fragment.strip_suffix("\r\n") {
    (body, "\r\n")
  } else if let Some(body) = fragment.strip_suffix('\n') {
    (body, "\n")
  } else {
    (fragment, "")
  }
}

impl Formatter for WhitespaceFormatter {
  fn format(&self, source: &str, _tree: &ArenaTree, spans: &[TextSpan]) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for span in spans {
      if span.start < cursor || span.end > source.len() {
        return Err(FormatError::Formatter(format!("span {span} is out of order or past the end of the text")));
      }
      if !source.is_char_boundary(span.start) || !source.is_char_boundary(span.end) {
        return Err(FormatError::Formatter(format!("span {span} splits a character")));
      }

      out.push_str(&source[cursor..span.start]);

      let region = &source[span.start..span.end];
      let rest = &source[span.end..];
      let mut line_start = span.start == 0 || source[..span.start].ends_with('\n');
      let region_at_line_end = rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n");

      let mut fragments = region.split_inclusive('\n').peekable();
      while let Some(fragment) = fragments.next() {
        let last = fragments.peek().is_none();
        self.format_fragment(&mut out, fragment, line_start, last && region_at_line_end);
        line_start = true;
      }

      cursor = span.end;
    }

    out.push_str(&source[cursor..]);
    Ok(out)
  }
}
