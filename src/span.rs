//! Expanding changed line ranges to whole syntax nodes.
//!
//! A hunk rarely lines up with something a formatter can handle on its own.
//! Each range is converted to a text span, widened to the nearest enclosing
//! boundary node (statement, member, type, ...) and the results are merged.

use crate::profile;
use crate::range::{DiffRange, LineIndex, TextSpan};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};

/// Converts a 1-based inclusive line range to a byte span.
///
/// Lines outside the text are clamped to the first/last line. The span runs
/// from the start of the first line to the end of the last one, excluding its
/// line break.
pub fn to_text_span(lines: &LineIndex, range: DiffRange) -> TextSpan {
  let last = lines.line_count();
  if last == 0 {
    return TextSpan::default();
  }

  let start_line = range.start_line.clamp(1, last);
  let end_line = range.end_line().clamp(start_line, last);

  let start = lines.line(start_line).map(|line| line.start).unwrap_or_default();
  let end = lines.line(end_line).map_or(start, |line| line.end);
  TextSpan::new(start, end)
}

/// Widens `span` to the full span of its nearest boundary node.
///
/// Walks up from the innermost node covering `span`; the first node whose
/// kind is a boundary wins. Reaching the compilation unit yields the whole
/// file. Without any node, or when the parent chain ends on neither, the span
/// comes back unchanged.
pub fn expand_to_enclosing_node<T: SyntaxTree>(tree: &T, span: TextSpan) -> TextSpan {
  let Some(mut node) = tree.find_node(span) else {
    return span;
  };

  loop {
    let kind = node.kind();
    if kind.is_boundary() || kind == SyntaxKind::CompilationUnit {
      log::trace!("Expanded {span} to {kind:?} at {}", node.full_span());
      return node.full_span();
    }

    match node.parent() {
      Some(parent) => node = parent,
      None => return span
    }
  }
}

/// Maps every range to an expanded span and merges the results.
pub fn expand_to_syntax_spans<T: SyntaxTree>(tree: &T, lines: &LineIndex, ranges: &[DiffRange]) -> Vec<TextSpan> {
  profile!("Expand ranges to syntax spans");

  let spans = ranges
    .iter()
    .map(|&range| expand_to_enclosing_node(tree, to_text_span(lines, range)));

  merge_overlapping_spans(spans)
}

/// Sorts spans and folds overlapping or touching ones together.
///
/// Zero-length spans are kept; they merge only when they touch a neighbour.
pub fn merge_overlapping_spans(spans: impl IntoIterator<Item = TextSpan>) -> Vec<TextSpan> {
  let mut spans: Vec<TextSpan> = spans.into_iter().collect();
  spans.sort_unstable();

  let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());
  for span in spans {
    match merged.last_mut() {
      Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
      _ => merged.push(span)
    }
  }

  merged
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntax::ArenaTree;

  fn span(start: usize, end: usize) -> TextSpan {
    TextSpan::new(start, end)
  }

  fn text(source: &str, span: TextSpan) -> &str {
    &source[span.start..span.end]
  }

  #[test]
  fn test_to_text_span() {
    let source = "one\ntwo\nthree\n";
    let lines = LineIndex::new(source);
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(2, 1))), "two");
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(1, 3))), "one\ntwo\nthree");
  }

  #[test]
  fn test_to_text_span_clamps() {
    let source = "one\ntwo\nthree";
    let lines = LineIndex::new(source);
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(2, 40))), "two\nthree");
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(9, 2))), "three");
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(0, 1))), "one");
    assert_eq!(to_text_span(&LineIndex::new(""), DiffRange::new(3, 3)), TextSpan::default());
    assert_eq!(text(source, to_text_span(&lines, DiffRange::new(usize::MAX, 2))), "three");
  }

  #[test]
  fn test_merge_examples() {
    assert_eq!(merge_overlapping_spans(vec![span(0, 10), span(5, 15)]), vec![span(0, 15)]);
    assert_eq!(merge_overlapping_spans(vec![span(0, 5), span(10, 15)]), vec![span(0, 5), span(10, 15)]);
  }

  #[test]
  fn test_merge_adjacent_and_contained() {
    assert_eq!(merge_overlapping_spans(vec![span(5, 10), span(0, 5)]), vec![span(0, 10)]);
    assert_eq!(merge_overlapping_spans(vec![span(0, 20), span(3, 4)]), vec![span(0, 20)]);
    assert!(merge_overlapping_spans(Vec::new()).is_empty());
  }

  #[test]
  fn test_merge_keeps_zero_length_spans() {
    assert_eq!(merge_overlapping_spans(vec![span(3, 3), span(7, 7)]), vec![span(3, 3), span(7, 7)]);
    assert_eq!(merge_overlapping_spans(vec![span(3, 3), span(3, 9)]), vec![span(3, 9)]);
    assert_eq!(merge_overlapping_spans(vec![span(0, 3), span(3, 3)]), vec![span(0, 3)]);
  }

  const SOURCE: &str = "class A\n{\n    void M()\n    {\n        var x = 1;\n        x += 2;\n    }\n}\n";

  #[test]
  fn test_expand_single_statement() {
    let tree = ArenaTree::outline(SOURCE);
    let start = SOURCE.find("x += 2").unwrap();
    let expanded = expand_to_enclosing_node(&tree, span(start + 2, start + 3));
    assert_eq!(text(SOURCE, expanded), "        x += 2;\n");
  }

  #[test]
  fn test_expand_empty_tree_returns_span() {
    assert_eq!(expand_to_enclosing_node(&ArenaTree::default(), span(4, 9)), span(4, 9));
  }

  #[test]
  fn test_expand_walks_past_non_boundary_nodes() {
    let mut tree = ArenaTree::new(SyntaxKind::CompilationUnit, span(0, 40));
    let root = tree.root_id().unwrap();
    let member = tree.push(root, SyntaxKind::MemberDeclaration, span(2, 30), span(0, 32));
    let body = tree.push(member, SyntaxKind::Block, span(10, 30), span(10, 30));
    let expr = tree.push(body, SyntaxKind::Expression, span(12, 20), span(12, 20));
    tree.push(expr, SyntaxKind::Token, span(12, 14), span(12, 14));

    assert_eq!(expand_to_enclosing_node(&tree, span(12, 13)), span(0, 32));
  }

  #[test]
  fn test_expand_nearest_boundary_wins() {
    let mut tree = ArenaTree::new(SyntaxKind::CompilationUnit, span(0, 100));
    let root = tree.root_id().unwrap();
    let ty = tree.push(root, SyntaxKind::TypeDeclaration, span(0, 100), span(0, 100));
    let property = tree.push(ty, SyntaxKind::MemberDeclaration, span(10, 60), span(8, 62));
    tree.push(property, SyntaxKind::AccessorDeclaration, span(20, 30), span(18, 31));

    assert_eq!(expand_to_enclosing_node(&tree, span(21, 25)), span(18, 31));
    assert_eq!(expand_to_enclosing_node(&tree, span(35, 40)), span(8, 62));
  }

  #[test]
  fn test_expand_falls_back_to_compilation_unit() {
    let mut tree = ArenaTree::new(SyntaxKind::CompilationUnit, span(0, 50));
    let root = tree.root_id().unwrap();
    tree.push(root, SyntaxKind::Expression, span(5, 10), span(5, 10));

    assert_eq!(expand_to_enclosing_node(&tree, span(6, 7)), span(0, 50));
  }

  #[test]
  fn test_expand_without_root_boundary_returns_span() {
    let mut tree = ArenaTree::new(SyntaxKind::Other, span(0, 50));
    let root = tree.root_id().unwrap();
    tree.push(root, SyntaxKind::Expression, span(5, 10), span(5, 10));

    assert_eq!(expand_to_enclosing_node(&tree, span(6, 7)), span(6, 7));
  }

  #[test]
  fn test_expand_to_syntax_spans_merges() {
    let tree = ArenaTree::outline(SOURCE);
    let lines = LineIndex::new(SOURCE);
    let spans = expand_to_syntax_spans(&tree, &lines, &[DiffRange::new(6, 1), DiffRange::new(5, 1)]);
    assert_eq!(spans.len(), 1);
    assert_eq!(text(SOURCE, spans[0]), "        var x = 1;\n        x += 2;\n");

    assert!(expand_to_syntax_spans(&tree, &lines, &[]).is_empty());
  }

  #[test]
  fn test_expand_to_syntax_spans_multi_line_range() {
    let tree = ArenaTree::outline(SOURCE);
    let lines = LineIndex::new(SOURCE);
    let spans = expand_to_syntax_spans(&tree, &lines, &[DiffRange::new(5, 2)]);
    assert_eq!(text(SOURCE, spans[0]), "    {\n        var x = 1;\n        x += 2;\n    }\n");
  }

  mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn spans() -> impl Strategy<Value = Vec<TextSpan>> {
      prop::collection::vec((0usize..200, 0usize..30), 0..40)
        .prop_map(|pairs| pairs.into_iter().map(|(start, len)| TextSpan::new(start, start + len)).collect())
    }

    proptest! {
      #[test]
      fn merge_is_idempotent(input in spans()) {
        let once = merge_overlapping_spans(input);
        let twice = merge_overlapping_spans(once.clone());
        prop_assert_eq!(once, twice);
      }

      #[test]
      fn merge_ignores_input_order((input, shuffled) in spans().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))) {
        prop_assert_eq!(merge_overlapping_spans(input), merge_overlapping_spans(shuffled));
      }

      #[test]
      fn merge_output_is_sorted_and_disjoint(input in spans()) {
        let merged = merge_overlapping_spans(input.clone());
        for pair in merged.windows(2) {
          prop_assert!(pair[0].end < pair[1].start);
        }
        for span in input {
          prop_assert!(merged.iter().any(|m| m.contains(span)));
        }
      }
    }
  }
}
