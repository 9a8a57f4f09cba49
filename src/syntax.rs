//! Syntax tree capability consumed by the span expander.
//!
//! The expander only needs three things from a node: its kind, its full span
//! and its parent. [`SyntaxTree`] and [`SyntaxNode`] describe exactly that, so
//! any parser can be plugged in. [`ArenaTree`] is an index-based
//! implementation, and [`ArenaTree::outline`] builds a coarse,
//! language-agnostic tree from lines and braces.

use crate::range::{LineIndex, TextSpan};

/// Node categories the expander can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
  CompilationUnit,
  NamespaceDeclaration,
  FileScopedNamespaceDeclaration,
  UsingDirective,
  AttributeList,
  TypeDeclaration,
  MemberDeclaration,
  AccessorDeclaration,
  Statement,
  Block,
  Expression,
  Token,
  Other
}

impl SyntaxKind {
  /// Whether a node of this kind can be formatted on its own.
  pub fn is_boundary(self) -> bool {
    use SyntaxKind::*;

    matches!(
      self,
      Statement |
        MemberDeclaration |
        AccessorDeclaration |
        TypeDeclaration |
        NamespaceDeclaration |
        FileScopedNamespaceDeclaration |
        UsingDirective |
        AttributeList
    )
  }
}

pub trait SyntaxNode: Sized {
  fn kind(&self) -> SyntaxKind;

  /// Span of the node without surrounding trivia.
  fn span(&self) -> TextSpan;

  /// Span including leading and trailing trivia.
  fn full_span(&self) -> TextSpan;

  fn parent(&self) -> Option<Self>;
}

pub trait SyntaxTree {
  type Node<'a>: SyntaxNode
  where
    Self: 'a;

  fn root(&self) -> Option<Self::Node<'_>>;

  /// Innermost node whose full span covers `span`.
  fn find_node(&self, span: TextSpan) -> Option<Self::Node<'_>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
  kind:      SyntaxKind,
  span:      TextSpan,
  full_span: TextSpan,
  parent:    Option<NodeId>,
  children:  Vec<NodeId>
}

/// Syntax tree stored as a flat vector of nodes; the first node is the root.
#[derive(Debug, Clone, Default)]
pub struct ArenaTree {
  nodes: Vec<NodeData>
}

impl ArenaTree {
  pub fn new(kind: SyntaxKind, full_span: TextSpan) -> Self {
    Self {
      nodes: vec![NodeData { kind, span: full_span, full_span, parent: None, children: Vec::new() }]
    }
  }

  pub fn root_id(&self) -> Option<NodeId> {
    (!self.nodes.is_empty()).then_some(NodeId(0))
  }

  /// Appends a child to `parent`. Children must be pushed in source order.
  pub fn push(&mut self, parent: NodeId, kind: SyntaxKind, span: TextSpan, full_span: TextSpan) -> NodeId {
    let id = NodeId(self.nodes.len());
    self.nodes.push(NodeData { kind, span, full_span, parent: Some(parent), children: Vec::new() });
    self.nodes[parent.0].children.push(id);
    id
  }

  pub fn node(&self, id: NodeId) -> ArenaNode<'_> {
    ArenaNode { tree: self, id }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  fn extend_end(&mut self, id: NodeId, end: usize, full_end: usize) {
    let data = &mut self.nodes[id.0];
    data.span.end = data.span.end.max(end);
    data.full_span.end = data.full_span.end.max(full_end);
  }

  /// Builds a coarse tree from the shape of the text.
  ///
  /// Every non-blank line becomes a node under the innermost open brace
  /// region. A line that leaves more `{` than `}` open owns the following
  /// lines until the matching close. Braces inside strings and comments are
  /// counted too.
  pub fn outline(source: &str) -> Self {
    let mut tree = ArenaTree::new(SyntaxKind::CompilationUnit, TextSpan::new(0, source.len()));
    let lines = LineIndex::new(source);
    let mut open: Vec<NodeId> = vec![NodeId(0)];

    for number in 1..=lines.line_count() {
      let Some(line) = lines.line(number) else { break };
      let full_end = lines.line(number + 1).map_or(source.len(), |next| next.start);
      let text = &source[line.start..line.end];
      let trimmed = text.trim();

      if trimmed.is_empty() {
        continue;
      }

      let content_start = line.start + (text.len() - text.trim_start().len());
      let content_end = content_start + trimmed.len();
      let parent = *open.last().unwrap_or(&NodeId(0));
      let id = tree.push(
        parent,
        classify_line(trimmed),
        TextSpan::new(content_start, content_end),
        TextSpan::new(line.start, full_end)
      );

      for &block in open.iter().skip(1) {
        tree.extend_end(block, content_end, full_end);
      }

      let opens = trimmed.matches('{').count();
      let closes = trimmed.matches('}').count();

      if opens > closes {
        open.push(id);
      } else {
        for _ in opens..closes {
          if open.len() > 1 {
            open.pop();
          }
        }
      }
    }

    log::trace!("Outlined {} lines into {} nodes", lines.line_count(), tree.len());
    tree
  }
}

/// Best-effort guess of a line's declaration kind from its leading words.
fn classify_line(line: &str) -> SyntaxKind {
  let words: Vec<&str> = line
    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
    .filter(|w| !w.is_empty())
    .take(6)
    .collect();
  let has = |keyword: &str| words.contains(&keyword);

  if line.starts_with('[') && line.ends_with(']') {
    SyntaxKind::AttributeList
  } else if words.first() == Some(&"using") && line.ends_with(';') && !line.contains('(') {
    SyntaxKind::UsingDirective
  } else if has("namespace") && line.ends_with(';') {
    SyntaxKind::FileScopedNamespaceDeclaration
  } else if has("namespace") {
    SyntaxKind::NamespaceDeclaration
  } else if ["class", "struct", "interface", "enum", "record"].iter().any(|k| has(k)) {
    SyntaxKind::TypeDeclaration
  } else {
    SyntaxKind::Statement
  }
}

/// Borrowed handle to one node of an [`ArenaTree`].
#[derive(Debug, Clone, Copy)]
pub struct ArenaNode<'a> {
  tree: &'a ArenaTree,
  id:   NodeId
}

impl<'a> ArenaNode<'a> {
  pub fn id(&self) -> NodeId {
    self.id
  }

  pub fn children(&self) -> impl Iterator<Item = ArenaNode<'a>> + 'a {
    let tree = self.tree;
    tree.nodes[self.id.0].children.iter().map(move |&id| ArenaNode { tree, id })
  }

  fn data(&self) -> &'a NodeData {
    &self.tree.nodes[self.id.0]
  }
}

impl SyntaxNode for ArenaNode<'_> {
  fn kind(&self) -> SyntaxKind {
    self.data().kind
  }

  fn span(&self) -> TextSpan {
    self.data().span
  }

  fn full_span(&self) -> TextSpan {
    self.data().full_span
  }

  fn parent(&self) -> Option<Self> {
    self.data().parent.map(|id| ArenaNode { tree: self.tree, id })
  }
}

impl SyntaxTree for ArenaTree {
  type Node<'a> = ArenaNode<'a>;

  fn root(&self) -> Option<ArenaNode<'_>> {
    self.root_id().map(|id| self.node(id))
  }

  fn find_node(&self, span: TextSpan) -> Option<ArenaNode<'_>> {
    let mut node = self.root()?;
    let span = span.clamp_to(node.full_span());

    while let Some(child) = node.children().find(|child| child.full_span().contains(span)) {
      node = child;
    }

    Some(node)
  }
}
