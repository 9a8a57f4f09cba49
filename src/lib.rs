#[macro_export]
macro_rules! profile {
  ($name:expr) => {
    let _span = tracing::span!(tracing::Level::DEBUG, $name);
    let _enter = _span.enter();
  };
}

pub mod config;
pub mod diff;
pub mod edit;
pub mod error;
pub mod formatter;
pub mod git;
pub mod pipeline;
pub mod profiling;
pub mod range;
pub mod span;
pub mod syntax;

// Re-exports
pub use diff::parse_diff;
pub use edit::unified_diff;
pub use error::{FormatError, Result};
pub use profiling::Profile;
pub use range::{DiffRange, FileDiff, LineRange, TextSpan};
pub use span::{expand_to_enclosing_node, expand_to_syntax_spans, merge_overlapping_spans, to_text_span};
