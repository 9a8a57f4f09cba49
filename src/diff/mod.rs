//! Diff text processing.
//!
//! This module turns zero-context unified diffs into changed line ranges
//! and provides small helpers for the bytes and files around them.

pub mod parser;
pub mod traits;

pub use parser::parse_diff;
pub use traits::{DiffDeltaPath, FilePath, Utf8String};
