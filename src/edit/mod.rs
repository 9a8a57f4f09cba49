//! Line-level edit scripts and unified diff output.
//!
//! [`myers`] computes the minimal edit script between two texts, [`render`]
//! turns it into a unified diff with context.

pub mod myers;
pub mod render;

pub use myers::{diff_lines, split_lines, Edit, EditKind};
pub use render::{unified_diff, UnifiedDiff, DEFAULT_CONTEXT_LINES};
