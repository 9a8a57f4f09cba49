//! Error types for the git-fmt tool.
//!
//! The range engine itself never fails: malformed diff input is skipped and
//! out-of-range lines are clamped. Everything here belongs to the glue around
//! it (repository access, file I/O, settings, the formatter).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
  #[error("Git error: {0}")]
  Git(#[from] git2::Error),

  #[error("Failed to access {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error
  },

  #[error("{} is not valid UTF-8", .path.display())]
  InvalidUtf8 { path: PathBuf },

  #[error("Invalid line range {0:?}, expected <start>:<end>")]
  InvalidLineRange(String),

  #[error("Configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("Formatter failed: {0}")]
  Formatter(String),

  #[error("Not inside a git repository")]
  NoRepository,

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

pub type Result<T, E = FormatError> = std::result::Result<T, E>;

impl FormatError {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    FormatError::Io { path: path.into(), source }
  }
}
