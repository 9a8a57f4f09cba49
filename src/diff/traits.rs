//! Utility traits for diff processing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FormatError, Result};

/// File access used by the per-file pipeline
///
/// Sources are read strictly: a file that is not valid UTF-8 is an error,
/// since writing back a lossy decoding would change bytes nobody asked to
/// format.
pub trait FilePath {
  fn read_source(&self) -> Result<String>;
  fn write_source(&self, contents: &str) -> Result<()>;
}

impl FilePath for Path {
  fn read_source(&self) -> Result<String> {
    let bytes = fs::read(self).map_err(|e| FormatError::io(self, e))?;
    String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { path: self.to_path_buf() })
  }

  fn write_source(&self, contents: &str) -> Result<()> {
    fs::write(self, contents).map_err(|e| FormatError::io(self, e))
  }
}

impl FilePath for PathBuf {
  fn read_source(&self) -> Result<String> {
    self.as_path().read_source()
  }

  fn write_source(&self, contents: &str) -> Result<()> {
    self.as_path().write_source(contents)
  }
}

/// Extension trait for git2::DiffDelta to get file paths
pub trait DiffDeltaPath {
  fn path(&self) -> PathBuf;
}

impl DiffDeltaPath for git2::DiffDelta<'_> {
  fn path(&self) -> PathBuf {
    self
      .new_file()
      .path()
      .or_else(|| self.old_file().path())
      .map(PathBuf::from)
      .unwrap_or_default()
  }
}

/// Extension trait for converting bytes to UTF-8 strings
pub trait Utf8String {
  fn to_utf8(&self) -> String;
}

impl Utf8String for Vec<u8> {
  fn to_utf8(&self) -> String {
    self.as_slice().to_utf8()
  }
}

impl Utf8String for [u8] {
  fn to_utf8(&self) -> String {
    // Fast path for valid UTF-8 (most common case)
    if let Ok(s) = std::str::from_utf8(self) {
      return s.to_string();
    }
    String::from_utf8_lossy(self).into_owned()
  }
}
