//! Per-file formatting runs and their parallel dispatch.
//!
//! Files are independent: each one is read, outlined, expanded, formatted and
//! compared on its own, so they are spread over a rayon pool and the outcomes
//! collected in any order, then sorted by path.

use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::Settings;
use crate::diff::FilePath;
use crate::edit::UnifiedDiff;
use crate::error::{FormatError, Result};
use crate::formatter::Formatter;
use crate::profile;
use crate::range::{DiffRange, FileDiff, LineIndex, TextSpan};
use crate::span::expand_to_syntax_spans;
use crate::syntax::ArenaTree;

/// What to do with a file whose formatting differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  /// Write the formatted text back.
  #[default]
  Write,
  /// Only report that the file would change.
  Check,
  /// Report a unified diff of the change.
  Diff
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  Unchanged,
  Formatted,
  NeedsFormatting,
  Skipped(String),
  Failed(String)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
  pub path:   String,
  pub status: Status,
  pub spans:  usize,
  pub diff:   Option<String>
}

impl FileOutcome {
  fn new(path: &str, status: Status) -> Self {
    Self { path: path.to_string(), status, spans: 0, diff: None }
  }
}

pub struct Pipeline<'a> {
  root:      PathBuf,
  settings:  &'a Settings,
  formatter: &'a dyn Formatter,
  mode:      Mode
}

impl<'a> Pipeline<'a> {
  pub fn new(root: impl Into<PathBuf>, settings: &'a Settings, formatter: &'a dyn Formatter, mode: Mode) -> Self {
    Self { root: root.into(), settings, formatter, mode }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Formats the parts of `source` touched by `ranges`.
  ///
  /// Returns the new text and the spans that were handed to the formatter.
  pub fn format_source(&self, source: &str, ranges: &[DiffRange]) -> Result<(String, Vec<TextSpan>)> {
    let tree = ArenaTree::outline(source);
    let lines = LineIndex::new(source);
    let spans = expand_to_syntax_spans(&tree, &lines, ranges);

    if spans.is_empty() {
      return Ok((source.to_string(), spans));
    }

    let formatted = self.formatter.format(source, &tree, &spans)?;
    Ok((formatted, spans))
  }

  /// Runs one file through the whole pipeline. Never fails; problems end up
  /// in the outcome's status.
  pub fn process_file(&self, file: &FileDiff) -> FileOutcome {
    profile!("Process file");

    if !self.settings.accepts(&file.path) {
      log::debug!("Skipping {} (extension filter)", file.path);
      return FileOutcome::new(&file.path, Status::Skipped("filtered by extension".to_string()));
    }

    let full_path = self.root.join(&file.path);
    if !full_path.is_file() {
      log::warn!("Skipping {}: not a file in the working tree", file.path);
      return FileOutcome::new(&file.path, Status::Skipped("missing".to_string()));
    }

    let result = full_path.read_source().and_then(|source| {
      let (formatted, spans) = self.format_source(&source, &file.ranges)?;
      Ok((source, formatted, spans))
    });

    let (source, formatted, spans) = match result {
      Ok(parts) => parts,
      Err(e @ FormatError::InvalidUtf8 { .. }) => {
        log::warn!("Skipping {}: {e}", file.path);
        return FileOutcome::new(&file.path, Status::Skipped("not valid UTF-8".to_string()));
      }
      Err(e) => {
        log::warn!("Failed to format {}: {e}", file.path);
        return FileOutcome::new(&file.path, Status::Failed(e.to_string()));
      }
    };

    log::debug!("{}: {} ranges expanded to {} spans", file.path, file.ranges.len(), spans.len());
    let mut outcome = FileOutcome::new(&file.path, Status::Unchanged);
    outcome.spans = spans.len();

    if formatted == source {
      return outcome;
    }

    match self.mode {
      Mode::Write => {
        outcome.status = match full_path.write_source(&formatted) {
          Ok(()) => Status::Formatted,
          Err(e) => Status::Failed(e.to_string())
        };
      }
      Mode::Check => outcome.status = Status::NeedsFormatting,
      Mode::Diff => {
        let diff = UnifiedDiff::new(&file.path)
          .context_lines(self.settings.context_lines)
          .render(&source, &formatted);

        // Only the trailing newline differs; there are no lines to show
        if diff.is_empty() {
          log::debug!("{}: formatting only changes the final newline", file.path);
          return outcome;
        }

        outcome.status = Status::NeedsFormatting;
        outcome.diff = Some(diff);
      }
    }

    outcome
  }

  /// Processes all files on a pool of `settings.jobs` threads.
  pub fn run(&self, files: &[FileDiff]) -> Result<Vec<FileOutcome>> {
    profile!("Format changed files");

    let thread_pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.settings.jobs.max(1))
      .build()
      .context("Failed to create thread pool")?;

    let outcomes = Mutex::new(Vec::with_capacity(files.len()));
    thread_pool.install(|| {
      files.par_iter().for_each(|file| {
        let outcome = self.process_file(file);
        outcomes.lock().push(outcome);
      })
    });

    let mut outcomes = outcomes.into_inner();
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outcomes)
  }
}

/// True when any outcome reports a file that still needs formatting.
pub fn has_pending(outcomes: &[FileOutcome]) -> bool {
  outcomes.iter().any(|o| o.status == Status::NeedsFormatting)
}

/// True when any file failed to process.
pub fn has_failures(outcomes: &[FileOutcome]) -> bool {
  outcomes.iter().any(|o| matches!(o.status, Status::Failed(_)))
}

/// Process exit status for a finished run: 2 when any file failed, 1 when
/// `--check` found files to format, 0 otherwise.
pub fn exit_code(outcomes: &[FileOutcome], mode: Mode) -> i32 {
  if has_failures(outcomes) {
    2
  } else if mode == Mode::Check && has_pending(outcomes) {
    1
  } else {
    0
  }
}
