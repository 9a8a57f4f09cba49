use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, DiffOptions, Repository, Tree};
use log::{debug, trace};

use crate::diff::{DiffDeltaPath, Utf8String};
use crate::error::{FormatError, Result};
use crate::profile;

/// Which two states of the repository to compare.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiffSource {
  /// Working tree and index against `HEAD`.
  #[default]
  WorkingTree,
  /// Index against `HEAD`.
  Staged,
  /// Working tree and index against a revision.
  Revision(String)
}

pub struct Repo {
  repo: Repository
}

impl Repo {
  pub fn new_with_path(path: impl AsRef<Path>) -> Result<Self> {
    let repo = Repository::discover(path).map_err(|e| match e.code() {
      git2::ErrorCode::NotFound => FormatError::NoRepository,
      _ => FormatError::Git(e)
    })?;
    Ok(Repo { repo })
  }

  /// Like [`Repo::new_with_path`], but being outside any repository is not
  /// an error. Other git failures still are.
  pub fn open_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
    match Self::new_with_path(path) {
      Ok(repo) => Ok(Some(repo)),
      Err(FormatError::NoRepository) => Ok(None),
      Err(e) => Err(e)
    }
  }

  /// Directory the diff paths are relative to.
  pub fn workdir(&self) -> Result<PathBuf> {
    self
      .repo
      .workdir()
      .map(Path::to_path_buf)
      .ok_or_else(|| FormatError::Git(git2::Error::from_str("Bare repositories have no working tree")))
  }

  /// Zero-context unified diff text for `source`, restricted to `pathspecs`
  /// when any are given.
  pub fn zero_context_patch(&self, source: &DiffSource, pathspecs: &[String]) -> Result<String> {
    profile!("Zero-context patch generation");

    let mut opts = DiffOptions::new();
    configure_diff_options(&mut opts);
    for spec in pathspecs {
      opts.pathspec(spec);
    }

    let diff = self.to_diff(source, &mut opts)?;
    diff_to_patch(&diff)
  }

  fn base_tree(&self, source: &DiffSource) -> Result<Tree<'_>> {
    let tree = match source {
      DiffSource::Revision(rev) => Some(self.repo.revparse_single(rev)?.peel_to_tree()?),
      _ => self.repo.head().ok().and_then(|head| head.peel_to_tree().ok())
    };

    match tree {
      Some(tree) => Ok(tree),
      None => {
        // No HEAD yet, compare against an empty tree
        debug!("No HEAD, diffing against the empty tree");
        let oid = self.repo.treebuilder(None)?.write()?;
        Ok(self.repo.find_tree(oid)?)
      }
    }
  }

  fn to_diff(&self, source: &DiffSource, opts: &mut DiffOptions) -> Result<Diff<'_>> {
    let tree = self.base_tree(source)?;
    let diff = match source {
      DiffSource::Staged => self.repo.diff_tree_to_index(Some(&tree), None, Some(opts))?,
      _ => self.repo.diff_tree_to_workdir_with_index(Some(&tree), Some(opts))?
    };

    debug!("Stats: {:?}", diff.stats().map(|s| (s.files_changed(), s.insertions(), s.deletions())));
    Ok(diff)
  }
}

fn configure_diff_options(opts: &mut DiffOptions) {
  opts
    .ignore_whitespace_change(false)
    .recurse_untracked_dirs(true)
    .show_untracked_content(true)
    .include_untracked(true)
    .ignore_submodules(true)
    .include_ignored(false)
    .interhunk_lines(0)
    .context_lines(0);
}

/// Prints a diff as patch text, the same shape `git diff -U0` produces.
fn diff_to_patch(diff: &Diff<'_>) -> Result<String> {
  let mut patch = String::new();

  diff.print(DiffFormat::Patch, |delta, _hunk, line| {
    let content = line.content().to_utf8();
    match line.origin() {
      '+' | '-' | ' ' => patch.push(line.origin()),
      'F' => trace!("[diff] File: {}", delta.path().display()),
      _ => {}
    }
    patch.push_str(&content);
    true
  })?;

  Ok(patch)
}
