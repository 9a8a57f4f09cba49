#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

pub struct TestRepo {
  pub repo:      git2::Repository,
  pub repo_path: TempDir
}

impl Default for TestRepo {
  fn default() -> Self {
    let repo_path = TempDir::new().unwrap();
    let repo = git2::Repository::init(repo_path.path()).unwrap();

    Self { repo, repo_path }
  }
}

impl TestRepo {
  pub fn path(&self) -> &Path {
    self.repo_path.path()
  }

  pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
    let file_path = self.path().join(name);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, content)?;
    Ok(file_path)
  }

  pub fn read_file(&self, name: &str) -> String {
    std::fs::read_to_string(self.path().join(name)).expect("Could not read file")
  }

  pub fn stage(&self, name: &str) -> Result<()> {
    let mut index = self.repo.index()?;
    index.add_path(Path::new(name))?;
    index.write()?;
    Ok(())
  }

  pub fn commit_all(&self, message: &str) -> Result<()> {
    let mut index = self.repo.index()?;
    index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
    index.write()?;

    let oid = index.write_tree()?;
    let tree = self.repo.find_tree(oid)?;
    let signature = git2::Signature::now("Your Name", "email@example.com")?;

    match self.repo.head().ok().and_then(|head| head.peel_to_commit().ok()) {
      Some(parent) => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
      }
      None => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
      }
    }

    Ok(())
  }
}
