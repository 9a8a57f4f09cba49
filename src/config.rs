use std::path::{Path, PathBuf};

use serde::Deserialize;
use config::{Config, FileFormat};

use crate::edit::DEFAULT_CONTEXT_LINES;
use crate::error::Result;

// Constants
const DEFAULT_TAB_WIDTH: i64 = 4;
const DEFAULT_EXPAND_TABS: bool = true;
const ENV_PREFIX: &str = "GIT_FMT";
const REPO_CONFIG_FILE: &str = ".git-fmt.ini";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
  pub context_lines: usize,
  pub jobs:          usize,
  pub tab_width:     usize,
  pub expand_tabs:   bool,
  pub extensions:    String
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      context_lines: DEFAULT_CONTEXT_LINES,
      jobs:          num_cpus::get(),
      tab_width:     DEFAULT_TAB_WIDTH as usize,
      expand_tabs:   DEFAULT_EXPAND_TABS,
      extensions:    String::new()
    }
  }
}

#[derive(Debug)]
pub struct ConfigPaths {
  pub user: Option<PathBuf>,
  pub repo: Option<PathBuf>
}

impl ConfigPaths {
  pub fn new(repo_root: Option<&Path>) -> Self {
    let user = home::home_dir().map(|home| home.join(".config/git-fmt/config.ini"));
    let repo = repo_root.map(|root| root.join(REPO_CONFIG_FILE));
    Self { user, repo }
  }

  fn files(&self) -> impl Iterator<Item = &PathBuf> {
    self.user.iter().chain(self.repo.iter())
  }
}

impl Settings {
  /// Loads settings from the user config, the repository config and the
  /// environment, later sources winning.
  pub fn load(repo_root: Option<&Path>) -> Result<Self> {
    Self::load_from(&ConfigPaths::new(repo_root))
  }

  pub fn load_from(paths: &ConfigPaths) -> Result<Self> {
    let mut builder = Config::builder()
      .set_default("context_lines", DEFAULT_CONTEXT_LINES as i64)?
      .set_default("jobs", num_cpus::get() as i64)?
      .set_default("tab_width", DEFAULT_TAB_WIDTH)?
      .set_default("expand_tabs", DEFAULT_EXPAND_TABS)?
      .set_default("extensions", "")?;

    for file in paths.files() {
      log::debug!("Reading settings from {}", file.display());
      builder = builder.add_source(config::File::new(file.to_string_lossy().as_ref(), FileFormat::Ini).required(false));
    }

    let settings: Settings = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()?;

    log::debug!("Loaded settings: {settings:?}");
    Ok(settings)
  }

  /// Lower-cased extensions (without the dot) to restrict formatting to.
  pub fn extension_filter(&self) -> Vec<String> {
    self
      .extensions
      .split(',')
      .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
      .filter(|ext| !ext.is_empty())
      .collect()
  }

  /// Whether `path` passes the extension filter. An empty filter accepts all.
  pub fn accepts(&self, path: &str) -> bool {
    let filter = self.extension_filter();
    if filter.is_empty() {
      return true;
    }

    Path::new(path)
      .extension()
      .map(|ext| ext.to_string_lossy().to_lowercase())
      .is_some_and(|ext| filter.contains(&ext))
  }
}
