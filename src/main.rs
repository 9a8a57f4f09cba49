use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{bail, Context, Result};
use colored::*;
use dotenv::dotenv;
use log::{debug, LevelFilter};
use structopt::StructOpt;
use narrow::config::Settings;
use narrow::formatter::WhitespaceFormatter;
use narrow::git::{DiffSource, Repo};
use narrow::pipeline::{self, FileOutcome, Mode, Pipeline, Status};
use narrow::{parse_diff, DiffRange, FileDiff, LineRange, Profile};

#[derive(StructOpt, Debug)]
#[structopt(name = "git-fmt", about = "Formats only the lines you changed.")]
struct Args {
  /// Report files that need formatting instead of writing them; exits 1 if any
  #[structopt(long, conflicts_with = "diff")]
  check: bool,

  /// Print a unified diff of the formatting changes instead of writing them
  #[structopt(long)]
  diff: bool,

  /// Only consider staged changes
  #[structopt(long, conflicts_with = "base")]
  staged: bool,

  /// Compare the working tree against this revision instead of HEAD
  #[structopt(long)]
  base: Option<String>,

  /// Format this 1-based inclusive line range (start:end) of a single file
  #[structopt(long)]
  lines: Option<LineRange>,

  /// Number of worker threads
  #[structopt(short, long)]
  jobs: Option<usize>,

  /// Lines of context in --diff output
  #[structopt(long)]
  context: Option<usize>,

  /// Enables verbose logging
  #[structopt(short, long)]
  verbose: bool,

  /// Paths to restrict the run to
  #[structopt(parse(from_os_str))]
  paths: Vec<PathBuf>
}

impl Args {
  fn mode(&self) -> Mode {
    if self.check {
      Mode::Check
    } else if self.diff {
      Mode::Diff
    } else {
      Mode::Write
    }
  }

  fn diff_source(&self) -> DiffSource {
    match (&self.base, self.staged) {
      (Some(rev), _) => DiffSource::Revision(rev.clone()),
      (None, true) => DiffSource::Staged,
      (None, false) => DiffSource::WorkingTree
    }
  }
}

fn init_logging(verbose: bool) {
  if verbose {
    env_logger::builder()
      .filter_level(LevelFilter::Debug)
      .format_target(false)
      .init();
    debug!("Verbose logging enabled");
  } else {
    env_logger::init();
  }
}

/// Path relative to the repository root, with forward slashes.
fn repo_relative(root: &Path, path: &Path) -> Result<String> {
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir().context("Failed to get current directory")?.join(path)
  };
  let relative = absolute.strip_prefix(root).unwrap_or(&absolute);
  Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// Files and ranges to work on, from either `--lines` or the git diff.
fn collect_files(args: &Args, root: &Path, repo: Option<&Repo>) -> Result<Vec<FileDiff>> {
  if let Some(range) = args.lines {
    let [path] = args.paths.as_slice() else {
      bail!("--lines needs exactly one file");
    };
    let path = repo_relative(root, path)?;
    return Ok(vec![FileDiff { path, ranges: vec![DiffRange::from(range)] }]);
  }

  let Some(repo) = repo else {
    bail!("Not inside a git repository; use --lines to format a range directly");
  };

  let pathspecs = args
    .paths
    .iter()
    .map(|p| repo_relative(root, p))
    .collect::<Result<Vec<_>>>()?;
  let patch = repo
    .zero_context_patch(&args.diff_source(), &pathspecs)
    .context("Failed to get diff")?;
  Ok(parse_diff(&patch))
}

fn report(outcomes: &[FileOutcome], mode: Mode) {
  for outcome in outcomes {
    match &outcome.status {
      Status::Formatted => println!("{} {}", "formatted".green(), outcome.path),
      Status::NeedsFormatting if mode == Mode::Check => println!("{} {}", "unformatted".yellow(), outcome.path),
      Status::NeedsFormatting => {
        if let Some(diff) = &outcome.diff {
          print!("{}", colorize(diff));
        }
      }
      Status::Failed(reason) => eprintln!("{} {}: {}", "error".red().bold(), outcome.path, reason),
      Status::Skipped(reason) => debug!("Skipped {}: {}", outcome.path, reason),
      Status::Unchanged => debug!("Unchanged {}", outcome.path)
    }
  }
}

fn colorize(diff: &str) -> String {
  diff
    .lines()
    .map(|line| {
      let styled = if line.starts_with("+++") || line.starts_with("---") {
        line.bold()
      } else if line.starts_with("@@") {
        line.cyan()
      } else if line.starts_with('+') {
        line.green()
      } else if line.starts_with('-') {
        line.red()
      } else {
        line.normal()
      };
      format!("{styled}\n")
    })
    .collect()
}

fn main() -> Result<()> {
  dotenv().ok();

  let args = Args::from_args();
  init_logging(args.verbose);

  let code = {
    let _profile = Profile::new("git-fmt");
    run(&args)?
  };

  if code != 0 {
    exit(code);
  }

  Ok(())
}

/// Runs the whole tool and returns the process exit status.
fn run(args: &Args) -> Result<i32> {
  let repo = Repo::open_optional(".").context("Failed to open repository")?;
  let root = match &repo {
    Some(repo) => repo.workdir()?,
    None => std::env::current_dir().context("Failed to get current directory")?
  };

  let mut settings = Settings::load(Some(root.as_path()))?;
  if let Some(jobs) = args.jobs {
    settings.jobs = jobs;
  }
  if let Some(context) = args.context {
    settings.context_lines = context;
  }

  let files = collect_files(args, &root, repo.as_ref())?;
  if files.is_empty() {
    debug!("No changed lines to format");
    return Ok(0);
  }

  let mode = args.mode();
  let formatter = WhitespaceFormatter::from_settings(&settings);
  let outcomes = Pipeline::new(&root, &settings, &formatter, mode).run(&files)?;
  report(&outcomes, mode);

  Ok(pipeline::exit_code(&outcomes, mode))
}
