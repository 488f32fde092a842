//! Repository handle: a validated repository location plus one method per
//! supported git operation.
//!
//! Each method turns typed parameters into an argument vector and hands it to
//! [`GitCommand`] with the repository path as working directory and the
//! handle's environment overrides layered on top of the inherited environment.

mod branches;
mod manager;
mod operations;
mod remote;

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::command::{output_lines, GitCommand};
use crate::error::{GitError, Result};

pub use branches::{CheckoutOptions, MergeOptions, TagOptions};
pub use manager::{CloneOptions, OpenOptions};
pub use operations::{CleanOptions, CommitOptions, LogOptions, RemoveOptions};
pub use remote::{FetchOptions, PullOptions, PushOptions};

/// A git repository on disk, either a working tree or a bare repository.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    bare: bool,
    env: BTreeMap<String, String>,
}

/// Where a clone comes from or where a remote points.
#[derive(Debug, Clone)]
pub enum Location<'a> {
    /// An already opened repository handle
    Repository(&'a Repository),
    /// A repository on the local filesystem
    Path(PathBuf),
    /// A remote URL (`https://`, `ssh://`, `git@host:path`, ...)
    Url(String),
}

impl Location<'_> {
    /// Classify a user supplied string as URL or filesystem path.
    pub fn parse(source: &str) -> Location<'static> {
        if looks_like_url(source) {
            Location::Url(source.to_string())
        } else {
            Location::Path(PathBuf::from(source))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// The value passed to git on the command line. Relative paths are made
    /// absolute because git runs inside the repository directory.
    pub fn to_arg(&self) -> OsString {
        match self {
            Location::Repository(repo) => repo.path().as_os_str().to_os_string(),
            Location::Path(path) => std::path::absolute(path)
                .unwrap_or_else(|_| path.clone())
                .into_os_string(),
            Location::Url(url) => OsString::from(url),
        }
    }
}

impl<'a> From<&'a Repository> for Location<'a> {
    fn from(repo: &'a Repository) -> Self {
        Location::Repository(repo)
    }
}

impl From<&Path> for Location<'_> {
    fn from(path: &Path) -> Self {
        Location::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Location<'_> {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

/// Refuse caller supplied refs, remotes and URLs that start with `-`.
///
/// They are placed where git expects a positional argument, and a leading
/// dash would turn them into options such as `--upload-pack=<cmd>`.
fn positional(value: &str) -> Result<&str> {
    if value.starts_with('-') {
        return Err(GitError::OptionLikeArgument(value.to_string()));
    }
    Ok(value)
}

fn looks_like_url(source: &str) -> bool {
    if source.contains("://") {
        return true;
    }
    // scp-like syntax: user@host:path, but not a Windows drive letter
    match source.split_once(':') {
        Some((host, _)) => host.contains('@') && !host.contains('/'),
        None => false,
    }
}

impl Repository {
    fn from_parts(path: PathBuf, bare: bool) -> Self {
        Self {
            path,
            bare,
            env: BTreeMap::new(),
        }
    }

    /// Canonical absolute path of the repository.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_bare(&self) -> bool {
        self.bare
    }

    /// Set an environment variable for every git command run by this handle.
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    /// Drop a previously set override. Returns the old value.
    pub fn remove_env(&mut self, key: &str) -> Option<String> {
        self.env.remove(key)
    }

    /// Current environment overrides.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Base command for this repository.
    fn git(&self) -> GitCommand {
        GitCommand::git().current_dir(&self.path).envs(&self.env)
    }

    fn run_git<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.git().args(args).run()
    }

    fn run_git_lines<I, S>(&self, args: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Ok(output_lines(&self.run_git(args)?))
    }

    /// Run an arbitrary git subcommand in this repository.
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_git(args)
    }
}
