use std::ffi::OsString;
use std::path::Path;

use super::{positional, Repository};
use crate::error::Result;

/// Flags for [`Repository::remove`].
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Only remove from the index, keep the working copy (`--cached`).
    pub cached: bool,
    /// Allow recursive removal of directories (`-r`).
    pub recursive: bool,
    /// Override the up-to-date check (`-f`).
    pub force: bool,
}

/// Flags for [`Repository::commit`].
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Stage modified and deleted tracked files first (`-a`).
    pub all: bool,
    pub amend: bool,
    pub allow_empty: bool,
    /// `Name <email>` override for the author.
    pub author: Option<String>,
}

/// Flags for [`Repository::clean`]. `-f` is always passed.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Remove untracked directories too (`-d`).
    pub directories: bool,
    /// Also remove ignored files (`-x`).
    pub ignored: bool,
    /// Only report what would be removed (`-n`).
    pub dry_run: bool,
}

/// Options for [`Repository::log`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub max_count: Option<usize>,
    /// Value for `--pretty=`, e.g. `oneline` or `format:%H %s`.
    pub format: Option<String>,
    /// Revision or range to start from; HEAD when unset.
    pub revision: Option<String>,
    /// Limit to commits touching these paths.
    pub paths: Vec<String>,
}

impl Repository {
    /// Stage the given paths.
    pub fn add<I, P>(&self, paths: I) -> Result<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut args: Vec<OsString> = vec!["add".into(), "--".into()];
        args.extend(paths.into_iter().map(|p| p.as_ref().as_os_str().to_os_string()));
        self.run_git(args)
    }

    /// Stage all changes, additions and deletions included.
    pub fn add_all(&self) -> Result<String> {
        self.run_git(["add", "-A"])
    }

    pub fn remove<I, P>(&self, paths: I, options: &RemoveOptions) -> Result<String>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut args: Vec<OsString> = vec!["rm".into()];
        if options.cached {
            args.push("--cached".into());
        }
        if options.recursive {
            args.push("-r".into());
        }
        if options.force {
            args.push("-f".into());
        }
        args.push("--".into());
        args.extend(paths.into_iter().map(|p| p.as_ref().as_os_str().to_os_string()));
        self.run_git(args)
    }

    pub fn commit(&self, message: &str, options: &CommitOptions) -> Result<String> {
        let mut args = vec!["commit".to_string()];
        if options.all {
            args.push("-a".into());
        }
        if options.amend {
            args.push("--amend".into());
        }
        if options.allow_empty {
            args.push("--allow-empty".into());
        }
        if let Some(author) = &options.author {
            args.push(format!("--author={author}"));
        }
        args.push("-m".into());
        args.push(message.to_string());
        self.run_git(args)
    }

    /// `git status`, machine readable when `porcelain` is set.
    pub fn status(&self, porcelain: bool) -> Result<String> {
        if porcelain {
            self.run_git(["status", "--porcelain"])
        } else {
            self.run_git(["status"])
        }
    }

    /// True when the working tree or index differs from HEAD.
    pub fn has_changes(&self) -> Result<bool> {
        Ok(!self.status(true)?.trim().is_empty())
    }

    /// Remove untracked files.
    pub fn clean(&self, options: &CleanOptions) -> Result<String> {
        let mut args = vec!["clean", "-f"];
        if options.directories {
            args.push("-d");
        }
        if options.ignored {
            args.push("-x");
        }
        if options.dry_run {
            args.push("-n");
        }
        self.run_git(args)
    }

    pub fn log(&self, options: &LogOptions) -> Result<String> {
        let mut args = vec!["log".to_string()];
        if let Some(n) = options.max_count {
            args.push(format!("--max-count={n}"));
        }
        if let Some(format) = &options.format {
            args.push(format!("--pretty={format}"));
        }
        if let Some(revision) = &options.revision {
            args.push(positional(revision)?.to_string());
        }
        if !options.paths.is_empty() {
            args.push("--".into());
            args.extend(options.paths.iter().cloned());
        }
        self.run_git(args)
    }

    /// Full hash of HEAD.
    pub fn head_commit(&self) -> Result<String> {
        Ok(self.run_git(["rev-parse", "HEAD"])?.trim().to_string())
    }
}
