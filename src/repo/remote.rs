use std::ffi::OsString;
use std::path::Path;

use log::info;

use super::manager::contains_repository;
use super::{positional, Location, Repository};
use crate::error::{GitError, Result};

/// Options for [`Repository::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Remote name or URL; git's default when unset.
    pub remote: Option<String>,
    pub refspec: Option<String>,
    /// Fetch every configured remote (`--all`). Ignores `remote`.
    pub all: bool,
    pub tags: bool,
    pub prune: bool,
}

/// Options for [`Repository::push`].
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub remote: Option<String>,
    pub refspec: Option<String>,
    pub tags: bool,
    pub force: bool,
    /// Record the remote branch as upstream (`-u`).
    pub set_upstream: bool,
}

/// Options for [`Repository::pull`].
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    pub remote: Option<String>,
    pub refspec: Option<String>,
    pub rebase: bool,
}

impl Repository {
    /// Clone this repository into `target` and open the result.
    pub fn clone_to(&self, target: impl AsRef<Path>, bare: bool) -> Result<Repository> {
        // git runs inside this repository, so relative targets must not leak through
        let target = std::path::absolute(target.as_ref())?;
        if contains_repository(&target) {
            return Err(GitError::AlreadyExists(target));
        }

        let mut args: Vec<OsString> = vec!["clone".into(), "--local".into()];
        if bare {
            args.push("--bare".into());
        }
        args.push(self.path.as_os_str().to_os_string());
        args.push(target.as_os_str().to_os_string());
        self.run_git(args)?;

        info!("cloned {} to {}", self.path.display(), target.display());
        let mut cloned = Repository::open(&target)?;
        cloned.env = self.env.clone();
        Ok(cloned)
    }

    /// Fill this (empty) location with a clone of a local repository.
    pub fn clone_from_source<'a>(&self, source: impl Into<Location<'a>>) -> Result<String> {
        let source = source.into();
        if let Location::Url(url) = &source {
            return self.clone_remote(url, None);
        }
        self.ensure_vacant()?;

        let mut args: Vec<OsString> = vec!["clone".into(), "--local".into()];
        if self.bare {
            args.push("--bare".into());
        }
        args.push(source.to_arg());
        args.push(".".into());
        self.run_git(args)
    }

    /// Fill this (empty) location with a clone of `url`.
    ///
    /// `reference` must itself be a repository; its objects are borrowed
    /// through `--reference` instead of being downloaded again.
    pub fn clone_remote(&self, url: &str, reference: Option<&Path>) -> Result<String> {
        let url = positional(url)?;
        self.ensure_vacant()?;

        let mut args: Vec<OsString> = vec!["clone".into()];
        if self.bare {
            args.push("--bare".into());
        }
        if let Some(reference) = reference {
            let reference = Repository::open(reference)
                .map_err(|_| GitError::InvalidReference(reference.to_path_buf()))?;
            args.push("--reference".into());
            args.push(reference.path.as_os_str().to_os_string());
        }
        args.push(url.into());
        args.push(".".into());
        self.run_git(args)
    }

    fn ensure_vacant(&self) -> Result<()> {
        if contains_repository(&self.path) {
            return Err(GitError::AlreadyExists(self.path.clone()));
        }
        Ok(())
    }

    pub fn add_remote<'a>(&self, name: &str, location: impl Into<Location<'a>>) -> Result<String> {
        let location = location.into();
        if let Location::Url(url) = &location {
            positional(url)?;
        }
        let args: Vec<OsString> = vec![
            "remote".into(),
            "add".into(),
            positional(name)?.into(),
            location.to_arg(),
        ];
        self.run_git(args)
    }

    /// Configured remote names.
    pub fn remotes(&self) -> Result<Vec<String>> {
        self.run_git_lines(["remote"])
    }

    pub fn fetch(&self, options: &FetchOptions) -> Result<String> {
        let mut args = vec!["fetch".to_string()];
        if options.tags {
            args.push("--tags".into());
        }
        if options.prune {
            args.push("--prune".into());
        }
        if options.all {
            args.push("--all".into());
        } else {
            push_remote_and_refspec(
                &mut args,
                options.remote.as_deref(),
                options.refspec.as_deref(),
            )?;
        }
        self.run_git(args)
    }

    pub fn push(&self, options: &PushOptions) -> Result<String> {
        let mut args = vec!["push".to_string()];
        if options.tags {
            args.push("--tags".into());
        }
        if options.force {
            args.push("--force".into());
        }
        if options.set_upstream {
            args.push("-u".into());
        }
        push_remote_and_refspec(
            &mut args,
            options.remote.as_deref(),
            options.refspec.as_deref(),
        )?;
        self.run_git(args)
    }

    pub fn pull(&self, options: &PullOptions) -> Result<String> {
        let mut args = vec!["pull".to_string()];
        if options.rebase {
            args.push("--rebase".into());
        } else {
            args.push("--no-rebase".into());
        }
        push_remote_and_refspec(
            &mut args,
            options.remote.as_deref(),
            options.refspec.as_deref(),
        )?;
        self.run_git(args)
    }
}

/// A refspec is only meaningful after a remote, so it defaults to `origin`.
fn push_remote_and_refspec(
    args: &mut Vec<String>,
    remote: Option<&str>,
    refspec: Option<&str>,
) -> Result<()> {
    match (remote, refspec) {
        (Some(remote), Some(refspec)) => {
            args.push(positional(remote)?.to_string());
            args.push(positional(refspec)?.to_string());
        }
        (Some(remote), None) => args.push(positional(remote)?.to_string()),
        (None, Some(refspec)) => {
            args.push("origin".into());
            args.push(positional(refspec)?.to_string());
        }
        (None, None) => {}
    }
    Ok(())
}
