use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{Location, Repository};
use crate::error::{GitError, Result};

/// How [`Repository::open_with`] treats a path without a repository.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    create: bool,
    init: bool,
    bare: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenOptions {
    /// Open existing repositories only.
    pub fn new() -> Self {
        Self {
            create: false,
            init: true,
            bare: false,
        }
    }

    /// Accept (and create, if the parent exists) a location with no repository.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Run `git init` on newly accepted locations. On by default.
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    /// Newly accepted locations are bare repositories.
    pub fn bare(mut self, bare: bool) -> Self {
        self.bare = bare;
        self
    }
}

/// Options for [`Repository::create_new`].
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Create a bare repository.
    pub bare: bool,
    /// Local repository to borrow objects from (`--reference`). Remote
    /// sources only.
    pub reference: Option<PathBuf>,
    /// Environment overrides for the new handle and the clone itself.
    pub env: BTreeMap<String, String>,
}

impl Repository {
    /// Open an existing repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::new())
    }

    /// Resolve `path` to a repository, optionally creating one.
    ///
    /// A directory holding a `.git` entry (directory or pointer file) is a
    /// working tree; one whose `config` says `bare = true` is a bare
    /// repository. Anything else is only accepted when creation is requested.
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();

        let resolved = match path.canonicalize() {
            Ok(resolved) => resolved,
            Err(_) => {
                if options.create && parent_exists(path) {
                    fs::create_dir(path)?;
                    let resolved = path.canonicalize()?;
                    debug!("created {}", resolved.display());
                    return Self::accept_new(resolved, options);
                }
                return Err(GitError::PathDoesNotExist(path.to_path_buf()));
            }
        };

        if !resolved.is_dir() {
            return Err(GitError::NotADirectory(resolved));
        }

        if resolved.join(".git").exists() {
            return Ok(Self::from_parts(resolved, false));
        }
        if config_marks_bare(&resolved) {
            return Ok(Self::from_parts(resolved, true));
        }
        if options.create {
            return Self::accept_new(resolved, options);
        }

        Err(GitError::RepositoryNotFound(resolved))
    }

    /// Accept `path` as a location for a clone without running `git init`.
    pub fn vacant(path: impl AsRef<Path>, bare: bool) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().create(true).init(false).bare(bare))
    }

    fn accept_new(path: PathBuf, options: OpenOptions) -> Result<Self> {
        let repo = Self::from_parts(path, options.bare);
        if options.init {
            repo.init()?;
        }
        Ok(repo)
    }

    /// Create a repository at `path`, cloning `source` when given.
    ///
    /// Fails with [`GitError::AlreadyExists`] before running anything if a
    /// repository is already there.
    pub fn create_new<'a>(
        path: impl AsRef<Path>,
        source: Option<Location<'a>>,
        options: CloneOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        if contains_repository(path) {
            return Err(GitError::AlreadyExists(path.to_path_buf()));
        }

        // init or clone runs after the overrides are attached
        let open_options = OpenOptions::new().create(true).bare(options.bare).init(false);
        let mut repo = Self::open_with(path, open_options)?;
        repo.env = options.env;

        match source {
            None => {
                repo.init()?;
            }
            Some(Location::Url(url)) => {
                repo.clone_remote(&url, options.reference.as_deref())?;
            }
            Some(local) => {
                if options.reference.is_some() {
                    warn!("--reference only applies to remote clones; ignoring it");
                }
                repo.clone_from_source(local)?;
            }
        }

        info!("created repository at {}", repo.path.display());
        Ok(repo)
    }

    /// `git init` at this location.
    pub fn init(&self) -> Result<String> {
        let mut args = vec!["init"];
        if self.bare {
            args.push("--bare");
        }
        self.run_git(args)
    }

    /// Directory holding the repository metadata.
    ///
    /// For worktrees and submodules `.git` is a file containing
    /// `gitdir: <path>`; relative pointers resolve against the repository.
    pub fn git_dir(&self) -> Result<PathBuf> {
        if self.bare {
            return Ok(self.path.clone());
        }

        let dot_git = self.path.join(".git");
        if dot_git.is_dir() {
            return Ok(dot_git);
        }
        if dot_git.is_file() {
            let content = fs::read_to_string(&dot_git)?;
            if let Some(pointer) = parse_gitdir_pointer(&content) {
                return Ok(self.path.join(pointer));
            }
        }

        Err(GitError::GitDirNotFound(self.path.clone()))
    }

    /// Contents of `<gitdir>/description`.
    pub fn description(&self) -> Result<String> {
        let path = self.git_dir()?.join("description");
        let content = fs::read_to_string(path)?;
        Ok(content.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        let path = self.git_dir()?.join("description");
        fs::write(path, description)?;
        Ok(())
    }
}

/// Whether `path` already holds a working tree or bare repository.
pub(super) fn contains_repository(path: &Path) -> bool {
    path.join(".git").exists() || config_marks_bare(path)
}

fn parent_exists(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) => parent.is_dir(),
        None => false,
    }
}

/// Look for `bare = true` in an INI-style `config` file.
fn config_marks_bare(dir: &Path) -> bool {
    let config = dir.join("config");
    if !config.is_file() {
        return false;
    }
    match fs::read_to_string(&config) {
        Ok(content) => parse_bare_flag(&content),
        Err(e) => {
            debug!("could not read {}: {}", config.display(), e);
            false
        }
    }
}

fn parse_bare_flag(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.split_once('='))
        .any(|(key, value)| {
            key.trim().eq_ignore_ascii_case("bare") && value.trim().eq_ignore_ascii_case("true")
        })
}

fn parse_gitdir_pointer(content: &str) -> Option<PathBuf> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("gitdir:"))
        .map(|p| PathBuf::from(p.trim()))
        .filter(|p| !p.as_os_str().is_empty())
}
