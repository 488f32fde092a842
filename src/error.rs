//! Error types for repository and command operations.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for gitwrap operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Errors raised while resolving repositories or running git
#[derive(Error, Debug)]
pub enum GitError {
    /// The path does not exist and could not be created
    #[error("Path does not exist: {}", .0.display())]
    PathDoesNotExist(PathBuf),

    /// The path exists but is a file or something else
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A directory without `.git` or a bare `config`
    #[error("No git repository found at '{}'", .0.display())]
    RepositoryNotFound(PathBuf),

    /// Creation was requested where a repository already lives
    #[error("A git repository already exists at '{}'", .0.display())]
    AlreadyExists(PathBuf),

    /// The `--reference` repository for a clone is not a repository
    #[error("Reference is not a git repository: {}", .0.display())]
    InvalidReference(PathBuf),

    /// The metadata directory of a repository could not be located
    #[error("Could not locate git directory for '{}'", .0.display())]
    GitDirNotFound(PathBuf),

    /// HEAD points at a commit instead of a branch
    #[error("HEAD is detached; no active branch")]
    DetachedHead,

    /// A ref, remote, refspec or URL that git would read as an option
    #[error("Argument would be read as an option by git: '{0}'")]
    OptionLikeArgument(String),

    /// The executable could not be started at all
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited nonzero; `message` holds stderr then stdout
    #[error("'{command}' failed ({status}): {message}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Captured output of a failed command, if this is one.
    pub fn command_output(&self) -> Option<&str> {
        match self {
            GitError::CommandFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}
