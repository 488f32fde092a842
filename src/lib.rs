//! # gitwrap
//!
//! A thin, typed wrapper around the `git` command-line executable.
//!
//! ## Overview
//!
//! `gitwrap` does not implement any version-control logic itself. Every
//! operation builds an argument vector for the external `git` binary, runs it
//! in the repository directory and hands back what it printed. A nonzero exit
//! status becomes a [`GitError::CommandFailed`] carrying both output streams.
//!
//! ```no_run
//! use gitwrap::repo::{CommitOptions, OpenOptions, Repository};
//!
//! # fn main() -> gitwrap::Result<()> {
//! let mut repo = Repository::open_with("/tmp/scratch", OpenOptions::new().create(true))?;
//! repo.set_env("GIT_AUTHOR_NAME", "Robot");
//! std::fs::write(repo.path().join("notes.txt"), "hello")?;
//! repo.add(["notes.txt"])?;
//! repo.commit("Add notes", &CommitOptions::default())?;
//! println!("on branch {}", repo.active_branch()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - Repository resolution and one method per git operation ([`repo`])
//! - Subprocess execution and the process-wide executable setting ([`command`])
//! - Error taxonomy ([`error`])
//! - Settings, config directories and logging for the binary
//!   ([`settings`], [`config`], [`logger`])

/// Subprocess execution for git invocations.
///
/// Runs one child process per call with an explicit environment (inherited
/// snapshot plus overrides), captures stdout and stderr, and turns a nonzero
/// exit into an error. Also owns the process-wide git executable setting and
/// the availability probe.
pub mod command;

/// Platform-agnostic configuration directory management.
///
/// Locates the settings file and log file following platform conventions
/// (XDG on Linux, Application Support on macOS, AppData on Windows).
pub mod config;

/// Error types shared by the library.
pub mod error;

/// Logging configuration and utilities.
///
/// Console logging through `env_logger`, controlled by `RUST_LOG`, plus a
/// size-rotated log file in the config directory.
pub mod logger;

/// Repository handles.
///
/// Resolves a path to a working tree or bare repository and exposes add,
/// commit, branch, merge, fetch, push, pull, tag, log and friends.
pub mod repo;

/// Persistent settings for the command-line tool.
pub mod settings;

pub use error::{GitError, Result};
pub use repo::{Location, Repository};
