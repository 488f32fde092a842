//! Subprocess execution for git invocations.
//!
//! Every repository operation ends up here: a program, an argument vector, a
//! working directory and a set of environment overrides. The child always
//! receives an explicit environment built from a snapshot of the inherited
//! one plus the overrides, so the calling process's environment is never
//! touched. Arguments are handed to the OS as a vector and never pass through
//! a shell.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::RwLock;

use log::{debug, warn};

use crate::error::{GitError, Result};

/// Exit code a shell reports when the program does not exist.
#[cfg(windows)]
pub const COMMAND_NOT_FOUND: i32 = 9009;
#[cfg(not(windows))]
pub const COMMAND_NOT_FOUND: i32 = 127;

static GIT_EXECUTABLE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Bare executable name for the current platform.
pub fn platform_default_executable() -> &'static str {
    if cfg!(windows) {
        "git.exe"
    } else {
        "git"
    }
}

/// The executable used for every git invocation in this process.
pub fn git_executable() -> PathBuf {
    let guard = GIT_EXECUTABLE.read().unwrap_or_else(|e| e.into_inner());
    guard
        .clone()
        .unwrap_or_else(|| PathBuf::from(platform_default_executable()))
}

/// Point every subsequent invocation at `path` (absolute path or bare name).
pub fn set_git_executable(path: impl Into<PathBuf>) {
    let path = path.into();
    debug!("git executable set to {}", path.display());
    let mut guard = GIT_EXECUTABLE.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(path);
}

/// Reset the executable to the bare platform name, resolved through `PATH`.
pub fn use_platform_default_executable() {
    set_git_executable(platform_default_executable());
}

/// Check whether the configured git executable can be run.
pub fn is_available() -> bool {
    probe(&git_executable())
}

/// Run `program` with no arguments and judge availability from the result.
///
/// Only the command-not-found exit code (or a failure to spawn) counts as
/// unavailable. git itself exits nonzero when called without a subcommand,
/// which still means it is installed.
pub fn probe(program: &Path) -> bool {
    let result = Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(status) => status_means_available(status.code()),
        Err(e) => {
            debug!("probe of {} failed to spawn: {}", program.display(), e);
            false
        }
    }
}

fn status_means_available(code: Option<i32>) -> bool {
    code != Some(COMMAND_NOT_FOUND)
}

/// A single fully assembled invocation of an external program.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    overrides: BTreeMap<OsString, OsString>,
    inherited: Option<Vec<(OsString, OsString)>>,
}

impl GitCommand {
    /// Invocation of the configured git executable.
    pub fn git() -> Self {
        Self::new(git_executable())
    }

    /// Invocation of an arbitrary program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            overrides: BTreeMap::new(),
            inherited: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Layer overrides on top of the inherited environment. Later keys win.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        for (k, v) in vars {
            self.overrides
                .insert(k.as_ref().to_os_string(), v.as_ref().to_os_string());
        }
        self
    }

    /// Replace the snapshot of the inherited environment.
    ///
    /// By default the snapshot is taken from the current process when the
    /// command runs. Passing an empty iterator gives the child nothing but the
    /// overrides.
    pub fn inherited_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inherited = Some(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_os_string(), v.as_ref().to_os_string()))
                .collect(),
        );
        self
    }

    /// The environment the child will see: inherited snapshot ∪ overrides.
    pub fn environment(&self) -> BTreeMap<OsString, OsString> {
        let mut env: BTreeMap<OsString, OsString> = match &self.inherited {
            Some(vars) => vars.iter().cloned().collect(),
            None => std::env::vars_os().collect(),
        };
        env.extend(self.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    /// Human readable command line, for logs and error messages only.
    pub fn display(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(&arg.replace('\'', r"'\''"));
                line.push('\'');
            } else {
                line.push_str(&arg);
            }
        }
        line
    }

    /// Run to completion and return stdout.
    ///
    /// Blocks until the child exits. On a nonzero exit the error carries
    /// stderr followed by stdout, since some git commands report problems on
    /// stdout.
    pub fn run(&self) -> Result<String> {
        let line = self.display();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env_clear()
            .envs(self.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        debug!(
            "running '{}' in {}",
            line,
            self.cwd
                .as_deref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string())
        );

        let output = cmd.output().map_err(|source| GitError::Spawn {
            command: line.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            warn!("'{}' exited with {}", line, output.status);
            return Err(GitError::CommandFailed {
                command: line,
                status: output.status,
                message: format!("{stderr}\n{stdout}"),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Split command output into trimmed, non-empty lines.
pub fn output_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
