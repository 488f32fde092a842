//! Tests for the process-wide git executable setting.
//!
//! These mutate global state, so every test here is serialized.

use gitwrap::command::{self, GitCommand};
use gitwrap::repo::{CloneOptions, Repository};
use gitwrap::GitError;
use serial_test::serial;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BOGUS_GIT: &str = "/definitely/not/installed/git";

/// Restores the platform default executable when dropped.
struct ExecutableGuard;

impl ExecutableGuard {
    fn set(path: &str) -> Self {
        command::set_git_executable(path);
        ExecutableGuard
    }
}

impl Drop for ExecutableGuard {
    fn drop(&mut self) {
        command::use_platform_default_executable();
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[test]
#[serial]
fn test_setting_round_trip() {
    let _guard = ExecutableGuard::set("/opt/git/bin/git");
    assert_eq!(command::git_executable(), PathBuf::from("/opt/git/bin/git"));
    assert_eq!(GitCommand::git().arg("status").display(), "/opt/git/bin/git status");

    command::use_platform_default_executable();
    assert_eq!(
        command::git_executable(),
        PathBuf::from(command::platform_default_executable())
    );
}

#[test]
#[serial]
fn test_missing_executable_is_unavailable() {
    let _guard = ExecutableGuard::set(BOGUS_GIT);
    assert!(!command::is_available());
}

#[test]
#[serial]
fn test_operations_use_configured_executable() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();
    let repo = Repository::open(temp.path()).unwrap();

    let _guard = ExecutableGuard::set(BOGUS_GIT);
    let err = repo.status(true).unwrap_err();
    match err {
        GitError::Spawn { command, .. } => assert!(command.starts_with(BOGUS_GIT)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
#[serial]
fn test_already_exists_runs_no_subprocess() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();

    // any subprocess would fail with Spawn instead
    let _guard = ExecutableGuard::set(BOGUS_GIT);
    let err = Repository::create_new(temp.path(), None, CloneOptions::default()).unwrap_err();
    assert!(matches!(err, GitError::AlreadyExists(_)));
}

#[test]
#[serial]
fn test_override_visible_with_empty_inherited_env() {
    let Some(git) = find_on_path(command::platform_default_executable()) else {
        eprintln!("Skipping: git not installed");
        return;
    };

    let ident = GitCommand::new(git)
        .args([OsStr::new("var"), OsStr::new("GIT_AUTHOR_IDENT")])
        .inherited_env(std::iter::empty::<(&str, &str)>())
        .envs([
            ("GIT_AUTHOR_NAME", "Empty Env"),
            ("GIT_AUTHOR_EMAIL", "empty@example.com"),
        ])
        .run()
        .unwrap();

    assert!(ident.starts_with("Empty Env <empty@example.com>"));
    assert!(!matches!(
        std::env::var("GIT_AUTHOR_EMAIL").as_deref(),
        Ok("empty@example.com")
    ));
}
