use super::{positional, Repository};
use crate::error::{GitError, Result};

/// Flags for [`Repository::checkout`].
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Create the branch before switching to it (`-b`).
    pub create: bool,
    /// Throw away local modifications (`-f`).
    pub force: bool,
}

/// Flags for [`Repository::merge`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Always create a merge commit (`--no-ff`).
    pub no_ff: bool,
    /// Refuse anything but a fast-forward (`--ff-only`).
    pub ff_only: bool,
    pub message: Option<String>,
}

/// Options for [`Repository::add_tag`].
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    /// Create an annotated tag with this message.
    pub message: Option<String>,
    /// Commit to tag instead of HEAD.
    pub target: Option<String>,
    /// Replace an existing tag of the same name.
    pub force: bool,
}

/// `*` marks the checked out branch, `+` one checked out in a linked worktree.
const BRANCH_MARKERS: [&str; 2] = ["* ", "+ "];

impl Repository {
    /// Create `name` at `start_point`, or at HEAD.
    pub fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<String> {
        let mut args = vec!["branch", positional(name)?];
        if let Some(start) = start_point {
            args.push(positional(start)?);
        }
        self.run_git(args)
    }

    /// Delete a branch; `force` also deletes unmerged branches.
    pub fn delete_branch(&self, name: &str, force: bool) -> Result<String> {
        let flag = if force { "-D" } else { "-d" };
        self.run_git(["branch", flag, positional(name)?])
    }

    /// Local branch names. With `strip_marker` the `* ` in front of the
    /// checked out branch (and `+ ` for other worktrees) is removed.
    pub fn branches(&self, strip_marker: bool) -> Result<Vec<String>> {
        let lines = self.run_git_lines(["branch"])?;
        Ok(strip_markers(lines, strip_marker))
    }

    /// Remote tracking branches, without the symbolic `HEAD -> ...` alias.
    pub fn remote_branches(&self, strip_marker: bool) -> Result<Vec<String>> {
        let lines = self
            .run_git_lines(["branch", "-r"])?
            .into_iter()
            .filter(|line| !line.contains("HEAD -> "))
            .collect();
        Ok(strip_markers(lines, strip_marker))
    }

    /// Name of the checked out branch.
    ///
    /// Returns [`GitError::DetachedHead`] when HEAD is detached. In a
    /// repository without commits the branch is not listed yet, so its name
    /// is read from HEAD directly.
    pub fn active_branch(&self) -> Result<String> {
        let lines = self.branches(false)?;
        match active_from_listing(&lines) {
            Some(active) => active,
            None => self.unborn_branch(),
        }
    }

    fn unborn_branch(&self) -> Result<String> {
        match self.run_git(["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(name) => Ok(name.trim().to_string()),
            // exit 1: HEAD is not a symbolic ref
            Err(GitError::CommandFailed { status, .. }) if status.code() == Some(1) => {
                Err(GitError::DetachedHead)
            }
            Err(e) => Err(e),
        }
    }

    pub fn checkout(&self, reference: &str, options: &CheckoutOptions) -> Result<String> {
        let mut args = vec!["checkout"];
        if options.force {
            args.push("-f");
        }
        if options.create {
            args.push("-b");
        }
        args.push(positional(reference)?);
        self.run_git(args)
    }

    pub fn merge(&self, reference: &str, options: &MergeOptions) -> Result<String> {
        let mut args = vec!["merge"];
        if options.no_ff {
            args.push("--no-ff");
        }
        if options.ff_only {
            args.push("--ff-only");
        }
        if let Some(message) = &options.message {
            args.push("-m");
            args.push(message);
        }
        args.push(positional(reference)?);
        self.run_git(args)
    }

    pub fn add_tag(&self, name: &str, options: &TagOptions) -> Result<String> {
        let mut args = vec!["tag"];
        if options.force {
            args.push("-f");
        }
        if let Some(message) = &options.message {
            args.push("-a");
            args.push("-m");
            args.push(message);
        }
        args.push(positional(name)?);
        if let Some(target) = &options.target {
            args.push(positional(target)?);
        }
        self.run_git(args)
    }

    pub fn tags(&self) -> Result<Vec<String>> {
        self.run_git_lines(["tag", "--list"])
    }
}

fn strip_markers(lines: Vec<String>, strip: bool) -> Vec<String> {
    if !strip {
        return lines;
    }
    lines
        .into_iter()
        .map(|line| {
            let stripped = BRANCH_MARKERS
                .iter()
                .find_map(|marker| line.strip_prefix(*marker))
                .map(|rest| rest.trim().to_string());
            stripped.unwrap_or(line)
        })
        .collect()
}

/// `None` when no line is marked active.
fn active_from_listing(lines: &[String]) -> Option<Result<String>> {
    let current = lines.iter().find(|line| line.starts_with('*'))?;

    let name = current.trim_start_matches('*').trim();
    // "(HEAD detached at 1a2b3c4)" or "(no branch, rebasing main)"
    if name.starts_with('(') {
        return Some(Err(GitError::DetachedHead));
    }
    Some(Ok(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support::{commit_file, init_repo};
    use tempfile::TempDir;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_markers() {
        let listing = lines(&["feature", "* main", "+ topic"]);
        assert_eq!(
            strip_markers(listing.clone(), true),
            vec!["feature", "main", "topic"]
        );
        assert_eq!(strip_markers(listing.clone(), false), listing);
    }

    #[test]
    fn test_active_from_listing() {
        let listing = lines(&["+ feature", "* main"]);
        assert_eq!(active_from_listing(&listing).unwrap().unwrap(), "main");

        let detached = lines(&["* (HEAD detached at 1a2b3c4)", "main"]);
        assert!(matches!(
            active_from_listing(&detached).unwrap(),
            Err(GitError::DetachedHead)
        ));

        assert!(active_from_listing(&[]).is_none());
        assert!(active_from_listing(&lines(&["+ feature"])).is_none());
    }

    #[test]
    fn test_active_branch_before_first_commit() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        assert!(repo.branches(false).unwrap().is_empty());

        let unborn = repo.active_branch().unwrap();
        assert!(!unborn.is_empty());

        commit_file(&repo, "a.txt", "a", "Initial");
        assert_eq!(repo.active_branch().unwrap(), unborn);
        assert_eq!(repo.branches(true).unwrap(), vec![unborn]);
    }

    #[test]
    fn test_linked_worktree_branch_marker_stripped() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(&temp.path().join("main"));
        commit_file(&repo, "a.txt", "a", "Initial");
        let linked = temp.path().join("linked");

        repo.run([
            std::ffi::OsStr::new("worktree"),
            std::ffi::OsStr::new("add"),
            std::ffi::OsStr::new("-b"),
            std::ffi::OsStr::new("side"),
            linked.as_os_str(),
        ])
        .unwrap();

        let branches = repo.branches(true).unwrap();
        assert!(branches.contains(&"side".to_string()));
        assert!(branches.iter().all(|b| !b.starts_with('+') && !b.starts_with('*')));
    }

    #[test]
    fn test_branch_lifecycle() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");

        let default = repo.active_branch().unwrap();
        assert!(default == "master" || default == "main");

        repo.create_branch("feature", None).unwrap();
        let branches = repo.branches(true).unwrap();
        assert!(branches.contains(&"feature".to_string()));
        assert!(branches.iter().all(|b| !b.contains('*')));
        assert!(branches.iter().all(|b| !b.is_empty()));

        let marked = repo.branches(false).unwrap();
        assert!(marked.contains(&format!("* {default}")));

        repo.checkout("feature", &CheckoutOptions::default()).unwrap();
        assert_eq!(repo.active_branch().unwrap(), "feature");

        repo.checkout(&default, &CheckoutOptions::default()).unwrap();
        repo.delete_branch("feature", false).unwrap();
        assert!(!repo.branches(true).unwrap().contains(&"feature".to_string()));
    }

    #[test]
    fn test_checkout_create() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");

        repo.checkout(
            "topic/new-thing",
            &CheckoutOptions {
                create: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(repo.active_branch().unwrap(), "topic/new-thing");
    }

    #[test]
    fn test_detached_head_reports_error() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let head = repo.head_commit().unwrap();

        repo.checkout(&head, &CheckoutOptions::default()).unwrap();
        assert!(matches!(
            repo.active_branch().unwrap_err(),
            GitError::DetachedHead
        ));
    }

    #[test]
    fn test_unmerged_branch_needs_force_delete() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let default = repo.active_branch().unwrap();

        repo.checkout(
            "wip",
            &CheckoutOptions {
                create: true,
                ..Default::default()
            },
        )
        .unwrap();
        commit_file(&repo, "b.txt", "b", "Work in progress");
        repo.checkout(&default, &CheckoutOptions::default()).unwrap();

        let err = repo.delete_branch("wip", false).unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert!(err.command_output().unwrap().contains("wip"));

        repo.delete_branch("wip", true).unwrap();
    }

    #[test]
    fn test_merge_fast_forward() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let default = repo.active_branch().unwrap();

        repo.checkout(
            "feature",
            &CheckoutOptions {
                create: true,
                ..Default::default()
            },
        )
        .unwrap();
        commit_file(&repo, "feature.txt", "f", "Feature work");
        repo.checkout(&default, &CheckoutOptions::default()).unwrap();
        assert!(!temp.path().join("feature.txt").exists());

        repo.merge(
            "feature",
            &MergeOptions {
                ff_only: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(temp.path().join("feature.txt").exists());
    }

    #[test]
    fn test_merge_no_ff_with_message() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let default = repo.active_branch().unwrap();

        repo.create_branch("side", None).unwrap();
        repo.checkout("side", &CheckoutOptions::default()).unwrap();
        commit_file(&repo, "side.txt", "s", "Side work");
        repo.checkout(&default, &CheckoutOptions::default()).unwrap();

        repo.merge(
            "side",
            &MergeOptions {
                no_ff: true,
                message: Some("Merge side branch".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let subject = repo
            .log(&crate::repo::LogOptions {
                max_count: Some(1),
                format: Some("format:%s".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(subject.trim(), "Merge side branch");
    }

    fn assert_option_like(result: Result<String>) {
        assert!(matches!(result, Err(GitError::OptionLikeArgument(_))));
    }

    #[test]
    fn test_option_like_refs_are_refused() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let head = repo.head_commit().unwrap();

        assert_option_like(repo.create_branch("--delete", None));
        assert_option_like(repo.create_branch("topic", Some("--orphan")));
        assert_option_like(repo.delete_branch("--all", true));
        assert_option_like(repo.checkout("--orphan=loose", &CheckoutOptions::default()));
        assert_option_like(repo.merge("--abort", &MergeOptions::default()));
        assert_option_like(repo.add_tag("--delete", &TagOptions::default()));
        assert_option_like(repo.add_tag(
            "v1",
            &TagOptions {
                target: Some("--contains".into()),
                ..Default::default()
            },
        ));

        assert!(repo.tags().unwrap().is_empty());
        assert!(!repo.branches(true).unwrap().contains(&"topic".to_string()));
        assert_eq!(repo.head_commit().unwrap(), head);
    }

    #[test]
    fn test_tags() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        commit_file(&repo, "a.txt", "a", "Initial");
        let first = repo.head_commit().unwrap();
        commit_file(&repo, "b.txt", "b", "Second");

        assert!(repo.tags().unwrap().is_empty());

        repo.add_tag("v0.1.0", &TagOptions::default()).unwrap();
        repo.add_tag(
            "v0.0.1",
            &TagOptions {
                message: Some("first cut".into()),
                target: Some(first.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        let tags = repo.tags().unwrap();
        assert_eq!(tags, vec!["v0.0.1", "v0.1.0"]);

        let tagged = repo.run(["rev-list", "-n", "1", "v0.0.1"]).unwrap();
        assert_eq!(tagged.trim(), first);

        let err = repo.add_tag("v0.1.0", &TagOptions::default()).unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
    }
}
