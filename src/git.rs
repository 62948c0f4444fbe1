//! Blocking git subprocess operations
//!
//! Template sources may be git-addressable, so the core needs a small set of
//! version-control operations: clone, cleanliness check, remote-reference
//! listing, hard reset, and describe. Each is a blocking call that captures
//! the subprocess exit status, stdout, and stderr; the caller decides
//! whether a non-zero status is fatal or downgraded to a warning.
//!
//! The operations live behind the [`Git`] trait so the working-copy logic
//! can be exercised in tests without a real repository. The production
//! implementation, [`SystemGit`], shells out to the system `git` binary,
//! which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Captured result of one git subprocess invocation.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    /// Process exit code; non-zero indicates failure.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl GitOutput {
    /// Whether the subprocess exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Version-control operations needed by the working-copy manager.
///
/// Every method is blocking. Methods that run a subprocess return the
/// captured [`GitOutput`] rather than interpreting the exit status
/// themselves, except for queries (`is_repo`, `work_tree_clean`) whose
/// answer is the interpretation.
pub trait Git {
    /// Clone `url` into `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<GitOutput>;

    /// Whether `path` is (inside) a git working tree.
    fn is_repo(&self, path: &Path) -> bool;

    /// Whether the working tree at `path` has no uncommitted changes to
    /// tracked files.
    fn work_tree_clean(&self, path: &Path) -> Result<bool>;

    /// Describe the current state of the repository at `path`
    /// (`git describe --all --long --always`).
    fn describe(&self, path: &Path) -> Result<GitOutput>;

    /// List remote references of `location` matching `ref_name`
    /// (`git ls-remote --refs`).
    fn ls_remote(&self, location: &str, ref_name: &str) -> Result<GitOutput>;

    /// Hard-reset the working tree at `path` to `full_ref`.
    fn reset_hard(&self, path: &Path, full_ref: &str) -> Result<GitOutput>;
}

/// Production [`Git`] implementation backed by the system `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let output = Command::new("git")
            .args(args)
            .output()
            .map_err(|e| Error::GitCommand {
                command: format!("git {}", args.join(" ")),
                stderr: e.to_string(),
            })?;

        Ok(GitOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Git for SystemGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<GitOutput> {
        self.run(&["clone", url, &dest.to_string_lossy()])
    }

    fn is_repo(&self, path: &Path) -> bool {
        let Ok(output) = self.run(&[
            "-C",
            &path.to_string_lossy(),
            "rev-parse",
            "--is-inside-work-tree",
        ]) else {
            return false;
        };
        output.success() && output.stdout.trim() == "true"
    }

    fn work_tree_clean(&self, path: &Path) -> Result<bool> {
        let path_str = path.to_string_lossy();
        let git_dir = path.join(".git");
        let output = self.run(&[
            "--work-tree",
            &path_str,
            "--git-dir",
            &git_dir.to_string_lossy(),
            "status",
            "--untracked-files=no",
            "--porcelain",
        ])?;

        if !output.success() {
            return Err(Error::GitCommand {
                command: format!("git status --porcelain ({})", path.display()),
                stderr: output.stderr,
            });
        }

        Ok(output.stdout.trim().is_empty())
    }

    fn describe(&self, path: &Path) -> Result<GitOutput> {
        let git_dir = path.join(".git");
        self.run(&[
            "--git-dir",
            &git_dir.to_string_lossy(),
            "describe",
            "--all",
            "--long",
            "--always",
        ])
    }

    fn ls_remote(&self, location: &str, ref_name: &str) -> Result<GitOutput> {
        self.run(&["ls-remote", "--refs", location, ref_name])
    }

    fn reset_hard(&self, path: &Path, full_ref: &str) -> Result<GitOutput> {
        self.run(&["-C", &path.to_string_lossy(), "reset", "--hard", full_ref])
    }
}

/// Extract the full commit identifier for `ref_name` from captured
/// `ls-remote --refs` output.
///
/// Output lines have the form `<sha>\t<ref>`. Branch heads are preferred
/// over other refs so that `main` resolves to `refs/heads/main` even when a
/// `refs/remotes/origin/main` line is also present. The fallback suffix
/// match only applies at a path-component boundary, so `main` never picks
/// up `refs/heads/foo-main`.
pub fn parse_ls_remote(stdout: &str, ref_name: &str) -> Option<String> {
    let mut fallback = None;

    for line in stdout.lines() {
        let mut parts = line.split('\t');
        let (Some(sha), Some(full_ref)) = (parts.next(), parts.next()) else {
            continue;
        };

        if full_ref == format!("refs/heads/{}", ref_name)
            || full_ref == format!("refs/tags/{}", ref_name)
        {
            return Some(sha.to_string());
        }

        if fallback.is_none() && full_ref.ends_with(&format!("/{}", ref_name)) {
            fallback = Some(sha.to_string());
        }
    }

    fallback
}
