//! Working copy acquisition and ref checkout
//!
//! A [`WorkingCopy`] is the on-disk materialization of a
//! [`TemplateSource`](crate::source::TemplateSource). Plain directories are
//! referenced in place; git-addressable sources are cloned into a uniquely
//! named temporary directory that is exclusively owned by the current
//! operation and removed on every exit path (success, validation failure,
//! or checkout failure) via `Drop`.
//!
//! Ref checkout is deliberately lenient in one case: a working tree with
//! uncommitted changes is used as-is with a warning instead of being reset,
//! so a user's local template edits are never destroyed. A failing reset on
//! a clean tree is a fatal error carrying the captured stdout and stderr of
//! the git subprocess.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use crate::error::{Error, Result};
use crate::git::{parse_ls_remote, Git};
use crate::source::TemplateSource;

/// Prefix for the temporary clone directories.
const TMPDIR_PREFIX: &str = "modsync-templates-";

/// A materialized, on-disk instance of a template source.
#[derive(Debug)]
pub struct WorkingCopy {
    root: PathBuf,
    temporary: bool,
    clean: Option<bool>,
}

impl WorkingCopy {
    /// Materialize `source` on disk.
    ///
    /// Plain local directories are returned directly. Git-addressable
    /// sources are cloned into a fresh temporary directory; a clone that
    /// reports a non-zero exit status fails with a fatal error, and the
    /// temporary directory is removed before the error propagates.
    pub fn acquire(git: &dyn Git, source: &TemplateSource) -> Result<Self> {
        if !source.is_git_addressable() {
            return Ok(Self {
                root: PathBuf::from(source.location()),
                temporary: false,
                clean: None,
            });
        }

        let tmpdir = tempfile::Builder::new()
            .prefix(TMPDIR_PREFIX)
            .tempdir()?
            .into_path();

        // Constructed before the clone so the directory is released by Drop
        // on every failure path below.
        let copy = Self {
            root: tmpdir,
            temporary: true,
            clean: None,
        };

        let output = git.clone_repo(source.location(), &copy.root)?;
        if !output.success() {
            return Err(Error::GitClone {
                url: source.location().to_string(),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        debug!(
            "Cloned template repository {} into {}",
            source.location(),
            copy.root.display()
        );
        Ok(copy)
    }

    /// Absolute root path of the working copy.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether this copy was cloned into a scoped temporary directory.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Cleanliness of a work tree used in place, recorded during the last
    /// [`checkout_ref`](Self::checkout_ref). `None` until checkout has run,
    /// when the copy is not a git working tree, or for temporary clones,
    /// whose freshly created trees have no cleanliness to speak of.
    pub fn is_clean(&self) -> Option<bool> {
        self.clean
    }

    /// Resolve `ref_name` to a full commit identifier and hard-reset the
    /// working copy to it.
    ///
    /// Returns the full resolved ref, or `None` when no reset happened:
    /// either the copy is not a git repository (directory-mode templates
    /// have no ref) or the working tree has uncommitted changes, in which
    /// case a warning is emitted and the tree is used as-is.
    pub fn checkout_ref(&mut self, git: &dyn Git, ref_name: &str) -> Result<Option<String>> {
        if !git.is_repo(&self.root) {
            return Ok(None);
        }

        let clean = git.work_tree_clean(&self.root)?;
        if !self.temporary {
            self.clean = Some(clean);
        }
        if !clean {
            warn!(
                "Uncommitted changes found when attempting to set HEAD of git repository at '{}'; skipping git reset",
                self.root.display()
            );
            return Ok(None);
        }

        let location = self.root.to_string_lossy().into_owned();
        let listing = git.ls_remote(&location, ref_name)?;
        if !listing.success() {
            return Err(Error::GitCommand {
                command: format!("git ls-remote --refs {} {}", location, ref_name),
                stderr: listing.stderr,
            });
        }

        let full_ref =
            parse_ls_remote(&listing.stdout, ref_name).ok_or_else(|| Error::RefNotFound {
                path: location.clone(),
                ref_name: ref_name.to_string(),
            })?;

        let reset = git.reset_hard(&self.root, &full_ref)?;
        if !reset.success() {
            error!("{}", reset.stdout);
            error!("{}", reset.stderr);
            return Err(Error::GitReset {
                path: location,
                ref_name: ref_name.to_string(),
                stdout: reset.stdout,
                stderr: reset.stderr,
            });
        }

        Ok(Some(full_ref))
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if !self.temporary {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.root) {
            // Cleanup runs on normal control flow only; an already-missing
            // directory or an interrupted process is not worth failing over.
            debug!(
                "Failed to remove temporary working copy {}: {}",
                self.root.display(),
                e
            );
        }
    }
}
