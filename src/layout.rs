//! Template layout validation
//!
//! Runs immediately after a working copy is obtained and before any file
//! discovery or rendering. A usable template must be a directory containing
//! the two mandatory roots: `moduleroot/` (general scaffold files, kept in
//! sync on every update) and `moduleroot_init/` (files written only when a
//! module is first created).

use std::path::Path;

use crate::error::{Error, Result};
use crate::source::TemplateSource;

/// Primary template root; its files are managed on every sync.
pub const MODULE_ROOT_DIR: &str = "moduleroot";

/// Secondary template root; its files are only laid down at init time.
pub const MODULE_ROOT_INIT_DIR: &str = "moduleroot_init";

/// Assert that `root` holds a valid template layout.
///
/// Fails fast with `InvalidArgument` when `root` is not a directory or when
/// either mandatory root subdirectory is missing. A stale path left over
/// from the deprecated built-in template gets a distinct message steering
/// the user toward an explicit migration instead of the generic
/// "not a directory" diagnostic.
pub fn validate(root: &Path, source: &TemplateSource) -> Result<()> {
    if !root.is_dir() {
        if source.is_legacy_builtin() {
            return Err(Error::invalid_argument(format!(
                "The built-in template has substantially changed; '{}' is no longer provided. Please pin an explicit template source instead",
                source.location()
            )));
        }
        return Err(Error::invalid_argument(format!(
            "The specified template '{}' is not a directory",
            root.display()
        )));
    }

    if !root.join(MODULE_ROOT_DIR).is_dir() {
        return Err(Error::invalid_argument(format!(
            "The template at '{}' does not contain a '{}/' directory",
            root.display(),
            MODULE_ROOT_DIR
        )));
    }

    if !root.join(MODULE_ROOT_INIT_DIR).is_dir() {
        return Err(Error::invalid_argument(format!(
            "The template at '{}' does not contain a '{}/' directory",
            root.display(),
            MODULE_ROOT_INIT_DIR
        )));
    }

    Ok(())
}
