//! Template file discovery
//!
//! Walks an ordered list of template root directories and produces one
//! mapping from relative output path to the root that supplies it. Later
//! roots override earlier ones on path collision, which is how
//! `moduleroot_init/` augments (or replaces) files from `moduleroot/` when
//! a module is first created.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Mapping from relative output path to the root directory supplying it.
pub type FileIndex = BTreeMap<PathBuf, PathBuf>;

/// Discover every template file under the given roots, in list order.
///
/// Hidden entries are included; directories themselves contribute nothing.
/// Fails with `InvalidArgument` if any listed root does not exist. An
/// existing but empty root simply contributes no entries.
pub fn files_in_template<P: AsRef<Path>>(dirs: &[P]) -> Result<FileIndex> {
    let mut index = FileIndex::new();

    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::invalid_argument(format!(
                "The directory '{}' doesn't exist",
                dir.display()
            )));
        }

        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            // Every walked path sits under `dir`, so the prefix strip
            // cannot fail.
            let relative = entry
                .path()
                .strip_prefix(dir)
                .expect("walked entry outside its root")
                .to_path_buf();

            // Last root wins on collision.
            index.insert(relative, dir.to_path_buf());
        }
    }

    Ok(index)
}
