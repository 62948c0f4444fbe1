//! # modsync Library
//!
//! This library provisions and maintains the scaffolding of a software
//! module from a versioned, remotely-hosted template tree. It is designed
//! to be used by the `modsync` command-line tool but can also be integrated
//! into other applications that need template-driven module synchronization.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use modsync::git::SystemGit;
//! use modsync::render::PassthroughRenderer;
//! use modsync::source::TemplateSource;
//! use modsync::template_dir::TemplateDir;
//!
//! # fn main() -> modsync::error::Result<()> {
//! let source = TemplateSource::locate("https://github.com/example/templates.git", true)?;
//! let metadata = serde_yaml::from_str("name: foo-bar\nversion: 0.1.0")?;
//!
//! TemplateDir::with(&SystemGit, source, Some("main"), Path::new("."), metadata, false, |dir| {
//!     dir.render(&PassthroughRenderer, |job, content| {
//!         println!("would write {} ({} bytes)", job.destination.display(), content.len());
//!         Ok(())
//!     })
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - **Template source (`source`)**: the origin of the scaffold files,
//!   either a plain directory or a git-addressable location.
//! - **Working copy (`workcopy`)**: a local, possibly-temporary
//!   materialization of a source at a specific ref, released on every exit
//!   path.
//! - **Layout (`layout`)**: the two mandatory template roots, `moduleroot/`
//!   and `moduleroot_init/`, validated before anything else runs.
//! - **Discovery (`discover`)**: one mapping from relative output path to
//!   the root that supplies it, later roots winning on collision.
//! - **Cascade (`cascade`)**: three configuration layers deep-merged with
//!   sequence concatenation and `---` knockout semantics.
//! - **Rendering (`render`)**: an external engine invoked once per
//!   discovered file with its merged configuration document.
//!
//! ## Execution Flow
//!
//! `template_dir::TemplateDir::with` runs the phases strictly in sequence:
//!
//! 1. **Acquire**: reference a local directory, or clone a git source into
//!    a scoped temporary directory.
//! 2. **Checkout**: resolve the requested ref via `ls-remote` and
//!    hard-reset a clean working tree to it (a dirty tree is kept as-is
//!    with a warning).
//! 3. **Validate**: fail fast unless both template roots are present.
//! 4. **Discover + Resolve**: join the file index with the configuration
//!    cascade, one render job per file.
//! 5. **Release**: a temporary working copy is removed however the run
//!    ends.

pub mod cascade;
pub mod discover;
pub mod error;
pub mod git;
pub mod layout;
pub mod metadata;
pub mod render;
pub mod source;
pub mod template_dir;
pub mod workcopy;
