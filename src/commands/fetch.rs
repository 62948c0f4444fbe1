//! # Fetch Command Implementation
//!
//! Materializes the template source (cloning it when git-addressable),
//! checks out the requested reference, validates the layout, and prints the
//! provenance metadata that would be stamped into generated output. A safe,
//! read-only way to confirm a template is usable before syncing anything.

use anyhow::Result;
use clap::Args;

use modsync::git::SystemGit;
use modsync::template_dir::TemplateDir;

use super::{print_yaml, SourceArgs};

/// Materialize and validate a template source
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the `fetch` command.
pub fn execute(args: FetchArgs) -> Result<()> {
    let source = args.source.source()?;
    let metadata = TemplateDir::with(
        &SystemGit,
        source,
        args.source.template_ref.as_deref(),
        &args.source.module_dir,
        args.source.module_metadata(),
        args.source.init,
        |dir| Ok(dir.metadata()),
    )?;

    print_yaml(&metadata)
}
