//! # Config Command Implementation
//!
//! Resolves the three-layer configuration cascade (template defaults, site
//! defaults, module `.sync.yml`) and prints the result: either the merged
//! document for one output file, or the whole cascade including the
//! reserved `module_metadata` key.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use modsync::git::SystemGit;
use modsync::template_dir::TemplateDir;

use super::{print_yaml, SourceArgs};

/// Print the merged configuration cascade
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file to show the merged document for; omit for the full cascade.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the `config` command.
pub fn execute(args: ConfigArgs) -> Result<()> {
    let source = args.source.source()?;
    match args.file {
        Some(file) => {
            let document = TemplateDir::with(
                &SystemGit,
                source,
                args.source.template_ref.as_deref(),
                &args.source.module_dir,
                args.source.module_metadata(),
                args.source.init,
                |dir| dir.config_for(&file),
            )?;
            print!("{}", serde_yaml::to_string(&document)?);
        }
        None => {
            let merged = TemplateDir::with(
                &SystemGit,
                source,
                args.source.template_ref.as_deref(),
                &args.source.module_dir,
                args.source.module_metadata(),
                args.source.init,
                |dir| dir.object_config(),
            )?;
            print_yaml(&merged)?;
        }
    }

    Ok(())
}
