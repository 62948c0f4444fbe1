//! # Ls Command Implementation
//!
//! Lists every file the template would contribute to the target module,
//! one relative output path per line. With `--init`, files from the
//! initialization-only root are included (and replace same-named files
//! from the primary root).

use anyhow::Result;
use clap::Args;

use modsync::git::SystemGit;
use modsync::template_dir::TemplateDir;

use super::SourceArgs;

/// List the files a template would contribute
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also show which template root supplies each file.
    #[arg(long)]
    pub origins: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let source = args.source.source()?;
    let files = TemplateDir::with(
        &SystemGit,
        source,
        args.source.template_ref.as_deref(),
        &args.source.module_dir,
        args.source.module_metadata(),
        args.source.init,
        |dir| dir.files(),
    )?;

    for (relative_path, root) in &files {
        if args.origins {
            println!("{}\t{}", relative_path.display(), root.display());
        } else {
            println!("{}", relative_path.display());
        }
    }

    Ok(())
}
