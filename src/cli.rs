//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// modsync - Provision and maintain module scaffolding from a versioned template tree
#[derive(Parser, Debug)]
#[command(name = "modsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Materialize and validate a template source, then print its provenance metadata
    Fetch(commands::fetch::FetchArgs),
    /// List the files a template would contribute to a module
    Ls(commands::ls::LsArgs),
    /// Print the merged configuration cascade, or the document for one file
    Config(commands::config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.command {
            Commands::Fetch(args) => commands::fetch::execute(args),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Config(args) => commands::config::execute(args),
        }
    }
}
