//! Command implementations for the modsync CLI

use clap::Args;
use serde_yaml::{Mapping, Value};

use modsync::error::Result;
use modsync::source::TemplateSource;

pub mod config;
pub mod fetch;
pub mod ls;

/// Arguments shared by every subcommand that materializes a template.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Template source: a git URL or a local template directory.
    ///
    /// Defaults to the built-in template repository.
    #[arg(long, value_name = "URL_OR_PATH", env = "MODSYNC_TEMPLATE")]
    pub template: Option<String>,

    /// Template reference to check out (branch, tag, or commit).
    #[arg(long = "ref", value_name = "REF")]
    pub template_ref: Option<String>,

    /// Target module directory, consulted for its .sync.yml override.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub module_dir: std::path::PathBuf,

    /// Include the initialization-only template root in discovery.
    #[arg(long)]
    pub init: bool,
}

impl SourceArgs {
    /// Resolve the source argument, falling back to the default template.
    pub fn source(&self) -> Result<TemplateSource> {
        match &self.template {
            Some(location) => TemplateSource::locate(location, true),
            None => Ok(TemplateSource::default_source()),
        }
    }

    /// Minimal module identity derived from the target directory name.
    pub fn module_metadata(&self) -> Value {
        let name = self
            .module_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut metadata = Mapping::new();
        metadata.insert(Value::String("name".to_string()), Value::String(name));
        Value::Mapping(metadata)
    }
}

fn print_yaml(value: &Mapping) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(value)?);
    Ok(())
}
