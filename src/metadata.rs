//! Provenance metadata for generated output
//!
//! Every generated module records where its scaffolding came from: the tool
//! version, the original template location, and the full reference the
//! working copy was reset to. The key names are kept compatible with the
//! `metadata.json` consumers that predate this tool.

use serde_yaml::{Mapping, Value};

use crate::source::TemplateSource;

/// Metadata key for the tool's own version string.
pub const TOOL_VERSION_KEY: &str = "pdk-version";

/// Metadata key for the original template location.
pub const TEMPLATE_URL_KEY: &str = "template-url";

/// Metadata key for the resolved template reference.
pub const TEMPLATE_REF_KEY: &str = "template-ref";

/// Placeholder ref for directory-mode sources, which have no reference.
const NO_REF: &str = "n/a";

/// The tool's version string.
pub fn version_string() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Build the provenance record stamped into generated output.
///
/// Has no failure modes: a source without a resolved reference (a plain
/// directory, or a skipped checkout) degrades to a placeholder field.
pub fn build_metadata(source: &TemplateSource) -> Mapping {
    let mut metadata = Mapping::new();
    metadata.insert(
        Value::String(TOOL_VERSION_KEY.to_string()),
        Value::String(version_string()),
    );
    metadata.insert(
        Value::String(TEMPLATE_URL_KEY.to_string()),
        Value::String(source.location().to_string()),
    );
    metadata.insert(
        Value::String(TEMPLATE_REF_KEY.to_string()),
        Value::String(source.resolved_ref().unwrap_or(NO_REF).to_string()),
    );
    metadata
}
