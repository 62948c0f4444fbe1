//! Rendering collaborator interface
//!
//! The templating syntax is not this crate's concern. The core hands each
//! discovered file, together with its merged configuration document, to an
//! external [`Renderer`]; what that renderer does with the file content is
//! up to it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::Result;

/// External template-rendering engine.
pub trait Renderer {
    /// Render the template file at `source_path` against `config`,
    /// producing the output text.
    fn render(&self, source_path: &Path, config: &Value) -> Result<String>;
}

/// One unit of rendering work: a discovered template file joined with its
/// merged configuration document. Ephemeral, rebuilt on every run.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Output path, relative to the target module root.
    pub destination: PathBuf,
    /// Absolute path of the template file supplying the content.
    pub source_path: PathBuf,
    /// Merged configuration document for this file.
    pub config: Value,
}

/// Renderer that emits template files verbatim, ignoring configuration.
///
/// Useful for templates with no substitutions and as a stand-in in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn render(&self, source_path: &Path, _config: &Value) -> Result<String> {
        Ok(fs::read_to_string(source_path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_renderer_returns_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# hello\n").unwrap();

        let rendered = PassthroughRenderer
            .render(&path, &Value::Null)
            .unwrap();
        assert_eq!(rendered, "# hello\n");
    }

    #[test]
    fn test_passthrough_renderer_missing_file_is_io_error() {
        let result = PassthroughRenderer.render(Path::new("/no/such/file"), &Value::Null);
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }
}
