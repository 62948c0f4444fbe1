//! Template source location and normalization
//!
//! A template source is either a plain local directory or a git-addressable
//! location (remote URL, scp-style address, or a local directory that is
//! itself a git repository). The locator normalizes a user-supplied string
//! into a [`TemplateSource`] descriptor and resolves the built-in default
//! source when none is given. It performs no mutation of the filesystem;
//! materializing the source is the working-copy manager's job.

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

/// Default template repository used when the caller supplies no source.
pub const DEFAULT_TEMPLATE_URL: &str = "https://github.com/puppetlabs/pdk-templates";

/// Known identifiers of the deprecated built-in template.
///
/// Matched against the final path component of a source location. An
/// enumerated set rather than a wildcard pattern, so unrelated directories
/// that merely resemble the old cache path are not misclassified.
const LEGACY_TEMPLATE_NAMES: &[&str] = &["pdk-module-template", "pdk-default-template"];

/// Identity of a template origin.
///
/// Constructed once from user input (or the configured default) and
/// immutable thereafter, except for the resolved ref which is recorded
/// once a checkout has completed (or, for a work tree used in place, once
/// its current state has been described).
#[derive(Debug, Clone)]
pub struct TemplateSource {
    location: String,
    git_addressable: bool,
    resolved_ref: Option<String>,
}

impl TemplateSource {
    /// Normalize `location` into a template source descriptor.
    ///
    /// When `require_resolvable` is set, the caller's contract mandates a
    /// location that can actually identify a template: a parseable URL or an
    /// existing local path. Anything else fails with `InvalidArgument`,
    /// guarding against an arbitrary string being treated as a validated
    /// template identity.
    pub fn locate(location: &str, require_resolvable: bool) -> Result<Self> {
        let git_addressable = Self::detect_git_addressable(location);

        if require_resolvable && !git_addressable && !Path::new(location).exists() {
            return Err(Error::invalid_argument(format!(
                "'{}' must be a git URL or an existing template directory",
                location
            )));
        }

        Ok(Self {
            location: location.to_string(),
            git_addressable,
            resolved_ref: None,
        })
    }

    /// The built-in default template source.
    pub fn default_source() -> Self {
        Self {
            location: DEFAULT_TEMPLATE_URL.to_string(),
            git_addressable: true,
            resolved_ref: None,
        }
    }

    /// The ref fetched from the default source: the release tag matching
    /// this build of the tool.
    pub fn default_ref() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// The original location string (path or URL).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether this source must be cloned rather than used in place.
    pub fn is_git_addressable(&self) -> bool {
        self.git_addressable
    }

    /// The full reference the working copy was reset to, or the described
    /// state of a work tree used in place. `None` for plain directories
    /// with no git history, and until checkout has completed.
    pub fn resolved_ref(&self) -> Option<&str> {
        self.resolved_ref.as_deref()
    }

    pub(crate) fn set_resolved_ref(&mut self, full_ref: String) {
        self.resolved_ref = Some(full_ref);
    }

    /// Whether this location names the deprecated built-in template.
    pub fn is_legacy_builtin(&self) -> bool {
        Path::new(&self.location)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| LEGACY_TEMPLATE_NAMES.contains(&name))
    }

    fn detect_git_addressable(location: &str) -> bool {
        // Remote URLs: https://, ssh://, git://, file://
        if let Ok(url) = Url::parse(location) {
            if url.has_host() || url.scheme() == "file" {
                return true;
            }
        }

        // scp-style addresses: git@host:org/repo.git
        if !location.contains("://") && location.contains('@') && location.contains(':') {
            return true;
        }

        // A local bare repository must be cloned to get a working tree. A
        // local work tree (even one with a .git directory) is used in
        // place; the dirty-tree policy in the working-copy manager protects
        // the user's edits there.
        let path = Path::new(location);
        path.join("HEAD").is_file() && path.join("objects").is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locate_https_url() {
        let source = TemplateSource::locate("https://github.com/example/templates.git", false)
            .unwrap();
        assert!(source.is_git_addressable());
        assert_eq!(
            source.location(),
            "https://github.com/example/templates.git"
        );
        assert!(source.resolved_ref().is_none());
    }

    #[test]
    fn test_locate_scp_style_address() {
        let source = TemplateSource::locate("git@github.com:example/templates.git", false).unwrap();
        assert!(source.is_git_addressable());
    }

    #[test]
    fn test_locate_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            TemplateSource::locate(dir.path().to_str().unwrap(), false).unwrap();
        assert!(!source.is_git_addressable());
    }

    #[test]
    fn test_locate_local_work_tree_used_in_place() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let source = TemplateSource::locate(dir.path().to_str().unwrap(), false).unwrap();
        assert!(!source.is_git_addressable());
    }

    #[test]
    fn test_locate_local_bare_repository_is_git_addressable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::create_dir(dir.path().join("objects")).unwrap();
        let source = TemplateSource::locate(dir.path().to_str().unwrap(), false).unwrap();
        assert!(source.is_git_addressable());
    }

    #[test]
    fn test_locate_requires_resolvable_source() {
        let result = TemplateSource::locate("/no/such/template/path", true);
        assert!(matches!(
            result,
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_locate_unresolvable_allowed_when_not_required() {
        let source = TemplateSource::locate("/no/such/template/path", false).unwrap();
        assert!(!source.is_git_addressable());
    }

    #[test]
    fn test_default_source() {
        let source = TemplateSource::default_source();
        assert_eq!(source.location(), DEFAULT_TEMPLATE_URL);
        assert!(source.is_git_addressable());
    }

    #[test]
    fn test_legacy_builtin_detection() {
        let legacy =
            TemplateSource::locate("/opt/cache/pdk-module-template", false).unwrap();
        assert!(legacy.is_legacy_builtin());

        let current = TemplateSource::locate("/opt/cache/my-templates", false).unwrap();
        assert!(!current.is_legacy_builtin());
    }

    #[test]
    fn test_resolved_ref_recorded() {
        let mut source =
            TemplateSource::locate("https://github.com/example/templates.git", false).unwrap();
        source.set_resolved_ref("1234abcd".to_string());
        assert_eq!(source.resolved_ref(), Some("1234abcd"));
    }
}
