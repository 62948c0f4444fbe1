//! Configuration cascade resolution
//!
//! Three configuration layers drive rendering, in ascending priority:
//!
//! 1. `config_defaults.yml` — bundled with the template.
//! 2. `config_defaults_site.yml` — optional site-wide override, also
//!    supplied by the template.
//! 3. `.sync.yml` — optional per-module override living alongside the
//!    target module.
//!
//! The layers are deep-merged into one mapping keyed by output file path.
//! Mappings merge recursively, sequences concatenate in layer order, and a
//! later scalar wins. Within a sequence, an item beginning with the `---`
//! knockout prefix deletes the named literal from the accumulated result
//! instead of being appended; the marker itself never survives the merge.
//!
//! An absent file at any layer is an empty document, never an error. A
//! malformed `.sync.yml` is downgraded to a warning and treated as absent,
//! because it is user-editable state the tool should not block on; the
//! template-bundled and site layers are trusted and fail hard.
//!
//! The merged result is computed once per [`ConfigCascade`] and held as
//! request-scoped state, seeded with the reserved `module_metadata` key
//! carrying the caller-supplied module identity.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Template-bundled defaults file name.
pub const CONFIG_DEFAULTS_FILE: &str = "config_defaults.yml";

/// Optional template-supplied site override file name.
pub const CONFIG_DEFAULTS_SITE_FILE: &str = "config_defaults_site.yml";

/// Per-module synchronization override, maintained by the module author.
pub const MODULE_SYNC_FILE: &str = ".sync.yml";

/// Reserved top-level key carrying module identity/version metadata.
///
/// Always exactly the caller-supplied metadata object, never cascaded.
pub const MODULE_METADATA_KEY: &str = "module_metadata";

/// Sequence items starting with this prefix knock the named literal out of
/// the accumulated sequence instead of being appended.
pub const KNOCKOUT_PREFIX: &str = "---";

/// Deep-merge `overlay` into `base` following the cascade rules.
///
/// The match over document variants is exhaustive by construction: two
/// mappings union recursively, two sequences concatenate with knockout
/// handling, and any other combination (scalar over scalar, or a type
/// mismatch) lets the overlay win.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), merged_clone(value));
                    }
                }
            }
        }
        (Value::Sequence(base_seq), Value::Sequence(overlay_seq)) => {
            merge_sequences(base_seq, overlay_seq);
        }
        (base, overlay) => *base = merged_clone(overlay),
    }
}

/// Clone `value` with knockout markers resolved, for positions where no
/// earlier-layer counterpart exists. Keeps markers out of the final
/// document even when a whole subtree comes from a single layer.
fn merged_clone(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), merged_clone(v)))
                .collect(),
        ),
        Value::Sequence(items) => {
            let mut merged = Vec::new();
            merge_sequences(&mut merged, items);
            Value::Sequence(merged)
        }
        other => other.clone(),
    }
}

/// Append `overlay` items onto `base`, honoring knockout markers in order.
///
/// A knockout of a value that was never contributed, or of a value already
/// knocked out, is a silent no-op.
fn merge_sequences(base: &mut Vec<Value>, overlay: &[Value]) {
    for item in overlay {
        match knockout_target(item) {
            Some(target) => base.retain(|existing| existing.as_str() != Some(target)),
            None => base.push(merged_clone(item)),
        }
    }
}

fn knockout_target(item: &Value) -> Option<&str> {
    item.as_str()?.strip_prefix(KNOCKOUT_PREFIX)
}

/// Request-scoped resolver for the three-layer configuration cascade.
///
/// Holds the merged result for the lifetime of one run; it is recomputed
/// from scratch by constructing a fresh cascade, never mutated in place.
#[derive(Debug)]
pub struct ConfigCascade {
    template_root: PathBuf,
    module_root: PathBuf,
    module_metadata: Value,
    merged: Option<Mapping>,
}

impl ConfigCascade {
    /// Create a resolver for the template at `template_root`, with the
    /// module-level `.sync.yml` looked up under `module_root`.
    pub fn new(template_root: &Path, module_root: &Path, module_metadata: Value) -> Self {
        Self {
            template_root: template_root.to_path_buf(),
            module_root: module_root.to_path_buf(),
            module_metadata,
            merged: None,
        }
    }

    /// The full merged configuration, keyed by output file path plus the
    /// reserved `module_metadata` entry. Cached after the first call.
    pub fn resolve_all(&mut self) -> Result<&Mapping> {
        if self.merged.is_none() {
            self.merged = Some(self.compute()?);
        }
        // Populated just above.
        Ok(self.merged.as_ref().expect("cascade cache populated"))
    }

    /// The merged document for one output file.
    ///
    /// Files no layer mentions get an empty mapping, so rendering can treat
    /// every file uniformly. Repeated calls return the cached result
    /// without re-parsing any layer.
    pub fn config_for(&mut self, relative_path: &Path) -> Result<Value> {
        let key = Value::String(relative_path.to_string_lossy().into_owned());
        let merged = self.resolve_all()?;
        Ok(merged
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Value::Mapping(Mapping::new())))
    }

    fn compute(&self) -> Result<Mapping> {
        let defaults = self.load_trusted_layer(CONFIG_DEFAULTS_FILE)?;
        let site_defaults = self.load_trusted_layer(CONFIG_DEFAULTS_SITE_FILE)?;
        let module_override = self.load_module_override();

        let mut merged = Value::Mapping(Mapping::new());
        for layer in [defaults, site_defaults, module_override] {
            merge_values(&mut merged, &Value::Mapping(layer));
        }

        let Value::Mapping(mut merged) = merged else {
            unreachable!("merging mappings yields a mapping");
        };
        merged.insert(
            Value::String(MODULE_METADATA_KEY.to_string()),
            self.module_metadata.clone(),
        );
        Ok(merged)
    }

    /// Load a template-supplied layer. Absent is an empty document; a parse
    /// failure is an error, since the template itself is trusted.
    fn load_trusted_layer(&self, file_name: &str) -> Result<Mapping> {
        let path = self.template_root.join(file_name);
        if !path.is_file() {
            return Ok(Mapping::new());
        }

        let text = fs::read_to_string(&path)?;
        as_mapping(serde_yaml::from_str(&text)?).ok_or_else(|| {
            Error::invalid_argument(format!(
                "'{}' must contain a YAML mapping",
                path.display()
            ))
        })
    }

    /// Load the module author's `.sync.yml`. Absent, unreadable, or
    /// malformed all degrade to an empty document; the latter two warn.
    fn load_module_override(&self) -> Mapping {
        let path = self.module_root.join(MODULE_SYNC_FILE);
        if !path.is_file() {
            return Mapping::new();
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("'{}' is not readable; skipping: {}", path.display(), e);
                return Mapping::new();
            }
        };

        match serde_yaml::from_str::<Value>(&text).ok().and_then(as_mapping) {
            Some(mapping) => mapping,
            None => {
                warn!(
                    "'{}' is not a valid YAML file; continuing without it",
                    path.display()
                );
                Mapping::new()
            }
        }
    }
}

fn as_mapping(value: Value) -> Option<Mapping> {
    match value {
        Value::Mapping(map) => Some(map),
        Value::Null => Some(Mapping::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    mod merge_values_tests {
        use super::*;

        #[test]
        fn test_scalar_later_layer_wins() {
            let mut base = yaml("foo: 1");
            merge_values(&mut base, &yaml("foo: 2"));
            assert_eq!(base, yaml("foo: 2"));
        }

        #[test]
        fn test_mapping_keys_union() {
            let mut base = yaml("a: 1\nnested:\n  x: 1");
            merge_values(&mut base, &yaml("b: 2\nnested:\n  y: 2"));
            assert_eq!(base, yaml("a: 1\nb: 2\nnested:\n  x: 1\n  y: 2"));
        }

        #[test]
        fn test_sequences_concatenate() {
            let mut base = yaml("attr:\n  - val: 1");
            merge_values(&mut base, &yaml("attr:\n  - val: 2"));
            assert_eq!(base, yaml("attr:\n  - val: 1\n  - val: 2"));
        }

        #[test]
        fn test_type_mismatch_overlay_wins() {
            let mut base = yaml("foo:\n  bar: 1");
            merge_values(&mut base, &yaml("foo: scalar"));
            assert_eq!(base, yaml("foo: scalar"));
        }

        #[test]
        fn test_key_only_in_base_kept() {
            let mut base = yaml("keep: here");
            merge_values(&mut base, &yaml("other: too"));
            assert_eq!(base, yaml("keep: here\nother: too"));
        }

        #[test]
        fn test_knockout_removes_earlier_item() {
            let mut base = yaml("ko:\n  - valid\n  - removed");
            merge_values(&mut base, &yaml("ko:\n  - '---removed'"));
            assert_eq!(base, yaml("ko:\n  - valid"));
        }

        #[test]
        fn test_knockout_of_absent_value_is_noop() {
            let mut base = yaml("ko:\n  - valid");
            merge_values(&mut base, &yaml("ko:\n  - '---never-there'"));
            assert_eq!(base, yaml("ko:\n  - valid"));
        }

        #[test]
        fn test_double_knockout_is_noop() {
            let mut base = yaml("ko:\n  - valid\n  - removed");
            merge_values(
                &mut base,
                &yaml("ko:\n  - '---removed'\n  - '---removed'"),
            );
            assert_eq!(base, yaml("ko:\n  - valid"));
        }

        #[test]
        fn test_knockout_marker_never_survives_fresh_key() {
            // The key exists only in the overlay layer; the marker must
            // still be stripped from the result.
            let mut base = yaml("{}");
            merge_values(&mut base, &yaml("ko:\n  - kept\n  - '---kept'"));
            assert_eq!(base, yaml("ko: []"));
        }
    }

    mod cascade_tests {
        use super::*;

        const DEFAULTS: &str = "\
appveyor.yml:
  environment:
    GEM_VERSION: '~> 4.0'
foo:
  attr:
    - 1
  ko:
    - valid
    - removed
";

        const SITE: &str = "\
foo:
  attr:
    - 2
";

        const OVERRIDE: &str = "\
appveyor.yml:
  environment:
    GEM_VERSION: '~> 5.0'
foo:
  attr:
    - 3
  ko:
    - '---removed'
.project:
  delete: true
";

        fn metadata() -> Value {
            yaml("name: foo-bar\nversion: 0.1.0")
        }

        struct Fixture {
            template: tempfile::TempDir,
            module: tempfile::TempDir,
        }

        impl Fixture {
            fn new(defaults: Option<&str>, site: Option<&str>, sync: Option<&str>) -> Self {
                let template = tempfile::tempdir().unwrap();
                let module = tempfile::tempdir().unwrap();
                if let Some(text) = defaults {
                    fs::write(template.path().join(CONFIG_DEFAULTS_FILE), text).unwrap();
                }
                if let Some(text) = site {
                    fs::write(template.path().join(CONFIG_DEFAULTS_SITE_FILE), text).unwrap();
                }
                if let Some(text) = sync {
                    fs::write(module.path().join(MODULE_SYNC_FILE), text).unwrap();
                }
                Self { template, module }
            }

            fn cascade(&self) -> ConfigCascade {
                ConfigCascade::new(self.template.path(), self.module.path(), metadata())
            }
        }

        #[test]
        fn test_attr_concatenates_across_all_layers() {
            let fixture = Fixture::new(Some(DEFAULTS), Some(SITE), Some(OVERRIDE));
            let mut cascade = fixture.cascade();

            let foo = cascade.config_for(Path::new("foo")).unwrap();
            assert_eq!(foo["attr"], yaml("[1, 2, 3]"));
        }

        #[test]
        fn test_knockout_applied_from_module_layer() {
            let fixture = Fixture::new(Some(DEFAULTS), Some(SITE), Some(OVERRIDE));
            let mut cascade = fixture.cascade();

            let foo = cascade.config_for(Path::new("foo")).unwrap();
            assert_eq!(foo["ko"], yaml("[valid]"));
        }

        #[test]
        fn test_scalar_override_from_module_layer() {
            let fixture = Fixture::new(Some(DEFAULTS), Some(SITE), Some(OVERRIDE));
            let mut cascade = fixture.cascade();

            let appveyor = cascade.config_for(Path::new("appveyor.yml")).unwrap();
            assert_eq!(appveyor["environment"]["GEM_VERSION"], yaml("'~> 5.0'"));
        }

        #[test]
        fn test_reserved_keys_pass_through_untouched() {
            let fixture = Fixture::new(Some(DEFAULTS), Some(SITE), Some(OVERRIDE));
            let mut cascade = fixture.cascade();

            let project = cascade.config_for(Path::new(".project")).unwrap();
            assert_eq!(project, yaml("delete: true"));
        }

        #[test]
        fn test_module_metadata_seeded_verbatim() {
            let fixture = Fixture::new(Some(DEFAULTS), None, None);
            let mut cascade = fixture.cascade();

            let merged = cascade.resolve_all().unwrap();
            assert_eq!(merged[MODULE_METADATA_KEY], metadata());
        }

        #[test]
        fn test_absent_layers_are_empty_documents() {
            let fixture = Fixture::new(None, None, None);
            let mut cascade = fixture.cascade();

            let merged = cascade.resolve_all().unwrap().clone();
            // Only the reserved metadata key is present.
            assert_eq!(merged.len(), 1);
            assert!(merged.contains_key(MODULE_METADATA_KEY));
        }

        #[test]
        fn test_unknown_file_gets_empty_mapping() {
            let fixture = Fixture::new(Some(DEFAULTS), None, None);
            let mut cascade = fixture.cascade();

            let doc = cascade.config_for(Path::new("Gemfile")).unwrap();
            assert_eq!(doc, Value::Mapping(Mapping::new()));
        }

        #[test]
        #[serial]
        fn test_invalid_sync_yml_warns_and_falls_back() {
            testing_logger::setup();
            let fixture = Fixture::new(
                Some(DEFAULTS),
                Some(SITE),
                Some("appveyor.yml:\n  environment:\n    GEM_VERSION: \"~> 5.0\n"),
            );
            let mut cascade = fixture.cascade();

            // Identical to merging only defaults + site.
            let foo = cascade.config_for(Path::new("foo")).unwrap();
            assert_eq!(foo["attr"], yaml("[1, 2]"));
            assert_eq!(foo["ko"], yaml("[valid, removed]"));

            testing_logger::validate(|captured| {
                let warned = captured.iter().any(|entry| {
                    entry.level == log::Level::Warn
                        && entry.body.contains("not a valid YAML file")
                });
                assert!(warned, "expected a warning about the invalid .sync.yml");
            });
        }

        #[test]
        fn test_malformed_trusted_layer_is_an_error() {
            let fixture = Fixture::new(Some("defaults: [unclosed"), None, None);
            let mut cascade = fixture.cascade();

            assert!(matches!(cascade.resolve_all(), Err(Error::Yaml(_))));
        }

        #[test]
        fn test_result_cached_per_run() {
            let fixture = Fixture::new(Some(DEFAULTS), Some(SITE), Some(OVERRIDE));
            let mut cascade = fixture.cascade();

            let first = cascade.config_for(Path::new("foo")).unwrap();

            // Remove every input; the cached result must be unaffected.
            fs::remove_file(fixture.template.path().join(CONFIG_DEFAULTS_FILE)).unwrap();
            fs::remove_file(fixture.template.path().join(CONFIG_DEFAULTS_SITE_FILE)).unwrap();
            fs::remove_file(fixture.module.path().join(MODULE_SYNC_FILE)).unwrap();

            let second = cascade.config_for(Path::new("foo")).unwrap();
            assert_eq!(first, second);
        }
    }
}
