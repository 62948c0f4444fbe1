//! Template directory orchestration
//!
//! [`TemplateDir::with`] is the main entry point of the crate. It
//! materializes a template source, checks out the requested reference,
//! validates the layout, and hands a usable [`TemplateDir`] to a
//! caller-supplied closure. A temporary working copy is released once the
//! closure returns, whatever path it takes — success, validation failure,
//! or checkout failure.
//!
//! Execution is single-threaded and strictly sequential: configuration
//! loading depends on a materialized working copy, so there is nothing to
//! overlap. The merged-configuration cache lives on the `TemplateDir` and
//! dies with it; every invocation re-derives it from scratch.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::cascade::ConfigCascade;
use crate::discover::{files_in_template, FileIndex};
use crate::error::Result;
use crate::git::Git;
use crate::layout::{self, MODULE_ROOT_DIR, MODULE_ROOT_INIT_DIR};
use crate::metadata;
use crate::render::{RenderJob, Renderer};
use crate::source::TemplateSource;
use crate::workcopy::WorkingCopy;

/// A validated, materialized template directory.
pub struct TemplateDir {
    source: TemplateSource,
    working_copy: WorkingCopy,
    cascade: ConfigCascade,
    init: bool,
}

impl TemplateDir {
    /// Materialize `source`, check out `ref_name` (defaulting to this
    /// build's release tag for git sources), validate the template layout,
    /// and run `work` against the resulting directory.
    ///
    /// `module_root` is the target module directory, consulted for the
    /// author's `.sync.yml` override; `module_metadata` is seeded into the
    /// merged configuration under the reserved key. With `init` set, the
    /// initialization-only root participates in file discovery.
    ///
    /// A template that is a local git work tree is used in place without a
    /// checkout; its current state is recorded for provenance metadata via
    /// `git describe` instead.
    pub fn with<T>(
        git: &dyn Git,
        source: TemplateSource,
        ref_name: Option<&str>,
        module_root: &Path,
        module_metadata: Value,
        init: bool,
        work: impl FnOnce(&mut TemplateDir) -> Result<T>,
    ) -> Result<T> {
        let mut source = source;
        let mut working_copy = WorkingCopy::acquire(git, &source)?;

        if ref_name.is_some() || source.is_git_addressable() {
            let requested = ref_name
                .map(str::to_string)
                .unwrap_or_else(TemplateSource::default_ref);
            if let Some(full_ref) = working_copy.checkout_ref(git, &requested)? {
                source.set_resolved_ref(full_ref);
            }
        }

        // A git work tree used in place has no checkout to record its state;
        // `git describe` identifies whatever the tree currently sits at.
        if source.resolved_ref().is_none()
            && !source.is_git_addressable()
            && git.is_repo(working_copy.root())
        {
            let described = git.describe(working_copy.root())?;
            if described.success() {
                source.set_resolved_ref(described.stdout.trim().to_string());
            }
        }

        layout::validate(working_copy.root(), &source)?;

        let cascade = ConfigCascade::new(working_copy.root(), module_root, module_metadata);
        let mut dir = TemplateDir {
            source,
            working_copy,
            cascade,
            init,
        };
        work(&mut dir)
        // `dir` drops here; a temporary working copy is removed with it.
    }

    /// Root path of the materialized working copy.
    pub fn root(&self) -> &Path {
        self.working_copy.root()
    }

    /// The template source this directory was materialized from.
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// The ordered template roots participating in discovery.
    fn template_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.working_copy.root().join(MODULE_ROOT_DIR)];
        if self.init {
            roots.push(self.working_copy.root().join(MODULE_ROOT_INIT_DIR));
        }
        roots
    }

    /// Discover every template file, keyed by relative output path.
    ///
    /// With `init`, files from `moduleroot_init/` replace same-named files
    /// from `moduleroot/`.
    pub fn files(&self) -> Result<FileIndex> {
        files_in_template(&self.template_roots())
    }

    /// The merged configuration document for one output file.
    pub fn config_for(&mut self, relative_path: &Path) -> Result<Value> {
        self.cascade.config_for(relative_path)
    }

    /// The full merged configuration, including the reserved
    /// `module_metadata` key.
    pub fn object_config(&mut self) -> Result<Mapping> {
        Ok(self.cascade.resolve_all()?.clone())
    }

    /// Provenance record for generated output.
    pub fn metadata(&self) -> Mapping {
        metadata::build_metadata(&self.source)
    }

    /// Render every discovered file through `renderer`, invoking `sink`
    /// with each completed job and its rendered content.
    ///
    /// Discovery and configuration resolution are joined here, one
    /// [`RenderJob`] per file.
    pub fn render(
        &mut self,
        renderer: &dyn Renderer,
        mut sink: impl FnMut(&RenderJob, String) -> Result<()>,
    ) -> Result<()> {
        for (relative_path, root) in self.files()? {
            let job = RenderJob {
                source_path: root.join(&relative_path),
                config: self.config_for(&relative_path)?,
                destination: relative_path,
            };
            let content = renderer.render(&job.source_path, &job.config)?;
            sink(&job, content)?;
        }
        Ok(())
    }
}
