//! Build pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use playbill_config::{
    extract_callables, project, ConfigDocument, ConfigObject, ConfigValue, DocumentError,
    ExtractError, Profile, ValueError,
};
use playbill_inject::{render_payload, render_shell, PayloadOptions, ShellError};

use crate::assets::{validate_sources, AssetError, AssetStager, BinaryRecord};
use crate::bundler::{Bundler, BundlerError, BundlerPlan, PlanWriter};
use crate::index_page::{render_index, TargetLink};

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Project root; source paths in the document resolve against it.
    pub root: PathBuf,

    /// Output directory override (defaults to the document's `build.output`).
    pub output: Option<PathBuf>,

    /// Build profile.
    pub profile: Profile,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of target pages written
    pub pages: usize,

    /// Number of distinct files staged into the output tree
    pub staged_files: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Bundler(#[from] BundlerError),

    #[error("Failed to render index page: {0}")]
    Index(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// One target to build.
#[derive(Debug)]
struct TargetJob {
    name: String,
    target: ConfigObject,
    resources: Vec<String>,
    assets: Vec<String>,
    template: String,
}

/// Build pipeline: stages assets, prepares per-target runtime configuration,
/// writes HTML pages, and emits the bundler plan.
pub struct Pipeline {
    doc: ConfigDocument,
    root: PathBuf,
    output_dir: PathBuf,
    profile: Profile,
}

impl Pipeline {
    /// Create a pipeline. The profile is applied to the document here, before
    /// anything is projected.
    pub fn new(mut doc: ConfigDocument, options: BuildOptions) -> Self {
        options.profile.apply(&mut doc);

        let output_dir = options
            .output
            .unwrap_or_else(|| options.root.join(&doc.build.output));

        Self {
            doc,
            root: options.root,
            output_dir,
            profile: options.profile,
        }
    }

    /// Run the build.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.doc.build.debug_config {
            tracing::debug!("global config used for build:");
            for (key, value) in &self.doc.config {
                tracing::debug!("    - config.{} = {:?}", key, value);
            }
        }

        let jobs = self.collect_jobs()?;

        // Every source path is checked before anything is written.
        self.validate(&jobs)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| BuildError::Write {
            path: self.output_dir.display().to_string(),
            message: e.to_string(),
        })?;

        // Staging runs sequentially so shared resources dedup across targets.
        let mut stager = AssetStager::new(&self.root, &self.output_dir);
        if let Some(builtins) = &self.doc.build.builtins_path {
            stager.stage_builtins(builtins)?;
        }
        if let Some(loader) = &self.doc.build.loader_template {
            stager.stage_loader(loader)?;
        }

        let mut staged: Vec<(TargetJob, Vec<BinaryRecord>)> = Vec::with_capacity(jobs.len());
        for job in jobs {
            let records = stager.stage_resources(&job.resources)?;
            stager.stage_assets(&job.assets)?;
            staged.push((job, records));
        }
        let staged_files = stager.staged_count();

        // Page preparation is independent per target.
        let multi = staged.len() > 1;
        let results: Vec<Result<TargetLink, BuildError>> = staged
            .par_iter()
            .map(|(job, records)| self.build_page(job, records, multi))
            .collect();

        let mut links = Vec::with_capacity(results.len());
        for result in results {
            links.push(result?);
        }

        if multi {
            let html = render_index(&self.site_title(), &links)
                .map_err(|e| BuildError::Index(e.to_string()))?;
            let index_path = self.output_dir.join("index.html");
            fs::write(&index_path, html).map_err(|e| BuildError::Write {
                path: index_path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        PlanWriter.dispatch(&self.bundler_plan())?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: links.len(),
            staged_files,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.output_dir.clone(),
        })
    }

    fn collect_jobs(&self) -> Result<Vec<TargetJob>, BuildError> {
        let mut jobs = Vec::with_capacity(self.doc.targets.len());

        for (name, target) in &self.doc.targets {
            jobs.push(TargetJob {
                name: name.clone(),
                target: target.clone(),
                resources: self.doc.resources_for(target)?,
                assets: self.doc.assets_for(target)?,
                template: self.doc.template_for(target)?,
            });
        }

        Ok(jobs)
    }

    fn validate(&self, jobs: &[TargetJob]) -> Result<(), BuildError> {
        let resources: Vec<String> = jobs.iter().flat_map(|j| j.resources.clone()).collect();
        let assets: Vec<String> = jobs.iter().flat_map(|j| j.assets.clone()).collect();
        let templates: Vec<String> = jobs.iter().map(|j| j.template.clone()).collect();

        validate_sources(
            &self.root,
            &resources,
            &assets,
            &templates,
            self.doc.build.builtins_path.as_deref(),
            self.doc.build.loader_template.as_deref(),
        )?;
        Ok(())
    }

    /// Prepare and write one target page.
    fn build_page(
        &self,
        job: &TargetJob,
        records: &[BinaryRecord],
        multi: bool,
    ) -> Result<TargetLink, BuildError> {
        let mut projected = project(&self.doc.config, &job.target);

        projected.insert(
            "binary".to_string(),
            ConfigValue::Array(records.iter().map(BinaryRecord::to_value).collect()),
        );

        // Staged asset fields are addressed relative to the output tree.
        for key in ["splash", "start"] {
            let prefixed = match projected.get(key) {
                Some(ConfigValue::String(s)) if !s.is_empty() => Some(format!("assets/{s}")),
                _ => None,
            };
            if let Some(path) = prefixed {
                projected.insert(key.to_string(), ConfigValue::String(path));
            }
        }

        projected.insert(
            "runtime".to_string(),
            ConfigValue::String(format!("js/{}.js", self.doc.build.entry_name)),
        );

        let title = projected
            .get("title")
            .and_then(ConfigValue::as_str)
            .map(str::to_string);
        let splash = projected
            .get("splash")
            .and_then(ConfigValue::as_str)
            .map(str::to_string);

        let (projected, callables) = extract_callables(projected)?;

        if self.doc.build.debug_config {
            tracing::debug!(
                "### {} config that will be injected:",
                title.as_deref().unwrap_or(&job.name)
            );
            for (key, value) in &projected {
                tracing::debug!("    - config.{} = {:?}", key, value);
            }
        }

        let options = PayloadOptions {
            allow_url_search_params: self.doc.build.allow_url_search_params,
            cache_buster: self.doc.build.cache_buster,
        };
        let payload = render_payload(&projected, &callables, options)?;

        let template_path = self.root.join(&job.template);
        let template = fs::read_to_string(&template_path).map_err(|e| BuildError::Read {
            path: template_path.display().to_string(),
            message: e.to_string(),
        })?;

        let html = render_shell(
            &template,
            &job.template,
            title.as_deref(),
            splash.as_deref(),
            &payload,
        )?;

        let page_name = if multi {
            format!("{}.html", job.name)
        } else {
            "index.html".to_string()
        };
        let page_path = self.output_dir.join(&page_name);
        fs::write(&page_path, html).map_err(|e| BuildError::Write {
            path: page_path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Built {}", page_path.display());

        Ok(TargetLink {
            title: title.unwrap_or_else(|| job.name.clone()),
            path: page_name,
        })
    }

    fn site_title(&self) -> String {
        self.doc
            .config
            .get("rt_title")
            .and_then(ConfigValue::as_str)
            .unwrap_or(self.doc.build.entry_name.as_str())
            .to_string()
    }

    fn bundler_plan(&self) -> BundlerPlan {
        let mut entries = indexmap::IndexMap::new();
        entries.insert(
            self.doc.build.entry_name.clone(),
            vec![self.doc.build.entry_path.clone()],
        );

        let mode = match self.profile {
            Profile::Dev => "development",
            Profile::Release => "production",
        };

        BundlerPlan {
            mode: mode.to_string(),
            entries,
            output_dir: self.output_dir.display().to_string(),
            script_filename: "js/[name].js".to_string(),
            split: self.doc.build.split,
        }
    }
}

/// Convenience entry: load a document and run a build.
pub async fn build_document(
    document_path: &Path,
    options: BuildOptions,
) -> Result<BuildResult, BuildError> {
    let doc = ConfigDocument::load(document_path)?;
    Pipeline::new(doc, options).build().await
}
