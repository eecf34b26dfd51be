//! External bundler handoff.
//!
//! Bundling itself — module resolution, minification, source maps — happens
//! outside this tool. The pipeline produces a [`BundlerPlan`] describing the
//! entries and output layout, and a [`Bundler`] implementation delivers it.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

/// Plan handed to the external bundler.
#[derive(Debug, Clone, Serialize)]
pub struct BundlerPlan {
    /// Bundler mode: `development` or `production`.
    pub mode: String,

    /// Entry name -> entry module paths.
    pub entries: IndexMap<String, Vec<String>>,

    /// Output directory shared with the staged pages and assets.
    pub output_dir: String,

    /// Script filename pattern under the output directory.
    pub script_filename: String,

    /// Whether split output was requested.
    pub split: bool,
}

/// Errors delivering a bundler plan.
#[derive(Debug, thiserror::Error)]
pub enum BundlerError {
    #[error("failed to write bundler plan {path}: {message}")]
    Write { path: String, message: String },
}

/// Delivery seam for the external bundler.
pub trait Bundler {
    /// Deliver the plan. Implementations do not bundle.
    fn dispatch(&self, plan: &BundlerPlan) -> Result<(), BundlerError>;
}

/// Writes the plan as `bundler-plan.json` into the output directory, where
/// the external bundler picks it up.
pub struct PlanWriter;

impl Bundler for PlanWriter {
    fn dispatch(&self, plan: &BundlerPlan) -> Result<(), BundlerError> {
        let path = Path::new(&plan.output_dir).join("bundler-plan.json");
        let json = serde_json::to_string_pretty(plan).map_err(|e| BundlerError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        fs::write(&path, json).map_err(|e| BundlerError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Wrote bundler plan to {}", path.display());
        Ok(())
    }
}
