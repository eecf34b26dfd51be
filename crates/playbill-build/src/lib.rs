//! Build pipeline for playbill.
//!
//! Stages assets, prepares per-target runtime configuration, writes the HTML
//! pages, and hands an entry plan to the external bundler.

pub mod assets;
pub mod bundler;
pub mod index_page;
pub mod pipeline;

pub use bundler::{Bundler, BundlerError, BundlerPlan, PlanWriter};
pub use pipeline::{build_document, BuildError, BuildOptions, BuildResult, Pipeline};
