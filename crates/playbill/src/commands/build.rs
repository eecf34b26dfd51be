//! Build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use playbill_build::{build_document, BuildOptions};
use playbill_config::Profile;

/// Run the build command.
pub async fn run(config: PathBuf, output: Option<PathBuf>, release: bool) -> Result<()> {
    let profile = if release {
        Profile::Release
    } else {
        Profile::Dev
    };

    tracing::info!("Building with {} profile...", profile.name());

    let root = config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let result = build_document(&config, BuildOptions {
        root,
        output,
        profile,
    })
    .await?;

    tracing::info!(
        "Built {} pages, staged {} files in {}ms",
        result.pages,
        result.staged_files,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
