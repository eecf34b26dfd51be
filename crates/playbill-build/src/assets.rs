//! Asset staging.
//!
//! Copies built-ins, the loader script, and per-target resources and assets
//! into the output tree. Resources are deduplicated across targets by output
//! path and each produces a [`BinaryRecord`] for the runtime configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use playbill_config::{ConfigObject, ConfigValue};

/// A staged resource, as recorded under `binary` in the runtime config.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRecord {
    pub name: String,
    pub path: String,
    pub size: u64,
}

impl BinaryRecord {
    /// Config-tree form of the record.
    pub fn to_value(&self) -> ConfigValue {
        let mut object = ConfigObject::new();
        object.insert("name".to_string(), ConfigValue::String(self.name.clone()));
        object.insert("path".to_string(), ConfigValue::String(self.path.clone()));
        object.insert("size".to_string(), ConfigValue::Integer(self.size as i64));
        ConfigValue::Object(object)
    }
}

/// Errors during asset staging.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("invalid filename path for resource {0}")]
    MissingResource(String),

    #[error("invalid filename path for asset {0}")]
    MissingAsset(String),

    #[error("builtins directory not found: {0}")]
    MissingBuiltins(String),

    #[error("loader template not found: {0}")]
    MissingLoader(String),

    #[error("shell template not found: {0}")]
    MissingTemplate(String),

    #[error("failed to copy {path}: {message}")]
    Copy { path: String, message: String },

    #[error("failed to create {path}: {message}")]
    Create { path: String, message: String },
}

/// Stages files into the output tree.
pub struct AssetStager {
    root: PathBuf,
    output_dir: PathBuf,
    /// Output path -> source size, so shared resources copy once.
    copied: HashMap<String, u64>,
}

impl AssetStager {
    pub fn new(root: &Path, output_dir: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            copied: HashMap::new(),
        }
    }

    /// Number of distinct files staged so far.
    pub fn staged_count(&self) -> usize {
        self.copied.len()
    }

    /// Copy the built-ins directory to `assets/builtins/`.
    pub fn stage_builtins(&mut self, builtins: &str) -> Result<(), AssetError> {
        let source = self.root.join(builtins);
        if !source.is_dir() {
            return Err(AssetError::MissingBuiltins(source.display().to_string()));
        }

        let dest_root = self.output_dir.join("assets").join("builtins");
        for entry in WalkDir::new(&source).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&source).unwrap_or(path);
            let dest = dest_root.join(relative);
            copy_file(path, &dest)?;
            self.copied
                .insert(dest.display().to_string(), entry.metadata().map(|m| m.len()).unwrap_or(0));
        }

        tracing::debug!("Staged builtins from {}", source.display());
        Ok(())
    }

    /// Copy the runtime loader script into `js/`.
    pub fn stage_loader(&mut self, loader: &str) -> Result<(), AssetError> {
        let source = self.root.join(loader);
        if !source.is_file() {
            return Err(AssetError::MissingLoader(source.display().to_string()));
        }

        let name = file_name(&source);
        let dest = self.output_dir.join("js").join(&name);
        copy_file(&source, &dest)?;
        self.copied.insert(format!("js/{name}"), 0);

        Ok(())
    }

    /// Stage a target's resources into `assets/`, returning one record per
    /// resource. A resource already staged by an earlier target is not copied
    /// again but still yields a record with the original size.
    pub fn stage_resources(
        &mut self,
        resources: &[String],
    ) -> Result<Vec<BinaryRecord>, AssetError> {
        let mut records = Vec::with_capacity(resources.len());

        for resource in resources {
            let source = self.root.join(resource);
            let name = file_name(&source);
            let output_path = format!("assets/{name}");

            let size = match self.copied.get(&output_path) {
                Some(size) => *size,
                None => {
                    if !source.is_file() {
                        return Err(AssetError::MissingResource(source.display().to_string()));
                    }
                    let size = fs::metadata(&source)
                        .map_err(|e| AssetError::Copy {
                            path: source.display().to_string(),
                            message: e.to_string(),
                        })?
                        .len();
                    copy_file(&source, &self.output_dir.join(&output_path))?;
                    self.copied.insert(output_path.clone(), size);
                    size
                }
            };

            records.push(BinaryRecord {
                name,
                path: output_path,
                size,
            });
        }

        Ok(records)
    }

    /// Stage a target's plain assets into `assets/`.
    pub fn stage_assets(&mut self, assets: &[String]) -> Result<(), AssetError> {
        for asset in assets {
            let source = self.root.join(asset);
            let name = file_name(&source);
            let output_path = format!("assets/{name}");

            if self.copied.contains_key(&output_path) {
                continue;
            }
            if !source.is_file() {
                return Err(AssetError::MissingAsset(source.display().to_string()));
            }
            copy_file(&source, &self.output_dir.join(&output_path))?;
            let size = fs::metadata(&source).map(|m| m.len()).unwrap_or(0);
            self.copied.insert(output_path, size);
        }

        Ok(())
    }
}

/// Check every source path before any output is written, so a bad path fails
/// the build with nothing half-staged.
pub fn validate_sources(
    root: &Path,
    resources: &[String],
    assets: &[String],
    templates: &[String],
    builtins: Option<&str>,
    loader: Option<&str>,
) -> Result<(), AssetError> {
    for resource in resources {
        let path = root.join(resource);
        if !path.is_file() {
            return Err(AssetError::MissingResource(path.display().to_string()));
        }
    }
    for asset in assets {
        let path = root.join(asset);
        if !path.is_file() {
            return Err(AssetError::MissingAsset(path.display().to_string()));
        }
    }
    for template in templates {
        let path = root.join(template);
        if !path.is_file() {
            return Err(AssetError::MissingTemplate(path.display().to_string()));
        }
    }
    if let Some(builtins) = builtins {
        let path = root.join(builtins);
        if !path.is_dir() {
            return Err(AssetError::MissingBuiltins(path.display().to_string()));
        }
    }
    if let Some(loader) = loader {
        let path = root.join(loader);
        if !path.is_file() {
            return Err(AssetError::MissingLoader(path.display().to_string()));
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

fn copy_file(source: &Path, dest: &Path) -> Result<(), AssetError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| AssetError::Create {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    fs::copy(source, dest).map_err(|e| AssetError::Copy {
        path: source.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}
