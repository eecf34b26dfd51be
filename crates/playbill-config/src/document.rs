//! Build document loading (`playbill.toml`).

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::value::{ConfigObject, ConfigValue, ValueError};

/// Typed `[build]` section of the document.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Bundle entry name; also names the emitted runtime script.
    #[serde(default = "default_entry_name")]
    pub entry_name: String,

    /// Bundle entry module path.
    #[serde(default = "default_entry_path")]
    pub entry_path: String,

    /// HTML shell template with the injection markers.
    #[serde(default = "default_template")]
    pub template: String,

    /// Runtime loader script copied into `js/`.
    #[serde(default)]
    pub loader_template: Option<String>,

    /// Directory of built-in assets copied to `assets/builtins/`.
    #[serde(default)]
    pub builtins_path: Option<String>,

    /// Output directory.
    #[serde(default = "default_output")]
    pub output: String,

    /// Resource files staged into `assets/` and recorded under `binary`.
    #[serde(default)]
    pub resources: Vec<String>,

    /// Additional files staged into `assets/` without a record.
    #[serde(default)]
    pub assets: Vec<String>,

    /// Log every configuration key during the build.
    #[serde(default)]
    pub debug_config: bool,

    /// Append the cache-busting snippet to the injected payload.
    #[serde(default)]
    pub cache_buster: bool,

    /// Append the URL-parameter override snippet to the injected payload.
    #[serde(default)]
    pub allow_url_search_params: bool,

    /// Ask the bundler for split output.
    #[serde(default)]
    pub split: bool,
}

fn default_entry_name() -> String {
    "main".to_string()
}
fn default_entry_path() -> String {
    "src/main.ts".to_string()
}
fn default_template() -> String {
    "templates/index.html".to_string()
}
fn default_output() -> String {
    "bin".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            entry_name: default_entry_name(),
            entry_path: default_entry_path(),
            template: default_template(),
            loader_template: None,
            builtins_path: None,
            output: default_output(),
            resources: Vec::new(),
            assets: Vec::new(),
            debug_config: false,
            cache_buster: false,
            allow_url_search_params: false,
            split: false,
        }
    }
}

/// Raw document shape as parsed by serde; free-form tables stay as TOML until
/// converted into [`ConfigValue`] trees.
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    build: BuildSection,
    #[serde(default)]
    config: toml::Table,
    #[serde(default)]
    targets: IndexMap<String, toml::Table>,
}

/// A loaded build document: the typed build section, the global configuration
/// table, and one configuration table per build target.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    pub build: BuildSection,
    pub config: ConfigObject,
    pub targets: IndexMap<String, ConfigObject>,
}

/// Errors loading or interpreting the build document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for `{key}`: {source}")]
    Value {
        key: String,
        #[source]
        source: ValueError,
    },

    #[error("`{key}` must be an array of strings")]
    ExpectedStringList { key: String },

    #[error("`{key}` must be a string")]
    ExpectedString { key: String },
}

impl ConfigDocument {
    /// Load and validate a document from disk.
    ///
    /// A document without `[targets.*]` gets one implicit target named after
    /// the entry, so the build loop always has at least one page to produce.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|e| DocumentError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let raw: RawDocument = toml::from_str(&content).map_err(|e| DocumentError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDocument) -> Result<Self, DocumentError> {
        let config = convert_table(raw.config)?;

        let mut targets = IndexMap::with_capacity(raw.targets.len().max(1));
        for (name, table) in raw.targets {
            targets.insert(name, convert_table(table)?);
        }
        if targets.is_empty() {
            targets.insert(raw.build.entry_name.clone(), ConfigObject::new());
        }

        Ok(Self {
            build: raw.build,
            config,
            targets,
        })
    }

    /// Resource list for a target: the target's own `resources` key if set,
    /// otherwise the build section's.
    pub fn resources_for(&self, target: &ConfigObject) -> Result<Vec<String>, DocumentError> {
        prop_string_list(target, "resources", &self.build.resources)
    }

    /// Asset list for a target, with the same fallback rule as resources.
    pub fn assets_for(&self, target: &ConfigObject) -> Result<Vec<String>, DocumentError> {
        prop_string_list(target, "assets", &self.build.assets)
    }

    /// Shell template path for a target, falling back to the build section.
    pub fn template_for(&self, target: &ConfigObject) -> Result<String, DocumentError> {
        match target.get("template") {
            Some(ConfigValue::String(path)) => Ok(path.clone()),
            Some(_) => Err(DocumentError::ExpectedString {
                key: "template".to_string(),
            }),
            None => Ok(self.build.template.clone()),
        }
    }
}

fn convert_table(table: toml::Table) -> Result<ConfigObject, DocumentError> {
    let mut object = ConfigObject::with_capacity(table.len());
    for (key, value) in table {
        let converted = ConfigValue::from_toml(value).map_err(|source| DocumentError::Value {
            key: key.clone(),
            source,
        })?;
        object.insert(key, converted);
    }
    Ok(object)
}

fn prop_string_list(
    target: &ConfigObject,
    key: &str,
    fallback: &[String],
) -> Result<Vec<String>, DocumentError> {
    let Some(value) = target.get(key) else {
        return Ok(fallback.to_vec());
    };

    let ConfigValue::Array(items) = value else {
        return Err(DocumentError::ExpectedStringList {
            key: key.to_string(),
        });
    };

    items
        .iter()
        .map(|item| match item {
            ConfigValue::String(s) => Ok(s.clone()),
            _ => Err(DocumentError::ExpectedStringList {
                key: key.to_string(),
            }),
        })
        .collect()
}
