//! Build profiles.

use crate::document::ConfigDocument;
use crate::value::ConfigValue;

/// Build profile. Release hardens the configuration for shipping; dev keeps
/// the debugging conveniences on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Release,
}

impl Profile {
    pub fn is_release(self) -> bool {
        matches!(self, Self::Release)
    }

    /// Lowercase name, used for logging and the bundler plan.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Release => "release",
        }
    }

    /// Force the profile-dependent settings onto a document.
    ///
    /// Release disables the debug overlay, the FPS counter, cache busting,
    /// and URL-parameter overrides — in the global table and every target, so
    /// a per-target override cannot re-enable them. Dev disables split output,
    /// which is unsupported while watching.
    pub fn apply(self, doc: &mut ConfigDocument) {
        match self {
            Self::Release => {
                force_runtime_flag(doc, "rt_debug");
                force_runtime_flag(doc, "rt_showFPS");
                doc.build.cache_buster = false;
                doc.build.allow_url_search_params = false;
            }
            Self::Dev => {
                doc.build.split = false;
            }
        }
    }
}

fn force_runtime_flag(doc: &mut ConfigDocument, key: &str) {
    doc.config.insert(key.to_string(), ConfigValue::Bool(false));
    for target in doc.targets.values_mut() {
        if target.contains_key(key) {
            target.insert(key.to_string(), ConfigValue::Bool(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BuildSection;
    use crate::value::ConfigObject;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn doc() -> ConfigDocument {
        let mut config = ConfigObject::new();
        config.insert("rt_debug".to_string(), ConfigValue::Bool(true));
        config.insert("rt_title".to_string(), ConfigValue::String("T".into()));

        let mut target = ConfigObject::new();
        target.insert("rt_showFPS".to_string(), ConfigValue::Bool(true));

        let mut targets = IndexMap::new();
        targets.insert("game".to_string(), target);

        ConfigDocument {
            build: BuildSection {
                cache_buster: true,
                allow_url_search_params: true,
                split: true,
                ..Default::default()
            },
            config,
            targets,
        }
    }

    #[test]
    fn release_forces_flags_off() {
        let mut doc = doc();

        Profile::Release.apply(&mut doc);

        assert_eq!(doc.config["rt_debug"], ConfigValue::Bool(false));
        assert_eq!(doc.config["rt_showFPS"], ConfigValue::Bool(false));
        assert_eq!(doc.targets["game"]["rt_showFPS"], ConfigValue::Bool(false));
        assert!(!doc.build.cache_buster);
        assert!(!doc.build.allow_url_search_params);
        assert!(doc.build.split);
    }

    #[test]
    fn release_inserts_missing_flags() {
        let mut doc = doc();
        doc.config.shift_remove("rt_debug");

        Profile::Release.apply(&mut doc);

        assert_eq!(doc.config["rt_debug"], ConfigValue::Bool(false));
    }

    #[test]
    fn dev_only_disables_split() {
        let mut doc = doc();

        Profile::Dev.apply(&mut doc);

        assert_eq!(doc.config["rt_debug"], ConfigValue::Bool(true));
        assert!(doc.build.cache_buster);
        assert!(!doc.build.split);
    }
}
