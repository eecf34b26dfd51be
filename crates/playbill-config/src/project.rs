//! Runtime projection of merged configuration.

use crate::value::ConfigObject;

/// Prefix marking configuration keys that are injected into the runtime, as
/// opposed to build-time-only settings.
pub const RUNTIME_PREFIX: &str = "rt_";

/// Project the runtime-relevant subset of a global and a per-target table.
///
/// Every `rt_`-prefixed key of `target` lands in the result with the prefix
/// stripped; `rt_`-prefixed global keys fill in the rest. Precedence is per
/// field — a key omitted in the target falls through to the global value on
/// its own, not as part of a block. Keys without the prefix never appear.
pub fn project(global: &ConfigObject, target: &ConfigObject) -> ConfigObject {
    let mut projected = ConfigObject::new();

    for (key, value) in target {
        if let Some(stripped) = key.strip_prefix(RUNTIME_PREFIX) {
            projected.insert(stripped.to_string(), value.clone());
        }
    }

    for (key, value) in global {
        if let Some(stripped) = key.strip_prefix(RUNTIME_PREFIX) {
            if !projected.contains_key(stripped) {
                projected.insert(stripped.to_string(), value.clone());
            }
        }
    }

    projected
}
