//! Callable extraction.
//!
//! Splits a projected configuration into a JSON-serializable tree and a table
//! of the callable values it carried. The input is consumed and a new tree is
//! returned; nothing is mutated in place.

use indexmap::IndexMap;

use crate::value::{ConfigObject, ConfigValue};

/// Extracted callables, keyed by traversal path. Insertion order is the
/// depth-first traversal order of the source tree.
pub type CallableTable = IndexMap<String, String>;

/// Errors during callable extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("callable value inside array at `{path}` is not supported")]
    CallableInArray { path: String },
}

/// Extract every callable reachable through object-typed fields.
///
/// Each callable at key `k` under traversal path `p` is recorded under the
/// path key `pk` — parent keys concatenated without a separator — and replaced
/// by a `CallableRef` carrying the same key. Traversal descends objects only;
/// arrays are checked for stray callables and rejected, since a callable
/// inside an array has no reachable path.
///
/// Path keys from different nesting shapes can collide under this
/// concatenation scheme (`{a: {bc: f}}` and `{ab: {c: g}}` both yield `abc`);
/// the scheme is kept as-is for compatibility with existing loader payloads.
pub fn extract_callables(
    config: ConfigObject,
) -> Result<(ConfigObject, CallableTable), ExtractError> {
    let mut table = CallableTable::new();
    let config = walk_object(config, "", &mut table)?;
    Ok((config, table))
}

fn walk_object(
    object: ConfigObject,
    path: &str,
    table: &mut CallableTable,
) -> Result<ConfigObject, ExtractError> {
    let mut out = ConfigObject::with_capacity(object.len());

    for (key, value) in object {
        let replaced = match value {
            ConfigValue::Callable(source) => {
                let path_key = format!("{path}{key}");
                table.insert(path_key.clone(), source);
                ConfigValue::CallableRef(path_key)
            }
            ConfigValue::Object(inner) => {
                let child_path = format!("{path}{key}");
                ConfigValue::Object(walk_object(inner, &child_path, table)?)
            }
            ConfigValue::Array(items) => {
                reject_callables(&items, &format!("{path}{key}"))?;
                ConfigValue::Array(items)
            }
            other => other,
        };
        out.insert(key, replaced);
    }

    Ok(out)
}

fn reject_callables(items: &[ConfigValue], path: &str) -> Result<(), ExtractError> {
    if items.iter().any(contains_callable) {
        return Err(ExtractError::CallableInArray {
            path: path.to_string(),
        });
    }
    Ok(())
}

fn contains_callable(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Callable(_) => true,
        ConfigValue::Array(items) => items.iter().any(contains_callable),
        ConfigValue::Object(object) => object.values().any(contains_callable),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn callable(source: &str) -> ConfigValue {
        ConfigValue::Callable(source.to_string())
    }

    #[test]
    fn extracts_nested_callables_with_concatenated_paths() {
        let mut nested = ConfigObject::new();
        nested.insert("onReady".to_string(), callable("function () { return 2; }"));

        let mut config = ConfigObject::new();
        config.insert("onLoad".to_string(), callable("function () { return 1; }"));
        config.insert("nested".to_string(), ConfigValue::Object(nested));

        let (config, table) = extract_callables(config).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table["onLoad"], "function () { return 1; }");
        assert_eq!(table["nestedonReady"], "function () { return 2; }");

        assert_eq!(config["onLoad"], ConfigValue::CallableRef("onLoad".into()));
        let ConfigValue::Object(nested) = &config["nested"] else {
            panic!("expected object");
        };
        assert_eq!(
            nested["onReady"],
            ConfigValue::CallableRef("nestedonReady".into())
        );
    }

    #[test]
    fn callable_free_tree_is_unchanged() {
        let mut inner = ConfigObject::new();
        inner.insert("width".to_string(), ConfigValue::Integer(800));

        let mut config = ConfigObject::new();
        config.insert("title".to_string(), ConfigValue::String("T".into()));
        config.insert("viewport".to_string(), ConfigValue::Object(inner));

        let (extracted, table) = extract_callables(config.clone()).unwrap();

        assert!(table.is_empty());
        assert_eq!(extracted, config);
    }

    #[test]
    fn every_sentinel_decodes_to_a_table_key() {
        let mut deep = ConfigObject::new();
        deep.insert("a".to_string(), callable("function () {}"));
        deep.insert("b".to_string(), callable("function () {}"));

        let mut mid = ConfigObject::new();
        mid.insert("deep".to_string(), ConfigValue::Object(deep));
        mid.insert("c".to_string(), callable("function () {}"));

        let mut config = ConfigObject::new();
        config.insert("mid".to_string(), ConfigValue::Object(mid));

        let (config, table) = extract_callables(config).unwrap();

        assert_eq!(table.len(), 3);
        let json = crate::value::object_to_json(&config).unwrap();
        let mut sentinels = Vec::new();
        collect_sentinels(&json, &mut sentinels);
        assert_eq!(sentinels.len(), 3);
        for sentinel in sentinels {
            let key = sentinel.strip_prefix("___").unwrap();
            assert!(table.contains_key(key), "missing table key {key}");
        }
    }

    #[test]
    fn table_order_follows_traversal() {
        let mut nested = ConfigObject::new();
        nested.insert("second".to_string(), callable("function () {}"));

        let mut config = ConfigObject::new();
        config.insert("first".to_string(), callable("function () {}"));
        config.insert("group".to_string(), ConfigValue::Object(nested));
        config.insert("third".to_string(), callable("function () {}"));

        let (_, table) = extract_callables(config).unwrap();
        let keys: Vec<_> = table.keys().cloned().collect();

        assert_eq!(keys, vec!["first", "groupsecond", "third"]);
    }

    #[test]
    fn rejects_callable_inside_array() {
        let mut config = ConfigObject::new();
        config.insert(
            "handlers".to_string(),
            ConfigValue::Array(vec![callable("function () {}")]),
        );

        let result = extract_callables(config);

        assert!(matches!(
            result,
            Err(ExtractError::CallableInArray { path }) if path == "handlers"
        ));
    }

    #[test]
    fn rejects_callable_inside_object_inside_array() {
        let mut item = ConfigObject::new();
        item.insert("cb".to_string(), callable("function () {}"));

        let mut config = ConfigObject::new();
        config.insert(
            "entries".to_string(),
            ConfigValue::Array(vec![ConfigValue::Object(item)]),
        );

        let result = extract_callables(config);

        assert!(matches!(result, Err(ExtractError::CallableInArray { .. })));
    }

    fn collect_sentinels(value: &serde_json::Value, out: &mut Vec<String>) {
        match value {
            serde_json::Value::String(s) if s.starts_with("___") => out.push(s.clone()),
            serde_json::Value::Object(map) => {
                for v in map.values() {
                    collect_sentinels(v, out);
                }
            }
            serde_json::Value::Array(items) => {
                for v in items {
                    collect_sentinels(v, out);
                }
            }
            _ => {}
        }
    }
}
