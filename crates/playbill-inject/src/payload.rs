//! Injection payload rendering.
//!
//! The payload declares a function table, assigns the JSON-serialized
//! configuration to the well-known `config` variable, and ships a rewiring
//! routine that swaps every sentinel-marked string back to its table entry
//! once the page loads. Function source is carried verbatim from the build
//! configuration; this payload is the only place it is evaluated.

use serde::Serialize;

use playbill_config::value::object_to_json;
use playbill_config::{CallableTable, ConfigObject, ValueError};

/// Optional trailing snippets of the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadOptions {
    /// Let `?key=value` URL parameters override config fields at load time.
    pub allow_url_search_params: bool,

    /// Append a random query suffix to every binary path.
    pub cache_buster: bool,
}

/// Source of the routine that reconnects sentinel strings to the function
/// table. Walks the config object recursively; a string field counts as a
/// reconnection point solely by its `___` prefix.
const CONNECT_FUNCTIONS_SOURCE: &str = r#"function (obj) {
    for (var key in obj) {
        if (typeof obj[key] == "string" && obj[key].indexOf("___") === 0) {
            obj[key] = allFunctions[obj[key].replace("___", "")];
        }
        if (typeof obj[key] == "object")
            connectConfigToFunctions(obj[key]);
    }
}"#;

const URL_SEARCH_PARAMS_SNIPPET: &str = "const q = new URLSearchParams(location.search);\nfor (let key of q.keys()){ config[key] = q.get(key);};\n";

const CACHE_BUSTER_SNIPPET: &str = "for (let key in config.binary){ config.binary[key].path = config.binary[key].path+'?v='+Math.random();};\n";

/// Render the injection payload for an extracted configuration.
///
/// With an empty callable table the payload is the single `config` assignment;
/// otherwise the function table, the assignment, the rewiring routine, and its
/// invocation are emitted in that order. Option snippets follow at the end.
pub fn render_payload(
    config: &ConfigObject,
    callables: &CallableTable,
    options: PayloadOptions,
) -> Result<String, ValueError> {
    let json = object_to_json(config)?;
    let config_stmt = format!("\nconfig = {};\n", to_json_pretty(&json));

    let mut payload = String::new();

    if callables.is_empty() {
        payload.push_str(&config_stmt);
    } else {
        payload.push_str("\nlet allFunctions = {};\n");
        for (path, source) in callables {
            payload.push_str(&format!("allFunctions[{}] = {};\n", js_string(path), source));
        }
        payload.push_str(&config_stmt);
        payload.push_str("\nlet connectConfigToFunctions = ");
        payload.push_str(CONNECT_FUNCTIONS_SOURCE);
        payload.push_str(";\n");
        payload.push_str("\nconnectConfigToFunctions(config);\n");
    }

    if options.allow_url_search_params {
        payload.push_str(URL_SEARCH_PARAMS_SNIPPET);
    }
    if options.cache_buster {
        payload.push_str(CACHE_BUSTER_SNIPPET);
    }

    Ok(payload)
}

/// Serialize with four-space indentation, matching the loader's expectations
/// for the embedded config block.
fn to_json_pretty(value: &serde_json::Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .expect("serializing a Value to a buffer cannot fail");
    String::from_utf8(buf).expect("serde_json emits UTF-8")
}

/// Quote a table key as a JS string literal.
fn js_string(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbill_config::{extract_callables, ConfigValue};
    use pretty_assertions::assert_eq;

    fn config_with_callables() -> (ConfigObject, CallableTable) {
        let mut nested = ConfigObject::new();
        nested.insert(
            "onReady".to_string(),
            ConfigValue::Callable("function () { return 2; }".into()),
        );

        let mut config = ConfigObject::new();
        config.insert("title".to_string(), ConfigValue::String("T".into()));
        config.insert(
            "onLoad".to_string(),
            ConfigValue::Callable("function () { return 1; }".into()),
        );
        config.insert("nested".to_string(), ConfigValue::Object(nested));

        extract_callables(config).unwrap()
    }

    #[test]
    fn empty_table_emits_single_assignment() {
        let mut config = ConfigObject::new();
        config.insert("title".to_string(), ConfigValue::String("T".into()));

        let payload =
            render_payload(&config, &CallableTable::new(), PayloadOptions::default()).unwrap();

        assert_eq!(payload.matches("config = ").count(), 1);
        assert!(!payload.contains("allFunctions"));
        assert!(!payload.contains("connectConfigToFunctions"));
        assert!(payload.contains("\"title\": \"T\""));
    }

    #[test]
    fn function_table_precedes_config_and_rewiring_follows() {
        let (config, callables) = config_with_callables();

        let payload = render_payload(&config, &callables, PayloadOptions::default()).unwrap();

        let table_decl = payload.find("let allFunctions = {};").unwrap();
        let on_load = payload
            .find("allFunctions[\"onLoad\"] = function () { return 1; };")
            .unwrap();
        let nested = payload
            .find("allFunctions[\"nestedonReady\"] = function () { return 2; };")
            .unwrap();
        let config_stmt = payload.find("config = {").unwrap();
        let connect = payload.find("let connectConfigToFunctions = ").unwrap();
        let invoke = payload.find("connectConfigToFunctions(config);").unwrap();

        assert!(table_decl < on_load);
        assert!(on_load < nested);
        assert!(nested < config_stmt);
        assert!(config_stmt < connect);
        assert!(connect < invoke);
    }

    #[test]
    fn sentinels_appear_in_serialized_config() {
        let (config, callables) = config_with_callables();

        let payload = render_payload(&config, &callables, PayloadOptions::default()).unwrap();

        assert!(payload.contains("\"onLoad\": \"___onLoad\""));
        assert!(payload.contains("\"onReady\": \"___nestedonReady\""));
    }

    #[test]
    fn option_snippets_follow_rewiring_in_order() {
        let (config, callables) = config_with_callables();
        let options = PayloadOptions {
            allow_url_search_params: true,
            cache_buster: true,
        };

        let payload = render_payload(&config, &callables, options).unwrap();

        let invoke = payload.find("connectConfigToFunctions(config);").unwrap();
        let params = payload.find("new URLSearchParams").unwrap();
        let buster = payload.find("'?v='+Math.random()").unwrap();

        assert!(invoke < params);
        assert!(params < buster);
    }

    #[test]
    fn options_off_emit_no_snippets() {
        let (config, callables) = config_with_callables();

        let payload = render_payload(&config, &callables, PayloadOptions::default()).unwrap();

        assert!(!payload.contains("URLSearchParams"));
        assert!(!payload.contains("Math.random"));
    }

    #[test]
    fn config_json_is_indented_four_spaces() {
        let mut config = ConfigObject::new();
        config.insert("title".to_string(), ConfigValue::String("T".into()));

        let payload =
            render_payload(&config, &CallableTable::new(), PayloadOptions::default()).unwrap();

        assert!(payload.contains("{\n    \"title\": \"T\"\n}"));
    }
}
