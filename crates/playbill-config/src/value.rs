//! Configuration value tree.

use indexmap::IndexMap;

/// Table key that marks a TOML table as a callable value:
/// `on_error = { "$js" = "function (e) { ... }" }`.
pub const CALLABLE_KEY: &str = "$js";

/// Marker prefix for serialized callable references. The rewiring routine in
/// the injected payload recognizes reconnection points by this prefix.
pub const SENTINEL_PREFIX: &str = "___";

/// An ordered configuration table. Key order is the traversal order used when
/// building callable path keys, so it must survive loading and rebuilding.
pub type ConfigObject = IndexMap<String, ConfigValue>;

/// A configuration value.
///
/// `Callable` carries verbatim JS function source and only enters the tree
/// through the explicit `$js` table form. `CallableRef` replaces a callable
/// after extraction; it serializes to a sentinel string the injected rewiring
/// routine resolves back to the function table at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ConfigValue>),
    Object(ConfigObject),
    Callable(String),
    CallableRef(String),
}

/// Errors converting configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("`$js` form must be a table with a single string entry")]
    MalformedCallable,

    #[error("non-finite float values cannot be serialized")]
    NonFiniteFloat,

    #[error("callable field `{0}` was not extracted before serialization")]
    UnextractedCallable(String),
}

impl ConfigValue {
    /// Convert a raw TOML value, recognizing the `$js` callable form.
    pub fn from_toml(value: toml::Value) -> Result<Self, ValueError> {
        match value {
            toml::Value::Boolean(b) => Ok(Self::Bool(b)),
            toml::Value::Integer(i) => Ok(Self::Integer(i)),
            toml::Value::Float(f) => {
                if f.is_finite() {
                    Ok(Self::Float(f))
                } else {
                    Err(ValueError::NonFiniteFloat)
                }
            }
            toml::Value::String(s) => Ok(Self::String(s)),
            toml::Value::Datetime(dt) => Ok(Self::String(dt.to_string())),
            toml::Value::Array(items) => {
                let items = items
                    .into_iter()
                    .map(Self::from_toml)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Array(items))
            }
            toml::Value::Table(table) => Self::from_toml_table(table),
        }
    }

    fn from_toml_table(table: toml::Table) -> Result<Self, ValueError> {
        if table.contains_key(CALLABLE_KEY) {
            if table.len() != 1 {
                return Err(ValueError::MalformedCallable);
            }
            return match table.into_iter().next() {
                Some((_, toml::Value::String(source))) => Ok(Self::Callable(source)),
                _ => Err(ValueError::MalformedCallable),
            };
        }

        let mut object = ConfigObject::with_capacity(table.len());
        for (key, value) in table {
            object.insert(key, Self::from_toml(value)?);
        }
        Ok(Self::Object(object))
    }

    /// Render to a JSON value for the injection payload.
    ///
    /// `CallableRef` becomes the sentinel string; a remaining `Callable` means
    /// extraction did not run and is an error.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        match self {
            Self::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Self::Integer(i) => Ok(serde_json::Value::from(*i)),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or(ValueError::NonFiniteFloat),
            Self::String(s) => Ok(serde_json::Value::String(s.clone())),
            Self::Array(items) => {
                let items = items
                    .iter()
                    .map(Self::to_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(serde_json::Value::Array(items))
            }
            Self::Object(object) => object_to_json(object),
            Self::Callable(_) => Err(ValueError::UnextractedCallable(
                "<anonymous>".to_string(),
            )),
            Self::CallableRef(path) => Ok(serde_json::Value::String(format!(
                "{SENTINEL_PREFIX}{path}"
            ))),
        }
    }

    /// String view of this value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Bool view of this value, if it is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Render an ordered config table to a JSON object, preserving key order.
pub fn object_to_json(object: &ConfigObject) -> Result<serde_json::Value, ValueError> {
    let mut map = serde_json::Map::with_capacity(object.len());
    for (key, value) in object {
        let json = match value {
            ConfigValue::Callable(_) => {
                return Err(ValueError::UnextractedCallable(key.clone()))
            }
            other => other.to_json()?,
        };
        map.insert(key.clone(), json);
    }
    Ok(serde_json::Value::Object(map))
}
