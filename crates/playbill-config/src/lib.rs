//! Configuration model for playbill.
//!
//! Loads the `playbill.toml` build document, applies dev/release profiles,
//! projects the runtime-relevant subset of the merged configuration, and
//! extracts callable-valued fields into a function table for HTML injection.

pub mod document;
pub mod extract;
pub mod profile;
pub mod project;
pub mod value;

pub use document::{BuildSection, ConfigDocument, DocumentError};
pub use extract::{extract_callables, CallableTable, ExtractError};
pub use profile::Profile;
pub use project::{project, RUNTIME_PREFIX};
pub use value::{ConfigObject, ConfigValue, ValueError, CALLABLE_KEY, SENTINEL_PREFIX};
