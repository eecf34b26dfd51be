//! HTML injection for playbill.
//!
//! Renders the runtime configuration payload — config JSON, function table,
//! and the rewiring routine that reconnects them in the browser — and
//! substitutes it into the game's HTML shell template.

pub mod payload;
pub mod shell;

pub use payload::{render_payload, PayloadOptions};
pub use shell::{render_shell, ShellError, CODE_MARKER, SPLASH_MARKER, TITLE_MARKER};
