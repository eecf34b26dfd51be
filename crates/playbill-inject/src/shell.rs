//! HTML shell template substitution.

/// Marker replaced with the page title.
pub const TITLE_MARKER: &str = "INSERT_TITLE";

/// Marker replaced with the splash image path.
pub const SPLASH_MARKER: &str = "INSERT_SPLASHSCREEN";

/// Marker replaced with the injection payload.
pub const CODE_MARKER: &str = "INSERT_CODE";

/// Title used when the configuration provides none.
pub const DEFAULT_TITLE: &str = "UNTITLED";

/// Errors substituting the shell template.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("shell template `{path}` has no INSERT_CODE marker; the runtime config would be dropped")]
    MissingCodeMarker { path: String },
}

/// Substitute the markers in a shell template.
///
/// Every occurrence of each marker is replaced. A template without the code
/// marker is rejected, since the page would silently ship without its runtime
/// configuration. The splash marker becomes empty when no splash is set.
pub fn render_shell(
    template: &str,
    template_path: &str,
    title: Option<&str>,
    splash: Option<&str>,
    payload: &str,
) -> Result<String, ShellError> {
    if !template.contains(CODE_MARKER) {
        return Err(ShellError::MissingCodeMarker {
            path: template_path.to_string(),
        });
    }

    Ok(template
        .replace(TITLE_MARKER, title.unwrap_or(DEFAULT_TITLE))
        .replace(SPLASH_MARKER, splash.unwrap_or(""))
        .replace(CODE_MARKER, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>INSERT_TITLE</title></head>
<body data-splash="INSERT_SPLASHSCREEN">
<script>
INSERT_CODE
</script>
</body>
</html>"#;

    #[test]
    fn replaces_all_markers() {
        let html = render_shell(
            TEMPLATE,
            "shell.html",
            Some("Asteroids"),
            Some("assets/splash.png"),
            "config = {};",
        )
        .unwrap();

        assert!(html.contains("<title>Asteroids</title>"));
        assert!(html.contains("data-splash=\"assets/splash.png\""));
        assert!(html.contains("config = {};"));
        assert!(!html.contains("INSERT_"));
    }

    #[test]
    fn missing_title_falls_back_to_untitled() {
        let html = render_shell(TEMPLATE, "shell.html", None, None, "x").unwrap();

        assert!(html.contains("<title>UNTITLED</title>"));
    }

    #[test]
    fn missing_splash_becomes_empty() {
        let html = render_shell(TEMPLATE, "shell.html", Some("T"), None, "x").unwrap();

        assert!(html.contains("data-splash=\"\""));
    }

    #[test]
    fn replaces_repeated_markers() {
        let template = "INSERT_TITLE / INSERT_TITLE\nINSERT_CODE";

        let html = render_shell(template, "shell.html", Some("A"), None, "x").unwrap();

        assert_eq!(html, "A / A\nx");
    }

    #[test]
    fn rejects_template_without_code_marker() {
        let result = render_shell("<html></html>", "shell.html", Some("T"), None, "x");

        assert!(matches!(
            result,
            Err(ShellError::MissingCodeMarker { path }) if path == "shell.html"
        ));
    }
}
