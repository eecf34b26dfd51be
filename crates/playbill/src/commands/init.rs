//! Initialize a playbill project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing playbill...");

    // Create default build document
    let config_path = Path::new("playbill.toml");
    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG).context("Failed to write playbill.toml")?;
        tracing::info!("Created playbill.toml");
    } else {
        tracing::warn!("playbill.toml already exists. Use --yes to overwrite.");
        return Ok(());
    }

    // Create shell template
    let shell_dir = Path::new("shell");
    if !shell_dir.exists() {
        fs::create_dir_all(shell_dir).context("Failed to create shell directory")?;
    }

    let shell_path = shell_dir.join("index.html");
    if !shell_path.exists() || yes {
        fs::write(&shell_path, DEFAULT_SHELL).context("Failed to write shell/index.html")?;
        tracing::info!("Created shell/index.html");
    }

    // Create resources directory
    let res_dir = Path::new("res");
    if !res_dir.exists() {
        fs::create_dir_all(res_dir).context("Failed to create res directory")?;
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'playbill build' to assemble the HTML shell.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Playbill build document

[build]
# Bundle entry; the runtime script is emitted as js/<entry_name>.js
entry_name = "main"
entry_path = "src/main.ts"

# HTML shell template with the INSERT_TITLE / INSERT_SPLASHSCREEN /
# INSERT_CODE markers
template = "shell/index.html"

# Output directory
output = "bin"

# Resource files staged into assets/ and listed under config.binary
resources = []

# Let ?key=value URL parameters override the runtime config (dev only)
allow_url_search_params = true

# Bust the browser cache for binary resources (dev only)
cache_buster = true

[config]
# Keys with the rt_ prefix are injected into the page; the rest stay
# build-time-only.
rt_title = "My Game"
rt_debug = true
rt_showFPS = true

# Callable fields use the explicit $js form:
# rt_onError = { "$js" = "function (e) { console.error(e); }" }

# Per-target overrides; each target builds one page.
# [targets.demo]
# rt_title = "Demo"
"#;

const DEFAULT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>INSERT_TITLE</title>
</head>
<body>
  <div id="splash" data-src="INSERT_SPLASHSCREEN"></div>
  <script>
INSERT_CODE
  </script>
  <script>
    var script = document.createElement("script");
    script.src = config.runtime;
    document.body.appendChild(script);
  </script>
</body>
</html>
"#;
