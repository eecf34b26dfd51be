//! Inspect command: print what each target's page would receive.

use std::path::PathBuf;

use anyhow::Result;
use playbill_config::value::object_to_json;
use playbill_config::{extract_callables, project, ConfigDocument, Profile};

/// Run the inspect command.
///
/// Shows the projected configuration per target after profile forcing and
/// callable extraction — the same tree the build would inject, minus the
/// staged asset fields.
pub async fn run(config: PathBuf, release: bool) -> Result<()> {
    let profile = if release {
        Profile::Release
    } else {
        Profile::Dev
    };

    let mut doc = ConfigDocument::load(&config)?;
    profile.apply(&mut doc);

    for (name, target) in &doc.targets {
        let projected = project(&doc.config, target);
        let (projected, callables) = extract_callables(projected)?;

        let json = object_to_json(&projected)?;
        println!("### target `{name}` ({} profile)", profile.name());
        println!("{}", serde_json::to_string_pretty(&json)?);

        if !callables.is_empty() {
            println!("functions:");
            for (path, source) in &callables {
                println!("    {path}: {source}");
            }
        }
        println!();
    }

    Ok(())
}
