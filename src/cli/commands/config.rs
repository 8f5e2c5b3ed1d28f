//! CLI command for `devboot config`
//!
//! Prints the resolved configuration: defaults merged with the override file.

use anyhow::Result;

use super::Workspace;
use crate::cli::output::{is_json, is_quiet, print_info};
use crate::core::settings::ResolvedConfig;

/// Execute the config command
pub fn execute(workspace: &Workspace) -> Result<()> {
    let config = workspace.config()?;

    if is_json() {
        let json = serde_json::json!({
            "env_file": workspace.env_file,
            "env_file_found": workspace.env_file.is_file(),
            "tooling_dir": workspace.tooling_dir,
            "values": config,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }
    if is_quiet() {
        return Ok(());
    }

    let source = if workspace.env_file.is_file() {
        workspace.env_file.display().to_string()
    } else {
        format!("{} (not found, defaults only)", workspace.env_file.display())
    };
    print_info(&format!("Overrides: {source}"));
    print_info(&format!("Tooling directory: {}", workspace.tooling_dir.display()));
    println!();
    for (key, value) in config.iter() {
        let note = if ResolvedConfig::is_recognized(key) { "" } else { "  (unused)" };
        println!("{key}={value}{note}");
    }
    Ok(())
}
