//! CLI command for `devboot status`
//!
//! Runs only the idempotency checks and reports what an install would do.

use anyhow::Result;

use super::Workspace;
use crate::cli::output::{is_json, is_quiet, print_detail, print_info, status};
use crate::core::orchestrator::Orchestrator;
use crate::core::step::StepContext;
use crate::infra::download::DownloadManager;
use crate::infra::platform::Platform;
use crate::infra::process::SystemRunner;

/// Execute the status command
pub async fn execute(workspace: &Workspace) -> Result<()> {
    let config = workspace.config()?;
    let layout = workspace.layout();
    let platform = Platform::detect();
    let runner = SystemRunner::new(false);
    let downloader = DownloadManager::new();
    let ctx = StepContext {
        config: &config,
        layout: &layout,
        platform: &platform,
        runner: &runner,
        downloader: &downloader,
        observer: None,
    };

    let statuses = Orchestrator::new(ctx).status().await;
    let pending = statuses.iter().filter(|s| !s.satisfied).count();

    if is_json() {
        let json = serde_json::json!({
            "host": platform.family(),
            "root": layout.root(),
            "complete": pending == 0,
            "steps": statuses,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }
    if is_quiet() {
        return Ok(());
    }

    print_info(&format!("Tooling directory: {}", layout.root().display()));
    println!();
    for step in &statuses {
        let mark = if step.satisfied { status::SUCCESS } else { status::ERROR };
        println!("  {mark} {}", step.step);
        print_detail(&step.detail);
    }
    println!();
    if pending == 0 {
        println!("{} Everything is installed", status::SUCCESS);
    } else {
        println!("{} {pending} step(s) pending; run `devboot install`", status::INFO);
    }
    Ok(())
}
