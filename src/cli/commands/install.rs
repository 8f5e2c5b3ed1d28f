//! CLI command for `devboot install`
//!
//! Runs every install step and renders progress as it happens.

use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::Workspace;
use crate::cli::output::{
    create_download_bar, create_spinner, is_json, is_quiet, print_detail, print_info, print_success,
    print_warning, status, verbosity,
};
use crate::core::orchestrator::{Orchestrator, RunReport};
use crate::core::step::{RunEvent, StepContext, StepKind, StepOutcome};
use crate::infra::download::DownloadManager;
use crate::infra::platform::Platform;
use crate::infra::process::SystemRunner;

/// Execute the install command
pub async fn execute(workspace: &Workspace, skip_native: bool) -> Result<()> {
    let config = workspace.config()?;
    let layout = workspace.layout();
    let platform = Platform::detect();
    let downloader = DownloadManager::new();
    // With -v the child output is echoed and a spinner would garble it
    let verbose = verbosity() > 0 && !is_quiet() && !is_json();
    let runner = SystemRunner::new(verbose);

    print_info(&format!("Tooling directory: {}", layout.root().display()));

    let renderer = Arc::new(Mutex::new(Renderer::new(!verbose)));
    let ctx = StepContext {
        config: &config,
        layout: &layout,
        platform: &platform,
        runner: &runner,
        downloader: &downloader,
        observer: Some(Arc::new(move |event: &RunEvent<'_>| {
            if let Ok(mut renderer) = renderer.lock() {
                renderer.handle(event);
            }
        })),
    };

    let mut report = Orchestrator::new(ctx).skip_native(skip_native).run().await;

    if is_json() {
        print_json(&report)?;
    }

    if let Some(fatal) = report.fatal.take() {
        return Err(fatal.into());
    }

    if !is_json() {
        print_summary(&report, &layout.flutter_executable(&platform), platform.is_windows());
    }
    Ok(())
}

fn print_json(report: &RunReport) -> Result<()> {
    let mut value = serde_json::to_value(report)?;
    if let Some(fatal) = &report.fatal {
        value["error"] = serde_json::Value::String(fatal.to_string());
        if let Some(remediation) = fatal.remediation() {
            value["remediation"] = serde_json::Value::String(remediation);
        }
    }
    let status = if report.succeeded() { "success" } else { "error" };
    value["status"] = serde_json::Value::String(status.to_string());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_summary(report: &RunReport, flutter: &Path, windows: bool) {
    let warnings: Vec<_> = report.warnings().collect();
    if !warnings.is_empty() && !is_quiet() {
        eprintln!();
        print_warning(&format!("Finished with {} warning(s):", warnings.len()));
        for (step, warning) in warnings {
            eprintln!("    {step}: {}", warning.message);
            if let Some(remediation) = &warning.remediation {
                eprintln!("      run: {remediation}");
            }
        }
    }

    if is_quiet() {
        return;
    }
    let flutter = flutter.display();
    println!();
    print_success("Bootstrap complete.");
    print_info("Next steps:");
    print_detail(&format!("{flutter} doctor -v"));
    print_detail(&format!("Android: {flutter} pub get && {flutter} build apk --release"));
    if windows {
        print_detail(&format!(
            "Windows: {flutter} config --enable-windows-desktop && {flutter} build windows --release"
        ));
    }
}

/// Turns run events into terminal output
struct Renderer {
    use_spinner: bool,
    spinner: Option<ProgressBar>,
    download: Option<ProgressBar>,
}

impl Renderer {
    fn new(use_spinner: bool) -> Self {
        Self {
            use_spinner: use_spinner && !is_quiet() && !is_json(),
            spinner: None,
            download: None,
        }
    }

    fn handle(&mut self, event: &RunEvent<'_>) {
        if is_quiet() || is_json() {
            return;
        }
        match event {
            RunEvent::StepStarted(step) => {
                if self.use_spinner {
                    self.spinner = Some(create_spinner(step.title()));
                }
            }
            RunEvent::Message(step, message) => match &self.spinner {
                Some(spinner) => spinner.set_message(format!("{step}: {message}")),
                None => print_detail(message),
            },
            RunEvent::Warning(_, warning) => {
                let print = || {
                    print_warning(&warning.message);
                    if let Some(remediation) = &warning.remediation {
                        eprintln!("    run: {remediation}");
                    }
                };
                match &self.spinner {
                    Some(spinner) => spinner.suspend(print),
                    None => print(),
                }
            }
            RunEvent::DownloadProgress { downloaded, total } => {
                if *total == 0 {
                    return;
                }
                let bar = self.download.get_or_insert_with(|| create_download_bar(*total));
                bar.set_position(*downloaded);
            }
            RunEvent::StepFinished(step, outcome) => {
                if let Some(bar) = self.download.take() {
                    bar.finish_and_clear();
                }
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
                print_outcome(*step, outcome);
            }
        }
    }
}

fn print_outcome(step: StepKind, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Skipped { reason } => println!("{} {step} ({reason})", status::SUCCESS),
        StepOutcome::Completed => println!("{} {step}", status::SUCCESS),
        StepOutcome::FailedSoft { message } => println!("{} {step}: {message}", status::WARNING),
        StepOutcome::FailedFatal { message } => eprintln!("{} {step}: {message}", status::ERROR),
    }
}
