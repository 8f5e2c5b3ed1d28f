//! Install step vocabulary
//!
//! Steps never call each other. They share state only through the
//! filesystem and report back to the orchestrator with a [`StepReport`].

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::layout::ToolchainLayout;
use crate::core::settings::ResolvedConfig;
use crate::infra::download::{DownloadManager, ProgressCallback};
use crate::infra::platform::Platform;
use crate::infra::process::{CommandSpec, ProcessRunner};

/// The install steps, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// git and a JDK on PATH
    Prerequisites,
    /// Shallow Flutter checkout
    Flutter,
    /// Android cmdline-tools (sdkmanager)
    CmdlineTools,
    /// SDK packages, licenses and Flutter configuration
    SdkPackages,
    /// MSVC build tools (Windows only)
    NativeToolchain,
}

impl StepKind {
    /// Fixed dependency order
    pub const ORDER: [StepKind; 5] = [
        StepKind::Prerequisites,
        StepKind::Flutter,
        StepKind::CmdlineTools,
        StepKind::SdkPackages,
        StepKind::NativeToolchain,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Prerequisites => "Prerequisites",
            Self::Flutter => "Flutter SDK",
            Self::CmdlineTools => "Android cmdline-tools",
            Self::SdkPackages => "Android SDK packages",
            Self::NativeToolchain => "MSVC Build Tools",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A failure that was tolerated and only noted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftWarning {
    pub message: String,
    /// Exact command or hint the operator can use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl SoftWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            remediation: None,
        }
    }

    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

impl std::fmt::Display for SoftWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Already satisfied, nothing done
    Skipped { reason: String },
    /// Work performed successfully
    Completed,
    /// Step could not finish but the run continues
    FailedSoft { message: String },
    /// Step failed and the run stopped here
    FailedFatal { message: String },
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FailedFatal { .. })
    }
}

/// Outcome plus any warnings noted on the way
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SoftWarning>,
}

impl StepReport {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            outcome: StepOutcome::Skipped {
                reason: reason.into(),
            },
            warnings: Vec::new(),
        }
    }

    pub fn completed() -> Self {
        Self {
            outcome: StepOutcome::Completed,
            warnings: Vec::new(),
        }
    }

    /// Soft failure of the whole step
    pub fn failed_soft(warning: SoftWarning) -> Self {
        Self {
            outcome: StepOutcome::FailedSoft {
                message: warning.message.clone(),
            },
            warnings: vec![warning],
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<SoftWarning>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Result of a best-effort command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Succeeded,
    Warned(SoftWarning),
}

/// Run `spec` without letting a failure escape
///
/// Spawn errors and non-zero exits both come back as [`Attempt::Warned`].
pub async fn attempt<R: ProcessRunner>(runner: &R, spec: &CommandSpec, what: &str) -> Attempt {
    match runner.run_checked(spec).await {
        Ok(_) => Attempt::Succeeded,
        Err(e) => {
            debug!(command = %spec, error = %e, "{what} failed, continuing");
            Attempt::Warned(SoftWarning::new(format!("{what} had warnings: {e}")))
        }
    }
}

/// Progress notifications for whoever renders the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent<'a> {
    StepStarted(StepKind),
    /// Human-readable note about what a step is doing
    Message(StepKind, &'a str),
    Warning(StepKind, &'a SoftWarning),
    DownloadProgress { downloaded: u64, total: u64 },
    StepFinished(StepKind, &'a StepOutcome),
}

/// Receives [`RunEvent`]s
pub type Observer = Arc<dyn Fn(&RunEvent<'_>) + Send + Sync>;

/// Everything a step may use
pub struct StepContext<'a, R> {
    pub config: &'a ResolvedConfig,
    pub layout: &'a ToolchainLayout,
    pub platform: &'a Platform,
    pub runner: &'a R,
    pub downloader: &'a DownloadManager,
    pub observer: Option<Observer>,
}

impl<R> StepContext<'_, R> {
    pub fn notify(&self, event: &RunEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    /// Log and report what `step` is doing
    pub fn say(&self, step: StepKind, message: &str) {
        info!(step = %step, "{message}");
        self.notify(&RunEvent::Message(step, message));
    }

    /// Soft warnings reach the operator through the observer, so the log
    /// record stays at INFO
    pub fn warn(&self, step: StepKind, warning: &SoftWarning) {
        info!(step = %step, "{}", warning.message);
        self.notify(&RunEvent::Warning(step, warning));
    }

    /// Download progress forwarded to the observer
    pub fn download_progress(&self) -> Option<ProgressCallback> {
        let observer = self.observer.clone()?;
        Some(Box::new(move |downloaded, total| {
            observer(&RunEvent::DownloadProgress { downloaded, total });
        }))
    }
}
