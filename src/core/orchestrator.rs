//! Install orchestration
//!
//! Runs the steps in [`StepKind::ORDER`], one after another. The first `Err`
//! stops the run; soft failures are recorded and the run continues.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::step::{RunEvent, SoftWarning, StepContext, StepKind, StepOutcome, StepReport};
use crate::core::steps::{cmdline_tools, flutter, native_toolchain, prerequisites, sdk_packages};
use crate::error::BootstrapError;
use crate::infra::filesystem;
use crate::infra::platform::HostFamily;
use crate::infra::process::ProcessRunner;

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: StepKind,
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SoftWarning>,
}

/// Everything that happened during one install run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub host: HostFamily,
    pub root: PathBuf,
    pub steps: Vec<StepRecord>,
    /// The error that stopped the run, if any
    #[serde(skip)]
    pub fatal: Option<BootstrapError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.fatal.is_none()
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// Every soft warning noted during the run, in order
    pub fn warnings(&self) -> impl Iterator<Item = (StepKind, &SoftWarning)> {
        self.steps
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| (r.step, w)))
    }
}

/// Result of a read-only idempotency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub step: StepKind,
    /// Whether an install run would skip this step
    pub satisfied: bool,
    pub detail: String,
}

pub struct Orchestrator<'a, R> {
    ctx: StepContext<'a, R>,
    skip_native: bool,
}

impl<'a, R: ProcessRunner> Orchestrator<'a, R> {
    pub fn new(ctx: StepContext<'a, R>) -> Self {
        Self {
            ctx,
            skip_native: false,
        }
    }

    /// Leave out the MSVC build tools step
    #[must_use]
    pub fn skip_native(mut self, skip: bool) -> Self {
        self.skip_native = skip;
        self
    }

    async fn run_step(&self, step: StepKind) -> Result<StepReport, BootstrapError> {
        let ctx = &self.ctx;
        match step {
            StepKind::Prerequisites => prerequisites::run(ctx).await,
            StepKind::Flutter => flutter::run(ctx).await,
            StepKind::CmdlineTools => cmdline_tools::run(ctx).await,
            StepKind::SdkPackages => sdk_packages::run(ctx).await,
            StepKind::NativeToolchain if self.skip_native => {
                Ok(StepReport::skipped("Skipped by --skip-native"))
            }
            StepKind::NativeToolchain => native_toolchain::run(ctx).await,
        }
    }

    /// Run every step in order
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport {
            host: self.ctx.platform.family(),
            root: self.ctx.layout.root().to_path_buf(),
            steps: Vec::new(),
            fatal: None,
        };

        info!(root = %report.root.display(), host = %report.host, "Starting install");
        if let Err(e) = filesystem::create_dir_all(self.ctx.layout.root()) {
            info!(error = %e, "Cannot create tooling root");
            report.fatal = Some(e.into());
            return report;
        }

        for step in StepKind::ORDER {
            self.ctx.notify(&RunEvent::StepStarted(step));
            debug!(step = %step, "Step started");

            match self.run_step(step).await {
                Ok(StepReport { outcome, warnings }) => {
                    info!(step = %step, outcome = ?outcome, "Step finished");
                    self.ctx.notify(&RunEvent::StepFinished(step, &outcome));
                    report.steps.push(StepRecord {
                        step,
                        outcome,
                        warnings,
                    });
                }
                Err(e) => {
                    info!(step = %step, error = %e, "Step failed, stopping");
                    let outcome = StepOutcome::FailedFatal {
                        message: e.to_string(),
                    };
                    self.ctx.notify(&RunEvent::StepFinished(step, &outcome));
                    report.steps.push(StepRecord {
                        step,
                        outcome,
                        warnings: Vec::new(),
                    });
                    report.fatal = Some(e);
                    break;
                }
            }
        }
        report
    }

    /// Check every step without changing anything
    pub async fn status(&self) -> Vec<StepStatus> {
        let ctx = &self.ctx;
        let layout = ctx.layout;
        let mut statuses = Vec::with_capacity(StepKind::ORDER.len());
        for step in StepKind::ORDER {
            let (satisfied, detail) = match step {
                StepKind::Prerequisites => (
                    prerequisites::is_satisfied(ctx),
                    describe_programs(ctx, &["git", "java"]),
                ),
                StepKind::Flutter => {
                    let exe = layout.flutter_executable(ctx.platform);
                    (flutter::is_satisfied(ctx), exe.display().to_string())
                }
                StepKind::CmdlineTools => {
                    let exe = layout.sdkmanager_executable(ctx.platform);
                    (cmdline_tools::is_satisfied(ctx), exe.display().to_string())
                }
                StepKind::SdkPackages => (
                    sdk_packages::is_satisfied(ctx),
                    sdk_packages::packages(ctx).join(" "),
                ),
                StepKind::NativeToolchain if !ctx.platform.is_windows() => {
                    (true, "not required on this host".to_string())
                }
                StepKind::NativeToolchain if self.skip_native => {
                    (true, "skipped by --skip-native".to_string())
                }
                StepKind::NativeToolchain => {
                    let detail = ctx.platform.vswhere().map_or_else(
                        || "vswhere not found".to_string(),
                        |p| p.display().to_string(),
                    );
                    (native_toolchain::is_satisfied(ctx).await, detail)
                }
            };
            statuses.push(StepStatus {
                step,
                satisfied,
                detail,
            });
        }
        statuses
    }
}

fn describe_programs<R>(ctx: &StepContext<'_, R>, programs: &[&str]) -> String {
    programs
        .iter()
        .map(|name| match ctx.platform.find_program(name) {
            Some(path) => format!("{name}: {}", path.display()),
            None => format!("{name}: missing"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
