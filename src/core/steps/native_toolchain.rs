//! MSVC build tools (Windows only)
//!
//! Detection goes through `vswhere`; installation through winget with the
//! C++ workload override. Nothing here is ever fatal: a machine without
//! MSVC can still build for Android.

use tracing::debug;

use crate::config::urls::{BUILD_TOOLS_OVERRIDE, VC_TOOLS_COMPONENT, WINGET_BUILD_TOOLS_ID};
use crate::core::step::{attempt, Attempt, SoftWarning, StepContext, StepKind, StepReport};
use crate::error::BootstrapError;
use crate::infra::process::{CommandSpec, ProcessRunner};

const STEP: StepKind = StepKind::NativeToolchain;

/// The winget invocation, as an operator would type it
pub fn manual_install_command() -> String {
    format!(
        "winget install -e --id {WINGET_BUILD_TOOLS_ID} --override \"{BUILD_TOOLS_OVERRIDE}\" \
         --accept-package-agreements --accept-source-agreements"
    )
}

/// Whether an installation with the VC tools component is registered
///
/// Always false off Windows or when `vswhere` itself is missing.
pub async fn is_satisfied<R: ProcessRunner>(ctx: &StepContext<'_, R>) -> bool {
    if !ctx.platform.is_windows() {
        return false;
    }
    let Some(vswhere) = ctx.platform.vswhere() else {
        debug!("vswhere not found");
        return false;
    };
    let query = CommandSpec::new(vswhere).args([
        "-latest",
        "-products",
        "*",
        "-requires",
        VC_TOOLS_COMPONENT,
        "-property",
        "installationPath",
    ]);
    match ctx.runner.run(&query).await {
        Ok(result) => result.success() && !result.output.trim().is_empty(),
        Err(e) => {
            debug!(error = %e, "vswhere query failed");
            false
        }
    }
}

pub async fn run<R: ProcessRunner>(ctx: &StepContext<'_, R>) -> Result<StepReport, BootstrapError> {
    if !ctx.platform.is_windows() {
        return Ok(StepReport::skipped("Not required on this host"));
    }
    if is_satisfied(ctx).await {
        return Ok(StepReport::skipped("MSVC Build Tools detected"));
    }

    ctx.say(
        STEP,
        "MSVC Build Tools not found. Attempting installation via winget (requires Admin)...",
    );
    if !ctx.platform.has_program("winget") {
        let warning = SoftWarning::new("winget not found; cannot install MSVC Build Tools")
            .with_remediation(manual_install_command());
        ctx.warn(STEP, &warning);
        return Ok(StepReport::failed_soft(warning));
    }

    let install = CommandSpec::new("winget").args([
        "install",
        "-e",
        "--id",
        WINGET_BUILD_TOOLS_ID,
        "--override",
        BUILD_TOOLS_OVERRIDE,
        "--accept-package-agreements",
        "--accept-source-agreements",
    ]);
    match attempt(ctx.runner, &install, "MSVC Build Tools installation").await {
        Attempt::Succeeded => {
            ctx.say(
                STEP,
                "MSVC Build Tools installed. If the installer asked for elevation, re-run devboot once it finishes.",
            );
            Ok(StepReport::completed())
        }
        Attempt::Warned(warning) => {
            let warning = warning.with_remediation(manual_install_command());
            ctx.warn(STEP, &warning);
            Ok(StepReport::failed_soft(warning))
        }
    }
}
