//! Android SDK packages and Flutter configuration
//!
//! Three sub-steps, all run with an SDK environment overlay:
//! 1. `sdkmanager --licenses` fed a bounded stream of `y` lines (best-effort)
//! 2. `sdkmanager <packages...>`
//! 3. `flutter config --android-sdk` then `flutter precache`
//!
//! A stamp file recording the packages and precache flags is written after
//! all three succeed; a matching stamp plus the package directories on disk
//! makes the step skip.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::defaults::LICENSE_ACCEPT_LINES;
use crate::core::step::{attempt, Attempt, StepContext, StepKind, StepReport};
use crate::error::{BootstrapError, FilesystemError};
use crate::infra::process::{CommandSpec, ProcessRunner};

const STEP: StepKind = StepKind::SdkPackages;

/// Written under the SDK root once packages and precache are done
pub const STAMP_FILE: &str = ".devboot-packages";

/// Packages requested from sdkmanager, in install order
pub fn packages<R>(ctx: &StepContext<'_, R>) -> Vec<String> {
    let config = ctx.config;
    vec![
        "platform-tools".to_string(),
        format!("platforms;{}", config.android_platform()),
        format!("build-tools;{}", config.android_build_tools()),
        format!("cmake;{}", config.android_cmake()),
        format!("ndk;{}", config.android_ndk()),
    ]
}

/// Target flags for `flutter precache`
pub fn precache_flags<R>(ctx: &StepContext<'_, R>) -> Vec<&'static str> {
    let mut flags = vec!["--android"];
    if ctx.platform.is_windows() {
        flags.push("--windows");
    }
    flags
}

/// Environment overlay pointing child processes at the SDK
pub fn sdk_environment<R>(ctx: &StepContext<'_, R>) -> BTreeMap<String, OsString> {
    let sdk = ctx.layout.android_sdk();
    let mut path_entries = vec![ctx.layout.cmdline_tools_bin(), ctx.layout.platform_tools()];
    if let Some(inherited) = std::env::var_os("PATH") {
        path_entries.extend(std::env::split_paths(&inherited));
    }
    let path = std::env::join_paths(&path_entries).unwrap_or_else(|_| {
        // Only possible if an entry contains the separator; keep ours first
        let mut joined = OsString::from(ctx.layout.cmdline_tools_bin());
        if let Some(inherited) = std::env::var_os("PATH") {
            joined.push(if cfg!(windows) { ";" } else { ":" });
            joined.push(inherited);
        }
        joined
    });

    let mut env = BTreeMap::new();
    env.insert("ANDROID_SDK_ROOT".to_string(), sdk.as_os_str().to_os_string());
    env.insert("ANDROID_HOME".to_string(), sdk.as_os_str().to_os_string());
    env.insert("PATH".to_string(), path);
    env
}

fn stamp_contents<R>(ctx: &StepContext<'_, R>) -> String {
    let mut lines = packages(ctx);
    lines.push(format!("precache {}", precache_flags(ctx).join(" ")));
    lines.join("\n") + "\n"
}

fn package_dir(sdk: &Path, package: &str) -> PathBuf {
    package.split(';').fold(sdk.to_path_buf(), |dir, part| dir.join(part))
}

pub fn is_satisfied<R>(ctx: &StepContext<'_, R>) -> bool {
    let sdk = ctx.layout.android_sdk();
    let stamp_matches = std::fs::read_to_string(sdk.join(STAMP_FILE))
        .is_ok_and(|stamp| stamp == stamp_contents(ctx));
    stamp_matches && packages(ctx).iter().all(|p| package_dir(sdk, p).is_dir())
}

pub async fn run<R: ProcessRunner>(ctx: &StepContext<'_, R>) -> Result<StepReport, BootstrapError> {
    let sdkmanager = ctx.layout.sdkmanager_executable(ctx.platform);
    if !sdkmanager.is_file() {
        return Err(BootstrapError::MissingTool {
            remediation: format!(
                "sdkmanager should have been installed at {}. Delete {} and re-run devboot.",
                sdkmanager.display(),
                ctx.layout.cmdline_tools_latest().display()
            ),
            path: sdkmanager,
        });
    }
    if is_satisfied(ctx) {
        return Ok(StepReport::skipped("Android SDK packages already installed"));
    }

    let sdk = ctx.layout.android_sdk();
    let env = sdk_environment(ctx);
    let sdk_root_arg = format!("--sdk_root={}", sdk.display());
    let mut warnings = Vec::new();

    ctx.say(STEP, "Accepting Android licenses...");
    let licenses = CommandSpec::new(&sdkmanager)
        .args([sdk_root_arg.as_str(), "--licenses"])
        .envs(&env)
        .repeated_input("y", LICENSE_ACCEPT_LINES);
    if let Attempt::Warned(warning) = attempt(ctx.runner, &licenses, "License acceptance").await {
        ctx.warn(STEP, &warning);
        warnings.push(warning);
    }

    ctx.say(STEP, "Installing Android SDK components...");
    let install = CommandSpec::new(&sdkmanager)
        .arg(sdk_root_arg.as_str())
        .args(packages(ctx))
        .envs(&env);
    ctx.runner.run_checked(&install).await?;

    ctx.say(STEP, "Configuring Flutter and precaching artifacts...");
    let flutter = ctx.layout.flutter_executable(ctx.platform);
    let sdk_arg = sdk.display().to_string();
    ctx.runner
        .run_checked(
            &CommandSpec::new(&flutter)
                .args(["config", "--android-sdk", sdk_arg.as_str()])
                .envs(&env),
        )
        .await?;
    ctx.runner
        .run_checked(
            &CommandSpec::new(&flutter)
                .arg("precache")
                .args(precache_flags(ctx))
                .envs(&env),
        )
        .await?;

    let stamp = sdk.join(STAMP_FILE);
    std::fs::write(&stamp, stamp_contents(ctx)).map_err(|e| FilesystemError::WriteFile {
        path: stamp,
        error: e.to_string(),
    })?;

    Ok(StepReport::completed().with_warnings(warnings))
}
