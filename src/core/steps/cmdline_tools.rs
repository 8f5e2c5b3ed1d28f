//! Android command-line tools
//!
//! Downloads `commandlinetools-<host>-<version>_latest.zip`, extracts it into
//! a scratch directory and merges the archive's `cmdline-tools/` children
//! into `<sdk>/cmdline-tools/latest/`. The scratch directory is removed when
//! the step returns, whether it succeeded or not.

use std::path::Path;

use crate::core::step::{StepContext, StepKind, StepReport};
use crate::error::{BootstrapError, ExtractError, FilesystemError};
use crate::infra::{archive, filesystem};

const STEP: StepKind = StepKind::CmdlineTools;

/// Top-level directory inside the upstream archive
const ARCHIVE_ROOT: &str = "cmdline-tools";

pub fn is_satisfied<R>(ctx: &StepContext<'_, R>) -> bool {
    ctx.layout.sdkmanager_executable(ctx.platform).is_file()
}

/// Download URL for the configured version on this host
pub fn download_url<R>(ctx: &StepContext<'_, R>) -> String {
    format!(
        "{}/commandlinetools-{}-{}_latest.zip",
        ctx.config.android_repository_url(),
        ctx.platform.archive_tag(),
        ctx.config.cmdline_tools_version()
    )
}

pub async fn run<R>(ctx: &StepContext<'_, R>) -> Result<StepReport, BootstrapError> {
    if is_satisfied(ctx) {
        return Ok(StepReport::skipped("Android cmdline-tools already present"));
    }

    let version = ctx.config.cmdline_tools_version();
    let sdk = ctx.layout.android_sdk();
    ctx.say(
        STEP,
        &format!("Installing Android cmdline-tools {version} into {} ...", sdk.display()),
    );
    filesystem::create_dir_all(sdk)?;

    let scratch = tempfile::Builder::new()
        .prefix("devboot-cmdline-tools-")
        .tempdir()
        .map_err(|e| FilesystemError::CreateDir {
            path: std::env::temp_dir(),
            error: e.to_string(),
        })?;

    let url = download_url(ctx);
    let zip_path = scratch.path().join("cmdline-tools.zip");
    ctx.say(STEP, &format!("Downloading: {url}"));
    let progress = ctx.download_progress();
    match ctx.config.cmdline_tools_sha256() {
        Some(expected) => {
            ctx.downloader
                .download_verified(&url, &zip_path, expected, progress.as_ref())
                .await?;
        }
        None => {
            ctx.downloader.download(&url, &zip_path, progress.as_ref()).await?;
        }
    }

    let extract_dir = scratch.path().join("extract");
    archive::extract_zip(&zip_path, &extract_dir)?;

    let extracted = extract_dir.join(ARCHIVE_ROOT);
    if !extracted.is_dir() {
        return Err(ExtractError::MissingEntry {
            archive: zip_path,
            entry: ARCHIVE_ROOT.to_string(),
        }
        .into());
    }
    // sdkmanager marks the step done, so it goes in last
    let marker = ctx.platform.tool_executable(Path::new("bin"), "sdkmanager");
    filesystem::merge_tree(&extracted, &ctx.layout.cmdline_tools_latest(), Some(&marker))?;

    Ok(StepReport::completed())
}
