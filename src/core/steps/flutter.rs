//! Flutter checkout
//!
//! A shallow git clone into `<root>/flutter`. With `FLUTTER_REF` set the
//! default branch is cloned and the ref fetched and checked out at depth 1;
//! otherwise the `FLUTTER_CHANNEL` branch is cloned directly.
//!
//! All git work happens in `<root>/flutter.partial`, which is renamed to
//! `flutter` only once the last git command succeeded. A launcher under
//! `flutter/` therefore always belongs to a finished checkout.

use tracing::warn;

use crate::core::step::{StepContext, StepKind, StepReport};
use crate::error::BootstrapError;
use crate::infra::filesystem;
use crate::infra::process::{CommandSpec, ProcessRunner};

const STEP: StepKind = StepKind::Flutter;

pub fn is_satisfied<R>(ctx: &StepContext<'_, R>) -> bool {
    ctx.layout.flutter_executable(ctx.platform).is_file()
}

pub async fn run<R: ProcessRunner>(ctx: &StepContext<'_, R>) -> Result<StepReport, BootstrapError> {
    let root = ctx.layout.flutter_root();
    if is_satisfied(ctx) {
        return Ok(StepReport::skipped(format!(
            "Flutter already present at {}",
            root.display()
        )));
    }

    // A checkout without a launcher is left over from an older interrupted clone
    if root.exists() {
        warn!(path = %root.display(), "Removing incomplete Flutter checkout");
        filesystem::remove_dir_all(root)?;
    }
    let staging = ctx.layout.flutter_staging();
    filesystem::remove_dir_all(&staging)?;
    if let Some(parent) = staging.parent() {
        filesystem::create_dir_all(parent)?;
    }

    let url = ctx.config.flutter_git_url();
    let dest = staging.display().to_string();
    ctx.say(STEP, &format!("Installing Flutter into {} ...", root.display()));

    if let Some(reference) = ctx.config.flutter_ref() {
        ctx.runner
            .run_checked(&CommandSpec::new("git").args(["clone", "--depth", "1", url, dest.as_str()]))
            .await?;
        ctx.runner
            .run_checked(
                &CommandSpec::new("git")
                    .args(["fetch", "origin", reference, "--depth", "1"])
                    .current_dir(&staging),
            )
            .await?;
        ctx.runner
            .run_checked(
                &CommandSpec::new("git")
                    .args(["checkout", "FETCH_HEAD"])
                    .current_dir(&staging),
            )
            .await?;
    } else {
        let channel = ctx.config.flutter_channel();
        ctx.runner
            .run_checked(
                &CommandSpec::new("git").args(["clone", "--depth", "1", "-b", channel, url, dest.as_str()]),
            )
            .await?;
    }

    filesystem::rename(&staging, root)?;
    Ok(StepReport::completed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::keys;
    use crate::infra::platform::HostFamily;
    use crate::core::step::StepOutcome;
    use crate::error::FilesystemError;
    use crate::test_utils::{clone_effects, exit, touch, FakeRunner, Sandbox};

    #[tokio::test]
    async fn test_skipped_when_launcher_exists() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]);
        touch(&sandbox.layout.flutter_executable(&sandbox.platform));
        let runner = FakeRunner::succeeding();

        let report = run(&sandbox.context(&runner)).await.unwrap();
        assert!(report.outcome.is_skipped());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_channel_clone() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]).with_overrides(&[(keys::FLUTTER_CHANNEL, "beta")]);
        let runner = FakeRunner::with(clone_effects(&sandbox.platform));

        let report = run(&sandbox.context(&runner)).await.unwrap();
        assert_eq!(report.outcome, StepOutcome::Completed);

        let dest = sandbox.layout.flutter_staging().display().to_string();
        assert_eq!(
            runner.command_lines(),
            [format!("git clone --depth 1 -b beta https://github.com/flutter/flutter {dest}")]
        );
        assert!(is_satisfied(&sandbox.context(&runner)));
        assert!(!sandbox.layout.flutter_staging().exists());
    }

    #[tokio::test]
    async fn test_ref_takes_precedence_over_channel() {
        let sandbox = Sandbox::new(HostFamily::Other, &[])
            .with_overrides(&[(keys::FLUTTER_CHANNEL, "beta"), (keys::FLUTTER_REF, "3.22.0")]);
        let runner = FakeRunner::with(clone_effects(&sandbox.platform));

        run(&sandbox.context(&runner)).await.unwrap();

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("git clone --depth 1 https://github.com/flutter/flutter"));
        assert!(!lines[0].contains(" -b "));
        assert_eq!(lines[1], "git fetch origin 3.22.0 --depth 1");
        assert_eq!(lines[2], "git checkout FETCH_HEAD");

        let staging = sandbox.layout.flutter_staging();
        let calls = runner.calls();
        assert_eq!(calls[1].cwd.as_deref(), Some(staging.as_path()));
        assert_eq!(calls[2].cwd.as_deref(), Some(staging.as_path()));
        assert!(sandbox.layout.flutter_executable(&sandbox.platform).is_file());
    }

    #[tokio::test]
    async fn test_clone_failure_is_fatal() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]);
        let runner = FakeRunner::with(|_| exit(128));

        let err = run(&sandbox.context(&runner)).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Process(_)));
        assert!(!sandbox.layout.flutter_root().exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_checkout() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]).with_overrides(&[(keys::FLUTTER_REF, "nope")]);
        let runner = FakeRunner::with(|spec| if spec.args[0] == "fetch" { exit(1) } else { exit(0) });

        assert!(run(&sandbox.context(&runner)).await.is_err());
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_launcher_and_rerun_clones_again() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]).with_overrides(&[(keys::FLUTTER_REF, "3.22.0")]);
        let clone = clone_effects(&sandbox.platform);
        let failing = FakeRunner::with(move |spec| {
            if spec.args[0] == "fetch" {
                exit(128)
            } else {
                clone(spec)
            }
        });

        let err = run(&sandbox.context(&failing)).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Process(_)));
        // The clone landed, but only in the staging directory
        assert!(sandbox.layout.flutter_staging().exists());
        assert!(!sandbox.layout.flutter_executable(&sandbox.platform).exists());
        assert!(!is_satisfied(&sandbox.context(&failing)));

        let rerun = FakeRunner::with(clone_effects(&sandbox.platform));
        let report = run(&sandbox.context(&rerun)).await.unwrap();
        assert!(!report.outcome.is_skipped());
        let lines = rerun.command_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("git clone "));
        assert!(sandbox.layout.flutter_executable(&sandbox.platform).is_file());
        assert!(!sandbox.layout.flutter_staging().exists());
    }

    #[tokio::test]
    async fn test_stale_staging_dir_is_cleared_before_clone() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]);
        touch(&sandbox.layout.flutter_staging().join("stale"));
        let runner = FakeRunner::with(clone_effects(&sandbox.platform));

        run(&sandbox.context(&runner)).await.unwrap();
        assert!(!sandbox.layout.flutter_root().join("stale").exists());
        assert!(sandbox.layout.flutter_executable(&sandbox.platform).is_file());
    }

    #[tokio::test]
    async fn test_incomplete_checkout_is_replaced() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]);
        touch(&sandbox.layout.flutter_root().join("partial"));
        let runner = FakeRunner::with(clone_effects(&sandbox.platform));

        run(&sandbox.context(&runner)).await.unwrap();
        assert!(!sandbox.layout.flutter_root().join("partial").exists());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_without_clone_output_is_a_filesystem_error() {
        let sandbox = Sandbox::new(HostFamily::Other, &[]);
        let runner = FakeRunner::succeeding();

        let err = run(&sandbox.context(&runner)).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Filesystem(FilesystemError::Rename { .. })));
    }
}
