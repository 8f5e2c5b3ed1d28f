//! Host prerequisites: git and a JDK on PATH
//!
//! On Windows a missing JDK is installed through winget when available.
//! That attempt is best-effort; only the re-check decides.

use crate::config::urls;
use crate::core::step::{attempt, Attempt, StepContext, StepKind, StepReport};
use crate::error::BootstrapError;
use crate::infra::process::{CommandSpec, ProcessRunner};

const STEP: StepKind = StepKind::Prerequisites;

const GIT_REMEDIATION: &str = "Install Git and re-run.
  Windows: winget install -e --id Git.Git
  Linux:   sudo apt install git";

const JAVA_REMEDIATION: &str = "Install JDK 17 and re-run.
  Windows: winget install -e --id Microsoft.OpenJDK.17
  Linux:   sudo apt install openjdk-17-jdk";

/// Whether both prerequisites already resolve
pub fn is_satisfied<R>(ctx: &StepContext<'_, R>) -> bool {
    ctx.platform.has_program("git") && ctx.platform.has_program("java")
}

pub async fn run<R: ProcessRunner>(ctx: &StepContext<'_, R>) -> Result<StepReport, BootstrapError> {
    if !ctx.platform.has_program("git") {
        return Err(BootstrapError::FatalPrerequisiteMissing {
            what: "Git".to_string(),
            remediation: GIT_REMEDIATION.to_string(),
        });
    }

    if ctx.platform.has_program("java") {
        return Ok(StepReport::skipped("git and java found on PATH"));
    }

    let mut warnings = Vec::new();
    if ctx.platform.is_windows() && ctx.platform.has_program("winget") {
        ctx.say(STEP, "Java 17 not found. Installing Microsoft OpenJDK 17 via winget...");
        let spec = CommandSpec::new("winget").args([
            "install",
            "-e",
            "--id",
            urls::WINGET_JDK_ID,
            "--silent",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ]);
        if let Attempt::Warned(warning) = attempt(ctx.runner, &spec, "JDK installation").await {
            ctx.warn(STEP, &warning);
            warnings.push(warning);
        }
    }

    if !ctx.platform.has_program("java") {
        return Err(BootstrapError::FatalPrerequisiteMissing {
            what: "Java 17".to_string(),
            remediation: JAVA_REMEDIATION.to_string(),
        });
    }

    Ok(StepReport::completed().with_warnings(warnings))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::step::StepOutcome;
    use crate::infra::platform::HostFamily;
    use crate::test_utils::{exit, fake_program, FakeRunner, Sandbox};

    #[tokio::test]
    async fn test_skipped_when_both_present() {
        let sandbox = Sandbox::new(HostFamily::Other, &["git", "java"]);
        let runner = FakeRunner::succeeding();
        let report = run(&sandbox.context(&runner)).await.unwrap();

        assert!(report.outcome.is_skipped());
        assert!(runner.calls().is_empty());
        assert!(is_satisfied(&sandbox.context(&runner)));
    }

    #[tokio::test]
    async fn test_missing_git_is_fatal_with_both_commands() {
        let sandbox = Sandbox::new(HostFamily::Other, &["java"]);
        let runner = FakeRunner::succeeding();
        let err = run(&sandbox.context(&runner)).await.unwrap_err();

        let remediation = err.remediation().unwrap();
        assert!(remediation.contains("winget install -e --id Git.Git"));
        assert!(remediation.contains("sudo apt install git"));
    }

    #[tokio::test]
    async fn test_missing_java_on_other_host_does_not_try_winget() {
        let sandbox = Sandbox::new(HostFamily::Other, &["git", "winget"]);
        let runner = FakeRunner::succeeding();
        let err = run(&sandbox.context(&runner)).await.unwrap_err();

        assert!(runner.calls().is_empty());
        let remediation = err.remediation().unwrap();
        assert!(remediation.contains("sudo apt install openjdk-17-jdk"));
        assert!(remediation.contains("Microsoft.OpenJDK.17"));
    }

    #[tokio::test]
    async fn test_windows_winget_failure_is_swallowed_then_fatal() {
        let sandbox = Sandbox::new(HostFamily::Windows, &["git", "winget"]);
        let runner = FakeRunner::with(|_| exit(1));
        let err = run(&sandbox.context(&runner)).await.unwrap_err();

        assert_eq!(runner.command_lines().len(), 1);
        assert!(runner.command_lines()[0].starts_with("winget install -e --id Microsoft.OpenJDK.17"));
        assert!(matches!(err, BootstrapError::FatalPrerequisiteMissing { .. }));
    }

    #[tokio::test]
    async fn test_windows_winget_installs_jdk() {
        let sandbox = Sandbox::new(HostFamily::Windows, &["git", "winget"]);
        let bin = sandbox.dir.path().join("bin");
        let runner = FakeRunner::with(move |_| {
            fake_program(&bin, "java");
            exit(0)
        });

        let report = run(&sandbox.context(&runner)).await.unwrap();
        assert_eq!(report.outcome, StepOutcome::Completed);
        assert!(report.warnings.is_empty());
    }
}
