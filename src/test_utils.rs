//! Test utilities
//!
//! A recording [`ProcessRunner`] and a scratch project with a controlled
//! PATH, so steps can be driven without touching the host toolchain.

use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::core::layout::ToolchainLayout;
use crate::core::settings::ResolvedConfig;
use crate::core::step::StepContext;
use crate::error::ProcessError;
use crate::infra::download::DownloadManager;
use crate::infra::platform::{HostFamily, Platform};
use crate::infra::process::{CommandResult, CommandSpec, ProcessRunner};

type Responder = Box<dyn Fn(&CommandSpec) -> CommandResult + Send + Sync>;

/// Records every command and answers with a scripted result
pub struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    respond: Responder,
}

impl FakeRunner {
    /// Every command exits 0 with no output
    pub fn succeeding() -> Self {
        Self::with(|_| exit(0))
    }

    pub fn with(respond: impl Fn(&CommandSpec) -> CommandResult + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// `program-name arg1 arg2 ...` for each recorded call
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                std::iter::once(c.program_name())
                    .chain(c.args.iter().cloned())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ProcessError> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok((self.respond)(spec))
    }
}

/// A result with the given exit code and no output
pub fn exit(code: i32) -> CommandResult {
    CommandResult {
        exit_code: Some(code),
        output: String::new(),
    }
}

/// A successful result printing `output`
pub fn output(text: &str) -> CommandResult {
    CommandResult {
        exit_code: Some(0),
        output: text.to_string(),
    }
}

/// Responder for `git clone` that leaves a Flutter launcher in the clone
/// destination, like a real checkout would
pub fn clone_effects(platform: &Platform) -> impl Fn(&CommandSpec) -> CommandResult + Send + Sync + 'static {
    let platform = platform.clone();
    move |spec| {
        if spec.program_name() == "git" && spec.args[0] == "clone" {
            if let Some(dest) = spec.args.last() {
                touch(&platform.tool_executable(&Path::new(dest).join("bin"), "flutter"));
            }
        }
        exit(0)
    }
}

/// Create a file and its parent directories
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

/// Put an executable named `name` into `dir`
pub fn fake_program(dir: &Path, name: &str) {
    std::fs::create_dir_all(dir).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    #[cfg(not(unix))]
    std::fs::write(dir.join(format!("{name}.exe")), b"").unwrap();
}

/// Log lines written by a subscriber installed with [`capture_warnings`]
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Capture this thread's log output at the CLI's default WARN level
pub fn capture_warnings() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let logs = LogCapture::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// Scratch project with its own PATH and Program Files root
pub struct Sandbox {
    pub dir: TempDir,
    pub config: ResolvedConfig,
    pub layout: ToolchainLayout,
    pub platform: Platform,
    pub downloader: DownloadManager,
}

impl Sandbox {
    /// `programs` are the only names resolvable on PATH
    pub fn new(family: HostFamily, programs: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        for program in programs {
            fake_program(&bin, program);
        }
        let platform = Platform::new(family)
            .with_search_path(bin.as_os_str())
            .with_installer_roots(vec![dir.path().join("Program Files")]);

        Self {
            config: ResolvedConfig::defaults(),
            layout: ToolchainLayout::for_project(dir.path()),
            platform,
            downloader: DownloadManager::with_config(1, 10),
            dir,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &[(&str, &str)]) -> Self {
        self.config = ResolvedConfig::from_overrides(
            overrides
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    pub fn context<'a, R>(&'a self, runner: &'a R) -> StepContext<'a, R> {
        StepContext {
            config: &self.config,
            layout: &self.layout,
            platform: &self.platform,
            runner,
            downloader: &self.downloader,
            observer: None,
        }
    }
}
