//! External process execution
//!
//! Every external tool (git, sdkmanager, flutter, winget, vswhere) is run
//! through a [`ProcessRunner`]. Steps only see [`CommandSpec`] in and
//! [`CommandResult`] out, so tests can swap in a recording fake.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::ProcessError;

/// One command invocation
///
/// `env` is an overlay merged over the inherited environment of the child;
/// the parent process environment is never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, OsString>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<Vec<u8>>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn envs(mut self, overlay: &BTreeMap<String, OsString>) -> Self {
        self.env
            .extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Feed `line` to stdin `count` times, then close stdin
    #[must_use]
    pub fn repeated_input(mut self, line: &str, count: usize) -> Self {
        self.stdin = Some(format!("{line}\n").repeat(count).into_bytes());
        self
    }

    /// Name of the program without its directory
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Human-readable command line
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Exit status plus merged stdout/stderr of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    pub output: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Run to completion and capture output; a non-zero exit is not an error
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ProcessError>;

    /// Run and fail with [`ProcessError::SubprocessFailure`] on non-zero exit
    ///
    /// The captured output is written to stderr before the error is returned.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandResult, ProcessError> {
        let result = self.run(spec).await?;
        if result.success() {
            return Ok(result);
        }
        if !result.output.is_empty() {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", result.output.trim_end());
        }
        Err(ProcessError::SubprocessFailure {
            command: spec.display(),
            output: result.output,
            exit_code: result.exit_code,
        })
    }
}

/// Runs commands on the host with tokio
///
/// No timeout is applied. Children are killed if the run is interrupted.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Echo captured output of successful commands to stdout
    echo: bool,
}

impl SystemRunner {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, ProcessError> {
        let command_line = spec.display();
        debug!(command = %command_line, cwd = ?spec.cwd, "Spawning process");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(&spec.env)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|e| ProcessError::Spawn {
            program: spec.program.display().to_string(),
            error: e.to_string(),
        })?;

        let io_error = |e: std::io::Error| ProcessError::Io {
            command: command_line.clone(),
            error: e.to_string(),
        };

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_error(std::io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io_error(std::io::Error::other("stderr not captured")))?;

        // stdin is written while output is drained so a chatty child cannot
        // deadlock on a full pipe; dropping the handle sends EOF.
        let input = spec.stdin.as_deref();
        let feed = async move {
            if let (Some(mut pipe), Some(bytes)) = (stdin, input) {
                match pipe.write_all(bytes).await {
                    Ok(()) => pipe.shutdown().await.or_else(ignore_broken_pipe)?,
                    Err(e) => ignore_broken_pipe(e)?,
                }
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, collect_merged(stdout, stderr));
        fed.map_err(io_error)?;
        let output = output.map_err(io_error)?;

        let status = child.wait().await.map_err(io_error)?;
        let result = CommandResult {
            exit_code: status.code(),
            output,
        };

        if result.success() {
            debug!(command = %command_line, "Process finished");
            if self.echo && !result.output.is_empty() {
                let mut stdout = std::io::stdout().lock();
                let _ = write!(stdout, "{}", result.output);
            }
        } else {
            debug!(command = %command_line, exit_code = ?result.exit_code, "Process failed");
        }

        Ok(result)
    }
}

/// The child may exit before consuming all input; that is not an error.
fn ignore_broken_pipe(e: std::io::Error) -> std::io::Result<()> {
    if e.kind() == std::io::ErrorKind::BrokenPipe {
        debug!("Child closed stdin early");
        Ok(())
    } else {
        Err(e)
    }
}

/// Interleave two streams line by line into one capture
///
/// Order is preserved within each stream, not across them.
async fn collect_merged<A, B>(stdout: A, stderr: B) -> std::io::Result<String>
where
    A: AsyncRead + Unpin,
    B: AsyncRead + Unpin,
{
    let mut out = BufReader::new(stdout);
    let mut err = BufReader::new(stderr);
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut out_done = false;
    let mut err_done = false;
    let mut merged = String::new();

    while !(out_done && err_done) {
        tokio::select! {
            read = out.read_until(b'\n', &mut out_buf), if !out_done => {
                if read? == 0 {
                    out_done = true;
                }
                push_line(&mut merged, &mut out_buf);
            }
            read = err.read_until(b'\n', &mut err_buf), if !err_done => {
                if read? == 0 {
                    err_done = true;
                }
                push_line(&mut merged, &mut err_buf);
            }
        }
    }

    Ok(merged)
}

/// Move one buffered line into `merged`, terminating it if the stream ended mid-line
fn push_line(merged: &mut String, buf: &mut Vec<u8>) {
    if buf.is_empty() {
        return;
    }
    merged.push_str(&String::from_utf8_lossy(buf));
    if !merged.ends_with('\n') {
        merged.push('\n');
    }
    buf.clear();
}
