//! Error types for devboot
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Subprocess errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Program could not be started at all
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Program ran and exited non-zero
    #[error("Command failed{}: {command}", exit_code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    SubprocessFailure {
        command: String,
        output: String,
        exit_code: Option<i32>,
    },

    /// IO error while talking to the child
    #[error("IO error running '{command}': {error}")]
    Io { command: String, error: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// Checksum verification failed
    #[error("Checksum verification failed for '{file}': expected {expected}, got {actual}")]
    ChecksumFailed {
        file: String,
        expected: String,
        actual: String,
    },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Archive extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Archive could not be opened or is not a zip
    #[error("Failed to open archive '{path}': {error}")]
    Open { path: PathBuf, error: String },

    /// A single entry is unreadable or unsafe
    #[error("Bad archive entry in '{path}': {error}")]
    Entry { path: PathBuf, error: String },

    /// IO error writing extracted content
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// Expected top-level entry is absent
    #[error("Archive '{archive}' has no '{entry}' directory")]
    MissingEntry { archive: PathBuf, entry: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to move a directory into place
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to copy a file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to walk a directory tree
    #[error("Failed to read directory '{path}': {error}")]
    Walk { path: PathBuf, error: String },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },
}

/// Top-level devboot error type
///
/// Anything reaching the orchestrator as an `Err` is fatal and stops the run.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A required host tool is missing and could not be provided
    #[error("{what} not found on PATH")]
    FatalPrerequisiteMissing { what: String, remediation: String },

    /// A tool that an earlier step should have installed is absent
    #[error("Required tool not found at '{path}'")]
    MissingTool { path: PathBuf, remediation: String },

    /// Subprocess error
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Extraction error
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl BootstrapError {
    /// Actionable next step for the operator, if one exists
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::FatalPrerequisiteMissing { remediation, .. }
            | Self::MissingTool { remediation, .. } => Some(remediation.clone()),
            Self::Process(ProcessError::SubprocessFailure { command, .. }) => Some(format!(
                "Fix the problem reported above, then re-run devboot (or run manually: {command})"
            )),
            Self::Process(ProcessError::Spawn { program, .. }) => {
                Some(format!("Make sure '{program}' is installed and on PATH, then re-run devboot"))
            }
            Self::Download(_) => {
                Some("Check your network connection and re-run devboot".to_string())
            }
            Self::Extract(_) => Some(
                "The downloaded archive looks corrupt; re-run devboot to fetch it again".to_string(),
            ),
            Self::Process(ProcessError::Io { .. }) | Self::Filesystem(_) | Self::Config(_) => None,
        }
    }

    /// Captured subprocess output attached to this error, if any
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Process(ProcessError::SubprocessFailure { output, .. }) => Some(output),
            _ => None,
        }
    }
}
