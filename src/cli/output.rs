//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress bars,
//! status-prefixed messages and errors to the user.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::error::BootstrapError;

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Output flags taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make these flags visible to every printing helper
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Log level directive for the tracing subscriber
    pub fn log_level(self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Human-readable output is wanted
fn is_chatty() -> bool {
    !is_quiet() && !is_json()
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Create a progress bar for downloads
pub fn create_download_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

pub fn print_success(message: &str) {
    if is_chatty() {
        println!("{} {message}", status::SUCCESS);
    }
}

pub fn print_info(message: &str) {
    if is_chatty() {
        println!("{} {message}", status::INFO);
    }
}

/// Warnings go to stderr so they survive `--json`
pub fn print_warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Indented follow-up line under a status message
pub fn print_detail(message: &str) {
    if is_chatty() {
        println!("    {message}");
    }
}

/// Always printed
pub fn print_error(message: &str) {
    eprintln!("{} {message}", status::ERROR);
}

/// Print a command failure and, when known, what to do about it
pub fn display_error(error: &anyhow::Error) {
    print_error(&format!("{error}"));
    for cause in error.chain().skip(1) {
        eprintln!("    caused by: {cause}");
    }
    if let Some(remediation) = error
        .downcast_ref::<BootstrapError>()
        .and_then(BootstrapError::remediation)
    {
        eprintln!();
        for line in remediation.lines() {
            eprintln!("  {line}");
        }
    }
}
