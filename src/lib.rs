//! devboot - Flutter and Android toolchain bootstrapper
//!
//! Installs git-checked-out Flutter, the Android command-line tools, SDK
//! packages and (on Windows) the MSVC build tools into a project-local
//! tooling directory. Every step checks for its own marker first, so a run
//! can be repeated or resumed after an interruption.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Install steps and their orchestration
//! - [`infra`] - Infrastructure layer (network, archives, filesystem, processes)
//! - [`config`] - Defaults and upstream locations
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
