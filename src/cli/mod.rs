//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no install logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use commands::{Commands, Workspace};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_SHA"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\ntarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

/// devboot - Flutter and Android toolchain bootstrapper
///
/// Installs Flutter, the Android SDK and (on Windows) the MSVC build tools
/// into a project-local tooling directory. Safe to re-run.
#[derive(Parser, Debug)]
#[command(name = "devboot")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Override file with KEY=value settings [default: ./.env]
    #[arg(long, global = true, value_name = "PATH", env = "DEVBOOT_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Where tools are installed [default: ./.tooling]
    #[arg(long, global = true, value_name = "DIR", env = "DEVBOOT_TOOLING_DIR")]
    pub tooling_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command; `install` when none is given
    pub async fn run(self) -> Result<()> {
        let workspace = Workspace::new(std::env::current_dir()?, self.env_file, self.tooling_dir);
        let command = self.command.unwrap_or(Commands::Install { skip_native: false });
        command.run(&workspace).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_install() {
        let cli = Cli::try_parse_from(["devboot", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "devboot",
            "install",
            "--skip-native",
            "--env-file",
            "ci.env",
            "--tooling-dir",
            "/opt/tools",
        ])
        .unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("ci.env")));
        assert_eq!(cli.tooling_dir, Some(PathBuf::from("/opt/tools")));
        assert!(matches!(cli.command, Some(Commands::Install { skip_native: true })));
    }
}
