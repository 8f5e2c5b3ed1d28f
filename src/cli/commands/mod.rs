//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod config;
pub mod install;
pub mod status;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::defaults;
use crate::core::layout::ToolchainLayout;
use crate::core::settings::ResolvedConfig;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install everything that is missing (default)
    Install {
        /// Do not install the MSVC build tools on Windows
        #[arg(long)]
        skip_native: bool,
    },

    /// Report which steps are already satisfied, changing nothing
    Status,

    /// Print the resolved configuration
    Config,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, workspace: &Workspace) -> Result<()> {
        match self {
            Self::Install { skip_native } => install::execute(workspace, skip_native).await,
            Self::Status => status::execute(workspace).await,
            Self::Config => config::execute(workspace),
        }
    }
}

/// Where the project lives and where its settings and tools are
#[derive(Debug, Clone)]
pub struct Workspace {
    pub project_dir: PathBuf,
    pub env_file: PathBuf,
    pub tooling_dir: PathBuf,
}

impl Workspace {
    /// Relative overrides are taken from `project_dir`
    pub fn new(project_dir: PathBuf, env_file: Option<PathBuf>, tooling_dir: Option<PathBuf>) -> Self {
        let absolute = |p: PathBuf| if p.is_absolute() { p } else { project_dir.join(p) };
        Self {
            env_file: absolute(env_file.unwrap_or_else(|| PathBuf::from(defaults::ENV_FILE))),
            tooling_dir: absolute(tooling_dir.unwrap_or_else(|| PathBuf::from(defaults::TOOLING_DIR))),
            project_dir,
        }
    }

    pub fn config(&self) -> Result<ResolvedConfig> {
        Ok(ResolvedConfig::resolve(&self.env_file)?)
    }

    pub fn layout(&self) -> ToolchainLayout {
        ToolchainLayout::new(self.tooling_dir.clone())
    }
}
