//! Toolchain directory layout
//!
//! All paths under the toolchain root are computed here once per run.
//! The presence of a marker path is what makes a step skip.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::infra::platform::Platform;

/// Paths of the installed tools under one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainLayout {
    root: PathBuf,
    flutter_root: PathBuf,
    android_sdk: PathBuf,
}

impl ToolchainLayout {
    /// Layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            flutter_root: root.join(defaults::FLUTTER_DIR),
            android_sdk: root.join(defaults::ANDROID_SDK_DIR),
            root,
        }
    }

    /// Default layout below `project_dir`
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(defaults::TOOLING_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flutter_root(&self) -> &Path {
        &self.flutter_root
    }

    /// Sibling of the Flutter root where a checkout is prepared before it
    /// is moved into place
    pub fn flutter_staging(&self) -> PathBuf {
        let mut name = self
            .flutter_root
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".partial");
        self.flutter_root.with_file_name(name)
    }

    pub fn android_sdk(&self) -> &Path {
        &self.android_sdk
    }

    /// `<sdk>/cmdline-tools/latest`
    pub fn cmdline_tools_latest(&self) -> PathBuf {
        self.android_sdk.join("cmdline-tools").join("latest")
    }

    pub fn cmdline_tools_bin(&self) -> PathBuf {
        self.cmdline_tools_latest().join("bin")
    }

    pub fn platform_tools(&self) -> PathBuf {
        self.android_sdk.join("platform-tools")
    }

    /// Flutter launcher; its presence marks Flutter as installed
    pub fn flutter_executable(&self, platform: &Platform) -> PathBuf {
        platform.tool_executable(&self.flutter_root.join("bin"), "flutter")
    }

    /// sdkmanager launcher; its presence marks cmdline-tools as installed
    pub fn sdkmanager_executable(&self, platform: &Platform) -> PathBuf {
        platform.tool_executable(&self.cmdline_tools_bin(), "sdkmanager")
    }
}
