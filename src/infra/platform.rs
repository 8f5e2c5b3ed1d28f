//! Host platform probing
//!
//! Every OS-conditional decision goes through [`Platform`]: executable naming,
//! download archive flavour, PATH lookups and vendor installer locations.
//! Nothing here mutates state.

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Vendor layout of the Visual Studio locator below a Program Files root
const VSWHERE_RELATIVE: &[&str] = &["Microsoft Visual Studio", "Installer", "vswhere.exe"];

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostFamily {
    Windows,
    Other,
}

impl HostFamily {
    /// Family of the machine this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }

    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }
}

impl std::fmt::Display for HostFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Query-only view of the host
#[derive(Debug, Clone)]
pub struct Platform {
    family: HostFamily,
    /// PATH used for program lookups; `None` means the inherited PATH
    search_path: Option<OsString>,
    /// Roots searched for vendor installers (Program Files on Windows)
    installer_roots: Vec<PathBuf>,
}

impl Platform {
    /// Detect the running host
    pub fn detect() -> Self {
        Self::new(HostFamily::current())
    }

    /// Platform of the given family using the inherited PATH
    pub fn new(family: HostFamily) -> Self {
        Self {
            family,
            search_path: None,
            installer_roots: default_installer_roots(),
        }
    }

    /// Resolve programs against `path` instead of the inherited PATH
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Replace the vendor installer search roots
    #[must_use]
    pub fn with_installer_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.installer_roots = roots;
        self
    }

    pub fn family(&self) -> HostFamily {
        self.family
    }

    pub fn is_windows(&self) -> bool {
        self.family.is_windows()
    }

    /// Path of a tool launcher inside `bin_dir`
    ///
    /// Flutter and the Android SDK ship `.bat` launchers on Windows and
    /// extensionless scripts elsewhere.
    pub fn tool_executable(&self, bin_dir: &Path, tool: &str) -> PathBuf {
        if self.is_windows() {
            bin_dir.join(format!("{tool}.bat"))
        } else {
            bin_dir.join(tool)
        }
    }

    /// Host tag used in Android cmdline-tools archive names
    pub fn archive_tag(&self) -> &'static str {
        if self.is_windows() {
            "win"
        } else {
            "linux"
        }
    }

    /// Resolve a program name on the search PATH
    pub fn find_program(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(path) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(path), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }

    /// Whether a program resolves on the search PATH
    pub fn has_program(&self, name: &str) -> bool {
        self.find_program(name).is_some()
    }

    /// Locate an installer under a vendor layout, falling back to PATH
    ///
    /// `relative` is joined onto each root in order; the first existing file
    /// wins. If none exists the file name of `relative` is looked up on PATH.
    pub fn find_existing_installer(&self, roots: &[PathBuf], relative: &Path) -> Option<PathBuf> {
        roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
            .or_else(|| {
                relative
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| self.find_program(name))
            })
    }

    /// Locate the Visual Studio locator utility (`vswhere.exe`)
    pub fn vswhere(&self) -> Option<PathBuf> {
        let relative: PathBuf = VSWHERE_RELATIVE.iter().collect();
        self.find_existing_installer(&self.installer_roots, &relative)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

/// Program Files roots, honouring the environment like Windows does
fn default_installer_roots() -> Vec<PathBuf> {
    let x86 = std::env::var_os("ProgramFiles(x86)")
        .map_or_else(|| PathBuf::from(r"C:\Program Files (x86)"), PathBuf::from);
    let native = std::env::var_os("ProgramFiles")
        .map_or_else(|| PathBuf::from(r"C:\Program Files"), PathBuf::from);
    vec![x86, native]
}
