//! Override resolution
//!
//! Reads the `key=value` override file and merges it over the compiled-in
//! defaults in [`crate::config::defaults::RECOGNIZED`]. The result is built
//! once per run and read-only afterwards.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::defaults::{keys, RECOGNIZED};
use crate::error::ConfigError;

/// Parse env-style `key=value` content
///
/// Blank lines, `#` comments and lines without `=` are skipped. The first
/// `=` splits key from value; surrounding quotes on the value are stripped.
pub fn parse_env(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches('\'').trim_matches('"');
        map.insert(key.to_string(), value.to_string());
    }
    map
}

/// Read an override file; a missing file yields no overrides
pub fn load_overrides(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_env(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No override file, using defaults");
            Ok(BTreeMap::new())
        }
        Err(e) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

/// Immutable parameter set handed to every install step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
    values: BTreeMap<String, String>,
}

impl ResolvedConfig {
    /// Defaults only
    pub fn defaults() -> Self {
        Self::from_overrides(BTreeMap::new())
    }

    /// Merge `overrides` over the defaults; overrides win
    pub fn from_overrides(overrides: BTreeMap<String, String>) -> Self {
        let mut values: BTreeMap<String, String> = RECOGNIZED
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        values.extend(overrides);
        Self { values }
    }

    /// Load overrides from `path` and merge them over the defaults
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        let overrides = load_overrides(path)?;
        debug!(path = %path.display(), overrides = overrides.len(), "Resolved configuration");
        Ok(Self::from_overrides(overrides))
    }

    /// Value for `key`, or `""` for an unknown key
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Whether `key` is one of the recognized settings
    pub fn is_recognized(key: &str) -> bool {
        RECOGNIZED.iter().any(|(k, _)| *k == key)
    }

    /// All resolved `(key, value)` pairs, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn flutter_channel(&self) -> &str {
        self.get(keys::FLUTTER_CHANNEL).trim()
    }

    /// Exact git ref to check out; `None` when unset or blank
    pub fn flutter_ref(&self) -> Option<&str> {
        Some(self.get(keys::FLUTTER_REF).trim()).filter(|r| !r.is_empty())
    }

    pub fn flutter_git_url(&self) -> &str {
        self.get(keys::FLUTTER_GIT_URL)
    }

    pub fn cmdline_tools_version(&self) -> &str {
        self.get(keys::ANDROID_CMDLINE_TOOLS)
    }

    /// Expected archive checksum; `None` when verification is off
    pub fn cmdline_tools_sha256(&self) -> Option<&str> {
        Some(self.get(keys::ANDROID_CMDLINE_TOOLS_SHA256).trim()).filter(|s| !s.is_empty())
    }

    pub fn android_repository_url(&self) -> &str {
        self.get(keys::ANDROID_REPOSITORY_URL).trim_end_matches('/')
    }

    pub fn android_platform(&self) -> &str {
        self.get(keys::ANDROID_PLATFORM)
    }

    pub fn android_build_tools(&self) -> &str {
        self.get(keys::ANDROID_BUILD_TOOLS)
    }

    pub fn android_ndk(&self) -> &str {
        self.get(keys::ANDROID_NDK)
    }

    pub fn android_cmake(&self) -> &str {
        self.get(keys::ANDROID_CMAKE)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
