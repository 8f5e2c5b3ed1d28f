//! Default configuration values

/// Override file read from the working directory
pub const ENV_FILE: &str = ".env";

/// Toolchain root directory, relative to the working directory
pub const TOOLING_DIR: &str = ".tooling";

/// Version-controlled tool subtree under the toolchain root
pub const FLUTTER_DIR: &str = "flutter";

/// SDK subtree under the toolchain root
pub const ANDROID_SDK_DIR: &str = "android-sdk";

/// Maximum number of download retry attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Number of affirmative lines fed to `sdkmanager --licenses`
pub const LICENSE_ACCEPT_LINES: usize = 200;

/// Recognized override keys and their defaults
pub mod keys {
    pub const FLUTTER_CHANNEL: &str = "FLUTTER_CHANNEL";
    pub const FLUTTER_REF: &str = "FLUTTER_REF";
    pub const FLUTTER_GIT_URL: &str = "FLUTTER_GIT_URL";
    pub const ANDROID_CMDLINE_TOOLS: &str = "ANDROID_CMDLINE_TOOLS";
    pub const ANDROID_CMDLINE_TOOLS_SHA256: &str = "ANDROID_CMDLINE_TOOLS_SHA256";
    pub const ANDROID_REPOSITORY_URL: &str = "ANDROID_REPOSITORY_URL";
    pub const ANDROID_PLATFORM: &str = "ANDROID_PLATFORM";
    pub const ANDROID_BUILD_TOOLS: &str = "ANDROID_BUILD_TOOLS";
    pub const ANDROID_NDK: &str = "ANDROID_NDK";
    pub const ANDROID_CMAKE: &str = "ANDROID_CMAKE";
}

/// `(key, default)` for every recognized override
pub const RECOGNIZED: &[(&str, &str)] = &[
    (keys::FLUTTER_CHANNEL, "stable"),
    (keys::FLUTTER_REF, ""),
    (keys::FLUTTER_GIT_URL, super::urls::FLUTTER_GIT),
    (keys::ANDROID_CMDLINE_TOOLS, "11076708"),
    (keys::ANDROID_CMDLINE_TOOLS_SHA256, ""),
    (keys::ANDROID_REPOSITORY_URL, super::urls::ANDROID_REPOSITORY),
    (keys::ANDROID_PLATFORM, "android-34"),
    (keys::ANDROID_BUILD_TOOLS, "34.0.0"),
    (keys::ANDROID_NDK, "26.1.10909125"),
    (keys::ANDROID_CMAKE, "3.22.1"),
];
