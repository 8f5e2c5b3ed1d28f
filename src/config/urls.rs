//! Upstream locations and installer identifiers

/// Flutter git repository
pub const FLUTTER_GIT: &str = "https://github.com/flutter/flutter";

/// Android repository base URL (cmdline-tools archives)
pub const ANDROID_REPOSITORY: &str = "https://dl.google.com/android/repository";

/// winget package id for the JDK installed when `java` is missing
pub const WINGET_JDK_ID: &str = "Microsoft.OpenJDK.17";

/// winget package id for the MSVC build tools
pub const WINGET_BUILD_TOOLS_ID: &str = "Microsoft.VisualStudio.2022.BuildTools";

/// Component that must be present for MSVC to count as installed
pub const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";

/// Installer override adding the C++ workload unattended
pub const BUILD_TOOLS_OVERRIDE: &str =
    "--add Microsoft.VisualStudio.Workload.VCTools --includeRecommended --passive --norestart --wait";
