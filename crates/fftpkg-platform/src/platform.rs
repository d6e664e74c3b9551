//! Complete platform descriptor.
//!
//! Assembles architecture, compiler family, and build type into the
//! immutable input of a resolution pass.

use serde::{Deserialize, Serialize};

use crate::arch::Arch;
use crate::compiler::{BuildType, CompilerFamily};

/// Everything the resolver needs to know about the build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformDescriptor {
    /// Profile name (e.g., "linux-x86_64-gcc").
    pub name: String,
    /// Target architecture.
    pub arch: Arch,
    /// Compiler family used for the build.
    pub compiler: CompilerFamily,
    /// CMake build configuration.
    #[serde(default)]
    pub build_type: BuildType,
    /// Target operating system, if known (e.g., "Linux", "Windows").
    #[serde(default)]
    pub os: Option<String>,
}

impl PlatformDescriptor {
    /// Compose a descriptor with the default (Release) build type.
    pub fn new(name: impl Into<String>, arch: Arch, compiler: CompilerFamily) -> Self {
        Self {
            name: name.into(),
            arch,
            compiler,
            build_type: BuildType::default(),
            os: None,
        }
    }

    /// Same descriptor with a different build type.
    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Same descriptor with the operating system set.
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    /// Descriptor for the machine running this process.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Macos",
            "windows" => "Windows",
            other => other,
        };
        Self::new("host", Arch::host(), CompilerFamily::host_default()).with_os(os)
    }

    /// Whether binaries built for `self` can be executed on `host`.
    ///
    /// 32-bit x86 binaries run on x86_64 hosts. Operating systems must match
    /// when both sides declare one.
    pub fn can_run_on(&self, host: &PlatformDescriptor) -> bool {
        let arch_ok = self.arch == host.arch
            || (self.arch == Arch::X86 && host.arch == Arch::X86_64);
        let os_ok = match (&self.os, &host.os) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        };
        arch_ok && os_ok && self.arch != Arch::Other
    }

    pub fn linux_x86_64_gcc() -> Self {
        Self::new("linux-x86_64-gcc", Arch::X86_64, CompilerFamily::GccLike).with_os("Linux")
    }

    pub fn linux_x86_gcc() -> Self {
        Self::new("linux-x86-gcc", Arch::X86, CompilerFamily::GccLike).with_os("Linux")
    }

    pub fn linux_armv8_gcc() -> Self {
        Self::new("linux-armv8-gcc", Arch::Arm, CompilerFamily::GccLike).with_os("Linux")
    }

    pub fn windows_x86_64_msvc() -> Self {
        Self::new("windows-x86_64-msvc", Arch::X86_64, CompilerFamily::MsvcLike)
            .with_os("Windows")
    }

    pub fn macos_armv8_clang() -> Self {
        Self::new("macos-armv8-clang", Arch::Arm, CompilerFamily::GccLike).with_os("Macos")
    }

    /// Look up a built-in profile by name. `"host"` describes this machine.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "host" => Some(Self::host()),
            "linux-x86_64-gcc" => Some(Self::linux_x86_64_gcc()),
            "linux-x86-gcc" => Some(Self::linux_x86_gcc()),
            "linux-armv8-gcc" => Some(Self::linux_armv8_gcc()),
            "windows-x86_64-msvc" => Some(Self::windows_x86_64_msvc()),
            "macos-armv8-clang" => Some(Self::macos_armv8_clang()),
            _ => None,
        }
    }

    /// Built-in profile names with one-line descriptions.
    pub fn builtin_names() -> Vec<(&'static str, &'static str)> {
        vec![
            ("host", "The machine running fftpkg"),
            ("linux-x86_64-gcc", "Linux, 64-bit x86, gcc/clang"),
            ("linux-x86-gcc", "Linux, 32-bit x86, gcc/clang"),
            ("linux-armv8-gcc", "Linux, 64-bit ARM, gcc/clang"),
            ("windows-x86_64-msvc", "Windows, 64-bit x86, MSVC"),
            ("macos-armv8-clang", "macOS, Apple silicon, apple-clang"),
        ]
    }
}
