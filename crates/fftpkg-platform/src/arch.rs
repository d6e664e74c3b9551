//! CPU architecture classification.
//!
//! Architecture names arrive in many spellings (`amd64`, `x86_64`, `armv8`,
//! `aarch64`, ...). They are folded into the four classes the resolver
//! cares about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Architecture class of a build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Arch {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
    /// Any ARM variant, 32 or 64 bit.
    Arm,
    /// Anything else (RISC-V, PowerPC, wasm, ...).
    Other,
}

impl Arch {
    /// Whether the SSE/AVX family of SIMD levels applies.
    pub fn is_x86_family(self) -> bool {
        matches!(self, Arch::X86 | Arch::X86_64)
    }

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Arm => "armv8",
            Arch::Other => "other",
        }
    }

    /// Architecture of the machine running this process.
    pub fn host() -> Self {
        Arch::classify(std::env::consts::ARCH)
    }

    /// Fold an architecture name into its class. Never fails; unknown
    /// names become [`Arch::Other`].
    pub fn classify(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "x86_64" | "amd64" | "x64" | "x86-64" => Arch::X86_64,
            "x86" | "i386" | "i486" | "i586" | "i686" => Arch::X86,
            s if s.starts_with("arm") || s.starts_with("aarch64") => Arch::Arm,
            _ => Arch::Other,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PlatformError::InvalidValue {
                field: "arch",
                value: s.to_string(),
            });
        }
        Ok(Arch::classify(s))
    }
}

impl TryFrom<String> for Arch {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Arch> for String {
    fn from(arch: Arch) -> Self {
        arch.as_str().to_string()
    }
}
