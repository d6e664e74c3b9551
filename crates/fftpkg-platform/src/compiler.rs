//! Compiler identity and build type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Compiler family. Flags and option spellings differ between families,
/// not between individual compilers inside a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompilerFamily {
    /// gcc, clang, apple-clang, intel-cc and friends.
    GccLike,
    /// MSVC and clang-cl.
    MsvcLike,
    Other,
}

impl CompilerFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            CompilerFamily::GccLike => "gcc",
            CompilerFamily::MsvcLike => "msvc",
            CompilerFamily::Other => "other",
        }
    }

    /// Fold a compiler name into its family.
    pub fn classify(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "gcc" | "g++" | "clang" | "clang++" | "apple-clang" | "intel-cc" | "mingw" => {
                CompilerFamily::GccLike
            }
            "msvc" | "visual studio" | "clang-cl" | "cl" => CompilerFamily::MsvcLike,
            _ => CompilerFamily::Other,
        }
    }

    /// Default family for the host operating system.
    pub fn host_default() -> Self {
        if cfg!(target_env = "msvc") {
            CompilerFamily::MsvcLike
        } else {
            CompilerFamily::GccLike
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PlatformError::InvalidValue {
                field: "compiler",
                value: s.to_string(),
            });
        }
        Ok(CompilerFamily::classify(s))
    }
}

impl TryFrom<String> for CompilerFamily {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompilerFamily> for String {
    fn from(family: CompilerFamily) -> Self {
        family.as_str().to_string()
    }
}

/// CMake build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Spelling expected by `CMAKE_BUILD_TYPE`.
    pub fn cmake_name(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmake_name())
    }
}

impl FromStr for BuildType {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(PlatformError::InvalidValue {
                field: "build-type",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for BuildType {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BuildType> for String {
    fn from(build_type: BuildType) -> Self {
        build_type.cmake_name().to_string()
    }
}
