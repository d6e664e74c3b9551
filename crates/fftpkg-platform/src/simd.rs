//! SIMD instruction-set levels.
//!
//! Levels form a total order `none < sse2 < avx < avx2`. Resolution walks
//! the order downward from the requested level; see
//! `fftpkg_resolve::resolve_simd_level`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arch::Arch;
use crate::error::PlatformError;

/// A SIMD instruction-set tier for x86-family targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimdLevel {
    None,
    Sse2,
    Avx,
    Avx2,
}

impl SimdLevel {
    /// All levels, most capable first.
    pub const PREFERENCE: [SimdLevel; 4] =
        [SimdLevel::Avx2, SimdLevel::Avx, SimdLevel::Sse2, SimdLevel::None];

    pub fn as_str(self) -> &'static str {
        match self {
            SimdLevel::None => "none",
            SimdLevel::Sse2 => "sse2",
            SimdLevel::Avx => "avx",
            SimdLevel::Avx2 => "avx2",
        }
    }

    /// The next level down in the fallback order, if any.
    pub fn next_lower(self) -> Option<SimdLevel> {
        match self {
            SimdLevel::Avx2 => Some(SimdLevel::Avx),
            SimdLevel::Avx => Some(SimdLevel::Sse2),
            SimdLevel::Sse2 => Some(SimdLevel::None),
            SimdLevel::None => None,
        }
    }

    /// This level followed by every lower level.
    pub fn fallback_chain(self) -> impl Iterator<Item = SimdLevel> {
        std::iter::successors(Some(self), |level| level.next_lower())
    }

    /// Whether this level is meaningful on the given architecture.
    pub fn valid_for(self, arch: Arch) -> bool {
        arch.is_x86_family()
    }

    /// gcc/clang code-generation flag.
    pub fn gcc_flag(self) -> Option<&'static str> {
        match self {
            SimdLevel::None => None,
            SimdLevel::Sse2 => Some("-msse2"),
            SimdLevel::Avx => Some("-mavx"),
            SimdLevel::Avx2 => Some("-mavx2"),
        }
    }

    /// MSVC code-generation flag.
    pub fn msvc_flag(self) -> Option<&'static str> {
        match self {
            SimdLevel::None => None,
            SimdLevel::Sse2 => Some("/arch:SSE2"),
            SimdLevel::Avx => Some("/arch:AVX"),
            SimdLevel::Avx2 => Some("/arch:AVX2"),
        }
    }

    /// Whether the CPU running this process can execute code built at
    /// this level.
    pub fn host_supports(self) -> bool {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            match self {
                SimdLevel::None => true,
                SimdLevel::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
                SimdLevel::Avx => std::arch::is_x86_feature_detected!("avx"),
                SimdLevel::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
            }
        }
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        {
            self == SimdLevel::None
        }
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimdLevel {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SimdLevel::None),
            "sse2" => Ok(SimdLevel::Sse2),
            "avx" => Ok(SimdLevel::Avx),
            "avx2" => Ok(SimdLevel::Avx2),
            _ => Err(PlatformError::InvalidValue {
                field: "simd",
                value: s.to_string(),
            }),
        }
    }
}

/// The caller's SIMD preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SimdRequest {
    /// Start from the most capable level.
    #[default]
    Auto,
    Level(SimdLevel),
}

impl SimdRequest {
    /// First level the fallback chain attempts.
    pub fn starting_level(self) -> SimdLevel {
        match self {
            SimdRequest::Auto => SimdLevel::Avx2,
            SimdRequest::Level(level) => level,
        }
    }
}

impl fmt::Display for SimdRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdRequest::Auto => f.write_str("auto"),
            SimdRequest::Level(level) => write!(f, "{level}"),
        }
    }
}

impl FromStr for SimdRequest {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SimdRequest::Auto);
        }
        s.parse().map(SimdRequest::Level)
    }
}

impl TryFrom<String> for SimdRequest {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SimdRequest> for String {
    fn from(request: SimdRequest) -> Self {
        request.to_string()
    }
}

/// Outcome of SIMD resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "level")]
pub enum SimdChoice {
    /// Non-x86 target: instruction-set detection is left to the library.
    AutoDetect,
    /// An explicit level accepted by the configuration system.
    Level(SimdLevel),
    /// Every level was rejected; the option stays at its default.
    Unset,
}

impl SimdChoice {
    pub fn level(self) -> Option<SimdLevel> {
        match self {
            SimdChoice::Level(level) => Some(level),
            _ => None,
        }
    }
}

impl fmt::Display for SimdChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdChoice::AutoDetect => f.write_str("auto-detect"),
            SimdChoice::Level(level) => write!(f, "{level}"),
            SimdChoice::Unset => f.write_str("unset (library default)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order() {
        assert!(SimdLevel::None < SimdLevel::Sse2);
        assert!(SimdLevel::Sse2 < SimdLevel::Avx);
        assert!(SimdLevel::Avx < SimdLevel::Avx2);
        let mut sorted = SimdLevel::PREFERENCE;
        sorted.sort();
        sorted.reverse();
        assert_eq!(sorted, SimdLevel::PREFERENCE);
    }

    #[test]
    fn chain_from_avx2() {
        let chain: Vec<_> = SimdLevel::Avx2.fallback_chain().collect();
        assert_eq!(chain, SimdLevel::PREFERENCE.to_vec());
    }

    #[test]
    fn chain_from_sse2() {
        let chain: Vec<_> = SimdLevel::Sse2.fallback_chain().collect();
        assert_eq!(chain, vec![SimdLevel::Sse2, SimdLevel::None]);
    }

    #[test]
    fn validity_is_x86_only() {
        assert!(SimdLevel::Avx.valid_for(Arch::X86));
        assert!(SimdLevel::Avx2.valid_for(Arch::X86_64));
        assert!(!SimdLevel::Sse2.valid_for(Arch::Arm));
        assert!(!SimdLevel::None.valid_for(Arch::Other));
    }

    #[test]
    fn request_parsing() {
        assert_eq!("auto".parse::<SimdRequest>().unwrap(), SimdRequest::Auto);
        assert_eq!(
            "AVX".parse::<SimdRequest>().unwrap(),
            SimdRequest::Level(SimdLevel::Avx)
        );
        assert!("neon".parse::<SimdRequest>().is_err());
        assert_eq!(SimdRequest::Auto.starting_level(), SimdLevel::Avx2);
    }

    #[test]
    fn none_always_supported_on_host() {
        assert!(SimdLevel::None.host_supports());
    }

    #[test]
    fn flags() {
        assert_eq!(SimdLevel::Avx2.gcc_flag(), Some("-mavx2"));
        assert_eq!(SimdLevel::Avx.msvc_flag(), Some("/arch:AVX"));
        assert_eq!(SimdLevel::None.gcc_flag(), None);
    }
}
