//! Target platform descriptors for the fftpkg build configuration resolver.
//!
//! A platform is described by three immutable facts supplied by the caller:
//! - **Architecture:** x86, x86_64, ARM, or anything else
//! - **Compiler family:** gcc-like, MSVC-like, or other
//! - **Build type:** the CMake configuration to produce
//!
//! SIMD instruction-set levels are defined here as well, since their
//! validity is a property of the architecture.

pub mod arch;
pub mod compiler;
pub mod error;
pub mod parse;
pub mod platform;
pub mod simd;

pub use arch::Arch;
pub use compiler::{BuildType, CompilerFamily};
pub use error::{PlatformError, Result};
pub use parse::{
    discover_profiles, generate_template, load_profile_toml, parse_profile_toml,
    profile_to_toml, resolve_profile, validate_profile, ValidationIssue,
};
pub use platform::PlatformDescriptor;
pub use simd::{SimdChoice, SimdLevel, SimdRequest};
