//! TOML parsing, serialization, validation, and discovery for platform profiles.
//!
//! Profiles are stored as `.profile.toml` files in the `profiles/` directory
//! next to a `recipe.toml`. Built-in profiles are always available and take
//! precedence over files with the same name.

use std::path::{Path, PathBuf};

use crate::arch::Arch;
use crate::compiler::CompilerFamily;
use crate::error::{PlatformError, Result};
use crate::platform::PlatformDescriptor;

const PROFILE_SUFFIX: &str = ".profile.toml";

/// A validation issue found in a profile.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a profile from a `.profile.toml` file.
pub fn load_profile_toml(path: &Path) -> Result<PlatformDescriptor> {
    if !path.exists() {
        return Err(PlatformError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_profile_toml(&content)
}

/// Parse a profile from a TOML string.
pub fn parse_profile_toml(toml_str: &str) -> Result<PlatformDescriptor> {
    let profile: PlatformDescriptor = toml::from_str(toml_str)?;
    Ok(profile)
}

/// Serialize a profile to pretty TOML.
pub fn profile_to_toml(profile: &PlatformDescriptor) -> Result<String> {
    Ok(toml::to_string_pretty(profile)?)
}

/// Check a profile for combinations that will not build or will build
/// something other than what the author likely meant.
pub fn validate_profile(profile: &PlatformDescriptor) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if profile.name.trim().is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "profile name is empty".into(),
        });
    }

    if profile.compiler == CompilerFamily::MsvcLike {
        if let Some(os) = &profile.os {
            if !os.eq_ignore_ascii_case("windows") {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!("MSVC-like compiler cannot target os '{os}'"),
                });
            }
        }
    }

    if profile.compiler == CompilerFamily::Other {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "unknown compiler family: no SIMD or OpenMP flags will be exported".into(),
        });
    }

    if profile.arch == Arch::Other {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "architecture is not x86 or ARM: SIMD selection is left to auto-detect"
                .into(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template `.profile.toml`, seeded from linux-x86_64-gcc.
pub fn generate_template(name: &str) -> Result<String> {
    let mut profile = PlatformDescriptor::linux_x86_64_gcc();
    profile.name = name.into();
    profile_to_toml(&profile)
}

/// Discover all `.profile.toml` files in a project's `profiles/` directory.
///
/// Returns a list of (profile_name, file_path) pairs sorted by name.
pub fn discover_profiles(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let profiles_dir = project_dir.join("profiles");
    if !profiles_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut profiles = Vec::new();
    for entry in std::fs::read_dir(&profiles_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(PROFILE_SUFFIX));
        if let Some(name) = name {
            profiles.push((name.to_string(), path.clone()));
        }
    }
    profiles.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(profiles)
}

/// Resolve a profile name: built-ins first, then `profiles/<name>.profile.toml`.
pub fn resolve_profile(name: &str, project_dir: Option<&Path>) -> Result<PlatformDescriptor> {
    if let Some(profile) = PlatformDescriptor::builtin(name) {
        return Ok(profile);
    }
    if let Some(dir) = project_dir {
        let path = dir.join("profiles").join(format!("{name}{PROFILE_SUFFIX}"));
        if path.is_file() {
            return load_profile_toml(&path);
        }
    }
    Err(PlatformError::UnknownProfile {
        name: name.to_string(),
    })
}
