//! `fftpkg profile`: platform profile listing, description, validation.

use std::path::Path;

use anyhow::{bail, Context, Result};
use fftpkg_platform::{
    discover_profiles, generate_template, profile_to_toml, resolve_profile, validate_profile,
    PlatformDescriptor, SimdLevel,
};

/// List built-in profiles and those found in `profiles/`.
pub fn list(project_dir: Option<&Path>) -> Result<()> {
    println!("Built-in profiles:");
    println!();
    for (name, description) in PlatformDescriptor::builtin_names() {
        println!("  {name:<25} {description}");
    }

    if let Some(dir) = project_dir {
        let custom = discover_profiles(dir)?;
        if !custom.is_empty() {
            println!();
            println!("Project profiles:");
            println!();
            for (name, path) in &custom {
                println!("  {name:<25} {}", path.display());
            }
        }
    }

    println!();
    println!("Use 'fftpkg profile describe <name>' for details.");
    Ok(())
}

/// Describe a profile in detail.
pub fn describe(name: &str, project_dir: Option<&Path>, format: Option<&str>) -> Result<()> {
    let profile = resolve_profile(name, project_dir).with_context(|| {
        format!("unknown profile: '{name}'. Use 'fftpkg profile list' to see available profiles.")
    })?;

    if format == Some("toml") {
        print!("{}", profile_to_toml(&profile)?);
        return Ok(());
    }

    println!("=== Profile: {} ===", profile.name);
    println!("Architecture: {}", profile.arch);
    println!("Compiler:     {}", profile.compiler);
    println!("Build type:   {}", profile.build_type);
    if let Some(os) = &profile.os {
        println!("OS:           {os}");
    }
    println!();

    println!("--- SIMD ---");
    if profile.arch.is_x86_family() {
        let chain: Vec<_> = SimdLevel::PREFERENCE.iter().map(|l| l.as_str()).collect();
        println!("  Fallback chain: {}", chain.join(" -> "));
    } else {
        println!("  Auto-detected by the library");
    }
    println!(
        "  Runs on this machine: {}",
        if profile.can_run_on(&PlatformDescriptor::host()) {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}

/// Validate a profile and print any issues.
pub fn validate(name: &str, project_dir: Option<&Path>) -> Result<()> {
    let profile = resolve_profile(name, project_dir)?;
    match validate_profile(&profile) {
        Ok(()) => {
            println!("Profile '{name}' is valid.");
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                println!("  [{}] {}", issue.severity, issue.message);
            }
            if issues.iter().any(|i| i.severity == "error") {
                bail!("profile '{name}' has errors");
            }
            Ok(())
        }
    }
}

/// Write `profiles/<name>.profile.toml` from the template.
pub fn add(name: &str, project_dir: &Path) -> Result<()> {
    let dir = project_dir.join("profiles");
    let path = dir.join(format!("{name}.profile.toml"));
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::create_dir_all(&dir)?;
    std::fs::write(&path, generate_template(name)?)?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_builtins() {
        describe("linux-x86_64-gcc", None, None).unwrap();
        describe("linux-armv8-gcc", None, Some("toml")).unwrap();
        assert!(describe("nonexistent", None, None).is_err());
    }

    #[test]
    fn add_then_validate_and_list() {
        let dir = tempfile::tempdir().unwrap();
        add("my-board", dir.path()).unwrap();
        assert!(dir.path().join("profiles/my-board.profile.toml").is_file());
        assert!(add("my-board", dir.path()).is_err());

        validate("my-board", Some(dir.path())).unwrap();
        list(Some(dir.path())).unwrap();
    }

    #[test]
    fn validate_rejects_broken_profile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("profiles")).unwrap();
        std::fs::write(
            dir.path().join("profiles/bad.profile.toml"),
            "name = \"\"\narch = \"x86_64\"\ncompiler = \"gcc\"\n",
        )
        .unwrap();
        assert!(validate("bad", Some(dir.path())).is_err());
    }
}
