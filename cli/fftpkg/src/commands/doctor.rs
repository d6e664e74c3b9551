//! `fftpkg doctor`: toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use fftpkg_platform::{PlatformDescriptor, SimdLevel};

use crate::manifest::RecipeManifest;

/// Print toolchain diagnostic information.
pub fn run(project_dir: &Path) -> Result<()> {
    println!("=== fftpkg Doctor ===");
    println!();
    println!("fftpkg version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let host = PlatformDescriptor::host();
    println!("--- Host ---");
    println!("  Architecture: {}", host.arch);
    println!("  Compiler:     {}", host.compiler);
    if host.arch.is_x86_family() {
        let supported: Vec<_> = SimdLevel::PREFERENCE
            .iter()
            .filter(|l| l.host_supports())
            .map(|l| l.as_str())
            .collect();
        println!("  SIMD:         {}", supported.join(", "));
    }
    println!();

    println!("--- System Tools ---");
    print_tool_status("cmake", &["--version"]);
    print_tool_status("curl", &["--version"]);
    print_tool_status("unzip", &["-v"]);
    print_tool_status("cc", &["--version"]);
    print_tool_status("c++", &["--version"]);
    println!();

    println!("--- Recipe Status ---");
    match RecipeManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  recipe.toml: found at {}", dir.display());
            println!("  Package:     {}", manifest.package.name);
            println!("  Version:     {}", manifest.package.version);
            println!("  Sources:     {} candidate(s)", manifest.source.urls.len());
        }
        Ok(None) => println!("  recipe.toml: not found"),
        Err(e) => println!("  recipe.toml: error: {e:#}"),
    }

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => println!("  {name}: not found"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn doctor_runs_without_error() {
        let dir = tempfile::tempdir().unwrap();
        super::run(dir.path()).unwrap();
    }
}
