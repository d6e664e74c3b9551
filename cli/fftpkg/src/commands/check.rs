//! `fftpkg check`: validate a recipe directory's structure.

use std::path::Path;

use anyhow::{bail, Result};
use fftpkg_platform::ValidationIssue;

use crate::manifest::{RecipeManifest, MANIFEST_FILE};

fn error(message: String) -> ValidationIssue {
    ValidationIssue {
        severity: "error",
        message,
    }
}

fn warning(message: String) -> ValidationIssue {
    ValidationIssue {
        severity: "warning",
        message,
    }
}

/// Collect every issue in the recipe at `dir`.
pub fn inspect(dir: &Path) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match RecipeManifest::load(&dir.join(MANIFEST_FILE)) {
        Ok(manifest) => {
            let meta = &manifest.package;
            let required = [
                ("name", Some(meta.name.as_str())),
                ("version", Some(meta.version.as_str())),
                ("license", meta.license.as_deref()),
                ("description", meta.description.as_deref()),
            ];
            for (field, value) in required {
                if value.map_or(true, |v| v.trim().is_empty()) {
                    issues.push(error(format!("package.{field} is required")));
                }
            }
            if manifest.source.urls.is_empty() {
                issues.push(warning(
                    "source.urls is empty; sources must be exported with the recipe".into(),
                ));
            }
        }
        Err(e) => issues.push(error(format!("{e:#}"))),
    }

    let layout: [(&str, &[&str]); 2] = [
        (
            "test_package",
            &[MANIFEST_FILE, "CMakeLists.txt", "src/test.cpp"],
        ),
        ("example", &["CMakeLists.txt"]),
    ];
    for (subdir, files) in layout {
        let root = dir.join(subdir);
        if !root.is_dir() {
            issues.push(warning(format!("{subdir}/ directory not found")));
            continue;
        }
        for file in files {
            if !root.join(file).is_file() {
                issues.push(warning(format!("{subdir}/{file} not found")));
            }
        }
    }

    issues
}

pub fn run(dir: &Path) -> Result<()> {
    println!("=== Recipe Check: {} ===", dir.display());
    let issues = inspect(dir);
    for issue in &issues {
        println!("  [{}] {}", issue.severity, issue.message);
    }

    let errors = issues.iter().filter(|i| i.severity == "error").count();
    if errors > 0 {
        bail!("recipe check failed with {errors} error(s)");
    }
    println!("Recipe OK ({} warning(s))", issues.len());
    Ok(())
}
