//! `fftpkg package`: lay out built artifacts and record their hashes.

use std::path::Path;

use anyhow::{Context, Result};
use fftpkg_package::{package, PackageLayout, PackageManifest};

use super::{effective_options, load_resolved, Recipe, ResolveArgs};

/// Package the build tree in `build` with sources from `source` into `dest`.
///
/// The platform and options recorded by `fftpkg build` identify the
/// package; without them the current flags are resolved again.
pub fn run(
    recipe: &Recipe,
    args: &ResolveArgs,
    source: &Path,
    build: &Path,
    dest: &Path,
) -> Result<PackageManifest> {
    let resolved = match load_resolved(build)? {
        Some(resolved) => resolved,
        None => {
            log::info!(
                "no resolution recorded in {}; resolving from flags",
                build.display()
            );
            super::resolve::decide(recipe, args)?
        }
    };

    let layout = PackageLayout::otfft()?;
    let summary = package(&layout, source, build, dest)
        .with_context(|| format!("packaging into {}", dest.display()))?;
    if summary.is_empty() {
        log::warn!("no artifacts matched in {}", build.display());
    }

    let meta = &recipe.manifest.package;
    let manifest = PackageManifest::from_summary(
        &meta.name,
        &meta.version,
        &resolved.platform,
        &effective_options(&resolved),
        dest,
        &summary,
    )?;
    manifest.write(dest)?;

    print!("{summary}");
    println!();
    println!("Package id: {}", manifest.package_id);
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::recipe_in;
    use fftpkg_package::MANIFEST_FILE;

    #[test]
    fn packages_and_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), "[package]\nname = \"otfft\"\nversion = \"11.5\"\n");
        let source = dir.path().join("source");
        let build = dir.path().join("build");
        let dest = dir.path().join("pkg");
        std::fs::create_dir_all(source.join("inc")).unwrap();
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(source.join("LICENSE"), "MIT").unwrap();
        std::fs::write(source.join("inc/otfft.h"), "#pragma once").unwrap();
        std::fs::write(build.join("a.so"), "so").unwrap();
        std::fs::write(build.join("b.a"), "a").unwrap();
        std::fs::write(build.join("lib.h"), "h").unwrap();

        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let manifest = run(&recipe, &args, &source, &build, &dest).unwrap();
        assert_eq!(manifest.files.len(), 5);
        assert!(manifest.files.contains_key("lib/a.so"));
        assert!(manifest.files.contains_key("lib/b.a"));
        assert!(manifest.files.contains_key("include/lib.h"));
        assert!(manifest.files.contains_key("licenses/LICENSE"));
        assert_eq!(manifest.options["simd"], "avx2");
        assert!(dest.join(MANIFEST_FILE).is_file());

        let loaded = PackageManifest::load(&dest).unwrap();
        loaded.verify(&dest).unwrap();
    }
}
