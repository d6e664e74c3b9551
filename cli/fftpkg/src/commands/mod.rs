//! CLI command implementations.

pub mod bench;
pub mod build;
pub mod check;
pub mod clean;
pub mod doctor;
pub mod export;
pub mod info;
pub mod init;
pub mod package;
pub mod profile;
pub mod resolve;
pub mod source;
pub mod test_package;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use fftpkg_platform::{resolve_profile, PlatformDescriptor, SimdRequest};
use fftpkg_resolve::{
    AcquisitionPolicy, DeclaredOptions, OptionValue, ResolvedConfiguration, ResolverConfig,
    WITH_MKL, WITH_OPENMP,
};

use crate::manifest::RecipeManifest;

/// Everything under the project's `build/` directory is disposable.
pub const BUILD_DIR: &str = "build";
/// Resolution result written by `build` and read by `package`.
pub const RESOLVED_FILE: &str = "resolved.json";

pub fn build_root(project_dir: &Path) -> PathBuf {
    project_dir.join(BUILD_DIR)
}

pub fn default_source_dir(project_dir: &Path) -> PathBuf {
    build_root(project_dir).join("source")
}

pub fn default_cmake_dir(project_dir: &Path) -> PathBuf {
    build_root(project_dir).join("cmake")
}

pub fn default_package_dir(project_dir: &Path) -> PathBuf {
    build_root(project_dir).join("package")
}

/// A loaded recipe and the directory it lives in.
pub struct Recipe {
    pub dir: PathBuf,
    pub manifest: RecipeManifest,
}

/// Flags shared by every command that runs a resolution pass.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Platform profile (built-in name, `host`, or profiles/<name>.profile.toml)
    #[arg(long)]
    pub profile: Option<String>,
    /// Requested SIMD level (auto, avx2, avx, sse2, none)
    #[arg(long)]
    pub simd: Option<SimdRequest>,
    /// Require OpenMP
    #[arg(long, conflicts_with = "no_openmp")]
    pub openmp: bool,
    /// Build without OpenMP
    #[arg(long)]
    pub no_openmp: bool,
    /// Request the MKL backend (x86_64 only)
    #[arg(long, conflicts_with = "no_mkl")]
    pub mkl: bool,
    /// Do not request the MKL backend
    #[arg(long)]
    pub no_mkl: bool,
}

fn tri_state(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl ResolveArgs {
    /// Platform from `--profile`, the manifest default, or the host.
    pub fn platform(&self, recipe: &Recipe) -> Result<PlatformDescriptor> {
        let name = self
            .profile
            .as_deref()
            .or(recipe.manifest.build.profile.as_deref())
            .unwrap_or("host");
        resolve_profile(name, Some(&recipe.dir))
            .with_context(|| format!("loading profile '{name}'"))
    }

    /// Option sink for `platform`. Native builds only accept SIMD levels the
    /// host CPU can run.
    pub fn sink(&self, recipe: &Recipe, platform: &PlatformDescriptor) -> DeclaredOptions {
        let declared = recipe.manifest.declared_options();
        if platform.name == "host" {
            declared.restrict_simd_to_host("simd")
        } else {
            declared
        }
    }

    /// Resolver inputs: manifest defaults with command-line overrides.
    pub fn resolver_config(
        &self,
        recipe: &Recipe,
        platform: PlatformDescriptor,
        destination: PathBuf,
        lenient: bool,
    ) -> ResolverConfig {
        let manifest = &recipe.manifest;
        let mut options = manifest.option_set();
        if let Some(openmp) = tri_state(self.openmp, self.no_openmp) {
            options.set(WITH_OPENMP, OptionValue::Bool(openmp));
        }
        if let Some(mkl) = tri_state(self.mkl, self.no_mkl) {
            options.set(WITH_MKL, OptionValue::Bool(mkl));
        }

        let mut config = ResolverConfig::new(platform, destination);
        config.simd_request = self.simd.unwrap_or(manifest.options.simd);
        config.openmp_default = manifest.options.with_openmp;
        config.options = options;
        config.sources = manifest.source.urls.clone();
        config.marker = manifest.source.marker.clone();
        config.policy = if lenient {
            AcquisitionPolicy::Lenient
        } else {
            AcquisitionPolicy::from_strict(manifest.options.strict_acquisition)
        };
        config
    }
}

/// Option values identifying a binary package.
pub fn effective_options(
    resolved: &ResolvedConfiguration,
) -> std::collections::BTreeMap<String, String> {
    let mut options = std::collections::BTreeMap::new();
    options.insert(
        WITH_OPENMP.to_string(),
        resolved.parallelism.openmp_enabled().to_string(),
    );
    options.insert(WITH_MKL.to_string(), resolved.accelerated_backend.to_string());
    options.insert("simd".to_string(), resolved.simd.to_string());
    options
}

/// Write the resolution result next to the build tree.
pub fn save_resolved(dir: &Path, resolved: &ResolvedConfiguration) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(RESOLVED_FILE);
    let json = fftpkg_resolve::to_json(resolved)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read a resolution result saved by [`save_resolved`], if any.
pub fn load_resolved(dir: &Path) -> Result<Option<ResolvedConfiguration>> {
    let path = dir.join(RESOLVED_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let resolved = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(resolved))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A recipe rooted at `dir` with a manifest written to disk.
    pub fn recipe_in(dir: &Path, manifest: &str) -> Recipe {
        std::fs::write(dir.join(crate::manifest::MANIFEST_FILE), manifest).unwrap();
        Recipe {
            dir: dir.to_path_buf(),
            manifest: RecipeManifest::parse(manifest).unwrap(),
        }
    }
}
