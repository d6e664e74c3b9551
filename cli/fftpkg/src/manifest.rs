//! `recipe.toml` manifest parsing and recipe configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fftpkg_platform::{SimdLevel, SimdRequest};
use fftpkg_resolve::{BuildOptionSet, DeclaredOptions, DefinitionNames, WITH_MKL, WITH_OPENMP};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "recipe.toml";

/// Upstream archive of the library.
pub const UPSTREAM_ARCHIVE: &str =
    "https://github.com/DEWETRON/otfft/archive/refs/heads/master.zip";

/// The top-level manifest structure for a recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeManifest {
    /// Package metadata (required).
    pub package: PackageConfig,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Package metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "otfft".into(),
            version: "11.5".into(),
            license: Some("MIT".into()),
            description: None,
            author: None,
            url: None,
            topics: Vec::new(),
        }
    }
}

/// Option defaults and the values each option accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    #[serde(default = "default_true")]
    pub with_openmp: bool,
    #[serde(default)]
    pub with_mkl: bool,
    #[serde(default)]
    pub simd: SimdRequest,
    /// Whether exhausting every source candidate fails the build.
    #[serde(default = "default_true")]
    pub strict_acquisition: bool,
    /// Accepted values per option. `simd` defaults to every level.
    #[serde(default)]
    pub accepted: BTreeMap<String, Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            with_openmp: true,
            with_mkl: false,
            simd: SimdRequest::Auto,
            strict_acquisition: true,
            accepted: BTreeMap::new(),
        }
    }
}

/// Candidate source origins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub urls: Vec<String>,
    /// File marking an already-populated source tree.
    #[serde(default = "default_marker")]
    pub marker: Option<String>,
}

fn default_marker() -> Option<String> {
    Some("CMakeLists.txt".into())
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: vec![UPSTREAM_ARCHIVE.to_string()],
            marker: default_marker(),
        }
    }
}

/// CMake invocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Profile used when `--profile` is not given.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub definitions: DefinitionNames,
}

impl RecipeManifest {
    /// Search upward from `start_dir` for a `recipe.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let manifest = Self::load(&candidate)?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Declared options of the library: accepted values from the manifest,
    /// every SIMD level when `simd` is not listed, and the boolean toggles.
    pub fn declared_options(&self) -> DeclaredOptions {
        let mut declared = DeclaredOptions::new()
            .declare_bool(WITH_OPENMP)
            .declare_bool(WITH_MKL);
        if !self.options.accepted.contains_key("simd") {
            declared = declared.declare("simd", SimdLevel::PREFERENCE.map(SimdLevel::as_str));
        }
        for (option, values) in &self.options.accepted {
            declared = declared.declare(option, values.iter().cloned());
        }
        declared
    }

    /// Option toggles with their manifest defaults.
    pub fn option_set(&self) -> BuildOptionSet {
        BuildOptionSet::new()
            .with_bool(WITH_OPENMP, self.options.with_openmp)
            .with_bool(WITH_MKL, self.options.with_mkl)
    }

    /// Generate the default template for a new recipe.
    pub fn template(name: &str, version: &str) -> String {
        format!(
            r#"[package]
name = "{name}"
version = "{version}"
license = "MIT"
description = "A high-speed FFT library using Stockham's algorithm and AVX/SSE"

[options]
with_openmp = true
with_mkl = false
simd = "auto"
strict_acquisition = true

[source]
urls = ["{UPSTREAM_ARCHIVE}"]
marker = "CMakeLists.txt"

[build]
profile = "host"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fftpkg_resolve::OptionSink;

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[package]
name = "otfft"
version = "11.5"
license = "MIT"
description = "FFT"
author = "Takuya OKAHISA"
topics = ["fft", "simd"]

[options]
with_openmp = false
with_mkl = true
simd = "avx"
strict_acquisition = false

[options.accepted]
simd = ["sse2", "avx"]

[source]
urls = ["file:///opt/otfft", "https://example.com/otfft.zip"]
marker = "CMakeLists.txt"

[build]
profile = "linux-x86_64-gcc"
generator = "Ninja"
jobs = 4

[build.definitions]
simd = "OTFFT_SIMD_LEVEL"
"#;
        let manifest = RecipeManifest::parse(toml_str).unwrap();
        assert_eq!(manifest.package.name, "otfft");
        assert_eq!(manifest.package.topics.len(), 2);
        assert!(!manifest.options.with_openmp);
        assert_eq!(manifest.options.simd, SimdRequest::Level(SimdLevel::Avx));
        assert!(!manifest.options.strict_acquisition);
        assert_eq!(manifest.source.urls.len(), 2);
        assert_eq!(manifest.build.jobs, Some(4));
        assert_eq!(manifest.build.definitions.simd, "OTFFT_SIMD_LEVEL");
        assert_eq!(manifest.build.definitions.openmp, "OTFFT_USE_OPENMP");

        let declared = manifest.declared_options();
        assert!(declared.accepts("simd", "avx"));
        assert!(!declared.accepts("simd", "avx2"));
    }

    #[test]
    fn parse_minimal_manifest() {
        let manifest = RecipeManifest::parse("[package]\nname = \"minimal\"\n").unwrap();
        assert_eq!(manifest.package.name, "minimal");
        assert!(manifest.options.with_openmp);
        assert!(manifest.options.strict_acquisition);
        assert_eq!(manifest.options.simd, SimdRequest::Auto);
        assert_eq!(manifest.source.urls, vec![UPSTREAM_ARCHIVE.to_string()]);
        assert_eq!(manifest.source.marker.as_deref(), Some("CMakeLists.txt"));
    }

    #[test]
    fn default_declared_options_take_every_level() {
        let mut declared = RecipeManifest::default().declared_options();
        for level in SimdLevel::PREFERENCE {
            assert!(declared.apply("simd", level.as_str()).is_ok());
        }
        assert!(declared.apply(WITH_OPENMP, "false").is_ok());
        assert!(declared.apply("simd", "avx512").is_err());
    }

    #[test]
    fn option_set_carries_defaults() {
        let options = RecipeManifest::default().option_set();
        assert_eq!(options.get_bool(WITH_OPENMP), Some(true));
        assert_eq!(options.get_bool(WITH_MKL), Some(false));
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(RecipeManifest::parse("this is not valid toml [[[").is_err());
        assert!(RecipeManifest::parse("[options]\nsimd = \"avx512\"\n").is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let manifest = RecipeManifest::parse(&RecipeManifest::template("otfft", "11.5")).unwrap();
        assert_eq!(manifest.package.version, "11.5");
        assert_eq!(manifest.build.profile.as_deref(), Some("host"));
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "[package]\nname = \"parent\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found) = RecipeManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.package.name, "parent");
        assert_eq!(found, dir.path());
    }
}
