//! Resolution pass orchestrator.
//!
//! SIMD -> parallelism -> backend inclusion -> source acquisition ->
//! OpenMP patch. Each step runs to completion before the next; the pass
//! produces one immutable [`ResolvedConfiguration`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fftpkg_platform::{PlatformDescriptor, SimdChoice, SimdRequest};
use serde::{Deserialize, Serialize};

use crate::acquire::{ensure_sources, AcquisitionPolicy, TransferFailure};
use crate::backend::{include_accelerated_backend, WITH_MKL};
use crate::error::{ResolveError, Result};
use crate::fetch::SourceFetcher;
use crate::options::{BuildOptionSet, OptionSink};
use crate::parallelism::{
    patch_build_description, resolve_parallelism, ParallelismDecision, PatchOutcome,
};
use crate::simd::resolve_simd_level;

/// Inputs of a resolution pass.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub platform: PlatformDescriptor,
    pub simd_request: SimdRequest,
    /// Name of the SIMD option in the option sink.
    pub simd_option: String,
    pub options: BuildOptionSet,
    /// `with_openmp` value used when the option set does not carry one.
    pub openmp_default: bool,
    /// Candidate origins, tried in order.
    pub sources: Vec<String>,
    /// Where sources are placed.
    pub destination: PathBuf,
    /// A file whose presence in `destination` means sources are already
    /// there (exported with the recipe) and acquisition is skipped. A
    /// transfer that does not produce it counts as failed.
    pub marker: Option<String>,
    pub policy: AcquisitionPolicy,
    /// Build description patched for OpenMP, relative to the source root.
    pub build_description: String,
}

impl ResolverConfig {
    /// Defaults for `platform`: automatic SIMD, OpenMP required, strict
    /// acquisition, `CMakeLists.txt` as both marker and build description.
    pub fn new(platform: PlatformDescriptor, destination: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            simd_request: SimdRequest::Auto,
            simd_option: "simd".into(),
            options: BuildOptionSet::new(),
            openmp_default: true,
            sources: Vec::new(),
            destination: destination.into(),
            marker: Some("CMakeLists.txt".into()),
            policy: AcquisitionPolicy::Strict,
            build_description: "CMakeLists.txt".into(),
        }
    }
}

/// CMake cache variable names the resolved configuration is exported as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DefinitionNames {
    pub simd: String,
    pub openmp: String,
    pub mkl: String,
}

impl Default for DefinitionNames {
    fn default() -> Self {
        Self {
            simd: "OTFFT_SIMD".into(),
            openmp: "OTFFT_USE_OPENMP".into(),
            mkl: "OTFFT_WITH_MKL".into(),
        }
    }
}

/// Output of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfiguration {
    pub platform: PlatformDescriptor,
    pub simd: SimdChoice,
    pub parallelism: ParallelismDecision,
    pub accelerated_backend: bool,
    /// Source root, when sources are available.
    pub source_root: Option<PathBuf>,
    /// Origin the sources came from. `None` when they were already present
    /// or could not be acquired.
    pub source_origin: Option<String>,
    pub transfer_failures: Vec<TransferFailure>,
    /// Outcome of the OpenMP patch, when it ran.
    pub patch: Option<PatchOutcome>,
    /// Warnings accumulated while falling back.
    pub warnings: Vec<String>,
}

impl ResolvedConfiguration {
    /// Key/value definitions handed to CMake.
    pub fn definitions(&self, names: &DefinitionNames) -> BTreeMap<String, String> {
        let mut defs = BTreeMap::new();
        defs.insert(
            "CMAKE_BUILD_TYPE".to_string(),
            self.platform.build_type.cmake_name().to_string(),
        );
        if let Some(level) = self.simd.level() {
            defs.insert(names.simd.clone(), level.as_str().to_string());
        }
        let on_off = |b: bool| if b { "ON" } else { "OFF" }.to_string();
        defs.insert(names.openmp.clone(), on_off(self.parallelism.openmp_enabled()));
        if self.parallelism == ParallelismDecision::Suppress {
            defs.insert("CMAKE_DISABLE_FIND_PACKAGE_OpenMP".to_string(), "ON".to_string());
        }
        defs.insert(names.mkl.clone(), on_off(self.accelerated_backend));
        defs
    }

    /// Source root or an error explaining that sources are missing.
    pub fn require_source_root(&self) -> Result<&Path> {
        self.source_root
            .as_deref()
            .ok_or(ResolveError::MissingSources)
    }
}

/// Run a resolution pass.
///
/// With `fetcher` set to `None` only the decisions are made: nothing is
/// downloaded and nothing is patched. An existing source tree at the
/// destination is still reported and patched when a fetcher is given.
pub fn resolve(
    config: &ResolverConfig,
    sink: &mut dyn OptionSink,
    fetcher: Option<&dyn SourceFetcher>,
) -> Result<ResolvedConfiguration> {
    let platform = &config.platform;
    log::info!("resolving configuration for {}", platform.name);

    let simd = resolve_simd_level(platform, config.simd_request, &config.simd_option, sink);
    let mut warnings = simd.warnings;

    let parallelism = resolve_parallelism(&config.options, config.openmp_default);

    let wants_mkl = config.options.bool_or(WITH_MKL, false);
    let accelerated_backend = wants_mkl && include_accelerated_backend(platform);
    if wants_mkl && !accelerated_backend {
        let msg = format!("{WITH_MKL} ignored: backend not available on {}", platform.arch);
        log::warn!("{msg}");
        warnings.push(msg);
    }

    let mut resolved = ResolvedConfiguration {
        platform: platform.clone(),
        simd: simd.choice,
        parallelism,
        accelerated_backend,
        source_root: None,
        source_origin: None,
        transfer_failures: Vec::new(),
        patch: None,
        warnings,
    };

    let Some(fetcher) = fetcher else {
        return Ok(resolved);
    };

    let acquisition = ensure_sources(
        &config.sources,
        &config.destination,
        config.marker.as_deref(),
        fetcher,
        config.policy,
    )?;
    match acquisition {
        None => resolved.source_root = Some(config.destination.clone()),
        Some(acquisition) => {
            if acquisition.succeeded() {
                resolved.source_root = Some(acquisition.root);
            } else {
                resolved.warnings.push(format!(
                    "sources could not be acquired; place them in {}",
                    config.destination.display()
                ));
            }
            resolved.source_origin = acquisition.origin;
            resolved.transfer_failures = acquisition.failures;
        }
    }

    if let Some(root) = &resolved.source_root {
        let description = root.join(&config.build_description);
        resolved.patch = Some(patch_build_description(&description, parallelism)?);
    }

    Ok(resolved)
}
