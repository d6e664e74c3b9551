//! Optional backends and the comparison benchmark's dependency plan.

use std::collections::BTreeMap;

use fftpkg_platform::{Arch, PlatformDescriptor, SimdChoice, SimdRequest};

use crate::error::Result;
use crate::options::{BuildOptionSet, DeclaredOptions, OptionSink};
use crate::reference::Requirement;
use crate::simd::resolve_simd_level;

/// Name of the boolean option that asks for the MKL backend.
pub const WITH_MKL: &str = "with_mkl";

/// The accelerated backend is only distributed for x86_64.
pub fn include_accelerated_backend(platform: &PlatformDescriptor) -> bool {
    platform.arch == Arch::X86_64
}

/// Options the FFTW package declares to the dependency manager.
pub fn fftw_declared_options() -> DeclaredOptions {
    DeclaredOptions::new()
        .declare_bool("precision_single")
        .declare_bool("precision_double")
        .declare_bool("precision_longdouble")
        .declare("simd", ["sse", "sse2", "avx", "avx2", "avx2_fma"])
}

/// Requirements and dependency options of the comparison benchmark.
#[derive(Debug, Clone)]
pub struct BenchmarkPlan {
    pub requirements: Vec<Requirement>,
    /// Option assignments per dependency name.
    pub dependency_options: BTreeMap<String, BTreeMap<String, String>>,
    pub fftw_simd: SimdChoice,
    pub warnings: Vec<String>,
}

fn fixed_requirements() -> Vec<Requirement> {
    vec![
        Requirement::new("otfft", "11.5"),
        Requirement::new("fftw", "3.3.10"),
        Requirement::new("kissfft", "131.1.0"),
        Requirement::new("pffft", "cci.20210511"),
        Requirement::new("pocketfft", "0.0.0.cci.20240801"),
    ]
}

/// Build the benchmark's dependency plan.
///
/// FFTW's long-double precision is disabled so its SIMD codelets can be
/// enabled, then its `simd` option goes through the usual fallback chain
/// on `fftw`. The MKL backend is added only on x86_64 when `with_mkl` is
/// set.
pub fn benchmark_plan(
    platform: &PlatformDescriptor,
    options: &BuildOptionSet,
    request: SimdRequest,
    fftw: &mut DeclaredOptions,
) -> Result<BenchmarkPlan> {
    let mut warnings = Vec::new();

    fftw.apply("precision_longdouble", "false")?;
    fftw.apply("precision_double", "true")?;
    fftw.apply("precision_single", "true")?;

    let simd = resolve_simd_level(platform, request, "simd", fftw);
    warnings.extend(simd.warnings);

    let mut requirements = fixed_requirements();
    if options.bool_or(WITH_MKL, false) {
        if include_accelerated_backend(platform) {
            requirements.push(Requirement::new("intel-oneapi-mkl", "2023.2.0"));
        } else {
            let msg = format!("MKL backend requested but not available on {}", platform.arch);
            log::warn!("{msg}");
            warnings.push(msg);
        }
    }

    let mut dependency_options = BTreeMap::new();
    dependency_options.insert("fftw".to_string(), fftw.applied_values().clone());

    Ok(BenchmarkPlan {
        requirements,
        dependency_options,
        fftw_simd: simd.choice,
        warnings,
    })
}
