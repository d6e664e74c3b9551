//! Build configuration resolver for fftpkg.
//!
//! Given a [`PlatformDescriptor`](fftpkg_platform::PlatformDescriptor) and a
//! set of build options, a resolution pass selects:
//! - a SIMD level, walking `avx2 -> avx -> sse2 -> none` until the
//!   configuration system accepts one
//! - whether OpenMP is required or suppressed, patching `CMakeLists.txt`
//! - where the sources come from, trying each candidate origin in order
//! - whether the x86_64-only accelerated backend is requested at all
//!
//! The result is a [`ResolvedConfiguration`] consumed by the CMake
//! invocation in [`invoke`].

pub mod acquire;
pub mod backend;
pub mod error;
pub mod fetch;
pub mod invoke;
pub mod options;
pub mod parallelism;
pub mod reference;
pub mod report;
pub mod resolver;
pub mod simd;

pub use acquire::{
    acquire_source, ensure_sources, is_populated, Acquisition, AcquisitionPolicy, TransferFailure,
};
pub use backend::{
    benchmark_plan, fftw_declared_options, include_accelerated_backend, BenchmarkPlan, WITH_MKL,
};
pub use error::{ResolveError, Result};
pub use fetch::{ArchiveFetcher, FetchError, LocalFetcher, SchemeFetcher, SourceFetcher};
pub use invoke::{run_build, BuildTool, CmakeTool};
pub use options::{BuildOptionSet, DeclaredOptions, OptionSink, OptionValue};
pub use parallelism::{
    apply_parallelism, patch_build_description, resolve_parallelism, ParallelismDecision,
    PatchOutcome, WITH_OPENMP,
};
pub use reference::Requirement;
pub use report::to_json;
pub use resolver::{resolve, DefinitionNames, ResolvedConfiguration, ResolverConfig};
pub use simd::{resolve_simd_level, SimdResolution};
