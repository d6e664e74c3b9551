//! Human-readable and JSON renderings of resolution results.

use std::fmt;

use crate::backend::BenchmarkPlan;
use crate::error::Result;
use crate::parallelism::{ParallelismDecision, PatchOutcome};
use crate::resolver::ResolvedConfiguration;

impl fmt::Display for ParallelismDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParallelismDecision::Require => f.write_str("OpenMP required"),
            ParallelismDecision::Suppress => f.write_str("OpenMP suppressed"),
        }
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Applied => f.write_str("applied"),
            PatchOutcome::AlreadyApplied => f.write_str("already applied"),
            PatchOutcome::PatternNotFound => f.write_str("pattern not found"),
        }
    }
}

impl fmt::Display for ResolvedConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Resolved Configuration ===")?;
        writeln!(
            f,
            "Platform: {} ({}, {}, {})",
            self.platform.name, self.platform.arch, self.platform.compiler, self.platform.build_type
        )?;
        writeln!(f, "SIMD: {}", self.simd)?;
        writeln!(f, "Parallelism: {}", self.parallelism)?;
        writeln!(
            f,
            "Accelerated backend: {}",
            if self.accelerated_backend { "yes" } else { "no" }
        )?;

        writeln!(f)?;
        writeln!(f, "--- Sources ---")?;
        match (&self.source_root, &self.source_origin) {
            (Some(root), Some(origin)) => {
                writeln!(f, "  {} (from {origin})", root.display())?;
            }
            (Some(root), None) => writeln!(f, "  {} (already present)", root.display())?,
            (None, _) => writeln!(f, "  not available")?,
        }
        for failure in &self.transfer_failures {
            writeln!(f, "  failed: {failure}")?;
        }
        if let Some(patch) = self.patch {
            writeln!(f, "  OpenMP patch: {patch}")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Warnings ({}) ---", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  {warning}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for BenchmarkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Benchmark Plan ===")?;
        writeln!(f, "--- Requirements ---")?;
        for req in &self.requirements {
            writeln!(f, "  {req}")?;
        }
        for (dependency, options) in &self.dependency_options {
            writeln!(f)?;
            writeln!(f, "--- {dependency} options ---")?;
            for (key, value) in options {
                writeln!(f, "  {key}={value}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "FFTW SIMD: {}", self.fftw_simd)?;
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

/// Pretty-printed JSON for machine consumers.
pub fn to_json(resolved: &ResolvedConfiguration) -> Result<String> {
    Ok(serde_json::to_string_pretty(resolved)?)
}
