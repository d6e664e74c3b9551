//! `fftpkg bench-plan`: dependencies of the comparison benchmark.

use anyhow::Result;
use fftpkg_resolve::{benchmark_plan, fftw_declared_options, BenchmarkPlan};

use super::{Recipe, ResolveArgs};

pub fn run(recipe: &Recipe, args: &ResolveArgs) -> Result<BenchmarkPlan> {
    let platform = args.platform(recipe)?;
    let config = args.resolver_config(recipe, platform.clone(), recipe.dir.clone(), false);
    let mut fftw = fftw_declared_options();
    let plan = benchmark_plan(&platform, &config.options, config.simd_request, &mut fftw)?;
    print!("{plan}");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::recipe_in;

    #[test]
    fn mkl_flag_reaches_plan() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), "[package]\nname = \"otfft-benchmark\"\n");
        let args = ResolveArgs {
            profile: Some("windows-x86_64-msvc".into()),
            mkl: true,
            ..Default::default()
        };
        let plan = run(&recipe, &args).unwrap();
        assert!(plan
            .requirements
            .iter()
            .any(|r| r.to_string() == "intel-oneapi-mkl/2023.2.0"));
    }

    #[test]
    fn manifest_default_leaves_mkl_out() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), "[package]\nname = \"otfft-benchmark\"\n");
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let plan = run(&recipe, &args).unwrap();
        assert_eq!(plan.requirements.len(), 5);
    }
}
