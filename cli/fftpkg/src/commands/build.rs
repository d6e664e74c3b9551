//! `fftpkg build`: resolve, acquire, patch, then configure and build.

use anyhow::{Context, Result};
use fftpkg_resolve::{
    resolve, run_build, BuildTool, CmakeTool, ResolvedConfiguration, SourceFetcher,
};

use super::{default_cmake_dir, default_source_dir, save_resolved, Recipe, ResolveArgs};

/// CMake as configured by the manifest's `[build]` section.
pub fn cmake_tool(recipe: &Recipe) -> CmakeTool {
    CmakeTool {
        generator: recipe.manifest.build.generator.clone(),
        jobs: recipe.manifest.build.jobs,
        ..CmakeTool::default()
    }
}

/// Run the full pass and return the configuration that was built.
pub fn run(
    recipe: &Recipe,
    args: &ResolveArgs,
    lenient: bool,
    fetcher: &dyn SourceFetcher,
    tool: &dyn BuildTool,
) -> Result<ResolvedConfiguration> {
    let platform = args.platform(recipe)?;
    let mut sink = args.sink(recipe, &platform);
    let config = args.resolver_config(recipe, platform, default_source_dir(&recipe.dir), lenient);

    let resolved = resolve(&config, &mut sink, Some(fetcher))?;
    print!("{resolved}");

    let build_dir = default_cmake_dir(&recipe.dir);
    run_build(&resolved, tool, &build_dir, &recipe.manifest.build.definitions)
        .with_context(|| format!("building {}", recipe.manifest.package.name))?;
    save_resolved(&build_dir, &resolved)?;

    println!();
    println!("Built {} in {}", recipe.manifest.package.name, build_dir.display());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{load_resolved, testing::recipe_in};
    use fftpkg_platform::BuildType;
    use fftpkg_resolve::{LocalFetcher, PatchOutcome, ResolveError};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::path::Path;

    #[derive(Default)]
    struct FakeCmake {
        definitions: RefCell<BTreeMap<String, String>>,
    }

    impl BuildTool for FakeCmake {
        fn configure(
            &self,
            _source: &Path,
            build: &Path,
            definitions: &BTreeMap<String, String>,
        ) -> fftpkg_resolve::Result<()> {
            *self.definitions.borrow_mut() = definitions.clone();
            std::fs::write(build.join("CMakeCache.txt"), "")?;
            Ok(())
        }

        fn build(&self, build: &Path, _build_type: BuildType) -> fftpkg_resolve::Result<()> {
            std::fs::write(build.join("libotfft_common.a"), "archive")?;
            Ok(())
        }
    }

    struct FailingCmake;

    impl BuildTool for FailingCmake {
        fn configure(
            &self,
            _source: &Path,
            _build: &Path,
            _definitions: &BTreeMap<String, String>,
        ) -> fftpkg_resolve::Result<()> {
            Err(ResolveError::BuildFailure {
                step: "cmake configure".into(),
                status: "exit status: 1".into(),
                stderr: "Could NOT find OpenMP_CXX".into(),
            })
        }

        fn build(&self, _build: &Path, _build_type: BuildType) -> fftpkg_resolve::Result<()> {
            Ok(())
        }
    }

    fn recipe_with_upstream(dir: &Path) -> Recipe {
        let upstream = dir.join("upstream");
        std::fs::create_dir_all(&upstream).unwrap();
        std::fs::write(
            upstream.join("CMakeLists.txt"),
            "project(otfft)\nfind_package(OpenMP REQUIRED)\n",
        )
        .unwrap();
        let manifest = format!(
            "[package]\nname = \"otfft\"\nversion = \"11.5\"\n[source]\nurls = [\"{}\"]\n",
            upstream.display()
        );
        recipe_in(dir, &manifest)
    }

    #[test]
    fn full_pass_patches_and_builds() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_with_upstream(dir.path());
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            no_openmp: true,
            ..Default::default()
        };
        let tool = FakeCmake::default();

        let resolved = run(&recipe, &args, false, &LocalFetcher, &tool).unwrap();
        assert_eq!(resolved.patch, Some(PatchOutcome::Applied));
        assert_eq!(tool.definitions.borrow()["OTFFT_USE_OPENMP"], "OFF");

        let cmake = std::fs::read_to_string(
            default_source_dir(dir.path()).join("CMakeLists.txt"),
        )
        .unwrap();
        assert!(cmake.contains("find_package(OpenMP)\n"));

        let build_dir = default_cmake_dir(dir.path());
        assert!(build_dir.join("libotfft_common.a").is_file());
        assert_eq!(load_resolved(&build_dir).unwrap(), Some(resolved));
    }

    #[test]
    fn build_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_with_upstream(dir.path());
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let err = run(&recipe, &args, false, &LocalFetcher, &FailingCmake).unwrap_err();
        assert!(format!("{err:#}").contains("Could NOT find OpenMP_CXX"));
    }

    #[test]
    fn lenient_without_sources_cannot_build() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(
            dir.path(),
            "[package]\nname = \"otfft\"\n[source]\nurls = [\"/nowhere\"]\n",
        );
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let err = run(&recipe, &args, true, &LocalFetcher, &FakeCmake::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no sources available"));
    }

    #[test]
    fn cmake_tool_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(
            dir.path(),
            "[package]\nname = \"otfft\"\n[build]\ngenerator = \"Ninja\"\njobs = 2\n",
        );
        let tool = cmake_tool(&recipe);
        assert_eq!(tool.program, "cmake");
        assert_eq!(tool.generator.as_deref(), Some("Ninja"));
        assert_eq!(tool.jobs, Some(2));
    }
}
