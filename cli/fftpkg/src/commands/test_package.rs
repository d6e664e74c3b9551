//! `fftpkg test-package`: build the consumer test against a package.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use fftpkg_platform::PlatformDescriptor;
use fftpkg_resolve::BuildTool;

use super::{build_root, Recipe, ResolveArgs};

pub const TEST_PACKAGE_DIR: &str = "test_package";

/// Path of the test executable inside a test-package build tree.
pub fn test_binary(build: &Path) -> PathBuf {
    build
        .join("bin")
        .join(format!("test{}", std::env::consts::EXE_SUFFIX))
}

fn run_test_binary(binary: &Path) -> Result<()> {
    let status = Command::new(binary)
        .status()
        .with_context(|| format!("running {}", binary.display()))?;
    if !status.success() {
        bail!("{} failed ({status})", binary.display());
    }
    Ok(())
}

/// Build `test_package/` against `package_dir`, then run it when the
/// target can execute on this machine. Returns whether the test ran.
pub fn run(
    recipe: &Recipe,
    args: &ResolveArgs,
    package_dir: &Path,
    tool: &dyn BuildTool,
) -> Result<bool> {
    let source = recipe.dir.join(TEST_PACKAGE_DIR);
    if !source.is_dir() {
        bail!("{} not found", source.display());
    }
    if !package_dir.is_dir() {
        bail!(
            "package not found at {} (run `fftpkg package` first)",
            package_dir.display()
        );
    }
    let platform = args.platform(recipe)?;
    let build = build_root(&recipe.dir).join(TEST_PACKAGE_DIR);
    std::fs::create_dir_all(&build)?;

    let mut definitions = BTreeMap::new();
    definitions.insert(
        "CMAKE_BUILD_TYPE".to_string(),
        platform.build_type.cmake_name().to_string(),
    );
    definitions.insert(
        "CMAKE_PREFIX_PATH".to_string(),
        package_dir.display().to_string(),
    );
    tool.configure(&source, &build, &definitions)?;
    tool.build(&build, platform.build_type)?;

    if !platform.can_run_on(&PlatformDescriptor::host()) {
        log::info!(
            "{} binaries cannot run on this machine; skipping test run",
            platform.name
        );
        println!("Built test package for {} (not run)", platform.name);
        return Ok(false);
    }

    run_test_binary(&test_binary(&build))?;
    println!("Test package passed for {}", platform.name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::recipe_in;
    use fftpkg_platform::BuildType;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeCmake {
        definitions: RefCell<BTreeMap<String, String>>,
        built: RefCell<bool>,
    }

    impl BuildTool for FakeCmake {
        fn configure(
            &self,
            _source: &Path,
            _build: &Path,
            definitions: &BTreeMap<String, String>,
        ) -> fftpkg_resolve::Result<()> {
            *self.definitions.borrow_mut() = definitions.clone();
            Ok(())
        }

        fn build(&self, _build: &Path, _build_type: BuildType) -> fftpkg_resolve::Result<()> {
            *self.built.borrow_mut() = true;
            Ok(())
        }
    }

    fn riscv_recipe(dir: &Path) -> Recipe {
        let recipe = recipe_in(dir, "[package]\nname = \"otfft\"\n");
        std::fs::create_dir_all(dir.join("profiles")).unwrap();
        std::fs::write(
            dir.join("profiles/riscv64-gcc.profile.toml"),
            "name = \"riscv64-gcc\"\narch = \"riscv64\"\ncompiler = \"gcc\"\nos = \"Linux\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.join(TEST_PACKAGE_DIR)).unwrap();
        recipe
    }

    #[test]
    fn foreign_target_builds_but_skips_run() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = riscv_recipe(dir.path());
        let package_dir = dir.path().join("pkg");
        std::fs::create_dir_all(&package_dir).unwrap();
        let args = ResolveArgs {
            profile: Some("riscv64-gcc".into()),
            ..Default::default()
        };
        let tool = FakeCmake::default();

        let ran = run(&recipe, &args, &package_dir, &tool).unwrap();
        assert!(!ran);
        assert!(*tool.built.borrow());
        assert_eq!(
            tool.definitions.borrow()["CMAKE_PREFIX_PATH"],
            package_dir.display().to_string()
        );
    }

    #[test]
    fn missing_package_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = riscv_recipe(dir.path());
        let args = ResolveArgs {
            profile: Some("riscv64-gcc".into()),
            ..Default::default()
        };
        let tool = FakeCmake::default();
        assert!(run(&recipe, &args, &dir.path().join("nope"), &tool).is_err());
        assert!(!*tool.built.borrow());
    }

    #[test]
    fn missing_binary_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_test_binary(&test_binary(dir.path())).is_err());
    }
}
