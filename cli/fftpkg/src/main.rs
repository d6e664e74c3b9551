//! fftpkg CLI: resolve, build, and package OTFFT for native dependency workflows.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use fftpkg_resolve::SchemeFetcher;

use commands::{Recipe, ResolveArgs};
use manifest::RecipeManifest;

#[derive(Parser)]
#[command(name = "fftpkg", version, about = "Build configuration resolver for the OTFFT package")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a recipe.toml in the current directory
    Init {
        /// Package name
        #[arg(default_value = "otfft")]
        name: String,
        /// Package version
        #[arg(long, default_value = "11.5")]
        version: String,
    },
    /// Resolve SIMD level, parallelism, and backend without building
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,
        /// Output format (human, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Acquire the library sources
    Source {
        /// Destination directory (default: build/source)
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Warn instead of failing when every source candidate fails
        #[arg(long)]
        lenient: bool,
    },
    /// Resolve, acquire, patch, and build with CMake
    Build {
        #[command(flatten)]
        args: ResolveArgs,
        /// Warn instead of failing when every source candidate fails
        #[arg(long)]
        lenient: bool,
    },
    /// Copy built artifacts into the package layout
    Package {
        #[command(flatten)]
        args: ResolveArgs,
        /// Source tree (default: build/source)
        #[arg(long)]
        source: Option<PathBuf>,
        /// Build tree (default: build/cmake)
        #[arg(long)]
        build: Option<PathBuf>,
        /// Package directory (default: build/package)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Copy the recipe's sources for distribution
    Export {
        /// Destination directory
        #[arg(long)]
        dest: PathBuf,
    },
    /// Show the libraries and flags consumers need
    Info {
        #[command(flatten)]
        args: ResolveArgs,
    },
    /// Validate the recipe's metadata and layout
    Check,
    /// Show the comparison benchmark's dependency plan
    BenchPlan {
        #[command(flatten)]
        args: ResolveArgs,
    },
    /// Build and, when possible, run test_package against the package
    TestPackage {
        #[command(flatten)]
        args: ResolveArgs,
        /// Package directory (default: build/package)
        #[arg(long)]
        package: Option<PathBuf>,
    },
    /// Manage platform profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Check toolchain and recipe status
    Doctor,
    /// Remove build artifacts
    Clean,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List available profiles
    List,
    /// Show details of a profile
    Describe {
        /// Profile name
        name: String,
        /// Output format (default: human-readable, "toml" for TOML)
        #[arg(long)]
        format: Option<String>,
    },
    /// Create profiles/<name>.profile.toml from a template
    Add {
        /// Profile name
        name: String,
    },
    /// Validate a profile
    Validate {
        /// Profile name
        name: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name, version } => commands::init::run(&cwd, &name, &version),

        Commands::Resolve { args, format } => {
            let recipe = load_recipe_optional(&cwd)?;
            commands::resolve::run(&recipe, &args, format.as_deref())
        }

        Commands::Source { dest, lenient } => {
            let recipe = load_recipe_required(&cwd)?;
            let dest = dest.unwrap_or_else(|| commands::default_source_dir(&recipe.dir));
            commands::source::run(&recipe, &dest, &SchemeFetcher::default(), lenient)
        }

        Commands::Build { args, lenient } => {
            let recipe = load_recipe_required(&cwd)?;
            let tool = commands::build::cmake_tool(&recipe);
            commands::build::run(&recipe, &args, lenient, &SchemeFetcher::default(), &tool)
                .map(|_| ())
        }

        Commands::Package {
            args,
            source,
            build,
            dest,
        } => {
            let recipe = load_recipe_required(&cwd)?;
            let source = source.unwrap_or_else(|| commands::default_source_dir(&recipe.dir));
            let build = build.unwrap_or_else(|| commands::default_cmake_dir(&recipe.dir));
            let dest = dest.unwrap_or_else(|| commands::default_package_dir(&recipe.dir));
            commands::package::run(&recipe, &args, &source, &build, &dest).map(|_| ())
        }

        Commands::Export { dest } => {
            let recipe = load_recipe_required(&cwd)?;
            commands::export::run(&recipe, &dest).map(|_| ())
        }

        Commands::Info { args } => {
            let recipe = load_recipe_optional(&cwd)?;
            commands::info::run(&recipe, &args).map(|_| ())
        }

        Commands::Check => {
            let recipe = load_recipe_optional(&cwd)?;
            commands::check::run(&recipe.dir)
        }

        Commands::BenchPlan { args } => {
            let recipe = load_recipe_optional(&cwd)?;
            commands::bench::run(&recipe, &args).map(|_| ())
        }

        Commands::TestPackage { args, package } => {
            let recipe = load_recipe_required(&cwd)?;
            let package = package.unwrap_or_else(|| commands::default_package_dir(&recipe.dir));
            let tool = commands::build::cmake_tool(&recipe);
            commands::test_package::run(&recipe, &args, &package, &tool).map(|_| ())
        }

        Commands::Profile { action } => {
            let recipe = load_recipe_optional(&cwd)?;
            let dir = recipe.dir.as_path();
            match action {
                ProfileAction::List => commands::profile::list(Some(dir)),
                ProfileAction::Describe { name, format } => {
                    commands::profile::describe(&name, Some(dir), format.as_deref())
                }
                ProfileAction::Add { name } => commands::profile::add(&name, dir),
                ProfileAction::Validate { name } => commands::profile::validate(&name, Some(dir)),
            }
        }

        Commands::Doctor => commands::doctor::run(&cwd),

        Commands::Clean => {
            let recipe = load_recipe_optional(&cwd)?;
            commands::clean::run(&recipe.dir)
        }
    }
}

/// Load the recipe, returning an error if none is found.
fn load_recipe_required(cwd: &Path) -> anyhow::Result<Recipe> {
    match RecipeManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok(Recipe { dir, manifest }),
        None => anyhow::bail!("no recipe.toml found (run `fftpkg init` first)"),
    }
}

/// Load the recipe from the current directory upward, falling back to the
/// built-in defaults rooted at `cwd`.
fn load_recipe_optional(cwd: &Path) -> anyhow::Result<Recipe> {
    Ok(match RecipeManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Recipe { dir, manifest },
        None => Recipe {
            dir: cwd.to_path_buf(),
            manifest: RecipeManifest::default(),
        },
    })
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use clap::CommandFactory;
    use fftpkg_package::PackageManifest;
    use fftpkg_platform::BuildType;
    use fftpkg_resolve::{BuildTool, LocalFetcher};
    use std::collections::BTreeMap;

    /// Writes the artifacts a real OTFFT build would produce.
    struct FakeCmake;

    impl BuildTool for FakeCmake {
        fn configure(
            &self,
            _source: &Path,
            _build: &Path,
            _definitions: &BTreeMap<String, String>,
        ) -> fftpkg_resolve::Result<()> {
            Ok(())
        }

        fn build(&self, build: &Path, _build_type: BuildType) -> fftpkg_resolve::Result<()> {
            std::fs::create_dir_all(build.join("src"))?;
            std::fs::write(build.join("src/otfft_config.h"), "#define OTFFT_AVX2 1\n")?;
            for lib in ["common", "sse2", "avx", "avx2"] {
                std::fs::write(build.join(format!("src/libotfft_{lib}.a")), lib)?;
            }
            Ok(())
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_flag_counts() {
        let cli = Cli::try_parse_from(["fftpkg", "-vv", "doctor"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["fftpkg", "resolve", "--openmp", "--no-openmp"]).is_err());
        assert!(Cli::try_parse_from(["fftpkg", "resolve", "--simd", "avx512"]).is_err());
    }

    /// Full workflow: init → build → package → verify.
    #[test]
    fn init_build_package_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("otfft-recipe");
        let upstream = dir.path().join("upstream");
        std::fs::create_dir_all(upstream.join("inc")).unwrap();
        std::fs::write(
            upstream.join("CMakeLists.txt"),
            "project(otfft)\nfind_package(OpenMP REQUIRED)\n",
        )
        .unwrap();
        std::fs::write(upstream.join("inc/otfft.h"), "#pragma once\n").unwrap();
        std::fs::write(upstream.join("LICENSE"), "MIT\n").unwrap();

        // 1. Init, then point the recipe at a dead mirror and the local tree.
        commands::init::run(&project, "otfft", "11.5").unwrap();
        let manifest_path = project.join(manifest::MANIFEST_FILE);
        let text = std::fs::read_to_string(&manifest_path).unwrap();
        let text = text.replace(
            manifest::UPSTREAM_ARCHIVE,
            &format!("{}\", \"{}", dir.path().join("dead").display(), upstream.display()),
        );
        std::fs::write(&manifest_path, text).unwrap();
        let recipe = load_recipe_required(&project).unwrap();
        assert_eq!(recipe.manifest.source.urls.len(), 2);

        // 2. Build
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let resolved = commands::build::run(&recipe, &args, false, &LocalFetcher, &FakeCmake)
            .unwrap();
        assert_eq!(resolved.transfer_failures.len(), 1);

        // 3. Package
        let package_dir = commands::default_package_dir(&project);
        let manifest = commands::package::run(
            &recipe,
            &args,
            &commands::default_source_dir(&project),
            &commands::default_cmake_dir(&project),
            &package_dir,
        )
        .unwrap();
        assert!(package_dir.join("include/otfft.h").is_file());
        assert!(package_dir.join("include/otfft_config.h").is_file());
        assert!(package_dir.join("lib/libotfft_avx2.a").is_file());
        assert!(package_dir.join("licenses/LICENSE").is_file());
        assert_eq!(manifest.files.len(), 7);

        // 4. Verify
        PackageManifest::load(&package_dir)
            .unwrap()
            .verify(&package_dir)
            .unwrap();

        // 5. Clean
        commands::clean::run(&project).unwrap();
        assert!(!commands::build_root(&project).exists());
    }
}
