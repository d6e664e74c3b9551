//! `fftpkg resolve`: make the build decisions without touching sources.

use anyhow::{bail, Result};
use fftpkg_resolve::{resolve, to_json, ResolvedConfiguration};

use super::{default_source_dir, Recipe, ResolveArgs};

/// Run SIMD, parallelism, and backend resolution for the chosen profile.
pub fn decide(recipe: &Recipe, args: &ResolveArgs) -> Result<ResolvedConfiguration> {
    let platform = args.platform(recipe)?;
    let mut sink = args.sink(recipe, &platform);
    let config = args.resolver_config(recipe, platform, default_source_dir(&recipe.dir), false);
    Ok(resolve(&config, &mut sink, None)?)
}

pub fn run(recipe: &Recipe, args: &ResolveArgs, format: Option<&str>) -> Result<()> {
    let resolved = decide(recipe, args)?;
    match format.unwrap_or("human") {
        "human" => {
            print!("{resolved}");
            println!();
            println!("--- Definitions ---");
            for (key, value) in resolved.definitions(&recipe.manifest.build.definitions) {
                println!("  {key}={value}");
            }
        }
        "json" => println!("{}", to_json(&resolved)?),
        other => bail!("unknown format '{other}' (expected human or json)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::recipe_in;
    use fftpkg_platform::{SimdChoice, SimdLevel, SimdRequest};

    const MANIFEST: &str = r#"
[package]
name = "otfft"
version = "11.5"

[options.accepted]
simd = ["none", "sse2"]
"#;

    #[test]
    fn falls_back_to_accepted_level() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), MANIFEST);
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        let resolved = decide(&recipe, &args).unwrap();
        assert_eq!(resolved.simd, SimdChoice::Level(SimdLevel::Sse2));
        assert_eq!(resolved.warnings.len(), 2);
        assert!(resolved.source_root.is_none());
    }

    #[test]
    fn arm_profile_auto_detects() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), MANIFEST);
        let args = ResolveArgs {
            profile: Some("linux-armv8-gcc".into()),
            simd: Some(SimdRequest::Level(SimdLevel::Avx2)),
            ..Default::default()
        };
        let resolved = decide(&recipe, &args).unwrap();
        assert_eq!(resolved.simd, SimdChoice::AutoDetect);
    }

    #[test]
    fn formats() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), MANIFEST);
        let args = ResolveArgs {
            profile: Some("linux-x86_64-gcc".into()),
            ..Default::default()
        };
        run(&recipe, &args, None).unwrap();
        run(&recipe, &args, Some("json")).unwrap();
        assert!(run(&recipe, &args, Some("yaml")).is_err());
    }
}
