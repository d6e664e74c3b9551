//! `fftpkg info`: what consumers link against.

use anyhow::Result;
use fftpkg_package::CppInfo;

use super::{Recipe, ResolveArgs};

pub fn run(recipe: &Recipe, args: &ResolveArgs) -> Result<CppInfo> {
    let resolved = super::resolve::decide(recipe, args)?;
    let info = CppInfo::for_platform(&resolved.platform, resolved.parallelism.openmp_enabled());

    println!(
        "=== {}/{} for {} ===",
        recipe.manifest.package.name, recipe.manifest.package.version, resolved.platform.name
    );
    print!("{info}");
    Ok(info)
}
