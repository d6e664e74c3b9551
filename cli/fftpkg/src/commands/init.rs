//! `fftpkg init`: write a starter `recipe.toml`.

use std::path::Path;

use anyhow::{bail, Result};

use crate::manifest::{RecipeManifest, MANIFEST_FILE};

pub fn run(dir: &Path, name: &str, version: &str) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, RecipeManifest::template(name, version))?;
    println!("Created {}", path.display());
    Ok(())
}
