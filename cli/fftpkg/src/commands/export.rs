//! `fftpkg export`: copy the recipe's sources for distribution.

use std::path::Path;

use anyhow::{Context, Result};
use fftpkg_package::export_sources;

use super::Recipe;

pub fn run(recipe: &Recipe, dest: &Path) -> Result<Vec<String>> {
    let exported = export_sources(&recipe.dir, dest)
        .with_context(|| format!("exporting sources to {}", dest.display()))?;
    for path in &exported {
        println!("  {path}");
    }
    println!("Exported {} files to {}", exported.len(), dest.display());
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{default_source_dir, testing::recipe_in};

    #[test]
    fn exported_sources_satisfy_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = recipe_in(dir.path(), "[package]\nname = \"otfft\"\n");
        std::fs::write(dir.path().join("CMakeLists.txt"), "project(otfft)").unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/otfft.cpp"), "").unwrap();

        let dest = default_source_dir(dir.path());
        let exported = run(&recipe, &dest).unwrap();
        assert_eq!(exported, vec!["CMakeLists.txt", "src/otfft.cpp"]);
        assert!(dest.join("CMakeLists.txt").is_file());

        // Exporting again does not pick up its own output.
        assert_eq!(run(&recipe, &dest).unwrap().len(), 2);
    }
}
