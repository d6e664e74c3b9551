//! `fftpkg clean`: remove build artifacts.

use std::fs;
use std::path::Path;

use anyhow::Result;

use super::build_root;

/// Remove the project's `build/` directory.
pub fn run(project_dir: &Path) -> Result<()> {
    let dir = build_root(project_dir);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
        println!("Removed {}", dir.display());
    } else {
        println!("Already clean: {} does not exist", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        let build = build_root(dir.path());
        fs::create_dir_all(build.join("cmake")).unwrap();
        fs::write(build.join("cmake/libotfft_common.a"), b"data").unwrap();

        run(dir.path()).unwrap();
        assert!(!build.exists());
    }

    #[test]
    fn clean_handles_already_clean() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
    }
}
