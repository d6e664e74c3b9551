//! Source fetchers.
//!
//! A [`SourceFetcher`] transfers one origin into a destination directory.
//! Transfers are blocking and treated as atomic by the caller.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from a single transfer attempt.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("not found: {origin}")]
    NotFound { origin: String },

    #[error("unsupported origin scheme: {origin}")]
    UnsupportedScheme { origin: String },

    #[error("{program} failed ({status}): {stderr}")]
    Tool {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transfers a single origin into a destination directory.
pub trait SourceFetcher {
    fn fetch(&self, origin: &str, destination: &Path) -> Result<(), FetchError>;
}

/// Copy a directory tree, creating `dst` as needed.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Fetches from `file://` URLs and plain filesystem paths.
#[derive(Debug, Clone, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    fn local_path(origin: &str) -> Option<PathBuf> {
        match origin.split_once("://") {
            Some(("file", rest)) => Some(PathBuf::from(rest)),
            Some(_) => None,
            None => Some(PathBuf::from(origin)),
        }
    }
}

impl SourceFetcher for LocalFetcher {
    fn fetch(&self, origin: &str, destination: &Path) -> Result<(), FetchError> {
        let path = Self::local_path(origin).ok_or_else(|| FetchError::UnsupportedScheme {
            origin: origin.to_string(),
        })?;
        if !path.is_dir() {
            return Err(FetchError::NotFound {
                origin: origin.to_string(),
            });
        }
        copy_tree(&path, destination)?;
        Ok(())
    }
}

/// Downloads a zip archive with `curl` and unpacks it with `unzip`,
/// stripping the archive's single root directory.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    pub curl: String,
    pub unzip: String,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self {
            curl: "curl".into(),
            unzip: "unzip".into(),
        }
    }
}

fn run_tool(mut cmd: Command, program: &str) -> Result<(), FetchError> {
    let output = cmd.output().map_err(|e| FetchError::Tool {
        program: program.to_string(),
        status: "not started".into(),
        stderr: e.to_string(),
    })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(FetchError::Tool {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Move the contents of `unpacked` into `destination`. A lone top-level
/// directory is treated as the archive root and descended into.
fn strip_root_into(unpacked: &Path, destination: &Path) -> std::io::Result<()> {
    let entries: Vec<_> = std::fs::read_dir(unpacked)?.collect::<Result<_, _>>()?;
    let root = if entries.len() == 1 && entries[0].file_type()?.is_dir() {
        entries[0].path()
    } else {
        unpacked.to_path_buf()
    };

    std::fs::create_dir_all(destination)?;
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if std::fs::rename(entry.path(), &target).is_err() {
            if entry.file_type()?.is_dir() {
                copy_tree(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
    }
    Ok(())
}

impl SourceFetcher for ArchiveFetcher {
    fn fetch(&self, origin: &str, destination: &Path) -> Result<(), FetchError> {
        // Stage next to the destination so the final moves are renames.
        let staging = match destination.parent() {
            Some(parent) if parent.is_dir() => {
                tempfile::Builder::new().prefix(".fetch").tempdir_in(parent)?
            }
            _ => tempfile::tempdir()?,
        };
        let archive = staging.path().join("source.zip");
        let unpacked = staging.path().join("unpacked");

        let mut curl = Command::new(&self.curl);
        curl.args(["-fsSL", "--retry", "2", "-o"]).arg(&archive).arg(origin);
        run_tool(curl, &self.curl)?;

        let mut unzip = Command::new(&self.unzip);
        unzip.args(["-q", "-o"]).arg(&archive).arg("-d").arg(&unpacked);
        run_tool(unzip, &self.unzip)?;

        strip_root_into(&unpacked, destination)?;
        Ok(())
    }
}

/// Dispatches to [`LocalFetcher`] or [`ArchiveFetcher`] by URL scheme.
#[derive(Debug, Clone, Default)]
pub struct SchemeFetcher {
    pub local: LocalFetcher,
    pub archive: ArchiveFetcher,
}

impl SourceFetcher for SchemeFetcher {
    fn fetch(&self, origin: &str, destination: &Path) -> Result<(), FetchError> {
        match origin.split_once("://").map(|(scheme, _)| scheme) {
            Some("http") | Some("https") => self.archive.fetch(origin, destination),
            Some("file") | None => self.local.fetch(origin, destination),
            Some(_) => Err(FetchError::UnsupportedScheme {
                origin: origin.to_string(),
            }),
        }
    }
}
