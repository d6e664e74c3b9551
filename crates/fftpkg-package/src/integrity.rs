//! Content hashes, the package manifest, and package ids.
//!
//! Every packaged file is recorded in `package.json` with its SHA-256 so a
//! consumer can verify the package was not modified after creation.

use std::collections::BTreeMap;
use std::path::Path;

use fftpkg_platform::PlatformDescriptor;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PackageError, Result};
use crate::layout::PackageSummary;

/// File name of the manifest at the package root.
pub const MANIFEST_FILE: &str = "package.json";

/// A content hash (SHA-256 hex digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute the SHA-256 hash of the given data.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex_encode(&hasher.finalize()))
    }

    /// Hash a file's contents.
    pub fn of_file(path: &Path) -> Result<Self> {
        Ok(ContentHash::compute(&std::fs::read(path)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that the given data matches this hash.
    pub fn verify(&self, data: &[u8]) -> bool {
        ContentHash::compute(data) == *self
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Deterministic id of a binary package.
///
/// Hashes the package reference, every platform setting, and the effective
/// option values. Any change to one of them yields a different id.
pub fn package_id(
    name: &str,
    version: &str,
    platform: &PlatformDescriptor,
    options: &BTreeMap<String, String>,
) -> String {
    let mut canonical = String::new();
    canonical.push_str(&format!("[reference]\n{name}/{version}\n"));
    canonical.push_str("[settings]\n");
    canonical.push_str(&format!("arch={}\n", platform.arch));
    canonical.push_str(&format!("build_type={}\n", platform.build_type));
    canonical.push_str(&format!("compiler={}\n", platform.compiler));
    if let Some(os) = &platform.os {
        canonical.push_str(&format!("os={os}\n"));
    }
    canonical.push_str("[options]\n");
    for (key, value) in options {
        canonical.push_str(&format!("{key}={value}\n"));
    }

    let mut id = ContentHash::compute(canonical.as_bytes()).0;
    id.truncate(40);
    id
}

/// Contents of `package.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub package_id: String,
    pub platform: PlatformDescriptor,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Package-relative path to content hash.
    pub files: BTreeMap<String, ContentHash>,
}

impl PackageManifest {
    /// Record every file of a packaging run, hashing it in place.
    pub fn from_summary(
        name: &str,
        version: &str,
        platform: &PlatformDescriptor,
        options: &BTreeMap<String, String>,
        package_root: &Path,
        summary: &PackageSummary,
    ) -> Result<Self> {
        let mut files = BTreeMap::new();
        for file in &summary.files {
            let hash = ContentHash::of_file(&package_root.join(&file.relative))?;
            files.insert(file.relative.clone(), hash);
        }
        Ok(PackageManifest {
            name: name.to_string(),
            version: version.to_string(),
            package_id: package_id(name, version, platform, options),
            platform: platform.clone(),
            options: options.clone(),
            files,
        })
    }

    pub fn write(&self, package_root: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(package_root.join(MANIFEST_FILE), json + "\n")?;
        Ok(())
    }

    pub fn load(package_root: &Path) -> Result<Self> {
        let path = package_root.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check every recorded file against its hash.
    pub fn verify(&self, package_root: &Path) -> Result<()> {
        for (relative, expected) in &self.files {
            let actual = ContentHash::of_file(&package_root.join(relative))?;
            if actual != *expected {
                return Err(PackageError::IntegrityFailure {
                    path: relative.clone(),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }
}
