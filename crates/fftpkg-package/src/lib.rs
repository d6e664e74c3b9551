//! Packaging for fftpkg.
//!
//! After a successful build, built artifacts are classified by file-name
//! glob into a fixed layout (`include/`, `lib/`, `bin/`, `licenses/`),
//! recorded with their SHA-256 in `package.json`, and described to
//! consumers through [`CppInfo`].

pub mod error;
pub mod info;
pub mod integrity;
pub mod layout;
pub mod pattern;

pub use error::{PackageError, Result};
pub use info::CppInfo;
pub use integrity::{package_id, ContentHash, PackageManifest, MANIFEST_FILE};
pub use layout::{
    export_sources, package, walk_files, ArtifactKind, CopyRule, Origin, PackageLayout,
    PackageSummary, PackagedFile, EXPORT_PATTERNS,
};
pub use pattern::Pattern;
