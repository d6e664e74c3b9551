//! Package layout: which built files go where.
//!
//! Layout:
//! ```text
//! <package_root>/
//!   include/     headers from <source>/inc and the build tree
//!   lib/         static and shared libraries
//!   bin/         Windows runtime libraries
//!   licenses/    license files from the source root
//!   package.json file hashes and package id
//! ```
//!
//! Files are copied byte for byte and their directory structure is
//! flattened.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackageError, Result};
use crate::integrity::MANIFEST_FILE;
use crate::pattern::{any_match, Pattern};

/// Category of a packaged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Header,
    StaticLibrary,
    SharedLibrary,
    RuntimeLibrary,
    License,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Header,
        ArtifactKind::StaticLibrary,
        ArtifactKind::SharedLibrary,
        ArtifactKind::RuntimeLibrary,
        ArtifactKind::License,
    ];

    /// Package subdirectory this kind is copied into.
    pub fn directory(self) -> &'static str {
        match self {
            ArtifactKind::Header => "include",
            ArtifactKind::StaticLibrary | ArtifactKind::SharedLibrary => "lib",
            ArtifactKind::RuntimeLibrary => "bin",
            ArtifactKind::License => "licenses",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Header => "header",
            ArtifactKind::StaticLibrary => "static library",
            ArtifactKind::SharedLibrary => "shared library",
            ArtifactKind::RuntimeLibrary => "runtime library",
            ArtifactKind::License => "license",
        };
        f.write_str(s)
    }
}

/// Tree a rule copies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Source,
    Build,
}

/// One copy rule: files under `origin/subdir` matching `patterns` and not
/// `excludes` are packaged as `kind`.
#[derive(Debug, Clone)]
pub struct CopyRule {
    pub kind: ArtifactKind,
    pub origin: Origin,
    pub subdir: Option<String>,
    pub patterns: Vec<Pattern>,
    pub excludes: Vec<Pattern>,
}

impl CopyRule {
    pub fn new(kind: ArtifactKind, origin: Origin, patterns: &[&str]) -> Result<Self> {
        Ok(CopyRule {
            kind,
            origin,
            subdir: None,
            patterns: compile(patterns)?,
            excludes: Vec::new(),
        })
    }

    pub fn under(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn excluding(mut self, patterns: &[&str]) -> Result<Self> {
        self.excludes.extend(compile(patterns)?);
        Ok(self)
    }

    /// Whether a path relative to the rule's root is selected.
    pub fn selects(&self, relative: &str) -> bool {
        any_match(&self.patterns, relative) && !any_match(&self.excludes, relative)
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Ordered copy rules. The first rule selecting a file decides its kind.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    pub rules: Vec<CopyRule>,
}

impl PackageLayout {
    /// Rules for an OTFFT build tree.
    pub fn otfft() -> Result<Self> {
        let build_internal = ["CMakeFiles/*", "*/CMakeFiles/*"];
        Ok(PackageLayout {
            rules: vec![
                CopyRule::new(ArtifactKind::License, Origin::Source, &["LICENSE*"])?,
                CopyRule::new(ArtifactKind::Header, Origin::Source, &["*.h"])?.under("inc"),
                CopyRule::new(ArtifactKind::Header, Origin::Build, &["*.h"])?
                    .excluding(&build_internal)?,
                CopyRule::new(ArtifactKind::StaticLibrary, Origin::Build, &["*.a", "*.lib"])?
                    .excluding(&build_internal)?,
                CopyRule::new(ArtifactKind::SharedLibrary, Origin::Build, &["*.so*", "*.dylib"])?
                    .excluding(&build_internal)?,
                CopyRule::new(ArtifactKind::RuntimeLibrary, Origin::Build, &["*.dll"])?
                    .excluding(&build_internal)?,
            ],
        })
    }

    /// Kind of a build-tree file, if any rule takes it.
    pub fn classify_build_file(&self, relative: &str) -> Option<ArtifactKind> {
        self.rules
            .iter()
            .filter(|r| r.origin == Origin::Build && r.subdir.is_none())
            .find(|r| r.selects(relative))
            .map(|r| r.kind)
    }
}

/// A file copied into the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedFile {
    pub kind: ArtifactKind,
    /// Where it was copied from.
    pub from: PathBuf,
    /// `/`-separated path inside the package, e.g. `lib/libotfft_common.a`.
    pub relative: String,
}

/// Result of a packaging run.
#[derive(Debug, Clone, Default)]
pub struct PackageSummary {
    pub files: Vec<PackagedFile>,
}

impl PackageSummary {
    pub fn count(&self, kind: ArtifactKind) -> usize {
        self.files.iter().filter(|f| f.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for PackageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Package ({} files) ===", self.files.len())?;
        for file in &self.files {
            writeln!(f, "  {:<12} {}", file.kind.directory(), file.relative)?;
        }
        Ok(())
    }
}

/// All regular files below `root` as sorted `/`-separated relative paths.
pub fn walk_files(root: &Path) -> Result<Vec<String>> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                walk(root, &path, out)?;
            } else if file_type.is_file() || path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    let parts: Vec<_> = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    out.push(parts.join("/"));
                }
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    walk(root, root, &mut out)?;
    out.sort();
    Ok(out)
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Remove the kind directories and the manifest left by an earlier run.
/// Anything else under `package_root` is kept.
fn clear_package(package_root: &Path) -> Result<()> {
    for kind in ArtifactKind::ALL {
        let dir = package_root.join(kind.directory());
        if dir.is_dir() {
            std::fs::remove_dir_all(&dir)?;
        }
    }
    let manifest = package_root.join(MANIFEST_FILE);
    if manifest.is_file() {
        std::fs::remove_file(&manifest)?;
    }
    Ok(())
}

/// Copy every file selected by `layout` into `package_root`.
///
/// Output of a previous run in `package_root` is removed first, so the
/// package holds only what this run selects.
/// `source_root` and `build_root` must exist. A rule's missing `subdir` is
/// skipped with an info log. Two different files flattening onto the same
/// name is an error; identical ones are copied once.
pub fn package(
    layout: &PackageLayout,
    source_root: &Path,
    build_root: &Path,
    package_root: &Path,
) -> Result<PackageSummary> {
    for root in [source_root, build_root] {
        if !root.is_dir() {
            return Err(PackageError::MissingDirectory {
                path: root.to_path_buf(),
            });
        }
    }

    clear_package(package_root)?;

    let mut placed: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut summary = PackageSummary::default();

    for rule in &layout.rules {
        let base = match rule.origin {
            Origin::Source => source_root,
            Origin::Build => build_root,
        };
        let root = match &rule.subdir {
            Some(sub) => base.join(sub),
            None => base.to_path_buf(),
        };
        if !root.is_dir() {
            log::info!("{} not present; nothing to copy from it", root.display());
            continue;
        }

        for relative in walk_files(&root)? {
            // A package directory nested in the build tree is never an input.
            let from = root.join(&relative);
            if from.starts_with(package_root) || !rule.selects(&relative) {
                continue;
            }

            let target = format!("{}/{}", rule.kind.directory(), file_name(&relative));
            if let Some(first) = placed.get(&target) {
                if std::fs::read(first)? == std::fs::read(&from)? {
                    log::debug!("{} duplicates {}; skipped", from.display(), first.display());
                    continue;
                }
                return Err(PackageError::Collision {
                    name: target,
                    first: first.clone(),
                    second: from,
                });
            }

            let dest = package_root.join(&target);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&from, &dest)?;
            log::debug!("packaged {} -> {target}", from.display());

            placed.insert(target.clone(), from.clone());
            summary.files.push(PackagedFile {
                kind: rule.kind,
                from,
                relative: target,
            });
        }
    }

    log::info!(
        "packaged {} files into {}",
        summary.files.len(),
        package_root.display()
    );
    Ok(summary)
}

/// Patterns of recipe files exported alongside the recipe.
pub const EXPORT_PATTERNS: &[&str] = &[
    "*.h",
    "*.hpp",
    "src/*",
    "include/*",
    "inc/*",
    "CMakeLists.txt",
    "cmake/*",
    "LICENSE*",
    "README*",
];

/// Copy recipe sources from `recipe_dir` into `destination`, keeping their
/// relative paths. Returns the exported paths.
///
/// Hidden entries and the `build/` tree are never exported, nor is
/// anything already under `destination`.
pub fn export_sources(recipe_dir: &Path, destination: &Path) -> Result<Vec<String>> {
    if !recipe_dir.is_dir() {
        return Err(PackageError::MissingDirectory {
            path: recipe_dir.to_path_buf(),
        });
    }
    let patterns = compile(EXPORT_PATTERNS)?;
    let excludes = compile(&[".*", "*/.*", "build/*"])?;

    let mut exported = Vec::new();
    for relative in walk_files(recipe_dir)? {
        let from = recipe_dir.join(&relative);
        if from.starts_with(destination)
            || !any_match(&patterns, &relative)
            || any_match(&excludes, &relative)
        {
            continue;
        }
        let dest = destination.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&from, &dest)?;
        exported.push(relative);
    }
    log::info!(
        "exported {} files to {}",
        exported.len(),
        destination.display()
    );
    Ok(exported)
}
