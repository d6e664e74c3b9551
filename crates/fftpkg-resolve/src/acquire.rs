//! Source acquisition with ordered fallback across candidate origins.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};
use crate::fetch::SourceFetcher;

/// What happens when every candidate origin fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionPolicy {
    /// Fail with [`ResolveError::AcquisitionExhausted`].
    #[default]
    Strict,
    /// Log a warning and continue; the caller supplies sources manually.
    Lenient,
}

impl AcquisitionPolicy {
    /// Map the `strict_acquisition` flag onto a policy.
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            AcquisitionPolicy::Strict
        } else {
            AcquisitionPolicy::Lenient
        }
    }
}

/// One failed transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFailure {
    pub origin: String,
    pub cause: String,
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.cause)
    }
}

/// Result of an acquisition attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    /// Origin that populated `root`. `None` when a lenient policy gave up.
    pub origin: Option<String>,
    /// Destination directory.
    pub root: PathBuf,
    /// Causes of every failed attempt, in attempt order.
    pub failures: Vec<TransferFailure>,
}

impl Acquisition {
    pub fn succeeded(&self) -> bool {
        self.origin.is_some()
    }
}

/// Whether `dir` holds a source tree: the `marker` file when one is
/// given, otherwise any entry at all.
pub fn is_populated(dir: &Path, marker: Option<&str>) -> bool {
    match marker {
        Some(marker) => dir.join(marker).is_file(),
        None => std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false),
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

/// Scratch directory next to `destination`, so a finished transfer can be
/// renamed into place.
fn staging_dir(destination: &Path) -> Result<tempfile::TempDir> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    Ok(tempfile::Builder::new()
        .prefix(".fftpkg-fetch")
        .tempdir_in(parent)?)
}

/// Move a staged tree to `destination`. An existing destination must be
/// empty; files the caller put there are never replaced.
fn install(staged: tempfile::TempDir, destination: &Path) -> Result<()> {
    if destination.exists() {
        if !is_empty_dir(destination)? {
            return Err(ResolveError::DestinationOccupied {
                path: destination.to_path_buf(),
            });
        }
        std::fs::remove_dir(destination)?;
    }
    std::fs::rename(staged.path(), destination)?;
    Ok(())
}

/// Try each candidate in order until one yields a source tree.
///
/// Every attempt transfers into its own staging directory, so failed
/// attempts never touch `destination`. An attempt succeeds when the staged
/// tree [`is_populated`] for `marker`; it is then moved to `destination`,
/// which must be absent or empty. When all candidates fail, `policy`
/// decides between an [`ResolveError::AcquisitionExhausted`] error and a
/// warning.
pub fn acquire_source(
    candidates: &[String],
    destination: &Path,
    marker: Option<&str>,
    fetcher: &dyn SourceFetcher,
    policy: AcquisitionPolicy,
) -> Result<Acquisition> {
    let mut failures = Vec::new();

    for origin in candidates {
        log::info!("fetching sources from {origin}");
        let staged = staging_dir(destination)?;
        let cause = match fetcher.fetch(origin, staged.path()) {
            Ok(()) if is_populated(staged.path(), marker) => {
                install(staged, destination)?;
                log::info!("sources acquired from {origin}");
                return Ok(Acquisition {
                    origin: Some(origin.clone()),
                    root: destination.to_path_buf(),
                    failures,
                });
            }
            Ok(()) => match marker {
                Some(marker) => format!("transfer did not produce {marker}"),
                None => "transfer produced an empty source tree".to_string(),
            },
            Err(e) => e.to_string(),
        };
        log::warn!("{origin}: {cause}");
        failures.push(TransferFailure {
            origin: origin.clone(),
            cause,
        });
    }

    match policy {
        AcquisitionPolicy::Strict => Err(ResolveError::AcquisitionExhausted { failures }),
        AcquisitionPolicy::Lenient => {
            log::warn!(
                "could not acquire sources from {} candidate(s); expecting them at {}",
                candidates.len(),
                destination.display()
            );
            Ok(Acquisition {
                origin: None,
                root: destination.to_path_buf(),
                failures,
            })
        }
    }
}

/// Acquire sources unless `destination` already holds them.
///
/// Returns `None` when the tree is already populated for `marker`
/// (exported with the recipe or fetched by an earlier run).
pub fn ensure_sources(
    candidates: &[String],
    destination: &Path,
    marker: Option<&str>,
    fetcher: &dyn SourceFetcher,
    policy: AcquisitionPolicy,
) -> Result<Option<Acquisition>> {
    if is_populated(destination, marker) {
        log::info!(
            "sources already present at {}; skipping acquisition",
            destination.display()
        );
        return Ok(None);
    }
    acquire_source(candidates, destination, marker, fetcher, policy).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, LocalFetcher};
    use std::cell::RefCell;

    const MARKER: Option<&str> = Some("CMakeLists.txt");

    /// Succeeds for origins listed in `good`, writing a CMakeLists.txt.
    struct FakeFetcher {
        good: Vec<&'static str>,
        empty: Vec<&'static str>,
        unmarked: Vec<&'static str>,
        attempts: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(good: &[&'static str]) -> Self {
            Self {
                good: good.to_vec(),
                empty: Vec::new(),
                unmarked: Vec::new(),
                attempts: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceFetcher for FakeFetcher {
        fn fetch(&self, origin: &str, destination: &Path) -> std::result::Result<(), FetchError> {
            self.attempts.borrow_mut().push(origin.to_string());
            if self.empty.contains(&origin) {
                return Ok(());
            }
            if self.unmarked.contains(&origin) {
                std::fs::write(destination.join("README.md"), origin)?;
                return Ok(());
            }
            // Debris from a failed transfer must not reach the destination.
            std::fs::write(destination.join("partial.zip"), b"...")?;
            if self.good.contains(&origin) {
                std::fs::remove_file(destination.join("partial.zip"))?;
                std::fs::write(destination.join("CMakeLists.txt"), origin)?;
                Ok(())
            } else {
                Err(FetchError::NotFound {
                    origin: origin.to_string(),
                })
            }
        }
    }

    fn candidates(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn second_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        let fetcher = FakeFetcher::new(&["B"]);

        let acq = acquire_source(
            &candidates(&["A", "B", "C"]),
            &dest,
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();

        assert_eq!(acq.origin.as_deref(), Some("B"));
        assert_eq!(acq.failures.len(), 1);
        assert_eq!(acq.failures[0].origin, "A");
        assert_eq!(*fetcher.attempts.borrow(), vec!["A", "B"]);
        assert!(!dest.join("partial.zip").exists());
        assert_eq!(std::fs::read_to_string(dest.join("CMakeLists.txt")).unwrap(), "B");
    }

    #[test]
    fn staging_leaves_no_scratch_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        let fetcher = FakeFetcher::new(&["B"]);
        acquire_source(
            &candidates(&["A", "B"]),
            &dest,
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["src"]);
    }

    #[test]
    fn strict_exhaustion_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(&[]);
        let err = acquire_source(
            &candidates(&["A", "B"]),
            &dir.path().join("src"),
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap_err();
        match err {
            ResolveError::AcquisitionExhausted { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(failures[1].cause.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_exhaustion_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(&[]);
        let acq = acquire_source(
            &candidates(&["A", "B"]),
            &dir.path().join("src"),
            MARKER,
            &fetcher,
            AcquisitionPolicy::Lenient,
        )
        .unwrap();
        assert!(!acq.succeeded());
        assert_eq!(acq.failures.len(), 2);
    }

    #[test]
    fn failed_attempts_keep_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("my_notes.txt"), "keep me").unwrap();

        let acq = acquire_source(
            &candidates(&["/nowhere"]),
            &dest,
            MARKER,
            &LocalFetcher,
            AcquisitionPolicy::Lenient,
        )
        .unwrap();
        assert!(!acq.succeeded());
        assert_eq!(
            std::fs::read_to_string(dest.join("my_notes.txt")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn occupied_destination_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("my_notes.txt"), "keep me").unwrap();

        let err = acquire_source(
            &candidates(&["A"]),
            &dest,
            MARKER,
            &FakeFetcher::new(&["A"]),
            AcquisitionPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::DestinationOccupied { .. }));
        assert!(dest.join("my_notes.txt").is_file());
        assert!(!dest.join("CMakeLists.txt").exists());
    }

    #[test]
    fn empty_destination_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        std::fs::create_dir_all(&dest).unwrap();
        let acq = acquire_source(
            &candidates(&["A"]),
            &dest,
            MARKER,
            &FakeFetcher::new(&["A"]),
            AcquisitionPolicy::Strict,
        )
        .unwrap();
        assert!(acq.succeeded());
        assert!(dest.join("CMakeLists.txt").is_file());
    }

    #[test]
    fn empty_transfer_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = FakeFetcher::new(&["B"]);
        fetcher.empty.push("A");
        let acq = acquire_source(
            &candidates(&["A", "B"]),
            &dir.path().join("src"),
            None,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();
        assert_eq!(acq.origin.as_deref(), Some("B"));
        assert!(acq.failures[0].cause.contains("empty"));
    }

    #[test]
    fn transfer_without_marker_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        let mut fetcher = FakeFetcher::new(&["B"]);
        fetcher.unmarked.push("A");
        let acq = acquire_source(
            &candidates(&["A", "B"]),
            &dest,
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();
        assert_eq!(acq.origin.as_deref(), Some("B"));
        assert!(acq.failures[0].cause.contains("CMakeLists.txt"));
        assert!(!dest.join("README.md").exists());
    }

    #[test]
    fn no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("src");
        let fetcher = FakeFetcher::new(&[]);
        assert!(
            acquire_source(&[], &dest, MARKER, &fetcher, AcquisitionPolicy::Strict).is_err()
        );
        let acq =
            acquire_source(&[], &dest, MARKER, &fetcher, AcquisitionPolicy::Lenient).unwrap();
        assert!(acq.failures.is_empty());
    }

    #[test]
    fn populated_checks_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_populated(dir.path(), None));
        std::fs::write(dir.path().join("README.md"), "").unwrap();
        assert!(is_populated(dir.path(), None));
        assert!(!is_populated(dir.path(), MARKER));
        std::fs::write(dir.path().join("CMakeLists.txt"), "").unwrap();
        assert!(is_populated(dir.path(), MARKER));
    }

    #[test]
    fn ensure_skips_populated_destination() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CMakeLists.txt"), "").unwrap();
        let fetcher = FakeFetcher::new(&["A"]);
        let outcome = ensure_sources(
            &candidates(&["A"]),
            dir.path(),
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();
        assert!(outcome.is_none());
        assert!(fetcher.attempts.borrow().is_empty());

        let dest = dir.path().join("fresh");
        let outcome = ensure_sources(
            &candidates(&["A"]),
            &dest,
            MARKER,
            &fetcher,
            AcquisitionPolicy::Strict,
        )
        .unwrap();
        assert_eq!(outcome.and_then(|a| a.origin).as_deref(), Some("A"));
    }

    #[test]
    fn policy_from_flag() {
        assert_eq!(AcquisitionPolicy::from_strict(true), AcquisitionPolicy::Strict);
        assert_eq!(AcquisitionPolicy::from_strict(false), AcquisitionPolicy::Lenient);
        assert_eq!(AcquisitionPolicy::default(), AcquisitionPolicy::Strict);
    }
}
