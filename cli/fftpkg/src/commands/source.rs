//! `fftpkg source`: acquire the library sources.

use std::path::Path;

use anyhow::{Context, Result};
use fftpkg_resolve::{ensure_sources, Acquisition, AcquisitionPolicy, SourceFetcher};

use super::Recipe;

/// Acquire sources into `destination` unless they are already there.
/// Returns `None` when acquisition was skipped.
pub fn acquire(
    recipe: &Recipe,
    destination: &Path,
    fetcher: &dyn SourceFetcher,
    lenient: bool,
) -> Result<Option<Acquisition>> {
    let source = &recipe.manifest.source;
    let policy = if lenient {
        AcquisitionPolicy::Lenient
    } else {
        AcquisitionPolicy::from_strict(recipe.manifest.options.strict_acquisition)
    };
    ensure_sources(
        &source.urls,
        destination,
        source.marker.as_deref(),
        fetcher,
        policy,
    )
    .with_context(|| format!("acquiring sources into {}", destination.display()))
}

pub fn run(
    recipe: &Recipe,
    destination: &Path,
    fetcher: &dyn SourceFetcher,
    lenient: bool,
) -> Result<()> {
    match acquire(recipe, destination, fetcher, lenient)? {
        None => println!("Sources already present in {}", destination.display()),
        Some(acquisition) => {
            for failure in &acquisition.failures {
                println!("  failed: {failure}");
            }
            match &acquisition.origin {
                Some(origin) => println!(
                    "Acquired sources from {origin} into {}",
                    destination.display()
                ),
                None => println!(
                    "warning: no source candidate succeeded; place the sources in {}",
                    destination.display()
                ),
            }
        }
    }
    Ok(())
}
