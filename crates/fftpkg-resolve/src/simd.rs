//! SIMD level selection with linear fallback.

use fftpkg_platform::{PlatformDescriptor, SimdChoice, SimdRequest};

use crate::options::OptionSink;

/// Chosen SIMD level plus one warning per rejected level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimdResolution {
    pub choice: SimdChoice,
    pub warnings: Vec<String>,
}

/// Select a SIMD level for `platform` and apply it to `option` on `sink`.
///
/// Non-x86 targets get [`SimdChoice::AutoDetect`] without touching the sink.
/// On x86 the requested level is tried first, then each lower level in
/// `avx2 -> avx -> sse2 -> none`. A skipped level is never retried. If the
/// sink rejects every level the option is left unset; this is not an error.
pub fn resolve_simd_level(
    platform: &PlatformDescriptor,
    request: SimdRequest,
    option: &str,
    sink: &mut dyn OptionSink,
) -> SimdResolution {
    let mut warnings = Vec::new();

    if !platform.arch.is_x86_family() {
        if let SimdRequest::Level(level) = request {
            log::info!(
                "ignoring requested SIMD level '{level}' on {}: detection is left to the library",
                platform.arch
            );
        }
        return SimdResolution {
            choice: SimdChoice::AutoDetect,
            warnings,
        };
    }

    for level in request.starting_level().fallback_chain() {
        log::debug!("trying {option}={level}");
        match sink.apply(option, level.as_str()) {
            Ok(()) => {
                log::info!("{option} resolved to '{level}'");
                return SimdResolution {
                    choice: SimdChoice::Level(level),
                    warnings,
                };
            }
            Err(e) => {
                let msg = format!("{option}={level} rejected ({e}); falling back");
                log::warn!("{msg}");
                warnings.push(msg);
            }
        }
    }

    let msg = format!("no SIMD level accepted; leaving '{option}' at its default");
    log::warn!("{msg}");
    warnings.push(msg);
    SimdResolution {
        choice: SimdChoice::Unset,
        warnings,
    }
}
