//! What a consumer needs to link against the package.

use std::fmt;

use fftpkg_platform::{CompilerFamily, PlatformDescriptor};
use serde::{Deserialize, Serialize};

/// Libraries and compiler flags exported to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CppInfo {
    /// Library names in link order.
    pub libs: Vec<String>,
    pub cxxflags: Vec<String>,
}

impl CppInfo {
    /// Consumer info for a package built for `platform`.
    ///
    /// The per-level kernels are separate libraries that exist only on the
    /// x86 family. `openmp` reflects whether the package was built with
    /// OpenMP required.
    pub fn for_platform(platform: &PlatformDescriptor, openmp: bool) -> Self {
        let x86 = platform.arch.is_x86_family();

        let mut libs = vec!["otfft_common".to_string()];
        if x86 {
            libs.extend(["otfft_sse2", "otfft_avx", "otfft_avx2"].map(String::from));
        }

        let mut cxxflags = Vec::new();
        match platform.compiler {
            CompilerFamily::GccLike => {
                if x86 {
                    cxxflags.push("-msse2".to_string());
                    cxxflags.push("-mavx".to_string());
                }
                if openmp {
                    cxxflags.push("-fopenmp".to_string());
                }
                cxxflags.push("-std=c++11".to_string());
            }
            CompilerFamily::MsvcLike => {
                if x86 {
                    cxxflags.push("/arch:AVX".to_string());
                }
                if openmp {
                    cxxflags.push("/openmp".to_string());
                }
            }
            CompilerFamily::Other => {}
        }

        CppInfo { libs, cxxflags }
    }
}

impl fmt::Display for CppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "libs: {}", self.libs.join(" "))?;
        if self.cxxflags.is_empty() {
            writeln!(f, "cxxflags: (none)")
        } else {
            writeln!(f, "cxxflags: {}", self.cxxflags.join(" "))
        }
    }
}
