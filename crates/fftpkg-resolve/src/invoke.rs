//! External build invocation.
//!
//! The resolver has no insight into native build errors: any non-zero exit
//! from the build tool is returned as [`ResolveError::BuildFailure`] with
//! the tool's stderr untouched.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use fftpkg_platform::BuildType;

use crate::error::{ResolveError, Result};
use crate::resolver::{DefinitionNames, ResolvedConfiguration};

/// A native build-generation tool.
pub trait BuildTool {
    /// Generate the build tree for `source` in `build`.
    fn configure(
        &self,
        source: &Path,
        build: &Path,
        definitions: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Compile the configured build tree.
    fn build(&self, build: &Path, build_type: BuildType) -> Result<()>;
}

/// CMake driven through its command-line interface.
#[derive(Debug, Clone)]
pub struct CmakeTool {
    pub program: String,
    pub generator: Option<String>,
    pub jobs: Option<usize>,
}

impl Default for CmakeTool {
    fn default() -> Self {
        Self {
            program: "cmake".into(),
            generator: None,
            jobs: None,
        }
    }
}

impl CmakeTool {
    /// Arguments for the configure step.
    pub fn configure_args(
        &self,
        source: &Path,
        build: &Path,
        definitions: &BTreeMap<String, String>,
    ) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            source.display().to_string(),
            "-B".to_string(),
            build.display().to_string(),
        ];
        if let Some(generator) = &self.generator {
            args.push("-G".into());
            args.push(generator.clone());
        }
        for (key, value) in definitions {
            args.push(format!("-D{key}={value}"));
        }
        args
    }

    /// Arguments for the build step.
    pub fn build_args(&self, build: &Path, build_type: BuildType) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            build.display().to_string(),
            "--config".to_string(),
            build_type.cmake_name().to_string(),
        ];
        if let Some(jobs) = self.jobs {
            args.push("--parallel".into());
            args.push(jobs.to_string());
        }
        args
    }

    fn run(&self, step: &str, args: &[String]) -> Result<()> {
        log::debug!("{} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ResolveError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => ResolveError::Io(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            log::debug!("{line}");
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(ResolveError::BuildFailure {
                step: step.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl BuildTool for CmakeTool {
    fn configure(
        &self,
        source: &Path,
        build: &Path,
        definitions: &BTreeMap<String, String>,
    ) -> Result<()> {
        let args = self.configure_args(source, build, definitions);
        self.run("cmake configure", &args)
    }

    fn build(&self, build: &Path, build_type: BuildType) -> Result<()> {
        let args = self.build_args(build, build_type);
        self.run("cmake build", &args)
    }
}

/// Configure and build the resolved sources into `build_dir`.
pub fn run_build(
    resolved: &ResolvedConfiguration,
    tool: &dyn BuildTool,
    build_dir: &Path,
    names: &DefinitionNames,
) -> Result<()> {
    let source = resolved.require_source_root()?;
    std::fs::create_dir_all(build_dir)?;

    let definitions = resolved.definitions(names);
    log::info!(
        "configuring {} -> {}",
        source.display(),
        build_dir.display()
    );
    tool.configure(source, build_dir, &definitions)?;
    log::info!("building {} ({})", build_dir.display(), resolved.platform.build_type);
    tool.build(build_dir, resolved.platform.build_type)
}
