//! OpenMP requirement decision and the `CMakeLists.txt` patch that applies it.
//!
//! The upstream build description declares `find_package(OpenMP REQUIRED)`.
//! Suppressing OpenMP drops the `REQUIRED` qualifier; requiring it adds the
//! qualifier back to a bare `find_package(OpenMP)`. Lines are matched
//! case-insensitively on the command name, and only single-line
//! invocations are rewritten.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::options::BuildOptionSet;

/// Name of the boolean option that controls OpenMP.
pub const WITH_OPENMP: &str = "with_openmp";

const REQUIRED: &str = "REQUIRED";

/// Whether the build hard-requires OpenMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParallelismDecision {
    /// Fail the build when OpenMP is unavailable.
    Require,
    /// Build without OpenMP even if the toolchain provides it.
    Suppress,
}

impl ParallelismDecision {
    pub fn openmp_enabled(self) -> bool {
        self == ParallelismDecision::Require
    }
}

/// Result of applying a decision to a build description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchOutcome {
    /// At least one line was rewritten.
    Applied,
    /// Matching lines exist and already express the decision.
    AlreadyApplied,
    /// No `find_package(OpenMP ...)` line was found.
    PatternNotFound,
}

/// Decide from `with_openmp`, using `default` when the option is absent.
pub fn resolve_parallelism(options: &BuildOptionSet, default: bool) -> ParallelismDecision {
    if options.bool_or(WITH_OPENMP, default) {
        ParallelismDecision::Require
    } else {
        ParallelismDecision::Suppress
    }
}

/// A single-line `find_package(OpenMP ...)` call split into its parts.
struct FindPackage<'a> {
    indent: &'a str,
    command: &'a str,
    args: Vec<&'a str>,
    tail: &'a str,
    eol: &'a str,
}

impl FindPackage<'_> {
    fn parse(line: &str) -> Option<FindPackage<'_>> {
        let body = line.trim_end_matches(['\n', '\r']);
        let eol = &line[body.len()..];
        let indent_len = body.len() - body.trim_start().len();
        let trimmed = &body[indent_len..];

        let open = trimmed.find('(')?;
        let command = trimmed[..open].trim_end();
        if !command.eq_ignore_ascii_case("find_package") {
            return None;
        }
        let close = open + trimmed[open..].find(')')?;
        let args: Vec<&str> = trimmed[open + 1..close].split_whitespace().collect();
        if args.first() != Some(&"OpenMP") {
            return None;
        }

        Some(FindPackage {
            indent: &body[..indent_len],
            command,
            args,
            tail: &trimmed[close + 1..],
            eol,
        })
    }

    fn is_required(&self) -> bool {
        self.args.contains(&REQUIRED)
    }

    fn render(&self) -> String {
        format!(
            "{}{}({}){}{}",
            self.indent,
            self.command,
            self.args.join(" "),
            self.tail,
            self.eol
        )
    }
}

/// Apply `decision` to build-description text.
///
/// Returns the new text and what happened. Applying the same decision to
/// its own output yields [`PatchOutcome::AlreadyApplied`] and identical
/// text.
pub fn apply_parallelism(decision: ParallelismDecision, text: &str) -> (String, PatchOutcome) {
    let mut out = String::with_capacity(text.len() + REQUIRED.len() + 1);
    let mut matched = false;
    let mut changed = false;

    for line in text.split_inclusive('\n') {
        let Some(mut call) = FindPackage::parse(line) else {
            out.push_str(line);
            continue;
        };
        matched = true;

        match (decision, call.is_required()) {
            (ParallelismDecision::Require, false) => {
                call.args.insert(1, REQUIRED);
                out.push_str(&call.render());
                changed = true;
            }
            (ParallelismDecision::Suppress, true) => {
                call.args.retain(|a| *a != REQUIRED);
                out.push_str(&call.render());
                changed = true;
            }
            _ => out.push_str(line),
        }
    }

    let outcome = match (matched, changed) {
        (_, true) => PatchOutcome::Applied,
        (true, false) => PatchOutcome::AlreadyApplied,
        (false, _) => PatchOutcome::PatternNotFound,
    };
    (out, outcome)
}

/// Patch the build description at `path` in place.
///
/// A missing file or missing pattern is logged and reported as
/// [`PatchOutcome::PatternNotFound`]; the file is only rewritten when
/// something changed.
pub fn patch_build_description(path: &Path, decision: ParallelismDecision) -> Result<PatchOutcome> {
    if !path.is_file() {
        log::info!("{} not found; skipping OpenMP patch", path.display());
        return Ok(PatchOutcome::PatternNotFound);
    }

    let original = std::fs::read_to_string(path)?;
    let (patched, outcome) = apply_parallelism(decision, &original);
    match outcome {
        PatchOutcome::Applied => {
            std::fs::write(path, patched)?;
            log::info!("patched {} (OpenMP: {decision:?})", path.display());
        }
        PatchOutcome::AlreadyApplied => {
            log::info!("{} already matches OpenMP: {decision:?}", path.display());
        }
        PatchOutcome::PatternNotFound => {
            log::info!(
                "no find_package(OpenMP) in {}; skipping OpenMP patch",
                path.display()
            );
        }
    }
    Ok(outcome)
}
