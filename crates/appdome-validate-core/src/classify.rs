//! Classification of a finished validation engine run.
//!
//! This module derives the tri-state build result from the engine's exit
//! code and its captured console output.
//!
//! Responsibilities:
//! - Recognise the engine's fixed output markers
//! - Apply a fail-closed policy
//! - Compute CI-compatible exit codes
//!
//! Non-responsibilities:
//! - Running the engine or capturing its output (handled in `process`)
//! - Deciding what happens to the workspace afterwards
//!
//! Policy:
//!
//!   - Non-zero or missing exit code          → FAILURE
//!   - Any line with the not-built marker      → UNSTABLE (scan stops)
//!   - Else any line with the signed marker    → SUCCESS
//!   - Else                                    → FAILURE
//!
//! The not-built marker wins regardless of where a signed marker appears.

use serde::{Deserialize, Serialize};

/// Engine output line reporting an app that Appdome did not build.
pub const NOT_BUILT_BY_APPDOME_MARKER: &str = "This app is not built by Appdome";

/// Engine output line reporting a correctly signed app.
pub const SIGNED_CORRECTLY_MARKER: &str = "This app is signed correctly";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    Success,
    Unstable,
    Failure,
}

impl ValidationOutcome {
    /// Exit code the CLI reports for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            ValidationOutcome::Success => 0,
            ValidationOutcome::Failure => 1,
            ValidationOutcome::Unstable => 2,
        }
    }
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationOutcome::Success => "SUCCESS",
            ValidationOutcome::Unstable => "UNSTABLE",
            ValidationOutcome::Failure => "FAILURE",
        })
    }
}

/// Final classification block of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub outcome: ValidationOutcome,
    pub reason: String,
    /// Exit code of the engine process, `None` when it never ran to exit.
    pub engine_exit_code: Option<i32>,
    pub exit_code: i32,
}

impl Classification {
    pub fn new(
        outcome: ValidationOutcome,
        reason: impl Into<String>,
        engine_exit_code: Option<i32>,
    ) -> Self {
        Self {
            outcome,
            reason: reason.into(),
            engine_exit_code,
            exit_code: outcome.exit_code(),
        }
    }

    /// FAILURE for a run that broke down before classification.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(ValidationOutcome::Failure, reason, None)
    }
}

/// Classifies a finished engine run.
///
/// `lines` is consumed at most once, in order, and only when the engine
/// exited with 0.
pub fn classify<I, S>(exit_code: Option<i32>, lines: I) -> Classification
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match exit_code {
        Some(0) => {}
        Some(code) => {
            return Classification::new(
                ValidationOutcome::Failure,
                format!("Couldn't run Appdome Verification, exitcode {code}"),
                exit_code,
            );
        }
        None => {
            return Classification::new(
                ValidationOutcome::Failure,
                "Couldn't run Appdome Verification, engine terminated without an exit code",
                None,
            );
        }
    }

    let mut signed_correctly = false;
    for line in lines {
        let line = line.as_ref();
        if line.contains(NOT_BUILT_BY_APPDOME_MARKER) {
            return Classification::new(
                ValidationOutcome::Unstable,
                NOT_BUILT_BY_APPDOME_MARKER,
                exit_code,
            );
        } else if line.contains(SIGNED_CORRECTLY_MARKER) {
            signed_correctly = true;
        }
    }

    if signed_correctly {
        Classification::new(ValidationOutcome::Success, SIGNED_CORRECTLY_MARKER, exit_code)
    } else {
        Classification::new(
            ValidationOutcome::Failure,
            "no validation verdict found in engine output",
            exit_code,
        )
    }
}
