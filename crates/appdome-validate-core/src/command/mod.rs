//! Composition of the validation engine invocation.
//!
//! The invocation is kept as a list of discrete argv tokens from start to
//! finish; it is never flattened into a shell string.

pub mod compose;
pub mod output;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactSource, ResolvedArtifacts};
use crate::config::Secret;

pub use compose::{CommandComposer, ENGINE_SCRIPT};
pub use output::OutputTarget;

pub const KEY_FLAG: &str = "--api_key";
pub const APP_FLAG: &str = "--app";
pub const OUTPUT_FLAG: &str = "--output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Non-fatal observation made while composing, surfaced in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// A fully composed engine invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    token: Secret,
    app: String,
    output: Option<PathBuf>,
    pub source: ArtifactSource,
    pub artifacts: ResolvedArtifacts,
    pub notices: Vec<Notice>,
}

impl Invocation {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Path the engine will write its JSON result to, if any.
    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }

    /// Arguments after the program, in their fixed order.
    pub fn args(&self) -> Vec<String> {
        self.tokens(self.token.expose())
    }

    /// Complete argv including the program.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        argv.extend(self.args());
        argv
    }

    /// Argv with the API key replaced, safe for logs and reports.
    pub fn redacted_argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        argv.extend(self.tokens(Secret::REDACTED));
        argv
    }

    fn tokens(&self, key: &str) -> Vec<String> {
        let mut args = vec![
            KEY_FLAG.to_string(),
            key.to_string(),
            APP_FLAG.to_string(),
            self.app.clone(),
        ];
        if let Some(output) = &self.output {
            args.push(OUTPUT_FLAG.to_string());
            args.push(output.to_string_lossy().into_owned());
        }
        args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted_argv().join(" "))
    }
}
