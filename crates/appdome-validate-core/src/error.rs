//! Error taxonomy for a validation run.
//!
//! Each stage of the pipeline owns one error type. They all funnel into
//! [`ValidateError`], which the orchestrator converts into a FAILURE
//! outcome plus a log message; nothing here escapes a run.

use std::path::PathBuf;

use thiserror::Error;

/// A required field or environment variable is missing or malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Token is required")]
    MissingToken,

    #[error("White spaces are not allowed in Token.")]
    WhitespaceInToken,

    #[error(
        "The field '{field}' was not provided correctly. \
         Kindly ensure that the environment variable '{variable}' has been correctly inserted."
    )]
    MissingField {
        field: &'static str,
        variable: &'static str,
    },

    #[error("App path was not provided.")]
    AppPathNotProvided,

    #[error("White spaces are not allowed in the path: '{0}'")]
    WhitespaceInPath(String),

    #[error(
        "Application - File extension is not allowed, allowed extensions are: \
         '.apk', '.aab' or '.ipa'. Got '{0}'"
    )]
    DisallowedExtension(String),

    #[error("Please provide a valid path to JSON file results: '{0}'")]
    InvalidOutputLocation(String),
}

/// The validation engine could not be fetched into the workspace.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to launch engine fetch: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Couldn't Update Appdome engine, exit code {exit_code:?}")]
    Failed { exit_code: Option<i32> },
}

/// An artifact reference could not be turned into an existing local file.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("cannot derive a file name from url {0}")]
    NoFileName(String),

    #[error("App file {} does not exist", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The validation engine did not run to a usable completion.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to launch validation engine: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to wait for validation engine: {0}")]
    Wait(#[source] std::io::Error),

    #[error("validation engine timed out after {timeout_secs}s")]
    TimedOut { timeout_secs: u64 },

    #[error("validation run was interrupted")]
    Interrupted,
}

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("workspace I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_field_and_variable() {
        let err = ConfigError::MissingField {
            field: "app",
            variable: "VALIDATE_APP_PATH",
        };
        let msg = err.to_string();
        assert!(msg.contains("'app'"));
        assert!(msg.contains("'VALIDATE_APP_PATH'"));
    }

    #[test]
    fn artifact_missing_mentions_path() {
        let err = ResolutionError::ArtifactMissing(PathBuf::from("/tmp/nope.apk"));
        assert_eq!(err.to_string(), "App file /tmp/nope.apk does not exist");
    }

    #[test]
    fn umbrella_is_transparent() {
        let err: ValidateError = ConfigError::AppPathNotProvided.into();
        assert_eq!(err.to_string(), "App path was not provided.");
    }
}
