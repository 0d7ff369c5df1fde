//! Run configuration.
//!
//! A [`ValidateConfig`] is built once by the caller and passed by value
//! through the pipeline. The only implicit input is the documented
//! `VALIDATE_APP_PATH` fallback, which is read through an injected lookup
//! (see [`crate::artifact::resolve::resolve_source`]).

pub mod check;

use std::fmt;
use std::time::Duration;

use crate::artifact::reference::split_references;
use crate::command::output::OutputTarget;
use crate::error::ConfigError;

/// Extensions accepted for application artifacts.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".apk", ".aab", ".ipa"];

/// API token for the validation service.
///
/// Never printed: `Debug` and `Display` are redacted. Use
/// [`Secret::expose`] only where the raw value must reach the engine.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub const REDACTED: &'static str = "****";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::REDACTED)
    }
}

/// Inputs of one validation run.
#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub token: Secret,
    /// Comma-separated local paths and/or http(s) URLs.
    pub app_path: Option<String>,
    /// `*.json` file or a directory ending in `/`.
    pub output_location: Option<String>,
    /// Upper bound on the engine subprocess. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ValidateConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token),
            app_path: None,
            output_location: None,
            timeout: None,
        }
    }

    pub fn with_app_path(mut self, app_path: impl Into<String>) -> Self {
        self.app_path = Some(app_path.into());
        self
    }

    pub fn with_output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = Some(location.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured app path, `None` when absent or blank.
    pub fn app_path(&self) -> Option<&str> {
        non_blank(self.app_path.as_deref())
    }

    /// Configured output location, `None` when absent or blank.
    pub fn output_location(&self) -> Option<&str> {
        non_blank(self.output_location.as_deref())
    }

    /// Validates every configured field, returning the first problem found.
    ///
    /// An absent app path is not an error here; it is resolved later from
    /// the environment and validated at that point.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_token(&self.token)?;
        if let Some(app_path) = self.app_path() {
            validate_app_reference(app_path)?;
        }
        if let Some(location) = self.output_location() {
            validate_output_location(location)?;
        }
        Ok(())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_token(token: &Secret) -> Result<(), ConfigError> {
    if token.is_blank() {
        return Err(ConfigError::MissingToken);
    }
    if token.expose().contains(char::is_whitespace) {
        return Err(ConfigError::WhitespaceInToken);
    }
    Ok(())
}

/// Checks a comma-separated artifact reference list.
pub fn validate_app_reference(app_path: &str) -> Result<(), ConfigError> {
    if app_path.trim().contains(char::is_whitespace) {
        return Err(ConfigError::WhitespaceInPath(app_path.to_string()));
    }
    for segment in split_references(app_path) {
        if !has_allowed_extension(segment) {
            return Err(ConfigError::DisallowedExtension(segment.to_string()));
        }
    }
    Ok(())
}

pub fn validate_output_location(location: &str) -> Result<(), ConfigError> {
    if location.contains(char::is_whitespace) {
        return Err(ConfigError::WhitespaceInPath(location.to_string()));
    }
    match OutputTarget::parse(Some(location)) {
        OutputTarget::Invalid(_) => Err(ConfigError::InvalidOutputLocation(location.to_string())),
        _ => Ok(()),
    }
}

pub fn has_allowed_extension(path: &str) -> bool {
    ALLOWED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
