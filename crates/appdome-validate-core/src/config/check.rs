//! Per-field configuration checks with user-facing verdicts.
//!
//! These mirror the rules of [`super::ValidateConfig::validate`] but report
//! every field independently, with warnings for fields that are optional
//! yet worth a note (missing app path, missing output location).

use serde::Serialize;

use super::{Secret, non_blank, validate_app_reference, validate_output_location, validate_token};
use crate::artifact::reference::is_http_url;
use crate::command::output::{OutputTarget, default_output_for};
use crate::{APP_PATH_ENV, RESULTS_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum FieldCheck {
    Ok(Option<String>),
    Warning(String),
    Error(String),
}

impl FieldCheck {
    pub fn is_error(&self) -> bool {
        matches!(self, FieldCheck::Error(_))
    }
}

/// Verdicts for all user-facing fields.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub token: FieldCheck,
    pub app_path: FieldCheck,
    pub output_location: FieldCheck,
}

impl ConfigReport {
    pub fn has_errors(&self) -> bool {
        self.token.is_error() || self.app_path.is_error() || self.output_location.is_error()
    }
}

pub fn check_all(token: Option<&str>, app_path: Option<&str>, output: Option<&str>) -> ConfigReport {
    ConfigReport {
        token: check_token(token),
        app_path: check_app_path(app_path),
        output_location: check_output_location(output, app_path),
    }
}

pub fn check_token(token: Option<&str>) -> FieldCheck {
    match validate_token(&Secret::new(token.unwrap_or_default())) {
        Ok(()) => FieldCheck::Ok(None),
        Err(e) => FieldCheck::Error(e.to_string()),
    }
}

pub fn check_app_path(app_path: Option<&str>) -> FieldCheck {
    let Some(app_path) = non_blank(app_path) else {
        return FieldCheck::Warning(format!(
            "Application path was not provided. \
             Or please ensure that a valid path is provided for application in the environment variable named {APP_PATH_ENV}."
        ));
    };
    match validate_app_reference(app_path) {
        Ok(()) => FieldCheck::Ok(None),
        Err(e) => FieldCheck::Error(e.to_string()),
    }
}

pub fn check_output_location(output: Option<&str>, app_path: Option<&str>) -> FieldCheck {
    let Some(location) = non_blank(output) else {
        return match non_blank(app_path) {
            Some(app) if !is_http_url(app) => FieldCheck::Warning(format!(
                "Output path for JSON file was not provided. and it will be saved to {}",
                default_output_for(app)
            )),
            _ => FieldCheck::Warning("Output path for JSON file was not provided.".to_string()),
        };
    };

    if let Err(e) = validate_output_location(location) {
        return FieldCheck::Error(e.to_string());
    }

    match OutputTarget::parse(Some(location)) {
        OutputTarget::Directory(dir) => FieldCheck::Ok(Some(format!(
            "Output JSON result file will be saved to {dir}{RESULTS_FILE_NAME}"
        ))),
        _ => FieldCheck::Ok(Some(format!("JSON result file will be saved to {location}"))),
    }
}
