use std::fs;
use std::path::PathBuf;

use super::Notice;
use crate::RESULTS_FILE_NAME;
use crate::artifact::{ArtifactSource, ResolvedArtifacts};
use crate::error::ResolutionError;

/// Where the engine's JSON result should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Path ending in `.json` (case-insensitive), used as the result file.
    ExplicitFile(String),
    /// Path ending in `/`; the report lands in `<dir>/results.json`.
    Directory(String),
    /// Anything else. No report is written.
    Invalid(String),
    Unspecified,
}

impl OutputTarget {
    pub fn parse(location: Option<&str>) -> Self {
        match location.map(str::trim).filter(|l| !l.is_empty()) {
            None => Self::Unspecified,
            Some(l) if l.to_lowercase().ends_with(".json") => Self::ExplicitFile(l.to_string()),
            Some(l) if l.ends_with('/') => Self::Directory(l.to_string()),
            Some(l) => Self::Invalid(l.to_string()),
        }
    }
}

/// `results.json` next to the artifact: everything up to and including the
/// last `/` of `app_path`, or a bare `results.json` when there is none.
pub fn default_output_for(app_path: &str) -> String {
    let dir_end = app_path.rfind('/').map_or(0, |i| i + 1);
    format!("{}{RESULTS_FILE_NAME}", &app_path[..dir_end])
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDecision {
    pub path: Option<PathBuf>,
    pub notice: Option<Notice>,
}

/// Resolves the output flag value, creating the directory for
/// [`OutputTarget::Directory`].
pub fn decide_output(
    target: &OutputTarget,
    source: &ArtifactSource,
    artifacts: &ResolvedArtifacts,
) -> Result<OutputDecision, ResolutionError> {
    match target {
        OutputTarget::ExplicitFile(file) => Ok(OutputDecision {
            path: Some(absolute(file)?),
            notice: None,
        }),
        OutputTarget::Directory(dir) => {
            let dir = absolute(dir)?;
            fs::create_dir_all(&dir).map_err(|source| ResolutionError::Io {
                path: dir.clone(),
                source,
            })?;
            Ok(OutputDecision {
                path: Some(dir.join(RESULTS_FILE_NAME)),
                notice: None,
            })
        }
        OutputTarget::Invalid(_) => Ok(OutputDecision {
            path: None,
            notice: Some(Notice::warning(
                "Output location is not valid. Result won't be saved to a JSON file.",
            )),
        }),
        OutputTarget::Unspecified => {
            let local_app = artifacts.first().filter(|_| !source.is_remote());
            match local_app {
                Some(app) => {
                    let derived = default_output_for(&app.path.to_string_lossy());
                    Ok(OutputDecision {
                        notice: Some(Notice::warning(format!(
                            "The output location for the JSON result was not provided. \
                             The JSON data will be saved to {derived}"
                        ))),
                        path: Some(PathBuf::from(derived)),
                    })
                }
                None => Ok(OutputDecision {
                    path: None,
                    notice: Some(Notice::info("Result won't be saved to a JSON file.")),
                }),
            }
        }
    }
}

/// Pins an output location to the caller's working directory; the engine
/// itself runs from a different one.
fn absolute(location: &str) -> Result<PathBuf, ResolutionError> {
    std::path::absolute(location).map_err(|source| ResolutionError::Io {
        path: PathBuf::from(location),
        source,
    })
}
