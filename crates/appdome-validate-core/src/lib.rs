pub mod artifact;
pub mod classify;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod report;
pub mod workspace;

pub use classify::{Classification, ValidationOutcome, classify};
pub use config::{Secret, ValidateConfig};
pub use error::ValidateError;
pub use orchestrator::ValidationOrchestrator;

pub const TOOL_NAME: &str = "appdome-validate";

/// JSON schema version of run summaries.
/// Bump only when `report::model::RunReport` changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Environment variable consulted when no app path is configured.
pub const APP_PATH_ENV: &str = "VALIDATE_APP_PATH";

/// Client identification header handed to the validation engine.
pub const CLIENT_HEADER_ENV: &str = "APPDOME_CLIENT_HEADER";
pub const CLIENT_HEADER_VALUE: &str = "Jenkins/1.2";

/// File name used for the engine's JSON result when only a directory is known.
pub const RESULTS_FILE_NAME: &str = "results.json";

/// Subdirectory of the run workspace that receives downloaded artifacts.
pub const USER_FILES_DIR: &str = "user_files";
