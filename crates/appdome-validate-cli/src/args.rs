use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "appdome-validate",
    version,
    about = "Validate a mobile app binary with Appdome Validate-2secure"
)]
pub struct Args {
    /// Appdome API token
    #[arg(long, env = "APPDOME_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Comma-separated .apk/.aab/.ipa paths or http(s) URLs.
    /// Falls back to the VALIDATE_APP_PATH environment variable
    #[arg(long = "app")]
    pub app_path: Option<String>,

    /// Engine result location: a *.json file or a directory ending in '/'
    #[arg(long = "output")]
    pub output_location: Option<String>,

    /// Directory that holds the temporary run workspace
    #[arg(long, default_value = ".")]
    pub workspace_dir: PathBuf,

    /// Stop the validation engine after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Only check the configuration fields, then exit
    #[arg(long)]
    pub check: bool,

    /// Summary format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write the run summary to a file instead of stdout
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional git commit hash for tool metadata
    #[arg(long)]
    pub commit: Option<String>,

    /// Log filter directive, e.g. "info" or "appdome_validate_core=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
