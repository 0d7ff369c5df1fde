use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::ResolutionError;

/// Fetches a remote artifact into a local directory.
pub trait Downloader {
    /// Downloads `url` into `dest_dir`, keeping the URL's trailing path
    /// segment as the file name, and returns the local path.
    fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, ResolutionError>;
}

/// Trailing path segment of a URL, used as the local file name.
pub fn file_name_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Downloads with the system `curl`, following redirects and failing on
/// HTTP errors.
#[derive(Debug, Clone)]
pub struct CurlDownloader {
    program: String,
}

impl Default for CurlDownloader {
    fn default() -> Self {
        Self {
            program: "curl".to_string(),
        }
    }
}

impl CurlDownloader {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Downloader for CurlDownloader {
    fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, ResolutionError> {
        let file_name =
            file_name_from_url(url).ok_or_else(|| ResolutionError::NoFileName(url.to_string()))?;
        let dest = dest_dir.join(file_name);

        debug!(url, dest = %dest.display(), "downloading artifact");

        let status = Command::new(&self.program)
            .arg("-fsSL")
            .arg("-o")
            .arg(&dest)
            .arg(url)
            .current_dir(dest_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ResolutionError::DownloadFailed {
                url: url.to_string(),
                reason: format!("failed to launch {}: {e}", self.program),
            })?;

        if !status.success() {
            return Err(ResolutionError::DownloadFailed {
                url: url.to_string(),
                reason: match status.code() {
                    Some(code) => format!("{} exited with code {code}", self.program),
                    None => format!("{} was terminated by a signal", self.program),
                },
            });
        }

        Ok(dest)
    }
}
