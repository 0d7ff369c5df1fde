use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::command::ENGINE_SCRIPT;
use crate::error::AcquisitionError;

/// Public repository that hosts the validation engine.
pub const ENGINE_REPO_URL: &str = "https://github.com/Appdome/appdome-api-bash.git";

/// Directory name produced by cloning [`ENGINE_REPO_URL`].
pub const ENGINE_DIR: &str = "appdome-api-bash";

/// A validation engine checked out inside the run workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    /// Engine repository root; the engine runs with this as cwd.
    pub dir: PathBuf,
}

impl Engine {
    pub fn in_workspace(workspace: &Path) -> Self {
        Self {
            dir: workspace.join(ENGINE_DIR),
        }
    }

    /// Absolute path of the validation entry point.
    pub fn script(&self) -> PathBuf {
        self.dir.join(ENGINE_SCRIPT.trim_start_matches("./"))
    }
}

/// Retrieves the validation engine into a workspace.
pub trait EngineFetcher {
    fn fetch(&self, workspace: &Path) -> Result<Engine, AcquisitionError>;
}

/// Clones the engine repository with the system `git`.
#[derive(Debug, Clone)]
pub struct GitEngineFetcher {
    program: String,
    repo_url: String,
}

impl Default for GitEngineFetcher {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            repo_url: ENGINE_REPO_URL.to_string(),
        }
    }
}

impl GitEngineFetcher {
    pub fn new(program: impl Into<String>, repo_url: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            repo_url: repo_url.into(),
        }
    }
}

impl EngineFetcher for GitEngineFetcher {
    fn fetch(&self, workspace: &Path) -> Result<Engine, AcquisitionError> {
        info!("Updating Appdome Engine...");
        debug!(repo = %self.repo_url, workspace = %workspace.display(), "cloning engine");

        let status = Command::new(&self.program)
            .args(["clone", "--quiet", self.repo_url.as_str(), ENGINE_DIR])
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(AcquisitionError::Spawn)?;

        if !status.success() {
            return Err(AcquisitionError::Failed {
                exit_code: status.code(),
            });
        }

        info!("Appdome engine updated successfully");
        Ok(Engine::in_workspace(workspace))
    }
}
