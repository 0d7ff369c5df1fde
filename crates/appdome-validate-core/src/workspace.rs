use std::io;
use std::path::Path;

use tempfile::TempDir;
use tracing::{info, warn};

/// Run-scoped scratch directory holding the engine checkout and downloads.
///
/// Removed by [`RunWorkspace::cleanup`]; if a run unwinds before that, the
/// underlying [`TempDir`] still removes it on drop.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: TempDir,
}

impl RunWorkspace {
    pub const PREFIX: &'static str = "AppdomeValidation";
    pub const SUFFIX: &'static str = "Validate";

    /// Creates a fresh workspace inside `base`.
    ///
    /// The workspace path is absolute so the engine script stays reachable
    /// after the runner switches into the engine directory.
    pub fn create_in(base: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(Self::PREFIX)
            .suffix(Self::SUFFIX)
            .tempdir_in(std::path::absolute(base)?)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Deletes the workspace and everything in it.
    pub fn cleanup(self) {
        info!("Deleting temporary files.");
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("failed to delete workspace {}: {e}", path.display());
        }
    }
}
