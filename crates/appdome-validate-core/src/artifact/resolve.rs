//! Turns artifact references into local files.
//!
//! Local segments pass through untouched; URL segments are downloaded into
//! `<work_dir>/user_files/`. The joined result keeps the input order and
//! separator so a purely local list round-trips unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::download::Downloader;
use super::reference::{ArtifactReference, ArtifactSource};
use crate::config::{non_blank, validate_app_reference};
use crate::error::{ConfigError, ResolutionError};
use crate::{APP_PATH_ENV, USER_FILES_DIR};

/// Environment variable lookup, injected so callers and tests control it.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Picks the configured reference list, falling back to `VALIDATE_APP_PATH`.
pub fn resolve_source(
    configured: Option<&str>,
    env: EnvLookup<'_>,
) -> Result<ArtifactSource, ConfigError> {
    if let Some(value) = non_blank(configured) {
        return Ok(ArtifactSource::Configured(value.trim().to_string()));
    }

    let value = env(APP_PATH_ENV)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingField {
            field: "app",
            variable: APP_PATH_ENV,
        })?;
    validate_app_reference(&value)?;

    Ok(ArtifactSource::Environment {
        variable: APP_PATH_ENV,
        value: value.trim().to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub reference: ArtifactReference,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifacts {
    pub items: Vec<ResolvedArtifact>,
}

impl ResolvedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&ResolvedArtifact> {
        self.items.first()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(|a| a.path.as_path())
    }

    /// Local paths joined with `,`, the form handed to the engine.
    pub fn joined(&self) -> String {
        self.items
            .iter()
            .map(|a| a.path.to_string_lossy())
            .collect::<Vec<_>>()
            .join(",")
            .trim()
            .to_string()
    }

    /// Fails on the first path that is not present on disk.
    pub fn ensure_exist(&self) -> Result<(), ResolutionError> {
        match self.paths().find(|p| !p.exists()) {
            Some(missing) => Err(ResolutionError::ArtifactMissing(missing.to_path_buf())),
            None => Ok(()),
        }
    }
}

pub struct ArtifactResolver<'a> {
    downloader: &'a dyn Downloader,
}

impl<'a> ArtifactResolver<'a> {
    pub fn new(downloader: &'a dyn Downloader) -> Self {
        Self { downloader }
    }

    /// Resolves a comma-separated reference list against `work_dir`.
    ///
    /// Local paths come back absolute. Each URL is downloaded exactly once;
    /// the first failure aborts the whole resolution.
    pub fn resolve(
        &self,
        references: &str,
        work_dir: &Path,
    ) -> Result<ResolvedArtifacts, ResolutionError> {
        let mut resolved = ResolvedArtifacts::default();
        let mut user_files: Option<PathBuf> = None;

        for reference in ArtifactReference::parse_list(references) {
            let path = match &reference {
                // The engine runs from its own checkout, so relative paths
                // are pinned to the caller's working directory here.
                ArtifactReference::LocalPath(path) => {
                    std::path::absolute(path).map_err(|source| ResolutionError::Io {
                        path: PathBuf::from(path),
                        source,
                    })?
                }
                ArtifactReference::RemoteUrl(url) => {
                    let dir = match &user_files {
                        Some(dir) => dir.clone(),
                        None => {
                            let dir = work_dir.join(USER_FILES_DIR);
                            fs::create_dir_all(&dir).map_err(|source| ResolutionError::Io {
                                path: dir.clone(),
                                source,
                            })?;
                            user_files = Some(dir.clone());
                            dir
                        }
                    };
                    info!("Downloading {url}");
                    self.downloader.download(url, &dir)?
                }
            };
            resolved.items.push(ResolvedArtifact { reference, path });
        }

        Ok(resolved)
    }
}
