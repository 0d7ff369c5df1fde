use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::{fs::File, io, path::Path};

use crate::report::model::{ArtifactHash, ArtifactInfo};

/// Compute the report-facing identity of a resolved artifact.
///
/// The identity depends only on the file bytes. The file is streamed
/// through the hasher, since mobile binaries are routinely hundreds of MiB.
pub fn fingerprint_artifact(path: &Path) -> Result<ArtifactInfo> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open artifact: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let size_bytes = io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to read artifact: {}", path.display()))?;

    Ok(ArtifactInfo {
        path: path.display().to_string(),
        source_url: None,
        size_bytes,
        hash: ArtifactHash {
            algorithm: "sha256".to_string(),
            value: hex::encode(hasher.finalize()),
        },
    })
}
