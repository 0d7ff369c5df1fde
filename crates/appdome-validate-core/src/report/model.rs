use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::classify::Classification;
use crate::command::{Invocation, Notice};

/// Summary of one validation run.
///
/// This is the JSON contract of `--summary`; the engine's own result file
/// is separate and its schema is not ours. The API token never appears
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub artifacts: Vec<ArtifactInfo>,
    pub invocation: Option<InvocationInfo>,
    pub notices: Vec<Notice>,
    /// Why the run broke down, when it did not reach classification.
    pub error: Option<String>,
    pub classification: Classification,
}

impl RunReport {
    pub fn new(tool: ToolInfo, classification: Classification) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            artifacts: vec![],
            invocation: None,
            notices: vec![],
            error: None,
            classification,
        }
    }

    /// Records the composed invocation and its notices.
    pub fn record_invocation(&mut self, invocation: &Invocation) {
        self.invocation = Some(InvocationInfo::from(invocation));
        self.notices.extend(invocation.notices.iter().cloned());
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub commit: Option<String>,
}

impl Default for ToolInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: None,
        }
    }
}

/// Artifact metadata bound to this report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: String,
    /// URL the artifact was downloaded from, when it was remote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub size_bytes: u64,
    pub hash: ArtifactHash,
}

/// Cryptographic artifact fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactHash {
    pub algorithm: String,
    pub value: String,
}

/// Engine invocation as it was launched, with the API key redacted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationInfo {
    pub argv: Vec<String>,
    pub output_path: Option<String>,
}

impl From<&Invocation> for InvocationInfo {
    fn from(invocation: &Invocation) -> Self {
        Self {
            argv: invocation.redacted_argv(),
            output_path: invocation
                .output_path()
                .map(|p| p.to_string_lossy().into_owned()),
        }
    }
}
