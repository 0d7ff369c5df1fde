use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.*$").expect("valid http url regex"));

/// Returns true when `value` is an http(s) URL.
pub fn is_http_url(value: &str) -> bool {
    HTTP_URL.is_match(value)
}

/// Splits a comma-separated reference list into trimmed, non-empty segments.
pub fn split_references(references: &str) -> impl Iterator<Item = &str> {
    references
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// A single "what to validate" entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactReference {
    LocalPath(String),
    RemoteUrl(String),
}

impl ArtifactReference {
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        if is_http_url(segment) {
            Self::RemoteUrl(segment.to_string())
        } else {
            Self::LocalPath(segment.to_string())
        }
    }

    /// Parses every segment of a comma-separated list.
    pub fn parse_list(references: &str) -> Vec<Self> {
        split_references(references).map(Self::parse).collect()
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUrl(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LocalPath(s) | Self::RemoteUrl(s) => s,
        }
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the raw reference list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Configured(String),
    Environment {
        variable: &'static str,
        value: String,
    },
}

impl ArtifactSource {
    pub fn raw(&self) -> &str {
        match self {
            Self::Configured(value) | Self::Environment { value, .. } => value,
        }
    }

    /// True when the list leads with a URL, i.e. there is no local
    /// directory next to the artifact to hold a default report.
    pub fn is_remote(&self) -> bool {
        is_http_url(self.raw().trim())
    }
}
