//! Artifact references and their resolution to local files.

pub mod download;
pub mod read;
pub mod reference;
pub mod resolve;

pub use download::{CurlDownloader, Downloader};
pub use reference::{ArtifactReference, ArtifactSource};
pub use resolve::{ArtifactResolver, EnvLookup, ResolvedArtifact, ResolvedArtifacts};
