//! Retrieval layer: the full text of each code family from files or HTTP.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crosswalk_core::CodeFamily;
use thiserror::Error;
use tracing::info;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::HttpSource;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no {family} code document at {location}")]
    NotFound {
        family: CodeFamily,
        location: String,
    },

    #[error("{family} code document is not valid UTF-8")]
    Malformed { family: CodeFamily },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "http")]
    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },
}

/// Provider of one raw code document per family.
///
/// A failed fetch means that family has nothing to ingest this run; callers
/// decide whether to skip or abort.
#[async_trait]
pub trait DocumentSource {
    async fn fetch(&self, family: CodeFamily) -> Result<String, SourceError>;
}

/// Reads each family's document from a local file.
pub struct FileSource {
    old: PathBuf,
    new: PathBuf,
}

impl FileSource {
    pub fn new(old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    fn path_for(&self, family: CodeFamily) -> &Path {
        match family {
            CodeFamily::Old => &self.old,
            CodeFamily::New => &self.new,
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self, family: CodeFamily) -> Result<String, SourceError> {
        let path = self.path_for(family);
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    family,
                    location: path.display().to_string(),
                }
            } else {
                SourceError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let text = String::from_utf8(bytes).map_err(|_| SourceError::Malformed { family })?;
        info!(family = %family, bytes = text.len(), path = %path.display(), "read code document");
        Ok(text)
    }
}
