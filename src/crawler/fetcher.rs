//! Resource fetcher
//!
//! This module turns absolute URLs into bytes and mirrored files:
//! - Page bytes are returned to the caller, which decides whether to persist them
//! - Assets are saved straight to their mirrored path
//! - An asset whose file already exists is never downloaded again
//! - Cancellation surfaces as its own error so callers can stop the crawl

use crate::crawler::transport::{Transport, TransportError};
use crate::url::local_path;
use crate::UrlError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result of a download-and-save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The resource was downloaded and written to `path`
    Saved { path: PathBuf, bytes: usize },

    /// A file already existed at `path`; no request was made
    AlreadyPresent { path: PathBuf },
}

/// Failure to fetch or persist one resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to download {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to write {url} to {}: {source}", path.display())]
    Io {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot map {url} to a local path: {source}")]
    Url {
        url: String,
        #[source]
        source: UrlError,
    },

    #[error("Download cancelled: {url}")]
    Cancelled { url: String },
}

impl FetchError {
    /// The resource this error belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Io { url, .. }
            | Self::Url { url, .. }
            | Self::Cancelled { url } => url,
        }
    }

    /// Returns true if the failure was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Downloads resources and places them under the output root
pub struct ResourceFetcher<T> {
    transport: T,
    root: PathBuf,
    cancel: CancellationToken,
}

impl<T: Transport> ResourceFetcher<T> {
    /// Creates a fetcher writing under `root`, aborting when `cancel` fires
    pub fn new(transport: T, root: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            transport,
            root: root.into(),
            cancel,
        }
    }

    /// The local file a URL is mirrored to
    pub fn destination(&self, url: &str) -> Result<PathBuf, FetchError> {
        local_path(&self.root, url).map_err(|source| FetchError::Url {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches the full body of `url` into memory
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The response body
    /// * `Err(FetchError::Cancelled)` - Cancellation fired before or during the request
    /// * `Err(FetchError::Transport)` - The request failed
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }

        tracing::info!("Downloading: {}", url);

        match self.transport.fetch(url, &self.cancel).await {
            Ok(bytes) => Ok(bytes),
            Err(TransportError::Cancelled) => Err(FetchError::Cancelled {
                url: url.to_string(),
            }),
            Err(source) => Err(FetchError::Transport {
                url: url.to_string(),
                source,
            }),
        }
    }

    /// Downloads `url` and writes it to its mirrored path, unless that file exists
    pub async fn fetch_and_save(&self, url: &str) -> Result<SaveOutcome, FetchError> {
        let path = self.destination(url)?;

        if tokio::fs::metadata(&path).await.is_ok() {
            tracing::info!("Already exists: {}", url);
            return Ok(SaveOutcome::AlreadyPresent { path });
        }

        let bytes = self.fetch_bytes(url).await?;
        write_artifact(url, &path, &bytes).await?;

        Ok(SaveOutcome::Saved {
            path,
            bytes: bytes.len(),
        })
    }

    /// Writes already-fetched bytes to the mirrored path of `url`
    pub async fn save(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
        let path = self.destination(url)?;
        write_artifact(url, &path, bytes).await?;
        Ok(path)
    }
}

/// Writes `bytes` to `path`, creating missing parent directories
async fn write_artifact(url: &str, path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let io_error = |source: std::io::Error| FetchError::Io {
        url: url.to_string(),
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(io_error)?;

    Ok(())
}
