use std::path::PathBuf;

use deck_logging::deck_info;
use futures_util::StreamExt;
use thiserror::Error;

use crate::filename::download_filename;
use crate::persist::{PartialDownload, PersistError};
use crate::EngineConfig;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Fetches finished documents into the configured output directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    config: EngineConfig,
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(config: EngineConfig) -> reqwest::Result<Self> {
        let client = config.build_client(true)?;
        Ok(Self { config, client })
    }

    /// Downloads `reference` (relative references resolve against the service root)
    /// and returns where it was saved.
    pub async fn download(&self, reference: &str) -> Result<PathBuf, DownloadError> {
        let url = self
            .config
            .resolve(reference)
            .map_err(|err| DownloadError::InvalidUrl {
                url: reference.to_string(),
                message: err.to_string(),
            })?;
        let filename = download_filename(&url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| DownloadError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        // An interrupted body drops `partial`, which removes the part file.
        let mut partial = PartialDownload::begin(&self.config.output_dir, &filename).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| DownloadError::Network(err.to_string()))?;
            partial.append(&chunk).await?;
        }
        let received = partial.received();
        let path = partial.finish().await?;
        deck_info!("Saved {} ({} bytes) to {:?}", url, received, path);
        Ok(path)
    }
}
