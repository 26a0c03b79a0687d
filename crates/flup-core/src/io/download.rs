//! Streaming archive download.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// A partially written file is removed on failure.
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, or a write failure.
pub async fn download_to(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    debug!("Downloading {} to {}", url, dest.display());

    let result = stream_to_file(client, url, dest).await;
    if result.is_err() {
        tokio::fs::remove_file(dest).await.ok();
    }
    result
}

async fn stream_to_file(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let total_size = response.content_length();
    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;
    debug!(
        "Downloaded {} bytes (expected {})",
        downloaded,
        total_size.map_or_else(|| "unknown".to_string(), |s| s.to_string())
    );

    Ok(downloaded)
}
