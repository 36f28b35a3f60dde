use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },
    #[error("could not write download to disk: {0}")]
    Io(#[from] std::io::Error),
}

/// Streams remote media to local files.
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_bytes: u64,
}

impl Downloader {
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, max_bytes })
    }

    /// Downloads `url` into `dest`, returning the number of bytes written.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(DownloadError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_bytes,
                });
            }
        }

        let mut file = BufWriter::new(File::create(dest).await?);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(DownloadError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        debug!(dest = %dest.display(), "Download flushed to disk");
        info!(bytes = written, "Download complete");

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader(max_bytes: u64) -> Downloader {
        Downloader::new(Duration::from_secs(5), max_bytes).unwrap()
    }

    #[tokio::test]
    async fn streams_body_to_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/voice.wav")
            .with_status(200)
            .with_body("RIFF....WAVE")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("voice");
        let url = Url::parse(&format!("{}/voice.wav", server.url())).unwrap();

        let written = downloader(1024).download_to(&url, &dest).await.unwrap();

        mock.assert_async().await;
        assert_eq!(written, 12);
        assert_eq!(std::fs::read(&dest).unwrap(), b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.mp3")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse(&format!("{}/gone.mp3", server.url())).unwrap();

        let err = downloader(1024)
            .download_to(&url, &dir.path().join("music"))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/big.mp3")
            .with_status(200)
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse(&format!("{}/big.mp3", server.url())).unwrap();

        let err = downloader(1000)
            .download_to(&url, &dir.path().join("music"))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::TooLarge { limit: 1000, .. }));
    }
}
