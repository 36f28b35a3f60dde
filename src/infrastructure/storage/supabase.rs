use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use super::{ObjectStore, StorageError};
use crate::config::settings::SupabaseConfig;

const ERROR_BODY_CHARS: usize = 500;

/// Supabase Storage over its REST API.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    config: SupabaseConfig,
    timeout: Duration,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    fn upload_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.bucket, object_path
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> StorageError {
        if err.is_timeout() {
            StorageError::TimedOut(self.timeout)
        } else {
            StorageError::Transport(err)
        }
    }

    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.bucket, object_path
        )
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn upload(
        &self,
        source: &Path,
        object_path: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.config.url.is_empty() || self.config.service_role_key.is_empty() {
            return Err(StorageError::MissingCredentials);
        }

        let file = File::open(source).await?;
        let len = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let key = &self.config.service_role_key;

        let response = self
            .client
            .post(self.upload_url(object_path))
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header("apikey", key)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, len)
            .header("x-upsert", "true")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            let text = response.text().await.unwrap_or_default();
            let body: String = text.chars().take(ERROR_BODY_CHARS).collect();
            error!(status, object_path, "Supabase rejected upload");
            return Err(StorageError::Rejected { status, body });
        }

        info!(object_path, bytes = len, "Uploaded to Supabase storage");
        Ok(self.public_url(object_path))
    }
}
