use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use tracing::info;

use super::{ObjectStore, StorageError};
use crate::config::settings::S3Config;

/// Any S3-compatible bucket (AWS, MinIO, R2, Supabase's S3 gateway).
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    public_base: String,
    timeout: Duration,
}

impl S3Store {
    pub fn new(config: &S3Config, timeout: Duration) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "static",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        info!(endpoint = %config.endpoint, bucket = %config.bucket, "S3 storage configured");

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket.clone(),
            public_base: config
                .public_url
                .clone()
                .unwrap_or_else(|| config.endpoint.clone()),
            timeout,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, key)
    }

    async fn put_file(&self, source: &Path, key: &str, content_type: &str) -> Result<(), StorageError> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(aws_sdk_s3::Error::from(e).to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        source: &Path,
        object_path: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        tokio::time::timeout(self.timeout, self.put_file(source, object_path, content_type))
            .await
            .map_err(|_| StorageError::TimedOut(self.timeout))??;

        info!(bucket = %self.bucket, object_path, "Uploaded to S3");
        Ok(self.public_url(object_path))
    }
}
