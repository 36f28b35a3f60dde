use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::settings::StorageConfig;

pub mod s3;
pub mod supabase;

pub use s3::S3Store;
pub use supabase::SupabaseStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Missing Supabase credentials")]
    MissingCredentials,
    #[error("Supabase upload failed: {status} {body}")]
    Rejected { status: u16, body: String },
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("S3 upload failed: {0}")]
    S3(String),
    #[error("upload did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("could not read upload source: {0}")]
    Io(#[from] io::Error),
}

/// Destination for finished mixes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Uploads the file at `source` to `object_path` and returns its public URL.
    async fn upload(
        &self,
        source: &Path,
        object_path: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

pub fn from_config(
    config: &StorageConfig,
    upload_timeout: Duration,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::Supabase(c) => Arc::new(SupabaseStore::new(c.clone(), upload_timeout)?),
        StorageConfig::S3(c) => Arc::new(S3Store::new(c, upload_timeout)),
    };
    Ok(store)
}
