use std::sync::Arc;

use anyhow::Context;

use crate::config::settings::AppConfig;
use crate::infrastructure::ffmpeg::FfmpegMixer;
use crate::infrastructure::http::Downloader;
use crate::infrastructure::storage::{self, ObjectStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub downloader: Downloader,
    pub mixer: FfmpegMixer,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        downloader: Downloader,
        mixer: FfmpegMixer,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            downloader,
            mixer,
            storage,
        }
    }

    /// Wires the production collaborators described by `config`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let downloader = Downloader::new(config.download_timeout, config.max_download_bytes)
            .context("failed to build download client")?;
        let mixer = FfmpegMixer::new(
            config.ffmpeg_bin.clone(),
            config.ffmpeg_timeout,
            config.max_concurrent_mixes,
        );
        let storage = storage::from_config(&config.storage, config.upload_timeout)
            .context("failed to configure object storage")?;

        Ok(Self::new(config, downloader, mixer, storage))
    }
}
