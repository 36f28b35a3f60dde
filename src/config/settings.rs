use std::time::Duration;

use crate::config::env::{Env, EnvKey};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for environment variable {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
    pub bucket: String,
}

#[derive(Clone, Debug)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url: Option<String>,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    Supabase(SupabaseConfig),
    S3(S3Config),
}

impl StorageConfig {
    pub fn bucket(&self) -> &str {
        match self {
            StorageConfig::Supabase(c) => &c.bucket,
            StorageConfig::S3(c) => &c.bucket,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub server_port: u16,
    pub forwarded_allow_ips: String,
    pub log_format: LogFormat,
    pub storage: StorageConfig,
    pub output_prefix: String,
    pub ffmpeg_bin: String,
    pub ffmpeg_timeout: Duration,
    pub download_timeout: Duration,
    pub upload_timeout: Duration,
    pub max_download_bytes: u64,
    pub max_concurrent_mixes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(&Env::system())
    }

    pub fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match env.get_or(EnvKey::LogFormat, "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    key: EnvKey::LogFormat.as_str(),
                    value: other.to_string(),
                });
            }
        };

        let storage = match env.get_or(EnvKey::StorageBackend, "supabase").to_lowercase().as_str() {
            // Credentials may be absent at boot; uploads fail per request instead.
            "supabase" => StorageConfig::Supabase(SupabaseConfig {
                url: env.get_or(EnvKey::SupabaseUrl, "").trim_end_matches('/').to_string(),
                service_role_key: env.get_or(EnvKey::SupabaseServiceRoleKey, ""),
                bucket: env.get_or(EnvKey::SupabaseBucket, "audiofiles"),
            }),
            "s3" => StorageConfig::S3(S3Config {
                endpoint: env.require(EnvKey::S3Endpoint)?.trim_end_matches('/').to_string(),
                bucket: env.require(EnvKey::S3Bucket)?,
                region: env.get_or(EnvKey::S3Region, "us-east-1"),
                access_key: env.require(EnvKey::S3AccessKey)?,
                secret_key: env.require(EnvKey::S3SecretKey)?,
                public_url: env
                    .get(EnvKey::S3PublicUrl)
                    .map(|u| u.trim_end_matches('/').to_string()),
            }),
            other => {
                return Err(ConfigError::Invalid {
                    key: EnvKey::StorageBackend.as_str(),
                    value: other.to_string(),
                });
            }
        };

        let max_concurrent_mixes = env.get_parsed(EnvKey::MaxConcurrentMixes, 2usize)?;
        if max_concurrent_mixes == 0 {
            return Err(ConfigError::Invalid {
                key: EnvKey::MaxConcurrentMixes.as_str(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host: env.get_or(EnvKey::Host, "0.0.0.0"),
            server_port: env.get_parsed(EnvKey::ServerPort, 10000)?,
            forwarded_allow_ips: env.get_or(EnvKey::ForwardedAllowIps, "127.0.0.1"),
            log_format,
            storage,
            output_prefix: env
                .get_or(EnvKey::OutputPrefix, "final")
                .trim_matches('/')
                .to_string(),
            ffmpeg_bin: env.get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ffmpeg_timeout: Duration::from_secs(env.get_parsed(EnvKey::FfmpegTimeoutSecs, 600)?),
            download_timeout: Duration::from_secs(env.get_parsed(EnvKey::DownloadTimeoutSecs, 120)?),
            upload_timeout: Duration::from_secs(env.get_parsed(EnvKey::UploadTimeoutSecs, 180)?),
            max_download_bytes: env.get_parsed(EnvKey::MaxDownloadBytes, 200 * 1024 * 1024)?,
            max_concurrent_mixes,
        })
    }
}
