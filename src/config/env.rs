use std::str::FromStr;

use super::settings::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    Host,
    ServerPort,
    ForwardedAllowIps,
    LogFormat,
    StorageBackend,
    SupabaseUrl,
    SupabaseServiceRoleKey,
    SupabaseBucket,
    OutputPrefix,
    S3Endpoint,
    S3Bucket,
    S3Region,
    S3AccessKey,
    S3SecretKey,
    S3PublicUrl,
    FfmpegBin,
    FfmpegTimeoutSecs,
    DownloadTimeoutSecs,
    UploadTimeoutSecs,
    MaxDownloadBytes,
    MaxConcurrentMixes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::Host => "HOST",
            EnvKey::ServerPort => "PORT",
            EnvKey::ForwardedAllowIps => "FORWARDED_ALLOW_IPS",
            EnvKey::LogFormat => "LOG_FORMAT",
            EnvKey::StorageBackend => "STORAGE_BACKEND",
            EnvKey::SupabaseUrl => "SUPABASE_URL",
            EnvKey::SupabaseServiceRoleKey => "SUPABASE_SERVICE_ROLE_KEY",
            EnvKey::SupabaseBucket => "SUPABASE_BUCKET",
            EnvKey::OutputPrefix => "OUTPUT_PREFIX",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3Bucket => "S3_BUCKET",
            EnvKey::S3Region => "S3_REGION",
            EnvKey::S3AccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::S3SecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::S3PublicUrl => "S3_PUBLIC_URL",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::FfmpegTimeoutSecs => "FFMPEG_TIMEOUT_SECS",
            EnvKey::DownloadTimeoutSecs => "DOWNLOAD_TIMEOUT_SECS",
            EnvKey::UploadTimeoutSecs => "UPLOAD_TIMEOUT_SECS",
            EnvKey::MaxDownloadBytes => "MAX_DOWNLOAD_BYTES",
            EnvKey::MaxConcurrentMixes => "MAX_CONCURRENT_MIXES",
        }
    }
}

/// Reads configuration values through a lookup function.
///
/// `Env::system()` reads the process environment; tests hand in a map.
pub struct Env<F> {
    lookup: F,
}

impl Env<fn(&str) -> Option<String>> {
    pub fn system() -> Self {
        Self {
            lookup: |key| std::env::var(key).ok(),
        }
    }
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Empty values count as unset, like an `export FOO=` in a deploy dashboard.
    pub fn get(&self, key: EnvKey) -> Option<String> {
        (self.lookup)(key.as_str()).filter(|v| !v.trim().is_empty())
    }

    pub fn get_or(&self, key: EnvKey, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_parsed<T: FromStr>(&self, key: EnvKey, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(val) => val.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                key: key.as_str(),
                value: val,
            }),
            None => Ok(default),
        }
    }

    pub fn require(&self, key: EnvKey) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key.as_str()))
    }
}
