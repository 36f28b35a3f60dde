use axum::http::StatusCode;

use crate::common::response::ApiError;
use crate::infrastructure::ffmpeg::FfmpegError;
use crate::infrastructure::http::DownloadError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum MixError {
    #[error("Only mp3 output is supported")]
    UnsupportedFormat,
    #[error("{0}")]
    Invalid(String),
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not prepare working directory: {0}")]
    Workspace(#[from] std::io::Error),
}

impl MixError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // The temp dir failing to take the bytes is our fault, not the URL's.
            MixError::Download(DownloadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            MixError::UnsupportedFormat | MixError::Invalid(_) | MixError::Download(_) => {
                StatusCode::BAD_REQUEST
            }
            MixError::Ffmpeg(FfmpegError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            MixError::Storage(StorageError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            MixError::Ffmpeg(_) | MixError::Storage(_) | MixError::Workspace(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MixError> for ApiError {
    fn from(err: MixError) -> Self {
        ApiError(err.to_string(), err.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_mistakes_are_bad_requests() {
        assert_eq!(MixError::UnsupportedFormat.status_code(), StatusCode::BAD_REQUEST);
        let download = MixError::from(DownloadError::Status {
            url: "https://cdn.example.com/voice.wav".to_string(),
            status: 404,
        });
        assert_eq!(download.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            download.to_string(),
            "Download failed: https://cdn.example.com/voice.wav returned 404"
        );
    }

    #[test]
    fn local_write_failure_during_download_is_a_server_error() {
        let err = MixError::from(DownloadError::Io(std::io::Error::other(
            "No space left on device",
        )));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn ffmpeg_failure_is_a_server_error_with_stderr() {
        let err = MixError::from(FfmpegError::Failed {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "ffmpeg failed: Invalid data found when processing input");
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        let err = MixError::from(FfmpegError::TimedOut(Duration::from_secs(600)));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn upload_timeout_maps_to_gateway_timeout() {
        let err = MixError::from(StorageError::TimedOut(Duration::from_secs(180)));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn missing_credentials_surface_verbatim() {
        let api: ApiError = MixError::from(StorageError::MissingCredentials).into();
        assert_eq!(api.0, "Missing Supabase credentials");
        assert_eq!(api.1, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
