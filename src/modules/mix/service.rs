use tracing::{Instrument, info, info_span};
use uuid::Uuid;
use validator::Validate;

use super::dto::{MixRequest, MixResponse, validation_message};
use super::error::MixError;
use super::model::OutputFormat;
use crate::infrastructure::ffmpeg::{MixGraph, MixJob};
use crate::state::AppState;

pub struct MixService;

impl MixService {
    /// Download both tracks, mix them with one ffmpeg run, upload the result.
    ///
    /// Everything happens inside a temp dir that is removed on return.
    pub async fn mix(state: AppState, req: MixRequest) -> Result<MixResponse, MixError> {
        let format = OutputFormat::parse(&req.output_format).ok_or(MixError::UnsupportedFormat)?;
        req.validate()
            .map_err(|e| MixError::Invalid(validation_message(&e)))?;

        let job_id = Uuid::new_v4();
        let object_path = object_path(&state.config.output_prefix, job_id, format);
        let span = info_span!("mix_job", %job_id, %object_path);

        async move {
            info!(
                voice_url = %req.voice_url,
                music_url = %req.music_url,
                music_volume = req.music_volume,
                duck = req.duck,
                loudnorm = req.loudnorm,
                "Starting mix"
            );

            let workdir = tempfile::Builder::new().prefix("mix-").tempdir()?;
            let voice = workdir.path().join("voice");
            let music = workdir.path().join("music");
            let output = workdir.path().join(format!("final.{}", format.extension()));

            tokio::try_join!(
                state.downloader.download_to(&req.voice_url, &voice),
                state.downloader.download_to(&req.music_url, &music),
            )?;

            let job = MixJob {
                voice: &voice,
                music: &music,
                output: &output,
                graph: MixGraph {
                    music_volume: req.music_volume,
                    duck: req.duck,
                    loudnorm: req.loudnorm,
                },
            };
            state.mixer.mix(&job).await?;

            let final_url = state
                .storage
                .upload(&output, &object_path, &format.content_type())
                .await?;

            info!(%final_url, "Mix uploaded");

            Ok::<_, MixError>(MixResponse {
                ok: true,
                job_id,
                final_url,
                bucket: state.storage.bucket().to_string(),
                object_path,
            })
        }
        .instrument(span)
        .await
    }
}

fn object_path(prefix: &str, job_id: Uuid, format: OutputFormat) -> String {
    if prefix.is_empty() {
        format!("{}.{}", job_id, format.extension())
    } else {
        format!("{}/{}.{}", prefix, job_id, format.extension())
    }
}
