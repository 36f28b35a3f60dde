use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

fn default_music_volume() -> f64 {
    0.18
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> String {
    "mp3".to_string()
}

fn validate_http_url(url: &Url) -> Result<(), ValidationError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ValidationError::new("http_url").with_message("URL scheme must be http or https".into())),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MixRequest {
    /// Spoken track; sets the length of the result.
    #[validate(custom(function = "validate_http_url"))]
    pub voice_url: Url,
    /// Music bed, looped under the voice.
    #[validate(custom(function = "validate_http_url"))]
    pub music_url: Url,
    #[serde(default = "default_music_volume")]
    #[validate(range(min = 0.0, max = 1.0, message = "music_volume must be 0.0–1.0"))]
    pub music_volume: f64,
    /// Compress the music whenever the voice is active.
    #[serde(default = "default_true")]
    pub duck: bool,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// EBU R128 normalisation of the final mix.
    #[serde(default = "default_true")]
    pub loudnorm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MixResponse {
    pub ok: bool,
    pub job_id: Uuid,
    pub final_url: String,
    pub bucket: String,
    pub object_path: String,
}

/// First validation message, checked in a fixed field order so the answer is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    for field in ["music_volume", "voice_url", "music_url"] {
        if let Some(error) = fields.get(field).and_then(|errs| errs.first()) {
            return match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            };
        }
    }
    errors.to_string()
}
