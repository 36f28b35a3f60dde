/// Encodings the mixer can produce. The ffmpeg arguments are tuned for MP3 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp3,
}

impl OutputFormat {
    /// Case-insensitive; anything but `mp3` is unsupported.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "mp3" => Some(OutputFormat::Mp3),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
        }
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_ext(self.extension())
            .first_or_octet_stream()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_is_accepted_in_any_case() {
        assert_eq!(OutputFormat::parse("mp3"), Some(OutputFormat::Mp3));
        assert_eq!(OutputFormat::parse("MP3"), Some(OutputFormat::Mp3));
    }

    #[test]
    fn other_formats_are_rejected() {
        assert_eq!(OutputFormat::parse("wav"), None);
        assert_eq!(OutputFormat::parse(""), None);
        assert_eq!(OutputFormat::parse(" mp3 "), None);
    }

    #[test]
    fn mp3_uploads_as_audio_mpeg() {
        assert_eq!(OutputFormat::Mp3.content_type(), "audio/mpeg");
    }
}
