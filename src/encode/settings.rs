use std::time::Duration;

use crate::foundation::{
    core::FrameSize,
    error::{ReelError, ReelResult},
};

/// Output encoding options handed to ffmpeg.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EncodeSettings {
    /// Video encoder name.
    pub video_codec: String,
    /// Audio encoder name, used when the composition has audio.
    pub audio_codec: String,
    /// Output pixel format.
    pub pixel_format: String,
    /// Container format passed to `-f`.
    pub container: String,
    /// Overwrite the destination if it already exists.
    pub overwrite: bool,
    /// ffmpeg executable.
    pub ffmpeg_bin: String,
    /// Kill the encoder child after this long.
    pub timeout: Option<Duration>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pixel_format: "yuv420p".to_string(),
            container: "mp4".to_string(),
            overwrite: true,
            ffmpeg_bin: "ffmpeg".to_string(),
            timeout: None,
        }
    }
}

impl EncodeSettings {
    /// Check settings against the frame size they will encode.
    pub fn validate(&self, size: FrameSize) -> ReelResult<()> {
        for (name, value) in [
            ("video_codec", &self.video_codec),
            ("audio_codec", &self.audio_codec),
            ("pixel_format", &self.pixel_format),
            ("container", &self.container),
            ("ffmpeg_bin", &self.ffmpeg_bin),
        ] {
            if value.trim().is_empty() {
                return Err(ReelError::validation(format!("{name} must be non-empty")));
            }
        }
        if self.pixel_format == "yuv420p"
            && (!size.width.is_multiple_of(2) || !size.height.is_multiple_of(2))
        {
            return Err(ReelError::validation(format!(
                "output size {size} must be even (required for yuv420p output)"
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ReelError::validation("encode timeout must be > 0"));
        }
        Ok(())
    }
}
