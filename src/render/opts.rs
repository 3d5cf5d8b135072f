use std::path::PathBuf;

use crate::foundation::{
    core::Fps,
    error::{ReelError, ReelResult},
};

/// Options shared by composition and lowering for one render.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderOpts {
    /// Pipeline frame rate. Effects are defined per frame at this rate.
    pub fps: Fps,
    /// Sample rate of synthesized silence and of the mixed audio.
    pub sample_rate: u32,
    /// ffmpeg channel layout name of the mixed audio.
    pub channel_layout: String,
    /// Fail the job on the first asset error instead of skipping the clip.
    pub strict_assets: bool,
    /// Fade the mixed audio in and out by `min(0.5s, audio_duration / 10)`.
    pub audio_fade: bool,
    /// Relative asset paths resolve against this directory.
    pub assets_root: PathBuf,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            fps: Fps::PIPELINE,
            sample_rate: 44_100,
            channel_layout: "stereo".to_string(),
            strict_assets: false,
            audio_fade: false,
            assets_root: PathBuf::from("."),
        }
    }
}

impl RenderOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if self.sample_rate == 0 {
            return Err(ReelError::validation("sample_rate must be > 0"));
        }
        if self.channel_layout.trim().is_empty() {
            return Err(ReelError::validation("channel_layout must be non-empty"));
        }
        Ok(())
    }
}
