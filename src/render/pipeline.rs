use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    assets::probe::{AssetProbe, MediaProbe},
    compose::compositor::{Composition, SkippedClip, compose},
    effects::registry::EffectRegistry,
    encode::{
        ffmpeg::{Encoder, FfmpegEncoder},
        settings::EncodeSettings,
    },
    foundation::{cancel::CancelToken, error::ReelResult},
    render::opts::RenderOpts,
    timeline::model::Timeline,
};

/// Summary of one finished render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderReport {
    pub output: PathBuf,
    /// Output length in seconds.
    pub duration: f64,
    pub video_layers: usize,
    pub audio_layers: usize,
    pub skipped: Vec<SkippedClip>,
}

impl RenderReport {
    fn new(composition: &Composition, output: &Path) -> Self {
        Self {
            output: output.to_path_buf(),
            duration: composition.duration,
            video_layers: composition.video.len(),
            audio_layers: composition.audio.len(),
            skipped: composition.skipped.clone(),
        }
    }
}

/// Timeline -> composition -> encoded file.
///
/// Shared read-only between workers; every call owns its composition.
#[derive(Clone)]
pub struct RenderPipeline {
    probe: Arc<dyn AssetProbe>,
    encoder: Arc<dyn Encoder>,
    effects: Arc<EffectRegistry>,
    opts: RenderOpts,
}

impl RenderPipeline {
    pub fn new(probe: Arc<dyn AssetProbe>, encoder: Arc<dyn Encoder>, opts: RenderOpts) -> Self {
        Self {
            probe,
            encoder,
            effects: Arc::new(EffectRegistry::standard()),
            opts,
        }
    }

    /// Pipeline using the system `ffmpeg`/`ffprobe`.
    pub fn with_ffmpeg(opts: RenderOpts, settings: EncodeSettings) -> Self {
        Self::new(
            Arc::new(MediaProbe::default()),
            Arc::new(FfmpegEncoder::new(settings)),
            opts,
        )
    }

    /// Replace the effect table.
    pub fn with_effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = Arc::new(effects);
        self
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Compose without encoding.
    pub fn plan(&self, timeline: &Timeline) -> ReelResult<Composition> {
        compose(timeline, self.probe.as_ref(), &self.effects, &self.opts)
    }

    /// Compose `timeline` and encode it to `out`.
    pub fn render(&self, timeline: &Timeline, out: &Path) -> ReelResult<RenderReport> {
        self.render_with_cancel(timeline, out, &CancelToken::new())
    }

    /// [`render`](Self::render), stopping early once `cancel` fires.
    #[tracing::instrument(skip_all, fields(out = %out.display()))]
    pub fn render_with_cancel(
        &self,
        timeline: &Timeline,
        out: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<RenderReport> {
        let composition = self.plan(timeline)?;
        cancel.check()?;
        self.encoder.encode(&composition, out, cancel)?;
        Ok(RenderReport::new(&composition, out))
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("effects", &self.effects)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
