use crate::{
    assets::{probe::AssetProbe, source::MediaSource},
    compose::{
        gaps::{GAP_EPSILON, GapFiller},
        layer::{ClipRef, LayerKind, LayerSource, ResolvedLayer},
    },
    effects::{
        motion::{MotionContext, MotionEffect},
        registry::EffectRegistry,
    },
    foundation::{
        core::{Fps, FrameSize},
        error::{ReelError, ReelResult},
    },
    layout::resolver::{Layout, resolve_layout},
    render::opts::RenderOpts,
    timeline::model::{AssetKind, Clip, OutputSpec, Timeline},
};

/// Longest audio fade applied when fading is enabled.
pub const MAX_AUDIO_FADE_SECS: f64 = 0.5;

/// A clip that survived layout and effect processing, not yet placed in its stream.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedClip {
    pub origin: ClipRef,
    pub kind: LayerKind,
    pub length: f64,
    pub source: LayerSource,
}

/// A clip left out of the composition, with the reason.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SkippedClip {
    pub origin: ClipRef,
    pub source: String,
    pub reason: String,
}

/// Outcome of resolving one clip.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipResolution {
    Resolved(ResolvedClip),
    Skipped(SkippedClip),
}

/// Ordered video and audio sequences with one reconciled duration, ready for the encoder.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    pub size: FrameSize,
    pub fps: Fps,
    /// Contiguous video layers starting at 0. Never empty.
    pub video: Vec<ResolvedLayer>,
    /// Contiguous audio layers starting at 0, padded with silence to `duration`.
    /// Empty when the timeline has no audio.
    pub audio: Vec<ResolvedLayer>,
    /// Length of the output in seconds.
    pub duration: f64,
    /// End of the audio content before silence padding, if there is audio.
    pub audio_content: Option<f64>,
    pub sample_rate: u32,
    pub channel_layout: String,
    /// Fade in/out length for the mixed audio.
    pub audio_fade: Option<f64>,
    pub skipped: Vec<SkippedClip>,
}

impl Composition {
    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }

    /// End of the last video layer.
    pub fn video_end(&self) -> f64 {
        self.video.last().map_or(0.0, |l| l.span.end)
    }

    /// Time the last video frame must be held to reach `duration`.
    pub fn video_hold(&self) -> f64 {
        let hold = self.duration - self.video_end();
        if hold > GAP_EPSILON { hold } else { 0.0 }
    }

    /// Layers of both kinds.
    pub fn layers(&self) -> impl Iterator<Item = &ResolvedLayer> {
        self.video.iter().chain(self.audio.iter())
    }
}

/// Resolves clips and assembles them into a [`Composition`].
pub struct Compositor<'a> {
    probe: &'a dyn AssetProbe,
    effects: &'a EffectRegistry,
    opts: &'a RenderOpts,
}

impl<'a> Compositor<'a> {
    pub fn new(probe: &'a dyn AssetProbe, effects: &'a EffectRegistry, opts: &'a RenderOpts) -> Self {
        Self {
            probe,
            effects,
            opts,
        }
    }

    /// Resolve a single clip: locate its media, lay it out and build its motion.
    pub fn resolve_clip(&self, clip: &Clip, origin: ClipRef, output: OutputSpec) -> ClipResolution {
        let source = MediaSource::resolve(&clip.asset.source, &self.opts.assets_root);
        let skip = |reason: String| {
            ClipResolution::Skipped(SkippedClip {
                origin,
                source: source.to_string(),
                reason,
            })
        };

        if !self.probe.exists(&source) {
            return skip("asset not found".to_string());
        }

        match clip.asset.kind {
            AssetKind::Image => {
                let Some(length) = clip.length.filter(|l| l.is_finite() && *l > 0.0) else {
                    return skip("image clip needs a positive length".to_string());
                };
                let layer = match resolve_layout(&source, clip.offset, output, self.probe) {
                    Layout::Fitted(placement) => {
                        let effect = self.effects.resolve(clip.effect.as_deref());
                        let motion = effect.motion(&MotionContext {
                            length,
                            offset: clip.offset,
                            placement,
                            fps: self.opts.fps,
                        });
                        LayerSource::Image {
                            source: source.clone(),
                            placement,
                            motion,
                        }
                    }
                    Layout::Unscaled { position, output } => {
                        if let Some(effect) = &clip.effect {
                            tracing::debug!(%origin, effect = %effect, "effect dropped for unscaled overlay");
                        }
                        LayerSource::Overlay {
                            source: source.clone(),
                            position,
                            output,
                        }
                    }
                };
                ClipResolution::Resolved(ResolvedClip {
                    origin,
                    kind: LayerKind::Video,
                    length,
                    source: layer,
                })
            }
            AssetKind::Audio => {
                let length = match clip.length {
                    Some(l) => l,
                    None => match self.probe.duration_secs(&source) {
                        Ok(d) => d,
                        Err(err) => return skip(reason_of(err)),
                    },
                };
                if !length.is_finite() || length <= 0.0 {
                    return skip(format!("audio length must be > 0, got {length}"));
                }
                ClipResolution::Resolved(ResolvedClip {
                    origin,
                    kind: LayerKind::Audio,
                    length,
                    source: LayerSource::Audio {
                        source: source.clone(),
                        volume: clip.volume.unwrap_or(1.0),
                    },
                })
            }
        }
    }

    /// Build the composition for `timeline`.
    ///
    /// Each track's clips are visited in `start` order (ties keep document order) and fed to one
    /// gap filler per layer kind. The final duration is the video length, or the longer of video
    /// and audio when audio exists; a short video holds its last frame and short audio is padded
    /// with silence.
    pub fn compose(&self, timeline: &Timeline) -> ReelResult<Composition> {
        self.opts.validate()?;
        let size = timeline.output.size;

        let mut video = GapFiller::new(LayerKind::Video, LayerSource::VideoFiller { size });
        let mut audio = GapFiller::new(
            LayerKind::Audio,
            LayerSource::AudioFiller {
                sample_rate: self.opts.sample_rate,
                channel_layout: self.opts.channel_layout.clone(),
            },
        );
        let mut skipped = Vec::new();

        for (track_idx, track) in timeline.tracks.iter().enumerate() {
            let mut order: Vec<usize> = (0..track.clips.len()).collect();
            order.sort_by(|&a, &b| track.clips[a].start.total_cmp(&track.clips[b].start));

            for clip_idx in order {
                let clip = &track.clips[clip_idx];
                let origin = ClipRef {
                    track: track_idx,
                    clip: clip_idx,
                };
                match self.resolve_clip(clip, origin, timeline.output) {
                    ClipResolution::Resolved(resolved) => {
                        let stream = match resolved.kind {
                            LayerKind::Video => &mut video,
                            LayerKind::Audio => &mut audio,
                        };
                        stream.place(clip.start, resolved.length, resolved.source, origin)?;
                    }
                    ClipResolution::Skipped(skip) => {
                        if self.opts.strict_assets {
                            return Err(ReelError::asset(format!(
                                "{}: '{}': {}",
                                skip.origin, skip.source, skip.reason
                            )));
                        }
                        tracing::warn!(
                            origin = %skip.origin,
                            source = %skip.source,
                            reason = %skip.reason,
                            "skipping clip"
                        );
                        skipped.push(skip);
                    }
                }
            }
        }

        if !video.has_content() && !audio.has_content() {
            return Err(ReelError::empty_composition(format!(
                "no clip could be resolved ({} skipped)",
                skipped.len()
            )));
        }

        let video_end = video.cursor();
        let audio_content = audio.has_content().then(|| audio.cursor());
        let duration = audio_content.map_or(video_end, |a| a.max(video_end));

        if !video.has_content() {
            video.pad_to(duration)?;
        }
        if audio_content.is_some()
            && let Some(pad) = audio.pad_to(duration)?
        {
            tracing::debug!(silence = pad.duration(), "padding audio to video length");
        }

        let audio_fade = audio_content
            .filter(|_| self.opts.audio_fade)
            .map(|a| MAX_AUDIO_FADE_SECS.min(a / 10.0));

        let composition = Composition {
            size,
            fps: self.opts.fps,
            video: video.into_layers(),
            audio: audio.into_layers(),
            duration,
            audio_content,
            sample_rate: self.opts.sample_rate,
            channel_layout: self.opts.channel_layout.clone(),
            audio_fade,
            skipped,
        };
        tracing::info!(
            duration = composition.duration,
            video_layers = composition.video.len(),
            audio_layers = composition.audio.len(),
            skipped = composition.skipped.len(),
            "composed timeline"
        );
        Ok(composition)
    }
}

/// Compose `timeline` with the given collaborators.
pub fn compose(
    timeline: &Timeline,
    probe: &dyn AssetProbe,
    effects: &EffectRegistry,
    opts: &RenderOpts,
) -> ReelResult<Composition> {
    Compositor::new(probe, effects, opts).compose(timeline)
}

fn reason_of(err: ReelError) -> String {
    match err {
        ReelError::Asset(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
