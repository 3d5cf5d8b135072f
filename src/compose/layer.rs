use crate::{
    assets::source::MediaSource,
    effects::motion::Motion,
    foundation::core::{FrameSize, Span, Transform2D, Vec2},
    layout::resolver::Placement,
};

/// Stream a layer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    Video,
    Audio,
}

/// Position of a clip in the submitted timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ClipRef {
    pub track: usize,
    /// Index in the track as submitted (before sorting by start).
    pub clip: usize,
}

impl std::fmt::Display for ClipRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "track {} clip {}", self.track, self.clip)
    }
}

/// What a layer draws or plays.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerSource {
    /// Fitted image with its motion.
    Image {
        source: MediaSource,
        placement: Placement,
        motion: Motion,
    },
    /// Image of unknown size drawn unscaled on a black output-size canvas.
    Overlay {
        source: MediaSource,
        position: Vec2,
        output: FrameSize,
    },
    /// Audio clip, trimmed/padded to the layer span.
    Audio { source: MediaSource, volume: f64 },
    /// Solid black frames.
    VideoFiller { size: FrameSize },
    /// Digital silence.
    AudioFiller { sample_rate: u32, channel_layout: String },
}

impl LayerSource {
    /// `true` for synthesized gap content.
    pub fn is_filler(&self) -> bool {
        matches!(self, Self::VideoFiller { .. } | Self::AudioFiller { .. })
    }

    /// Input media, if the layer reads any.
    pub fn media(&self) -> Option<&MediaSource> {
        match self {
            Self::Image { source, .. } | Self::Overlay { source, .. } | Self::Audio { source, .. } => {
                Some(source)
            }
            Self::VideoFiller { .. } | Self::AudioFiller { .. } => None,
        }
    }
}

/// A clip or filler after layout and effect processing, positioned in its stream.
///
/// `span` is the layer's position in the concatenated stream; layers of one kind tile time
/// without gaps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedLayer {
    pub kind: LayerKind,
    pub span: Span,
    pub source: LayerSource,
    /// Clip this layer came from; `None` for fillers.
    pub origin: Option<ClipRef>,
}

impl ResolvedLayer {
    /// Length of the layer in seconds.
    pub fn duration(&self) -> f64 {
        self.span.duration()
    }

    /// Transform at local time `t` (seconds since the layer's own start).
    pub fn transform_at(&self, t: f64) -> Transform2D {
        match &self.source {
            LayerSource::Image { motion, .. } => motion.transform_at(t),
            _ => Transform2D::IDENTITY,
        }
    }
}
