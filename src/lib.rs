//! reelcast renders declarative image/audio timelines to MP4.
//!
//! A [`Timeline`] is composed into ordered, gap-filled video and audio layer sequences
//! ([`Composition`]), lowered to an ffmpeg filter graph and encoded by the system `ffmpeg`.
//! A [`Dispatcher`] runs independent render jobs on a fixed pool of worker threads.
#![forbid(unsafe_code)]

pub mod assets;
pub mod compose;
pub mod dispatch;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod layout;
pub mod render;
pub mod timeline;

pub use crate::assets::probe::{AssetProbe, MediaProbe, StaticProbe};
pub use crate::assets::source::MediaSource;
pub use crate::compose::compositor::{
    ClipResolution, Composition, Compositor, SkippedClip, compose,
};
pub use crate::compose::gaps::GapFiller;
pub use crate::compose::layer::{ClipRef, LayerKind, LayerSource, ResolvedLayer};
pub use crate::dispatch::dispatcher::{Dispatcher, DispatcherOpts, JobRunner};
pub use crate::dispatch::job::{JobId, JobInput, JobState, JobStatus, RenderJob};
pub use crate::effects::motion::{Effect, Motion, MotionContext, MotionEffect, MotionKind};
pub use crate::effects::registry::EffectRegistry;
pub use crate::encode::ffmpeg::{Encoder, FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::graph::{EncodeGraph, lower};
pub use crate::encode::settings::EncodeSettings;
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Affine, Fps, FrameSize, Point, Rect, Span, Transform2D, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::foundation::logging::{LoggingConfig, init_logging};
pub use crate::layout::resolver::{Layout, Placement, fit, resolve_layout};
pub use crate::render::opts::RenderOpts;
pub use crate::render::pipeline::{RenderPipeline, RenderReport};
pub use crate::timeline::model::{Asset, AssetKind, Clip, Offset, OutputSpec, Timeline, Track};
