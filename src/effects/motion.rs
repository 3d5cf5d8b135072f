use crate::{
    foundation::core::{Fps, FrameSize, Point, Rect, Transform2D, Vec2},
    layout::resolver::Placement,
    timeline::model::Offset,
};

/// Zoom factors are clamped into this range, matching ffmpeg's `zoompan`.
pub const ZOOM_MIN: f64 = 1.0;
/// Upper zoom clamp.
pub const ZOOM_MAX: f64 = 10.0;

/// Everything an effect needs to build its motion for one clip.
#[derive(Clone, Copy, Debug)]
pub struct MotionContext {
    /// Clip length in seconds.
    pub length: f64,
    /// Declared anchor.
    pub offset: Offset,
    /// Fit of the source into the output frame.
    pub placement: Placement,
    /// Pipeline frame rate.
    pub fps: Fps,
}

impl MotionContext {
    /// Number of frames needed to cover the clip at the pipeline rate (at least one).
    ///
    /// A partial last frame counts, so the frames span at least `length` seconds.
    pub fn frames(&self) -> u64 {
        self.fps.secs_to_frames_ceil(self.length).max(1)
    }
}

/// Direction of a zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ZoomDirection {
    /// `base * rate^n`
    In,
    /// `base / rate^n`
    Out,
}

/// Time-parameterized motion of one clip, sampled in the clip's local time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MotionKind {
    /// Output-size window held at the center of the placed frame.
    Hold,
    /// Geometric zoom anchored near `anchor`; the zoomed window is stretched to the output size.
    Zoom {
        base: f64,
        rate: f64,
        direction: ZoomDirection,
        anchor: Vec2,
    },
    /// Output-size crop window moving right across the placed frame at a constant pixel rate.
    SlideLeft { px_per_frame: f64, max_x: f64 },
}

/// Motion produced by an effect for one clip.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Motion {
    pub kind: MotionKind,
    /// Frames covered, `>= 1`.
    pub frames: u64,
    pub fps: Fps,
    /// Placed (scaled + padded) frame the window moves over.
    pub source: FrameSize,
    /// Output frame the window is mapped onto.
    pub output: FrameSize,
}

impl Motion {
    /// Local frame index for local time `t`, clamped into the clip.
    pub fn frame_index(&self, t: f64) -> u64 {
        if !t.is_finite() || t <= 0.0 {
            return 0;
        }
        self.fps.frame_at(t).min(self.frames - 1)
    }

    /// Zoom factor at local frame `n`.
    pub fn zoom_at_frame(&self, n: u64) -> f64 {
        match self.kind {
            MotionKind::Zoom {
                base,
                rate,
                direction,
                ..
            } => {
                let growth = rate.powf(n as f64);
                let z = match direction {
                    ZoomDirection::In => base * growth,
                    ZoomDirection::Out => base / growth,
                };
                z.clamp(ZOOM_MIN, ZOOM_MAX)
            }
            MotionKind::Hold | MotionKind::SlideLeft { .. } => 1.0,
        }
    }

    /// Transform at local time `t`.
    pub fn transform_at(&self, t: f64) -> Transform2D {
        self.transform_at_frame(self.frame_index(t))
    }

    /// Transform at local frame `n`.
    pub fn transform_at_frame(&self, n: u64) -> Transform2D {
        let (sw, sh) = (f64::from(self.source.width), f64::from(self.source.height));
        let (ow, oh) = (f64::from(self.output.width), f64::from(self.output.height));
        match self.kind {
            MotionKind::Hold => Transform2D {
                scale: 1.0,
                translate: Vec2::new(((sw - ow) / 2.0).max(0.0), ((sh - oh) / 2.0).max(0.0)),
            },
            MotionKind::Zoom { anchor, .. } => {
                let z = self.zoom_at_frame(n);
                let max_x = (sw - sw / z).max(0.0);
                let max_y = (sh - sh / z).max(0.0);
                Transform2D {
                    scale: z,
                    translate: Vec2::new(anchor.x.clamp(0.0, max_x), anchor.y.clamp(0.0, max_y)),
                }
            }
            MotionKind::SlideLeft {
                px_per_frame,
                max_x,
            } => Transform2D {
                scale: 1.0,
                translate: Vec2::new((n as f64 * px_per_frame).min(max_x).max(0.0), 0.0),
            },
        }
    }

    /// Visible window of the placed frame at local time `t`.
    pub fn window_at(&self, t: f64) -> Rect {
        let tr = self.transform_at(t);
        let size = match self.kind {
            MotionKind::Zoom { .. } => kurbo::Size::new(
                f64::from(self.source.width) / tr.scale,
                f64::from(self.source.height) / tr.scale,
            ),
            MotionKind::Hold | MotionKind::SlideLeft { .. } => self.output.to_kurbo(),
        };
        Rect::from_origin_size(Point::new(tr.translate.x, tr.translate.y), size)
    }

    /// Size of every emitted frame. Always the output size.
    pub fn frame_size(&self) -> FrameSize {
        self.output
    }
}

/// Capability shared by every effect variant.
pub trait MotionEffect {
    /// Build the motion for one clip.
    fn motion(&self, ctx: &MotionContext) -> Motion;
}

fn motion(kind: MotionKind, ctx: &MotionContext) -> Motion {
    Motion {
        kind,
        frames: ctx.frames(),
        fps: ctx.fps,
        source: ctx.placement.padded,
        output: ctx.placement.output,
    }
}

/// Static hold for the whole clip length.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hold;

impl MotionEffect for Hold {
    fn motion(&self, ctx: &MotionContext) -> Motion {
        motion(MotionKind::Hold, ctx)
    }
}

/// Per-frame geometric zoom.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Zoom {
    pub base: f64,
    pub rate: f64,
    pub direction: ZoomDirection,
}

impl MotionEffect for Zoom {
    fn motion(&self, ctx: &MotionContext) -> Motion {
        let out = ctx.placement.output;
        let anchor = Vec2::new(
            ctx.offset.x * f64::from(out.width.saturating_sub(1)),
            ctx.offset.y * f64::from(out.height.saturating_sub(1)),
        );
        motion(
            MotionKind::Zoom {
                base: self.base,
                rate: self.rate,
                direction: self.direction,
                anchor,
            },
            ctx,
        )
    }
}

/// Constant-rate horizontal slide. `speed` scales the full-travel rate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlideLeft {
    pub speed: f64,
}

impl MotionEffect for SlideLeft {
    fn motion(&self, ctx: &MotionContext) -> Motion {
        let travel = f64::from(
            ctx.placement
                .padded
                .width
                .saturating_sub(ctx.placement.output.width),
        );
        let px_per_frame = travel / ctx.frames() as f64 * self.speed;
        motion(
            MotionKind::SlideLeft {
                px_per_frame,
                max_x: travel,
            },
            ctx,
        )
    }
}

/// Closed set of supported effects.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Effect {
    Hold(Hold),
    Zoom(Zoom),
    SlideLeft(SlideLeft),
}

impl Default for Effect {
    fn default() -> Self {
        Self::Hold(Hold)
    }
}

impl MotionEffect for Effect {
    fn motion(&self, ctx: &MotionContext) -> Motion {
        match self {
            Self::Hold(e) => e.motion(ctx),
            Self::Zoom(e) => e.motion(ctx),
            Self::SlideLeft(e) => e.motion(ctx),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion.rs"]
mod tests;
