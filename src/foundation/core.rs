use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Reference rate every layer of a render is normalized to.
    pub const PIPELINE: Fps = Fps { num: 25, den: 1 };

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Number of whole frames needed to cover `secs`, rounding up.
    ///
    /// Products within `1e-9` of an integer count as that integer, so `1.2s` at 25 fps is 30 frames.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let frames = secs * self.as_f64();
        let nearest = frames.round();
        let frames = if (frames - nearest).abs() < 1e-9 {
            nearest
        } else {
            frames.ceil()
        };
        frames.max(0.0) as u64
    }

    /// Frame index shown at local time `t` (seconds since the layer's own zero).
    pub fn frame_at(self, t: f64) -> u64 {
        self.secs_to_frames_floor(t)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::PIPELINE
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Pixel dimensions of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a validated, non-empty size.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation(format!(
                "frame size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// `width / height`.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Size as a kurbo size, for geometry helpers.
    pub fn to_kurbo(self) -> kurbo::Size {
        kurbo::Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Half-open time span `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
}

impl Span {
    /// Create a validated span with finite bounds and `start <= end`.
    pub fn new(start: f64, end: f64) -> ReelResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ReelError::validation("span bounds must be finite"));
        }
        if start > end {
            return Err(ReelError::validation("span start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Span starting at `start` lasting `duration` seconds.
    pub fn starting_at(start: f64, duration: f64) -> ReelResult<Self> {
        Self::new(start, start + duration)
    }

    /// Length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Return `true` when the span covers no time.
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Uniform-scale 2D transform: `scale` applied after moving `translate` to the origin.
///
/// For motion effects `translate` is the top-left corner of the visible window in the placed
/// frame's pixel space and `scale` is the magnification of that window.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Magnification factor (1.0 = unscaled).
    pub scale: f64,
    /// Window origin in source pixels.
    pub translate: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// No scaling, window at the origin.
    pub const IDENTITY: Transform2D = Transform2D {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    /// Affine mapping placed-frame coordinates into window coordinates.
    pub fn to_affine(self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(-self.translate)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
