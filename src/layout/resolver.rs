use crate::{
    assets::probe::AssetProbe,
    assets::source::MediaSource,
    foundation::core::{FrameSize, Point, Rect, Vec2},
    foundation::error::ReelError,
    timeline::model::{Offset, OutputSpec},
};

/// Aspect-preserving fit of an asset into the output frame.
///
/// The asset is scaled so that it covers the target on both axes, then padded symmetrically (black)
/// up to at least the target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Native size reported by the probe.
    pub native: FrameSize,
    /// Size after aspect-preserving scale.
    pub scaled: FrameSize,
    /// Size after padding; `>= output` on both axes.
    pub padded: FrameSize,
    /// Left/top margin added by padding.
    pub margin: (u32, u32),
    /// Output frame size the placement was computed for.
    pub output: FrameSize,
}

impl Placement {
    /// `true` when a pad step is required after scaling.
    pub fn needs_padding(&self) -> bool {
        self.padded != self.scaled
    }

    /// Region of the padded frame occupied by the scaled image.
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(
            Point::new(f64::from(self.margin.0), f64::from(self.margin.1)),
            self.scaled.to_kurbo(),
        )
    }

    /// Centered output-size window over the padded frame, used when no motion is applied.
    pub fn centered_window(&self) -> Rect {
        let x = f64::from(self.padded.width.saturating_sub(self.output.width)) / 2.0;
        let y = f64::from(self.padded.height.saturating_sub(self.output.height)) / 2.0;
        Rect::from_origin_size(Point::new(x, y), self.output.to_kurbo())
    }
}

/// Outcome of laying out one visual clip.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Layout {
    /// Native size was known.
    Fitted(Placement),
    /// Native size could not be probed: the source is drawn unscaled with its top-left at
    /// `position` on a black canvas of `output` size.
    Unscaled {
        position: Vec2,
        output: FrameSize,
    },
}

impl Layout {
    /// Frame size every layout resolves to once the layer leaves the effect stage.
    pub fn output(&self) -> FrameSize {
        match self {
            Self::Fitted(p) => p.output,
            Self::Unscaled { output, .. } => *output,
        }
    }
}

/// Compute the aspect-preserving fit of `native` into `output`.
///
/// Ratios are compared and scaled with integer cross-multiplication so equal-aspect inputs land
/// exactly on the target size. Never panics, whatever the sizes.
pub fn fit(native: FrameSize, output: FrameSize) -> Placement {
    // Zero-sized inputs are treated as one pixel wide/high.
    let (w, h) = (
        u64::from(native.width.max(1)),
        u64::from(native.height.max(1)),
    );
    let (tw, th) = (u64::from(output.width), u64::from(output.height));

    // inputRatio > targetRatio  <=>  w * th > tw * h
    let (sw, sh) = if w * th > tw * h {
        (th * w / h, th)
    } else {
        (tw, tw * h / w)
    };
    let scaled = FrameSize {
        width: clamp_u32(sw.max(1)),
        height: clamp_u32(sh.max(1)),
    };
    let padded = FrameSize {
        width: scaled.width.max(output.width),
        height: scaled.height.max(output.height),
    };
    let margin = (
        (padded.width - scaled.width) / 2,
        (padded.height - scaled.height) / 2,
    );

    Placement {
        native,
        scaled,
        padded,
        margin,
        output,
    }
}

/// Lay out an image source, probing its native size.
///
/// Probe failures do not fail here; the clip falls back to [`Layout::Unscaled`] at its declared
/// offset and the compositor decides whether the source is usable at all.
pub fn resolve_layout(
    source: &MediaSource,
    offset: Offset,
    output: OutputSpec,
    probe: &dyn AssetProbe,
) -> Layout {
    match probe.dimensions(source) {
        Ok(native) => Layout::Fitted(fit(native, output.size)),
        Err(err) => {
            let reason = match err {
                ReelError::Asset(msg) => msg,
                other => other.to_string(),
            };
            tracing::debug!(source = %source, %reason, "dimensions unavailable, placing unscaled");
            Layout::Unscaled {
                position: Vec2::new(
                    (offset.x * f64::from(output.size.width)).floor(),
                    (offset.y * f64::from(output.size.height)).floor(),
                ),
                output: output.size,
            }
        }
    }
}

fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
