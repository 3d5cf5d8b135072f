//! Wire shape of a submitted timeline document.
//!
//! These structs mirror the JSON exactly and carry no invariants; [`crate::Timeline`] is built from
//! them by `Timeline::from_document`, which is where validation happens.

/// Root of a timeline document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimelineDocument {
    /// Output frame description.
    pub output: OutputDoc,
    /// Track list.
    pub timeline: TracksDoc,
}

/// `output` object.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OutputDoc {
    /// Target frame size.
    pub size: SizeDoc,
}

/// `output.size` object.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SizeDoc {
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
}

/// `timeline` object.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TracksDoc {
    /// Tracks in compositing order.
    #[serde(default)]
    pub tracks: Vec<TrackDoc>,
}

/// One track.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrackDoc {
    /// Clips in document order (not necessarily sorted by start).
    #[serde(default)]
    pub clips: Vec<ClipDoc>,
}

/// One clip.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipDoc {
    /// Referenced asset.
    pub asset: AssetDoc,
    /// Timeline start in seconds.
    pub start: f64,
    /// Length in seconds; optional for audio clips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Effect name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Fractional anchor inside the output frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<OffsetDoc>,
    /// Audio gain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// `asset` object. Older documents carry `offset`/`volume` here instead of on the clip.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AssetDoc {
    /// `"image"` or `"audio"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Path or URI of the source media.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<OffsetDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// `offset` object.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct OffsetDoc {
    pub x: f64,
    pub y: f64,
}
