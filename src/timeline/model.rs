use std::io::Read;

use crate::{
    foundation::core::FrameSize,
    foundation::error::{ReelError, ReelResult},
    timeline::document::{ClipDoc, OffsetDoc, TimelineDocument},
};

/// Media type of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Still image; becomes a video layer.
    Image,
    /// Audio file; becomes an audio layer.
    Audio,
}

/// Source media referenced by a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Asset {
    /// Image or audio.
    pub kind: AssetKind,
    /// Path (relative paths resolve against the render's assets root) or URI.
    pub source: String,
}

/// Fractional position inside the output frame, both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// A placed asset instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    pub asset: Asset,
    /// Declared timeline start in seconds.
    pub start: f64,
    /// Length in seconds. Always set for images; `None` means "the whole audio source".
    pub length: Option<f64>,
    /// Effect name, resolved by [`crate::EffectRegistry`].
    pub effect: Option<String>,
    pub offset: Offset,
    /// Audio gain; `None` is unity.
    pub volume: Option<f64>,
}

impl Clip {
    /// Declared end on the timeline, if the length is known.
    pub fn end(&self) -> Option<f64> {
        self.length.map(|l| self.start + l)
    }
}

/// Clips sharing one compositing layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub clips: Vec<Clip>,
}

/// Target output description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSpec {
    /// Every video layer is resolved to exactly this size.
    pub size: FrameSize,
}

/// Root of a parsed, validated timeline. Read-only once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Tracks in compositing order (later tracks on top).
    pub tracks: Vec<Track>,
    pub output: OutputSpec,
}

impl Timeline {
    /// Parse and validate a JSON timeline document.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let doc: TimelineDocument = serde_json::from_str(s)?;
        Self::from_document(doc)
    }

    /// Parse and validate a JSON timeline document from a reader.
    pub fn from_reader(r: impl Read) -> ReelResult<Self> {
        let doc: TimelineDocument = serde_json::from_reader(r)?;
        Self::from_document(doc)
    }

    /// Parse and validate an already-decoded JSON value.
    pub fn from_value(v: serde_json::Value) -> ReelResult<Self> {
        let doc: TimelineDocument = serde_json::from_value(v)?;
        Self::from_document(doc)
    }

    /// Validate a wire document and convert it into the model.
    pub fn from_document(doc: TimelineDocument) -> ReelResult<Self> {
        let size = doc.output.size;
        if size.width <= 0 || size.height <= 0 {
            return Err(ReelError::parse(format!(
                "output size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        let (Ok(width), Ok(height)) = (u32::try_from(size.width), u32::try_from(size.height))
        else {
            return Err(ReelError::parse("output size does not fit in u32"));
        };
        let output = OutputSpec {
            size: FrameSize { width, height },
        };

        let mut tracks = Vec::with_capacity(doc.timeline.tracks.len());
        for (track_idx, track) in doc.timeline.tracks.into_iter().enumerate() {
            let mut clips = Vec::with_capacity(track.clips.len());
            for (clip_idx, clip) in track.clips.into_iter().enumerate() {
                let clip = clip_from_doc(clip).map_err(|e| match e {
                    ReelError::Parse(msg) => {
                        ReelError::parse(format!("track {track_idx} clip {clip_idx}: {msg}"))
                    }
                    other => other,
                })?;
                clips.push(clip);
            }
            tracks.push(Track { clips });
        }

        Ok(Self { tracks, output })
    }

    /// Total number of clips across tracks.
    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }
}

fn clip_from_doc(doc: ClipDoc) -> ReelResult<Clip> {
    let kind = match doc.asset.kind.as_str() {
        "image" => AssetKind::Image,
        "audio" => AssetKind::Audio,
        other => {
            return Err(ReelError::parse(format!("unsupported asset type '{other}'")));
        }
    };
    if doc.asset.src.trim().is_empty() {
        return Err(ReelError::parse("asset src must be non-empty"));
    }
    if !doc.start.is_finite() || doc.start < 0.0 {
        return Err(ReelError::parse(format!(
            "start must be a non-negative number, got {}",
            doc.start
        )));
    }

    match (kind, doc.length) {
        (_, Some(l)) if !l.is_finite() || l <= 0.0 => {
            return Err(ReelError::parse(format!("length must be > 0, got {l}")));
        }
        (AssetKind::Image, None) => {
            return Err(ReelError::parse("image clips require a length"));
        }
        _ => {}
    }

    let offset = match doc.offset.or(doc.asset.offset) {
        Some(o) => offset_from_doc(o)?,
        None => Offset::default(),
    };

    let volume = doc.volume.or(doc.asset.volume);
    if let Some(v) = volume
        && (!v.is_finite() || v < 0.0)
    {
        return Err(ReelError::parse(format!("volume must be >= 0, got {v}")));
    }

    let effect = doc
        .effect
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    Ok(Clip {
        asset: Asset {
            kind,
            source: doc.asset.src,
        },
        start: doc.start,
        length: doc.length,
        effect,
        offset,
        volume,
    })
}

fn offset_from_doc(o: OffsetDoc) -> ReelResult<Offset> {
    let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    if !in_unit(o.x) || !in_unit(o.y) {
        return Err(ReelError::parse(format!(
            "offset must lie in [0,1]x[0,1], got ({}, {})",
            o.x, o.y
        )));
    }
    Ok(Offset { x: o.x, y: o.y })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
