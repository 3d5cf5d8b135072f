use std::collections::HashMap;
use std::process::Command;

use crate::{
    assets::source::MediaSource,
    foundation::core::FrameSize,
    foundation::error::{ReelError, ReelResult},
};

/// Read-only media inspection used while resolving clips.
///
/// Every failure is reported as [`ReelError::Asset`] so the compositor can skip the clip.
pub trait AssetProbe: Send + Sync {
    /// `true` when the source can be opened at all.
    fn exists(&self, source: &MediaSource) -> bool;
    /// Native frame size of an image source.
    fn dimensions(&self, source: &MediaSource) -> ReelResult<FrameSize>;
    /// Playable duration of an audio source, in seconds.
    fn duration_secs(&self, source: &MediaSource) -> ReelResult<f64>;
}

/// Probe backed by the `image` crate (header-only reads) and the system `ffprobe`.
#[derive(Clone, Debug)]
pub struct MediaProbe {
    ffprobe_bin: String,
}

impl Default for MediaProbe {
    fn default() -> Self {
        Self {
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl MediaProbe {
    /// Use a specific `ffprobe` executable.
    pub fn with_ffprobe(bin: impl Into<String>) -> Self {
        Self {
            ffprobe_bin: bin.into(),
        }
    }

    fn ffprobe(&self, source: &MediaSource) -> ReelResult<ProbeOut> {
        let out = Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(source.to_arg())
            .output()
            .map_err(|e| ReelError::asset(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(ReelError::asset(format!(
                "ffprobe failed for '{source}': {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        serde_json::from_slice(&out.stdout)
            .map_err(|e| ReelError::asset(format!("ffprobe json parse failed: {e}")))
    }
}

impl AssetProbe for MediaProbe {
    fn exists(&self, source: &MediaSource) -> bool {
        match source {
            MediaSource::Path(p) => p.is_file(),
            MediaSource::Uri(_) => true,
        }
    }

    fn dimensions(&self, source: &MediaSource) -> ReelResult<FrameSize> {
        if let Some(path) = source.as_path() {
            match image::image_dimensions(path) {
                Ok((w, h)) => return FrameSize::new(w, h).map_err(|e| ReelError::asset(e.to_string())),
                Err(e) => {
                    tracing::debug!(source = %source, error = %e, "image header read failed, trying ffprobe");
                }
            }
        }

        let parsed = self.ffprobe(source)?;
        let stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| ReelError::asset(format!("no video stream found in '{source}'")))?;
        match (stream.width, stream.height) {
            (Some(w), Some(h)) => FrameSize::new(w, h).map_err(|e| ReelError::asset(e.to_string())),
            _ => Err(ReelError::asset(format!(
                "ffprobe reported no dimensions for '{source}'"
            ))),
        }
    }

    fn duration_secs(&self, source: &MediaSource) -> ReelResult<f64> {
        let parsed = self.ffprobe(source)?;
        let from_format = parsed.format.as_ref().and_then(|f| f.duration.as_deref());
        let from_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"))
            .and_then(|s| s.duration.as_deref());
        let secs = from_format
            .or(from_stream)
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| ReelError::asset(format!("could not determine duration of '{source}'")))?;
        Ok(secs)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct StaticEntry {
    size: Option<FrameSize>,
    duration: Option<f64>,
}

/// In-memory probe keyed by the resolved source's display string.
///
/// Sources that were never registered do not exist.
#[derive(Clone, Debug, Default)]
pub struct StaticProbe {
    entries: HashMap<String, StaticEntry>,
}

impl StaticProbe {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image with known native size.
    pub fn with_image(mut self, source: impl Into<String>, width: u32, height: u32) -> Self {
        self.entries.insert(
            source.into(),
            StaticEntry {
                size: Some(FrameSize { width, height }),
                duration: None,
            },
        );
        self
    }

    /// Register an audio file with known duration.
    pub fn with_audio(mut self, source: impl Into<String>, duration_secs: f64) -> Self {
        self.entries.insert(
            source.into(),
            StaticEntry {
                size: None,
                duration: Some(duration_secs),
            },
        );
        self
    }

    /// Register a source that exists but cannot be probed.
    pub fn with_opaque(mut self, source: impl Into<String>) -> Self {
        self.entries.insert(source.into(), StaticEntry::default());
        self
    }

    fn entry(&self, source: &MediaSource) -> ReelResult<StaticEntry> {
        self.entries
            .get(&source.to_string())
            .copied()
            .ok_or_else(|| ReelError::asset(format!("no such asset '{source}'")))
    }
}

impl AssetProbe for StaticProbe {
    fn exists(&self, source: &MediaSource) -> bool {
        self.entries.contains_key(&source.to_string())
    }

    fn dimensions(&self, source: &MediaSource) -> ReelResult<FrameSize> {
        let size = self
            .entry(source)?
            .size
            .ok_or_else(|| ReelError::asset(format!("cannot probe dimensions of '{source}'")))?;
        FrameSize::new(size.width, size.height)
            .map_err(|e| ReelError::asset(format!("'{source}': {e}")))
    }

    fn duration_secs(&self, source: &MediaSource) -> ReelResult<f64> {
        self.entry(source)?
            .duration
            .ok_or_else(|| ReelError::asset(format!("cannot probe duration of '{source}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/probe.rs"]
mod tests;
