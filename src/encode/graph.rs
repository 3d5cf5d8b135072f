use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::Path;

use crate::{
    assets::source::MediaSource,
    compose::{
        compositor::Composition,
        layer::{LayerSource, ResolvedLayer},
    },
    effects::motion::{Motion, MotionKind, ZoomDirection},
    encode::settings::EncodeSettings,
    foundation::{
        core::{Fps, FrameSize},
        error::{ReelError, ReelResult},
    },
    layout::resolver::Placement,
};

/// Label of the finished video stream in the filter graph.
pub const VIDEO_OUT: &str = "vout";
/// Label of the finished audio stream in the filter graph.
pub const AUDIO_OUT: &str = "aout";

/// A composition lowered to ffmpeg inputs and a `-filter_complex` graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeGraph {
    /// One `-i` per media-reading layer, in layer order.
    pub inputs: Vec<MediaSource>,
    pub filter_complex: String,
    pub has_audio: bool,
    pub size: FrameSize,
    pub fps: Fps,
    pub duration: f64,
}

impl EncodeGraph {
    /// Full ffmpeg argument list writing to `out`.
    pub fn args(&self, settings: &EncodeSettings, out: &Path) -> Vec<OsString> {
        let overwrite = if settings.overwrite { "-y" } else { "-n" };
        let mut args: Vec<OsString> = [overwrite, "-hide_banner", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();

        for input in &self.inputs {
            args.push("-i".into());
            args.push(input.to_arg());
        }

        let size = self.size.to_string();
        let fps = self.fps.to_string();
        let duration = num(self.duration);
        let video_map = format!("[{VIDEO_OUT}]");
        let audio_map = format!("[{AUDIO_OUT}]");

        let mut tail: Vec<&str> = vec!["-filter_complex", self.filter_complex.as_str()];
        tail.extend(["-map", video_map.as_str()]);
        if self.has_audio {
            tail.extend(["-map", audio_map.as_str()]);
        }
        tail.extend([
            "-c:v",
            settings.video_codec.as_str(),
            "-pix_fmt",
            settings.pixel_format.as_str(),
            "-s",
            size.as_str(),
            "-r",
            fps.as_str(),
        ]);
        if self.has_audio {
            tail.extend(["-c:a", settings.audio_codec.as_str()]);
        } else {
            tail.push("-an");
        }
        tail.extend(["-t", duration.as_str()]);
        if settings.container == "mp4" {
            tail.extend(["-movflags", "+faststart"]);
        }
        tail.extend(["-f", settings.container.as_str()]);

        args.extend(tail.into_iter().map(OsString::from));
        args.push(out.as_os_str().to_os_string());
        args
    }
}

/// Lower `composition` into an [`EncodeGraph`].
///
/// Every video layer is normalized to the output size, square pixels, yuv420p and the pipeline
/// frame rate so the concat filter sees identical streams. Image motion runs before the trim to
/// the clip length.
pub fn lower(composition: &Composition) -> ReelResult<EncodeGraph> {
    if composition.video.is_empty() {
        return Err(ReelError::validation("composition has no video layers"));
    }
    if !composition.duration.is_finite() || composition.duration <= 0.0 {
        return Err(ReelError::validation(format!(
            "composition duration must be > 0, got {}",
            composition.duration
        )));
    }

    let mut g = GraphBuilder {
        composition,
        inputs: Vec::new(),
        chains: Vec::new(),
    };

    let mut video_labels = Vec::with_capacity(composition.video.len());
    for (i, layer) in composition.video.iter().enumerate() {
        let label = format!("v{i}");
        g.video_chain(layer, &label)?;
        video_labels.push(label);
    }
    let mut audio_labels = Vec::with_capacity(composition.audio.len());
    for (i, layer) in composition.audio.iter().enumerate() {
        let label = format!("a{i}");
        g.audio_chain(layer, &label)?;
        audio_labels.push(label);
    }

    let hold = composition.video_hold();
    let video_tail = if hold > 0.0 {
        format!("tpad=stop_mode=clone:stop_duration={}", num(hold))
    } else {
        "null".to_string()
    };
    g.chains.push(format!(
        "{}concat=n={}:v=1:a=0,{video_tail}[{VIDEO_OUT}]",
        refs(&video_labels),
        video_labels.len()
    ));

    if !audio_labels.is_empty() {
        let audio_tail = match (composition.audio_fade, composition.audio_content) {
            (Some(fade), Some(content)) if fade > 0.0 => format!(
                "afade=t=in:st=0:d={f},afade=t=out:st={st}:d={f}",
                f = num(fade),
                st = num((content - fade).max(0.0)),
            ),
            _ => "anull".to_string(),
        };
        g.chains.push(format!(
            "{}concat=n={}:v=0:a=1,{audio_tail}[{AUDIO_OUT}]",
            refs(&audio_labels),
            audio_labels.len()
        ));
    }

    Ok(EncodeGraph {
        inputs: g.inputs,
        filter_complex: g.chains.join(";"),
        has_audio: !audio_labels.is_empty(),
        size: composition.size,
        fps: composition.fps,
        duration: composition.duration,
    })
}

struct GraphBuilder<'a> {
    composition: &'a Composition,
    inputs: Vec<MediaSource>,
    chains: Vec<String>,
}

impl GraphBuilder<'_> {
    fn input(&mut self, source: &MediaSource) -> usize {
        self.inputs.push(source.clone());
        self.inputs.len() - 1
    }

    fn normalize(&self, length: f64) -> String {
        let FrameSize { width, height } = self.composition.size;
        format!(
            "trim=duration={},setpts=PTS-STARTPTS,scale={width}:{height},setsar=1,fps={}:round=up,format=yuv420p",
            num(length),
            self.composition.fps
        )
    }

    fn video_chain(&mut self, layer: &ResolvedLayer, label: &str) -> ReelResult<()> {
        let length = layer.duration();
        let fps = self.composition.fps;
        let chain = match &layer.source {
            LayerSource::Image {
                source,
                placement,
                motion,
            } => {
                let idx = self.input(source);
                format!(
                    "[{idx}:v]{},{},{}[{label}]",
                    place(placement),
                    effect(motion, length, fps),
                    self.normalize(length)
                )
            }
            LayerSource::Overlay {
                source,
                position,
                output,
            } => {
                let idx = self.input(source);
                self.chains.push(format!(
                    "color=c=black:s={output}:r={fps}:d={}[{label}bg]",
                    num(length)
                ));
                format!(
                    "[{label}bg][{idx}:v]overlay=x={}:y={}:eof_action=repeat,{}[{label}]",
                    num(position.x),
                    num(position.y),
                    self.normalize(length)
                )
            }
            LayerSource::VideoFiller { size } => format!(
                "color=c=black:s={size}:r={fps}:d={},setsar=1,format=yuv420p[{label}]",
                num(length)
            ),
            LayerSource::Audio { .. } | LayerSource::AudioFiller { .. } => {
                return Err(ReelError::validation(format!(
                    "audio layer in video stream at {}",
                    num(layer.span.start)
                )));
            }
        };
        self.chains.push(chain);
        Ok(())
    }

    fn audio_chain(&mut self, layer: &ResolvedLayer, label: &str) -> ReelResult<()> {
        let length = num(layer.duration());
        let format = format!(
            "aformat=sample_fmts=fltp:sample_rates={}:channel_layouts={}",
            self.composition.sample_rate, self.composition.channel_layout
        );
        let chain = match &layer.source {
            LayerSource::Audio { source, volume } => {
                let idx = self.input(source);
                let mut chain = format!(
                    "[{idx}:a]atrim=duration={length},asetpts=PTS-STARTPTS,apad=whole_dur={length}"
                );
                if (*volume - 1.0).abs() > f64::EPSILON {
                    let _ = write!(chain, ",volume={}", num(*volume));
                }
                format!("{chain},{format}[{label}]")
            }
            LayerSource::AudioFiller {
                sample_rate,
                channel_layout,
            } => format!(
                "anullsrc=r={sample_rate}:cl={channel_layout},atrim=duration={length},asetpts=PTS-STARTPTS,{format}[{label}]"
            ),
            LayerSource::Image { .. }
            | LayerSource::Overlay { .. }
            | LayerSource::VideoFiller { .. } => {
                return Err(ReelError::validation(format!(
                    "video layer in audio stream at {}",
                    num(layer.span.start)
                )));
            }
        };
        self.chains.push(chain);
        Ok(())
    }
}

fn place(p: &Placement) -> String {
    let mut s = format!("scale={}:{}", p.scaled.width, p.scaled.height);
    if p.needs_padding() {
        let _ = write!(
            s,
            ",pad={}:{}:{}:{}:color=black",
            p.padded.width, p.padded.height, p.margin.0, p.margin.1
        );
    }
    s.push_str(",format=yuv420p,setsar=1");
    s
}

fn effect(motion: &Motion, length: f64, fps: Fps) -> String {
    let out = motion.output;
    let hold = format!("fps={fps},tpad=stop_mode=clone:stop_duration={}", num(length));
    match motion.kind {
        MotionKind::Hold => {
            let t = motion.transform_at_frame(0);
            format!(
                "{hold},crop={}:{}:{}:{},setpts=PTS-STARTPTS",
                out.width,
                out.height,
                num(t.translate.x),
                num(t.translate.y)
            )
        }
        MotionKind::Zoom {
            base,
            rate,
            direction,
            anchor,
        } => {
            let op = match direction {
                ZoomDirection::In => '*',
                ZoomDirection::Out => '/',
            };
            format!(
                "zoompan=z={}{op}{}^on:x={}:y={}:d={}:s={out}:fps={fps},setpts=PTS-STARTPTS",
                num(base),
                num(rate),
                num(anchor.x),
                num(anchor.y),
                motion.frames
            )
        }
        MotionKind::SlideLeft {
            px_per_frame,
            max_x,
        } => format!(
            "{hold},crop={}:{}:min({}\\,n*{}):0,setpts=PTS-STARTPTS",
            out.width,
            out.height,
            num(max_x),
            num(px_per_frame)
        ),
    }
}

fn refs(labels: &[String]) -> String {
    labels.iter().map(|l| format!("[{l}]")).collect()
}

/// Format a number for filter arguments: fixed precision, no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/graph.rs"]
mod tests;
