use serde_json::json;

use super::*;
use crate::{
    assets::probe::StaticProbe,
    effects::motion::MotionKind,
    foundation::core::{Span, Vec2},
};

fn timeline(clips: serde_json::Value) -> Timeline {
    Timeline::from_value(json!({
        "output": { "size": { "width": 1280, "height": 720 } },
        "timeline": { "tracks": [ { "clips": clips } ] }
    }))
    .unwrap()
}

fn probe() -> StaticProbe {
    StaticProbe::new()
        .with_image("/media/wide.png", 1920, 1080)
        .with_image("/media/photo.jpg", 640, 480)
        .with_image("/media/pano.jpg", 2520, 1080)
        .with_opaque("/media/mystery.bin")
        .with_audio("/media/voice.mp3", 4.0)
        .with_audio("/media/song.mp3", 12.0)
}

fn compose_default(t: &Timeline) -> ReelResult<Composition> {
    compose(t, &probe(), &EffectRegistry::standard(), &RenderOpts::default())
}

fn assert_contiguous(layers: &[ResolvedLayer]) {
    assert_eq!(layers.first().map(|l| l.span.start), Some(0.0));
    for pair in layers.windows(2) {
        assert_eq!(pair[1].span.start, pair[0].span.end);
    }
}

#[test]
fn gap_is_filled_and_total_duration_is_seven() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 0, "length": 3 },
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 5, "length": 2 }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.duration, 7.0);
    assert_eq!(c.video.len(), 3);
    assert!(matches!(c.video[1].source, LayerSource::VideoFiller { .. }));
    assert_eq!(c.video[1].span, Span { start: 3.0, end: 5.0 });
    assert_contiguous(&c.video);
    assert!(!c.has_audio());
    assert_eq!(c.video_hold(), 0.0);
}

#[test]
fn short_audio_is_padded_with_silence() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 0, "length": 7 },
        { "asset": { "type": "audio", "src": "/media/voice.mp3" }, "start": 0 }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.duration, 7.0);
    assert_eq!(c.audio_content, Some(4.0));
    assert_eq!(c.audio.len(), 2);
    let silence = &c.audio[1];
    assert!(matches!(silence.source, LayerSource::AudioFiller { sample_rate: 44_100, .. }));
    assert_eq!(silence.duration(), 3.0);
    assert_contiguous(&c.audio);
}

#[test]
fn long_audio_extends_video_by_holding_last_frame() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 0, "length": 5 },
        { "asset": { "type": "audio", "src": "/media/song.mp3" }, "start": 1, "volume": 0.5 }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.duration, 13.0);
    assert_eq!(c.video_end(), 5.0);
    assert_eq!(c.video_hold(), 8.0);
    // leading silence, then the song
    assert_eq!(c.audio.len(), 2);
    assert!(matches!(
        c.audio[1].source,
        LayerSource::Audio { volume, .. } if volume == 0.5
    ));
}

#[test]
fn four_by_three_source_ends_up_output_sized() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/photo.jpg" }, "start": 0, "length": 5 }
    ]));
    let c = compose_default(&t).unwrap();
    let LayerSource::Image {
        placement, motion, ..
    } = &c.video[0].source
    else {
        panic!("expected a fitted image");
    };
    assert_eq!(placement.padded, FrameSize { width: 1280, height: 960 });
    assert_eq!(motion.frame_size(), FrameSize { width: 1280, height: 720 });
    assert_eq!(c.size, FrameSize { width: 1280, height: 720 });
}

#[test]
fn clips_are_sorted_by_start_before_gap_filling() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/pano.jpg" }, "start": 4, "length": 1,
          "effect": "slideLeftFast" },
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 0, "length": 2,
          "effect": "zoomIn", "offset": { "x": 0.5, "y": 0.5 } }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.duration, 5.0);
    let origins: Vec<_> = c.video.iter().map(|l| l.origin.map(|o| o.clip)).collect();
    assert_eq!(origins, vec![Some(1), None, Some(0)]);
    let LayerSource::Image { motion, .. } = &c.video[2].source else {
        panic!("expected image");
    };
    assert!(matches!(motion.kind, MotionKind::SlideLeft { .. }));
    assert!(c.video[0].transform_at(1.0).scale > 1.0);
}

#[test]
fn missing_assets_are_skipped_unless_strict() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/nope.png" }, "start": 0, "length": 2 },
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 2, "length": 2 }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.skipped.len(), 1);
    assert_eq!(c.skipped[0].origin, ClipRef { track: 0, clip: 0 });
    // the surviving clip still starts at its declared time
    assert_eq!(c.duration, 4.0);
    assert!(c.video[0].source.is_filler());

    let strict = RenderOpts {
        strict_assets: true,
        ..RenderOpts::default()
    };
    let err = compose(&t, &probe(), &EffectRegistry::standard(), &strict).unwrap_err();
    assert!(matches!(err, ReelError::Asset(_)));
    assert!(err.to_string().contains("track 0 clip 0"));
}

#[test]
fn unprobeable_image_is_overlaid_unscaled_at_offset() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/mystery.bin" }, "start": 0, "length": 1,
          "effect": "zoomIn", "offset": { "x": 0.25, "y": 0.5 } }
    ]));
    let c = compose_default(&t).unwrap();
    let LayerSource::Overlay { position, output, .. } = &c.video[0].source else {
        panic!("expected overlay");
    };
    assert_eq!(*position, Vec2::new(320.0, 360.0));
    assert_eq!(*output, FrameSize { width: 1280, height: 720 });
    assert_eq!(c.video[0].transform_at(0.5), crate::foundation::core::Transform2D::IDENTITY);
}

#[test]
fn audio_only_timeline_gets_black_video() {
    let t = timeline(json!([
        { "asset": { "type": "audio", "src": "/media/voice.mp3" }, "start": 0 }
    ]));
    let c = compose_default(&t).unwrap();
    assert_eq!(c.duration, 4.0);
    assert_eq!(c.video.len(), 1);
    assert!(matches!(c.video[0].source, LayerSource::VideoFiller { .. }));
    assert_eq!(c.video[0].duration(), 4.0);
}

#[test]
fn nothing_resolvable_is_an_empty_composition() {
    let t = timeline(json!([]));
    assert!(matches!(compose_default(&t), Err(ReelError::EmptyComposition(_))));

    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/gone.png" }, "start": 0, "length": 2 }
    ]));
    assert!(matches!(compose_default(&t), Err(ReelError::EmptyComposition(_))));
}

#[test]
fn audio_fade_is_bounded() {
    let t = timeline(json!([
        { "asset": { "type": "audio", "src": "/media/voice.mp3" }, "start": 0 },
        { "asset": { "type": "audio", "src": "/media/song.mp3" }, "start": 4 }
    ]));
    let opts = RenderOpts {
        audio_fade: true,
        ..RenderOpts::default()
    };
    let c = compose(&t, &probe(), &EffectRegistry::standard(), &opts).unwrap();
    assert_eq!(c.audio_fade, Some(0.5));

    let short = timeline(json!([
        { "asset": { "type": "audio", "src": "/media/voice.mp3" }, "start": 0 }
    ]));
    let c = compose(&short, &probe(), &EffectRegistry::standard(), &opts).unwrap();
    assert_eq!(c.audio_fade, Some(0.4));
    assert_eq!(compose_default(&short).unwrap().audio_fade, None);
}

#[test]
fn duration_is_stable_across_reruns() {
    let t = timeline(json!([
        { "asset": { "type": "image", "src": "/media/wide.png" }, "start": 0.3, "length": 1.7 },
        { "asset": { "type": "image", "src": "/media/photo.jpg" }, "start": 2.9, "length": 0.4 },
        { "asset": { "type": "audio", "src": "/media/voice.mp3" }, "start": 0.1 }
    ]));
    let first = compose_default(&t).unwrap();
    for _ in 0..5 {
        assert_eq!(compose_default(&t).unwrap(), first);
    }
}
