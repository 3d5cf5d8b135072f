use super::*;

fn doc(clips: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "output": { "size": { "width": 1280, "height": 720 } },
        "timeline": { "tracks": [ { "clips": clips } ] }
    })
}

#[test]
fn parses_image_and_audio_clips() {
    let v = doc(serde_json::json!([
        {
            "asset": { "type": "image", "src": "a.png" },
            "start": 0, "length": 5, "effect": "zoomIn",
            "offset": { "x": 0.25, "y": 0.75 }
        },
        {
            "asset": { "type": "audio", "src": "music.mp3" },
            "start": 1.5, "volume": 0.5
        }
    ]));
    let tl = Timeline::from_value(v).unwrap();
    assert_eq!(tl.output.size, FrameSize { width: 1280, height: 720 });
    assert_eq!(tl.clip_count(), 2);

    let img = &tl.tracks[0].clips[0];
    assert_eq!(img.asset.kind, AssetKind::Image);
    assert_eq!(img.end(), Some(5.0));
    assert_eq!(img.effect.as_deref(), Some("zoomIn"));
    assert_eq!(img.offset, Offset { x: 0.25, y: 0.75 });

    let audio = &tl.tracks[0].clips[1];
    assert_eq!(audio.asset.kind, AssetKind::Audio);
    assert_eq!(audio.length, None);
    assert_eq!(audio.volume, Some(0.5));
}

#[test]
fn offset_defaults_to_origin_and_falls_back_to_asset_level() {
    let v = doc(serde_json::json!([
        { "asset": { "type": "image", "src": "a.png" }, "start": 0, "length": 1 },
        {
            "asset": { "type": "image", "src": "b.png", "offset": { "x": 0.5, "y": 0.5 } },
            "start": 1, "length": 1
        }
    ]));
    let tl = Timeline::from_value(v).unwrap();
    assert_eq!(tl.tracks[0].clips[0].offset, Offset::default());
    assert_eq!(tl.tracks[0].clips[1].offset, Offset { x: 0.5, y: 0.5 });
}

#[test]
fn blank_effect_is_absent() {
    let v = doc(serde_json::json!([
        { "asset": { "type": "image", "src": "a.png" }, "start": 0, "length": 1, "effect": "  " }
    ]));
    let tl = Timeline::from_value(v).unwrap();
    assert_eq!(tl.tracks[0].clips[0].effect, None);
}

#[test]
fn rejects_image_without_length() {
    let v = doc(serde_json::json!([
        { "asset": { "type": "image", "src": "a.png" }, "start": 0 }
    ]));
    let err = Timeline::from_value(v).unwrap_err();
    assert!(matches!(err, ReelError::Parse(_)));
    assert!(err.to_string().contains("track 0 clip 0"));
}

#[test]
fn rejects_non_positive_length_negative_start_and_bad_offset() {
    for clip in [
        serde_json::json!({ "asset": { "type": "image", "src": "a.png" }, "start": 0, "length": 0 }),
        serde_json::json!({ "asset": { "type": "image", "src": "a.png" }, "start": -1, "length": 1 }),
        serde_json::json!({
            "asset": { "type": "image", "src": "a.png" }, "start": 0, "length": 1,
            "offset": { "x": 1.5, "y": 0 }
        }),
        serde_json::json!({
            "asset": { "type": "audio", "src": "a.mp3" }, "start": 0, "volume": -2
        }),
        serde_json::json!({ "asset": { "type": "video", "src": "a.mp4" }, "start": 0, "length": 1 }),
        serde_json::json!({ "asset": { "type": "image", "src": "" }, "start": 0, "length": 1 }),
    ] {
        let v = doc(serde_json::json!([clip]));
        assert!(
            matches!(Timeline::from_value(v), Err(ReelError::Parse(_))),
            "expected parse error"
        );
    }
}

#[test]
fn rejects_bad_output_size_and_malformed_json() {
    let v = serde_json::json!({
        "output": { "size": { "width": 0, "height": 720 } },
        "timeline": { "tracks": [] }
    });
    assert!(matches!(Timeline::from_value(v), Err(ReelError::Parse(_))));
    assert!(matches!(
        Timeline::from_json_str("{\"output\":"),
        Err(ReelError::Parse(_))
    ));
    assert!(matches!(
        Timeline::from_json_str("{\"timeline\":{\"tracks\":[]}}"),
        Err(ReelError::Parse(_))
    ));
}

#[test]
fn reader_and_str_agree() {
    let s = doc(serde_json::json!([
        { "asset": { "type": "image", "src": "a.png" }, "start": 0, "length": 2 }
    ]))
    .to_string();
    let a = Timeline::from_json_str(&s).unwrap();
    let b = Timeline::from_reader(s.as_bytes()).unwrap();
    assert_eq!(a, b);
}
