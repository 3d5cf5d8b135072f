use super::*;
use crate::{
    compose::layer::{LayerKind, LayerSource, ResolvedLayer},
    foundation::core::{Fps, FrameSize, Span},
};

fn black_composition(width: u32, height: u32) -> Composition {
    let size = FrameSize { width, height };
    Composition {
        size,
        fps: Fps::PIPELINE,
        video: vec![ResolvedLayer {
            kind: LayerKind::Video,
            span: Span { start: 0.0, end: 1.0 },
            source: LayerSource::VideoFiller { size },
            origin: None,
        }],
        audio: Vec::new(),
        duration: 1.0,
        audio_content: None,
        sample_rate: 44_100,
        channel_layout: "stereo".to_string(),
        audio_fade: None,
        skipped: Vec::new(),
    }
}

fn encoder(bin: &str) -> FfmpegEncoder {
    FfmpegEncoder::new(EncodeSettings {
        ffmpeg_bin: bin.to_string(),
        ..EncodeSettings::default()
    })
}

#[test]
fn partial_path_is_a_hidden_sibling() {
    let p = partial_path(Path::new("/renders/final.mp4"));
    assert_eq!(p.parent(), Some(Path::new("/renders")));
    let name = p.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(".final.mp4."));
    assert!(name.ends_with(".partial"));
    assert_ne!(p, partial_path(Path::new("/renders/final.mp4")));
}

#[test]
fn ensure_parent_dir_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a/b/c.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}

#[test]
fn odd_sizes_are_rejected_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let err = encoder("reelcast-test-missing-ffmpeg")
        .encode(&black_composition(1281, 720), &dir.path().join("x.mp4"), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn missing_binary_is_an_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.mp4");
    let err = encoder("reelcast-test-missing-ffmpeg")
        .encode(&black_composition(64, 64), &out, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    assert!(!out.exists());
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.mp4");
    std::fs::write(&out, b"keep").unwrap();
    let enc = FfmpegEncoder::new(EncodeSettings {
        overwrite: false,
        ffmpeg_bin: "reelcast-test-missing-ffmpeg".to_string(),
        ..EncodeSettings::default()
    });
    assert!(matches!(
        enc.encode(&black_composition(64, 64), &out, &CancelToken::new()),
        Err(ReelError::Validation(_))
    ));
    assert_eq!(std::fs::read(&out).unwrap(), b"keep");
}

#[cfg(unix)]
fn script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt as _;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[cfg(unix)]
#[test]
fn output_appears_only_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("renders/x.mp4");

    // Writes its last argument, like ffmpeg writing the output file.
    let ok = script(dir.path(), "ok.sh", "for last; do :; done\necho frames > \"$last\"");
    encoder(&ok)
        .encode(&black_composition(64, 64), &out, &CancelToken::new())
        .unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "frames");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("renders"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(unix)]
#[test]
fn failing_encoder_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.mp4");
    let bad = script(
        dir.path(),
        "bad.sh",
        "for last; do :; done\necho partial > \"$last\"\necho 'Invalid data' >&2\nexit 1",
    );
    let err = encoder(&bad)
        .encode(&black_composition(64, 64), &out, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    assert!(err.to_string().contains("Invalid data"));
    assert!(!out.exists());
    let others = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name() != "bad.sh")
        .count();
    assert_eq!(others, 0);
}

#[cfg(unix)]
#[test]
fn hung_encoder_is_killed_at_the_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let hang = script(dir.path(), "hang.sh", "exec sleep 30");
    let enc = FfmpegEncoder::new(EncodeSettings {
        ffmpeg_bin: hang,
        timeout: Some(Duration::from_millis(200)),
        ..EncodeSettings::default()
    });
    let started = Instant::now();
    let err = enc
        .encode(&black_composition(64, 64), &dir.path().join("x.mp4"), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn cancelled_encode_kills_ffmpeg_and_skips_the_rename() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.mp4");
    let slow = script(
        dir.path(),
        "slow.sh",
        "for last; do :; done\necho partial > \"$last\"\nexec sleep 30",
    );
    let cancel = CancelToken::with_deadline(Duration::from_millis(200));
    let started = Instant::now();
    let err = encoder(&slow)
        .encode(&black_composition(64, 64), &out, &cancel)
        .unwrap_err();
    assert!(matches!(err, ReelError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!out.exists());
    let others = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name() != "slow.sh")
        .count();
    assert_eq!(others, 0);
}

#[test]
fn already_cancelled_encode_does_not_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = encoder("reelcast-test-missing-ffmpeg")
        .encode(&black_composition(64, 64), &dir.path().join("x.mp4"), &cancel)
        .unwrap_err();
    assert!(matches!(err, ReelError::Timeout(_)));
}
