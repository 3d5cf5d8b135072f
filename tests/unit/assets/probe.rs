use super::*;
use std::path::Path;

#[test]
fn resolve_keeps_uris_and_absolute_paths() {
    let root = Path::new("/assets");
    assert_eq!(
        MediaSource::resolve("https://cdn.example/a.png", root),
        MediaSource::Uri("https://cdn.example/a.png".to_string())
    );
    assert_eq!(
        MediaSource::resolve("/abs/a.png", root),
        MediaSource::Path("/abs/a.png".into())
    );
    assert_eq!(
        MediaSource::resolve("rel/a.png", root),
        MediaSource::Path("/assets/rel/a.png".into())
    );
    // Windows-ish drive letters and plain colons are not URIs.
    assert!(matches!(
        MediaSource::resolve("c:/x.png", root),
        MediaSource::Path(_)
    ));
}

#[test]
fn static_probe_reports_registered_entries() {
    let probe = StaticProbe::new()
        .with_image("a.png", 640, 480)
        .with_audio("m.mp3", 4.0)
        .with_opaque("blob.bin");

    let a = MediaSource::Uri("a.png".to_string());
    let m = MediaSource::Uri("m.mp3".to_string());
    let blob = MediaSource::Uri("blob.bin".to_string());
    let nope = MediaSource::Uri("missing.png".to_string());

    assert_eq!(probe.dimensions(&a).unwrap(), FrameSize { width: 640, height: 480 });
    assert_eq!(probe.duration_secs(&m).unwrap(), 4.0);
    assert!(probe.exists(&blob));
    assert!(matches!(probe.dimensions(&blob), Err(ReelError::Asset(_))));
    assert!(!probe.exists(&nope));
    assert!(matches!(probe.dimensions(&nope), Err(ReelError::Asset(_))));
}

#[test]
fn media_probe_reads_image_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    image::RgbImage::new(64, 36).save(&path).unwrap();

    let probe = MediaProbe::default();
    let src = MediaSource::Path(path);
    assert!(probe.exists(&src));
    assert_eq!(probe.dimensions(&src).unwrap(), FrameSize { width: 64, height: 36 });
}

#[test]
fn media_probe_missing_file_does_not_exist() {
    let probe = MediaProbe::with_ffprobe("ffprobe-that-is-not-installed");
    let src = MediaSource::Path("/definitely/not/here.png".into());
    assert!(!probe.exists(&src));
    assert!(matches!(probe.dimensions(&src), Err(ReelError::Asset(_))));
    assert!(matches!(probe.duration_secs(&src), Err(ReelError::Asset(_))));
}

#[test]
fn static_probe_rejects_zero_sized_images() {
    let probe = StaticProbe::new().with_image("flat.png", 0, 480);
    let src = MediaSource::Uri("flat.png".to_string());
    assert!(probe.exists(&src));
    assert!(matches!(probe.dimensions(&src), Err(ReelError::Asset(_))));
}
