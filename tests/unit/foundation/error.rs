use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(ReelError::parse("x").to_string().contains("parse error:"));
    assert!(ReelError::asset("x").to_string().contains("asset error:"));
    assert!(
        ReelError::empty_composition("x")
            .to_string()
            .contains("empty composition:")
    );
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
    assert!(
        ReelError::worker_fault("x")
            .to_string()
            .contains("worker fault:")
    );
    assert!(ReelError::timeout("x").to_string().contains("timeout:"));
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_asset_errors_are_clip_local() {
    assert!(ReelError::asset("missing").is_clip_local());
    assert!(!ReelError::parse("bad").is_clip_local());
    assert!(!ReelError::encode("ffmpeg").is_clip_local());
    assert!(!ReelError::empty_composition("none").is_clip_local());
}

#[test]
fn json_errors_become_parse_errors() {
    let err: ReelError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, ReelError::Parse(_)));
}
