use super::*;
use crate::assets::probe::StaticProbe;

fn size(width: u32, height: u32) -> FrameSize {
    FrameSize { width, height }
}

#[test]
fn equal_aspect_needs_no_padding() {
    for (w, h) in [(1920, 1080), (640, 360), (1280, 720), (3840, 2160), (16, 9)] {
        let p = fit(size(w, h), size(1280, 720));
        assert_eq!(p.scaled, size(1280, 720), "{w}x{h}");
        assert!(!p.needs_padding());
        assert_eq!(p.margin, (0, 0));
    }
}

#[test]
fn narrower_input_scales_by_width() {
    // 4:3 into 16:9
    let p = fit(size(640, 480), size(1280, 720));
    assert_eq!(p.scaled, size(1280, 960));
    assert_eq!(p.padded, size(1280, 960));
    assert!(!p.needs_padding());
    assert_eq!(p.output, size(1280, 720));
    let win = p.centered_window();
    assert_eq!((win.x0, win.y0, win.width(), win.height()), (0.0, 120.0, 1280.0, 720.0));
}

#[test]
fn wider_input_scales_by_height() {
    // 21:9-ish into 16:9
    let p = fit(size(2520, 1080), size(1280, 720));
    assert_eq!(p.scaled, size(1680, 720));
    assert_eq!(p.padded, size(1680, 720));
    let win = p.centered_window();
    assert_eq!((win.x0, win.y0), (200.0, 0.0));
}

#[test]
fn truncated_scale_never_falls_below_target() {
    // 1001x1000 into 1000x999: 1.001 < 1.001001.., scale by width.
    let p = fit(size(1001, 1000), size(1000, 999));
    assert_eq!(p.scaled, size(1000, 999));
    // 10x3 into 3x1: wider, scale by height, 3.33 truncates to exactly 3.
    let p = fit(size(10, 3), size(3, 1));
    assert_eq!(p.scaled, size(3, 1));
    assert!(!p.needs_padding());
    let content = p.content_rect();
    assert_eq!((content.width(), content.height()), (3.0, 1.0));
}

#[test]
fn padded_always_covers_output() {
    for (w, h) in [(1, 1), (7, 3), (3, 7), (1000, 1), (1, 1000), (641, 479)] {
        let p = fit(size(w, h), size(1280, 720));
        assert!(p.padded.width >= 1280 && p.padded.height >= 720, "{w}x{h}");
        assert!(p.scaled.width >= 1 && p.scaled.height >= 1);
    }
}

#[test]
fn unprobeable_source_is_placed_unscaled_at_offset() {
    let probe = StaticProbe::new().with_opaque("blob");
    let out = OutputSpec {
        size: size(1280, 720),
    };
    let layout = resolve_layout(
        &MediaSource::Uri("blob".to_string()),
        Offset { x: 0.5, y: 0.25 },
        out,
        &probe,
    );
    assert_eq!(
        layout,
        Layout::Unscaled {
            position: Vec2::new(640.0, 180.0),
            output: size(1280, 720)
        }
    );
    assert_eq!(layout.output(), size(1280, 720));
}

#[test]
fn probed_source_is_fitted() {
    let probe = StaticProbe::new().with_image("a.png", 640, 480);
    let out = OutputSpec {
        size: size(1280, 720),
    };
    let layout = resolve_layout(
        &MediaSource::Uri("a.png".to_string()),
        Offset::default(),
        out,
        &probe,
    );
    let Layout::Fitted(p) = layout else {
        panic!("expected fitted layout");
    };
    assert_eq!(p.native, size(640, 480));
    assert_eq!(layout.output(), size(1280, 720));
}

#[test]
fn zero_sized_native_does_not_panic() {
    for native in [size(0, 480), size(640, 0), size(0, 0)] {
        let p = fit(native, size(1280, 720));
        assert!(p.padded.width >= 1280 && p.padded.height >= 720);
        assert!(p.scaled.width >= 1 && p.scaled.height >= 1);
    }
}

#[test]
fn zero_sized_probe_entry_is_placed_unscaled() {
    let probe = StaticProbe::new().with_image("flat.png", 0, 480);
    let layout = resolve_layout(
        &MediaSource::Uri("flat.png".to_string()),
        Offset::default(),
        OutputSpec {
            size: size(1280, 720),
        },
        &probe,
    );
    assert!(matches!(layout, Layout::Unscaled { .. }));
}
