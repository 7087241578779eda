use std::io::Cursor;
use std::path::Path;

use super::*;
use crate::fonts::registry::{FontFamily, FontSource};
use crate::layers::resolver::LayerLoadError;
use crate::style::document::{FontId, FontWeight};

fn fonts() -> FontRegistry {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    let mut reg = FontRegistry::new();
    reg.register(
        FontFamily::new("font-sans", "Sans")
            .with_face(FontWeight::REGULAR, FontSource::Path(dir.join("DejaVuSans.ttf")))
            .with_face(FontWeight::BOLD, FontSource::Path(dir.join("DejaVuSans-Bold.ttf"))),
    )
    .unwrap();
    reg
}

fn doc() -> StyleDocument {
    StyleDocument {
        font_family: FontId::new("font-sans"),
        ..StyleDocument::default()
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn compositor() -> Compositor {
    let opts = CompositorOpts {
        default_frame_px: 64,
        ..CompositorOpts::default()
    };
    Compositor::new(opts, fonts()).unwrap()
}

#[test]
fn opts_validation() {
    assert!(CompositorOpts::default().validate().is_ok());
    let bad = CompositorOpts {
        max_frame_px: 0,
        ..CompositorOpts::default()
    };
    assert!(Compositor::new(bad, FontRegistry::new()).is_err());
}

#[test]
fn pending_layers_yield_loading() {
    let mut c = compositor();
    assert_eq!(c.state(), FrameState::Idle);
    let t = c.set_layer_source(LayerKind::Subject, Some("s.png".into())).unwrap();
    let out = c.render(&doc()).unwrap();
    assert!(matches!(out, FrameOutcome::Loading(ref k) if k == &[LayerKind::Subject]));
    assert_eq!(c.state(), FrameState::Loading);

    assert!(c.complete_load(&t, Ok(png(32, 16))));
    let frame = c.render(&doc()).unwrap().rendered().unwrap().clone();
    assert_eq!((frame.width, frame.height), (32, 16));
    assert_eq!(c.state(), FrameState::Rendered);
}

#[test]
fn unchanged_inputs_hit_the_memo() {
    let mut c = compositor();
    c.fonts_mut().load(&FontId::new("font-sans"), FontWeight::BOLD).unwrap();
    let a = c.render(&doc()).unwrap().rendered().unwrap().clone();
    let b = c.render(&doc()).unwrap().rendered().unwrap().clone();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.fonts_ready);

    let moved = c.render(&doc().with_rotation(15.0)).unwrap();
    assert!(!Arc::ptr_eq(&a, moved.rendered().unwrap()));
}

#[test]
fn missing_face_falls_back_and_reports() {
    let mut c = compositor();
    let empty = c.render(&doc()).unwrap().rendered().unwrap().clone();
    assert!(!empty.fonts_ready);
    assert!(empty.layout.text.is_none());
    assert!(empty.notices.iter().any(|n| matches!(n, Notice::FontFallback { .. })));

    c.fonts_mut().load(&FontId::new("font-sans"), FontWeight::REGULAR).unwrap();
    let preview = c.render(&doc()).unwrap().rendered().unwrap().clone();
    assert!(!preview.fonts_ready);
    assert!(preview.layout.text.is_some());

    c.fonts_mut().ensure_ready(&doc()).unwrap();
    let ready = c.render(&doc()).unwrap().rendered().unwrap().clone();
    assert!(ready.fonts_ready);
    assert!(ready.notices.is_empty());
}

#[test]
fn empty_text_needs_no_font() {
    let mut c = compositor();
    let frame = c.render(&doc().with_text("  ")).unwrap().rendered().unwrap().clone();
    assert!(frame.fonts_ready);
    assert!(frame.layout.text.is_none());
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn bad_colors_fall_back_with_notices() {
    let mut c = compositor();
    c.fonts_mut().ensure_ready(&doc()).unwrap();
    let d = doc()
        .with_text_color("lab(nonsense)")
        .with_background_color("???");
    let frame = c.render(&d).unwrap().rendered().unwrap().clone();
    let fallbacks = frame
        .notices
        .iter()
        .filter(|n| matches!(n, Notice::ColorFallback { .. }))
        .count();
    assert_eq!(fallbacks, 2);
}

#[test]
fn failed_layer_does_not_block_the_frame() {
    let mut c = compositor();
    let bg = c.set_layer_source(LayerKind::Background, Some("bg.png".into())).unwrap();
    let subject = c.set_layer_source(LayerKind::Subject, Some("s.png".into())).unwrap();
    c.complete_load(&bg, Err(LayerLoadError::Rejected("cors".into())));
    c.complete_load(&subject, Ok(png(20, 20)));

    let frame = c.render(&doc().with_text("")).unwrap().rendered().unwrap().clone();
    assert_eq!((frame.width, frame.height), (20, 20));
    assert!(frame.layout.background.is_none());
    assert!(frame.layout.subject.is_some());
    assert!(frame.notices.iter().any(|n| matches!(
        n,
        Notice::LayerLoadFailed {
            layer: LayerKind::Background,
            ..
        }
    )));
}

#[test]
fn resolve_pending_loads_both_layers_and_isolates_failures() {
    let mut c = compositor();
    c.set_layer_source(LayerKind::Background, Some("bg.png".into()));
    c.set_layer_source(LayerKind::Subject, Some("broken.png".into()));
    assert_eq!(c.pending_tickets().len(), 2);

    let fetcher = |source: &str| -> Result<Vec<u8>, LayerLoadError> {
        match source {
            "bg.png" => Ok(png(10, 30)),
            other => Err(LayerLoadError::NotFound(other.to_owned())),
        }
    };
    assert_eq!(c.resolve_pending(&fetcher), 2);
    assert!(c.pending_tickets().is_empty());
    assert_eq!(c.layer(LayerKind::Background).state(), &LoadState::Ready);
    assert!(matches!(
        c.layer(LayerKind::Subject).state(),
        LoadState::Failed(LayerLoadError::NotFound(_))
    ));
    assert_eq!(c.resolve_pending(&fetcher), 0);
}

#[test]
fn detached_surface_is_preview_unavailable() {
    let mut c = compositor();
    c.detach_surface();
    let err = c.render(&doc()).unwrap_err();
    assert!(matches!(err, EditorError::PreviewUnavailable(_)));
    assert_eq!(c.state(), FrameState::Idle);
    c.attach_surface();
    assert!(c.render(&doc().with_text("")).is_ok());
}

#[test]
fn scale_is_bounded() {
    let mut c = compositor();
    assert!(c.render_scaled(&doc(), 0.0).is_err());
    assert!(c.render_scaled(&doc(), 9.0).is_err());
    assert!(c.render_scaled(&doc(), f64::NAN).is_err());
}
