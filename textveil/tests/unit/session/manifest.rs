use super::*;
use crate::export::exporter::ExportFormat;

const MANIFEST: &str = r#"{
    "style": { "text": "night ride", "fontFamily": "font-sans", "fontWeight": "600" },
    "background": { "url": "bg.png", "key": "bg.png" },
    "export": { "format": "jpeg", "quality": 0.9 },
    "compositor": { "maxFramePx": 2048 },
    "fonts": {
        "families": [
            { "id": "font-sans", "faces": { "400": "fonts/DejaVuSans.ttf", "700": "fonts/DejaVuSans-Bold.ttf" } }
        ]
    }
}"#;

#[test]
fn parses_with_defaults() {
    let err = SessionManifest::from_reader(MANIFEST.as_bytes()).unwrap_err();
    // Compositor options use snake_case keys.
    assert!(matches!(err, EditorError::Serde(_)));

    let fixed = MANIFEST.replace("maxFramePx", "max_frame_px");
    let m = SessionManifest::from_reader(fixed.as_bytes()).unwrap();
    assert_eq!(m.style.text, "night ride");
    assert_eq!(m.style.font_weight.get(), 600);
    assert_eq!(m.background.as_ref().unwrap().key, "bg.png");
    assert!(m.subject.is_none());
    assert_eq!(m.export.format, ExportFormat::Jpeg);
    assert_eq!(m.export.file_name, "edited-image");
    assert_eq!(m.compositor.max_frame_px, 2048);
    assert_eq!(m.compositor.default_frame_px, 1080);
}

#[test]
fn invalid_style_is_rejected() {
    let bad = r#"{ "style": { "opacity": 4 } }"#;
    assert!(matches!(
        SessionManifest::from_reader(bad.as_bytes()),
        Err(EditorError::Validation(_))
    ));
}

#[test]
fn font_registry_resolves_relative_paths() {
    let fixed = MANIFEST.replace("maxFramePx", "max_frame_px");
    let m = SessionManifest::from_reader(fixed.as_bytes()).unwrap();
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    let mut reg = m.font_registry(&base).unwrap();
    let id = FontId::new("font-sans");
    assert_eq!(reg.family(&id).unwrap().name, "font-sans");
    assert_eq!(reg.nearest_weight(&id, m.style.font_weight).unwrap().get(), 700);
    reg.ensure_ready(&m.style).unwrap();
}

#[test]
fn from_path_reports_missing_files() {
    assert!(SessionManifest::from_path("/definitely/not/here.json").is_err());
}
