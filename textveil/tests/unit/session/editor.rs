use std::io::Cursor;

use super::*;
use crate::export::storage::InMemoryStorage;
use crate::fonts::registry::{FontFamily, FontRegistry, FontSource};
use crate::layers::resolver::{LayerLoadError, LoadState};
use crate::render::compositor::CompositorOpts;
use crate::session::gate::StaticGate;
use crate::style::document::FontWeight;
use crate::style::presets::builtin_presets;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn session(gate: StaticGate) -> EditorSession {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    let mut fonts = FontRegistry::new();
    fonts
        .register(
            FontFamily::new("font-montserrat", "Sans")
                .with_face(FontWeight::BOLD, FontSource::Path(dir.join("DejaVuSans-Bold.ttf"))),
        )
        .unwrap();
    fonts
        .register(
            FontFamily::new("font-sacramento", "Regular only")
                .with_face(FontWeight::REGULAR, FontSource::Path(dir.join("DejaVuSans.ttf"))),
        )
        .unwrap();
    let opts = CompositorOpts {
        default_frame_px: 32,
        ..CompositorOpts::default()
    };
    EditorSession::new(Compositor::new(opts, fonts).unwrap(), gate)
}

fn fetch(source: &str) -> Result<Vec<u8>, LayerLoadError> {
    match source {
        "bg.png" => Ok(png(40, 20)),
        "fg.png" => Ok(png(20, 20)),
        other => Err(LayerLoadError::NotFound(other.to_owned())),
    }
}

#[test]
fn commit_validates_before_recording() {
    let mut s = session(StaticGate::allow_all());
    assert!(s.commit(StyleDocument::default().with_opacity(2.0)).is_err());
    assert_eq!(s.history().len(), 1);
    s.edit(|d| d.with_text("hi")).unwrap();
    assert_eq!(s.current().text, "hi");
    assert_eq!(s.undo().text, "ride");
    assert_eq!(s.redo().text, "hi");
}

#[test]
fn family_switch_coerces_weight_in_one_entry() {
    let mut s = session(StaticGate::allow_all());
    let doc = s.set_font_family(FontId::new("font-sacramento")).unwrap();
    assert_eq!(doc.font_weight, FontWeight::REGULAR);
    assert_eq!(s.history().len(), 2);
    assert!(s.set_font_family(FontId::new("font-unknown")).is_err());
    assert_eq!(s.history().len(), 2);
}

#[test]
fn presets_are_single_entries() {
    let mut s = session(StaticGate::allow_all());
    s.apply_preset(&builtin_presets()[0]).unwrap();
    assert_eq!(s.history().len(), 2);
    assert_eq!(s.current().text_color, "#ff6200");
}

#[test]
fn upload_sets_background_and_subject() {
    let mut s = session(StaticGate::allow_all());
    let remover = |src: &RemoteAsset| -> EditorResult<RemoteAsset> {
        assert_eq!(src.key, "bg.png");
        Ok(RemoteAsset::new("fg.png", "fg.png"))
    };
    s.upload(RemoteAsset::new("bg.png", "bg.png"), &remover).unwrap();
    assert_eq!(s.subject().unwrap().key, "fg.png");
    assert_eq!(s.resolve_layers(&fetch), 2);
    let frame = s.render().unwrap().rendered().unwrap().clone();
    assert_eq!((frame.width, frame.height), (20, 20));
}

#[test]
fn failed_removal_leaves_no_subject() {
    let mut s = session(StaticGate::allow_all());
    s.set_subject(Some(RemoteAsset::new("old.png", "old.png")));
    let remover =
        |_: &RemoteAsset| -> EditorResult<RemoteAsset> { Err(EditorError::storage("remover down")) };
    assert!(s.upload(RemoteAsset::new("bg.png", "bg.png"), &remover).is_err());
    assert!(s.subject().is_none());
    assert_eq!(s.background().unwrap().key, "bg.png");
}

#[test]
fn gate_refusals_are_not_entitled() {
    let mut s = session(StaticGate::deny_all());
    let remover = |a: &RemoteAsset| -> EditorResult<RemoteAsset> { Ok(a.clone()) };
    assert!(matches!(
        s.upload(RemoteAsset::new("bg.png", "bg.png"), &remover),
        Err(EditorError::NotEntitled(_))
    ));
    assert!(matches!(
        s.export(&InMemoryStorage::new(), &ExportOpts::default()),
        Err(EditorError::NotEntitled(_))
    ));
}

#[test]
fn vanished_background_degrades_export() {
    let mut s = session(StaticGate::allow_all());
    s.set_background(Some(RemoteAsset::new("bg.png", "bg.png")));
    s.set_subject(Some(RemoteAsset::new("fg.png", "fg.png")));
    s.resolve_layers(&fetch);

    let storage = InMemoryStorage::new();
    storage.upsert("fg.png", b"x").unwrap();
    let out = s.export(&storage, &ExportOpts::default()).unwrap();
    assert!(out.degraded);
    assert!(s.background().is_none());
    assert_eq!(
        s.compositor().layer(LayerKind::Background).state(),
        &LoadState::Empty
    );
    assert!(matches!(out.notices[0], Notice::BackgroundDropped { ref key } if key == "bg.png"));
}

#[test]
fn vanished_subject_blocks_export() {
    let mut s = session(StaticGate::allow_all());
    s.set_background(Some(RemoteAsset::new("bg.png", "bg.png")));
    s.set_subject(Some(RemoteAsset::new("fg.png", "fg.png")));
    s.resolve_layers(&fetch);

    let storage = InMemoryStorage::new();
    storage.upsert("bg.png", b"x").unwrap();
    let err = s.export(&storage, &ExportOpts::default()).unwrap_err();
    assert!(matches!(
        err,
        EditorError::MissingRemoteAsset {
            layer: LayerKind::Subject,
            ..
        }
    ));
    assert!(s.background().is_some());
}
