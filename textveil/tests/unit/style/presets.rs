use super::*;
use crate::style::document::Position;

#[test]
fn builtin_presets_are_valid_documents() {
    let presets = builtin_presets();
    let names: Vec<_> = presets.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Bold Orange", "Elegant White", "Modern Black"]);
    for p in &presets {
        p.apply(&StyleDocument::default()).validate().unwrap();
    }
}

#[test]
fn apply_keeps_text_and_background_adjustments() {
    let doc = StyleDocument::default()
        .with_text("hello")
        .with_position(Position::new(10.0, 90.0))
        .with_overlay(true)
        .with_brightness(1.4);
    let elegant = &builtin_presets()[1];
    let out = elegant.apply(&doc);

    assert_eq!(out.text, "hello");
    assert_eq!(out.position, Position::new(10.0, 90.0));
    assert!(out.overlay);
    assert_eq!(out.brightness, 1.4);
    assert_eq!(out.text_color, "#ffffff");
    assert_eq!(out.font_family.as_str(), "font-poppins");
    assert_eq!(out.rotation, 10.0);
    assert_eq!(out.background_color, "rgba(0, 0, 0, 0.3)");
}

#[test]
fn history_records_one_entry_per_preset() {
    let mut h = HistoryStore::default();
    h.apply_preset(&builtin_presets()[2]);
    assert_eq!(h.len(), 2);
    assert_eq!(h.current().font_size, 70.0);
    assert_eq!(h.undo().font_size, 60.0);
}
