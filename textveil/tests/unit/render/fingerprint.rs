use super::*;
use crate::layers::resolver::LayerKind;

fn key(doc: &StyleDocument, bg: &LayerResolver, subject: &LayerResolver) -> FrameFingerprint {
    fingerprint_frame(&FrameKeyInputs {
        doc,
        background: bg,
        subject,
        face: None,
        scale: 1.0,
    })
}

#[test]
fn same_inputs_same_fingerprint() {
    let doc = StyleDocument::default();
    let bg = LayerResolver::new(LayerKind::Background);
    let subject = LayerResolver::new(LayerKind::Subject);
    assert_eq!(key(&doc, &bg, &subject), key(&doc.clone(), &bg, &subject));
}

#[test]
fn whitespace_only_text_edits_do_not_change_the_frame() {
    let bg = LayerResolver::new(LayerKind::Background);
    let subject = LayerResolver::new(LayerKind::Subject);
    let a = StyleDocument::default().with_text("night ride");
    let b = StyleDocument::default().with_text("  night   ride ");
    assert_eq!(key(&a, &bg, &subject), key(&b, &bg, &subject));
}

#[test]
fn style_layer_and_scale_changes_are_detected() {
    let doc = StyleDocument::default();
    let mut bg = LayerResolver::new(LayerKind::Background);
    let subject = LayerResolver::new(LayerKind::Subject);
    let base = key(&doc, &bg, &subject);

    assert_ne!(base, key(&doc.clone().with_rotation(1.0), &bg, &subject));
    assert_ne!(base, key(&doc.clone().with_overlay(true), &bg, &subject));

    let scaled = fingerprint_frame(&FrameKeyInputs {
        doc: &doc,
        background: &bg,
        subject: &subject,
        face: None,
        scale: 2.0,
    });
    assert_ne!(base, scaled);

    bg.set_source(Some("bg.png".into()));
    assert_ne!(base, key(&doc, &bg, &subject));
}

#[test]
fn display_is_32_hex_digits() {
    let fp = FrameFingerprint { hi: 1, lo: 0xff };
    assert_eq!(fp.to_string(), "000000000000000100000000000000ff");
}
