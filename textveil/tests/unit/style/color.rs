use super::*;

fn norm(s: &str) -> Result<NormalizedColor, UnsupportedColor> {
    CssColorNormalizer.normalize(s)
}

#[test]
fn hex_forms() {
    assert_eq!(norm("#ff6200").unwrap(), NormalizedColor::rgba(255, 98, 0, 255));
    assert_eq!(norm("#FF620080").unwrap(), NormalizedColor::rgba(255, 98, 0, 128));
    assert_eq!(norm("#fff").unwrap(), NormalizedColor::WHITE);
    assert_eq!(norm("  #0000  ").unwrap(), NormalizedColor::TRANSPARENT);
}

#[test]
fn css_functions_and_keywords() {
    assert_eq!(
        norm("rgba(0, 0, 0, 0.3)").unwrap(),
        NormalizedColor::rgba(0, 0, 0, 77)
    );
    assert_eq!(norm("rgb(255 255 255 / 50%)").unwrap().a, 128);
    assert_eq!(norm("transparent").unwrap().a, 0);
    assert_eq!(norm("red").unwrap(), NormalizedColor::rgba(255, 0, 0, 255));
}

#[test]
fn oklch_is_converted_to_srgb() {
    let c = norm("oklch(0.7 0.2 40)").unwrap();
    assert_eq!(c.a, 255);
    assert!(c.r > c.g && c.r > c.b, "expected a warm color, got {c:?}");

    // Far outside sRGB; clipped rather than rejected.
    let wide = norm("oklch(0.9 0.4 150)").unwrap();
    assert_eq!(wide.a, 255);
}

#[test]
fn garbage_is_rejected() {
    for bad in ["", "   ", "not-a-color", "#12", "#gggggg", "rgb(nope)"] {
        let err = norm(bad).unwrap_err();
        assert_eq!(err.input, bad);
    }
}

#[test]
fn to_hex_and_css() {
    let opaque = NormalizedColor::rgba(255, 98, 0, 255);
    assert_eq!(opaque.to_hex(), "#ff6200");
    assert_eq!(opaque.to_css(), "rgb(255, 98, 0)");

    let half = NormalizedColor::rgba(0, 0, 0, 77);
    assert_eq!(half.to_hex(), "#0000004d");
    assert_eq!(half.to_css(), "rgba(0, 0, 0, 0.302)");
    assert_eq!(NormalizedColor::TRANSPARENT.to_css(), "transparent");
}

#[test]
fn normalized_css_round_trips_through_the_parser() {
    let c = NormalizedColor::rgba(12, 200, 99, 255);
    assert_eq!(norm(&c.to_css()).unwrap(), c);
    assert_eq!(norm(&c.to_hex()).unwrap(), c);
}

#[test]
fn resolve_color_falls_back_per_field() {
    let (c, notice) = resolve_color(&CssColorNormalizer, ColorField::Text, "#ffffff");
    assert_eq!(c, NormalizedColor::WHITE);
    assert!(notice.is_none());

    let (c, notice) = resolve_color(&CssColorNormalizer, ColorField::Text, "bogus");
    assert_eq!(c, NormalizedColor::BLACK);
    assert_eq!(
        notice,
        Some(Notice::ColorFallback {
            field: ColorField::Text,
            input: "bogus".to_owned(),
            fallback: "rgb(0, 0, 0)".to_owned(),
        })
    );

    let (c, notice) = resolve_color(&CssColorNormalizer, ColorField::Fill, "bogus");
    assert!(c.is_transparent());
    assert!(notice.is_some());
}

#[test]
fn premultiplied_paint_value() {
    let p = NormalizedColor::rgba(255, 0, 0, 128).to_rgba8_premul();
    assert_eq!((p.r, p.g, p.b, p.a), (128, 0, 0, 128));
}
