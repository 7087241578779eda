use super::*;

#[test]
fn defaults_match_the_editor_start_state() {
    let d = StyleDocument::default();
    assert_eq!(d.text, "ride");
    assert_eq!(d.text_color, "#ff6200");
    assert_eq!(d.font_weight, FontWeight::BOLD);
    assert_eq!(d.font_family.as_str(), "font-montserrat");
    assert_eq!(d.position, Position::new(50.0, 20.0));
    assert_eq!(d.background_color, "transparent");
    assert!(!d.overlay);
    d.validate().unwrap();
}

#[test]
fn json_uses_camel_case_and_fills_defaults() {
    let d: StyleDocument =
        serde_json::from_str(r##"{"text":"hi","fontWeight":"600","backgroundColor":"#000"}"##)
            .unwrap();
    assert_eq!(d.text, "hi");
    assert_eq!(d.font_weight.get(), 600);
    assert_eq!(d.background_color, "#000");
    assert_eq!(d.font_size, 60.0);

    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["fontWeight"], 600);
    assert_eq!(v["fontFamily"], "font-montserrat");
    assert_eq!(v["position"]["y"], 20.0);
}

#[test]
fn unknown_fields_and_bad_weights_are_rejected() {
    assert!(serde_json::from_str::<StyleDocument>(r#"{"textShadow":"x"}"#).is_err());
    assert!(serde_json::from_str::<StyleDocument>(r#"{"fontWeight":0}"#).is_err());
    assert!(serde_json::from_str::<StyleDocument>(r#"{"fontWeight":"bold"}"#).is_err());
    assert!(FontWeight::new(1001).is_err());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let base = StyleDocument::default();
    assert!(base.clone().with_font_size(0.0).validate().is_err());
    assert!(base.clone().with_opacity(1.5).validate().is_err());
    assert!(base.clone().with_rotation(f64::NAN).validate().is_err());
    assert!(base.clone().with_brightness(-0.1).validate().is_err());
    assert!(
        base.clone()
            .with_position(Position::new(f64::INFINITY, 0.0))
            .validate()
            .is_err()
    );
    assert!(base.clone().with_rotation(-725.0).validate().is_err());
    assert!(base.clone().with_rotation(180.5).validate().is_err());
    assert!(
        base.clone()
            .with_position(Position::new(150.0, -20.0))
            .validate()
            .is_err()
    );
    assert!(
        base.clone()
            .with_position(Position::new(50.0, 100.1))
            .validate()
            .is_err()
    );
    assert!(base.clone().with_brightness(0.0).validate().is_err());
    assert!(base.clone().with_contrast(0.0).validate().is_err());

    base.clone()
        .with_rotation(-180.0)
        .with_position(Position::new(0.0, 100.0))
        .with_opacity(0.0)
        .validate()
        .unwrap();
    base.with_rotation(180.0).with_brightness(2.0).with_contrast(0.2).validate().unwrap();
}

#[test]
fn normalized_text_collapses_whitespace() {
    let d = StyleDocument::default().with_text("  night \n\t ride  ");
    assert_eq!(d.normalized_text(), "night ride");
    assert_eq!(StyleDocument::default().with_text(" \n ").normalized_text(), "");
}
