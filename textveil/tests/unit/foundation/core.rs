use super::*;

#[test]
fn fit_within_preserves_aspect() {
    let c = Canvas {
        width: 4000,
        height: 3000,
    };
    let fitted = c.fit_within(2000);
    assert_eq!(fitted.width, 2000);
    assert_eq!(fitted.height, 1500);

    let small = Canvas {
        width: 640,
        height: 480,
    };
    assert_eq!(small.fit_within(2000), small);
}

#[test]
fn scaled_never_collapses_to_zero() {
    let c = Canvas {
        width: 3,
        height: 1,
    };
    let s = c.scaled(0.1);
    assert_eq!(s.width, 1);
    assert_eq!(s.height, 1);
    assert_eq!(Canvas::square(10).scaled(2.0), Canvas::square(20));
}

#[test]
fn premul_rounds_to_nearest() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 64);
    assert_eq!(c.b, 0);
    assert_eq!(c.a, 128);
    assert!(Rgba8Premul::transparent().is_transparent());
}
