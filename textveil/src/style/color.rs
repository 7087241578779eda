//! Color normalization.
//!
//! Color pickers and pasted values can produce strings the rasterizer cannot consume directly
//! (`oklch(...)`, named colors, `rgb(... / 50%)`). Every color is reduced to straight 8-bit sRGBA
//! before it reaches the compositor.

use crate::foundation::core::Rgba8Premul;
use crate::notice::{ColorField, Notice};
use vello_cpu::peniko::color::{self as css, AlphaColor, Srgb};

/// Straight (non-premultiplied) 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NormalizedColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl NormalizedColor {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Build from straight components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `true` when the color contributes nothing when painted.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }

    /// Portable CSS form: `transparent`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn to_css(self) -> String {
        match self.a {
            0 => "transparent".to_owned(),
            255 => format!("rgb({}, {}, {})", self.r, self.g, self.b),
            a => {
                let alpha = (f64::from(a) / 255.0 * 1000.0).round() / 1000.0;
                format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
            }
        }
    }

    /// Premultiplied form used by the rasterizer.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    pub(crate) fn to_paint(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Option<Self> {
        fn to_u8(x: f32) -> Option<u8> {
            x.is_finite()
                .then(|| (x.clamp(0.0, 1.0) * 255.0).round() as u8)
        }
        Some(Self::rgba(to_u8(r)?, to_u8(g)?, to_u8(b)?, to_u8(a)?))
    }
}

/// Why a color string could not be normalized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported color \"{input}\": {reason}")]
pub struct UnsupportedColor {
    /// Raw input.
    pub input: String,
    /// Parser diagnostic.
    pub reason: String,
}

/// Converts arbitrary color strings into [`NormalizedColor`].
pub trait ColorNormalizer: Send + Sync {
    /// Normalize `input` or report why it is unsupported.
    fn normalize(&self, input: &str) -> Result<NormalizedColor, UnsupportedColor>;
}

/// Normalizer backed by a CSS Color Level 4 parser.
///
/// Accepts hex, `rgb()`/`rgba()`, `hsl()`, `oklch()`/`oklab()`, `lab()`/`lch()`, named colors and
/// `transparent`. Wide-gamut inputs are converted to sRGB and clipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct CssColorNormalizer;

impl ColorNormalizer for CssColorNormalizer {
    fn normalize(&self, input: &str) -> Result<NormalizedColor, UnsupportedColor> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UnsupportedColor {
                input: input.to_owned(),
                reason: "empty color".to_owned(),
            });
        }
        if let Some(c) = parse_hex(trimmed) {
            return Ok(c);
        }

        let parsed = css::parse_color(trimmed).map_err(|e| UnsupportedColor {
            input: input.to_owned(),
            reason: format!("{e:?}"),
        })?;
        let srgb: AlphaColor<Srgb> = parsed.to_alpha_color::<Srgb>();
        let [r, g, b, a] = srgb.components;
        NormalizedColor::from_unit(r, g, b, a).ok_or_else(|| UnsupportedColor {
            input: input.to_owned(),
            reason: "color has no finite sRGB representation".to_owned(),
        })
    }
}

/// Default color per field: black text, transparent fill.
pub fn fallback_for(field: ColorField) -> NormalizedColor {
    match field {
        ColorField::Text => NormalizedColor::BLACK,
        ColorField::Fill => NormalizedColor::TRANSPARENT,
    }
}

/// Normalize `input`, substituting the field default and producing a notice on failure.
#[tracing::instrument(level = "debug", skip(normalizer))]
pub fn resolve_color(
    normalizer: &dyn ColorNormalizer,
    field: ColorField,
    input: &str,
) -> (NormalizedColor, Option<Notice>) {
    match normalizer.normalize(input) {
        Ok(c) => (c, None),
        Err(err) => {
            let fallback = fallback_for(field);
            tracing::warn!(%err, "color fallback");
            (
                fallback,
                Some(Notice::ColorFallback {
                    field,
                    input: input.to_owned(),
                    fallback: fallback.to_css(),
                }),
            )
        }
    }
}

// `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`; anything else goes through the CSS parser.
fn parse_hex(s: &str) -> Option<NormalizedColor> {
    let hex = s.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    fn byte(pair: &str) -> Option<u8> {
        u8::from_str_radix(pair, 16).ok()
    }
    fn nibble(c: &str) -> Option<u8> {
        byte(c).map(|v| v * 17)
    }

    match hex.len() {
        3 | 4 => {
            let r = nibble(&hex[0..1])?;
            let g = nibble(&hex[1..2])?;
            let b = nibble(&hex[2..3])?;
            let a = if hex.len() == 4 {
                nibble(&hex[3..4])?
            } else {
                255
            };
            Some(NormalizedColor::rgba(r, g, b, a))
        }
        6 | 8 => {
            let r = byte(&hex[0..2])?;
            let g = byte(&hex[2..4])?;
            let b = byte(&hex[4..6])?;
            let a = if hex.len() == 8 { byte(&hex[6..8])? } else { 255 };
            Some(NormalizedColor::rgba(r, g, b, a))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
