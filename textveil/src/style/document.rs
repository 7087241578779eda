use std::fmt;

use crate::foundation::error::{EditorError, EditorResult};
use crate::fonts::registry::FontRegistry;

/// Font identifier, e.g. `font-montserrat`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FontId(String);

impl FontId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FontId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for FontId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// CSS-style numeric font weight in `1..=1000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    /// 400.
    pub const REGULAR: Self = Self(400);
    /// 700.
    pub const BOLD: Self = Self(700);

    /// Validate and wrap a weight.
    pub fn new(value: u16) -> EditorResult<Self> {
        if (1..=1000).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EditorError::validation(format!(
                "font weight must be in 1..=1000, got {value}"
            )))
        }
    }

    /// Numeric weight.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl From<FontWeight> for u16 {
    fn from(value: FontWeight) -> Self {
        value.0
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Weights arrive as numbers or as the string form UI controls emit ("700").
impl<'de> serde::Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u16),
            Str(String),
        }

        let value = match Repr::deserialize(deserializer)? {
            Repr::Num(v) => v,
            Repr::Str(s) => s
                .trim()
                .parse::<u16>()
                .map_err(|_| serde::de::Error::custom(format!("invalid font weight \"{s}\"")))?,
        };
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Text-node center as percentages of the frame (`50, 50` is the middle).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Horizontal center, percent of frame width.
    pub x: f64,
    /// Vertical center, percent of frame height.
    pub y: f64,
}

impl Position {
    /// Build a position from percentages.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Complete description of the overlay text and background adjustments.
///
/// Documents are plain values: every edit produces a new document, which is what the history
/// store snapshots. Colors are kept exactly as entered and normalized at render time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StyleDocument {
    /// Overlay text; whitespace is collapsed before rendering.
    pub text: String,
    /// Text color as entered.
    pub text_color: String,
    /// Font size in frame pixels.
    pub font_size: f64,
    /// Requested weight; coerced to a supported weight on family switches.
    pub font_weight: FontWeight,
    /// Font family identifier.
    pub font_family: FontId,
    /// Text-node center in percent.
    pub position: Position,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Text-node opacity in `[0, 1]`.
    pub opacity: f64,
    /// Fill behind the text box as entered (`transparent` for none).
    pub background_color: String,
    /// Draw the dark overlay over the background layer.
    pub overlay: bool,
    /// Background brightness multiplier (1 = unchanged).
    pub brightness: f64,
    /// Background contrast multiplier (1 = unchanged).
    pub contrast: f64,
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self {
            text: "ride".to_owned(),
            text_color: "#ff6200".to_owned(),
            font_size: 60.0,
            font_weight: FontWeight::BOLD,
            font_family: FontId::new("font-montserrat"),
            position: Position::new(50.0, 20.0),
            rotation: 0.0,
            opacity: 1.0,
            background_color: "transparent".to_owned(),
            overlay: false,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl StyleDocument {
    /// Check numeric ranges.
    pub fn validate(&self) -> EditorResult<()> {
        fn finite(name: &str, v: f64) -> EditorResult<()> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(EditorError::validation(format!("{name} must be finite")))
            }
        }

        finite("fontSize", self.font_size)?;
        if self.font_size <= 0.0 {
            return Err(EditorError::validation("fontSize must be > 0"));
        }
        for (name, v) in [("position.x", self.position.x), ("position.y", self.position.y)] {
            finite(name, v)?;
            if !(0.0..=100.0).contains(&v) {
                return Err(EditorError::validation(format!("{name} must be in [0, 100]")));
            }
        }
        finite("rotation", self.rotation)?;
        if !(-180.0..=180.0).contains(&self.rotation) {
            return Err(EditorError::validation("rotation must be in [-180, 180]"));
        }
        finite("opacity", self.opacity)?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(EditorError::validation("opacity must be in [0, 1]"));
        }
        for (name, v) in [("brightness", self.brightness), ("contrast", self.contrast)] {
            finite(name, v)?;
            if v <= 0.0 {
                return Err(EditorError::validation(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }

    /// Text with runs of whitespace collapsed to single spaces and trimmed.
    pub fn normalized_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Replace the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Replace the text color.
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    /// Replace the text-box fill color.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Replace the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Replace the weight without coercion.
    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    /// Switch family, coercing the weight to the nearest one the family ships.
    pub fn with_font_family(mut self, id: FontId, fonts: &FontRegistry) -> EditorResult<Self> {
        let weight = fonts.coerce(&id, self.font_weight)?;
        if weight != self.font_weight {
            tracing::debug!(font = %id, from = %self.font_weight, to = %weight, "coerced font weight");
        }
        self.font_family = id;
        self.font_weight = weight;
        Ok(self)
    }

    /// Move the text-node center.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Replace the rotation.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Replace the text-node opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Toggle the background overlay.
    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Replace the background brightness.
    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    /// Replace the background contrast.
    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/document.rs"]
mod tests;
