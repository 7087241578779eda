use crate::style::document::{FontId, FontWeight, StyleDocument};
use crate::style::history::HistoryStore;

/// Named bundle of typography settings.
///
/// Applying a preset leaves the text, position, and background adjustments alone.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Display name.
    pub name: String,
    /// Text color as entered.
    pub text_color: String,
    /// Font size in frame pixels.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font family.
    pub font_family: FontId,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Text-node opacity.
    pub opacity: f64,
    /// Text-box fill.
    pub background_color: String,
}

impl Preset {
    /// Overwrite the typography fields of `doc`.
    pub fn apply(&self, doc: &StyleDocument) -> StyleDocument {
        StyleDocument {
            text_color: self.text_color.clone(),
            font_size: self.font_size,
            font_weight: self.font_weight,
            font_family: self.font_family.clone(),
            rotation: self.rotation,
            opacity: self.opacity,
            background_color: self.background_color.clone(),
            ..doc.clone()
        }
    }
}

/// Presets shipped with the editor.
pub fn builtin_presets() -> Vec<Preset> {
    #[allow(clippy::too_many_arguments)]
    fn preset(
        name: &str,
        color: &str,
        size: f64,
        weight: FontWeight,
        family: &str,
        rotation: f64,
        opacity: f64,
        fill: &str,
    ) -> Preset {
        Preset {
            name: name.to_owned(),
            text_color: color.to_owned(),
            font_size: size,
            font_weight: weight,
            font_family: FontId::new(family),
            rotation,
            opacity,
            background_color: fill.to_owned(),
        }
    }

    vec![
        preset(
            "Bold Orange",
            "#ff6200",
            60.0,
            FontWeight::BOLD,
            "font-montserrat",
            0.0,
            1.0,
            "transparent",
        ),
        preset(
            "Elegant White",
            "#ffffff",
            50.0,
            FontWeight::REGULAR,
            "font-poppins",
            10.0,
            0.9,
            "rgba(0, 0, 0, 0.3)",
        ),
        preset(
            "Modern Black",
            "#000000",
            70.0,
            FontWeight::BOLD,
            "font-roboto",
            -5.0,
            1.0,
            "rgba(255, 255, 255, 0.5)",
        ),
    ]
}

impl HistoryStore {
    /// Apply `preset` to the current document as a single history entry.
    pub fn apply_preset(&mut self, preset: &Preset) -> &StyleDocument {
        self.edit(|doc| preset.apply(&doc))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/presets.rs"]
mod tests;
