use crate::layers::resolver::LayerKind;
use crate::style::document::{FontId, FontWeight};

/// Which style field a color came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorField {
    /// `StyleDocument::text_color`.
    Text,
    /// `StyleDocument::background_color` (the text box fill).
    Fill,
}

/// A recoverable condition the caller should show to the user.
///
/// Notices never abort a render or an export; they describe a degraded result.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A color could not be normalized and the default was used instead.
    ColorFallback {
        /// Field the color was read from.
        field: ColorField,
        /// Raw input as stored in the style document.
        input: String,
        /// CSS form of the color that was used instead.
        fallback: String,
    },
    /// A layer image failed to load and a placeholder was drawn.
    LayerLoadFailed {
        /// Layer that failed.
        layer: LayerKind,
        /// Human-readable failure reason.
        reason: String,
    },
    /// The requested font face was not loaded yet; another face was used for the preview.
    FontFallback {
        /// Requested family.
        font: FontId,
        /// Requested weight.
        weight: FontWeight,
    },
    /// The background asset vanished upstream and was dropped from the export.
    BackgroundDropped {
        /// Storage key that no longer exists.
        key: String,
    },
}

impl Notice {
    /// Short user-facing message.
    pub fn message(&self) -> String {
        match self {
            Self::ColorFallback {
                field,
                input,
                fallback,
            } => {
                let what = match field {
                    ColorField::Text => "text color",
                    ColorField::Fill => "background color",
                };
                format!("unsupported {what} \"{input}\", using {fallback}")
            }
            Self::LayerLoadFailed { layer, reason } => {
                format!("failed to load {layer} image: {reason}")
            }
            Self::FontFallback { font, weight } => {
                format!("font {font} ({weight}) is still loading")
            }
            Self::BackgroundDropped { .. } => {
                "background image no longer exists and was excluded from the download".to_owned()
            }
        }
    }
}
