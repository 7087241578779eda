use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::export::exporter::ExportOpts;
use crate::export::storage::RemoteAsset;
use crate::fonts::registry::{FontFamily, FontRegistry, FontSource};
use crate::foundation::error::{EditorError, EditorResult};
use crate::render::compositor::CompositorOpts;
use crate::style::document::{FontId, FontWeight, StyleDocument};

/// Font setup: a built-in catalog directory and/or explicit families.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// Directory laid out as `<font-id>/<weight>.ttf`.
    pub catalog_dir: Option<PathBuf>,
    /// Extra families; these replace catalog families with the same id.
    pub families: Vec<FontFamilyConfig>,
}

/// One explicitly configured family.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontFamilyConfig {
    /// Family id.
    pub id: FontId,
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Font file per weight.
    pub faces: BTreeMap<u16, PathBuf>,
}

/// Everything needed to reopen an editing session from disk.
///
/// Relative paths resolve against the manifest's directory.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionManifest {
    /// Initial style.
    pub style: StyleDocument,
    /// Original photo.
    pub background: Option<RemoteAsset>,
    /// Cut-out foreground.
    pub subject: Option<RemoteAsset>,
    /// Compositor configuration.
    pub compositor: CompositorOpts,
    /// Default export options.
    pub export: ExportOpts,
    /// Font setup.
    pub fonts: FontsConfig,
}

impl SessionManifest {
    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EditorResult<Self> {
        let manifest: Self = serde_json::from_reader(r)
            .map_err(|e| EditorError::serde(format!("parse session manifest JSON: {e}")))?;
        manifest.style.validate()?;
        manifest.compositor.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditorError::validation(format!("open session manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Build the font registry, resolving relative paths against `base_dir`.
    pub fn font_registry(&self, base_dir: &Path) -> EditorResult<FontRegistry> {
        let mut reg = match &self.fonts.catalog_dir {
            Some(dir) => FontRegistry::from_catalog_dir(base_dir.join(dir))?,
            None => FontRegistry::new(),
        };
        for fam in &self.fonts.families {
            let mut family = FontFamily::new(
                fam.id.clone(),
                fam.name.clone().unwrap_or_else(|| fam.id.to_string()),
            );
            for (weight, path) in &fam.faces {
                family = family.with_face(
                    FontWeight::new(*weight)?,
                    FontSource::Path(base_dir.join(path)),
                );
            }
            reg.register(family)?;
        }
        Ok(reg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/manifest.rs"]
mod tests;
