//! Font catalog and face loading.
//!
//! Families declare the weights they ship. A face is only usable for final output once its
//! bytes are loaded; previews may borrow any loaded face in the meantime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{EditorError, EditorResult};
use crate::style::document::{FontId, FontWeight, StyleDocument};

/// Where a face's bytes come from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// Font file on disk, read on first use.
    Path(PathBuf),
    /// Font bytes already in memory.
    Bytes(Arc<Vec<u8>>),
}

/// Catalog entry: one family and the faces it ships per weight.
#[derive(Clone, Debug)]
pub struct FontFamily {
    /// Stable identifier stored in style documents.
    pub id: FontId,
    /// Display name.
    pub name: String,
    /// Face source per supported weight.
    pub faces: BTreeMap<FontWeight, FontSource>,
}

impl FontFamily {
    /// Family with no faces yet.
    pub fn new(id: impl Into<FontId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            faces: BTreeMap::new(),
        }
    }

    /// Add a face for `weight`.
    pub fn with_face(mut self, weight: FontWeight, source: FontSource) -> Self {
        self.faces.insert(weight, source);
        self
    }
}

/// A loaded font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Owning family.
    pub family: FontId,
    /// Weight of this face.
    pub weight: FontWeight,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Registry of font families and loaded faces.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    families: BTreeMap<FontId, FontFamily>,
    loaded: BTreeMap<(FontId, FontWeight), Arc<FontFace>>,
}

impl FontRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a family. Previously loaded faces of that family are forgotten.
    pub fn register(&mut self, family: FontFamily) -> EditorResult<()> {
        if family.faces.is_empty() {
            return Err(EditorError::font(format!(
                "font family {} declares no weights",
                family.id
            )));
        }
        self.loaded.retain(|(id, _), _| *id != family.id);
        self.families.insert(family.id.clone(), family);
        Ok(())
    }

    /// Catalog entry for `id`.
    pub fn family(&self, id: &FontId) -> Option<&FontFamily> {
        self.families.get(id)
    }

    /// `true` when `id` is registered.
    pub fn contains(&self, id: &FontId) -> bool {
        self.families.contains_key(id)
    }

    /// All families, ordered by id.
    pub fn families(&self) -> impl Iterator<Item = &FontFamily> {
        self.families.values()
    }

    /// Weights `id` ships, ascending.
    pub fn supported_weights(&self, id: &FontId) -> EditorResult<Vec<FontWeight>> {
        Ok(self.require(id)?.faces.keys().copied().collect())
    }

    /// Supported weight closest to `requested`; ties resolve to the heavier weight.
    pub fn nearest_weight(&self, id: &FontId, requested: FontWeight) -> EditorResult<FontWeight> {
        let family = self.require(id)?;
        family
            .faces
            .keys()
            .copied()
            .min_by_key(|w| {
                (
                    w.get().abs_diff(requested.get()),
                    std::cmp::Reverse(w.get()),
                )
            })
            .ok_or_else(|| EditorError::font(format!("font family {id} declares no weights")))
    }

    /// `requested` if `id` ships it, otherwise the nearest supported weight.
    pub fn coerce(&self, id: &FontId, requested: FontWeight) -> EditorResult<FontWeight> {
        self.nearest_weight(id, requested)
    }

    /// `true` once the face for `(id, weight)` has been loaded.
    pub fn is_loaded(&self, id: &FontId, weight: FontWeight) -> bool {
        self.loaded.contains_key(&(id.clone(), weight))
    }

    /// Load the face for `(id, weight)`; `weight` must be one the family ships.
    #[tracing::instrument(skip(self), fields(font = %id, weight = %weight))]
    pub fn load(&mut self, id: &FontId, weight: FontWeight) -> EditorResult<Arc<FontFace>> {
        if let Some(face) = self.loaded.get(&(id.clone(), weight)) {
            return Ok(face.clone());
        }
        let source = self.require(id)?.faces.get(&weight).ok_or_else(|| {
            EditorError::font(format!("font family {id} does not ship weight {weight}"))
        })?;
        let bytes = match source {
            FontSource::Bytes(b) => b.clone(),
            FontSource::Path(p) => Arc::new(
                std::fs::read(p)
                    .with_context(|| format!("read font file '{}'", p.display()))?,
            ),
        };
        if bytes.is_empty() {
            return Err(EditorError::font(format!("font file for {id} {weight} is empty")));
        }

        let face = Arc::new(FontFace {
            family: id.clone(),
            weight,
            bytes,
        });
        self.loaded.insert((id.clone(), weight), face.clone());
        tracing::debug!("font face loaded");
        Ok(face)
    }

    /// Load the face `doc` renders with (family plus coerced weight).
    pub fn ensure_ready(&mut self, doc: &StyleDocument) -> EditorResult<Arc<FontFace>> {
        let weight = self.nearest_weight(&doc.font_family, doc.font_weight)?;
        self.load(&doc.font_family, weight)
    }

    /// Loaded face for `(id, weight)`, without triggering a load.
    pub fn face(&self, id: &FontId, weight: FontWeight) -> Option<Arc<FontFace>> {
        self.loaded.get(&(id.clone(), weight)).cloned()
    }

    /// First loaded face in `(id, weight)` order, used while the requested face is loading.
    pub fn fallback_face(&self) -> Option<Arc<FontFace>> {
        self.loaded.values().next().cloned()
    }

    /// Catalog laid out as `<dir>/<font-id>/<weight>.ttf` for the built-in families.
    ///
    /// Families whose directory is missing are skipped; faces are read lazily.
    pub fn from_catalog_dir(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let dir = dir.as_ref();
        let mut reg = Self::new();
        for (id, name, weights) in BUILTIN_CATALOG {
            let family_dir = dir.join(id);
            if !family_dir.is_dir() {
                tracing::debug!(font = id, "font directory missing, skipping");
                continue;
            }
            let mut family = FontFamily::new(*id, *name);
            for w in *weights {
                let path = family_dir.join(format!("{w}.ttf"));
                family = family.with_face(FontWeight::new(*w)?, FontSource::Path(path));
            }
            reg.register(family)?;
        }
        Ok(reg)
    }

    fn require(&self, id: &FontId) -> EditorResult<&FontFamily> {
        self.families
            .get(id)
            .ok_or_else(|| EditorError::font(format!("unknown font family {id}")))
    }
}

/// Built-in families: `(id, display name, weights)`.
pub const BUILTIN_CATALOG: &[(&str, &str, &[u16])] = &[
    ("font-inter", "Inter", &[400, 700]),
    ("font-gabarito", "Gabarito", &[400, 600, 700]),
    ("font-roboto", "Roboto", &[400, 700]),
    ("font-poppins", "Poppins", &[400, 700]),
    ("font-montserrat", "Montserrat", &[400, 600, 700]),
    ("font-playfair", "Playfair Display", &[400, 700]),
    ("font-lora", "Lora", &[400, 700]),
    ("font-bricolage-grotesque", "Bricolage Grotesque", &[200, 300, 400, 500, 600, 700]),
    ("font-dancing-script", "Dancing Script", &[400, 700]),
    ("font-sacramento", "Sacramento", &[400]),
    ("font-patrick_hand", "Patrick Hand", &[400]),
    ("font-caveat", "Caveat", &[400, 700]),
    ("font-pacifico", "Pacifico", &[400]),
    ("font-source-code-pro", "Source Code Pro", &[400, 700]),
    ("font-open_sans", "Open Sans", &[300, 400, 600, 700]),
    ("font-merriweather", "Merriweather", &[300, 400, 700]),
    ("font-nunito", "Nunito", &[400, 600, 700]),
    ("font-raleway", "Raleway", &[300, 400, 700]),
    ("font-quicksand", "Quicksand", &[400, 700]),
    ("font-josefin-sans", "Josefin Sans", &[300, 400, 700]),
    ("font-fira-sans", "Fira Sans", &[400, 600, 700]),
];

#[cfg(test)]
#[path = "../../tests/unit/fonts/registry.rs"]
mod tests;
