use std::collections::HashMap;
use std::sync::Arc;

use crate::fonts::registry::FontFace;
use crate::foundation::error::{EditorError, EditorResult};
use crate::style::color::NormalizedColor;
use crate::style::document::{FontId, FontWeight};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<NormalizedColor> for TextBrushRgba8 {
    fn from(c: NormalizedColor) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Single-line text shaped with one concrete face.
#[derive(Clone)]
pub(crate) struct ShapedText {
    pub(crate) layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) face: Arc<FontFace>,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl std::fmt::Debug for ShapedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedText")
            .field("family", &self.face.family)
            .field("weight", &self.face.weight)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

struct FaceContext {
    font_ctx: parley::FontContext,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Stateful helper for shaping text with registry faces.
///
/// Each face gets its own font collection holding only that face, so the face parley shapes
/// with is the face the rasterizer paints with.
pub(crate) struct TextLayoutEngine {
    faces: HashMap<(FontId, FontWeight), FaceContext>,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            faces: HashMap::new(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on a single line (no wrapping).
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        face: &Arc<FontFace>,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> EditorResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(EditorError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let key = (face.family.clone(), face.weight);
        if !self.faces.contains_key(&key) {
            let ctx = Self::face_context(face)?;
            self.faces.insert(key.clone(), ctx);
        }
        let face_ctx = self
            .faces
            .get_mut(&key)
            .ok_or_else(|| EditorError::font("face context missing after insert"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face_ctx.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(
                face_ctx.family_name.clone(),
            )),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight.get())),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let width = layout.width();
        let height = layout.height();
        Ok(ShapedText {
            layout: Arc::new(layout),
            font: face_ctx.font.clone(),
            face: face.clone(),
            width,
            height,
        })
    }

    fn face_context(face: &FontFace) -> EditorResult<FaceContext> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            EditorError::font(format!(
                "no font families registered from {} {} bytes",
                face.family, face.weight
            ))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| EditorError::font("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.to_vec()),
            0,
        );
        Ok(FaceContext {
            font_ctx,
            family_name,
            font,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
