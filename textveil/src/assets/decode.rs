use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{EditorError, EditorResult};
use crate::foundation::math::premultiply_rgba8_in_place;

// Pixmaps address pixels with u16 edges.
const MAX_EDGE_PX: u32 = u16::MAX as u32;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub(crate) struct PreparedImage {
    /// Natural width in pixels.
    pub(crate) width: u32,
    /// Natural height in pixels.
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

pub(crate) fn decode_image(bytes: &[u8]) -> EditorResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 || width > MAX_EDGE_PX || height > MAX_EDGE_PX {
        return Err(EditorError::validation(format!(
            "image dimensions {width}x{height} out of range"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
