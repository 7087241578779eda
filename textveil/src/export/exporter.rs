use std::io::Cursor;

use anyhow::Context;
use image::ImageEncoder;

use crate::foundation::error::{EditorError, EditorResult};
use crate::notice::Notice;
use crate::render::compositor::Compositor;
use crate::render::frame::{FrameLayout, FrameOutcome, RenderedFrame};
use crate::style::document::StyleDocument;

/// Output encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, keeps transparency.
    #[default]
    Png,
    /// Lossy, flattened over black.
    Jpeg,
}

impl ExportFormat {
    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    // Extensions a user-supplied file name may already carry.
    fn known_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpeg", "jpg"],
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(EditorError::validation(format!(
                "unknown export format \"{other}\" (expected png or jpeg)"
            ))),
        }
    }
}

/// Export request options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOpts {
    /// Output encoding.
    pub format: ExportFormat,
    /// JPEG quality in `[0.1, 1]`; ignored for PNG.
    pub quality: f64,
    /// Base file name; the extension is added from the format.
    pub file_name: String,
    /// Pixels per logical frame pixel.
    pub scale: f64,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 0.8,
            file_name: "edited-image".to_owned(),
            scale: 1.0,
        }
    }
}

impl ExportOpts {
    /// Clamp quality, and replace an empty or unusable file name with the default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let quality = if self.quality.is_finite() {
            self.quality.clamp(0.1, 1.0)
        } else {
            defaults.quality
        };

        let cleaned: String = self
            .file_name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                c => c,
            })
            .collect();
        let stem = self
            .format
            .known_extensions()
            .iter()
            .find_map(|ext| cleaned.strip_suffix(&format!(".{ext}")))
            .unwrap_or(&cleaned)
            .trim_matches('.')
            .to_owned();
        let file_name = if stem.is_empty() {
            defaults.file_name
        } else {
            stem
        };

        Self {
            format: self.format,
            quality,
            file_name,
            scale: self.scale,
        }
    }

    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.sanitized().quality * 100.0).round() as u8
    }
}

/// Encoded export result.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// File name including extension.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Logical layout the export was drawn from.
    pub layout: FrameLayout,
    /// Notices raised while composing.
    pub notices: Vec<Notice>,
}

/// Produces downloadable images from a compositor.
pub struct Exporter;

impl Exporter {
    /// Load the document's font face, render at `opts.scale`, and encode.
    ///
    /// Fails with [`EditorError::PreviewUnavailable`] when the surface is detached or a layer is
    /// still loading; nothing partial is ever returned.
    #[tracing::instrument(skip(compositor, doc), fields(format = ?opts.format, scale = opts.scale))]
    pub fn export(
        compositor: &mut Compositor,
        doc: &StyleDocument,
        opts: &ExportOpts,
    ) -> EditorResult<ExportedImage> {
        let opts = opts.sanitized();
        if !compositor.is_attached() {
            return Err(EditorError::preview_unavailable(
                "render surface is detached",
            ));
        }
        if !doc.normalized_text().is_empty() {
            compositor.fonts_mut().ensure_ready(doc)?;
        }

        let frame = match compositor.render_scaled(doc, opts.scale)? {
            FrameOutcome::Rendered(frame) => frame,
            FrameOutcome::Loading(pending) => {
                return Err(EditorError::preview_unavailable(format!(
                    "layers still loading: {pending:?}"
                )));
            }
        };
        if !frame.fonts_ready {
            return Err(EditorError::font(format!(
                "font {} ({}) is not ready",
                doc.font_family, doc.font_weight
            )));
        }

        let bytes = encode_frame(&frame, &opts)?;
        tracing::info!(
            w = frame.width,
            h = frame.height,
            bytes = bytes.len(),
            "export encoded"
        );
        Ok(ExportedImage {
            bytes,
            file_name: format!("{}.{}", opts.file_name, opts.format.extension()),
            mime: opts.format.mime(),
            width: frame.width,
            height: frame.height,
            layout: frame.layout.clone(),
            notices: frame.notices.clone(),
        })
    }
}

/// Encode a rendered frame per `opts.format`.
pub fn encode_frame(frame: &RenderedFrame, opts: &ExportOpts) -> EditorResult<Vec<u8>> {
    let mut buf = Vec::new();
    match opts.format {
        ExportFormat::Png => {
            let straight = frame.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(Cursor::new(&mut buf))
                .write_image(
                    &straight,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .context("encode png")?;
        }
        ExportFormat::Jpeg => {
            // Premultiplied color over opaque black is the premultiplied color itself.
            let rgb: Vec<u8> = frame
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut buf),
                opts.jpeg_quality(),
            )
            .write_image(
                &rgb,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgb8,
            )
            .context("encode jpeg")?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
