use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas, Point, Rect, Size};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layers::resolver::LayerKind;
use crate::notice::Notice;
use crate::render::fingerprint::FrameFingerprint;

/// Placement of the text node in logical frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TextNodeLayout {
    /// Center of the node (the rotation pivot).
    pub center: Point,
    /// Node size including padding.
    pub size: Size,
    /// Shaped text size without padding.
    pub text_size: Size,
    /// Padding between the node edge and the text.
    pub padding: f64,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
}

impl TextNodeLayout {
    /// Maps node-local coordinates (origin at the top-left of the padded box) to the frame.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::translate((-self.size.width / 2.0, -self.size.height / 2.0))
    }

    /// Axis-aligned bounds of the rotated node.
    pub fn bounds(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(Rect::from_origin_size(Point::ORIGIN, self.size))
    }
}

/// Where every element of a frame lands, in logical (scale 1) pixels.
///
/// Preview and export are derived from the same layout; an export at scale `s` is this layout
/// multiplied by `s`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameLayout {
    /// Logical frame size.
    pub canvas: Canvas,
    /// Destination rectangle of the background image, when drawn.
    pub background: Option<Rect>,
    /// Destination rectangle of the subject image, when drawn.
    pub subject: Option<Rect>,
    /// Text node placement, when there is text to draw.
    pub text: Option<TextNodeLayout>,
}

/// A fully composited frame.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Pixel scale relative to the logical layout.
    pub scale: f64,
    /// Premultiplied RGBA8, row-major.
    pub data: Vec<u8>,
    /// Logical layout the pixels were drawn from.
    pub layout: FrameLayout,
    /// Recoverable problems encountered while composing.
    pub notices: Vec<Notice>,
    /// `false` when text was drawn with a stand-in face.
    pub fonts_ready: bool,
    /// Identity of the inputs.
    pub fingerprint: FrameFingerprint,
}

impl RenderedFrame {
    /// Premultiplied pixel at `(x, y)`; transparent outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Copy of the pixels with alpha un-premultiplied.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Result of asking the compositor for a frame.
#[derive(Clone, Debug)]
pub enum FrameOutcome {
    /// At least one layer is still loading; nothing was drawn.
    Loading(Vec<LayerKind>),
    /// The frame is complete.
    Rendered(Arc<RenderedFrame>),
}

impl FrameOutcome {
    /// The frame, if rendered.
    pub fn rendered(&self) -> Option<&Arc<RenderedFrame>> {
        match self {
            Self::Rendered(f) => Some(f),
            Self::Loading(_) => None,
        }
    }
}

/// Compositor lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Nothing rendered yet, or the surface is detached.
    Idle,
    /// The last request found pending layers.
    Loading,
    /// A frame for the current inputs is available.
    Rendered,
}
