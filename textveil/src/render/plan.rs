use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Canvas, Point, Rect, Size};
use crate::layers::resolver::{LayerKind, LayerResolver, LoadState};
use crate::render::compositor::CompositorOpts;
use crate::render::frame::{FrameLayout, TextNodeLayout};
use crate::style::color::NormalizedColor;
use crate::style::document::StyleDocument;
use crate::text::layout::ShapedText;

/// Stacking slot of a draw op, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Slot {
    Background,
    Overlay,
    Text,
    Subject,
}

#[derive(Clone, Debug)]
pub(crate) enum DrawOp {
    Image {
        layer: LayerKind,
        generation: u64,
        image: Arc<PreparedImage>,
        dest: Rect,
    },
    Fill {
        rect: Rect,
        color: NormalizedColor,
    },
    Text {
        transform: Affine,
        size: Size,
        padding: f64,
        fill: NormalizedColor,
        color: NormalizedColor,
        opacity: f32,
        shaped: ShapedText,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct PlannedOp {
    pub(crate) slot: Slot,
    pub(crate) op: DrawOp,
}

/// Backend-agnostic description of one frame.
///
/// The background group is rasterized on its own so brightness/contrast touch nothing else;
/// the foreground group is composited over it.
#[derive(Clone, Debug)]
pub(crate) struct FramePlan {
    pub(crate) pixel_canvas: Canvas,
    pub(crate) scale: f64,
    pub(crate) background: Vec<PlannedOp>,
    pub(crate) background_filter: Vec<[f32; 20]>,
    pub(crate) foreground: Vec<PlannedOp>,
}

impl FramePlan {
    #[cfg(test)]
    pub(crate) fn slots(&self) -> Vec<Slot> {
        self.background
            .iter()
            .chain(&self.foreground)
            .map(|p| p.slot)
            .collect()
    }
}

pub(crate) struct PlanInputs<'a> {
    pub(crate) doc: &'a StyleDocument,
    pub(crate) background: &'a LayerResolver,
    pub(crate) subject: &'a LayerResolver,
    pub(crate) text: Option<&'a ShapedText>,
    pub(crate) text_color: NormalizedColor,
    pub(crate) fill_color: NormalizedColor,
    pub(crate) opts: &'a CompositorOpts,
    pub(crate) scale: f64,
}

/// Logical frame size: the subject's natural size, else the background's, else the default.
pub(crate) fn frame_canvas(
    background: &LayerResolver,
    subject: &LayerResolver,
    opts: &CompositorOpts,
) -> Canvas {
    subject
        .natural_size()
        .or_else(|| background.natural_size())
        .unwrap_or_else(|| Canvas::square(opts.default_frame_px))
        .fit_within(opts.max_frame_px)
}

/// Scale `natural` to cover `canvas`, centered.
pub(crate) fn cover_rect(canvas: Canvas, natural: Canvas) -> Rect {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let iw = f64::from(natural.width.max(1));
    let ih = f64::from(natural.height.max(1));
    let s = (cw / iw).max(ch / ih);
    let (w, h) = (iw * s, ih * s);
    Rect::from_origin_size(Point::new((cw - w) / 2.0, (ch - h) / 2.0), Size::new(w, h))
}

pub(crate) fn text_node_layout(
    canvas: Canvas,
    doc: &StyleDocument,
    text_size: Size,
    padding: f64,
) -> TextNodeLayout {
    TextNodeLayout {
        center: Point::new(
            doc.position.x / 100.0 * f64::from(canvas.width),
            doc.position.y / 100.0 * f64::from(canvas.height),
        ),
        size: Size::new(
            text_size.width + 2.0 * padding,
            text_size.height + 2.0 * padding,
        ),
        text_size,
        padding,
        rotation_deg: doc.rotation,
    }
}

/// `brightness(b) contrast(c)` as color matrices, applied in order with clamping between them.
///
/// Empty when both are the identity.
pub(crate) fn filter_chain(brightness: f64, contrast: f64) -> Vec<[f32; 20]> {
    let mut chain = Vec::new();
    if brightness != 1.0 {
        chain.push(linear_matrix(brightness as f32, 0.0));
    }
    if contrast != 1.0 {
        chain.push(linear_matrix(contrast as f32, (0.5 * (1.0 - contrast)) as f32));
    }
    chain
}

// Same slope and intercept on r, g and b; alpha untouched.
fn linear_matrix(slope: f32, intercept: f32) -> [f32; 20] {
    #[rustfmt::skip]
    let m = [
        slope, 0.0, 0.0, 0.0, intercept,
        0.0, slope, 0.0, 0.0, intercept,
        0.0, 0.0, slope, 0.0, intercept,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ];
    m
}

pub(crate) fn build_frame(inputs: &PlanInputs<'_>) -> (FrameLayout, FramePlan) {
    let opts = inputs.opts;
    let canvas = frame_canvas(inputs.background, inputs.subject, opts);
    let full = canvas.rect();

    let mut layout = FrameLayout {
        canvas,
        background: None,
        subject: None,
        text: None,
    };
    let mut background = Vec::new();
    let mut foreground = Vec::new();
    let mut background_filter = Vec::new();

    if let Some(op) = layer_op(inputs.background, canvas, opts, &mut layout.background) {
        if matches!(op, DrawOp::Image { .. }) {
            background_filter = filter_chain(inputs.doc.brightness, inputs.doc.contrast);
        }
        background.push(PlannedOp {
            slot: Slot::Background,
            op,
        });
        if inputs.doc.overlay && layout.background.is_some() {
            let [r, g, b, a] = opts.overlay_rgba;
            foreground.push(PlannedOp {
                slot: Slot::Overlay,
                op: DrawOp::Fill {
                    rect: full,
                    color: NormalizedColor::rgba(r, g, b, a),
                },
            });
        }
    }

    if let Some(shaped) = inputs.text {
        let node = text_node_layout(
            canvas,
            inputs.doc,
            Size::new(f64::from(shaped.width), f64::from(shaped.height)),
            opts.text_padding_px,
        );
        layout.text = Some(node);
        if inputs.doc.opacity > 0.0 {
            foreground.push(PlannedOp {
                slot: Slot::Text,
                op: DrawOp::Text {
                    transform: node.transform(),
                    size: node.size,
                    padding: node.padding,
                    fill: inputs.fill_color,
                    color: inputs.text_color,
                    opacity: inputs.doc.opacity as f32,
                    shaped: shaped.clone(),
                },
            });
        }
    }

    if let Some(op) = layer_op(inputs.subject, canvas, opts, &mut layout.subject) {
        foreground.push(PlannedOp {
            slot: Slot::Subject,
            op,
        });
    }

    let plan = FramePlan {
        pixel_canvas: canvas.scaled(inputs.scale),
        scale: inputs.scale,
        background,
        background_filter,
        foreground,
    };
    (layout, plan)
}

fn layer_op(
    layer: &LayerResolver,
    canvas: Canvas,
    opts: &CompositorOpts,
    dest_out: &mut Option<Rect>,
) -> Option<DrawOp> {
    match (layer.state(), layer.image()) {
        (LoadState::Ready, Some(image)) => {
            let natural = Canvas {
                width: image.width,
                height: image.height,
            };
            let dest = cover_rect(canvas, natural);
            *dest_out = Some(dest);
            Some(DrawOp::Image {
                layer: layer.kind(),
                generation: layer.generation(),
                image: image.clone(),
                dest,
            })
        }
        (LoadState::Failed(_), _) => {
            let [r, g, b, a] = opts.placeholder_rgba;
            Some(DrawOp::Fill {
                rect: canvas.rect(),
                color: NormalizedColor::rgba(r, g, b, a),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
