use std::sync::Arc;

use crate::fonts::registry::{FontFace, FontRegistry};
use crate::foundation::error::{EditorError, EditorResult};
use crate::layers::fetch::ImageFetcher;
use crate::layers::resolver::{LayerKind, LayerResolver, LoadState, LoadTicket, decode_fetched};
use crate::notice::{ColorField, Notice};
use crate::render::cpu::CpuRasterizer;
use crate::render::fingerprint::{FrameKeyInputs, fingerprint_frame};
use crate::render::frame::{FrameOutcome, FrameState, RenderedFrame};
use crate::render::plan::{PlanInputs, build_frame};
use crate::style::color::{ColorNormalizer, CssColorNormalizer, resolve_color};
use crate::style::document::StyleDocument;
use crate::text::layout::{TextBrushRgba8, TextLayoutEngine};

/// Compositor configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorOpts {
    /// Square frame edge used when no layer has a natural size.
    pub default_frame_px: u32,
    /// Longest logical frame edge; larger images are scaled down.
    pub max_frame_px: u32,
    /// Padding between the text-node edge and the text.
    pub text_padding_px: f64,
    /// Straight RGBA drawn over the background when the overlay is on.
    pub overlay_rgba: [u8; 4],
    /// Straight RGBA drawn in place of a layer that failed to load.
    pub placeholder_rgba: [u8; 4],
    /// Largest accepted pixel scale.
    pub max_scale: f64,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            default_frame_px: 1080,
            max_frame_px: 4096,
            text_padding_px: 10.0,
            overlay_rgba: [0, 0, 0, 77],
            placeholder_rgba: [128, 128, 128, 64],
            max_scale: 8.0,
        }
    }
}

impl CompositorOpts {
    /// Check ranges.
    pub fn validate(&self) -> EditorResult<()> {
        if self.default_frame_px == 0 || self.max_frame_px == 0 {
            return Err(EditorError::validation("frame sizes must be > 0"));
        }
        if !self.text_padding_px.is_finite() || self.text_padding_px < 0.0 {
            return Err(EditorError::validation(
                "text_padding_px must be finite and >= 0",
            ));
        }
        if !self.max_scale.is_finite() || self.max_scale <= 0.0 {
            return Err(EditorError::validation("max_scale must be finite and > 0"));
        }
        Ok(())
    }
}

/// Turns a [`StyleDocument`] plus two image layers into pixels.
///
/// Layers stack background, text, subject. The same layout feeds previews (scale 1) and exports
/// (any scale), and repeated requests for unchanged inputs return the memoized frame.
pub struct Compositor {
    opts: CompositorOpts,
    fonts: FontRegistry,
    normalizer: Box<dyn ColorNormalizer>,
    background: LayerResolver,
    subject: LayerResolver,
    text_engine: TextLayoutEngine,
    raster: CpuRasterizer,
    memo: Option<Arc<RenderedFrame>>,
    state: FrameState,
    attached: bool,
}

impl Compositor {
    /// New compositor with empty layers and the CSS color normalizer.
    pub fn new(opts: CompositorOpts, fonts: FontRegistry) -> EditorResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            fonts,
            normalizer: Box::new(CssColorNormalizer),
            background: LayerResolver::new(LayerKind::Background),
            subject: LayerResolver::new(LayerKind::Subject),
            text_engine: TextLayoutEngine::new(),
            raster: CpuRasterizer::new(),
            memo: None,
            state: FrameState::Idle,
            attached: true,
        })
    }

    /// Replace the color normalizer.
    pub fn with_normalizer(mut self, normalizer: impl ColorNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self.memo = None;
        self
    }

    /// Configuration in use.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Font registry.
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Mutable font registry (register or load faces).
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    /// Resolver for `kind`.
    pub fn layer(&self, kind: LayerKind) -> &LayerResolver {
        match kind {
            LayerKind::Background => &self.background,
            LayerKind::Subject => &self.subject,
        }
    }

    fn layer_mut(&mut self, kind: LayerKind) -> &mut LayerResolver {
        match kind {
            LayerKind::Background => &mut self.background,
            LayerKind::Subject => &mut self.subject,
        }
    }

    /// Point a layer at a new source; see [`LayerResolver::set_source`].
    pub fn set_layer_source(
        &mut self,
        kind: LayerKind,
        source: Option<String>,
    ) -> Option<LoadTicket> {
        self.layer_mut(kind).set_source(source)
    }

    /// Deliver a fetch result; returns `false` for stale tickets.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<u8>, crate::layers::resolver::LayerLoadError>,
    ) -> bool {
        self.layer_mut(ticket.kind).complete(ticket, result)
    }

    /// Tickets of all outstanding loads, background first.
    pub fn pending_tickets(&self) -> Vec<LoadTicket> {
        [&self.background, &self.subject]
            .into_iter()
            .filter_map(LayerResolver::pending_ticket)
            .collect()
    }

    /// Fetch and decode every pending layer concurrently. Returns the number of layers settled.
    ///
    /// One layer failing never blocks the other.
    #[tracing::instrument(skip_all)]
    pub fn resolve_pending(&mut self, fetcher: &dyn ImageFetcher) -> usize {
        let bg_ticket = self.background.pending_ticket();
        let subject_ticket = self.subject.pending_ticket();
        let load = |t: &Option<LoadTicket>| {
            t.as_ref()
                .map(|t| decode_fetched(fetcher.fetch(&t.source)))
        };
        let (bg_result, subject_result) =
            rayon::join(|| load(&bg_ticket), || load(&subject_ticket));

        let mut settled = 0;
        if let (Some(t), Some(r)) = (&bg_ticket, bg_result) {
            settled += usize::from(self.background.complete_decoded(t, r));
        }
        if let (Some(t), Some(r)) = (&subject_ticket, subject_result) {
            settled += usize::from(self.subject.complete_decoded(t, r));
        }
        settled
    }

    /// Tear down the render surface; renders fail until it is attached again.
    pub fn detach_surface(&mut self) {
        self.attached = false;
        self.memo = None;
        self.state = FrameState::Idle;
    }

    /// Re-attach the render surface.
    pub fn attach_surface(&mut self) {
        self.attached = true;
    }

    /// `true` while renders can run.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Lifecycle state after the latest request.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Render the preview (scale 1).
    pub fn render(&mut self, doc: &StyleDocument) -> EditorResult<FrameOutcome> {
        self.render_scaled(doc, 1.0)
    }

    /// Render at `scale` pixels per logical pixel.
    #[tracing::instrument(level = "debug", skip(self, doc))]
    pub fn render_scaled(&mut self, doc: &StyleDocument, scale: f64) -> EditorResult<FrameOutcome> {
        if !self.attached {
            return Err(EditorError::preview_unavailable("render surface is detached"));
        }
        if !scale.is_finite() || scale <= 0.0 || scale > self.opts.max_scale {
            return Err(EditorError::validation(format!(
                "scale must be in (0, {}], got {scale}",
                self.opts.max_scale
            )));
        }
        doc.validate()?;

        let pending: Vec<LayerKind> = [&self.background, &self.subject]
            .into_iter()
            .filter(|l| l.state().is_pending())
            .map(LayerResolver::kind)
            .collect();
        if !pending.is_empty() {
            self.state = FrameState::Loading;
            return Ok(FrameOutcome::Loading(pending));
        }

        let mut notices = Vec::new();
        let text = doc.normalized_text();
        let (face, fonts_ready) = if text.is_empty() {
            (None, true)
        } else {
            self.resolve_face(doc, &mut notices)
        };

        let fingerprint = fingerprint_frame(&FrameKeyInputs {
            doc,
            background: &self.background,
            subject: &self.subject,
            face: face.as_deref(),
            scale,
        });
        if let Some(frame) = self.memo.as_ref().filter(|f| f.fingerprint == fingerprint) {
            tracing::trace!(%fingerprint, "frame memo hit");
            self.state = FrameState::Rendered;
            return Ok(FrameOutcome::Rendered(frame.clone()));
        }

        let (text_color, n) = resolve_color(&*self.normalizer, ColorField::Text, &doc.text_color);
        notices.extend(n);
        let (fill_color, n) =
            resolve_color(&*self.normalizer, ColorField::Fill, &doc.background_color);
        notices.extend(n);
        for layer in [&self.background, &self.subject] {
            if let LoadState::Failed(err) = layer.state() {
                notices.push(Notice::LayerLoadFailed {
                    layer: layer.kind(),
                    reason: err.to_string(),
                });
            }
        }

        let shaped = match &face {
            Some(face) => Some(self.text_engine.layout_line(
                &text,
                face,
                doc.font_size as f32,
                TextBrushRgba8::from(text_color),
            )?),
            None => None,
        };

        let (layout, plan) = build_frame(&PlanInputs {
            doc,
            background: &self.background,
            subject: &self.subject,
            text: shaped.as_ref(),
            text_color,
            fill_color,
            opts: &self.opts,
            scale,
        });
        let data = self.raster.render(&plan)?;
        self.raster.retain_images(&[
            (LayerKind::Background, self.background.generation()),
            (LayerKind::Subject, self.subject.generation()),
        ]);

        let frame = Arc::new(RenderedFrame {
            width: plan.pixel_canvas.width,
            height: plan.pixel_canvas.height,
            scale,
            data,
            layout,
            notices,
            fonts_ready,
            fingerprint,
        });
        tracing::debug!(%fingerprint, w = frame.width, h = frame.height, "frame rendered");
        self.memo = Some(frame.clone());
        self.state = FrameState::Rendered;
        Ok(FrameOutcome::Rendered(frame))
    }

    fn resolve_face(
        &self,
        doc: &StyleDocument,
        notices: &mut Vec<Notice>,
    ) -> (Option<Arc<FontFace>>, bool) {
        let wanted = self
            .fonts
            .nearest_weight(&doc.font_family, doc.font_weight)
            .ok()
            .and_then(|w| self.fonts.face(&doc.font_family, w));
        match wanted {
            Some(face) => (Some(face), true),
            None => {
                notices.push(Notice::FontFallback {
                    font: doc.font_family.clone(),
                    weight: doc.font_weight,
                });
                (self.fonts.fallback_face(), false)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
