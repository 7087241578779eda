use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{EditorError, EditorResult};
use crate::foundation::math::mul_div255_u8;
use crate::layers::resolver::LayerKind;
use crate::render::plan::{DrawOp, FramePlan, PlannedOp};
use crate::style::color::NormalizedColor;

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU rasterizer for [`FramePlan`]s.
///
/// Keeps one render context alive across frames of the same size and caches decoded layer
/// pixmaps per `(layer, generation)`.
#[derive(Default)]
pub(crate) struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<(LayerKind, u64), ImagePaint>,
}

impl CpuRasterizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rasterize `plan` into premultiplied RGBA8.
    #[tracing::instrument(level = "debug", skip_all, fields(w = plan.pixel_canvas.width, h = plan.pixel_canvas.height))]
    pub(crate) fn render(&mut self, plan: &FramePlan) -> EditorResult<Vec<u8>> {
        let (w, h) = pixel_dims(plan.pixel_canvas)?;
        let base = Affine::scale(plan.scale);

        let mut out = self.render_group(w, h, base, &plan.background)?;
        for m in &plan.background_filter {
            let src = out.clone();
            color_matrix_rgba8_premul(&src, &mut out, *m);
        }
        if !plan.foreground.is_empty() {
            let fg = self.render_group(w, h, base, &plan.foreground)?;
            premul_over_in_place(&mut out, &fg)?;
        }
        Ok(out)
    }

    /// Forget cached pixmaps of superseded layer generations.
    pub(crate) fn retain_images(&mut self, live: &[(LayerKind, u64)]) {
        self.image_cache.retain(|k, _| live.contains(k));
    }

    fn render_group(
        &mut self,
        width: u16,
        height: u16,
        base: Affine,
        ops: &[PlannedOp],
    ) -> EditorResult<Vec<u8>> {
        if ops.is_empty() {
            return Ok(vec![0; usize::from(width) * usize::from(height) * 4]);
        }
        self.with_ctx_mut(width, height, |this, ctx| {
            for planned in ops {
                this.draw_op(ctx, base, &planned.op)?;
            }
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap.data_as_u8_slice().to_vec())
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        op: &DrawOp,
    ) -> EditorResult<()> {
        match op {
            DrawOp::Image {
                layer,
                generation,
                image,
                dest,
            } => {
                let p = self.image_paint_for(*layer, *generation, image)?;
                let placement = Affine::translate((dest.x0, dest.y0))
                    * Affine::scale_non_uniform(
                        dest.width() / f64::from(p.w),
                        dest.height() / f64::from(p.h),
                    );
                ctx.set_transform(affine_to_cpu(base * placement));
                ctx.set_paint(p.paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(p.w),
                    f64::from(p.h),
                ));
            }
            DrawOp::Fill { rect, color } => {
                if color.is_transparent() {
                    return Ok(());
                }
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_paint(color.to_paint());
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    rect.x0, rect.y0, rect.x1, rect.y1,
                ));
            }
            DrawOp::Text {
                transform,
                size,
                padding,
                fill,
                color,
                opacity,
                shaped,
            } => {
                let tr = base * *transform;
                if *opacity < 1.0 {
                    ctx.push_opacity_layer(*opacity);
                }
                if !fill.is_transparent() {
                    ctx.set_transform(affine_to_cpu(tr));
                    ctx.set_paint(fill.to_paint());
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        size.width,
                        size.height,
                    ));
                }
                if !color.is_transparent() {
                    ctx.set_transform(affine_to_cpu(
                        tr * Affine::translate((*padding, *padding)),
                    ));
                    ctx.set_paint(color.to_paint());
                    draw_glyphs(ctx, shaped);
                }
                if *opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
        }
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        layer: LayerKind,
        generation: u64,
        prepared: &PreparedImage,
    ) -> EditorResult<ImagePaint> {
        if let Some(p) = self.image_cache.get(&(layer, generation)) {
            return Ok(p.clone());
        }
        let pixmap =
            pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let out = ImagePaint {
            paint,
            w: prepared.width,
            h: prepared.height,
        };
        self.image_cache.insert((layer, generation), out.clone());
        Ok(out)
    }
}

// Glyph positions in a run are offsets from a pen that advances along the baseline.
fn draw_glyphs(ctx: &mut vello_cpu::RenderContext, shaped: &crate::text::layout::ShapedText) {
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let mut x = run.offset();
            let y = run.baseline();
            let glyphs: Vec<vello_cpu::Glyph> = run
                .glyphs()
                .map(|g| {
                    let glyph = vello_cpu::Glyph {
                        id: g.id,
                        x: x + g.x,
                        y: y - g.y,
                    };
                    x += g.advance;
                    glyph
                })
                .collect();
            ctx.glyph_run(&shaped.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs.into_iter());
        }
    }
}

fn pixel_dims(canvas: Canvas) -> EditorResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| EditorError::validation("frame width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| EditorError::validation("frame height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> EditorResult<vello_cpu::Pixmap> {
    let canvas = Canvas { width, height };
    let (w, h) = pixel_dims(canvas)?;
    if bytes.len() != canvas.rgba8_len() {
        return Err(EditorError::validation("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

pub(crate) fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: [f32; 20]) {
    debug_assert_eq!(src.len(), dst.len());
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pr = s[0] as f32 / 255.0;
        let pg = s[1] as f32 / 255.0;
        let pb = s[2] as f32 / 255.0;
        let pa = s[3] as f32 / 255.0;

        // Convert premul -> straight for matrix application.
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = pr * inv_a;
        let g = pg * inv_a;
        let b = pb * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        d[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> EditorResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(EditorError::validation(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = s[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
