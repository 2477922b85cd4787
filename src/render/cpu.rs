use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    assets::store::PreparedImage,
    assets::text::{PreparedText, TextAlign, TextLayoutEngine},
    compose::plan::{TextOp, TextPlacement},
    foundation::core::{Affine, Canvas, Rect, Rgba8, Vec2},
    foundation::error::{SunflowerError, SunflowerResult},
    render::backend::{DrawSurface, FrameRGBA},
};

/// Transforms whose determinant falls below this draw nothing.
const MIN_DETERMINANT: f64 = 1e-12;

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    // Keeps the source buffer alive so its address stays a valid cache key.
    _source: Arc<Vec<u8>>,
}

#[derive(Clone)]
struct FontPaint {
    bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u32,
    color: [u8; 4],
    placement: TextPlacement,
    width_bits: u64,
}

/// CPU draw surface powered by `vello_cpu`.
///
/// Text ops are skipped when no font has been supplied.
pub struct CpuSurface {
    canvas: Option<Canvas>,
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<(usize, u32, u32), ImagePaint>,
    font: Option<FontPaint>,
    text_engine: TextLayoutEngine,
    text_cache: HashMap<TextKey, PreparedText>,
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSurface {
    /// Surface without a font.
    pub fn new() -> Self {
        Self {
            canvas: None,
            ctx: None,
            image_cache: HashMap::new(),
            font: None,
            text_engine: TextLayoutEngine::new(),
            text_cache: HashMap::new(),
        }
    }

    /// Use `font_bytes` (TTF/OTF) for every text op.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> Self {
        let bytes = Arc::new(font_bytes);
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        self.font = Some(FontPaint { bytes, font });
        self.text_cache.clear();
        self
    }

    /// Whether text ops will be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn ctx(&mut self) -> SunflowerResult<&mut vello_cpu::RenderContext> {
        self.ctx
            .as_mut()
            .ok_or_else(|| SunflowerError::render("draw call outside begin_frame/finish_frame"))
    }

    fn image_paint_for(&mut self, image: &PreparedImage) -> SunflowerResult<vello_cpu::Image> {
        let key = (
            Arc::as_ptr(&image.rgba8_premul) as usize,
            image.width,
            image.height,
        );
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(
            key,
            ImagePaint {
                paint: paint.clone(),
                _source: Arc::clone(&image.rgba8_premul),
            },
        );
        Ok(paint)
    }

    fn prepared_text_for(&mut self, op: &TextOp) -> SunflowerResult<Option<PreparedText>> {
        let Some(font) = &self.font else {
            return Ok(None);
        };
        let max_width = match op.placement {
            TextPlacement::Centered => None,
            TextPlacement::WrappedFromTop => Some(op.bounds.width() as f32),
        };
        let key = TextKey {
            text: op.text.clone(),
            size_bits: op.size_px.to_bits(),
            color: op.color.to_array(),
            placement: op.placement,
            width_bits: op.bounds.width().to_bits(),
        };
        if let Some(t) = self.text_cache.get(&key) {
            return Ok(Some(t.clone()));
        }

        let align = match op.placement {
            TextPlacement::Centered => TextAlign::Start,
            TextPlacement::WrappedFromTop => TextAlign::Center,
        };
        let prepared = self.text_engine.prepare(
            &op.text,
            Arc::clone(&font.bytes),
            op.size_px,
            op.color,
            max_width,
            align,
        )?;
        self.text_cache.insert(key, prepared.clone());
        Ok(Some(prepared))
    }

    fn draw_image(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
        clip: Rect,
        opacity: f32,
    ) -> SunflowerResult<()> {
        if opacity <= 0.0 || transform.determinant().abs() < MIN_DETERMINANT {
            return Ok(());
        }
        let paint = self.image_paint_for(image)?;
        let ctx = self.ctx()?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&rect_to_cpu(clip));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }
}

impl DrawSurface for CpuSurface {
    fn begin_frame(&mut self, canvas: Canvas) -> SunflowerResult<()> {
        let (w, h) = canvas_to_u16(canvas)?;
        match self.ctx.as_mut() {
            Some(ctx) if self.canvas == Some(canvas) => ctx.reset(),
            _ => self.ctx = Some(vello_cpu::RenderContext::new(w, h)),
        }
        self.canvas = Some(canvas);
        Ok(())
    }

    fn clear(&mut self, color: Rgba8) -> SunflowerResult<()> {
        let canvas = self
            .canvas
            .ok_or_else(|| SunflowerError::render("clear before begin_frame"))?;
        self.fill_rect(
            Rect::new(0.0, 0.0, canvas.width_f64(), canvas.height_f64()),
            color,
        )
    }

    fn draw_image_region(
        &mut self,
        image: &PreparedImage,
        src: Rect,
        dst: Rect,
    ) -> SunflowerResult<()> {
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0
        {
            return Ok(());
        }
        let transform = Affine::translate(Vec2::new(dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate(Vec2::new(-src.x0, -src.y0));
        self.draw_image(image, transform, src, 1.0)
    }

    fn draw_image_transformed(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
        opacity: f32,
    ) -> SunflowerResult<()> {
        let bounds = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
        self.draw_image(image, transform, bounds, opacity.clamp(0.0, 1.0))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> SunflowerResult<()> {
        let ctx = self.ctx()?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        ctx.fill_rect(&rect_to_cpu(rect));
        Ok(())
    }

    fn draw_text(&mut self, op: &TextOp) -> SunflowerResult<()> {
        let Some(prepared) = self.prepared_text_for(op)? else {
            tracing::trace!(text = %op.text, "no font configured, skipping text");
            return Ok(());
        };
        let Some(font) = self.font.as_ref().map(|f| f.font.clone()) else {
            return Ok(());
        };

        let origin = match op.placement {
            TextPlacement::Centered => Vec2::new(
                op.bounds.x0 + (op.bounds.width() - prepared.width()) / 2.0,
                op.bounds.y0 + (op.bounds.height() - prepared.height()) / 2.0,
            ),
            TextPlacement::WrappedFromTop => Vec2::new(op.bounds.x0, op.bounds.y0),
        };

        let ctx = self.ctx()?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(Affine::translate(origin)));
        for line in prepared.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn finish_frame(&mut self) -> SunflowerResult<FrameRGBA> {
        let canvas = self
            .canvas
            .ok_or_else(|| SunflowerError::render("finish_frame before begin_frame"))?;
        let (w, h) = canvas_to_u16(canvas)?;
        let ctx = self.ctx()?;
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn canvas_to_u16(canvas: Canvas) -> SunflowerResult<(u16, u16)> {
    canvas.validate()?;
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SunflowerError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SunflowerError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SunflowerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SunflowerError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SunflowerError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SunflowerError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
