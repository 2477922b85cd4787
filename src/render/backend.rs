use crate::{
    assets::store::{AssetSet, PreparedImage},
    compose::plan::{DrawOp, FramePlan, TextOp},
    foundation::core::{Affine, Canvas, Rect, Rgba8},
    foundation::error::SunflowerResult,
};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Bytes of the pixel at `(x, y)`, if it lies inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Immediate-mode 2D drawing target.
///
/// Calls arrive back to front between [`DrawSurface::begin_frame`] and
/// [`DrawSurface::finish_frame`].
pub trait DrawSurface {
    /// Start a frame of `canvas` size, discarding any unfinished one.
    fn begin_frame(&mut self, canvas: Canvas) -> SunflowerResult<()>;

    /// Fill the whole frame with `color`.
    fn clear(&mut self, color: Rgba8) -> SunflowerResult<()>;

    /// Draw the `src` region of `image` stretched into `dst`.
    fn draw_image_region(
        &mut self,
        image: &PreparedImage,
        src: Rect,
        dst: Rect,
    ) -> SunflowerResult<()>;

    /// Draw all of `image` through `transform`; image space is `(0, 0)..(width, height)`.
    fn draw_image_transformed(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
        opacity: f32,
    ) -> SunflowerResult<()>;

    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> SunflowerResult<()>;

    /// Lay out and draw `text`. Surfaces without a font may skip it.
    fn draw_text(&mut self, text: &TextOp) -> SunflowerResult<()>;

    /// Read back the pixels drawn since `begin_frame`.
    fn finish_frame(&mut self) -> SunflowerResult<FrameRGBA>;
}

/// Replay `plan` onto `surface` and read back the finished frame.
#[tracing::instrument(skip_all, fields(ops = plan.ops.len()))]
pub fn execute_plan<S: DrawSurface + ?Sized>(
    surface: &mut S,
    plan: &FramePlan,
    assets: &AssetSet,
) -> SunflowerResult<FrameRGBA> {
    plan.canvas.validate()?;
    surface.begin_frame(plan.canvas)?;

    for op in &plan.ops {
        match op {
            DrawOp::Clear { color } => surface.clear(*color)?,
            DrawOp::ImageRegion { asset, src, dst } => {
                surface.draw_image_region(assets.get(*asset), *src, *dst)?
            }
            DrawOp::ImageTransformed {
                asset,
                transform,
                opacity,
            } => surface.draw_image_transformed(assets.get(*asset), *transform, *opacity)?,
            DrawOp::FillRect { rect, color } => surface.fill_rect(*rect, *color)?,
            DrawOp::Text(text) => surface.draw_text(text)?,
        }
    }

    surface.finish_frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
