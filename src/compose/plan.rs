use crate::{
    assets::store::AssetKind,
    foundation::core::{Affine, Canvas, Rect, Rgba8},
};

/// How a text op is positioned inside its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TextPlacement {
    /// Single block centred horizontally and vertically in the bounds.
    Centered,
    /// Wrapped to the bounds width, lines centred, first line at the top edge.
    WrappedFromTop,
}

/// A block of text to lay out and draw.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextOp {
    /// UTF-8 text; may wrap.
    pub text: String,
    /// Box the text is placed in.
    pub bounds: Rect,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Alignment within `bounds`.
    pub placement: TextPlacement,
}

/// One immediate-mode draw call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum DrawOp {
    /// Fill the whole surface.
    Clear {
        /// Fill color.
        color: Rgba8,
    },
    /// Draw the `src` region of a bitmap stretched into `dst`.
    ImageRegion {
        /// Bitmap to sample.
        asset: AssetKind,
        /// Region in bitmap pixels.
        src: Rect,
        /// Destination in canvas pixels.
        dst: Rect,
    },
    /// Draw a whole bitmap through `transform` at `opacity` in `[0, 1]`.
    ImageTransformed {
        /// Bitmap to draw.
        asset: AssetKind,
        /// Bitmap space to canvas space.
        transform: Affine,
        /// Multiplies the bitmap's alpha.
        opacity: f32,
    },
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// Lay out and draw text.
    Text(TextOp),
}

/// Ordered, back-to-front draw calls for one tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePlan {
    /// Surface size the plan was composed for.
    pub canvas: Canvas,
    /// Draw calls, back to front.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Empty plan for `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            ops: Vec::new(),
        }
    }

    /// Append `op` on top of everything drawn so far.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Bitmaps referenced by the plan, in draw order.
    pub fn assets_drawn(&self) -> impl Iterator<Item = AssetKind> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::ImageRegion { asset, .. } | DrawOp::ImageTransformed { asset, .. } => {
                Some(*asset)
            }
            _ => None,
        })
    }
}
