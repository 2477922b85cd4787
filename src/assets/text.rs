use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SunflowerError, SunflowerResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Horizontal alignment of lines inside the layout width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Lines start at the left edge.
    Start,
    /// Lines are centred inside the wrap width.
    Center,
}

#[derive(Clone)]
/// Shaped text layout plus the font bytes needed to rasterize its glyphs.
pub struct PreparedText {
    /// Fully built text layout ready for rendering.
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    /// Original font bytes used to build glyph outlines.
    pub font_bytes: Arc<Vec<u8>>,
}

impl PreparedText {
    /// Laid-out width in pixels.
    pub fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    /// Laid-out height in pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .field("font_bytes_len", &self.font_bytes.len())
            .finish()
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out plain text using provided font bytes and styling.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
        align: TextAlign,
    ) -> SunflowerResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SunflowerError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SunflowerError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SunflowerError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        let alignment = match align {
            TextAlign::Start => parley::Alignment::Start,
            TextAlign::Center => parley::Alignment::Center,
        };
        layout.align(max_width_px, alignment, parley::AlignmentOptions::default());

        Ok(layout)
    }

    /// Lay out `text` and bundle it with its font bytes.
    pub fn prepare(
        &mut self,
        text: &str,
        font_bytes: Arc<Vec<u8>>,
        size_px: f32,
        color: Rgba8,
        max_width_px: Option<f32>,
        align: TextAlign,
    ) -> SunflowerResult<PreparedText> {
        let layout = self.layout_plain(
            text,
            font_bytes.as_slice(),
            size_px,
            color.into(),
            max_width_px,
            align,
        )?;
        Ok(PreparedText {
            layout: Arc::new(layout),
            font_bytes,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
