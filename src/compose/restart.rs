use crate::{
    compose::plan::{DrawOp, TextOp, TextPlacement},
    config::model::TextContent,
    foundation::core::{Canvas, Point, Rect, Rgba8},
};

/// Gap between the canvas edges, the button, and the greeting.
pub const MARGIN_PX: f64 = 20.0;
/// Button width.
pub const BUTTON_WIDTH_PX: f64 = 350.0;
/// Button height.
pub const BUTTON_HEIGHT_PX: f64 = 100.0;
/// Caption and greeting font size.
pub const TEXT_SIZE_PX: f32 = 40.0;
/// Button fill.
pub const BUTTON_COLOR: Rgba8 = Rgba8::LIGHT_GRAY;
/// Caption and greeting color.
pub const TEXT_COLOR: Rgba8 = Rgba8::BLACK;

/// The "start again" button shown once the animation has settled.
///
/// The rectangle is only hit-testable while the control is shown; it is shown on every idle
/// tick and hidden as soon as it is activated or the animation leaves idle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestartControl {
    shown: Option<Rect>,
}

impl RestartControl {
    /// Hidden control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed button rectangle, independent of canvas size.
    pub fn button_rect() -> Rect {
        Rect::new(
            MARGIN_PX,
            MARGIN_PX,
            MARGIN_PX + BUTTON_WIDTH_PX,
            MARGIN_PX + BUTTON_HEIGHT_PX,
        )
    }

    /// Make the button hit-testable and return its rectangle.
    pub fn show(&mut self) -> Rect {
        *self.shown.insert(Self::button_rect())
    }

    /// Stop accepting taps.
    pub fn hide(&mut self) {
        self.shown = None;
    }

    /// Whether a tap on the button would be accepted.
    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    /// Rectangle last written by the compositor, if the control is shown.
    pub fn rect(&self) -> Option<Rect> {
        self.shown
    }

    /// Whether `p` activates the control. Edges follow `[x0, x1) × [y0, y1)`.
    pub fn hit_test(&self, p: Point) -> bool {
        self.shown.is_some_and(|r| r.contains(p))
    }

    /// Button, caption and greeting draw calls.
    pub fn draw_ops(rect: Rect, canvas: Canvas, text: &TextContent) -> [DrawOp; 3] {
        let greeting_top = rect.y1 + MARGIN_PX;
        let greeting_width = (canvas.width_f64() - 2.0 * MARGIN_PX).max(0.0);
        let greeting_left = (canvas.width_f64() - greeting_width) / 2.0;
        let greeting_bounds = Rect::new(
            greeting_left,
            greeting_top,
            greeting_left + greeting_width,
            canvas.height_f64().max(greeting_top),
        );

        [
            DrawOp::FillRect {
                rect,
                color: BUTTON_COLOR,
            },
            DrawOp::Text(TextOp {
                text: text.caption.clone(),
                bounds: rect,
                size_px: TEXT_SIZE_PX,
                color: TEXT_COLOR,
                placement: TextPlacement::Centered,
            }),
            DrawOp::Text(TextOp {
                text: text.greeting.clone(),
                bounds: greeting_bounds,
                size_px: TEXT_SIZE_PX,
                color: TEXT_COLOR,
                placement: TextPlacement::WrappedFromTop,
            }),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/restart.rs"]
mod tests;
