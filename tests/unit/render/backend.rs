use std::sync::Arc;

use super::*;
use crate::{
    assets::store::AssetKind,
    compose::plan::TextPlacement,
    foundation::error::SunflowerError,
};

#[derive(Default)]
struct MockSurface {
    calls: Vec<String>,
    canvas: Option<Canvas>,
}

impl DrawSurface for MockSurface {
    fn begin_frame(&mut self, canvas: Canvas) -> SunflowerResult<()> {
        self.calls.push("begin".to_owned());
        self.canvas = Some(canvas);
        Ok(())
    }

    fn clear(&mut self, _color: Rgba8) -> SunflowerResult<()> {
        self.calls.push("clear".to_owned());
        Ok(())
    }

    fn draw_image_region(
        &mut self,
        image: &PreparedImage,
        _src: Rect,
        _dst: Rect,
    ) -> SunflowerResult<()> {
        self.calls
            .push(format!("region {}x{}", image.width, image.height));
        Ok(())
    }

    fn draw_image_transformed(
        &mut self,
        image: &PreparedImage,
        _transform: Affine,
        opacity: f32,
    ) -> SunflowerResult<()> {
        self.calls.push(format!(
            "transformed {}x{} @{opacity}",
            image.width, image.height
        ));
        Ok(())
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) -> SunflowerResult<()> {
        self.calls.push("fill_rect".to_owned());
        Ok(())
    }

    fn draw_text(&mut self, text: &TextOp) -> SunflowerResult<()> {
        self.calls.push(format!("text {}", text.text));
        Ok(())
    }

    fn finish_frame(&mut self) -> SunflowerResult<FrameRGBA> {
        self.calls.push("finish".to_owned());
        let canvas = self
            .canvas
            .ok_or_else(|| SunflowerError::render("finish before begin"))?;
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; (canvas.width * canvas.height * 4) as usize],
            premultiplied: true,
        })
    }
}

fn assets() -> AssetSet {
    AssetSet::from_fn(|kind| {
        let side = 1 + AssetKind::ALL.iter().position(|k| *k == kind).unwrap() as u32;
        Ok(PreparedImage {
            width: side,
            height: side,
            rgba8_premul: Arc::new(vec![0; (side * side * 4) as usize]),
        })
    })
    .unwrap()
}

#[test]
fn execute_plan_replays_ops_in_order_and_resolves_assets() {
    let canvas = Canvas {
        width: 4,
        height: 3,
    };
    let mut plan = FramePlan::new(canvas);
    plan.push(DrawOp::Clear {
        color: Rgba8::WHITE,
    });
    plan.push(DrawOp::ImageRegion {
        asset: AssetKind::Stem,
        src: Rect::new(0.0, 0.0, 1.0, 1.0),
        dst: Rect::new(0.0, 0.0, 1.0, 1.0),
    });
    plan.push(DrawOp::ImageTransformed {
        asset: AssetKind::Photo,
        transform: Affine::IDENTITY,
        opacity: 0.5,
    });
    plan.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        color: Rgba8::LIGHT_GRAY,
    });
    plan.push(DrawOp::Text(TextOp {
        text: "hi".to_owned(),
        bounds: Rect::new(0.0, 0.0, 4.0, 3.0),
        size_px: 40.0,
        color: Rgba8::BLACK,
        placement: TextPlacement::Centered,
    }));

    let mut surface = MockSurface::default();
    let frame = execute_plan(&mut surface, &plan, &assets()).unwrap();

    assert_eq!(
        surface.calls,
        vec![
            "begin",
            "clear",
            "region 4x4",
            "transformed 7x7 @0.5",
            "fill_rect",
            "text hi",
            "finish",
        ]
    );
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(frame.pixel(3, 2), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(4, 0), None);
}

#[test]
fn execute_plan_rejects_empty_canvas() {
    let plan = FramePlan::new(Canvas {
        width: 0,
        height: 3,
    });
    let mut surface = MockSurface::default();
    let err = execute_plan(&mut surface, &plan, &assets()).unwrap_err();
    assert!(matches!(err, SunflowerError::Validation(_)));
    assert!(surface.calls.is_empty());
}
