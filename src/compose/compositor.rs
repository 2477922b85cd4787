//! Turns one tick's stage snapshot and geometry into an ordered draw plan.

use crate::{
    animation::state::StageSnapshot,
    assets::store::AssetKind,
    compose::plan::{DrawOp, FramePlan},
    compose::restart::RestartControl,
    config::model::TextContent,
    foundation::core::{Canvas, Rgba8},
    geometry::layout::{SceneGeometry, petal_asset},
};

/// Fixed inputs to every frame that do not depend on time.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStyle {
    /// Color every frame is cleared to.
    pub background: Rgba8,
    /// Button caption and greeting.
    pub text: TextContent,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            text: TextContent::default(),
        }
    }
}

/// Build the draw plan for one tick.
///
/// Draw order, back to front: background, stem, flower head, left leaf, right leaf, petals in
/// sequence order, photo, then the restart control and greeting once idle. The restart
/// control's rectangle is written here on every idle tick and cleared otherwise.
pub fn compose_frame(
    snapshot: &StageSnapshot,
    geometry: &SceneGeometry,
    canvas: Canvas,
    style: &FrameStyle,
    restart: &mut RestartControl,
) -> FramePlan {
    let mut plan = FramePlan::new(canvas);
    plan.push(DrawOp::Clear {
        color: style.background,
    });

    let stem = &geometry.stem;
    if stem.dst.height() > 0.0 {
        plan.push(DrawOp::ImageRegion {
            asset: AssetKind::Stem,
            src: stem.src,
            dst: stem.dst,
        });
    }

    if let Some(head) = &geometry.head {
        plan.push(DrawOp::ImageRegion {
            asset: AssetKind::Circle,
            src: head.circle.with_origin((0.0, 0.0)),
            dst: head.circle,
        });
        for (asset, leaf) in [
            (AssetKind::LeftLeaf, &head.left_leaf),
            (AssetKind::RightLeaf, &head.right_leaf),
        ] {
            plan.push(DrawOp::ImageTransformed {
                asset,
                transform: leaf.transform,
                opacity: 1.0,
            });
        }
        for petal in head.petals.iter().filter(|p| p.alpha > 0) {
            plan.push(DrawOp::ImageTransformed {
                asset: petal_asset(petal.spec),
                transform: petal.transform,
                opacity: f32::from(petal.alpha) / 255.0,
            });
        }
        if let Some(photo) = &head.photo {
            plan.push(DrawOp::ImageTransformed {
                asset: AssetKind::Photo,
                transform: photo.transform,
                opacity: 1.0,
            });
        }
    }

    if snapshot.is_idle {
        let rect = restart.show();
        plan.ops
            .extend(RestartControl::draw_ops(rect, canvas, &style.text));
    } else {
        restart.hide();
    }

    plan
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
