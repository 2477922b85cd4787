use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::animation::state::Phase;
use crate::assets::store::{AssetSet, PreparedImage};
use crate::compose::plan::TextPlacement;
use crate::foundation::core::Rect;
use crate::geometry::layout::compute_geometry;

fn image(width: u32, height: u32) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(vec![0; (width * height * 4) as usize]),
    }
}

fn assets() -> AssetSet {
    AssetSet::from_fn(|kind| {
        Ok(match kind {
            AssetKind::Circle => image(100, 100),
            AssetKind::FrontPetal => image(30, 60),
            AssetKind::BackPetal => image(32, 64),
            AssetKind::Stem => image(40, 400),
            AssetKind::LeftLeaf => image(120, 50),
            AssetKind::RightLeaf => image(110, 48),
            AssetKind::Photo => image(360, 240),
        })
    })
    .unwrap()
}

fn canvas() -> Canvas {
    Canvas {
        width: 720,
        height: 1280,
    }
}

fn snapshot(stem: f64, petal_ms: u64, photo: Option<f64>, idle: bool) -> StageSnapshot {
    let head = stem >= 1.0;
    StageSnapshot {
        phase: if idle { Phase::Idle } else { Phase::Growing },
        stem_progress: stem,
        leaf_progress: if head { 1.0 } else { 0.0 },
        petal_elapsed: Duration::from_millis(petal_ms),
        photo_progress: photo.unwrap_or(0.0),
        leaves_active: head,
        petals_active: head,
        photo_active: photo.is_some(),
        is_idle: idle,
    }
}

fn plan_for(snap: &StageSnapshot, restart: &mut RestartControl) -> FramePlan {
    let geometry = compute_geometry(snap, canvas(), &assets()).unwrap();
    compose_frame(snap, &geometry, canvas(), &FrameStyle::default(), restart)
}

#[test]
fn growing_stem_draws_background_then_stem() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(0.4, 0, None, false), &mut restart);

    assert_eq!(plan.ops.len(), 2);
    assert_eq!(
        plan.ops[0],
        DrawOp::Clear {
            color: Rgba8::WHITE
        }
    );
    assert!(matches!(
        plan.ops[1],
        DrawOp::ImageRegion {
            asset: AssetKind::Stem,
            ..
        }
    ));
    assert!(!restart.is_visible());
}

#[test]
fn zero_height_stem_is_not_drawn() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(0.0, 0, None, false), &mut restart);
    assert_eq!(plan.ops.len(), 1);
}

#[test]
fn head_is_drawn_in_stacking_order_with_faded_petals_skipped() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(1.0, 2600, None, false), &mut restart);

    let drawn: Vec<AssetKind> = plan.assets_drawn().collect();
    assert_eq!(
        drawn,
        vec![
            AssetKind::Stem,
            AssetKind::Circle,
            AssetKind::LeftLeaf,
            AssetKind::RightLeaf,
            AssetKind::BackPetal,
            AssetKind::FrontPetal,
            AssetKind::BackPetal,
            AssetKind::FrontPetal,
            AssetKind::BackPetal,
            AssetKind::FrontPetal,
        ]
    );

    let last_petal = plan
        .ops
        .iter()
        .rev()
        .find_map(|op| match op {
            DrawOp::ImageTransformed { opacity, .. } => Some(*opacity),
            _ => None,
        })
        .unwrap();
    assert!((last_petal - 51.0 / 255.0).abs() < 1e-6);
}

#[test]
fn circle_draws_whole_bitmap_unscaled() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(1.0, 0, None, false), &mut restart);
    let circle = plan
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::ImageRegion {
                asset: AssetKind::Circle,
                src,
                dst,
            } => Some((*src, *dst)),
            _ => None,
        })
        .unwrap();
    assert_eq!(circle.0, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(circle.1.size(), circle.0.size());
}

#[test]
fn photo_is_drawn_above_every_petal() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(1.0, 8000, Some(0.5), false), &mut restart);
    let drawn: Vec<AssetKind> = plan.assets_drawn().collect();
    assert_eq!(drawn.len(), 4 + 16 + 1);
    assert_eq!(drawn.last(), Some(&AssetKind::Photo));
    assert!(!restart.is_visible());
}

#[test]
fn idle_frame_appends_restart_control_and_shows_it() {
    let mut restart = RestartControl::new();
    let plan = plan_for(&snapshot(1.0, 8000, Some(1.0), true), &mut restart);

    let n = plan.ops.len();
    assert!(matches!(plan.ops[n - 3], DrawOp::FillRect { .. }));
    assert!(matches!(
        &plan.ops[n - 2],
        DrawOp::Text(t) if t.placement == TextPlacement::Centered
    ));
    assert!(matches!(
        &plan.ops[n - 1],
        DrawOp::Text(t) if t.placement == TextPlacement::WrappedFromTop
    ));
    assert_eq!(restart.rect(), Some(RestartControl::button_rect()));

    let _ = plan_for(&snapshot(0.1, 0, None, false), &mut restart);
    assert!(!restart.is_visible());
}

#[test]
fn custom_background_is_cleared_first() {
    let mut restart = RestartControl::new();
    let snap = snapshot(0.5, 0, None, false);
    let geometry = compute_geometry(&snap, canvas(), &assets()).unwrap();
    let style = FrameStyle {
        background: Rgba8::opaque(10, 20, 30),
        ..FrameStyle::default()
    };
    let plan = compose_frame(&snap, &geometry, canvas(), &style, &mut restart);
    assert_eq!(
        plan.ops[0],
        DrawOp::Clear {
            color: Rgba8::opaque(10, 20, 30)
        }
    );
}
