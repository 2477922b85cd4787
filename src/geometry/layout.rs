//! Placement of every element as a pure function of stage progress, canvas and bitmap sizes.
//!
//! Elements stack bottom-up: the stem is anchored to the bottom edge, the flower head sits on
//! the stem's current top, leaves hang off the stem's sides, petals ring the head, and the
//! photo grows out of the head's centre.

use crate::{
    animation::petals::{PetalImage, PetalSpec, build_petal_sequence, petal_alpha},
    animation::state::StageSnapshot,
    animation::timing::{PETAL_COUNT, lerp},
    assets::store::{AssetKind, AssetSet},
    foundation::core::{Affine, Canvas, Point, Rect, Transform2D, Vec2},
    foundation::error::{SunflowerError, SunflowerResult},
};

/// Leaf scale at the start of the leaf stage.
pub const LEAF_START_SCALE: f64 = 0.5;
/// Petals overlap the flower head by this many pixels.
pub const PETAL_OVERLAP_PX: f64 = 10.0;

/// Bottom-anchored crop of the stem bitmap and where it lands.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StemPlacement {
    /// Region of the stem bitmap to draw (always its bottom slice).
    pub src: Rect,
    /// Destination on the canvas.
    pub dst: Rect,
    /// Uniform bitmap-to-canvas scale.
    pub scale: f64,
}

/// Which side of the stem a leaf hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum LeafSide {
    /// Hangs off the stem's left edge, pivoting on its right edge.
    Left,
    /// Hangs off the stem's right edge, pivoting on its left edge.
    Right,
}

/// A leaf's current scale and the transform that places its bitmap.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LeafPlacement {
    /// Side of the stem.
    pub side: LeafSide,
    /// Grows from [`LEAF_START_SCALE`] to 1.
    pub scale: f64,
    /// Bitmap space to canvas space.
    pub transform: Affine,
}

/// One petal of the ring.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PetalPlacement {
    /// Which bitmap and angle.
    pub spec: PetalSpec,
    /// Bitmap space to canvas space, rotated about the head's centre.
    pub transform: Affine,
    /// 0..=255; zero means the petal is not drawn this tick.
    pub alpha: u8,
}

/// The photo growing out of the head.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PhotoPlacement {
    /// Grows from 0 to 1 over the photo stage.
    pub scale: f64,
    /// Bitmap space to canvas space, scaling about the head's centre.
    pub transform: Affine,
}

/// Everything above the stem; only exists once the stem is complete.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HeadGeometry {
    /// Flower head, drawn unscaled.
    pub circle: Rect,
    /// Centre of the flower head.
    pub center: Point,
    /// Leaf on the stem's left.
    pub left_leaf: LeafPlacement,
    /// Leaf on the stem's right.
    pub right_leaf: LeafPlacement,
    /// In sequence order.
    pub petals: Vec<PetalPlacement>,
    /// Present once the photo stage has started.
    pub photo: Option<PhotoPlacement>,
}

/// Geometry for one tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneGeometry {
    /// Always drawn, possibly zero height.
    pub stem: StemPlacement,
    /// `None` until the stem is fully grown.
    pub head: Option<HeadGeometry>,
}

/// Scaled stem height that puts the flower head's centre at `canvas_height / 2`.
pub fn final_stem_height(canvas_height: f64, circle_height: f64) -> f64 {
    canvas_height / 2.0 - circle_height / 2.0
}

/// Place the stem for `progress` in `[0, 1]`.
pub fn stem_placement(
    canvas: Canvas,
    stem_size: Vec2,
    circle_size: Vec2,
    progress: f64,
) -> SunflowerResult<StemPlacement> {
    let (w, h) = (canvas.width_f64(), canvas.height_f64());
    let final_height = final_stem_height(h, circle_size.y);
    if final_height <= 0.0 {
        return Err(SunflowerError::validation(format!(
            "canvas height {h} cannot fit a flower head of height {}",
            circle_size.y
        )));
    }
    let progress = progress.clamp(0.0, 1.0);
    let scale = final_height / stem_size.y;

    let visible_src = stem_size.y * progress;
    let src = Rect::new(0.0, stem_size.y - visible_src, stem_size.x, stem_size.y);

    let scaled_width = stem_size.x * scale;
    let left = (w - scaled_width) / 2.0;
    let dst = Rect::new(left, h - final_height * progress, left + scaled_width, h);

    Ok(StemPlacement { src, dst, scale })
}

/// Flower head rectangle resting on the stem's top edge.
pub fn circle_rect(canvas: Canvas, circle_size: Vec2, stem_top: f64) -> Rect {
    let left = (canvas.width_f64() - circle_size.x) / 2.0;
    let top = stem_top - circle_size.y;
    Rect::new(left, top, left + circle_size.x, stem_top)
}

/// Place one leaf for leaf `progress` in `[0, 1]`.
///
/// The leaf grows from [`LEAF_START_SCALE`] to 1 about its stem-side edge, but never past the
/// canvas edge on the far side.
pub fn leaf_placement(
    side: LeafSide,
    canvas: Canvas,
    leaf_size: Vec2,
    stem: &StemPlacement,
    stem_intrinsic_height: f64,
    progress: f64,
) -> LeafPlacement {
    let (lw, lh) = (leaf_size.x, leaf_size.y);
    let (anchor_x, room) = match side {
        LeafSide::Left => (stem.dst.x1, stem.dst.x1),
        LeafSide::Right => (stem.dst.x0, canvas.width_f64() - stem.dst.x0),
    };
    let cap = (room / lw).max(0.0);
    let scale = lerp(LEAF_START_SCALE, 1.0, progress.clamp(0.0, 1.0)).min(cap);

    let leaf_top = stem.dst.y0 + stem_intrinsic_height / 16.0;
    let (left, pivot_x) = match side {
        LeafSide::Left => (anchor_x - lw, lw),
        LeafSide::Right => (anchor_x, 0.0),
    };
    let transform = Transform2D {
        translate: Vec2::new(left, leaf_top - lh * (scale - 1.0) / 2.0),
        scale: Vec2::new(scale, scale),
        anchor: Vec2::new(pivot_x, lh / 2.0),
        ..Transform2D::default()
    }
    .to_affine();

    LeafPlacement {
        side,
        scale,
        transform,
    }
}

/// Distance from the head centre to a petal's centre.
pub fn petal_radius(circle_size: Vec2, petal_size: Vec2) -> f64 {
    circle_size.x / 2.0 - PETAL_OVERLAP_PX + petal_size.y / 2.0
}

/// Full-scale petal transform: centred on its polar position, rotated to point outward.
pub fn petal_transform(
    center: Point,
    circle_size: Vec2,
    petal_size: Vec2,
    angle_degrees: f64,
) -> Affine {
    let radius = petal_radius(circle_size, petal_size);
    let angle = angle_degrees.to_radians();
    let pos = Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    );
    let half = petal_size / 2.0;
    Transform2D {
        translate: Vec2::new(pos.x - half.x, pos.y - half.y),
        rotation_rad: (angle_degrees + 90.0).to_radians(),
        anchor: half,
        ..Transform2D::default()
    }
    .to_affine()
}

/// Photo transform for photo `progress` in `[0, 1]`: scales from 0 to canvas width.
pub fn photo_placement(
    canvas: Canvas,
    center: Point,
    photo_size: Vec2,
    progress: f64,
) -> PhotoPlacement {
    let final_scale = canvas.width_f64() / photo_size.x;
    let scale = final_scale * progress.clamp(0.0, 1.0);
    let half = photo_size / 2.0;
    let transform = Transform2D {
        translate: Vec2::new(center.x - half.x, center.y - half.y),
        scale: Vec2::new(scale, scale),
        anchor: half,
        ..Transform2D::default()
    }
    .to_affine();
    PhotoPlacement { scale, transform }
}

/// Fail unless `canvas` can hold the bitmaps in `assets` at all.
pub fn check_fit(canvas: Canvas, assets: &AssetSet) -> SunflowerResult<()> {
    canvas.validate()?;
    stem_placement(
        canvas,
        assets.size(AssetKind::Stem),
        assets.size(AssetKind::Circle),
        0.0,
    )
    .map(|_| ())
}

/// Compute every placement for one tick.
pub fn compute_geometry(
    snapshot: &StageSnapshot,
    canvas: Canvas,
    assets: &AssetSet,
) -> SunflowerResult<SceneGeometry> {
    canvas.validate()?;
    let stem_size = assets.size(AssetKind::Stem);
    let circle_size = assets.size(AssetKind::Circle);
    let stem = stem_placement(canvas, stem_size, circle_size, snapshot.stem_progress)?;

    if !snapshot.head_visible() {
        return Ok(SceneGeometry { stem, head: None });
    }

    let circle = circle_rect(canvas, circle_size, stem.dst.y0);
    let center = circle.center();

    let leaf = |side, kind| {
        leaf_placement(
            side,
            canvas,
            assets.size(kind),
            &stem,
            stem_size.y,
            snapshot.leaf_progress,
        )
    };
    let left_leaf = leaf(LeafSide::Left, AssetKind::LeftLeaf);
    let right_leaf = leaf(LeafSide::Right, AssetKind::RightLeaf);

    let mut petals = Vec::with_capacity(PETAL_COUNT);
    for spec in build_petal_sequence() {
        let petal_size = assets.size(petal_asset(spec));
        petals.push(PetalPlacement {
            spec,
            transform: petal_transform(center, circle_size, petal_size, spec.angle_degrees),
            alpha: petal_alpha(spec.sequence_index, snapshot.petal_elapsed),
        });
    }

    let photo = snapshot.photo_active.then(|| {
        photo_placement(
            canvas,
            center,
            assets.size(AssetKind::Photo),
            snapshot.photo_progress,
        )
    });

    Ok(SceneGeometry {
        stem,
        head: Some(HeadGeometry {
            circle,
            center,
            left_leaf,
            right_leaf,
            petals,
            photo,
        }),
    })
}

/// Bitmap used by a petal sequence entry.
pub fn petal_asset(spec: PetalSpec) -> AssetKind {
    match spec.image {
        PetalImage::Front => AssetKind::FrontPetal,
        PetalImage::Back => AssetKind::BackPetal,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/layout.rs"]
mod tests;
