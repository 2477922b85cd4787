use std::time::Duration;

use crate::foundation::error::{SunflowerError, SunflowerResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Zero-based position of a frame within one playback.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frame rate as an exact fraction, e.g. `30000/1001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Frames per `den` seconds.
    pub num: u32,
    /// Seconds per `num` frames; must be > 0.
    pub den: u32,
}

impl Fps {
    /// Checked constructor; both parts must be non-zero.
    pub fn new(num: u32, den: u32) -> SunflowerResult<Self> {
        if den == 0 {
            return Err(SunflowerError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SunflowerError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float, for logging.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Wall-clock offset of frame `idx` from the start of playback.
    pub fn frame_offset(self, idx: FrameIndex) -> Duration {
        // Integer nanos so that frame instants never drift across long runs.
        let nanos = u128::from(idx.0) * u128::from(self.den) * 1_000_000_000 / u128::from(self.num);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Number of whole frames that fit into `d`.
    pub fn frames_in(self, d: Duration) -> u64 {
        let frames = d.as_nanos() * u128::from(self.num)
            / (u128::from(self.den) * 1_000_000_000);
        u64::try_from(frames).unwrap_or(u64::MAX)
    }
}

/// Size of the drawing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Checked constructor, see [`Canvas::validate`].
    pub fn new(width: u32, height: u32) -> SunflowerResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Reject canvases with a zero side.
    pub fn validate(self) -> SunflowerResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SunflowerError::validation(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width as `f64`.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// `#CCCCCC`, the restart button fill.
    pub const LIGHT_GRAY: Self = Self::opaque(0xCC, 0xCC, 0xCC);

    /// Color with `a = 255`.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// From `[r, g, b, a]`.
    pub fn from_array(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Self { r, g, b, a }
    }

    /// As `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Translate/rotate/scale about an anchor, resolved to an [`Affine`] by [`Transform2D::to_affine`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Final offset in canvas space.
    pub translate: Vec2,
    /// Clockwise rotation in radians (y points down).
    pub rotation_rad: f64,
    /// Per-axis scale; default `(1, 1)`.
    pub scale: Vec2,
    /// Pivot for rotation and scale, in local space.
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// `T(translate) * T(anchor) * R(rotation) * S(scale) * T(-anchor)`.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_anchor = Affine::translate(self.anchor);
        let t_unanchor = Affine::translate(-self.anchor);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);

        t_translate * t_anchor * t_rotate * t_scale * t_unanchor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
