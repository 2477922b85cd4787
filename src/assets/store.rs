use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode as assets_decode,
    config::model::AssetPaths,
    foundation::core::Vec2,
    foundation::error::{SunflowerError, SunflowerResult},
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Intrinsic size as a vector `(width, height)`.
    pub fn size(&self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Logical name of each bitmap the animation draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum AssetKind {
    /// Flower head.
    Circle,
    /// Front-layer petal.
    FrontPetal,
    /// Back-layer petal.
    BackPetal,
    /// Stem.
    Stem,
    /// Leaf drawn left of the stem.
    LeftLeaf,
    /// Leaf drawn right of the stem.
    RightLeaf,
    /// Photo revealed at the end.
    Photo,
}

impl AssetKind {
    /// Every kind, in storage order.
    pub const ALL: [AssetKind; 7] = [
        AssetKind::Circle,
        AssetKind::FrontPetal,
        AssetKind::BackPetal,
        AssetKind::Stem,
        AssetKind::LeftLeaf,
        AssetKind::RightLeaf,
        AssetKind::Photo,
    ];

    /// Stable snake_case name, matching the config keys.
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Circle => "circle",
            AssetKind::FrontPetal => "front_petal",
            AssetKind::BackPetal => "back_petal",
            AssetKind::Stem => "stem",
            AssetKind::LeftLeaf => "left_leaf",
            AssetKind::RightLeaf => "right_leaf",
            AssetKind::Photo => "photo",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The seven decoded bitmaps, immutable once built.
///
/// Construction fails if any image is missing, empty, or has a pixel buffer that does not
/// match its dimensions, so geometry code can divide by intrinsic sizes freely.
#[derive(Clone, Debug)]
pub struct AssetSet {
    images: [PreparedImage; 7],
}

impl AssetSet {
    /// Build a set by asking `f` for each kind in [`AssetKind::ALL`] order.
    pub fn from_fn(
        mut f: impl FnMut(AssetKind) -> SunflowerResult<PreparedImage>,
    ) -> SunflowerResult<Self> {
        let mut images = Vec::with_capacity(AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            let img = f(kind)?;
            validate_image(kind, &img)?;
            images.push(img);
        }
        let images: [PreparedImage; 7] = images
            .try_into()
            .map_err(|_| SunflowerError::asset("asset set must hold exactly seven images"))?;
        Ok(Self { images })
    }

    /// Build a set from already-decoded bitmaps given in [`AssetKind::ALL`] order.
    pub fn from_images(images: [PreparedImage; 7]) -> SunflowerResult<Self> {
        Self::from_fn(|kind| Ok(images[kind.index()].clone()))
    }

    /// Decode every file named in `paths`, resolved against `root`.
    pub fn load(paths: &AssetPaths, root: impl Into<PathBuf>) -> SunflowerResult<Self> {
        let root = root.into();
        let entries = paths.entries();
        Self::from_fn(|kind| {
            let (_, file) = entries[kind.index()];
            let norm = normalize_rel_path(file)?;
            let path = root.join(Path::new(&norm));
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read {} bitmap from '{}'", kind.name(), path.display()))
                .map_err(|e| SunflowerError::asset(format!("{e:#}")))?;
            assets_decode::decode_image(&bytes).map_err(|e| {
                SunflowerError::asset(format!("decode {} '{}': {e}", kind.name(), path.display()))
            })
        })
    }

    /// Borrow the bitmap for `kind`.
    pub fn get(&self, kind: AssetKind) -> &PreparedImage {
        &self.images[kind.index()]
    }

    /// Intrinsic `(width, height)` of `kind`.
    pub fn size(&self, kind: AssetKind) -> Vec2 {
        self.get(kind).size()
    }
}

fn validate_image(kind: AssetKind, img: &PreparedImage) -> SunflowerResult<()> {
    if img.width == 0 || img.height == 0 {
        return Err(SunflowerError::asset(format!(
            "{} bitmap must be non-empty, got {}x{}",
            kind.name(),
            img.width,
            img.height
        )));
    }
    let expected = (img.width as usize)
        .saturating_mul(img.height as usize)
        .saturating_mul(4);
    if img.rgba8_premul.len() != expected {
        return Err(SunflowerError::asset(format!(
            "{} bitmap has {} bytes, expected {expected}",
            kind.name(),
            img.rgba8_premul.len()
        )));
    }
    Ok(())
}

/// Normalize and validate config-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> SunflowerResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SunflowerError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(SunflowerError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SunflowerError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SunflowerError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
