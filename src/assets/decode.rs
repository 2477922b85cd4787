use std::sync::Arc;

use anyhow::Context;

use crate::{
    SunflowerResult,
    assets::store::PreparedImage,
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SunflowerResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(prepare_rgba_image(dyn_img.to_rgba8()))
}

/// Wrap an already-decoded straight-alpha image.
pub fn prepare_rgba_image(rgba: image::RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
