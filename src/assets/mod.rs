//! Bitmap decoding, the immutable asset set, and text shaping.

pub mod decode;
pub mod store;
pub mod text;
