//! Primitive types, the error taxonomy and pixel math shared by every layer.

pub mod core;
pub mod error;
pub(crate) mod math;
