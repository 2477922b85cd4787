//! JSON playback configuration.

pub mod model;
