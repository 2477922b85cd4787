//! Host-facing drivers.

/// Fixed-rate headless playback into a frame sink.
pub mod player;
/// A single interactive sunflower.
pub mod sunflower;
