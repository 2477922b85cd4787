//! Draw-plan construction.

/// Stacking order and per-tick plan assembly.
pub mod compositor;
/// Backend-agnostic draw calls.
pub mod plan;
/// The restart button and greeting.
pub mod restart;
