//! Time-driven stage machine and petal fade schedule.

/// Fixed petal ordering and per-petal opacity.
pub mod petals;
/// Stage starts, progress and phase.
pub mod state;
/// Stage durations and progress helpers.
pub mod timing;
