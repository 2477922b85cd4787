//! Fixed stage durations and the linear progress function shared by every stage.

use std::time::{Duration, Instant};

/// Time for the stem to grow from nothing to full height.
pub const STEM_DURATION: Duration = Duration::from_millis(2000);
/// Time for the leaves to grow from half to full size.
pub const LEAF_DURATION: Duration = Duration::from_millis(2000);
/// Fade-in window of a single petal.
pub const PETAL_WINDOW: Duration = Duration::from_millis(500);
/// Number of petals in the sequence.
pub const PETAL_COUNT: usize = 16;
/// Time for the whole petal sequence (`PETAL_COUNT` windows back to back).
pub const PETAL_TOTAL_DURATION: Duration = Duration::from_millis(500 * PETAL_COUNT as u64);
/// Time for the photo to scale up to full width.
pub const PHOTO_DURATION: Duration = Duration::from_millis(2000);

/// Elapsed time since `start`, floored at zero when the clock reads earlier than `start`.
pub fn elapsed_since(start: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(start)
}

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero duration counts as already complete.
pub fn fraction(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() || elapsed >= duration {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Linear progress of a stage that began at `start` (unset reads as 0).
pub fn progress(start: Option<Instant>, duration: Duration, now: Instant) -> f64 {
    match start {
        None => 0.0,
        Some(start) => fraction(elapsed_since(start, now), duration),
    }
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timing.rs"]
mod tests;
