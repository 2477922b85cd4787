use std::time::{Duration, Instant};

use crate::animation::timing::{
    LEAF_DURATION, PETAL_TOTAL_DURATION, PHOTO_DURATION, STEM_DURATION, elapsed_since, fraction,
};

/// Coarse position of the animation in its stage sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Phase {
    /// The stem is still growing.
    Growing,
    /// Stem complete; leaves and petals are animating.
    Blooming,
    /// Petals complete; the photo is scaling up.
    Revealing,
    /// Every stage has settled and the restart control is shown.
    Idle,
}

/// Stage start instants for one run of the animation.
///
/// Each start is assigned lazily by [`AnimationState::evaluate`] the first time its
/// predecessor stage is complete, and is only ever cleared again by a full reset.
///
/// The clock is sampled through a high-water mark: an instant earlier than the latest one
/// already evaluated reads as that latest instant, so no stage's progress ever moves backward.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    stem_start: Option<Instant>,
    leaves_start: Option<Instant>,
    petals_start: Option<Instant>,
    photo_start: Option<Instant>,
    restart_requested: bool,
    latest: Option<Instant>,
}

/// Everything a single tick needs to know about stage progress, sampled at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StageSnapshot {
    /// Derived phase.
    pub phase: Phase,
    /// Stem growth in `[0, 1]`.
    pub stem_progress: f64,
    /// Leaf growth in `[0, 1]`; 0 until the leaves start.
    pub leaf_progress: f64,
    /// Time into the petal sequence; zero until the petals start.
    pub petal_elapsed: Duration,
    /// Photo scale-up in `[0, 1]`; 0 until the photo starts.
    pub photo_progress: f64,
    /// Leaves have started.
    pub leaves_active: bool,
    /// Petals have started.
    pub petals_active: bool,
    /// Photo has started.
    pub photo_active: bool,
    /// All four stages are complete.
    pub is_idle: bool,
}

impl AnimationState {
    /// Fresh state with every stage unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every stage start at once.
    pub fn reset(&mut self) {
        self.stem_start = None;
        self.leaves_start = None;
        self.petals_start = None;
        self.photo_start = None;
        self.restart_requested = false;
        self.latest = None;
    }

    /// Ask for a reset that is applied at the start of the next [`evaluate`](Self::evaluate).
    pub fn request_restart(&mut self) {
        self.restart_requested = true;
    }

    /// Whether a restart is waiting for the next evaluation.
    pub fn restart_pending(&self) -> bool {
        self.restart_requested
    }

    /// When the stem began growing, if it has.
    pub fn stem_start(&self) -> Option<Instant> {
        self.stem_start
    }

    /// When the leaves began growing, if they have.
    pub fn leaves_start(&self) -> Option<Instant> {
        self.leaves_start
    }

    /// When the petal sequence began, if it has.
    pub fn petals_start(&self) -> Option<Instant> {
        self.petals_start
    }

    /// When the photo began scaling up, if it has.
    pub fn photo_start(&self) -> Option<Instant> {
        self.photo_start
    }

    /// Latest instant evaluated since the last reset.
    pub fn latest_sample(&self) -> Option<Instant> {
        self.latest
    }

    /// Advance the stage machine to `now` and report progress.
    ///
    /// Assigns any start whose guard holds at `now`: the stem on the first call, leaves and
    /// petals once the stem is complete, the photo once the petal sequence is exhausted.
    /// Calling twice with the same `now` yields identical snapshots, and a `now` earlier than
    /// one already seen evaluates as the later instant.
    pub fn evaluate(&mut self, now: Instant) -> StageSnapshot {
        if std::mem::take(&mut self.restart_requested) {
            self.reset();
            tracing::debug!("restart consumed; stages cleared");
        }

        let now = match self.latest {
            Some(latest) if latest > now => latest,
            _ => now,
        };
        self.latest = Some(now);

        let stem_start = *self.stem_start.get_or_insert_with(|| {
            tracing::debug!("stem stage started");
            now
        });
        let stem_progress = fraction(elapsed_since(stem_start, now), STEM_DURATION);

        if stem_progress >= 1.0 && self.leaves_start.is_none() {
            tracing::debug!("stem complete; leaves and petals started");
            self.leaves_start = Some(now);
        }
        if self.leaves_start.is_some() && self.petals_start.is_none() {
            self.petals_start = Some(now);
        }

        let petal_elapsed = self.petal_elapsed(now);
        if self.petals_start.is_some()
            && petal_elapsed >= PETAL_TOTAL_DURATION
            && self.photo_start.is_none()
        {
            tracing::debug!("petal sequence complete; photo started");
            self.photo_start = Some(now);
        }

        let leaf_elapsed = self
            .leaves_start
            .map_or(Duration::ZERO, |s| elapsed_since(s, now));
        let photo_elapsed = self
            .photo_start
            .map_or(Duration::ZERO, |s| elapsed_since(s, now));

        let stem_done = stem_progress >= 1.0;
        let leaves_done = self.leaves_start.is_some() && leaf_elapsed >= LEAF_DURATION;
        let petals_done = self.petals_start.is_some() && petal_elapsed >= PETAL_TOTAL_DURATION;
        let photo_done = self.photo_start.is_some() && photo_elapsed >= PHOTO_DURATION;
        let is_idle = stem_done && leaves_done && petals_done && photo_done;

        let phase = if is_idle {
            Phase::Idle
        } else if self.photo_start.is_some() {
            Phase::Revealing
        } else if stem_done {
            Phase::Blooming
        } else {
            Phase::Growing
        };

        StageSnapshot {
            phase,
            stem_progress,
            leaf_progress: if self.leaves_start.is_some() {
                fraction(leaf_elapsed, LEAF_DURATION)
            } else {
                0.0
            },
            petal_elapsed,
            photo_progress: if self.photo_start.is_some() {
                fraction(photo_elapsed, PHOTO_DURATION)
            } else {
                0.0
            },
            leaves_active: self.leaves_start.is_some(),
            petals_active: self.petals_start.is_some(),
            photo_active: self.photo_start.is_some(),
            is_idle,
        }
    }

    fn petal_elapsed(&self, now: Instant) -> Duration {
        self.petals_start
            .map_or(Duration::ZERO, |start| elapsed_since(start, now))
    }
}

impl StageSnapshot {
    /// Whether the stem has finished and the flower head and everything above it are drawn.
    pub fn head_visible(&self) -> bool {
        self.leaves_active
    }

    /// Whether the host should schedule another tick.
    pub fn needs_another_frame(&self) -> bool {
        !self.is_idle
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
