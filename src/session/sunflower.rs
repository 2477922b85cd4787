//! One running sunflower: animation state, bitmaps and the restart control behind a
//! tick-and-pointer API a host drives.

use std::path::Path;
use std::time::Instant;

use crate::{
    animation::state::{AnimationState, StageSnapshot},
    assets::store::AssetSet,
    compose::compositor::{FrameStyle, compose_frame},
    compose::plan::FramePlan,
    compose::restart::RestartControl,
    config::model::SunflowerConfig,
    foundation::core::{Canvas, Point},
    foundation::error::SunflowerResult,
    geometry::layout::{SceneGeometry, check_fit, compute_geometry},
};

/// Output of one [`Sunflower::tick`].
#[derive(Clone, Debug)]
pub struct Tick {
    /// Stage progress at the sampled instant.
    pub snapshot: StageSnapshot,
    /// Where every element sits.
    pub geometry: SceneGeometry,
    /// Draw calls for the frame.
    pub plan: FramePlan,
    /// Whether the host should schedule another tick.
    pub needs_another_frame: bool,
}

/// The animation engine: stage clock, layout, composition and the restart control.
///
/// Hosts call [`Sunflower::tick`] once per displayed frame and forward presses to
/// [`Sunflower::pointer_down`].
pub struct Sunflower {
    assets: AssetSet,
    style: FrameStyle,
    state: AnimationState,
    restart: RestartControl,
}

impl Sunflower {
    /// Engine at the start of a fresh run.
    pub fn new(assets: AssetSet, style: FrameStyle) -> Self {
        Self {
            assets,
            style,
            state: AnimationState::new(),
            restart: RestartControl::new(),
        }
    }

    /// Load every bitmap named in `config`, resolved against `assets_root`.
    pub fn from_config(
        config: &SunflowerConfig,
        assets_root: impl AsRef<Path>,
    ) -> SunflowerResult<Self> {
        config.validate()?;
        let assets = AssetSet::load(&config.assets, assets_root.as_ref())?;
        Ok(Self::new(
            assets,
            FrameStyle {
                background: config.background(),
                text: config.text.clone(),
            },
        ))
    }

    /// Evaluate stage state at `now`, lay out every element for `canvas` and build the draw
    /// plan.
    ///
    /// Fails without touching any state if `canvas` cannot hold the bitmaps.
    #[tracing::instrument(skip(self), fields(width = canvas.width, height = canvas.height))]
    pub fn tick(&mut self, now: Instant, canvas: Canvas) -> SunflowerResult<Tick> {
        check_fit(canvas, &self.assets)?;

        let was_shown = self.restart.is_visible();
        let snapshot = self.state.evaluate(now);
        let geometry = compute_geometry(&snapshot, canvas, &self.assets)?;
        let plan = compose_frame(
            &snapshot,
            &geometry,
            canvas,
            &self.style,
            &mut self.restart,
        );
        self.trace_idle_entry(was_shown);

        Ok(Tick {
            needs_another_frame: snapshot.needs_another_frame(),
            snapshot,
            geometry,
            plan,
        })
    }

    /// Forget all stage progress; the next tick starts the stem afresh.
    pub fn reset(&mut self) {
        self.state.reset();
        self.restart.hide();
    }

    /// Evaluate stage state at `now` without drawing.
    ///
    /// Lets a host that skips frames still observe every stage boundary at the instant it would
    /// have drawn. The restart control follows the idle state exactly as a drawn tick would.
    pub fn advance(&mut self, now: Instant) -> StageSnapshot {
        let was_shown = self.restart.is_visible();
        let snapshot = self.state.evaluate(now);
        if snapshot.is_idle {
            self.restart.show();
        } else {
            self.restart.hide();
        }
        self.trace_idle_entry(was_shown);
        snapshot
    }

    fn trace_idle_entry(&self, was_shown: bool) {
        if !was_shown && self.restart.is_visible() {
            tracing::debug!("idle reached; restart control shown");
        }
    }

    /// Deliver a primary-button press at `point` in canvas pixels.
    ///
    /// Returns whether the press activated the restart control. An activation hides the control
    /// and takes effect at the start of the next tick.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if !self.restart.hit_test(point) {
            return false;
        }
        tracing::debug!(x = point.x, y = point.y, "restart requested");
        self.restart.hide();
        self.state.request_restart();
        true
    }

    /// Stage clock.
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Decoded bitmaps.
    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    /// Background and texts.
    pub fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Start-again button state.
    pub fn restart_control(&self) -> &RestartControl {
        &self.restart
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sunflower.rs"]
mod tests;
