//! Headless fixed-rate playback: drives a [`Sunflower`] from a synthetic clock, renders every
//! tick through a [`DrawSurface`], and hands frames to a [`FrameSink`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::core::{Canvas, Fps, FrameIndex, Point},
    foundation::error::{SunflowerError, SunflowerResult},
    render::backend::{DrawSurface, FrameRGBA, execute_plan},
    session::sunflower::Sunflower,
};

/// A pointer press delivered `at` after playback starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptedTap {
    /// Offset from the first frame.
    pub at: Duration,
    /// Canvas position of the press.
    pub point: Point,
}

/// How a [`Player`] samples the animation.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackOpts {
    /// Frame rate of the synthetic clock.
    pub fps: Fps,
    /// How long to keep emitting frames once idle with no taps left.
    pub hold_after_idle: Duration,
    /// Hard stop, measured from the first frame.
    pub max_duration: Duration,
    /// Presses to deliver; sorted by [`Player::new`].
    pub taps: Vec<ScriptedTap>,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 60, den: 1 },
            hold_after_idle: Duration::from_secs(1),
            max_duration: Duration::from_secs(60),
            taps: Vec::new(),
        }
    }
}

/// What a [`Player::run`] produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Scripted taps that activated the restart control.
    pub restarts: u32,
    /// Whether the last frame showed the idle composition.
    pub ended_idle: bool,
    /// Offset of the last frame.
    pub last_frame_at: Duration,
}

/// Fixed-rate headless driver for a [`Sunflower`] rendering onto `S`.
pub struct Player<S: DrawSurface> {
    sunflower: Sunflower,
    surface: S,
    canvas: Canvas,
    opts: PlaybackOpts,
}

impl<S: DrawSurface> Player<S> {
    /// Validate `canvas` and `opts` and take ownership of the engine and surface.
    pub fn new(
        sunflower: Sunflower,
        surface: S,
        canvas: Canvas,
        mut opts: PlaybackOpts,
    ) -> SunflowerResult<Self> {
        canvas.validate()?;
        Fps::new(opts.fps.num, opts.fps.den)?;
        if opts.max_duration.is_zero() {
            return Err(SunflowerError::validation("max_duration must be > 0"));
        }
        opts.taps.sort_by_key(|t| t.at);
        Ok(Self {
            sunflower,
            surface,
            canvas,
            opts,
        })
    }

    /// The driven engine.
    pub fn sunflower(&self) -> &Sunflower {
        &self.sunflower
    }

    /// Options with taps in delivery order.
    pub fn opts(&self) -> &PlaybackOpts {
        &self.opts
    }

    /// Give back the engine and surface.
    pub fn into_parts(self) -> (Sunflower, S) {
        (self.sunflower, self.surface)
    }

    /// Render the frame a live run would show `elapsed` after starting.
    ///
    /// Every frame instant before `elapsed` is evaluated (without drawing) so stage starts land
    /// where a real run would put them; scripted taps are delivered along the way.
    pub fn render_frame_at(&mut self, elapsed: Duration) -> SunflowerResult<FrameRGBA> {
        self.sunflower.reset();
        let base = Instant::now();
        let mut taps: VecDeque<ScriptedTap> = self.opts.taps.iter().copied().collect();

        let mut i = 0u64;
        loop {
            let t = self.opts.fps.frame_offset(FrameIndex(i));
            if t >= elapsed {
                break;
            }
            deliver_taps(&mut self.sunflower, &mut taps, t);
            self.sunflower.advance(base + t);
            i += 1;
        }

        deliver_taps(&mut self.sunflower, &mut taps, elapsed);
        let tick = self.sunflower.tick(base + elapsed, self.canvas)?;
        execute_plan(&mut self.surface, &tick.plan, self.sunflower.assets())
    }

    /// Play from a fresh start into `sink` until the animation has settled.
    ///
    /// Stops once the engine no longer asks for frames, every scripted tap has been delivered,
    /// and `hold_after_idle` has passed; or at `max_duration`, whichever comes first. If a frame
    /// fails to render or encode, the sink is aborted rather than ended and the error returned.
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> SunflowerResult<PlaybackSummary> {
        self.sunflower.reset();
        sink.begin(SinkConfig::for_canvas(self.canvas, self.opts.fps))?;
        tracing::info!(
            width = self.canvas.width,
            height = self.canvas.height,
            fps = self.opts.fps.as_f64(),
            taps = self.opts.taps.len(),
            "playback started"
        );

        let summary = match self.play_into(sink) {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(%err, "playback failed; aborting sink");
                sink.abort();
                return Err(err);
            }
        };

        sink.end()?;
        tracing::info!(
            frames = summary.frames,
            restarts = summary.restarts,
            "playback finished"
        );
        Ok(summary)
    }

    fn play_into(&mut self, sink: &mut dyn FrameSink) -> SunflowerResult<PlaybackSummary> {
        let base = Instant::now();
        let fps = self.opts.fps;
        let mut taps: VecDeque<ScriptedTap> = self.opts.taps.iter().copied().collect();
        let mut summary = PlaybackSummary::default();
        let mut idle_since: Option<Duration> = None;

        let mut i = 0u64;
        loop {
            let t = fps.frame_offset(FrameIndex(i));
            if t > self.opts.max_duration {
                tracing::warn!(?t, "max_duration reached before playback settled");
                break;
            }

            summary.restarts += deliver_taps(&mut self.sunflower, &mut taps, t);
            let tick = self.sunflower.tick(base + t, self.canvas)?;
            let frame = execute_plan(&mut self.surface, &tick.plan, self.sunflower.assets())?;
            sink.push_frame(FrameIndex(i), &frame)?;

            summary.frames += 1;
            summary.last_frame_at = t;
            summary.ended_idle = !tick.needs_another_frame;

            if tick.needs_another_frame {
                idle_since = None;
            } else {
                let since = *idle_since.get_or_insert(t);
                if taps.is_empty() && t.saturating_sub(since) >= self.opts.hold_after_idle {
                    break;
                }
            }
            i += 1;
        }
        Ok(summary)
    }
}

/// Deliver every tap due at or before `t`; returns how many triggered a restart.
fn deliver_taps(sunflower: &mut Sunflower, taps: &mut VecDeque<ScriptedTap>, t: Duration) -> u32 {
    let mut restarts = 0;
    while let Some(tap) = taps.front().copied() {
        if tap.at > t {
            break;
        }
        taps.pop_front();
        if sunflower.pointer_down(tap.point) {
            restarts += 1;
        }
    }
    restarts
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
