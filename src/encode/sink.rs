use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SunflowerError, SunflowerResult};
use crate::render::backend::FrameRGBA;

/// Output geometry and rate announced to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate the frames were sampled at.
    pub fps: Fps,
}

impl SinkConfig {
    /// Config for frames rendered onto `canvas` at `fps`.
    pub fn for_canvas(canvas: Canvas, fps: Fps) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            fps,
        }
    }

    /// Byte length of one tightly packed RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Destination for the frames of one playback.
///
/// [`crate::Player::run`] calls `begin` once, `push_frame` for every tick with strictly
/// increasing indices, then `end`. If playback fails part-way it calls `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Prepare for a playback of `cfg`-shaped frames.
    fn begin(&mut self, cfg: SinkConfig) -> SunflowerResult<()>;
    /// Consume frame `idx`.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SunflowerResult<()>;
    /// Flush and close after the last frame.
    fn end(&mut self) -> SunflowerResult<()>;
    /// Tear down after a failed playback. Output may be partial or missing.
    fn abort(&mut self) {
        if let Err(err) = self.end() {
            tracing::debug!(%err, "sink end failed during abort");
        }
    }
}

/// Begin/push/end bookkeeping shared by the built-in sinks.
#[derive(Debug, Default)]
pub(crate) struct SinkLifecycle {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl SinkLifecycle {
    pub(crate) fn start(&mut self, sink: &str, cfg: SinkConfig) -> SunflowerResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SunflowerError::validation(format!(
                "{sink} sink needs a non-empty frame size, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        Fps::new(cfg.fps.num, cfg.fps.den)?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    /// Check that `frame` may be pushed as `idx` and record it.
    pub(crate) fn accept(
        &mut self,
        sink: &str,
        idx: FrameIndex,
        frame: &FrameRGBA,
    ) -> SunflowerResult<SinkConfig> {
        let cfg = self
            .cfg
            .ok_or_else(|| SunflowerError::render(format!("{sink} sink has not begun")))?;
        if self.last_idx.is_some_and(|last| idx <= last) {
            return Err(SunflowerError::render(format!(
                "{sink} sink got frame {} after frame {}",
                idx.0,
                self.last_idx.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(SunflowerError::validation(format!(
                "{sink} sink expects {}x{} frames, got {}x{}",
                cfg.width, cfg.height, frame.width, frame.height
            )));
        }
        self.last_idx = Some(idx);
        Ok(cfg)
    }

    pub(crate) fn finish(&mut self, sink: &str) -> SunflowerResult<SinkConfig> {
        self.last_idx = None;
        self.cfg
            .take()
            .ok_or_else(|| SunflowerError::render(format!("{sink} sink has not begun")))
    }
}

/// Keeps every frame in memory; used by tests and by hosts that post-process frames.
#[derive(Debug, Default)]
pub struct InMemorySink {
    lifecycle: SinkLifecycle,
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config of the latest playback, if one has begun.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames of the latest playback, in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether the latest playback was closed with `end`.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether the latest playback was torn down with `abort`.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SunflowerResult<()> {
        self.lifecycle.start("in-memory", cfg)?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SunflowerResult<()> {
        self.lifecycle.accept("in-memory", idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SunflowerResult<()> {
        self.lifecycle.finish("in-memory")?;
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.lifecycle = SinkLifecycle::default();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
