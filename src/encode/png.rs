use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig, SinkLifecycle};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SunflowerError, SunflowerResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::backend::FrameRGBA;

/// Writes each frame to `<dir>/<prefix><index>.png`, index zero-padded to six digits.
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    lifecycle: SinkLifecycle,
    written: Vec<PathBuf>,
    scratch: Vec<u8>,
}

impl PngSequenceSink {
    /// Sink writing into `dir` with the `frame_` prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_owned(),
            lifecycle: SinkLifecycle::default(),
            written: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Replace the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Path a frame with index `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:06}.png", self.prefix, idx.0))
    }

    /// Files written since the last `begin`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> SunflowerResult<()> {
        self.lifecycle.start("png", cfg)?;
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SunflowerResult<()> {
        self.lifecycle.accept("png", idx, frame)?;
        let path = self.frame_path(idx);
        write_png(&path, frame, &mut self.scratch)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> SunflowerResult<()> {
        self.lifecycle.finish("png")?;
        tracing::debug!(dir = %self.dir.display(), frames = self.written.len(), "png sequence written");
        Ok(())
    }

    fn abort(&mut self) {
        // Frames already on disk are kept for inspection.
        self.lifecycle = SinkLifecycle::default();
        tracing::debug!(dir = %self.dir.display(), frames = self.written.len(), "png sequence aborted");
    }
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA, scratch: &mut Vec<u8>) -> SunflowerResult<()> {
    if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
        return Err(SunflowerError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    scratch.clear();
    scratch.extend_from_slice(&frame.data);
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(scratch);
    }

    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        scratch,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
