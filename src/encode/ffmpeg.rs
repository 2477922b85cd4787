use std::ffi::OsString;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::config::model::SunflowerConfig;
use crate::encode::sink::{FrameSink, SinkConfig, SinkLifecycle};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{SunflowerError, SunflowerResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

/// Where and how [`FfmpegSink`] writes its MP4.
#[derive(Clone, Debug, PartialEq)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Replace `out_path` if it already exists.
    pub overwrite: bool,
    /// Color translucent pixels are flattened onto; yuv420p has no alpha.
    pub background: Rgba8,
}

impl FfmpegSinkOpts {
    /// Overwriting output flattened onto white.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8::WHITE,
        }
    }

    /// Output flattened onto the configured scene background.
    pub fn from_config(config: &SunflowerConfig, out_path: impl Into<PathBuf>) -> Self {
        Self {
            background: config.background(),
            ..Self::new(out_path)
        }
    }

    /// Set whether an existing `out_path` may be replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Streams frames as raw RGBA into a system `ffmpeg` encoding H.264/yuv420p.
///
/// The encoder process lives from `begin` until `end` or `abort`. Dropping the sink mid-playback
/// kills the process.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    lifecycle: SinkLifecycle,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            lifecycle: SinkLifecycle::default(),
            encoder: None,
            scratch: Vec::new(),
        }
    }

    /// Whether an encoder process is currently attached.
    pub fn is_encoding(&self) -> bool {
        self.encoder.is_some()
    }

    fn open_encoder(&self, cfg: &SinkConfig) -> SunflowerResult<Encoder> {
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SunflowerError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(SunflowerError::render(
                "ffmpeg is required for MP4 output but was not found on PATH",
            ));
        }
        Encoder::spawn(encoder_args(cfg, &self.opts))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SunflowerResult<()> {
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SunflowerError::validation(format!(
                "ffmpeg sink needs even frame dimensions for yuv420p, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        self.lifecycle.start("ffmpeg", cfg)?;
        // A previous playback that was never ended is discarded.
        self.encoder = None;

        let encoder = match self.open_encoder(&cfg) {
            Ok(encoder) => encoder,
            Err(err) => {
                self.lifecycle = SinkLifecycle::default();
                return Err(err);
            }
        };
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg started"
        );
        self.encoder = Some(encoder);
        self.scratch = vec![0; cfg.frame_len()];
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SunflowerResult<()> {
        let cfg = self.lifecycle.accept("ffmpeg", idx, frame)?;
        if frame.data.len() != cfg.frame_len() {
            return Err(SunflowerError::validation(format!(
                "frame {} carries {} bytes, expected {}",
                idx.0,
                frame.data.len(),
                cfg.frame_len()
            )));
        }
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| SunflowerError::render("ffmpeg encoder is not running"))?;

        flatten_onto_background(&mut self.scratch, frame, self.opts.background);
        encoder.write(&self.scratch)
    }

    fn end(&mut self) -> SunflowerResult<()> {
        self.lifecycle.finish("ffmpeg")?;
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| SunflowerError::render("ffmpeg encoder is not running"))?;
        encoder.finish()?;
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
        Ok(())
    }

    fn abort(&mut self) {
        self.lifecycle = SinkLifecycle::default();
        if let Some(mut encoder) = self.encoder.take() {
            encoder.kill();
            if let Err(err) = std::fs::remove_file(&self.opts.out_path) {
                tracing::debug!(%err, out = %self.opts.out_path.display(), "no partial output removed");
            }
        }
    }
}

/// Command line for an `ffmpeg` reading `cfg`-shaped opaque RGBA frames from stdin.
pub(crate) fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![if opts.overwrite { "-y" } else { "-n" }.into()];
    let input = [
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-f".to_owned(),
        "rawvideo".to_owned(),
        "-pix_fmt".to_owned(),
        "rgba".to_owned(),
        "-s".to_owned(),
        format!("{}x{}", cfg.width, cfg.height),
        // Before `-i` this is the input rate, not a resample.
        "-r".to_owned(),
        format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i".to_owned(),
        "pipe:0".to_owned(),
    ];
    let output = [
        "-an",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ];
    args.extend(input.into_iter().map(OsString::from));
    args.extend(output.into_iter().map(OsString::from));
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// A running `ffmpeg` child with a piped stdin and a thread collecting stderr.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl Encoder {
    fn spawn(args: Vec<OsString>) -> SunflowerResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SunflowerError::render(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                pipe.read_to_end(&mut bytes)?;
                Ok(bytes)
            })
        });
        let mut encoder = Self {
            child,
            stdin,
            stderr,
        };
        if encoder.stdin.is_none() {
            encoder.kill();
            return Err(SunflowerError::render("failed to open ffmpeg stdin"));
        }
        Ok(encoder)
    }

    fn write(&mut self, bytes: &[u8]) -> SunflowerResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SunflowerError::render("ffmpeg stdin is closed"))?;
        stdin
            .write_all(bytes)
            .map_err(|e| SunflowerError::render(format!("failed to write frame to ffmpeg: {e}")))
    }

    /// Close stdin and wait for the encoder to exit cleanly.
    fn finish(mut self) -> SunflowerResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| SunflowerError::render(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.collect_stderr();
        if !status.success() {
            return Err(SunflowerError::render(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }

    fn kill(&mut self) {
        drop(self.stdin.take());
        if let Err(err) = self.child.kill() {
            tracing::debug!(%err, "ffmpeg already exited");
        }
        if let Err(err) = self.child.wait() {
            tracing::warn!(%err, "failed to reap ffmpeg");
        }
        self.collect_stderr();
    }

    fn collect_stderr(&mut self) -> Vec<u8> {
        match self.stderr.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => bytes,
            Some(Ok(Err(err))) => {
                tracing::debug!(%err, "ffmpeg stderr read failed");
                Vec::new()
            }
            Some(Err(_)) => {
                tracing::debug!("ffmpeg stderr thread panicked");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            tracing::warn!("ffmpeg dropped while encoding; killing it");
            self.kill();
        }
    }
}

/// Composite `frame` over `background` into opaque RGBA8 in `dst`.
///
/// `dst` must be exactly as long as `frame.data`.
pub(crate) fn flatten_onto_background(dst: &mut [u8], frame: &FrameRGBA, background: Rgba8) {
    let bg = [background.r, background.g, background.b].map(u16::from);
    for (out, px) in dst.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
        let a = u16::from(px[3]);
        let inv = 255 - a;
        for ((o, &s), b) in out[..3].iter_mut().zip(&px[..3]).zip(bg) {
            let s = if frame.premultiplied {
                u16::from(s)
            } else {
                mul_div255_u16(u16::from(s), a)
            };
            *o = (s + mul_div255_u16(b, inv)).min(255) as u8;
        }
        out[3] = 255;
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SunflowerResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
