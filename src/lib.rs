//! Sunflower is a short, tap-to-replay growth animation: a stem rises from the bottom edge,
//! leaves unfurl, sixteen petals fade in around the flower head, and a photo grows out of its
//! centre, after which a "start again" button waits for a tap.
//!
//! # Pipeline overview
//!
//! 1. **Evaluate**: `AnimationState + Instant -> StageSnapshot` (which stages started, how far along)
//! 2. **Lay out**: `StageSnapshot + Canvas + AssetSet -> SceneGeometry`
//! 3. **Compose**: `SceneGeometry -> FramePlan` (ordered, backend-agnostic draw calls)
//! 4. **Render**: `FramePlan -> FrameRGBA` through any [`DrawSurface`] (CPU surface included)
//! 5. **Encode** (optional): PNG sequences, or MP4 through the system `ffmpeg` binary
//!
//! [`Sunflower`] bundles steps 1-3 behind `tick` and `pointer_down`; [`Player`] drives it at a
//! fixed frame rate for headless output.
//!
//! Every evaluation takes a single clock sample, so all elements in a frame agree on time.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod animation;
mod assets;
mod compose;
mod config;
mod encode;
mod foundation;
mod geometry;
mod render;
mod session;

pub use animation::petals::{PetalImage, PetalSpec, build_petal_sequence, petal_alpha};
pub use animation::state::{AnimationState, Phase, StageSnapshot};
pub use animation::timing::{
    LEAF_DURATION, PETAL_COUNT, PETAL_TOTAL_DURATION, PETAL_WINDOW, PHOTO_DURATION,
    STEM_DURATION, progress,
};
pub use assets::decode::decode_image;
pub use assets::store::{AssetKind, AssetSet, PreparedImage, normalize_rel_path};
pub use assets::text::{PreparedText, TextAlign, TextBrushRgba8, TextLayoutEngine};
pub use compose::compositor::{FrameStyle, compose_frame};
pub use compose::plan::{DrawOp, FramePlan, TextOp, TextPlacement};
pub use compose::restart::RestartControl;
pub use config::model::{AssetPaths, SunflowerConfig, TextContent};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::png::{PngSequenceSink, write_png};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{
    Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Transform2D, Vec2,
};
pub use foundation::error::{SunflowerError, SunflowerResult};
pub use geometry::layout::{
    HeadGeometry, LeafPlacement, LeafSide, PetalPlacement, PhotoPlacement, SceneGeometry,
    StemPlacement, check_fit, compute_geometry,
};
pub use render::backend::{DrawSurface, FrameRGBA, execute_plan};
pub use render::cpu::CpuSurface;
pub use session::player::{PlaybackOpts, PlaybackSummary, Player, ScriptedTap};
pub use session::sunflower::{Sunflower, Tick};
