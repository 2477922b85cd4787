//! Encoding sinks.
//!
//! Sinks consume rendered frames in playback order and are used by [`crate::Player::run`].

/// `ffmpeg`-based sinks (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Numbered PNG files on disk.
pub mod png;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
