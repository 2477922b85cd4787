use std::time::{SystemTime, UNIX_EPOCH};

use super::*;
use crate::foundation::core::Fps;

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "sunflower_png_{tag}_{}_{nanos}",
        std::process::id()
    ))
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps { num: 30, den: 1 },
    }
}

fn frame(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn writes_numbered_straight_alpha_pngs() {
    let dir = temp_dir("seq");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, [64, 0, 0, 128]))
        .unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 2, [0, 0, 255, 255]))
        .unwrap();
    sink.end().unwrap();

    assert_eq!(
        sink.written(),
        &[dir.join("frame_000000.png"), dir.join("frame_000003.png")]
    );
    let first = image::open(&sink.written()[0]).unwrap().to_rgba8();
    assert_eq!(first.get_pixel(1, 1).0, [128, 0, 0, 128]);
    let second = image::open(&sink.written()[1]).unwrap().to_rgba8();
    assert_eq!(second.get_pixel(0, 0).0, [0, 0, 255, 255]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let dir = temp_dir("order");
    let mut sink = PngSequenceSink::new(&dir).with_prefix("f");
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(5), &frame(2, 2, [0, 0, 0, 255]))
        .unwrap();
    assert!(
        sink.push_frame(FrameIndex(5), &frame(2, 2, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(matches!(
        sink.push_frame(FrameIndex(6), &frame(4, 2, [0, 0, 0, 255])),
        Err(SunflowerError::Validation(_))
    ));
    assert_eq!(sink.frame_path(FrameIndex(7)), dir.join("f000007.png"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new(temp_dir("unstarted"));
    assert!(
        sink.push_frame(FrameIndex(0), &frame(1, 1, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(sink.end().is_err());
}

#[test]
fn abort_keeps_written_frames_and_closes() {
    let dir = temp_dir("abort");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1, 1, [0, 0, 0, 255]))
        .unwrap();
    sink.abort();

    assert!(sink.written()[0].exists());
    assert!(
        sink.push_frame(FrameIndex(1), &frame(1, 1, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(sink.end().is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
