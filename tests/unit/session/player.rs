use std::sync::Arc;

use super::*;
use crate::{
    assets::store::{AssetKind, AssetSet, PreparedImage},
    compose::compositor::FrameStyle,
    compose::plan::TextOp,
    encode::sink::InMemorySink,
    foundation::core::{Affine, Rect, Rgba8},
};

/// Counts draw calls and returns an empty frame of the right size.
#[derive(Default)]
struct CountingSurface {
    canvas: Option<Canvas>,
    images: usize,
    texts: usize,
    finished: usize,
    fail_at_frame: Option<usize>,
}

impl DrawSurface for CountingSurface {
    fn begin_frame(&mut self, canvas: Canvas) -> SunflowerResult<()> {
        self.canvas = Some(canvas);
        self.images = 0;
        self.texts = 0;
        Ok(())
    }

    fn clear(&mut self, _color: Rgba8) -> SunflowerResult<()> {
        Ok(())
    }

    fn draw_image_region(
        &mut self,
        _image: &PreparedImage,
        _src: Rect,
        _dst: Rect,
    ) -> SunflowerResult<()> {
        self.images += 1;
        Ok(())
    }

    fn draw_image_transformed(
        &mut self,
        _image: &PreparedImage,
        _transform: Affine,
        _opacity: f32,
    ) -> SunflowerResult<()> {
        self.images += 1;
        Ok(())
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) -> SunflowerResult<()> {
        Ok(())
    }

    fn draw_text(&mut self, _text: &TextOp) -> SunflowerResult<()> {
        self.texts += 1;
        Ok(())
    }

    fn finish_frame(&mut self) -> SunflowerResult<FrameRGBA> {
        let canvas = self
            .canvas
            .ok_or_else(|| SunflowerError::render("finish before begin"))?;
        if self.fail_at_frame == Some(self.finished) {
            return Err(SunflowerError::render("surface lost"));
        }
        self.finished += 1;
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: Vec::new(),
            premultiplied: true,
        })
    }
}

fn image(width: u32, height: u32) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(vec![255; (width * height * 4) as usize]),
    }
}

fn sunflower() -> Sunflower {
    let assets = AssetSet::from_fn(|kind| {
        Ok(match kind {
            AssetKind::Circle => image(100, 100),
            AssetKind::FrontPetal => image(30, 60),
            AssetKind::BackPetal => image(32, 64),
            AssetKind::Stem => image(40, 400),
            AssetKind::LeftLeaf => image(120, 50),
            AssetKind::RightLeaf => image(110, 48),
            AssetKind::Photo => image(360, 240),
        })
    })
    .unwrap();
    Sunflower::new(assets, FrameStyle::default())
}

fn canvas() -> Canvas {
    Canvas {
        width: 720,
        height: 1280,
    }
}

fn opts(taps: Vec<ScriptedTap>) -> PlaybackOpts {
    PlaybackOpts {
        fps: Fps { num: 10, den: 1 },
        hold_after_idle: Duration::from_secs(1),
        max_duration: Duration::from_secs(60),
        taps,
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn run_stops_after_holding_idle() {
    let mut player =
        Player::new(sunflower(), CountingSurface::default(), canvas(), opts(vec![])).unwrap();
    let mut sink = InMemorySink::new();
    let summary = player.run(&mut sink).unwrap();

    assert_eq!(summary.frames, 131);
    assert_eq!(summary.last_frame_at, ms(13_000));
    assert!(summary.ended_idle);
    assert_eq!(summary.restarts, 0);

    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (720, 1280));
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, (0..131).collect::<Vec<_>>());
}

#[test]
fn tap_on_button_replays_the_animation() {
    let taps = vec![ScriptedTap {
        at: ms(13_500),
        point: Point::new(100.0, 60.0),
    }];
    let mut player =
        Player::new(sunflower(), CountingSurface::default(), canvas(), opts(taps)).unwrap();
    let mut sink = InMemorySink::new();
    let summary = player.run(&mut sink).unwrap();

    assert_eq!(summary.restarts, 1);
    // Restarted at 13.5 s, idle 12 s later, then held for 1 s.
    assert_eq!(summary.last_frame_at, ms(26_500));
    assert_eq!(summary.frames, 266);
    assert!(summary.ended_idle);
}

#[test]
fn tap_beside_button_is_ignored() {
    let taps = vec![ScriptedTap {
        at: ms(13_500),
        point: Point::new(500.0, 700.0),
    }];
    let mut player =
        Player::new(sunflower(), CountingSurface::default(), canvas(), opts(taps)).unwrap();
    let mut sink = InMemorySink::new();
    let summary = player.run(&mut sink).unwrap();

    assert_eq!(summary.restarts, 0);
    assert_eq!(summary.last_frame_at, ms(13_500));
}

#[test]
fn max_duration_caps_playback() {
    let mut o = opts(vec![]);
    o.max_duration = ms(5_000);
    let mut player = Player::new(sunflower(), CountingSurface::default(), canvas(), o).unwrap();
    let mut sink = InMemorySink::new();
    let summary = player.run(&mut sink).unwrap();

    assert_eq!(summary.frames, 51);
    assert!(!summary.ended_idle);
}

#[test]
fn single_frame_places_stage_starts_on_frame_instants() {
    let mut o = opts(vec![]);
    o.fps = Fps {
        num: 30_000,
        den: 1001,
    };
    let mut player = Player::new(sunflower(), CountingSurface::default(), canvas(), o).unwrap();
    player.render_frame_at(ms(2_600)).unwrap();

    let state = player.sunflower().state();
    let stem = state.stem_start().unwrap();
    let leaves = state.leaves_start().unwrap();
    assert_eq!(leaves - stem, Duration::from_nanos(2_002_000_000));
}

#[test]
fn single_idle_frame_draws_the_restart_texts() {
    let mut player =
        Player::new(sunflower(), CountingSurface::default(), canvas(), opts(vec![])).unwrap();
    player.render_frame_at(ms(20_000)).unwrap();
    assert!(player.sunflower().restart_control().is_visible());

    let (_, surface) = player.into_parts();
    assert_eq!(surface.texts, 2);
    assert_eq!(surface.images, 4 + 16 + 1);
}

#[test]
fn failed_frame_aborts_the_sink() {
    let surface = CountingSurface {
        fail_at_frame: Some(5),
        ..CountingSurface::default()
    };
    let mut player = Player::new(sunflower(), surface, canvas(), opts(vec![])).unwrap();
    let mut sink = InMemorySink::new();
    let err = player.run(&mut sink).unwrap_err();

    assert!(matches!(err, SunflowerError::Render(_)));
    assert!(sink.is_aborted());
    assert!(!sink.is_ended());
    assert_eq!(sink.frames().len(), 5);
}

#[test]
fn sink_errors_abort_too() {
    // A sink that was never begun rejects the first frame; the player still tears it down.
    struct Unopened(InMemorySink);
    impl FrameSink for Unopened {
        fn begin(&mut self, _cfg: SinkConfig) -> SunflowerResult<()> {
            Ok(())
        }
        fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SunflowerResult<()> {
            self.0.push_frame(idx, frame)
        }
        fn end(&mut self) -> SunflowerResult<()> {
            self.0.end()
        }
        fn abort(&mut self) {
            self.0.abort();
        }
    }
    let mut player =
        Player::new(sunflower(), CountingSurface::default(), canvas(), opts(vec![])).unwrap();
    let mut unopened = Unopened(InMemorySink::new());
    assert!(player.run(&mut unopened).is_err());
    assert!(unopened.0.is_aborted());
}

#[test]
fn rejects_bad_options() {
    let mut o = opts(vec![]);
    o.fps = Fps { num: 0, den: 1 };
    assert!(Player::new(sunflower(), CountingSurface::default(), canvas(), o).is_err());

    let mut o = opts(vec![]);
    o.max_duration = Duration::ZERO;
    assert!(Player::new(sunflower(), CountingSurface::default(), canvas(), o).is_err());

    let empty = Canvas {
        width: 0,
        height: 10,
    };
    assert!(Player::new(sunflower(), CountingSurface::default(), empty, opts(vec![])).is_err());
}
