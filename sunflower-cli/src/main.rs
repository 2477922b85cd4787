use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "sunflower", version)]
struct Cli {
    /// Log stage transitions and sink activity to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown a given time after starting, as a PNG.
    Frame(FrameArgs),
    /// Render every frame of a playback as numbered PNGs.
    Frames(FramesArgs),
    /// Render a playback as an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the default config as JSON.
    DefaultConfig,
}

#[derive(Parser, Debug)]
struct PlaybackArgs {
    /// Config JSON; bitmaps are resolved relative to its directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tap the restart button this many milliseconds after starting. Repeatable.
    #[arg(long = "tap-at-ms")]
    tap_at_ms: Vec<u64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    playback: PlaybackArgs,

    /// Milliseconds since starting.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    playback: PlaybackArgs,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Keep rendering this long after the animation settles.
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    playback: PlaybackArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
    /// Overwrite output if it already exists (`--overwrite false` to refuse).
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    overwrite: bool,

    /// Keep rendering this long after the animation settles.
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        })
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Render(args) => cmd_render(args),
        Command::DefaultConfig => {
            println!("{}", sunflower::SunflowerConfig::default().to_json_string()?);
            Ok(())
        }
    }
}

/// A loaded config plus everything derived from it.
struct Session {
    config: sunflower::SunflowerConfig,
    sunflower: sunflower::Sunflower,
    surface: sunflower::CpuSurface,
}

fn load_session(path: Option<&Path>) -> anyhow::Result<Session> {
    let (config, root) = match path {
        Some(p) => (
            sunflower::SunflowerConfig::from_path(p)?,
            p.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
        ),
        None => (sunflower::SunflowerConfig::default(), PathBuf::from(".")),
    };

    let sunflower = sunflower::Sunflower::from_config(&config, &root)?;
    let mut surface = sunflower::CpuSurface::new();
    if let Some(font) = &config.font {
        let rel = sunflower::normalize_rel_path(font)?;
        let font_path = root.join(rel);
        let bytes = std::fs::read(&font_path)
            .with_context(|| format!("read font '{}'", font_path.display()))?;
        surface = surface.with_font(bytes);
    }

    Ok(Session {
        config,
        sunflower,
        surface,
    })
}

fn playback_opts(
    config: &sunflower::SunflowerConfig,
    args: &PlaybackArgs,
    hold_ms: u64,
) -> sunflower::PlaybackOpts {
    let button = sunflower::RestartControl::button_rect().center();
    sunflower::PlaybackOpts {
        fps: config.fps,
        hold_after_idle: Duration::from_millis(hold_ms),
        taps: args
            .tap_at_ms
            .iter()
            .map(|ms| sunflower::ScriptedTap {
                at: Duration::from_millis(*ms),
                point: button,
            })
            .collect(),
        ..sunflower::PlaybackOpts::default()
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let s = load_session(args.playback.config.as_deref())?;
    let opts = playback_opts(&s.config, &args.playback, 0);
    let mut player = sunflower::Player::new(s.sunflower, s.surface, s.config.canvas, opts)?;

    let frame = player.render_frame_at(Duration::from_millis(args.at_ms))?;
    sunflower::write_png(&args.out, &frame, &mut Vec::new())?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let s = load_session(args.playback.config.as_deref())?;
    let opts = playback_opts(&s.config, &args.playback, args.hold_ms);
    let mut player = sunflower::Player::new(s.sunflower, s.surface, s.config.canvas, opts)?;

    let mut sink = sunflower::PngSequenceSink::new(&args.out_dir);
    let summary = player.run(&mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        summary.frames,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let s = load_session(args.playback.config.as_deref())?;
    let opts = playback_opts(&s.config, &args.playback, args.hold_ms);
    let sink_opts = sunflower::FfmpegSinkOpts::from_config(&s.config, &args.out)
        .overwrite(args.overwrite);
    let mut player = sunflower::Player::new(s.sunflower, s.surface, s.config.canvas, opts)?;

    let mut sink = sunflower::FfmpegSink::new(sink_opts);
    let summary = player.run(&mut sink)?;

    eprintln!("wrote {} ({} frames)", args.out.display(), summary.frames);
    Ok(())
}
