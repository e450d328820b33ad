use std::path::PathBuf;
use std::process;

use clap::Parser;

use video_saver_core::saving::infrastructure::video_saver_factory::create_video_saver;
use video_saver_core::saving::video_saver_settings::VideoSaverSettings;
use video_saver_core::shared::constants::{DEFAULT_CONTAINER_CODEC, DEFAULT_FFMPEG_BINARY};
use video_saver_core::shared::frame::Frame;

mod source;

use source::{open_source, FrameSource};

const FALLBACK_FPS: f64 = 30.0;

/// Save frames from videos or image folders into one video file.
///
/// Several inputs are placed side by side, one frame from each per time step.
#[derive(Parser)]
#[command(name = "video-saver")]
struct Cli {
    /// Output video. `.mp4` encodes through the ffmpeg executable; other
    /// extensions are written directly.
    output: PathBuf,

    /// Input video file or folder of images (repeat for side-by-side views).
    #[arg(long = "input", short = 'i', required = true)]
    inputs: Vec<PathBuf>,

    /// Output frame rate (defaults to the first video input's rate, else 30).
    #[arg(long)]
    fps: Option<f64>,

    /// Encoder for non-MP4 outputs.
    #[arg(long, default_value = DEFAULT_CONTAINER_CODEC)]
    codec: String,

    /// Copy the audio track of this video into the output (MP4 only).
    #[arg(long)]
    audio_from: Option<PathBuf>,

    /// ffmpeg executable used for MP4 outputs.
    #[arg(long, default_value = DEFAULT_FFMPEG_BINARY)]
    ffmpeg_bin: PathBuf,

    /// Stop after this many time steps.
    #[arg(long)]
    max_frames: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut sources = cli
        .inputs
        .iter()
        .map(|input| open_source(input))
        .collect::<Result<Vec<_>, _>>()?;

    let fps = resolve_fps(cli.fps, &sources);
    let mut settings = VideoSaverSettings::new(&cli.output, fps)
        .with_codec(&cli.codec)
        .with_ffmpeg_binary(&cli.ffmpeg_bin);
    if let Some(audio) = &cli.audio_from {
        settings = settings.with_audio_source(audio);
    }

    let mut saver = create_video_saver(settings)?;
    let limit = cli.max_frames.unwrap_or(usize::MAX);
    let total = sources.iter().filter_map(|s| s.frame_count()).min();

    let mut steps = 0usize;
    while steps < limit {
        let Some(batch) = next_batch(&mut sources)? else {
            break;
        };
        saver.write(&batch)?;
        steps += 1;
        if let Some(total) = total {
            eprint!("\rSaving frame {steps}/{total}");
        } else {
            eprint!("\rSaving frame {steps}");
        }
    }
    eprintln!();

    let report = saver.finish();
    report.log();

    if !report.video_saved {
        return Err(format!("{} was not saved", cli.output.display()).into());
    }
    log::info!("Output written to {} ({steps} frames)", cli.output.display());
    Ok(())
}

/// One frame per input, or `None` once any input is exhausted.
fn next_batch(
    sources: &mut [Box<dyn FrameSource>],
) -> Result<Option<Vec<Frame>>, Box<dyn std::error::Error>> {
    let mut batch = Vec::with_capacity(sources.len());
    for source in sources.iter_mut() {
        match source.next_frame()? {
            Some(frame) => batch.push(frame),
            None => return Ok(None),
        }
    }
    Ok(Some(batch))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if let Some(fps) = cli.fps {
        if !(fps > 0.0 && fps.is_finite()) {
            return Err(format!("Frame rate must be positive, got {fps}").into());
        }
    }
    if let Some(audio) = &cli.audio_from {
        if !audio.exists() {
            return Err(format!("Audio source not found: {}", audio.display()).into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn resolve_fps(requested: Option<f64>, sources: &[Box<dyn FrameSource>]) -> f64 {
    requested
        .or_else(|| sources.iter().find_map(|s| s.frame_rate()))
        .unwrap_or(FALLBACK_FPS)
}
