//! Tonescope - Real-time audio music visualizer
//!
//! Decodes WAV input, runs the spectral analysis core once per frame,
//! and renders one of the registered visual styles - either live
//! (device-paced window playback) or offline (deterministic frame loop
//! muxed to H.264/AAC).

mod app;
mod driver;
mod live;
#[cfg(feature = "ffmpeg")]
mod offline;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tonescope_core::{AnalysisConfig, SampleBuffer, SourceSet, MAX_SOURCES};
use tonescope_media::load_wav;
use tonescope_render::StyleKind;

use crate::app::App;
#[cfg(feature = "ffmpeg")]
use crate::offline::OfflineOutcome;

/// Command-line surface.
#[derive(Parser, Debug)]
#[command(name = "tonescope", version, about = "Real-time audio music visualizer")]
struct Cli {
    /// Visual style name or alias (case-insensitive).
    #[arg(short, long, default_value = "bars")]
    style: String,

    /// Record to a video file instead of playing live.
    #[arg(long, value_name = "PATH")]
    record: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Render width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Render height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Input WAV files (44.1 kHz, up to 9).
    #[arg(required = true, num_args = 1.., value_name = "FILE")]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    if cli.inputs.len() > MAX_SOURCES {
        bail!(
            "too many input files: {} (maximum is {})",
            cli.inputs.len(),
            MAX_SOURCES
        );
    }

    // Unknown style names fall back to the default rather than failing,
    // matching the registry's tolerant lookup.
    let kind = StyleKind::from_name(&cli.style).unwrap_or_else(|| {
        warn!("unknown style '{}', defaulting to bars", cli.style);
        StyleKind::Bars
    });

    // Input errors are fatal before any rendering begins.
    let mut wavs = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let wav = load_wav(path).with_context(|| format!("loading {}", path.display()))?;
        wavs.push(wav);
    }

    let config = AnalysisConfig {
        fps: cli.fps,
        ..Default::default()
    };
    config.validate()?;

    let buffers: Vec<SampleBuffer> = wavs.iter().map(|w| w.mono.clone()).collect();
    let sources = SourceSet::new(buffers)?;

    info!(
        "{} source(s), {:.2} s, style: {}",
        sources.count(),
        sources.len() as f64 / config.sample_rate as f64,
        kind.display_name()
    );

    let mut app = App::new(config, sources, wavs, kind, cli.width, cli.height)?;

    match cli.record {
        #[cfg(feature = "ffmpeg")]
        Some(output) => match offline::run(&mut app, &output)? {
            OfflineOutcome::Completed => Ok(()),
            OfflineOutcome::FallbackToLive => live::run(&mut app),
        },
        #[cfg(not(feature = "ffmpeg"))]
        Some(_) => {
            warn!("built without the ffmpeg feature; --record unavailable, playing live");
            live::run(&mut app)
        }
        None => live::run(&mut app),
    }
}
