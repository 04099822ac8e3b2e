//! Live playback: audio-device callback paces a windowed render loop.
//!
//! Two threads. The cpal output callback is the sole writer of the
//! shared cursor and the FFT window snapshot; it never blocks beyond
//! the snapshot copy. The render loop is the sole reader, paced by the
//! window's sleep-based frame limiter.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::{debug, error, info, warn};

use tonescope_core::{LiveCursor, SourceSet};
use tonescope_render::FrameInput;

use crate::app::App;
use crate::driver::analyze_sources_live;

/// Device buffer size requested from the audio backend.
const FRAMES_PER_BUFFER: u32 = 512;

/// Plays the sources on the default output device while rendering.
pub fn run(app: &mut App) -> Result<()> {
    let cursor = Arc::new(LiveCursor::new(app.config.fft_size));
    let stream = build_stream(app, cursor.clone())?;
    stream.play().context("starting audio stream")?;

    let mut window = Window::new(
        &app.window_title(),
        app.width as usize,
        app.height as usize,
        WindowOptions::default(),
    )
    .map_err(|e| anyhow!("failed to open window: {e}"))?;
    window.set_target_fps(60);

    info!("live playback started ({} Hz)", app.config.sample_rate);

    let mut framebuffer: Vec<u32> = Vec::new();
    let mut snapshot: Vec<f32> = Vec::new();
    let mut last_frame = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if cursor.is_finished() {
            info!("playback finished");
            break;
        }

        // Tab cycles to the next registered style.
        if window.is_key_pressed(Key::Tab, KeyRepeat::No) {
            app.cycle_style();
            window.set_title(&app.window_title());
            info!("style: {}", app.kind.display_name());
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let offset = cursor.position();
        cursor.snapshot_window(&mut snapshot);

        let analyses = analyze_sources_live(
            &mut app.analyzer,
            &app.sources,
            &snapshot,
            offset,
            app.kind.window_kind(),
        );
        let input = FrameInput {
            sources: &analyses,
            time: offset as f32 / app.config.sample_rate as f32,
            dt,
            cursor: offset,
        };

        app.style.render_live(&mut app.canvas, &input);
        app.renderer.render(&app.canvas);
        app.renderer.copy_argb(&mut framebuffer);
        window
            .update_with_buffer(&framebuffer, app.width as usize, app.height as usize)
            .map_err(|e| anyhow!("window update: {e}"))?;
    }

    drop(stream);
    Ok(())
}

fn build_stream(app: &App, cursor: Arc<LiveCursor>) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no audio output device available"))?;
    let default_config = device
        .default_output_config()
        .context("querying audio device")?;

    let channels = default_config.channels().max(1);
    let mut config = StreamConfig {
        channels,
        sample_rate: SampleRate(app.config.sample_rate),
        buffer_size: BufferSize::Fixed(FRAMES_PER_BUFFER),
    };

    debug!("audio device: {:?}, {} ch", device.name(), channels);

    let sources = app.sources.clone();
    let fft_size = app.config.fft_size;

    match build_output(&device, &config, sources.clone(), cursor.clone(), fft_size) {
        Ok(stream) => Ok(stream),
        Err(e) => {
            // Some backends refuse fixed buffer sizes; retry with the
            // device default before giving up.
            warn!("fixed buffer size rejected ({e}); retrying with default");
            config.buffer_size = BufferSize::Default;
            build_output(&device, &config, sources, cursor, fft_size)
                .context("opening audio stream")
        }
    }
}

fn build_output(
    device: &cpal::Device,
    config: &StreamConfig,
    sources: SourceSet,
    cursor: Arc<LiveCursor>,
    fft_size: usize,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let channels = config.channels as usize;
    let mut window = vec![0.0f32; fft_size];

    device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            let position = cursor.position();

            // Fill every output channel with the mono mix; silence past
            // the end of the longest buffer.
            let frames = data.len() / channels.max(1);
            for frame in 0..frames {
                let sample = sources.mixed(position + frame as u64);
                for channel in 0..channels {
                    data[frame * channels + channel] = sample;
                }
            }

            // Publish the analysis window starting at this callback's
            // position, then advance the cursor.
            for (i, slot) in window.iter_mut().enumerate() {
                *slot = sources.mixed(position + i as u64);
            }
            cursor.store_window(&window);
            cursor.advance(frames);

            if sources.is_exhausted(position + frames as u64) {
                cursor.mark_finished();
            }
        },
        |e| error!("audio stream error: {e}"),
        None,
    )
}
