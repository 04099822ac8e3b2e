//! Offline rendering: deterministic frame loop muxed to H.264/AAC.
//!
//! Strictly single-threaded. Per frame, in order: time-base offset,
//! spectral analysis, style render, rasterize, submit video frame,
//! encode the frame's audio slice. Frames are never skipped or
//! reordered - the encoder's timestamps derive from the frame index.

use std::path::Path;

use anyhow::Result;
use minifb::{Key, Window, WindowOptions};
use tracing::{error, info, warn};

use tonescope_core::OfflineClock;
use tonescope_media::{EncoderConfig, VideoEncoder};
use tonescope_render::FrameInput;

use crate::app::App;
use crate::driver::analyze_sources;

/// How an offline run ended.
pub enum OfflineOutcome {
    /// The video was written (possibly truncated by a window close).
    Completed,
    /// Encoder setup failed; the caller should run live mode instead.
    FallbackToLive,
}

/// Renders and encodes the whole input, frame by frame.
pub fn run(app: &mut App, output: &Path) -> Result<OfflineOutcome> {
    // Stereo is preserved only for a single stereo input; any mix of
    // sources encodes the mono sum.
    let channels = if app.wavs.len() == 1 && app.wavs[0].channel_count() >= 2 {
        2
    } else {
        1
    };

    let encoder_config = EncoderConfig {
        width: app.width,
        height: app.height,
        fps: app.config.fps,
        sample_rate: app.config.sample_rate,
        channels,
        ..Default::default()
    };

    let mut encoder = match VideoEncoder::new(output, encoder_config) {
        Ok(encoder) => encoder,
        Err(e) => {
            // Unrecoverable init failure: fall back to plain windowed
            // playback without recording.
            error!("video encoder unavailable: {e}");
            return Ok(OfflineOutcome::FallbackToLive);
        }
    };

    let mut window = Window::new(
        &app.window_title(),
        app.width as usize,
        app.height as usize,
        WindowOptions::default(),
    )
    .map_err(|e| anyhow::anyhow!("failed to open window: {e}"))?;
    window.set_target_fps(app.config.fps as usize);

    let clock = OfflineClock::new(app.config.fps, app.config.sample_rate);
    let total_frames = clock.total_frames(app.sources.len());
    let dt = 1.0 / app.config.fps as f32;
    let window_kind = app.kind.window_kind();

    info!("offline render: {} frames -> {}", total_frames, output.display());

    let mut framebuffer_rgba: Vec<u8> = Vec::new();
    let mut framebuffer_argb: Vec<u32> = Vec::new();
    let mut mono_slice: Vec<f32> = Vec::new();

    let mut rendered = 0u64;
    for frame in 0..total_frames {
        // Cancellation is checked once per frame; whatever has been
        // encoded so far is finalized below.
        if !window.is_open() || window.is_key_down(Key::Escape) {
            warn!("window closed at frame {}/{}", frame, total_frames);
            break;
        }

        let offset = clock.sample_offset(frame);
        let analyses = analyze_sources(&mut app.analyzer, &app.sources, offset, window_kind);
        let input = FrameInput {
            sources: &analyses,
            time: clock.seconds(frame) as f32,
            dt,
            cursor: offset,
        };

        app.style.render_frame(&mut app.canvas, &input);
        app.renderer.render(&app.canvas);

        app.renderer.copy_argb(&mut framebuffer_argb);
        window
            .update_with_buffer(&framebuffer_argb, app.width as usize, app.height as usize)
            .map_err(|e| anyhow::anyhow!("window update: {e}"))?;

        // Per-frame encoder errors are logged, not fatal; the loop and
        // the timestamps keep going.
        app.renderer.copy_rgba(&mut framebuffer_rgba);
        if let Err(e) = encoder.write_video_frame(&framebuffer_rgba) {
            error!("frame {frame}: {e}");
        }

        let slice_start = offset;
        let slice_end = clock.sample_offset(frame + 1).min(app.sources.len());
        if let Err(e) = write_audio_slice(app, &mut encoder, slice_start, slice_end, &mut mono_slice)
        {
            error!("frame {frame} audio: {e}");
        }

        rendered += 1;
    }

    encoder.finish()?;
    info!("encoded {}/{} frames to {}", rendered, total_frames, output.display());
    Ok(OfflineOutcome::Completed)
}

fn write_audio_slice(
    app: &App,
    encoder: &mut VideoEncoder,
    start: u64,
    end: u64,
    mono: &mut Vec<f32>,
) -> tonescope_media::Result<()> {
    if end <= start {
        return Ok(());
    }

    if encoder.config().channels >= 2 {
        // Single stereo source: pass its channels through.
        let wav = &app.wavs[0];
        let plane = |channel: usize| -> &[f32] {
            let data: &[f32] = &wav.channels[channel];
            let lo = (start as usize).min(data.len());
            let hi = (end as usize).min(data.len());
            &data[lo..hi]
        };
        let left = plane(0);
        let right = plane(1);
        // Planes must stay equal length; clamp to the shorter tail.
        let len = left.len().min(right.len());
        return encoder.write_audio(&[&left[..len], &right[..len]]);
    }

    mono.clear();
    for offset in start..end {
        mono.push(app.sources.mixed(offset));
    }
    encoder.write_audio(&[mono.as_slice()])
}
