//! WAV file loading.
//!
//! Decodes uncompressed WAV input with `hound`, keeping both the mono
//! downmix the analyzer consumes and the original channel data for the
//! encoded output's audio track.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use tracing::info;

use tonescope_core::SampleBuffer;

use crate::{MediaError, Result};

/// Sample rate every input must match.
pub const REQUIRED_SAMPLE_RATE: u32 = 44_100;

/// One decoded WAV input.
#[derive(Debug, Clone)]
pub struct WavSource {
    /// Path the file was loaded from.
    pub path: PathBuf,
    /// Mono downmix (arithmetic mean across channels) for analysis.
    pub mono: SampleBuffer,
    /// Original de-interleaved channel data, preserved for encoding.
    pub channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl WavSource {
    /// Number of channels in the original file.
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.mono.duration_secs()
    }
}

/// Loads a WAV file, rejecting anything the pipeline cannot run on.
///
/// Input errors here are fatal at startup: the caller reports them and
/// exits before any rendering begins.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<WavSource> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)
        .map_err(|e| MediaError::FileOpen(format!("{}: {}", path.display(), e)))?;

    let spec = reader.spec();
    if spec.sample_rate != REQUIRED_SAMPLE_RATE {
        return Err(MediaError::UnsupportedSampleRate {
            found: spec.sample_rate,
            expected: REQUIRED_SAMPLE_RATE,
        });
    }
    if spec.channels == 0 {
        return Err(MediaError::UnsupportedChannels(0));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if interleaved.is_empty() {
        return Err(MediaError::EmptyFile(path.display().to_string()));
    }

    let channel_count = spec.channels as usize;
    let frames = interleaved.len() / channel_count;

    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    let mut mono = Vec::with_capacity(frames);
    for frame in interleaved.chunks_exact(channel_count) {
        let mut sum = 0.0f32;
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
            sum += sample;
        }
        mono.push(sum / channel_count as f32);
    }

    info!(
        "Loaded {}: {} ch, {} frames ({:.2} s)",
        path.display(),
        channel_count,
        frames,
        frames as f64 / spec.sample_rate as f64
    );

    Ok(WavSource {
        path: path.to_path_buf(),
        mono: SampleBuffer::new(mono, spec.sample_rate),
        channels,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[f32]) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &sample in frames {
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_mono_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 44_100, &[0.0, 0.5, -0.5, 0.25]);

        let source = load_wav(&path).unwrap();
        assert_eq!(source.channel_count(), 1);
        assert_eq!(source.mono.len(), 4);
        assert!((source.mono.get(1) - 0.5).abs() < 1e-3);
        assert!((source.mono.get(2) + 0.5).abs() < 1e-3);
    }

    #[test]
    fn stereo_downmix_is_channel_mean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Interleaved L/R: L = 0.5, R = -0.5 -> mono 0.0; L = R = 0.5 -> 0.5.
        write_wav(&path, 2, 44_100, &[0.5, -0.5, 0.5, 0.5]);

        let source = load_wav(&path).unwrap();
        assert_eq!(source.channel_count(), 2);
        assert_eq!(source.mono.len(), 2);
        assert!(source.mono.get(0).abs() < 1e-3);
        assert!((source.mono.get(1) - 0.5).abs() < 1e-3);
        // Original channels are preserved for the encoder.
        assert!((source.channels[0][0] - 0.5).abs() < 1e-3);
        assert!((source.channels[1][0] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate.wav");
        write_wav(&path, 1, 48_000, &[0.0; 8]);

        match load_wav(&path) {
            Err(MediaError::UnsupportedSampleRate { found, expected }) => {
                assert_eq!(found, 48_000);
                assert_eq!(expected, 44_100);
            }
            other => panic!("expected sample rate error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_file_is_a_file_open_error() {
        match load_wav("/nonexistent/no-such.wav") {
            Err(MediaError::FileOpen(_)) => {}
            other => panic!("expected FileOpen, got {:?}", other.map(|_| ())),
        }
    }
}
