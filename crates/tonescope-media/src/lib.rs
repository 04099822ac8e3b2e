//! Tonescope Media - WAV Input and Video Output
//!
//! This crate provides the media edges of the pipeline:
//! - WAV decoding via `hound`, with mono downmix for analysis
//! - H.264/AAC muxing via FFmpeg for offline rendering
//!
//! Everything in here is plumbing around external libraries; the
//! analysis core never touches a file or a codec.

use thiserror::Error;

#[cfg(feature = "ffmpeg")]
pub mod encoder;
pub mod wav;

#[cfg(feature = "ffmpeg")]
pub use encoder::{EncoderConfig, VideoEncoder};
pub use wav::{load_wav, WavSource};

/// Media errors
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to open file: {0}")]
    FileOpen(String),

    #[error("WAV decode error: {0}")]
    Decode(#[from] hound::Error),

    #[error("Unsupported sample rate: {found} Hz (expected {expected} Hz)")]
    UnsupportedSampleRate {
        found: u32,
        expected: u32,
    },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u16),

    #[error("File contains no samples: {0}")]
    EmptyFile(String),

    #[error("Encoder not found: {0}")]
    CodecNotFound(&'static str),

    #[error("Encoder initialization failed: {0}")]
    EncoderInit(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;
