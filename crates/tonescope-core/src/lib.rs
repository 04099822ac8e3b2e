//! Tonescope Core - Audio Analysis Pipeline
//!
//! This crate contains the audio-to-visual mapping core:
//! - Sample buffers and multi-source handling
//! - Windowed FFT spectral analysis
//! - Frequency-band decomposition and scaling policies
//! - Live/offline time-base synchronization
//!
//! Rendering, file I/O and device output live in the sibling crates;
//! everything here is deterministic and side-effect free.

#![warn(missing_docs)]

use thiserror::Error;

pub mod analyzer;
pub mod bands;
pub mod config;
pub mod sample;
pub mod timebase;

pub use analyzer::{SpectralAnalyzer, SpectralFrame, WindowKind};
pub use bands::{BandLayout, BandOptions, BandPlan, Divisor};
pub use config::AnalysisConfig;
pub use sample::{SampleBuffer, SourceSet};
pub use timebase::{LiveCursor, OfflineClock};

/// Maximum number of simultaneously loaded audio sources.
pub const MAX_SOURCES: usize = 9;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid analysis configuration
    #[error("Invalid analysis config: {0}")]
    InvalidConfig(String),

    /// Too many audio sources for one run
    #[error("Too many audio sources: {0} (maximum is {MAX_SOURCES})")]
    TooManySources(usize),

    /// No audio sources were provided
    #[error("No audio sources")]
    NoSources,
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
