//! Analysis configuration shared by both run modes.

use crate::{CoreError, Result};

/// Configuration for the spectral analysis pipeline.
///
/// One instance is built at startup from the CLI surface and passed by
/// reference through the frame driver; nothing here changes mid-run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Sample rate of the loaded sources in Hz.
    pub sample_rate: u32,
    /// FFT size (power of two). All analysis windows are this long.
    pub fft_size: usize,
    /// Output frame rate used by the offline clock and the live limiter.
    pub fps: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            fft_size: 1024,
            fps: 30,
        }
    }
}

impl AnalysisConfig {
    /// Validates the configuration before any analysis runs.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(CoreError::InvalidConfig("sample rate must be non-zero".into()));
        }
        if !self.fft_size.is_power_of_two() || self.fft_size < 64 {
            return Err(CoreError::InvalidConfig(format!(
                "FFT size must be a power of two >= 64, got {}",
                self.fft_size
            )));
        }
        if self.fps == 0 || self.fps > 240 {
            return Err(CoreError::InvalidConfig(format!(
                "frame rate out of range: {}",
                self.fps
            )));
        }
        Ok(())
    }
}
