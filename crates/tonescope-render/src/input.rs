//! Per-frame analysis inputs handed to the active style.
//!
//! The frame driver runs the core pipeline once per source per frame
//! and packages the results here; styles read, never write.

use tonescope_core::SpectralFrame;

/// Analysis results for one source at the current cursor.
pub struct SourceAnalysis {
    /// Spectral frame at the cursor, windowed per the style's choice.
    pub spectrum: SpectralFrame,
    /// The raw (untapered) analysis window at the cursor, zero-padded
    /// past the buffer end.
    pub window: Vec<f32>,
    /// Mean absolute amplitude over the window, before any style gain.
    pub amplitude: f32,
}

/// Everything a style sees for one output frame.
pub struct FrameInput<'a> {
    /// One analysis per loaded source, in CLI order.
    pub sources: &'a [SourceAnalysis],
    /// Presentation time in seconds. Offline this is `frame / fps`;
    /// live it is derived from the device cursor.
    pub time: f32,
    /// Seconds advanced since the previous frame.
    pub dt: f32,
    /// Sample offset the analysis windows start at.
    pub cursor: u64,
}

impl<'a> FrameInput<'a> {
    /// The first source; single-view styles analyze only this one.
    pub fn primary(&self) -> &SourceAnalysis {
        &self.sources[0]
    }
}
