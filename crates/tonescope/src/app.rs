//! Application context shared by both run modes.
//!
//! Buffers, the FFT plan and the active style live in one struct
//! constructed at startup and passed by reference through the frame
//! drivers. No process-wide state.

use anyhow::Result;

use tonescope_core::{AnalysisConfig, SourceSet, SpectralAnalyzer};
use tonescope_media::WavSource;
use tonescope_render::{Canvas, SoftwareRenderer, Style, StyleKind};

/// Everything one run owns: analysis config and plan, decoded sources,
/// the active style and the rasterization target.
pub struct App {
    /// Validated analysis configuration.
    pub config: AnalysisConfig,
    /// Mono analysis buffers behind the shared cursor.
    pub sources: SourceSet,
    /// Decoded inputs with their original channel data (for encoding).
    pub wavs: Vec<WavSource>,
    /// Active style instance.
    pub style: Style,
    /// Identifier of the active style.
    pub kind: StyleKind,
    /// Planned FFT, reused every frame.
    pub analyzer: SpectralAnalyzer,
    /// Draw list reused every frame.
    pub canvas: Canvas,
    /// Software rasterizer and framebuffer.
    pub renderer: SoftwareRenderer,
    /// Render width in pixels.
    pub width: u32,
    /// Render height in pixels.
    pub height: u32,
}

impl App {
    /// Builds the context and initializes the style for the window.
    pub fn new(
        config: AnalysisConfig,
        sources: SourceSet,
        wavs: Vec<WavSource>,
        kind: StyleKind,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let analyzer = SpectralAnalyzer::new(config.fft_size, config.sample_rate);
        let mut style = Style::new(kind, config.fft_size, config.sample_rate);
        style.initialize(width, height);

        Ok(Self {
            canvas: Canvas::new(width, height),
            renderer: SoftwareRenderer::new(width, height)?,
            config,
            sources,
            wavs,
            style,
            kind,
            analyzer,
            width,
            height,
        })
    }

    /// Swaps in the next registered style, re-running its init hook
    /// with the current dimensions.
    pub fn cycle_style(&mut self) {
        self.kind = self.kind.next();
        self.style = Style::new(self.kind, self.config.fft_size, self.config.sample_rate);
        self.style.initialize(self.width, self.height);
    }

    /// Window title for the current style.
    pub fn window_title(&self) -> String {
        format!("Tonescope - {}", self.kind.display_name())
    }
}
