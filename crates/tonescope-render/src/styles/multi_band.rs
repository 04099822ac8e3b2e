//! Three stacked bipolar band waveforms.

use glam::Vec2;
use tonescope_core::bands;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const LOW_COLOR: Color = Color::rgb(0.0, 0.0, 1.0);
const MID_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const HIGH_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);

const LOW_CUTOFF: f32 = 200.0;
const MID_CUTOFF: f32 = 2000.0;
const HIGH_CUTOFF: f32 = 20_000.0;

const POINTS: usize = 200;

/// Low/mid/high band traces stacked bottom to top, each displayed
/// bipolar around its own baseline.
pub struct MultiBandWaveform {
    fft_size: usize,
    sample_rate: u32,
    points: Vec<Vec2>,
}

impl MultiBandWaveform {
    /// Creates the style for the given FFT geometry.
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        Self {
            fft_size,
            sample_rate,
            points: Vec::with_capacity(POINTS),
        }
    }

    /// No per-resolution state.
    pub fn initialize(&mut self, _width: u32, _height: u32) {}

    /// Offline entry point.
    pub fn render_frame(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    /// Live entry point.
    pub fn render_live(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    fn render(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        canvas.begin_frame(Color::BLACK);

        let spectrum = &input.primary().spectrum;
        let hz_to_bin =
            |hz: f32| (hz * self.fft_size as f32 / self.sample_rate as f32) as usize;

        let low_bin = hz_to_bin(LOW_CUTOFF);
        let mid_bin = hz_to_bin(MID_CUTOFF);
        let high_bin = hz_to_bin(HIGH_CUTOFF);

        let low = bands::resample_range(spectrum, 0, low_bin, POINTS);
        let mid = bands::resample_range(spectrum, low_bin, mid_bin, POINTS);
        let high = bands::resample_range(spectrum, mid_bin, high_bin, POINTS);

        // Band-specific boosts: lows read quieter after normalization.
        self.draw_band(canvas, &low, -0.6, 0.3 * 2.0, LOW_COLOR);
        self.draw_band(canvas, &mid, 0.0, 0.3 * 1.5, MID_COLOR);
        self.draw_band(canvas, &high, 0.6, 0.3, HIGH_COLOR);
    }

    fn draw_band(
        &mut self,
        canvas: &mut Canvas,
        band: &[f32],
        y_offset: f32,
        height: f32,
        color: Color,
    ) {
        if band.is_empty() {
            return;
        }
        self.points.clear();
        let spacing = 2.0 / (band.len() - 1).max(1) as f32;
        for (i, &value) in band.iter().enumerate() {
            let x = -1.0 + i as f32 * spacing;
            // Map [0,1] to a bipolar excursion around the baseline.
            let y = y_offset + (value * 2.0 - 1.0) * height;
            self.points.push(Vec2::new(x, y));
        }
        canvas.line_strip(&self.points, color, 5.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::{SampleBuffer, SpectralAnalyzer, SpectralFrame, WindowKind};

    #[test]
    fn renders_three_band_strips() {
        let buffer = SampleBuffer::new(
            (0..44_100)
                .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44_100.0).sin())
                .collect(),
            44_100,
        );
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let sources = [SourceAnalysis {
            spectrum: analyzer.analyze(&buffer, 0, WindowKind::Hann),
            window: vec![0.0; 1024],
            amplitude: 0.5,
        }];

        let mut style = MultiBandWaveform::new(1024, 44_100);
        let mut canvas = Canvas::new(800, 600);
        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &sources,
                time: 0.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        assert_eq!(canvas.ops().len(), 3);
    }

    #[test]
    fn silence_renders_flat_baselines() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        }];
        let mut style = MultiBandWaveform::new(1024, 44_100);
        let mut canvas = Canvas::new(800, 600);
        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &sources,
                time: 0.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        // Still three strips, all pinned to value 0 (bottom of excursion).
        assert_eq!(canvas.ops().len(), 3);
    }
}
