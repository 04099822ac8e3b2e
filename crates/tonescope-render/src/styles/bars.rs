//! Bar equalizer with falling peak markers.

use glam::Vec2;
use tonescope_core::{BandLayout, BandOptions, BandPlan, Divisor};

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const BAR_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const PEAK_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const PEAK_DECAY_RATE: f32 = 0.005;

/// Log-spaced bar equalizer; the mini variant doubles the bar count.
pub struct BarEqualizer {
    plan: BandPlan,
    levels: Vec<f32>,
    peak_heights: Vec<f32>,
    peak_decay: Vec<f32>,
}

impl BarEqualizer {
    /// Standard 16-bar layout.
    pub fn standard(fft_size: usize, sample_rate: u32) -> Self {
        Self::with_bars(16, fft_size, sample_rate)
    }

    /// 32-bar layout for the mini logical viewport.
    pub fn mini(fft_size: usize, sample_rate: u32) -> Self {
        Self::with_bars(32, fft_size, sample_rate)
    }

    fn with_bars(bars: usize, fft_size: usize, sample_rate: u32) -> Self {
        let plan = BandPlan::new(
            &BandLayout::LogFrequency {
                min_hz: 20.0,
                max_hz: 20_000.0,
                bands: bars,
            },
            fft_size,
            sample_rate,
            BandOptions {
                weight_exponent: Some(0.3),
                index_gain: 1.0,
                // Low frequencies carry far more energy, so they divide harder.
                divisor: Divisor::Thirds {
                    low: 50.0,
                    mid: 35.0,
                    high: 25.0,
                },
                ..Default::default()
            },
        );
        Self {
            levels: Vec::with_capacity(plan.bands()),
            peak_heights: vec![0.0; plan.bands()],
            peak_decay: vec![0.0; plan.bands()],
            plan,
        }
    }

    /// Stores window dimensions; bar geometry is resolution independent.
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

        self.plan.levels_into(&input.primary().spectrum, &mut self.levels);
        let bars = self.levels.len();
        let bar_width = 2.0 / bars as f32;

        for (i, &height) in self.levels.iter().enumerate() {
            let x_left = -1.0 + i as f32 * bar_width;
            let x_right = x_left + bar_width * 0.8;

            canvas.fill_rect(
                Vec2::new(x_left, -1.0),
                Vec2::new(x_right, -1.0 + height * 2.0),
                BAR_COLOR,
            );

            // Peak tracking: snap up instantly, fall back with an
            // accelerating decay.
            if height > self.peak_heights[i] {
                self.peak_heights[i] = height;
                self.peak_decay[i] = 0.0;
            } else {
                self.peak_decay[i] += PEAK_DECAY_RATE;
                self.peak_heights[i] =
                    height.max(self.peak_heights[i] - self.peak_decay[i] * self.peak_decay[i]);
            }

            let peak_y = -1.0 + self.peak_heights[i] * 2.0;
            canvas.line(
                Vec2::new(x_left, peak_y),
                Vec2::new(x_right, peak_y),
                PEAK_COLOR,
                3.0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::{SampleBuffer, SpectralAnalyzer, WindowKind};

    fn input_for(samples: Vec<f32>) -> Vec<SourceAnalysis> {
        let buffer = SampleBuffer::new(samples, 44_100);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let spectrum = analyzer.analyze(&buffer, 0, WindowKind::Rect);
        let mut window = vec![0.0; 1024];
        buffer.fill_window(0, &mut window);
        vec![SourceAnalysis {
            spectrum,
            window,
            amplitude: buffer.mean_abs(0, 1024),
        }]
    }

    #[test]
    fn peaks_decay_after_burst() {
        let mut style = BarEqualizer::standard(1024, 44_100);
        let mut canvas = Canvas::new(800, 600);

        let loud = input_for(
            (0..44_100)
                .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44_100.0).sin())
                .collect(),
        );
        let silent = input_for(vec![0.0; 44_100]);

        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &loud,
                time: 0.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        let peak_after_burst: f32 = style.peak_heights.iter().copied().fold(0.0, f32::max);
        assert!(peak_after_burst > 0.0);

        for frame in 0..600 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &silent,
                    time: frame as f32 / 30.0,
                    dt: 1.0 / 30.0,
                    cursor: 0,
                },
            );
        }
        let peak_after_silence: f32 = style.peak_heights.iter().copied().fold(0.0, f32::max);
        assert!(
            peak_after_silence < peak_after_burst,
            "peaks did not fall: {} -> {}",
            peak_after_burst,
            peak_after_silence
        );
    }

    #[test]
    fn mini_doubles_bar_count() {
        assert_eq!(BarEqualizer::standard(1024, 44_100).plan.bands(), 16);
        assert_eq!(BarEqualizer::mini(1024, 44_100).plan.bands(), 32);
    }
}
