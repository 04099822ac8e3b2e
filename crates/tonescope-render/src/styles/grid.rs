//! Log-spaced brightness grid.

use glam::Vec2;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const GRID_SIZE: usize = 16;
const MIN_FREQ: f32 = 20.0;
const MAX_FREQ: f32 = 20_000.0;
const LINE_COLOR: Color = Color::rgb(0.2, 0.2, 0.2);

/// 16x16 grid of cells, each lit by one log-spaced frequency sample.
pub struct GridVisualizer {
    fft_size: usize,
    sample_rate: u32,
    magnitudes: Vec<f32>,
}

impl GridVisualizer {
    /// Creates the style for the given FFT geometry.
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        Self {
            fft_size,
            sample_rate,
            magnitudes: vec![0.0; GRID_SIZE * GRID_SIZE],
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
        let max_bin = self.fft_size / 2;
        let log_min = MIN_FREQ.log10();
        let log_step = (MAX_FREQ.log10() - log_min) / (GRID_SIZE * GRID_SIZE) as f32;

        for (i, slot) in self.magnitudes.iter_mut().enumerate() {
            let freq = 10f32.powf(log_min + i as f32 * log_step);
            let bin = ((freq * self.fft_size as f32 / self.sample_rate as f32) as usize)
                .min(max_bin.saturating_sub(1));

            let mut magnitude = spectrum.magnitude(bin);
            magnitude *= (bin as f32 / max_bin as f32).powf(0.3) * 1.25;
            *slot = (magnitude / 20.0).clamp(0.0, 1.0);
        }

        // Cells fill bottom-left upward, then the next column.
        let cell = 2.0 / GRID_SIZE as f32;
        for (i, &brightness) in self.magnitudes.iter().enumerate() {
            let col = i / GRID_SIZE;
            let row = i % GRID_SIZE;
            let min = Vec2::new(-1.0 + col as f32 * cell, -1.0 + row as f32 * cell);
            canvas.fill_rect(
                min,
                min + Vec2::splat(cell),
                Color::rgb(brightness, brightness, brightness),
            );
        }

        let mut lines: Vec<(Vec2, Vec2)> = Vec::with_capacity((GRID_SIZE + 1) * 2);
        for i in 0..=GRID_SIZE {
            let pos = -1.0 + i as f32 * cell;
            lines.push((Vec2::new(pos, -1.0), Vec2::new(pos, 1.0)));
            lines.push((Vec2::new(-1.0, pos), Vec2::new(1.0, pos)));
        }
        canvas.lines(&lines, LINE_COLOR, 1.0);
    }
}
