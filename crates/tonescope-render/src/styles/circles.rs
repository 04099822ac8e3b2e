//! Concentric band-modulated circle waveforms.

use glam::Vec2;
use tonescope_core::bands;
use tonescope_core::SpectralFrame;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const LOW_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const MID_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const HIGH_COLOR: Color = Color::rgb(0.0, 0.0, 1.0);

const LOW_CUTOFF: f32 = 250.0;
const MID_CUTOFF: f32 = 2000.0;
const HIGH_CUTOFF: f32 = 20_000.0;

const LOW_RADIUS: f32 = 0.2;
const MID_RADIUS: f32 = 0.5;
const HIGH_RADIUS: f32 = 0.8;
const THICKNESS: f32 = 0.15;

const RING_POINTS: usize = 100;

/// Three rings (low inner, mid middle, high outer), each modulated by
/// its band's per-bin levels. With several sources loaded, the screen
/// subdivides into a grid with one ring set per source.
pub struct CircleWaveform {
    fft_size: usize,
    sample_rate: u32,
    line_width: f32,
    ring: Vec<Vec2>,
}

impl CircleWaveform {
    /// Standard variant.
    pub fn standard(fft_size: usize, sample_rate: u32) -> Self {
        Self::with_line_width(5.0, fft_size, sample_rate)
    }

    /// Mini-viewport variant (thinner strokes read better at 128x43).
    pub fn mini(fft_size: usize, sample_rate: u32) -> Self {
        Self::with_line_width(4.0, fft_size, sample_rate)
    }

    fn with_line_width(line_width: f32, fft_size: usize, sample_rate: u32) -> Self {
        Self {
            fft_size,
            sample_rate,
            line_width,
            ring: Vec::with_capacity(RING_POINTS + 1),
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

        let (rows, cols) = grid_dimensions(input.sources.len());
        let cell_scale = 1.0 / cols.max(rows) as f32;

        for (index, source) in input.sources.iter().enumerate() {
            let col = index % cols;
            let row = index / cols;
            // Cell centers in NDC, top-left cell first.
            let center = Vec2::new(
                -1.0 + (2.0 * col as f32 + 1.0) / cols as f32,
                1.0 - (2.0 * row as f32 + 1.0) / rows as f32,
            );
            self.draw_source(canvas, &source.spectrum, center, cell_scale);
        }
    }

    fn draw_source(
        &mut self,
        canvas: &mut Canvas,
        spectrum: &SpectralFrame,
        center: Vec2,
        scale: f32,
    ) {
        let hz_to_bin =
            |hz: f32| (hz * self.fft_size as f32 / self.sample_rate as f32) as usize;
        let low_bin = hz_to_bin(LOW_CUTOFF);
        let mid_bin = hz_to_bin(MID_CUTOFF);
        let high_bin = hz_to_bin(HIGH_CUTOFF);

        // Higher bands get extra gain; they carry much less energy.
        let low = bands::bin_levels(spectrum, 0, low_bin, 0.5, 1.0, 12.5);
        let mid = bands::bin_levels(spectrum, low_bin, mid_bin, 0.5, 2.0, 12.5);
        let high = bands::bin_levels(spectrum, mid_bin, high_bin, 0.5, 3.0, 12.5);

        let thickness = THICKNESS * 1.5;
        self.draw_ring(canvas, &low, LOW_RADIUS, thickness, LOW_COLOR, center, scale);
        self.draw_ring(canvas, &mid, MID_RADIUS, thickness, MID_COLOR, center, scale);
        self.draw_ring(canvas, &high, HIGH_RADIUS, thickness, HIGH_COLOR, center, scale);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_ring(
        &mut self,
        canvas: &mut Canvas,
        band: &[f32],
        radius: f32,
        thickness: f32,
        color: Color,
        center: Vec2,
        scale: f32,
    ) {
        self.ring.clear();
        for i in 0..=RING_POINTS {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / RING_POINTS as f32;
            let index = i * band.len() / RING_POINTS.max(1);
            let amplitude = band.get(index).copied().unwrap_or(0.0) * thickness;

            let r = (radius + amplitude) * scale;
            self.ring
                .push(center + Vec2::new(r * angle.cos(), r * angle.sin()));
        }
        canvas.line_strip(&self.ring, color, self.line_width);
    }
}

fn grid_dimensions(sources: usize) -> (usize, usize) {
    let cols = (sources as f32).sqrt().ceil() as usize;
    let rows = sources.div_ceil(cols.max(1));
    (rows.max(1), cols.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn grid_layout_shapes() {
        assert_eq!(grid_dimensions(1), (1, 1));
        assert_eq!(grid_dimensions(2), (1, 2));
        assert_eq!(grid_dimensions(4), (2, 2));
        assert_eq!(grid_dimensions(5), (2, 3));
        assert_eq!(grid_dimensions(9), (3, 3));
    }

    #[test]
    fn one_ring_set_per_source() {
        let source = || SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        };
        let sources = [source(), source(), source()];

        let mut style = CircleWaveform::standard(1024, 44_100);
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
        assert_eq!(canvas.ops().len(), 9);
    }
}
