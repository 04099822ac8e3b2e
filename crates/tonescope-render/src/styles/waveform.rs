//! Raw time-domain waveform.

use glam::Vec2;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const TRACE_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);

/// Draws the analysis window directly as an amplitude trace.
pub struct Waveform {
    window_len: usize,
    points: Vec<Vec2>,
}

impl Waveform {
    /// Creates a waveform over one analysis window.
    pub fn new(fft_size: usize) -> Self {
        Self {
            window_len: fft_size,
            points: Vec::with_capacity(fft_size),
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

        let window = &input.primary().window;
        let count = self.window_len.min(window.len());
        if count < 2 {
            return;
        }

        self.points.clear();
        for (i, &sample) in window[..count].iter().enumerate() {
            let x = -1.0 + 2.0 * i as f32 / (count - 1) as f32;
            // Scaled down slightly to keep full-scale input off the edges.
            let y = sample * 0.8;
            self.points.push(Vec2::new(x, y));
        }
        canvas.line_strip(&self.points, TRACE_COLOR, 5.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn short_window_does_not_panic() {
        let mut style = Waveform::new(1024);
        let mut canvas = Canvas::new(800, 600);
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.1],
            amplitude: 0.1,
        }];
        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &sources,
                time: 0.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        assert!(canvas.ops().is_empty());
    }
}
