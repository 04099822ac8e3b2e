//! Decibel spectrum display; filled gradient or mini line variant.

use glam::Vec2;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const DB_RANGE: f32 = 60.0;
const MINI_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);

/// Full-width dB spectrum. The standard variant fills the area under
/// the curve with a blue-to-red gradient; the mini variant draws only
/// the peak line.
pub struct Spectrogram {
    mini: bool,
}

impl Spectrogram {
    /// Filled gradient variant.
    pub fn standard() -> Self {
        Self { mini: false }
    }

    /// Line-only variant for the mini logical viewport.
    pub fn mini() -> Self {
        Self { mini: true }
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
        let points = spectrum.len();
        if points < 2 {
            return;
        }

        if self.mini {
            let line: Vec<Vec2> = (0..points)
                .map(|i| {
                    let x = -1.0 + 2.0 * i as f32 / (points - 1) as f32;
                    Vec2::new(x, db_height(spectrum.db(i)))
                })
                .collect();
            canvas.line_strip(&line, MINI_COLOR, 1.5);
            return;
        }

        // Filled area: one slab per bin pair, flat-colored by intensity
        // (blue at the floor, red at full scale).
        for i in 0..points - 1 {
            let x0 = -1.0 + 2.0 * i as f32 / (points - 1) as f32;
            let x1 = -1.0 + 2.0 * (i + 1) as f32 / (points - 1) as f32;
            let y0 = db_height(spectrum.db(i));
            let y1 = db_height(spectrum.db(i + 1));

            let intensity = ((y0.max(y1) + 1.0) / 2.0).clamp(0.0, 1.0);
            let color = Color::rgb(intensity, 0.2 * intensity, 1.0 - intensity);

            canvas.fill_poly(
                &[
                    Vec2::new(x0, -1.0),
                    Vec2::new(x1, -1.0),
                    Vec2::new(x1, y1),
                    Vec2::new(x0, y0),
                ],
                color,
            );
        }
    }
}

fn db_height(db: f32) -> f32 {
    (db / DB_RANGE).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    fn silent_input() -> Vec<SourceAnalysis> {
        vec![SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        }]
    }

    #[test]
    fn silence_pins_curve_to_the_floor() {
        // 20*log10(epsilon) is far below the -60 dB display floor.
        assert_eq!(db_height(-120.0), -1.0);

        let sources = silent_input();
        let mut style = Spectrogram::mini();
        let mut canvas = Canvas::new(128, 43);
        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &sources,
                time: 0.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        assert_eq!(canvas.ops().len(), 1);
    }

    #[test]
    fn filled_variant_emits_slab_per_bin() {
        let sources = silent_input();
        let mut style = Spectrogram::standard();
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
        assert_eq!(canvas.ops().len(), 512);
    }
}
