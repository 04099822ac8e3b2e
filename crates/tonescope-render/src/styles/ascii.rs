//! Bar equalizer rendered as columns of random 0/1 glyphs.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tonescope_core::{BandLayout, BandOptions, BandPlan, Divisor};

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const GLYPH_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const CHARS_PER_BAR: usize = 8;
const VERTICAL_RESOLUTION: usize = 20;
const RNG_SEED: u64 = 0x0b01;

/// Bars built from a rain of binary digits.
pub struct AsciiEqualizer {
    plan: BandPlan,
    levels: Vec<f32>,
    rng: StdRng,
}

impl AsciiEqualizer {
    /// Creates the style for the given FFT size (16 bars).
    pub fn new(fft_size: usize) -> Self {
        let plan = BandPlan::new(
            &BandLayout::BinPower { bands: 16 },
            fft_size,
            // Bin-power ranges are index based; the rate only matters
            // for Hz layouts.
            44_100,
            BandOptions {
                divisor: Divisor::Fixed(50.0),
                ..Default::default()
            },
        );
        Self {
            levels: Vec::with_capacity(plan.bands()),
            plan,
            rng: StdRng::seed_from_u64(RNG_SEED),
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

        self.plan.levels_into(&input.primary().spectrum, &mut self.levels);
        let bars = self.levels.len();
        let bar_width = 2.0 / bars as f32;

        for i in 0..bars {
            let level = self.levels[i];
            let x_left = -1.0 + i as f32 * bar_width;
            let x_right = x_left + bar_width * 0.8;
            self.draw_glyph_column(canvas, x_left, x_right, level * 2.0);
        }
    }

    fn draw_glyph_column(&mut self, canvas: &mut Canvas, x_left: f32, x_right: f32, height: f32) {
        let char_width = (x_right - x_left) / CHARS_PER_BAR as f32;
        let char_height = 2.0 / VERTICAL_RESOLUTION as f32;
        let rows = (height * VERTICAL_RESOLUTION as f32 / 2.0) as usize;

        for col in 0..CHARS_PER_BAR {
            for row in 0..rows {
                let x = x_left + col as f32 * char_width;
                let y = -1.0 + row as f32 * char_height;

                if self.rng.random_bool(0.5) {
                    // A "1": narrow vertical slab.
                    canvas.fill_rect(
                        Vec2::new(x + char_width * 0.4, y),
                        Vec2::new(x + char_width * 0.6, y + char_height),
                        GLYPH_COLOR,
                    );
                } else {
                    // A "0": small ellipse outline.
                    const SEGMENTS: usize = 8;
                    let center = Vec2::new(x + char_width * 0.5, y + char_height * 0.5);
                    let radius = Vec2::new(char_width * 0.3, char_height * 0.4);
                    let ring: Vec<Vec2> = (0..SEGMENTS)
                        .map(|s| {
                            let angle = 2.0 * std::f32::consts::PI * s as f32 / SEGMENTS as f32;
                            center + Vec2::new(angle.cos() * radius.x, angle.sin() * radius.y)
                        })
                        .collect();
                    canvas.line_loop(&ring, GLYPH_COLOR, 1.0);
                }
            }
        }
    }
}
