//! Scrolling stroke-font marquee with a bass bounce.

use glam::Vec2;

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const TEXT: &str = "Tone Coder";
const SCROLL_SPEED: f32 = 0.5;
const SINE_AMPLITUDE: f32 = 0.5;
const SINE_FREQUENCY: f32 = 3.0;
const LETTER_SPACING: f32 = 0.3;

const METALLIC_GRADIENT: [Color; 4] = [
    Color::rgb(0.8, 0.8, 0.9),
    Color::rgb(0.6, 0.6, 0.7),
    Color::rgb(0.4, 0.4, 0.5),
    Color::rgb(0.6, 0.6, 0.7),
];

/// Marquee text built from line strokes, arcs and circles, riding a
/// sine wave and bouncing on low-frequency energy.
pub struct ScrollerText {
    scroll_position: f32,
}

impl ScrollerText {
    /// Creates the marquee at its start position.
    pub fn new() -> Self {
        Self {
            scroll_position: 0.0,
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

        self.scroll_position = (self.scroll_position + SCROLL_SPEED * 0.02) % 2.0;

        // Bounce from the lower quarter of the spectrum.
        let spectrum = &input.primary().spectrum;
        let quarter = (spectrum.len() / 4).max(1);
        let avg: f32 = (0..quarter)
            .map(|bin| spectrum.magnitude(bin) / spectrum.fft_size() as f32)
            .sum::<f32>()
            / quarter as f32;
        let bounce = avg * 0.4;

        let base_x = 1.0 - self.scroll_position * 2.0;
        for (index, ch) in TEXT.chars().enumerate() {
            let char_x = base_x + index as f32 * LETTER_SPACING;
            if !(-1.5..1.5).contains(&char_x) || ch == ' ' {
                continue;
            }

            let wave_phase = char_x * 2.0 + input.time * SINE_FREQUENCY;
            let mut y = wave_phase.sin() * SINE_AMPLITUDE * 0.8;
            y += bounce * (char_x * 3.0).sin();

            draw_character(canvas, ch, char_x, y, 0.12);
        }
    }
}

impl Default for ScrollerText {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_character(canvas: &mut Canvas, ch: char, x: f32, y: f32, scale: f32) {
    match ch {
        'T' => draw_strokes(
            canvas,
            &[(-0.35, 1.0, 0.35, 1.0), (0.0, 1.0, 0.0, 0.0)],
            x,
            y,
            scale,
        ),
        'o' => draw_circle(canvas, x, y + scale * 0.5, scale * 0.3),
        'n' => draw_strokes(
            canvas,
            &[
                (-0.3, 0.0, -0.3, 1.0),
                (-0.3, 1.0, 0.3, 0.0),
                (0.3, 0.0, 0.3, 1.0),
            ],
            x,
            y,
            scale,
        ),
        'e' => draw_strokes(
            canvas,
            &[
                (-0.3, 0.0, -0.3, 1.0),
                (-0.3, 0.0, 0.25, 0.0),
                (-0.3, 0.5, 0.2, 0.5),
                (-0.3, 1.0, 0.25, 1.0),
            ],
            x,
            y,
            scale,
        ),
        'C' => draw_arc(
            canvas,
            x,
            y + scale * 0.5,
            scale * 0.4,
            std::f32::consts::PI * 0.25,
            std::f32::consts::PI * 1.75,
        ),
        'd' => {
            draw_strokes(canvas, &[(0.3, 0.0, 0.3, 1.0)], x, y, scale);
            draw_arc(
                canvas,
                x,
                y + scale * 0.5,
                scale * 0.3,
                0.0,
                std::f32::consts::PI * 2.0,
            );
        }
        'r' => draw_strokes(
            canvas,
            &[
                (-0.3, 0.0, -0.3, 1.0),
                (-0.3, 1.0, 0.25, 1.0),
                (0.25, 1.0, 0.25, 0.5),
                (0.25, 0.5, -0.3, 0.5),
                (-0.3, 0.5, 0.25, 0.0),
            ],
            x,
            y,
            scale,
        ),
        _ => {
            // Fallback box for glyphs without a stroke table.
            canvas.line_loop(
                &[
                    Vec2::new(x - scale * 0.4, y),
                    Vec2::new(x + scale * 0.4, y),
                    Vec2::new(x + scale * 0.4, y + scale),
                    Vec2::new(x - scale * 0.4, y + scale),
                ],
                METALLIC_GRADIENT[0],
                3.0,
            );
        }
    }
}

fn draw_strokes(canvas: &mut Canvas, strokes: &[(f32, f32, f32, f32)], x: f32, y: f32, scale: f32) {
    // Each gradient layer offsets slightly up-right for a bevel effect.
    for (layer, &color) in METALLIC_GRADIENT.iter().enumerate() {
        let offset = layer as f32 * scale * 0.05;
        let segments: Vec<(Vec2, Vec2)> = strokes
            .iter()
            .map(|&(x1, y1, x2, y2)| {
                (
                    Vec2::new(x + x1 * scale + offset, y + y1 * scale + offset),
                    Vec2::new(x + x2 * scale + offset, y + y2 * scale + offset),
                )
            })
            .collect();
        canvas.lines(&segments, color, 3.0);
    }
}

fn draw_circle(canvas: &mut Canvas, center_x: f32, center_y: f32, radius: f32) {
    const SEGMENTS: usize = 32;
    for (layer, &color) in METALLIC_GRADIENT.iter().enumerate() {
        let r = radius * (1.0 + layer as f32 * 0.1);
        let ring: Vec<Vec2> = (0..SEGMENTS)
            .map(|i| {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / SEGMENTS as f32;
                Vec2::new(center_x + angle.cos() * r, center_y + angle.sin() * r)
            })
            .collect();
        canvas.line_loop(&ring, color, 3.0);
    }
}

fn draw_arc(canvas: &mut Canvas, center_x: f32, center_y: f32, radius: f32, start: f32, end: f32) {
    const SEGMENTS: usize = 32;
    for (layer, &color) in METALLIC_GRADIENT.iter().enumerate() {
        let r = radius * (1.0 + layer as f32 * 0.1);
        let arc: Vec<Vec2> = (0..=SEGMENTS)
            .map(|i| {
                let angle = start + (end - start) * i as f32 / SEGMENTS as f32;
                Vec2::new(center_x + angle.cos() * r, center_y + angle.sin() * r)
            })
            .collect();
        canvas.line_strip(&arc, color, 3.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn marquee_advances_between_frames() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        }];
        let mut style = ScrollerText::new();
        let mut canvas = Canvas::new(800, 600);

        let mut positions = Vec::new();
        for frame in 0..3 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &sources,
                    time: frame as f32 / 30.0,
                    dt: 1.0 / 30.0,
                    cursor: 0,
                },
            );
            positions.push(style.scroll_position);
        }
        assert!(positions[0] < positions[1] && positions[1] < positions[2]);
    }
}
