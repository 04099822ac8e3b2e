//! Bouncing balls kicked around by per-band energy.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const GRAVITY: f32 = 0.5;
const DAMPING: f32 = 0.98;
const BOUNCE_DAMPING: f32 = 0.85;
const MIN_VELOCITY: f32 = 0.01;
const MAX_VELOCITY: f32 = 3.0;

const BASE_BOUNCE_FORCE: f32 = 0.3;
const MAX_BOUNCE_FORCE: f32 = 2.5;
const ENERGY_DECAY: f32 = 0.95;
const AUDIO_SENSITIVITY: f32 = 8.0;

const NUM_BALLS: usize = 12;
const MIN_RADIUS: f32 = 0.02;
const MAX_RADIUS: f32 = 0.08;
const BALL_SEGMENTS: usize = 16;

const NUM_FREQUENCY_BANDS: usize = 6;
const BAND_SIZE: usize = 8;

const RNG_SEED: u64 = 0xba11;

struct Ball {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    color: Color,
    energy: f32,
    frequency_band: usize,
    bounce_intensity: f32,
}

/// Rainbow balls under gravity; each one bounces on the energy of its
/// assigned frequency band.
pub struct BallsVisualizer {
    fft_size: usize,
    aspect: f32,
    balls: Vec<Ball>,
    ring: Vec<Vec2>,
}

impl BallsVisualizer {
    /// Creates the flock with seeded positions and colors.
    pub fn new(fft_size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let balls = (0..NUM_BALLS)
            .map(|i| {
                let hue = i as f32 / NUM_BALLS as f32 * 360.0;
                let saturation = 0.8 + rng.random::<f32>() * 0.2;
                let value = 0.7 + rng.random::<f32>() * 0.3;
                Ball {
                    position: Vec2::new(
                        rng.random_range(-0.8f32..0.8),
                        rng.random_range(-0.5f32..0.8),
                    ),
                    velocity: Vec2::new(
                        rng.random_range(-1.0f32..1.0),
                        rng.random_range(-0.5f32..1.5),
                    ),
                    radius: rng.random_range(MIN_RADIUS..MAX_RADIUS),
                    color: hsv_to_rgb(hue, saturation, value),
                    energy: 0.0,
                    frequency_band: rng.random_range(0..NUM_FREQUENCY_BANDS),
                    bounce_intensity: 0.0,
                }
            })
            .collect();

        Self {
            fft_size,
            aspect: 4.0 / 3.0,
            balls,
            ring: Vec::with_capacity(BALL_SEGMENTS + 1),
        }
    }

    /// Captures the aspect ratio used for the side walls.
    pub fn initialize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

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

        let dt = input.dt.clamp(1.0 / 240.0, 1.0 / 30.0);

        // Band energies from the low end of the spectrum.
        let spectrum = &input.primary().spectrum;
        let norm = 1.0 / self.fft_size as f32;
        let mut energies = [0.0f32; NUM_FREQUENCY_BANDS];
        let max_bin = (NUM_FREQUENCY_BANDS * BAND_SIZE).min(spectrum.len());
        for bin in 0..max_bin {
            energies[bin / BAND_SIZE] += spectrum.magnitude(bin) * norm;
        }
        for energy in energies.iter_mut() {
            *energy = (*energy * AUDIO_SENSITIVITY).min(1.0);
        }

        self.update_balls(dt, &energies);

        // Positions are in a space widened by the aspect ratio; divide
        // back down so x lands in NDC.
        let aspect = self.aspect;
        let ring = &mut self.ring;
        for ball in &self.balls {
            let intensity = 0.6 + ball.energy * 0.4;
            let center = Vec2::new(ball.position.x / aspect, ball.position.y);
            let radius = Vec2::new(ball.radius / aspect, ball.radius);

            ring.clear();
            ring.push(center);
            for i in 0..=BALL_SEGMENTS {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / BALL_SEGMENTS as f32;
                ring.push(center + Vec2::new(angle.cos() * radius.x, angle.sin() * radius.y));
            }
            canvas.fill_poly(ring, ball.color.scaled(intensity).with_alpha(0.9));

            if ball.energy > 0.3 {
                canvas.line_loop(&ring[1..], ball.color.with_alpha(ball.energy * 0.7), 2.0);
            }
        }
    }

    fn update_balls(&mut self, dt: f32, energies: &[f32; NUM_FREQUENCY_BANDS]) {
        let max_x = self.aspect;

        for ball in self.balls.iter_mut() {
            ball.velocity.y -= GRAVITY * dt;

            let audio_energy = energies[ball.frequency_band];
            ball.energy = ball.energy * ENERGY_DECAY + audio_energy * (1.0 - ENERGY_DECAY);
            ball.bounce_intensity =
                BASE_BOUNCE_FORCE + ball.energy * (MAX_BOUNCE_FORCE - BASE_BOUNCE_FORCE);

            ball.position += ball.velocity * dt;
            ball.velocity *= DAMPING;

            // Side walls.
            if ball.position.x > max_x - ball.radius {
                ball.position.x = max_x - ball.radius;
                ball.velocity.x = -ball.velocity.x.abs() * BOUNCE_DAMPING;
                ball.velocity.y += ball.bounce_intensity * audio_energy;
            } else if ball.position.x < -max_x + ball.radius {
                ball.position.x = -max_x + ball.radius;
                ball.velocity.x = ball.velocity.x.abs() * BOUNCE_DAMPING;
                ball.velocity.y += ball.bounce_intensity * audio_energy;
            }

            // Ceiling and floor; the floor kicks hardest.
            if ball.position.y > 1.0 - ball.radius {
                ball.position.y = 1.0 - ball.radius;
                ball.velocity.y = -ball.velocity.y.abs() * BOUNCE_DAMPING;
                ball.velocity.y -= ball.bounce_intensity * audio_energy;
            } else if ball.position.y < -1.0 + ball.radius {
                ball.position.y = -1.0 + ball.radius;
                ball.velocity.y = ball.velocity.y.abs() * BOUNCE_DAMPING;
                ball.velocity.y += ball.bounce_intensity * audio_energy * 1.5;
            }

            ball.velocity = ball.velocity.clamp(
                Vec2::splat(-MAX_VELOCITY),
                Vec2::splat(MAX_VELOCITY),
            );
            if ball.velocity.x.abs() < MIN_VELOCITY {
                ball.velocity.x = 0.0;
            }
            if ball.velocity.y.abs() < MIN_VELOCITY {
                ball.velocity.y = 0.0;
            }
        }
    }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Color {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match hue as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color::rgb(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn balls_stay_inside_the_box() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        }];
        let mut style = BallsVisualizer::new(1024);
        style.initialize(800, 600);
        let mut canvas = Canvas::new(800, 600);

        for frame in 0..1000 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &sources,
                    time: frame as f32 / 60.0,
                    dt: 1.0 / 60.0,
                    cursor: 0,
                },
            );
        }
        let max_x = style.aspect;
        for ball in &style.balls {
            assert!(ball.position.x.abs() <= max_x + 1e-3);
            assert!(ball.position.y.abs() <= 1.0 + 1e-3);
            assert!(ball.velocity.length() <= MAX_VELOCITY * 2.0);
        }
    }

    #[test]
    fn hsv_rainbow_is_in_range() {
        for i in 0..NUM_BALLS {
            let color = hsv_to_rgb(i as f32 / NUM_BALLS as f32 * 360.0, 0.9, 0.8);
            for component in [color.r, color.g, color.b] {
                assert!((0.0..=1.0).contains(&component));
            }
        }
    }
}
