//! Synthwave racer: perspective road, horizon sun, pulsing buildings.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const NUM_ROAD_LINES: usize = 20;
const NUM_BUILDINGS: usize = 30;
const ROAD_WIDTH: f32 = 1.2;
const BUILDING_HEIGHT: f32 = 0.8;
const MOVE_SPEED: f32 = 2.0;
const SINE_FREQ: f32 = 2.0;
const ROAD_SPEED: f32 = 0.02;

const NEAR_Z: f32 = 3.0;
const FAR_Z: f32 = -5.0;

const SUN_Z: f32 = -4.9;
const SUN_RADIUS: f32 = 1.2;
const SUN_SEGMENTS: usize = 32;
const SUN_LAYERS: usize = 6;

const ROAD_COLOR: Color = Color::rgb(0.0, 0.6, 0.8);
const BUILDING_COLOR: Color = Color::rgb(0.8, 0.0, 0.8);
const GRID_COLOR: Color = Color::rgb(0.4, 0.0, 0.4);
const SUN_INNER: Color = Color::rgb(1.0, 0.85, 0.1);
const SUN_OUTER: Color = Color::rgb(1.0, 0.25, 0.6);

const RNG_SEED: u64 = 0x0ace;

struct Building {
    height: f32,
    x_pos: f32,
    z_pos: f32,
}

/// Tuning separating the standard racer from the mini one.
struct RacerParams {
    sun_scale: f32,
    ray_color: Color,
    road_direction: f32,
    forced_aspect: Option<f32>,
}

/// Driver's-view road scrolling toward the camera, buildings riding a
/// sine wave whose swing follows the audio amplitude.
pub struct RacerVisualizer {
    params: RacerParams,
    aspect: f32,
    audio_amplitude: f32,
    road_position: f32,
    road_lines: Vec<f32>,
    left_buildings: Vec<Building>,
    right_buildings: Vec<Building>,
}

impl RacerVisualizer {
    /// Standard variant.
    pub fn standard() -> Self {
        Self::with_params(RacerParams {
            sun_scale: 1.0,
            ray_color: Color::rgba(1.0, 0.4, 0.8, 0.5),
            road_direction: 1.0,
            forced_aspect: None,
        })
    }

    /// Mini-viewport variant: green rays, slightly larger sun, forced
    /// 128x43 aspect.
    pub fn mini() -> Self {
        Self::with_params(RacerParams {
            sun_scale: 1.25,
            ray_color: Color::rgba(0.0, 1.0, 0.0, 0.5),
            road_direction: -1.0,
            forced_aspect: Some(128.0 / 43.0),
        })
    }

    fn with_params(params: RacerParams) -> Self {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        let spacing = 2.0 / NUM_ROAD_LINES as f32;
        let road_lines = (0..NUM_ROAD_LINES)
            .map(|i| -1.0 + i as f32 * spacing)
            .collect();

        let mut left_buildings = Vec::with_capacity(NUM_BUILDINGS);
        let mut right_buildings = Vec::with_capacity(NUM_BUILDINGS);
        for i in 0..NUM_BUILDINGS {
            let z = FAR_Z + 8.0 * i as f32 / NUM_BUILDINGS as f32;
            let offset = road_half_width(z) + 0.2;
            let variation: f32 = 0.8 + rng.random::<f32>() * 0.4;

            left_buildings.push(Building {
                height: BUILDING_HEIGHT * variation,
                x_pos: -offset,
                z_pos: z,
            });
            right_buildings.push(Building {
                height: BUILDING_HEIGHT * variation,
                x_pos: offset,
                z_pos: z,
            });
        }

        Self {
            aspect: params.forced_aspect.unwrap_or(4.0 / 3.0),
            params,
            audio_amplitude: 0.0,
            road_position: 0.0,
            road_lines,
            left_buildings,
            right_buildings,
        }
    }

    /// Captures the aspect ratio unless the variant forces one.
    pub fn initialize(&mut self, width: u32, height: u32) {
        if self.params.forced_aspect.is_none() {
            self.aspect = width as f32 / height.max(1) as f32;
        }
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

        self.audio_amplitude = (input.primary().amplitude * 4.0).min(1.0);
        self.road_position = (self.road_position + ROAD_SPEED) % 1.0;

        let camera = Camera::perspective(
            80.0,
            self.aspect,
            Vec3::new(0.0, 0.6, 1.8),
            Vec3::new(0.0, 0.1, -5.0),
            Vec3::Y,
        );

        // Furthest first: sun behind everything.
        self.draw_sun(canvas, &camera);

        let dt = input.dt.max(1.0 / 240.0);
        self.update_road(dt);
        self.update_buildings(dt);
        self.draw_road(canvas, &camera);
        self.draw_buildings(canvas, &camera);
    }

    fn update_road(&mut self, dt: f32) {
        let step = dt * MOVE_SPEED * self.params.road_direction;
        for z in self.road_lines.iter_mut() {
            *z += step;
            if *z > 1.0 {
                *z = -1.0;
            } else if *z < -1.0 {
                *z = 1.0;
            }
        }
    }

    fn update_buildings(&mut self, dt: f32) {
        let amplitude = self.audio_amplitude;
        let phase = self.road_position;
        let step = dt * MOVE_SPEED;

        for (buildings, side) in [(&mut self.left_buildings, -1.0), (&mut self.right_buildings, 1.0)]
        {
            for building in buildings.iter_mut() {
                building.z_pos += step;
                if building.z_pos > NEAR_Z {
                    building.z_pos = FAR_Z;
                }

                let wave = (building.z_pos * SINE_FREQ + phase).sin() * amplitude;
                building.height = BUILDING_HEIGHT * (1.0 + wave * 1.5);
                building.x_pos = side * (road_half_width(building.z_pos) + 0.2);
            }
        }
    }

    fn draw_road(&self, canvas: &mut Canvas, camera: &Camera) {
        let near_width = ROAD_WIDTH * 2.5;
        let far_width = ROAD_WIDTH * 0.9;

        let mut edges: Vec<(Vec2, Vec2)> = Vec::new();
        for side in [-1.0f32, 1.0] {
            if let Some(seg) = camera.project_segment(
                Vec3::new(side * near_width, 0.0, NEAR_Z),
                Vec3::new(side * far_width, 0.0, FAR_Z),
            ) {
                edges.push(seg);
            }
        }
        canvas.lines(&edges, ROAD_COLOR, 2.0);

        let mut rungs: Vec<(Vec2, Vec2)> = Vec::new();
        for &line in &self.road_lines {
            let z = NEAR_Z + (line + 1.0) * (FAR_Z - NEAR_Z) / 2.0;
            let width = road_half_width(z);
            if let Some(seg) = camera.project_segment(
                Vec3::new(-width, 0.0, z),
                Vec3::new(width, 0.0, z),
            ) {
                rungs.push(seg);
            }
        }
        canvas.lines(&rungs, GRID_COLOR, 2.0);
    }

    fn draw_buildings(&self, canvas: &mut Canvas, camera: &Camera) {
        let mut segments: Vec<(Vec2, Vec2)> = Vec::new();
        for building in self.left_buildings.iter().chain(&self.right_buildings) {
            if let Some(seg) = camera.project_segment(
                Vec3::new(building.x_pos, 0.0, building.z_pos),
                Vec3::new(building.x_pos, building.height, building.z_pos),
            ) {
                segments.push(seg);
            }
        }
        canvas.lines(&segments, BUILDING_COLOR, 2.0);
    }

    fn draw_sun(&self, canvas: &mut Canvas, camera: &Camera) {
        let scale = self.params.sun_scale;

        // Layered half-discs stand in for the radial gradient: largest
        // (outer color) first, blending inward.
        for layer in (0..SUN_LAYERS).rev() {
            let t = layer as f32 / (SUN_LAYERS - 1).max(1) as f32;
            let radius = SUN_RADIUS * scale * (0.4 + 0.6 * t);
            let color = SUN_INNER.lerp(SUN_OUTER, t);

            let mut disc: Vec<Vec2> = Vec::with_capacity(SUN_SEGMENTS + 2);
            if let Some(center) = camera.project(Vec3::new(0.0, 0.0, SUN_Z)) {
                disc.push(center);
            }
            for i in 0..=SUN_SEGMENTS {
                let angle = std::f32::consts::PI * i as f32 / SUN_SEGMENTS as f32;
                let point = Vec3::new(radius * angle.cos(), radius * angle.sin(), SUN_Z);
                if let Some(p) = camera.project(point) {
                    disc.push(p);
                }
            }
            canvas.fill_poly(&disc, color);
        }

        // Rays around the rim.
        let mut rays: Vec<(Vec2, Vec2)> = Vec::new();
        for i in 0..12 {
            let angle = std::f32::consts::PI * i as f32 / 11.0;
            if angle.sin() < 0.0 {
                continue;
            }
            let inner = Vec3::new(
                SUN_RADIUS * scale * angle.cos(),
                SUN_RADIUS * scale * angle.sin(),
                SUN_Z,
            );
            let outer = inner * Vec3::new(1.3, 1.3, 1.0);
            if let Some(seg) = camera.project_segment(inner, outer) {
                rays.push(seg);
            }
        }
        canvas.lines(&rays, self.params.ray_color, 1.5);
    }
}

fn road_half_width(z: f32) -> f32 {
    let t = (z - NEAR_Z) / (FAR_Z - NEAR_Z);
    ROAD_WIDTH * 2.5 * (1.0 - t) + ROAD_WIDTH * 0.9 * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    fn frame_input(sources: &[SourceAnalysis], time: f32) -> FrameInput {
        FrameInput {
            sources,
            time,
            dt: 1.0 / 60.0,
            cursor: 0,
        }
    }

    #[test]
    fn buildings_wrap_around_the_loop() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.25,
        }];
        let mut style = RacerVisualizer::standard();
        style.initialize(800, 600);
        let mut canvas = Canvas::new(800, 600);

        for frame in 0..600 {
            style.render_frame(&mut canvas, &frame_input(&sources, frame as f32 / 60.0));
        }
        for building in style.left_buildings.iter().chain(&style.right_buildings) {
            assert!(building.z_pos <= NEAR_Z + 0.1);
            assert!(building.z_pos >= FAR_Z - 0.1);
        }
    }

    #[test]
    fn amplitude_is_clamped() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![1.0; 1024],
            amplitude: 1.0,
        }];
        let mut style = RacerVisualizer::mini();
        let mut canvas = Canvas::new(128, 43);
        style.render_frame(&mut canvas, &frame_input(&sources, 0.0));
        assert!(style.audio_amplitude <= 1.0);
    }
}
