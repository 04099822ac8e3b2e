//! 3D terrain mesh built from three frequency-band curves.

use glam::{Mat4, Vec2, Vec3};
use tonescope_core::bands;

use crate::camera::Camera;
use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const BAND_COLOR: Color = Color::rgb(0.0, 1.0, 0.2);
const GRID_COLOR: Color = Color::rgb(0.0, 0.3, 0.1);
const MESH_COLOR: Color = Color::rgb(0.0, 0.3, 0.1);

const LOW_CUTOFF: f32 = 250.0;
const MID_CUTOFF: f32 = 2000.0;
const HIGH_CUTOFF: f32 = 20_000.0;

const NUM_BANDS: usize = 3;
const POINTS_PER_BAND: usize = 200;
const TERRAIN_WIDTH: f32 = 2.0;
const TERRAIN_HEIGHT: f32 = 1.0;
const LINE_WIDTH: f32 = 5.0;

// Low band at the back, high band at the front.
const BAND_Z: [f32; NUM_BANDS] = [-2.0, -1.0, 0.0];

/// Three band curves laid out in depth, linked into a wireframe mesh.
pub struct Terrain3D {
    fft_size: usize,
    sample_rate: u32,
    aspect: f32,
    band_data: [Vec<f32>; NUM_BANDS],
}

impl Terrain3D {
    /// Creates the style for the given FFT geometry.
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        Self {
            fft_size,
            sample_rate,
            aspect: 4.0 / 3.0,
            band_data: [
                vec![0.0; POINTS_PER_BAND],
                vec![0.0; POINTS_PER_BAND],
                vec![0.0; POINTS_PER_BAND],
            ],
        }
    }

    /// Captures the aspect ratio for the perspective camera.
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

        let spectrum = &input.primary().spectrum;
        let hz_to_bin =
            |hz: f32| (hz * self.fft_size as f32 / self.sample_rate as f32) as usize;
        let cutoffs = [
            (0, hz_to_bin(LOW_CUTOFF)),
            (hz_to_bin(LOW_CUTOFF), hz_to_bin(MID_CUTOFF)),
            (hz_to_bin(MID_CUTOFF), hz_to_bin(HIGH_CUTOFF)),
        ];
        for (band, &(start, end)) in cutoffs.iter().enumerate() {
            self.band_data[band] = bands::resample_range(spectrum, start, end, POINTS_PER_BAND);
        }

        let camera = Camera::perspective(
            45.0,
            self.aspect,
            Vec3::new(0.0, 2.5, 2.0),
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::Y,
        )
        .with_post_view(Mat4::from_rotation_x(20f32.to_radians()));

        self.draw_reference_grid(canvas, &camera);
        self.draw_band_curves(canvas, &camera);
        self.draw_mesh_fill(canvas, &camera);
    }

    fn x_at(&self, i: usize) -> f32 {
        -TERRAIN_WIDTH / 2.0 + i as f32 * (TERRAIN_WIDTH / (POINTS_PER_BAND - 1) as f32)
    }

    fn draw_reference_grid(&self, canvas: &mut Canvas, camera: &Camera) {
        let mut segments: Vec<(Vec2, Vec2)> = Vec::new();

        for &z in &BAND_Z {
            if let Some(seg) = camera.project_segment(
                Vec3::new(-TERRAIN_WIDTH / 2.0, 0.0, z),
                Vec3::new(TERRAIN_WIDTH / 2.0, 0.0, z),
            ) {
                segments.push(seg);
            }
        }
        for x in 0..=10 {
            let x_pos = -TERRAIN_WIDTH / 2.0 + x as f32 * (TERRAIN_WIDTH / 10.0);
            if let Some(seg) = camera.project_segment(
                Vec3::new(x_pos, 0.0, BAND_Z[0]),
                Vec3::new(x_pos, 0.0, BAND_Z[NUM_BANDS - 1]),
            ) {
                segments.push(seg);
            }
        }
        canvas.lines(&segments, GRID_COLOR, 1.0);
    }

    fn draw_band_curves(&self, canvas: &mut Canvas, camera: &Camera) {
        for (band, data) in self.band_data.iter().enumerate() {
            let z = BAND_Z[band];
            let world: Vec<Vec3> = data
                .iter()
                .enumerate()
                .map(|(i, &v)| Vec3::new(self.x_at(i), v * TERRAIN_HEIGHT, z))
                .collect();
            let curve = camera.project_polyline(&world);
            canvas.line_strip(&curve, BAND_COLOR, LINE_WIDTH);

            // Vertical links to the next band every 20 points.
            if band + 1 < NUM_BANDS {
                let next_z = BAND_Z[band + 1];
                let next = &self.band_data[band + 1];
                let mut links: Vec<(Vec2, Vec2)> = Vec::new();
                for i in (0..POINTS_PER_BAND).step_by(20) {
                    let a = Vec3::new(self.x_at(i), data[i] * TERRAIN_HEIGHT, z);
                    let b = Vec3::new(self.x_at(i), next[i] * TERRAIN_HEIGHT, next_z);
                    if let Some(seg) = camera.project_segment(a, b) {
                        links.push(seg);
                    }
                }
                canvas.lines(&links, BAND_COLOR, LINE_WIDTH);
            }
        }
    }

    fn draw_mesh_fill(&self, canvas: &mut Canvas, camera: &Camera) {
        // Darker quads spanning neighbouring bands, every other point.
        for band in 0..NUM_BANDS - 1 {
            let z1 = BAND_Z[band];
            let z2 = BAND_Z[band + 1];
            let data1 = &self.band_data[band];
            let data2 = &self.band_data[band + 1];

            for i in (0..POINTS_PER_BAND - 2).step_by(2) {
                let corners = [
                    Vec3::new(self.x_at(i), data1[i] * TERRAIN_HEIGHT, z1),
                    Vec3::new(self.x_at(i), data2[i] * TERRAIN_HEIGHT, z2),
                    Vec3::new(self.x_at(i + 2), data2[i + 2] * TERRAIN_HEIGHT, z2),
                    Vec3::new(self.x_at(i + 2), data1[i + 2] * TERRAIN_HEIGHT, z1),
                ];
                let projected: Vec<Vec2> = corners
                    .iter()
                    .filter_map(|&p| camera.project(p))
                    .collect();
                if projected.len() == 4 {
                    canvas.fill_poly(&projected, MESH_COLOR);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::{SampleBuffer, SpectralAnalyzer, WindowKind};

    #[test]
    fn renders_terrain_for_tone_input() {
        let buffer = SampleBuffer::new(
            (0..44_100)
                .map(|i| (2.0 * std::f32::consts::PI * 110.0 * i as f32 / 44_100.0).sin())
                .collect(),
            44_100,
        );
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let sources = [SourceAnalysis {
            spectrum: analyzer.analyze(&buffer, 0, WindowKind::Hann),
            window: vec![0.0; 1024],
            amplitude: 0.5,
        }];

        let mut style = Terrain3D::new(1024, 44_100);
        style.initialize(800, 600);
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
        assert!(canvas.ops().len() > 10);
    }
}
