//! Audio-reactive rotating wireframe cube.

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Tuning constants separating the standard cube from the mini one.
struct CubeParams {
    line_width: f32,
    base_rotation_speed: f32,
    max_rotation_speed: f32,
    base_scale: f32,
    bounce_factor: f32,
    pitch_bins: (usize, usize),
    amplitude_bins: (usize, usize),
    smoothing: Option<f32>,
    forced_aspect: Option<f32>,
}

/// Wireframe cube spinning on pitch energy and bouncing on bass.
pub struct CubeVisualizer {
    params: CubeParams,
    fft_size: usize,
    aspect: f32,
    smoothed_amplitude: f32,
}

impl CubeVisualizer {
    /// Standard variant.
    pub fn standard(fft_size: usize) -> Self {
        Self::with_params(
            fft_size,
            CubeParams {
                line_width: 5.0,
                base_rotation_speed: 0.5,
                max_rotation_speed: 8.0,
                base_scale: 0.6,
                bounce_factor: 0.6,
                pitch_bins: (10, 100),
                amplitude_bins: (0, 30),
                smoothing: None,
                forced_aspect: None,
            },
        )
    }

    /// Mini-viewport variant: faster spin, amplitude smoothing, forced
    /// 128x43 aspect.
    pub fn mini(fft_size: usize) -> Self {
        Self::with_params(
            fft_size,
            CubeParams {
                line_width: 1.5,
                base_rotation_speed: 9.0,
                max_rotation_speed: 18.0,
                base_scale: 0.5,
                bounce_factor: 1.2,
                pitch_bins: (5, 50),
                amplitude_bins: (0, 8),
                smoothing: Some(0.15),
                forced_aspect: Some(128.0 / 43.0),
            },
        )
    }

    fn with_params(fft_size: usize, params: CubeParams) -> Self {
        Self {
            aspect: params.forced_aspect.unwrap_or(4.0 / 3.0),
            params,
            fft_size,
            smoothed_amplitude: 0.0,
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

        let spectrum = &input.primary().spectrum;
        let norm = 1.0 / self.fft_size as f32;

        // Pitch band drives the spin, weighted toward higher bins.
        let (pitch_start, pitch_end) = self.params.pitch_bins;
        let mut pitch = 0.0f32;
        for bin in pitch_start..pitch_end.min(spectrum.len()) {
            pitch += spectrum.magnitude(bin) * norm * (bin - pitch_start + 1) as f32;
        }
        pitch /= (pitch_end - pitch_start).max(1) as f32;
        let rotation_speed = self.params.base_rotation_speed
            + pitch * (self.params.max_rotation_speed - self.params.base_rotation_speed) * 2.0;

        // Bass band drives the bounce.
        let (amp_start, amp_end) = self.params.amplitude_bins;
        let mut amplitude = 0.0f32;
        for bin in amp_start..amp_end.min(spectrum.len()) {
            amplitude += spectrum.magnitude(bin) * norm;
        }
        amplitude /= (amp_end - amp_start).max(1) as f32;

        if let Some(factor) = self.params.smoothing {
            self.smoothed_amplitude += (amplitude - self.smoothed_amplitude) * factor;
            amplitude = self.smoothed_amplitude;
        }
        let scale = self.params.base_scale + amplitude * self.params.bounce_factor * 2.0;

        let camera = Camera::perspective(
            45.0,
            self.aspect,
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
        );

        // Pivot on a corner: translate first, then spin around the
        // cube's diagonal, with the whole scene tilted for depth.
        let angle = (input.time * rotation_speed).to_radians();
        let model = Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_translation(Vec3::splat(-0.5))
            * Mat4::from_axis_angle(Vec3::ONE.normalize(), angle)
            * Mat4::from_scale(Vec3::splat(scale));

        for (index, &(a, b)) in EDGES.iter().enumerate() {
            let color_pos = index as f32 / EDGES.len() as f32;
            let brightness = 0.7 + color_pos * 0.3;
            let color = Color::rgb(brightness * 0.8, brightness * 0.9, brightness);

            let pa = model.transform_point3(VERTICES[a]);
            let pb = model.transform_point3(VERTICES[b]);
            if let Some((sa, sb)) = camera.project_segment(pa, pb) {
                canvas.line(sa, sb, color, self.params.line_width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    #[test]
    fn twelve_edges_for_silence() {
        let sources = [SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.0; 1024],
            amplitude: 0.0,
        }];
        let mut style = CubeVisualizer::standard(1024);
        style.initialize(800, 600);
        let mut canvas = Canvas::new(800, 600);
        style.render_frame(
            &mut canvas,
            &FrameInput {
                sources: &sources,
                time: 1.0,
                dt: 1.0 / 30.0,
                cursor: 0,
            },
        );
        assert_eq!(canvas.ops().len(), 12);
    }

    #[test]
    fn mini_keeps_forced_aspect() {
        let mut style = CubeVisualizer::mini(1024);
        style.initialize(1920, 1080);
        assert!((style.aspect - 128.0 / 43.0).abs() < 1e-6);
    }
}
