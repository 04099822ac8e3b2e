//! Drawing primitives and the per-frame draw list.
//!
//! Styles draw in normalized device coordinates ([-1, 1] on both axes,
//! y pointing up) so geometry ports directly between window sizes; the
//! rasterizer owns the NDC-to-pixel mapping. Line widths and point
//! sizes are in pixels.

use glam::Vec2;

/// Straight-alpha RGBA color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from RGBA components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// This color with every RGB component scaled by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// This color with alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Componentwise blend toward `other` by `t` in [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// One rasterizable operation.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Filled convex polygon.
    FillPoly {
        /// Vertices in NDC, winding order irrelevant.
        points: Vec<Vec2>,
        /// Fill color.
        color: Color,
    },
    /// Open or closed polyline.
    LineStrip {
        /// Vertices in NDC.
        points: Vec<Vec2>,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        width: f32,
        /// Close the strip back to its first point.
        closed: bool,
    },
    /// Independent line segments sharing one color and width.
    Lines {
        /// Segment endpoints in NDC.
        segments: Vec<(Vec2, Vec2)>,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        width: f32,
    },
    /// Square points.
    Points {
        /// Point centers in NDC.
        points: Vec<Vec2>,
        /// Point color.
        color: Color,
        /// Point edge length in pixels.
        size: f32,
    },
}

/// Per-frame draw list in NDC space.
///
/// Cleared and refilled every frame; the rasterizer consumes the ops in
/// submission order (painter's algorithm).
pub struct Canvas {
    width: u32,
    height: u32,
    clear: Color,
    ops: Vec<Primitive>,
}

impl Canvas {
    /// Creates a canvas targeting a `width` x `height` pixel surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clear: Color::BLACK,
            ops: Vec::new(),
        }
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width / height of the target surface.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Drops all queued ops and sets the background for this frame.
    pub fn begin_frame(&mut self, clear: Color) {
        self.ops.clear();
        self.clear = clear;
    }

    /// Background color for the current frame.
    pub fn clear_color(&self) -> Color {
        self.clear
    }

    /// Queued ops in submission order.
    pub fn ops(&self) -> &[Primitive] {
        &self.ops
    }

    /// Filled convex polygon.
    pub fn fill_poly(&mut self, points: &[Vec2], color: Color) {
        if points.len() >= 3 {
            self.ops.push(Primitive::FillPoly {
                points: points.to_vec(),
                color,
            });
        }
    }

    /// Filled axis-aligned rectangle spanning `min`..`max`.
    pub fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Color) {
        self.fill_poly(
            &[
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ],
            color,
        );
    }

    /// Open polyline.
    pub fn line_strip(&mut self, points: &[Vec2], color: Color, width: f32) {
        if points.len() >= 2 {
            self.ops.push(Primitive::LineStrip {
                points: points.to_vec(),
                color,
                width,
                closed: false,
            });
        }
    }

    /// Closed polyline.
    pub fn line_loop(&mut self, points: &[Vec2], color: Color, width: f32) {
        if points.len() >= 2 {
            self.ops.push(Primitive::LineStrip {
                points: points.to_vec(),
                color,
                width,
                closed: true,
            });
        }
    }

    /// Independent segments.
    pub fn lines(&mut self, segments: &[(Vec2, Vec2)], color: Color, width: f32) {
        if !segments.is_empty() {
            self.ops.push(Primitive::Lines {
                segments: segments.to_vec(),
                color,
                width,
            });
        }
    }

    /// Single segment.
    pub fn line(&mut self, a: Vec2, b: Vec2, color: Color, width: f32) {
        self.ops.push(Primitive::Lines {
            segments: vec![(a, b)],
            color,
            width,
        });
    }

    /// Square points.
    pub fn points(&mut self, points: &[Vec2], color: Color, size: f32) {
        if !points.is_empty() {
            self.ops.push(Primitive::Points {
                points: points.to_vec(),
                color,
                size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_frame_clears_ops() {
        let mut canvas = Canvas::new(800, 600);
        canvas.line(Vec2::ZERO, Vec2::ONE, Color::rgb(0.0, 1.0, 0.0), 1.0);
        assert_eq!(canvas.ops().len(), 1);

        canvas.begin_frame(Color::BLACK);
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn degenerate_primitives_are_dropped() {
        let mut canvas = Canvas::new(800, 600);
        canvas.fill_poly(&[Vec2::ZERO, Vec2::ONE], Color::BLACK);
        canvas.line_strip(&[Vec2::ZERO], Color::BLACK, 1.0);
        canvas.lines(&[], Color::BLACK, 1.0);
        canvas.points(&[], Color::BLACK, 1.0);
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn color_helpers() {
        let c = Color::rgb(0.5, 1.0, 0.0).scaled(0.5);
        assert!((c.r - 0.25).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert_eq!(c.a, 1.0);

        let mid = Color::BLACK.lerp(Color::rgb(1.0, 1.0, 1.0), 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }
}
