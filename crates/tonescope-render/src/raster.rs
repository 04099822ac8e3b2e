//! Software rasterization of a [`Canvas`] draw list.
//!
//! Backed by `tiny-skia`; produces the RGBA framebuffer consumed by
//! both the window presenter and the video encoder. Rasterization is
//! single-threaded and deterministic, which offline rendering relies
//! on.

use glam::Vec2;
use tiny_skia::{
    FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::draw::{Canvas, Color, Primitive};
use crate::{RenderError, Result};

/// CPU rasterizer with an owned pixmap target.
pub struct SoftwareRenderer {
    pixmap: Pixmap,
    width: u32,
    height: u32,
}

impl SoftwareRenderer {
    /// Allocates a `width` x `height` target.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize(width, height))?;
        Ok(Self {
            pixmap,
            width,
            height,
        })
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rasterizes the canvas ops in submission order.
    pub fn render(&mut self, canvas: &Canvas) {
        self.pixmap.fill(to_skia_color(canvas.clear_color()));

        for op in canvas.ops() {
            match op {
                Primitive::FillPoly { points, color } => self.fill_poly(points, *color),
                Primitive::LineStrip {
                    points,
                    color,
                    width,
                    closed,
                } => self.stroke_polyline(points, *color, *width, *closed),
                Primitive::Lines {
                    segments,
                    color,
                    width,
                } => {
                    let mut pb = PathBuilder::new();
                    for (a, b) in segments {
                        let pa = self.to_px(*a);
                        let pb_point = self.to_px(*b);
                        pb.move_to(pa.x, pa.y);
                        pb.line_to(pb_point.x, pb_point.y);
                    }
                    self.stroke_path(pb, *color, *width);
                }
                Primitive::Points {
                    points,
                    color,
                    size,
                } => self.fill_points(points, *color, *size),
            }
        }
    }

    /// Copies the target as straight-alpha RGBA bytes (row-major, top
    /// to bottom), the layout the video encoder consumes.
    pub fn copy_rgba(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.width as usize * self.height as usize * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
    }

    /// Copies the target as packed `0RGB` u32 values, the layout the
    /// window presenter consumes.
    pub fn copy_argb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.reserve(self.width as usize * self.height as usize);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.push(u32::from(c.red()) << 16 | u32::from(c.green()) << 8 | u32::from(c.blue()));
        }
    }

    fn to_px(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - (ndc.y + 1.0) * 0.5) * self.height as f32,
        )
    }

    fn fill_poly(&mut self, points: &[Vec2], color: Color) {
        let mut pb = PathBuilder::new();
        let first = self.to_px(points[0]);
        pb.move_to(first.x, first.y);
        for point in &points[1..] {
            let p = self.to_px(*point);
            pb.line_to(p.x, p.y);
        }
        pb.close();

        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &paint_for(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, width: f32, closed: bool) {
        let mut pb = PathBuilder::new();
        let first = self.to_px(points[0]);
        pb.move_to(first.x, first.y);
        for point in &points[1..] {
            let p = self.to_px(*point);
            pb.line_to(p.x, p.y);
        }
        if closed {
            pb.close();
        }
        self.stroke_path(pb, color, width);
    }

    fn stroke_path(&mut self, pb: PathBuilder, color: Color, width: f32) {
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: width.max(0.5),
                line_cap: LineCap::Round,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &path,
                &paint_for(color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_points(&mut self, points: &[Vec2], color: Color, size: f32) {
        let half = (size * 0.5).max(0.5);
        let paint = paint_for(color);
        for point in points {
            let p = self.to_px(*point);
            if let Some(rect) = Rect::from_xywh(p.x - half, p.y - half, half * 2.0, half * 2.0) {
                self.pixmap
                    .fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(SoftwareRenderer::new(0, 10).is_err());
        assert!(SoftwareRenderer::new(10, 0).is_err());
    }

    #[test]
    fn clear_color_fills_target() {
        let mut renderer = SoftwareRenderer::new(4, 4).unwrap();
        let mut canvas = Canvas::new(4, 4);
        canvas.begin_frame(Color::rgb(1.0, 0.0, 0.0));
        renderer.render(&canvas);

        let mut rgba = Vec::new();
        renderer.copy_rgba(&mut rgba);
        assert_eq!(rgba.len(), 4 * 4 * 4);
        assert_eq!(&rgba[..4], &[255, 0, 0, 255]);

        let mut argb = Vec::new();
        renderer.copy_argb(&mut argb);
        assert_eq!(argb[0], 0x00FF0000);
    }

    #[test]
    fn filled_rect_marks_pixels() {
        let mut renderer = SoftwareRenderer::new(16, 16).unwrap();
        let mut canvas = Canvas::new(16, 16);
        canvas.begin_frame(Color::BLACK);
        canvas.fill_rect(
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Color::rgb(0.0, 1.0, 0.0),
        );
        renderer.render(&canvas);

        let mut rgba = Vec::new();
        renderer.copy_rgba(&mut rgba);
        // Center pixel must be green.
        let center = (8 * 16 + 8) * 4;
        assert_eq!(rgba[center], 0);
        assert_eq!(rgba[center + 1], 255);
        assert_eq!(rgba[center + 2], 0);
    }

    #[test]
    fn rasterization_is_deterministic() {
        let draw = |renderer: &mut SoftwareRenderer| {
            let mut canvas = Canvas::new(32, 32);
            canvas.begin_frame(Color::BLACK);
            canvas.line_strip(
                &[Vec2::new(-0.8, -0.5), Vec2::new(0.1, 0.7), Vec2::new(0.9, -0.2)],
                Color::rgb(0.2, 0.8, 1.0),
                3.0,
            );
            renderer.render(&canvas);
            let mut rgba = Vec::new();
            renderer.copy_rgba(&mut rgba);
            rgba
        };

        let mut a = SoftwareRenderer::new(32, 32).unwrap();
        let mut b = SoftwareRenderer::new(32, 32).unwrap();
        assert_eq!(draw(&mut a), draw(&mut b));
    }
}
