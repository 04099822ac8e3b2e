//! Perspective projection for the 3D styles.
//!
//! World-space points go through a view and projection matrix and come
//! out in the canvas' NDC space. Segments are clipped against the near
//! plane so geometry that starts behind the eye (the racer's road, the
//! maze walls) still draws its visible part.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// View + projection pair for one 3D style.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    view: Mat4,
    proj: Mat4,
}

impl Camera {
    /// Perspective camera: vertical FOV in degrees, aspect ratio, and a
    /// look-at view.
    pub fn perspective(fov_y_deg: f32, aspect: f32, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
            proj: Mat4::perspective_rh_gl(fov_y_deg.to_radians(), aspect.max(1e-3), NEAR, FAR),
        }
    }

    /// Applies an extra transform after the view, for styles that tilt
    /// the whole scene.
    pub fn with_post_view(mut self, transform: Mat4) -> Self {
        self.view = transform * self.view;
        self
    }

    /// Projects a world-space point to NDC; `None` when it lies on or
    /// behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let view = self.view * point.extend(1.0);
        if view.z >= -NEAR {
            return None;
        }
        let clip = self.proj * view;
        Some(clip.xy() / clip.w)
    }

    /// Projects a segment, clipping it against the near plane. `None`
    /// when the whole segment is behind the eye.
    pub fn project_segment(&self, a: Vec3, b: Vec3) -> Option<(Vec2, Vec2)> {
        let mut va = (self.view * a.extend(1.0)).xyz();
        let mut vb = (self.view * b.extend(1.0)).xyz();

        let limit = -NEAR;
        if va.z >= limit && vb.z >= limit {
            return None;
        }
        if va.z >= limit {
            let t = (limit - vb.z) / (va.z - vb.z);
            va = vb + (va - vb) * t;
        } else if vb.z >= limit {
            let t = (limit - va.z) / (vb.z - va.z);
            vb = va + (vb - va) * t;
        }

        let pa = self.proj * va.extend(1.0);
        let pb = self.proj * vb.extend(1.0);
        Some((pa.xy() / pa.w, pb.xy() / pb.w))
    }

    /// Projects a polyline point-for-point, dropping points behind the
    /// eye. Adequate for strips known to stay in front of the camera.
    pub fn project_polyline(&self, points: &[Vec3]) -> Vec<Vec2> {
        points.iter().filter_map(|&p| self.project(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::perspective(
            45.0,
            4.0 / 3.0,
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
        )
    }

    #[test]
    fn center_point_projects_to_origin() {
        let ndc = camera().project(Vec3::ZERO).unwrap();
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
    }

    #[test]
    fn point_behind_eye_is_rejected() {
        assert!(camera().project(Vec3::new(0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn segment_crossing_near_plane_is_clipped() {
        // One endpoint behind the eye, the other in front: the segment
        // survives and both projected points are finite.
        let cam = camera();
        let (a, b) = cam
            .project_segment(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.5, -5.0))
            .unwrap();
        assert!(a.x.is_finite() && a.y.is_finite());
        assert!(b.x.is_finite() && b.y.is_finite());
    }

    #[test]
    fn fully_hidden_segment_is_dropped() {
        let cam = camera();
        assert!(cam
            .project_segment(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 6.0))
            .is_none());
    }
}
