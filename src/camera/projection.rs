//! Camera transform, projection matrices and pointer unprojection.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::math::Ray;
use crate::params::RenderConfig;

/// Camera transform published to the host renderer once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CameraTransform {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            // Always keep Y as up vector (camera never rolls)
            up: Vec3::Y,
        }
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self, render: &RenderConfig) -> Mat4 {
        Mat4::perspective_rh(
            render.fov_degrees.to_radians(),
            render.aspect_ratio(),
            render.near_plane_m,
            render.far_plane_m,
        )
    }

    pub fn view_proj(&self, render: &RenderConfig) -> Mat4 {
        self.projection_matrix(render) * self.view_matrix()
    }

    /// World-space ray through a normalized device coordinate
    pub fn ndc_ray(&self, ndc: Vec2, render: &RenderConfig) -> Ray {
        let inv = self.view_proj(render).inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray::new(self.eye, far - self.eye)
    }

    /// World-space ray through the center of pixel (`px`, `py`)
    pub fn pixel_ray(&self, px: u32, py: u32, render: &RenderConfig) -> Ray {
        let ndc = Vec2::new(
            2.0 * (px as f32 + 0.5) / render.width.max(1) as f32 - 1.0,
            1.0 - 2.0 * (py as f32 + 0.5) / render.height.max(1) as f32,
        );
        self.ndc_ray(ndc, render)
    }

    /// World position under the pointer
    ///
    /// Intersects the pointer ray with the plane through the look-at point
    /// facing the camera. Falls back to the look-at point when the ray runs
    /// parallel to that plane.
    pub fn unproject_pointer(&self, ndc: Vec2, render: &RenderConfig) -> Vec3 {
        let ray = self.ndc_ray(ndc.clamp(Vec2::NEG_ONE, Vec2::ONE), render);
        let normal = (self.eye - self.target).normalize_or_zero();
        let denom = ray.direction.dot(normal);
        if denom.abs() < 1e-6 {
            return self.target;
        }
        let t = (self.target - ray.origin).dot(normal) / denom;
        if t <= 0.0 {
            return self.target;
        }
        ray.at(t)
    }

    /// Pixel coordinates of a world point, `None` behind the camera
    pub fn project(&self, p: Vec3, render: &RenderConfig) -> Option<Vec2> {
        let clip = self.view_proj(render) * p.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * render.width as f32,
            (1.0 - ndc.y) * 0.5 * render.height as f32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_camera() -> CameraTransform {
        CameraTransform::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let ray = front_camera().ndc_ray(Vec2::ZERO, &RenderConfig::default());
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_unproject_center_hits_target() {
        let camera = front_camera();
        let p = camera.unproject_pointer(Vec2::ZERO, &RenderConfig::default());
        assert!(p.length() < 1e-3);
    }

    #[test]
    fn test_unproject_lies_on_target_plane() {
        let camera = front_camera();
        let p = camera.unproject_pointer(Vec2::new(0.6, -0.3), &RenderConfig::default());
        assert!(p.z.abs() < 1e-3);
        assert!(p.x > 0.0 && p.y < 0.0);
    }

    #[test]
    fn test_project_round_trips_pixel_center() {
        let render = RenderConfig::default();
        let camera = front_camera();
        let ray = camera.pixel_ray(100, 60, &render);
        let p = ray.at(10.0);
        let pixel = camera.project(p, &render).expect("point in front of camera");
        assert!((pixel - Vec2::new(100.5, 60.5)).length() < 0.25);
    }

    #[test]
    fn test_project_behind_is_none() {
        let camera = front_camera();
        assert!(camera
            .project(Vec3::new(0.0, 0.0, 20.0), &RenderConfig::default())
            .is_none());
    }
}
