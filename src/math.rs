//! Scalar helpers mirroring the shader built-ins the per-pixel code relies on.

use glam::Vec3;

/// World-space ray with a unit direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest positive hit distance of `ray` against a sphere
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    let far = -b + root;
    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Hermite interpolation between `edge0` and `edge1`, clamped to [0, 1].
///
/// Reversed edges (`edge0 > edge1`) produce a falling ramp, as in WGSL/GLSL.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span.abs() < f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn mix_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * 0.5
    }
}

/// Screen-space white-noise hash in [0, 1)
#[inline]
pub fn hash12(x: f32, y: f32) -> f32 {
    let dot = x * 12.9898 + y * 78.233;
    let s = dot.sin() * 43_758.547;
    (s - s.floor()).min(1.0 - f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.2, 0.8, 0.0), 0.0);
        assert_eq!(smoothstep(0.2, 0.8, 1.0), 1.0);
        assert!((smoothstep(0.2, 0.8, 0.5) - 0.5).abs() < 1e-6);
        // Reversed edges fall
        assert_eq!(smoothstep(1.0, 0.9, 0.95 - 1.0), 1.0);
        assert_eq!(smoothstep(1.0, 0.9, 1.0), 0.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for ease in [ease_out_cubic, ease_in_out_cubic] {
            assert!(ease(0.0).abs() < 1e-6);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
        }
        assert!(ease_out_cubic(0.3) > 0.3);
    }

    #[test]
    fn test_ray_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = ray_sphere(&ray, Vec3::new(0.0, 0.0, 5.0), 2.0);
        assert!(matches!(t, Some(t) if (t - 3.0).abs() < 1e-5));
        assert!(ray_sphere(&ray, Vec3::new(4.0, 0.0, 5.0), 2.0).is_none());
        // Origin inside the sphere hits the far side
        let inside = ray_sphere(&ray, Vec3::ZERO, 1.0);
        assert!(matches!(inside, Some(t) if (t - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_hash_range() {
        for i in 0..200 {
            let h = hash12(i as f32 * 3.1, i as f32 * 0.7 + 11.0);
            assert!((0.0..1.0).contains(&h));
        }
    }
}
