//! Source polyhedra for the wireframe.

use fnv::FnvHashMap;
use glam::Vec3;

/// Indexed triangle mesh with vertices on a sphere
#[derive(Debug, Clone)]
pub struct Polyhedron {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    radius: f32,
}

impl Polyhedron {
    /// Regular icosahedron (12 vertices, 20 faces)
    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let raw = [
            [-1.0, t, 0.0],
            [1.0, t, 0.0],
            [-1.0, -t, 0.0],
            [1.0, -t, 0.0],
            [0.0, -1.0, t],
            [0.0, 1.0, t],
            [0.0, -1.0, -t],
            [0.0, 1.0, -t],
            [t, 0.0, -1.0],
            [t, 0.0, 1.0],
            [-t, 0.0, -1.0],
            [-t, 0.0, 1.0],
        ];
        let faces = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];
        Self::on_sphere(raw.iter().map(|&v| Vec3::from_array(v)), faces, radius)
    }

    /// Regular octahedron (6 vertices, 8 faces)
    pub fn octahedron(radius: f32) -> Self {
        let raw = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        Self::on_sphere(raw.into_iter(), faces, radius)
    }

    fn on_sphere(vertices: impl Iterator<Item = Vec3>, faces: Vec<[u32; 3]>, radius: f32) -> Self {
        Self {
            vertices: vertices.map(|v| v.normalize() * radius).collect(),
            faces,
            radius,
        }
    }

    /// Circumscribed radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Split every face into four `detail` times, pushing new vertices onto the sphere
    pub fn subdivided(&self, detail: u32) -> Self {
        let mut vertices = self.vertices.clone();
        let mut faces = self.faces.clone();

        for _ in 0..detail {
            let mut midpoints: FnvHashMap<(u32, u32), u32> = FnvHashMap::default();
            let mut next = Vec::with_capacity(faces.len() * 4);

            for &[a, b, c] in &faces {
                let ab = midpoint(&mut vertices, &mut midpoints, a, b, self.radius);
                let bc = midpoint(&mut vertices, &mut midpoints, b, c, self.radius);
                let ca = midpoint(&mut vertices, &mut midpoints, c, a, self.radius);
                next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
            }
            faces = next;
        }

        Self {
            vertices,
            faces,
            radius: self.radius,
        }
    }

    /// Triangle-list index buffer
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut FnvHashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
    radius: f32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    *cache.entry(key).or_insert_with(|| {
        let mid = (vertices[a as usize] + vertices[b as usize]) * 0.5;
        vertices.push(mid.normalize_or_zero() * radius);
        (vertices.len() - 1) as u32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icosahedron_counts() {
        let ico = Polyhedron::icosahedron(1.0);
        assert_eq!(ico.vertices.len(), 12);
        assert_eq!(ico.faces.len(), 20);
    }

    #[test]
    fn test_subdivision_shares_midpoints() {
        let ico = Polyhedron::icosahedron(2.0).subdivided(1);
        // V - E + F = 2 with E = 120
        assert_eq!(ico.vertices.len(), 42);
        assert_eq!(ico.faces.len(), 80);
        let twice = Polyhedron::icosahedron(2.0).subdivided(2);
        assert_eq!(twice.vertices.len(), 162);
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let ico = Polyhedron::icosahedron(1.6).subdivided(2);
        for v in &ico.vertices {
            assert!((v.length() - 1.6).abs() < 1e-4);
        }
        let octa = Polyhedron::octahedron(3.0);
        assert!(octa.vertices.iter().all(|v| (v.length() - 3.0).abs() < 1e-5));
    }
}
