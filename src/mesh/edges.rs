//! Unique edge extraction and subdivision into pulse line geometry.

use fnv::FnvHashSet;
use glam::Vec3;

use super::polyhedron::Polyhedron;
use crate::rendering::EdgeVertex;

/// One subdivided point along a unique edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    pub position: Vec3,

    /// 0 at the first endpoint, 1 at the second
    pub edge_progress: f32,

    /// Per-edge phase offset for the pulse waves
    pub edge_index: f32,

    /// Length of the whole edge (meters)
    pub edge_length: f32,
}

/// Line geometry for the pulse pass, built once per mesh
#[derive(Debug, Clone, Default)]
pub struct EdgeBuffers {
    pub vertices: Vec<EdgeVertex>,
    /// Line-list indices into `vertices`
    pub indices: Vec<u32>,
    pub samples: Vec<EdgeSample>,
    pub edge_count: usize,
}

/// Unique undirected edges of the face list, in first-seen order
pub fn extract_edges(faces: &[[u32; 3]]) -> Vec<(u32, u32)> {
    let mut seen = FnvHashSet::default();
    let mut edges = Vec::with_capacity(faces.len() * 3 / 2);
    for &[a, b, c] in faces {
        for (i, j) in [(a, b), (b, c), (c, a)] {
            let key = (i.min(j), i.max(j));
            if seen.insert(key) {
                edges.push(key);
            }
        }
    }
    edges
}

/// Subdivide each unique edge into `subdivisions` samples (endpoints included)
pub fn sample_edges(poly: &Polyhedron, offset: Vec3, subdivisions: u32) -> Vec<EdgeSample> {
    let n = subdivisions.max(2);
    let edges = extract_edges(&poly.faces);
    let mut samples = Vec::with_capacity(edges.len() * n as usize);

    for (index, &(a, b)) in edges.iter().enumerate() {
        let start = poly.vertices[a as usize] + offset;
        let end = poly.vertices[b as usize] + offset;
        let edge_length = start.distance(end);
        for j in 0..n {
            let edge_progress = j as f32 / (n - 1) as f32;
            samples.push(EdgeSample {
                position: start.lerp(end, edge_progress),
                edge_progress,
                edge_index: index as f32,
                edge_length,
            });
        }
    }
    samples
}

/// Vertex and line-list index buffers for the pulse pass
pub fn build_edge_buffers(poly: &Polyhedron, offset: Vec3, subdivisions: u32) -> EdgeBuffers {
    let n = subdivisions.max(2);
    let samples = sample_edges(poly, offset, n);
    let edge_count = samples.len() / n as usize;

    let vertices = samples
        .iter()
        .map(|s| EdgeVertex {
            position: s.position.to_array(),
            edge_progress: s.edge_progress,
            edge_index: s.edge_index,
            edge_length: s.edge_length,
        })
        .collect();

    let mut indices = Vec::with_capacity(edge_count * (n as usize - 1) * 2);
    for edge in 0..edge_count as u32 {
        let base = edge * n;
        for j in 0..n - 1 {
            indices.extend_from_slice(&[base + j, base + j + 1]);
        }
    }

    EdgeBuffers {
        vertices,
        indices,
        samples,
        edge_count,
    }
}
