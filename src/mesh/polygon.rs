//! Struct and functions for working with planar `Polygon`s without holes

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::Matrix4;
use std::sync::OnceLock;

/// A convex polygon, defined by a list of vertices and the plane it lies in.
///
/// `S` is generic metadata; the chunker stores the surface material here.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    /// Vertices in counter-clockwise order when viewed from the front of `plane`
    pub vertices: Vec<Vertex>,

    pub plane: Plane,

    /// Lazily-computed bounding box
    pub bounding_box: OnceLock<Aabb>,

    pub metadata: Option<S>,
}

impl<S: Clone + PartialEq> PartialEq for Polygon<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
    }
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices, deriving the plane from their winding.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        let plane = Plane::from_vertices(&vertices);
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Create a polygon that keeps an already known plane (used after splitting,
    /// where recomputing from clipped vertices only adds round-off).
    pub fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Axis-aligned bounds of the vertices.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut aabb = Aabb::new_invalid();
            for v in &self.vertices {
                aabb.take_point(v.pos);
            }
            aabb
        })
    }

    /// Reverse winding order, flip vertex normals and the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
        self.bounding_box = OnceLock::new();
    }

    /// Iterator over `(start, end)` pairs of consecutive vertices, closing the loop.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Fan triangulation. Valid because polygons stay convex through splitting.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        let first = self.vertices[0];
        self.vertices[1..]
            .windows(2)
            .map(|pair| [first, pair[0], pair[1]])
            .collect()
    }

    /// Transformed copy; `normal_matrix` must be the inverse transpose of `matrix`.
    pub fn transformed(&self, matrix: &Matrix4<Real>, normal_matrix: &Matrix4<Real>) -> Self {
        let mut vertices: Vec<Vertex> = self
            .vertices
            .iter()
            .map(|v| v.transformed(matrix, normal_matrix))
            .collect();
        // Mirroring transforms flip the winding
        if matrix.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0 {
            vertices.reverse();
        }
        Polygon::new(vertices, self.metadata.clone())
    }
}
