//! Primitive solids as `Mesh`s

use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Axis-aligned box spanning `[0, width] × [0, length] × [0, height]`.
    ///
    /// ```text
    ///     4-------5
    ///    /|      /|
    ///   0-------1 |
    ///   | |     | |
    ///   | 7-----|-6
    ///   |/      |/
    ///   3-------2
    /// ```
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> Mesh<S> {
        Self::cuboid_between(
            Point3::origin(),
            Point3::new(width, length, height),
            metadata,
        )
    }

    /// Axis-aligned box with opposite corners `mins` and `maxs`.
    /// Faces wind counter-clockwise seen from outside.
    pub fn cuboid_between(mins: Point3<Real>, maxs: Point3<Real>, metadata: Option<S>) -> Mesh<S> {
        let corners = [
            Point3::new(mins.x, mins.y, mins.z), // 0
            Point3::new(maxs.x, mins.y, mins.z), // 1: +X
            Point3::new(maxs.x, maxs.y, mins.z), // 2: +X+Y
            Point3::new(mins.x, maxs.y, mins.z), // 3: +Y
            Point3::new(mins.x, mins.y, maxs.z), // 4: +Z
            Point3::new(maxs.x, mins.y, maxs.z), // 5: +X+Z
            Point3::new(maxs.x, maxs.y, maxs.z), // 6: +X+Y+Z
            Point3::new(mins.x, maxs.y, maxs.z), // 7: +Y+Z
        ];

        let faces: [([usize; 4], Vector3<Real>); 6] = [
            ([0, 3, 2, 1], -Vector3::z()),
            ([4, 5, 6, 7], Vector3::z()),
            ([0, 1, 5, 4], -Vector3::y()),
            ([3, 7, 6, 2], Vector3::y()),
            ([0, 4, 7, 3], -Vector3::x()),
            ([1, 2, 6, 5], Vector3::x()),
        ];

        let polygons: Vec<Polygon<S>> = faces
            .iter()
            .map(|(indices, normal)| {
                let vertices = indices
                    .iter()
                    .map(|&i| Vertex::new(corners[i], *normal))
                    .collect();
                Polygon::new(vertices, metadata.clone())
            })
            .collect();

        Mesh::from_polygons(&polygons)
    }
}
