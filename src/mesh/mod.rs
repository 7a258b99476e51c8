//! `Mesh` struct: a closed solid stored as a soup of convex polygons

use crate::float_types::{
    Real,
    parry3d::bounding_volume::Aabb,
};
use crate::mesh::polygon::Polygon;
use geo::{Coord, LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Matrix4, Point3};
use std::{fmt::Debug, sync::OnceLock};

pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod split;
pub mod vertex;

#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,
}

impl<S: Clone + Send + Sync + Debug> Default for Mesh<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// An empty mesh.
    pub const fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>]) -> Self {
        Mesh {
            polygons: polygons.to_vec(),
            bounding_box: OnceLock::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] spanning all `polygons`.
    ///
    /// An empty mesh yields a zero-sized box at the origin.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            if self.polygons.is_empty() {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            let mut aabb = Aabb::new_invalid();
            for poly in &self.polygons {
                let poly_bb = poly.bounding_box();
                aabb.take_point(poly_bb.mins);
                aabb.take_point(poly_bb.maxs);
            }
            aabb
        })
    }

    /// Apply an affine transform to every polygon.
    ///
    /// Returns `None` when `matrix` is not invertible, since normals cannot be
    /// carried through a collapsed axis.
    pub fn transform(&self, matrix: &Matrix4<Real>) -> Option<Mesh<S>> {
        let normal_matrix = matrix.try_inverse()?.transpose();
        let polygons = self
            .polygons
            .iter()
            .map(|poly| poly.transformed(matrix, &normal_matrix))
            .collect();
        Some(Mesh {
            polygons,
            bounding_box: OnceLock::new(),
        })
    }

    /// Triangulate each polygon, returning a mesh made only of triangles.
    pub fn triangulate(&self) -> Mesh<S> {
        let triangles = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate().into_iter().map(move |triangle| {
                    Polygon::with_plane(
                        triangle.to_vec(),
                        poly.plane.clone(),
                        poly.metadata.clone(),
                    )
                })
            })
            .collect::<Vec<_>>();

        Mesh::from_polygons(&triangles)
    }

    /// Ear-cut triangulation of a 2D ring with holes; triangles are returned at z = 0.
    pub fn triangulate_2d(
        outer: &[[Real; 2]],
        holes: &[&[[Real; 2]]],
    ) -> Vec<[Point3<Real>; 3]> {
        let outer_coords: Vec<Coord<Real>> =
            outer.iter().map(|&[x, y]| Coord { x, y }).collect();

        let holes_coords: Vec<LineString<Real>> = holes
            .iter()
            .map(|hole| {
                let coords: Vec<Coord<Real>> =
                    hole.iter().map(|&[x, y]| Coord { x, y }).collect();
                LineString::new(coords)
            })
            .collect();

        let polygon = GeoPolygon::new(LineString::new(outer_coords), holes_coords);

        let triangulation = polygon.earcut_triangles_raw();
        let triangle_indices = triangulation.triangle_indices;
        let vertices = triangulation.vertices;

        triangle_indices
            .chunks_exact(3)
            .map(|tri| {
                [
                    Point3::new(vertices[2 * tri[0]], vertices[2 * tri[0] + 1], 0.0),
                    Point3::new(vertices[2 * tri[1]], vertices[2 * tri[1] + 1], 0.0),
                    Point3::new(vertices[2 * tri[2]], vertices[2 * tri[2] + 1], 0.0),
                ]
            })
            .collect()
    }
}
