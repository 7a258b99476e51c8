//! Test support library
//! Provides helper functions, scene builders and fake slicers for tests.
#![allow(dead_code)]

use std::cell::Cell;

use meshchunk::{
    chunker::{Fragment, Slicer, SplitResult},
    float_types::Real,
    mesh::Mesh,
    scene::{Frame, MaterialRef, NodeId, Piece, PieceMesh, Scene, frame::transform_plane_normal},
    traits::MeshBearing,
};
use nalgebra::{Point3, Vector3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// A box piece spanning `[x0, x1]` in X and the unit square in Y and Z.
pub fn slab(x0: Real, x1: Real, material: Option<&str>) -> Piece {
    let materials: Vec<MaterialRef> = material.map(MaterialRef::new).into_iter().collect();
    let mesh = Mesh::cuboid_between(
        Point3::new(x0, 0.0, 0.0),
        Point3::new(x1, 1.0, 1.0),
        materials.first().cloned(),
    );
    Piece::new(mesh, materials)
}

/// A scene with an identity root named `Root` and one slab per `(x0, x1)` span.
pub fn slab_scene(spans: &[(Real, Real)]) -> (Scene, NodeId, Vec<NodeId>) {
    let mut scene = Scene::new();
    let root = scene.add_group(None, "Root", &Frame::identity()).unwrap();
    let pieces = spans
        .iter()
        .enumerate()
        .map(|(i, &(x0, x1))| {
            scene
                .add_piece(Some(root), format!("slab{i}"), &Frame::identity(), slab(x0, x1, Some("Stone")))
                .unwrap()
        })
        .collect();
    (scene, root, pieces)
}

/// Deterministic slicer for axis-aligned boxes: splits the fragment's local
/// bound at the plane's X, provided the plane is a local `x = const` plane
/// that passes strictly through the box. Counts every call it answers.
#[derive(Debug, Default)]
pub struct BoxSlicer {
    pub calls: Cell<usize>,
    pub splits: Cell<usize>,
}

impl Slicer for BoxSlicer {
    fn slice(
        &self,
        piece: &Fragment,
        plane_point: Point3<Real>,
        plane_normal: Vector3<Real>,
        cap_material: Option<&MaterialRef>,
    ) -> Option<SplitResult> {
        self.calls.set(self.calls.get() + 1);
        let world = piece.transform();
        let local_point = world.try_inverse()?.transform_point(&plane_point);
        let local_normal = transform_plane_normal(&world, &plane_normal)?;
        if !approx_eq(local_normal.x.abs(), 1.0, 1e-4) {
            return None;
        }

        let bound = piece.local_bound()?;
        let x = local_point.x;
        if x <= bound.mins.x || x >= bound.maxs.x {
            return None;
        }
        self.splits.set(self.splits.get() + 1);
        let lower: PieceMesh =
            Mesh::cuboid_between(bound.mins, Point3::new(x, bound.maxs.y, bound.maxs.z), cap_material.cloned());
        let upper: PieceMesh =
            Mesh::cuboid_between(Point3::new(x, bound.mins.y, bound.mins.z), bound.maxs, cap_material.cloned());
        Some(SplitResult { lower, upper })
    }
}

/// A slicer whose primitive never succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSlicer;

impl Slicer for NeverSlicer {
    fn slice(
        &self,
        _piece: &Fragment,
        _plane_point: Point3<Real>,
        _plane_normal: Vector3<Real>,
        _cap_material: Option<&MaterialRef>,
    ) -> Option<SplitResult> {
        None
    }
}

/// Every X coordinate of every vertex of `mesh`, after `matrix`.
pub fn world_x_range(mesh: &PieceMesh, matrix: &nalgebra::Matrix4<Real>) -> (Real, Real) {
    mesh.polygons
        .iter()
        .flat_map(|p| p.vertices.iter())
        .map(|v| matrix.transform_point(&v.pos).x)
        .fold((Real::MAX, Real::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)))
}
