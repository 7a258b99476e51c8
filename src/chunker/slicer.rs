//! The slicing capability and the pass that applies it cut by cut.

use crate::chunker::RootFrame;
use crate::chunker::arena::{Fragment, FragmentArena};
use crate::float_types::Real;
use crate::mesh::plane::Plane;
use crate::scene::frame::transform_plane_normal;
use crate::scene::{MaterialRef, NodeId, PieceMesh};
use crate::traits::MeshBearing;
use nalgebra::{Point3, Vector3};

/// Result of cutting one piece: two closed solids in the piece's local
/// coordinates. `lower` lies behind the plane, `upper` in front of it.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub lower: PieceMesh,
    pub upper: PieceMesh,
}

/// Cuts one solid in two along a world-space plane.
///
/// Returning `None` means the piece stays whole, whether because the plane
/// misses it or because the cut could not be made.
pub trait Slicer {
    fn slice(
        &self,
        piece: &Fragment,
        plane_point: Point3<Real>,
        plane_normal: Vector3<Real>,
        cap_material: Option<&MaterialRef>,
    ) -> Option<SplitResult>;
}

impl<T: Slicer + ?Sized> Slicer for &T {
    fn slice(
        &self,
        piece: &Fragment,
        plane_point: Point3<Real>,
        plane_normal: Vector3<Real>,
        cap_material: Option<&MaterialRef>,
    ) -> Option<SplitResult> {
        (**self).slice(piece, plane_point, plane_normal, cap_material)
    }
}

/// Default [`Slicer`]: splits the polygon mesh and caps both halves with
/// triangles tagged with the cap material.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneSlicer;

impl Slicer for PlaneSlicer {
    fn slice(
        &self,
        piece: &Fragment,
        plane_point: Point3<Real>,
        plane_normal: Vector3<Real>,
        cap_material: Option<&MaterialRef>,
    ) -> Option<SplitResult> {
        let world = piece.transform();
        let to_local = world.try_inverse()?;
        let local_point = to_local.transform_point(&plane_point);
        // world is the inverse of the world-to-local map the normal travels through
        let local_normal = transform_plane_normal(&world, &plane_normal)?;
        let plane = Plane::from_point_normal(local_point, local_normal)?;

        let (lower, upper) = piece.mesh().split_capped(&plane, cap_material.cloned())?;
        Some(SplitResult { lower, upper })
    }
}

/// What the slicing stage leaves behind.
#[derive(Debug, Clone)]
pub struct SliceOutcome {
    /// Leaf fragments after the last cut
    pub fragments: FragmentArena,
    /// Host pieces that were cut and must be destroyed on commit
    pub superseded: Vec<NodeId>,
    /// Number of successful splits for each cut, in cut order
    pub splits_per_cut: Vec<usize>,
}

/// Apply every cut, in the given order, to every live fragment.
///
/// Each cut is a full pass over the current set, so halves produced by one
/// cut are offered to all later cuts. A split fragment is dropped from the
/// arena as soon as its halves exist.
pub fn slice_pieces<Sl: Slicer + ?Sized>(
    root: &RootFrame,
    mut fragments: FragmentArena,
    cuts: &[Real],
    slicer: &Sl,
) -> SliceOutcome {
    let mut superseded = Vec::new();
    let mut splits_per_cut = Vec::with_capacity(cuts.len());

    for &cut in cuts {
        let plane_point = root.transform_point(&Point3::new(cut, 0.0, 0.0));
        let plane_normal = root.right();
        let mut splits = 0;

        fragments.replace_each(|fragment| {
            let cap_material = fragment.surface_material().cloned();
            match slicer.slice(&fragment, plane_point, plane_normal, cap_material.as_ref()) {
                Some(SplitResult { lower, upper }) => {
                    if let Some(node) = fragment.origin {
                        superseded.push(node);
                    }
                    splits += 1;
                    Ok(fragment.into_halves(lower, upper))
                },
                None => Err(fragment),
            }
        });

        log::debug!(
            "cut x = {cut}: {splits} piece(s) split, {} live",
            fragments.len()
        );
        splits_per_cut.push(splits);
    }

    SliceOutcome {
        fragments,
        superseded,
        splits_per_cut,
    }
}
