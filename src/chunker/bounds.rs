use crate::chunker::RootFrame;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::traits::MeshBearing;

/// Combined axis-aligned bound of `pieces`, expressed in the root's local frame.
///
/// All eight corners of each local bound are carried through the piece's
/// transform and back into root space before being accumulated: a rotated box
/// is not axis-aligned any more, so its center and extents alone would
/// under-estimate the result. Pieces without geometry are skipped; `None`
/// means there was nothing to measure.
pub fn aggregate<'a, M, I>(root: &RootFrame, pieces: I) -> Option<Aabb>
where
    M: MeshBearing + ?Sized + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let mut combined: Option<Aabb> = None;
    for piece in pieces {
        let Some(local) = piece.local_bound() else {
            continue;
        };
        let world = piece.transform();
        for corner in local.vertices() {
            let world_point = world.transform_point(&corner);
            let root_point = root.inverse_transform_point(&world_point);
            match combined.as_mut() {
                Some(aabb) => aabb.take_point(root_point),
                None => combined = Some(Aabb::new(root_point, root_point)),
            }
        }
    }
    combined
}
