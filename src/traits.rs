use crate::errors::ChunkError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::scene::{MaterialRef, NodeId, Piece};
use nalgebra::Matrix4;

/// Anything that can report a local bound, a placement and a cap material.
///
/// The bounds aggregator and the classifier only need these three facts, so
/// they work on scene nodes and on in-flight fragments alike.
pub trait MeshBearing {
    /// Axis-aligned bound of the mesh in its own coordinates, `None` if it has no geometry.
    fn local_bound(&self) -> Option<Aabb>;

    /// Local-to-world transform.
    fn transform(&self) -> Matrix4<Real>;

    fn surface_material(&self) -> Option<&MaterialRef>;
}

/// The scene host a chunking run reads from and commits to.
///
/// Implementations must keep world transforms stable across
/// [`reparent`](Hierarchy::reparent): moving a node changes its local
/// transform, never where it sits in the world.
pub trait Hierarchy {
    fn name(&self, node: NodeId) -> Option<&str>;

    fn world_transform(&self, node: NodeId) -> Option<Matrix4<Real>>;

    /// Every mesh-bearing node below `root`, excluding `root` itself.
    fn list_mesh_pieces(&self, root: NodeId) -> Vec<NodeId>;

    fn piece(&self, node: NodeId) -> Option<&Piece>;

    /// New empty node under `parent` with an identity local transform.
    fn create_group_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId, ChunkError>;

    /// New mesh-bearing node under `parent`, placed at `world`.
    fn create_piece_node(
        &mut self,
        parent: NodeId,
        name: &str,
        world: &Matrix4<Real>,
        piece: Piece,
    ) -> Result<NodeId, ChunkError>;

    fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), ChunkError>;

    /// Remove `node` and everything below it.
    fn destroy(&mut self, node: NodeId) -> Result<(), ChunkError>;
}
