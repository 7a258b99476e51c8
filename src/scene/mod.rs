//! In-memory scene hierarchy: an arena of named nodes, some of which carry a mesh.
//!
//! [`Scene`] is the host the chunker commits its results to. Node ids come from
//! a counter that is never rewound, so a destroyed node's id is never handed out
//! again and stale ids simply stop resolving.

use crate::errors::ChunkError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::Mesh;
use crate::traits::{Hierarchy, MeshBearing};
use indexmap::IndexMap;
use nalgebra::Matrix4;
use std::fmt;

pub mod frame;

pub use frame::Frame;

/// Stable identifier of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a surface material by name. The chunker only passes these
/// around; it never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialRef(pub String);

impl MaterialRef {
    pub fn new(name: impl Into<String>) -> Self {
        MaterialRef(name.into())
    }
}

impl fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mesh type carried by pieces; polygon metadata is the surface material.
pub type PieceMesh = Mesh<MaterialRef>;

/// A solid: its mesh in local coordinates plus its surface materials.
#[derive(Debug, Clone)]
pub struct Piece {
    pub mesh: PieceMesh,
    pub materials: Vec<MaterialRef>,
}

impl Piece {
    pub fn new(mesh: PieceMesh, materials: Vec<MaterialRef>) -> Self {
        Piece { mesh, materials }
    }

    /// First material, used to texture caps when this piece is cut.
    pub fn surface_material(&self) -> Option<&MaterialRef> {
        self.materials.first()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Local-to-parent transform
    local: Matrix4<Real>,
    piece: Option<Piece>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub const fn local_transform(&self) -> &Matrix4<Real> {
        &self.local
    }

    pub const fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }
}

/// Arena of nodes forming a forest.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: IndexMap<NodeId, Node>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Add an empty grouping node.
    pub fn add_group(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        frame: &Frame,
    ) -> Result<NodeId, ChunkError> {
        self.insert(parent, name.into(), frame.to_matrix(), None)
    }

    /// Add a mesh-bearing node.
    pub fn add_piece(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        frame: &Frame,
        piece: Piece,
    ) -> Result<NodeId, ChunkError> {
        self.insert(parent, name.into(), frame.to_matrix(), Some(piece))
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        name: String,
        local: Matrix4<Real>,
        piece: Option<Piece>,
    ) -> Result<NodeId, ChunkError> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(ChunkError::UnknownNode(parent));
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name,
                parent,
                children: Vec::new(),
                local,
                piece,
            },
        );
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| *id)
    }

    /// First node with the given name, in creation order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    /// All nodes below `id` in depth-first pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn world_inverse(&self, id: NodeId) -> Result<Matrix4<Real>, ChunkError> {
        self.world_transform(id)
            .ok_or(ChunkError::UnknownNode(id))?
            .try_inverse()
            .ok_or(ChunkError::SingularTransform(id))
    }
}

impl Hierarchy for Scene {
    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(Node::name)
    }

    fn world_transform(&self, node: NodeId) -> Option<Matrix4<Real>> {
        let mut current = self.node(node)?;
        let mut world = current.local;
        while let Some(parent) = current.parent {
            current = self.node(parent)?;
            world = current.local * world;
        }
        Some(world)
    }

    fn list_mesh_pieces(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| n.piece.is_some()))
            .collect()
    }

    fn piece(&self, node: NodeId) -> Option<&Piece> {
        self.node(node)?.piece.as_ref()
    }

    fn create_group_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId, ChunkError> {
        self.insert(Some(parent), name.to_owned(), Matrix4::identity(), None)
    }

    fn create_piece_node(
        &mut self,
        parent: NodeId,
        name: &str,
        world: &Matrix4<Real>,
        piece: Piece,
    ) -> Result<NodeId, ChunkError> {
        let local = self.world_inverse(parent)? * world;
        self.insert(Some(parent), name.to_owned(), local, Some(piece))
    }

    fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), ChunkError> {
        if !self.contains(new_parent) {
            return Err(ChunkError::UnknownNode(new_parent));
        }
        if self.is_ancestor_or_self(node, new_parent) {
            return Err(ChunkError::CyclicReparent {
                node,
                parent: new_parent,
            });
        }
        let world = self
            .world_transform(node)
            .ok_or(ChunkError::UnknownNode(node))?;
        let local = self.world_inverse(new_parent)? * world;

        let old_parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|c| *c != node);
        }
        if let Some(parent) = self.nodes.get_mut(&new_parent) {
            parent.children.push(node);
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = Some(new_parent);
            entry.local = local;
        }
        Ok(())
    }

    fn destroy(&mut self, node: NodeId) -> Result<(), ChunkError> {
        let parent = self
            .node(node)
            .ok_or(ChunkError::UnknownNode(node))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        for id in self.descendants(node) {
            self.nodes.shift_remove(&id);
        }
        self.nodes.shift_remove(&node);
        Ok(())
    }
}

/// A scene node seen through its mesh; `None` for nodes without one.
pub struct NodePiece<'a> {
    piece: &'a Piece,
    world: Matrix4<Real>,
}

impl<'a> NodePiece<'a> {
    pub fn resolve<H: Hierarchy + ?Sized>(host: &'a H, node: NodeId) -> Option<Self> {
        Some(NodePiece {
            piece: host.piece(node)?,
            world: host.world_transform(node)?,
        })
    }
}

impl MeshBearing for NodePiece<'_> {
    fn local_bound(&self) -> Option<Aabb> {
        (!self.piece.mesh.is_empty()).then(|| self.piece.mesh.bounding_box())
    }

    fn transform(&self) -> Matrix4<Real> {
        self.world
    }

    fn surface_material(&self) -> Option<&MaterialRef> {
        self.piece.surface_material()
    }
}
