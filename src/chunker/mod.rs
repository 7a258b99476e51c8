//! Partition the mesh pieces under a root into chunks along the root's X axis.
//!
//! A run has three stages, each a function over a snapshot of the pieces:
//!
//! 1. [`bounds::aggregate`] measures everything under the root in root space,
//! 2. [`slicer::slice_pieces`] applies each cut plane, in ascending order, to
//!    every live fragment,
//! 3. [`classify::classify`] drops each leaf into the interval holding its
//!    bound center.
//!
//! The stages only produce a [`ChunkPlan`]. Nothing touches the host until
//! [`commit::commit`] applies the plan, and the only refusals (no usable cut,
//! unknown root, nothing to cut) happen before that.
//!
//! ```
//! use meshchunk::chunker::{Chunker, PlaneSlicer};
//! use meshchunk::mesh::Mesh;
//! use meshchunk::scene::{Frame, Piece, Scene};
//! use nalgebra::Point3;
//!
//! let mut scene = Scene::new();
//! let root = scene.add_group(None, "Root", &Frame::identity()).unwrap();
//! let slab = Mesh::cuboid_between(Point3::new(-2.0, 0.0, 0.0), Point3::new(30.0, 1.0, 1.0), None);
//! scene.add_piece(Some(root), "slab", &Frame::identity(), Piece::new(slab, vec![])).unwrap();
//!
//! let report = Chunker::new(PlaneSlicer).run(&mut scene, root, "0, 12.4, 24.8").unwrap();
//! assert_eq!(report.chunk_count, 4);
//! assert_eq!(report.fragment_count, 4);
//! ```

use crate::errors::ChunkError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::scene::frame::transform_plane_normal;
use crate::scene::{NodeId, NodePiece};
use crate::traits::Hierarchy;
use nalgebra::{Matrix4, Point3, Vector3};
use std::fmt;

pub mod arena;
pub mod bounds;
pub mod classify;
pub mod commit;
pub mod cuts;
pub mod slicer;

pub use arena::{Fragment, FragmentArena, PieceKey};
pub use cuts::{normalize_cuts, parse_cut_coordinates};
pub use slicer::{PlaneSlicer, SliceOutcome, Slicer, SplitResult};

/// The root's world placement, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct RootFrame {
    world: Matrix4<Real>,
    inverse: Matrix4<Real>,
    right: Vector3<Real>,
}

impl RootFrame {
    /// `None` when `world` cannot be inverted or collapses the X axis.
    pub fn new(world: Matrix4<Real>) -> Option<Self> {
        let inverse = world.try_inverse()?;
        let right = transform_plane_normal(&inverse, &Vector3::x())?;
        Some(RootFrame {
            world,
            inverse,
            right,
        })
    }

    /// Root-local point to world space.
    pub fn transform_point(&self, point: &Point3<Real>) -> Point3<Real> {
        self.world.transform_point(point)
    }

    /// World point to root-local space.
    pub fn inverse_transform_point(&self, point: &Point3<Real>) -> Point3<Real> {
        self.inverse.transform_point(point)
    }

    /// World-space normal of the root's `x = const` planes.
    pub const fn right(&self) -> Vector3<Real> {
        self.right
    }

    pub const fn world(&self) -> &Matrix4<Real> {
        &self.world
    }

    pub const fn inverse(&self) -> &Matrix4<Real> {
        &self.inverse
    }
}

/// Everything a run decided, not yet applied to the host.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub(crate) root: NodeId,
    pub(crate) bound: Aabb,
    pub(crate) boundaries: Vec<Real>,
    pub(crate) fragments: FragmentArena,
    pub(crate) superseded: Vec<NodeId>,
    pub(crate) chunks: Vec<Vec<PieceKey>>,
}

impl ChunkPlan {
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Aggregated bound of the input pieces in root space.
    pub const fn bound(&self) -> &Aabb {
        &self.bound
    }

    pub fn boundaries(&self) -> &[Real] {
        &self.boundaries
    }

    /// Leaf fragments, in slicing order.
    pub const fn fragments(&self) -> &FragmentArena {
        &self.fragments
    }

    /// Host pieces that were cut.
    pub fn superseded(&self) -> &[NodeId] {
        &self.superseded
    }

    /// Fragment keys per interval.
    pub fn chunks(&self) -> &[Vec<PieceKey>] {
        &self.chunks
    }
}

/// One committed chunk group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSummary {
    pub node: NodeId,
    pub name: String,
    /// `(low, high)` boundary pair of this interval
    pub range: (Real, Real),
    pub pieces: Vec<NodeId>,
}

/// Outcome of a committed run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    pub root: NodeId,
    pub fragment_count: usize,
    pub chunk_count: usize,
    pub boundaries: Vec<Real>,
    pub chunks: Vec<ChunkSummary>,
}

impl fmt::Display for ChunkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sliced into {} pieces and grouped into {} chunks.",
            self.fragment_count, self.chunk_count
        )
    }
}

/// Runs the three stages with a given [`Slicer`].
#[derive(Debug, Clone, Default)]
pub struct Chunker<Sl> {
    slicer: Sl,
}

impl<Sl: Slicer> Chunker<Sl> {
    pub const fn new(slicer: Sl) -> Self {
        Chunker { slicer }
    }

    /// Parse `cut_text`, plan and commit in one go.
    pub fn run<H: Hierarchy + ?Sized>(
        &self,
        host: &mut H,
        root: NodeId,
        cut_text: &str,
    ) -> Result<ChunkReport, ChunkError> {
        let plan = self.plan(&*host, root, cut_text)?;
        let report = commit::commit(host, plan)?;
        log::info!("{report}");
        Ok(report)
    }

    /// Parse `cut_text` and plan without touching the host.
    pub fn plan<H: Hierarchy + ?Sized>(
        &self,
        host: &H,
        root: NodeId,
        cut_text: &str,
    ) -> Result<ChunkPlan, ChunkError> {
        let cuts = parse_cut_coordinates(cut_text);
        if cuts.is_empty() {
            log::warn!("refusing to chunk: no usable cut coordinates in {cut_text:?}");
            return Err(ChunkError::NoCutCoordinates {
                input: cut_text.to_owned(),
            });
        }
        self.plan_with_cuts(host, root, &cuts)
    }

    /// Plan with already parsed cuts. They are sorted and deduplicated like
    /// [`parse_cut_coordinates`] output; an empty set is refused.
    pub fn plan_with_cuts<H: Hierarchy + ?Sized>(
        &self,
        host: &H,
        root: NodeId,
        cuts: &[Real],
    ) -> Result<ChunkPlan, ChunkError> {
        let cuts = normalize_cuts(cuts.iter().copied());
        if cuts.is_empty() {
            return Err(ChunkError::NoCutCoordinates {
                input: String::new(),
            });
        }
        let root_frame = resolve_root(host, root)?;
        if host.piece(root).is_some() {
            log::warn!(
                "the mesh on root {:?} is not chunked; only its descendants are",
                host.name(root).unwrap_or_default()
            );
        }

        let mut fragments = FragmentArena::new();
        for node in host.list_mesh_pieces(root) {
            let (Some(piece), Some(world)) = (host.piece(node), host.world_transform(node)) else {
                continue;
            };
            fragments.insert(Fragment {
                origin: Some(node),
                name: host.name(node).unwrap_or_default().to_owned(),
                world,
                piece: piece.clone(),
            });
        }

        let Some(bound) = bounds::aggregate(&root_frame, fragments.iter().map(|(_, f)| f)) else {
            let root_name = host.name(root).unwrap_or_default().to_owned();
            log::warn!("refusing to chunk: {root_name:?} has no mesh-bearing descendants");
            return Err(ChunkError::NoGeometry { root: root_name });
        };
        log::debug!(
            "aggregated {} piece(s): x in [{}, {}]",
            fragments.len(),
            bound.mins.x,
            bound.maxs.x
        );

        let boundaries = classify::boundary_list(&bound, &cuts);
        let SliceOutcome {
            fragments,
            superseded,
            ..
        } = slicer::slice_pieces(&root_frame, fragments, &cuts, &self.slicer);

        let keys: Vec<PieceKey> = fragments.keys().collect();
        let chunks = classify::classify(&root_frame, &boundaries, fragments.iter().map(|(_, f)| f))
            .into_iter()
            .map(|group| group.into_iter().map(|position| keys[position]).collect())
            .collect();

        Ok(ChunkPlan {
            root,
            bound,
            boundaries,
            fragments,
            superseded,
            chunks,
        })
    }
}

/// Root-space bound of everything under `root`, without cutting anything.
pub fn measure_bounds<H: Hierarchy + ?Sized>(host: &H, root: NodeId) -> Result<Aabb, ChunkError> {
    let root_frame = resolve_root(host, root)?;
    let pieces: Vec<NodePiece<'_>> = host
        .list_mesh_pieces(root)
        .into_iter()
        .filter_map(|node| NodePiece::resolve(host, node))
        .collect();
    bounds::aggregate(&root_frame, &pieces).ok_or_else(|| ChunkError::NoGeometry {
        root: host.name(root).unwrap_or_default().to_owned(),
    })
}

fn resolve_root<H: Hierarchy + ?Sized>(host: &H, root: NodeId) -> Result<RootFrame, ChunkError> {
    let world = host
        .world_transform(root)
        .ok_or(ChunkError::UnknownNode(root))?;
    RootFrame::new(world).ok_or(ChunkError::SingularTransform(root))
}
