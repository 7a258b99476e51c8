use crate::chunker::arena::PieceKey;
use crate::chunker::{ChunkPlan, ChunkReport, ChunkSummary};
use crate::errors::ChunkError;
use crate::scene::NodeId;
use crate::traits::Hierarchy;
use hashbrown::HashMap;

/// Name given to the grouping node of interval `index`.
pub fn chunk_name(index: usize) -> String {
    format!("Chunk_{index}")
}

/// Apply a plan to the host.
///
/// Every node the plan refers to is checked first, so a stale plan fails
/// before anything changes. After that the steps are: create nodes for new
/// fragments under the root, create one `Chunk_{i}` group per interval, move
/// every leaf into its group and finally destroy the pieces that were cut.
pub fn commit<H: Hierarchy + ?Sized>(host: &mut H, plan: ChunkPlan) -> Result<ChunkReport, ChunkError> {
    if host.world_transform(plan.root).is_none() {
        return Err(ChunkError::UnknownNode(plan.root));
    }
    for node in plan
        .superseded
        .iter()
        .copied()
        .chain(plan.fragments.iter().filter_map(|(_, f)| f.origin))
    {
        if host.piece(node).is_none() {
            return Err(ChunkError::NotAPiece(node));
        }
    }

    let ChunkPlan {
        root,
        boundaries,
        fragments,
        superseded,
        chunks,
        ..
    } = plan;

    let mut nodes: HashMap<PieceKey, NodeId> = HashMap::with_capacity(fragments.len());
    for (key, fragment) in fragments.iter() {
        let node = match fragment.origin {
            Some(node) => node,
            None => host.create_piece_node(
                root,
                &fragment.name,
                &fragment.world,
                fragment.piece.clone(),
            )?,
        };
        nodes.insert(key, node);
    }

    let mut summaries = Vec::with_capacity(chunks.len());
    for (index, members) in chunks.iter().enumerate() {
        let name = chunk_name(index);
        let group = host.create_group_node(root, &name)?;
        let mut pieces: Vec<NodeId> = Vec::with_capacity(members.len());
        for key in members {
            let node = nodes[key];
            host.reparent(node, group)?;
            pieces.push(node);
        }
        summaries.push(ChunkSummary {
            node: group,
            name,
            range: (boundaries[index], boundaries[index + 1]),
            pieces,
        });
    }

    // Leaves are out from under the cut pieces by now, so destroying a cut
    // piece cannot take a surviving piece with it. A cut piece nested in
    // another cut piece may already be gone.
    for node in superseded {
        if host.world_transform(node).is_some() {
            host.destroy(node)?;
        }
    }

    Ok(ChunkReport {
        root,
        fragment_count: nodes.len(),
        chunk_count: summaries.len(),
        boundaries,
        chunks: summaries,
    })
}
