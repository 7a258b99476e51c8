//! Errors returned by the chunker, the scene host and the manifest loader

use crate::scene::NodeId;

/// Everything that can stop a chunking run or a hierarchy edit.
///
/// The first three variants are refusals: they are raised before any
/// mutation, so the hierarchy is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The cut text contained no usable coordinate
    #[error("no usable cut coordinates in {input:?}; use comma-separated numbers, e.g. \"0, 12.4, 24.8\"")]
    NoCutCoordinates { input: String },
    /// A node id does not refer to a live node
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The root has no mesh-bearing descendants
    #[error("root {root:?} has no mesh-bearing descendants")]
    NoGeometry { root: String },
    /// A node was expected to carry a mesh but does not
    #[error("node {0} does not carry a mesh")]
    NotAPiece(NodeId),
    /// Reparenting would make a node its own ancestor
    #[error("cannot parent node {node} under its own descendant {parent}")]
    CyclicReparent { node: NodeId, parent: NodeId },
    /// A transform could not be inverted (zero scale or collapsed axis)
    #[error("transform of node {0} is not invertible")]
    SingularTransform(NodeId),
}

/// Problems loading a scene manifest from disk.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
    /// STL geometry was referenced but the crate was built without `stl-io`
    #[error("node {node:?} references STL geometry but the `stl-io` feature is disabled")]
    StlUnsupported { node: String },
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}
