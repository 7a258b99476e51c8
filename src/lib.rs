//! Partition a hierarchy of solid mesh pieces into contiguous chunks along the
//! local X axis of a chosen root.
//!
//! Given a root node and a list of cut coordinates, the [`chunker`] measures
//! every piece below the root in root space, cuts each piece with the planes
//! `x = c`, caps the cut faces so every fragment stays closed, and moves each
//! fragment under a `Chunk_{i}` group chosen by where its bound center falls.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import/export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod chunker;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod manifest;
pub mod mesh;
pub mod scene;
pub mod traits;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use chunker::{ChunkReport, Chunker, PlaneSlicer, Slicer};
pub use errors::{ChunkError, ManifestError};
pub use mesh::Mesh;
pub use scene::{Frame, MaterialRef, NodeId, Piece, Scene};
pub use traits::{Hierarchy, MeshBearing};
