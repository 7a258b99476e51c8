//! Mesh import and export

#[cfg(feature = "stl-io")]
pub mod stl;
