//! JSON scene manifests: a root frame and a tree of pieces to chunk.
//!
//! ```json
//! {
//!   "root": { "name": "Terrain", "frame": { "rotation_degrees": [0, 90, 0] } },
//!   "cuts": "0, 12.4, 24.8",
//!   "pieces": [
//!     { "name": "ground", "geometry": { "stl": "ground.stl" }, "materials": ["Grass"] },
//!     { "name": "wall", "geometry": { "cuboid": [32, 1, 3] },
//!       "frame": { "position": [14, 0.5, 1.5] } }
//!   ]
//! }
//! ```
//!
//! Relative STL paths are resolved against the manifest's directory. A
//! `cuboid` is centered on its node's origin.

use crate::errors::ManifestError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::scene::{Frame, MaterialRef, NodeId, Piece, PieceMesh, Scene};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub root: RootSpec,
    /// Default cut list, used when none is given on the command line
    #[serde(default)]
    pub cuts: Option<String>,
    #[serde(default)]
    pub pieces: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootSpec {
    pub name: String,
    #[serde(default)]
    pub frame: FrameSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub frame: FrameSpec,
    #[serde(default)]
    pub geometry: Option<GeometrySpec>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameSpec {
    pub position: [Real; 3],
    /// Euler angles in degrees, applied X, then Y, then Z
    pub rotation_degrees: [Real; 3],
    pub scale: [Real; 3],
}

impl Default for FrameSpec {
    fn default() -> Self {
        FrameSpec {
            position: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl From<FrameSpec> for Frame {
    fn from(spec: FrameSpec) -> Self {
        let [x, y, z] = spec.position;
        let [rx, ry, rz] = spec.rotation_degrees;
        let [sx, sy, sz] = spec.scale;
        Frame {
            position: Vector3::new(x, y, z),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(sx, sy, sz),
        }
        .with_rotation_degrees(rx, ry, rz)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum GeometrySpec {
    /// Path to an ASCII or binary STL file
    Stl(PathBuf),
    /// Box dimensions `[x, y, z]`, centered on the node
    Cuboid([Real; 3]),
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Build the scene this manifest describes, returning it with the root's id.
    pub fn build_scene(&self, base_dir: &Path) -> Result<(Scene, NodeId), ManifestError> {
        let mut scene = Scene::new();
        let root = scene.add_group(None, self.root.name.clone(), &self.root.frame.into())?;
        for spec in &self.pieces {
            add_node(&mut scene, root, spec, base_dir)?;
        }
        log::debug!(
            "built scene {:?} with {} node(s)",
            self.root.name,
            scene.len()
        );
        Ok((scene, root))
    }
}

fn add_node(
    scene: &mut Scene,
    parent: NodeId,
    spec: &NodeSpec,
    base_dir: &Path,
) -> Result<(), ManifestError> {
    let frame = Frame::from(spec.frame);
    let id = match &spec.geometry {
        Some(geometry) => {
            let materials: Vec<MaterialRef> =
                spec.materials.iter().map(MaterialRef::new).collect();
            let mesh = load_geometry(geometry, &spec.name, materials.first().cloned(), base_dir)?;
            scene.add_piece(Some(parent), spec.name.clone(), &frame, Piece::new(mesh, materials))?
        },
        None => scene.add_group(Some(parent), spec.name.clone(), &frame)?,
    };
    for child in &spec.children {
        add_node(scene, id, child, base_dir)?;
    }
    Ok(())
}

#[cfg_attr(feature = "stl-io", allow(unused_variables))]
fn load_geometry(
    geometry: &GeometrySpec,
    node: &str,
    surface: Option<MaterialRef>,
    base_dir: &Path,
) -> Result<PieceMesh, ManifestError> {
    match geometry {
        GeometrySpec::Cuboid([x, y, z]) => {
            let half = Vector3::new(*x, *y, *z) / 2.0;
            Ok(Mesh::cuboid_between(
                Point3::from(-half),
                Point3::from(half),
                surface,
            ))
        },
        #[cfg(feature = "stl-io")]
        GeometrySpec::Stl(path) => {
            let path = base_dir.join(path);
            let bytes = std::fs::read(&path).map_err(|source| ManifestError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Mesh::from_stl(&bytes, surface).map_err(|source| ManifestError::Io {
                path: path.display().to_string(),
                source,
            })
        },
        #[cfg(not(feature = "stl-io"))]
        GeometrySpec::Stl(_) => {
            let _ = base_dir;
            Err(ManifestError::StlUnsupported {
                node: node.to_owned(),
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Hierarchy;

    #[test]
    fn nested_nodes_and_defaults() {
        let manifest = Manifest::from_json(
            r#"{
                "root": { "name": "Root" },
                "cuts": "1, 2",
                "pieces": [
                    { "name": "group", "frame": { "position": [1, 0, 0] }, "children": [
                        { "name": "box", "geometry": { "cuboid": [2, 2, 2] }, "materials": ["Stone", "Moss"] }
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.cuts.as_deref(), Some("1, 2"));

        let (scene, root) = manifest.build_scene(Path::new(".")).unwrap();
        let pieces = scene.list_mesh_pieces(root);
        assert_eq!(pieces.len(), 1);

        let piece = scene.piece(pieces[0]).unwrap();
        assert_eq!(piece.surface_material(), Some(&MaterialRef::new("Stone")));
        let world = scene.world_transform(pieces[0]).unwrap();
        assert_eq!(world.transform_point(&Point3::origin()), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Manifest::from_json(r#"{ "root": { "name": "R", "colour": 3 } }"#);
        assert!(matches!(result, Err(ManifestError::Json(_))));
    }
}
