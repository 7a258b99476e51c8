//! Snapshot of the pieces a chunking run is working on.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::scene::{MaterialRef, NodeId, Piece, PieceMesh};
use crate::traits::MeshBearing;
use indexmap::IndexMap;
use nalgebra::Matrix4;
use std::fmt;

/// Identifier of a fragment inside one [`FragmentArena`]. Keys come from a
/// counter and are never reused, even after the fragment they named is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceKey(u64);

impl fmt::Display for PieceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece{}", self.0)
    }
}

/// One live solid: either a host piece not yet cut, or a product of a cut.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Host node this fragment still is, `None` once it came out of a split
    pub origin: Option<NodeId>,
    pub name: String,
    /// Local-to-world transform, shared by both halves of a split
    pub world: Matrix4<Real>,
    pub piece: Piece,
}

impl Fragment {
    pub fn mesh(&self) -> &PieceMesh {
        &self.piece.mesh
    }

    /// The two fragments replacing `self` after a cut. They inherit the
    /// placement and materials; only the mesh differs.
    pub fn into_halves(self, lower: PieceMesh, upper: PieceMesh) -> (Fragment, Fragment) {
        let lower = Fragment {
            origin: None,
            name: format!("{}_lower", self.name),
            world: self.world,
            piece: Piece::new(lower, self.piece.materials.clone()),
        };
        let upper = Fragment {
            origin: None,
            name: format!("{}_upper", self.name),
            world: self.world,
            piece: Piece::new(upper, self.piece.materials),
        };
        (lower, upper)
    }
}

impl MeshBearing for Fragment {
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

/// Insertion-ordered set of live fragments.
#[derive(Debug, Clone, Default)]
pub struct FragmentArena {
    live: IndexMap<PieceKey, Fragment>,
    next_key: u64,
}

impl FragmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fragment: Fragment) -> PieceKey {
        let key = PieceKey(self.next_key);
        self.next_key += 1;
        self.live.insert(key, fragment);
        key
    }

    pub fn get(&self, key: PieceKey) -> Option<&Fragment> {
        self.live.get(&key)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = PieceKey> + '_ {
        self.live.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceKey, &Fragment)> {
        self.live.iter().map(|(k, f)| (*k, f))
    }

    /// Run one pass over every live fragment in order. `split` may consume a
    /// fragment and return replacements, which take its place in the order;
    /// returning `Err(fragment)` keeps it as is, under the same key.
    ///
    /// The consumed fragment is gone from the arena before the next fragment
    /// is visited.
    pub fn replace_each<F>(&mut self, mut split: F)
    where
        F: FnMut(Fragment) -> Result<(Fragment, Fragment), Fragment>,
    {
        let current = std::mem::take(&mut self.live);
        let mut next = IndexMap::with_capacity(current.len());
        for (key, fragment) in current {
            match split(fragment) {
                Ok((lower, upper)) => {
                    for half in [lower, upper] {
                        let key = PieceKey(self.next_key);
                        self.next_key += 1;
                        next.insert(key, half);
                    }
                },
                Err(kept) => {
                    next.insert(key, kept);
                },
            }
        }
        self.live = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn fragment(name: &str) -> Fragment {
        Fragment {
            origin: None,
            name: name.to_owned(),
            world: Matrix4::identity(),
            piece: Piece::new(Mesh::cuboid(1.0, 1.0, 1.0, None), vec![]),
        }
    }

    #[test]
    fn split_halves_take_the_parents_place_with_fresh_keys() {
        let mut arena = FragmentArena::new();
        let a = arena.insert(fragment("a"));
        let b = arena.insert(fragment("b"));
        let c = arena.insert(fragment("c"));

        arena.replace_each(|f| {
            if f.name == "b" {
                let mesh = f.mesh().clone();
                Ok(f.into_halves(mesh.clone(), mesh))
            } else {
                Err(f)
            }
        });

        let names: Vec<&str> = arena.iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b_lower", "b_upper", "c"]);
        assert!(arena.get(a).is_some());
        assert!(arena.get(b).is_none(), "split parent must not stay reachable");
        assert!(arena.get(c).is_some());
        assert!(arena.keys().all(|k| k != b), "keys are never reused");
    }
}
