//! Cutting a closed mesh in two along a plane and capping both openings.

use crate::float_types::{Real, tolerance};
use crate::mesh::Mesh;
use crate::mesh::plane::{BACK, COPLANAR, FRONT, Plane};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use geo::{Contains, LineString, Point as GeoPoint, Polygon as GeoPolygon};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

/// Merges points closer than a tolerance so that intersection vertices computed
/// from either side of a shared edge end up with the same index.
struct PointWelder {
    cell: Real,
    grid: HashMap<(i64, i64, i64), Vec<usize>>,
    points: Vec<Point3<Real>>,
}

impl PointWelder {
    fn new(cell: Real) -> Self {
        PointWelder {
            cell,
            grid: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell_of(&self, p: &Point3<Real>) -> (i64, i64, i64) {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        )
    }

    fn weld(&mut self, p: Point3<Real>) -> usize {
        let (cx, cy, cz) = self.cell_of(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(candidates) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        if let Some(&found) = candidates
                            .iter()
                            .find(|&&i| (self.points[i] - p).norm() <= self.cell)
                        {
                            return found;
                        }
                    }
                }
            }
        }
        let index = self.points.len();
        self.points.push(p);
        self.grid.entry((cx, cy, cz)).or_default().push(index);
        index
    }
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Split this mesh by `plane` into `(lower, upper)`, where `lower` is the
    /// part behind the plane and `upper` the part in front of it.
    ///
    /// Both halves are closed again with cap polygons lying in the plane,
    /// tagged with `cap` as metadata. Returns `None` when the plane does not
    /// pass strictly through the mesh, so that one side would be empty.
    pub fn split_capped(&self, plane: &Plane, cap: Option<S>) -> Option<(Mesh<S>, Mesh<S>)> {
        let side_mask = self
            .polygons
            .iter()
            .fold(COPLANAR, |acc, poly| acc | plane.classify_polygon(poly));
        if side_mask & FRONT == 0 || side_mask & BACK == 0 {
            return None;
        }

        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for poly in &self.polygons {
            let (coplanar_front, coplanar_back, front, back) = plane.split_polygon(poly);
            // A face lying in the plane and facing +n bounds the solid below it
            lower.extend(coplanar_front);
            upper.extend(coplanar_back);
            upper.extend(front);
            lower.extend(back);
        }
        if lower.is_empty() || upper.is_empty() {
            return None;
        }

        let caps = cap_triangles(&lower, plane);
        for [a, b, c] in &caps {
            lower.push(cap_polygon([*a, *b, *c], plane.normal(), cap.clone()));
            upper.push(cap_polygon([*a, *c, *b], -plane.normal(), cap.clone()));
        }
        log::trace!(
            "split {} polygons into {} lower / {} upper with {} cap triangles",
            self.polygons.len(),
            lower.len(),
            upper.len(),
            caps.len()
        );

        Some((Mesh::from_polygons(&lower), Mesh::from_polygons(&upper)))
    }
}

fn cap_polygon<S: Clone + Send + Sync>(
    points: [Point3<Real>; 3],
    normal: Vector3<Real>,
    metadata: Option<S>,
) -> Polygon<S> {
    let vertices = points.iter().map(|p| Vertex::new(*p, normal)).collect();
    Polygon::new(vertices, metadata)
}

/// Triangles covering the opening that `polygons` leave in `plane`, wound so
/// their normal is `plane.normal()`.
///
/// The opening is bounded by polygon edges lying in the plane that are not
/// shared by two such polygons. Those edges are chained into closed loops,
/// loops nested an odd number of times become holes of their enclosing ring,
/// and each ring is ear-cut in the plane's 2D frame.
fn cap_triangles<S: Clone + Send + Sync>(
    polygons: &[Polygon<S>],
    plane: &Plane,
) -> Vec<[Point3<Real>; 3]> {
    let mut welder = PointWelder::new(tolerance() * 10.0);
    let mut edge_counts: HashMap<(usize, usize), (usize, (usize, usize))> = HashMap::new();

    for poly in polygons {
        for (start, end) in poly.edges() {
            if plane.orient_point(&start.pos) != COPLANAR
                || plane.orient_point(&end.pos) != COPLANAR
            {
                continue;
            }
            let a = welder.weld(start.pos);
            let b = welder.weld(end.pos);
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            edge_counts.entry(key).or_insert((0, (a, b))).0 += 1;
        }
    }

    let mut edges: Vec<(usize, usize)> = edge_counts
        .values()
        .filter(|(count, _)| count % 2 == 1)
        .map(|(_, edge)| *edge)
        .collect();
    // hash order is arbitrary; keep the output deterministic
    edges.sort_unstable();

    let loops = chain_loops(&edges);
    if loops.is_empty() {
        return Vec::new();
    }

    let (to_xy, from_xy) = plane.to_xy_transform();
    let rings: Vec<Vec<[Real; 2]>> = loops
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|&i| {
                    let p = to_xy.transform_point(&welder.points[i]);
                    [p.x, p.y]
                })
                .collect()
        })
        .collect();
    let outlines: Vec<GeoPolygon<Real>> = rings
        .iter()
        .map(|ring| GeoPolygon::new(LineString::from(ring.clone()), vec![]))
        .collect();

    // depth[i] = how many other rings enclose ring i
    let depth: Vec<usize> = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            let probe = GeoPoint::new(ring[0][0], ring[0][1]);
            outlines
                .iter()
                .enumerate()
                .filter(|(j, outline)| *j != i && outline.contains(&probe))
                .count()
        })
        .collect();

    let mut triangles = Vec::new();
    for (outer, ring) in rings.iter().enumerate() {
        if depth[outer] % 2 == 1 {
            continue;
        }
        let holes: Vec<&[[Real; 2]]> = rings
            .iter()
            .enumerate()
            .filter(|(h, hole)| {
                depth[*h] == depth[outer] + 1
                    && outlines[outer].contains(&GeoPoint::new(hole[0][0], hole[0][1]))
            })
            .map(|(_, hole)| hole.as_slice())
            .collect();

        for tri in Mesh::<()>::triangulate_2d(ring, &holes) {
            let [a, b, c] = tri.map(|p| from_xy.transform_point(&p));
            if (b - a).cross(&(c - a)).dot(&plane.normal()) < 0.0 {
                triangles.push([a, c, b]);
            } else {
                triangles.push([a, b, c]);
            }
        }
    }
    triangles
}

/// Chain undirected edges into closed loops of point indices.
/// Chains that do not close are dropped.
fn chain_loops(edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for (e, &(a, b)) in edges.iter().enumerate() {
        adjacency.entry(a).or_default().push(e);
        adjacency.entry(b).or_default().push(e);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (first, mut current) = edges[start];
        let mut ring = vec![first];

        let closed = loop {
            if current == first {
                break true;
            }
            ring.push(current);
            let next = adjacency
                .get(&current)
                .and_then(|incident| incident.iter().copied().find(|&e| !used[e]));
            match next {
                Some(e) => {
                    used[e] = true;
                    let (a, b) = edges[e];
                    current = if a == current { b } else { a };
                },
                None => break false,
            }
        };

        if closed && ring.len() >= 3 {
            loops.push(ring);
        }
    }
    loops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_loops_closes_square_and_drops_open_chain() {
        let edges = vec![(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6)];
        let loops = chain_loops(&edges);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
    }

    #[test]
    fn welder_merges_nearby_points() {
        let mut welder = PointWelder::new(1e-5);
        let a = welder.weld(Point3::new(1.0, 2.0, 3.0));
        let b = welder.weld(Point3::new(1.0 + 1e-7, 2.0, 3.0 - 1e-7));
        let c = welder.weld(Point3::new(1.1, 2.0, 3.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
