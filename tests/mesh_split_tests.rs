mod support;

use meshchunk::{
    float_types::Real,
    mesh::{Mesh, plane::Plane, polygon::Polygon, vertex::Vertex},
};
use nalgebra::{Point3, Vector3};
use support::approx_eq;

type TagMesh = Mesh<&'static str>;

/// Enclosed volume by the divergence theorem; positive when faces wind outward.
fn volume<S: Clone + Send + Sync + std::fmt::Debug>(mesh: &Mesh<S>) -> Real {
    mesh.polygons
        .iter()
        .flat_map(|p| p.triangulate())
        .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)) / 6.0)
        .sum()
}

/// Quad wound so that its normal agrees with `facing`.
fn quad(corners: [[Real; 3]; 4], facing: Vector3<Real>, tag: &'static str) -> Polygon<&'static str> {
    let vertices = corners
        .iter()
        .map(|c| Vertex::new(Point3::new(c[0], c[1], c[2]), facing))
        .collect();
    let mut poly = Polygon::new(vertices, Some(tag));
    if poly.plane.normal().dot(&facing) < 0.0 {
        poly.flip();
    }
    poly
}

/// Square tube along X from 0 to 10: outer section [0,3]², hole [1,2]².
fn tube() -> TagMesh {
    let (x0, x1) = (0.0, 10.0);
    let mut faces = Vec::new();
    // outer walls
    faces.push(quad([[x0, 0.0, 0.0], [x1, 0.0, 0.0], [x1, 0.0, 3.0], [x0, 0.0, 3.0]], -Vector3::y(), "wall"));
    faces.push(quad([[x0, 3.0, 0.0], [x1, 3.0, 0.0], [x1, 3.0, 3.0], [x0, 3.0, 3.0]], Vector3::y(), "wall"));
    faces.push(quad([[x0, 0.0, 0.0], [x1, 0.0, 0.0], [x1, 3.0, 0.0], [x0, 3.0, 0.0]], -Vector3::z(), "wall"));
    faces.push(quad([[x0, 0.0, 3.0], [x1, 0.0, 3.0], [x1, 3.0, 3.0], [x0, 3.0, 3.0]], Vector3::z(), "wall"));
    // inner walls face into the hole
    faces.push(quad([[x0, 1.0, 1.0], [x1, 1.0, 1.0], [x1, 1.0, 2.0], [x0, 1.0, 2.0]], Vector3::y(), "bore"));
    faces.push(quad([[x0, 2.0, 1.0], [x1, 2.0, 1.0], [x1, 2.0, 2.0], [x0, 2.0, 2.0]], -Vector3::y(), "bore"));
    faces.push(quad([[x0, 1.0, 1.0], [x1, 1.0, 1.0], [x1, 2.0, 1.0], [x0, 2.0, 1.0]], Vector3::z(), "bore"));
    faces.push(quad([[x0, 1.0, 2.0], [x1, 1.0, 2.0], [x1, 2.0, 2.0], [x0, 2.0, 2.0]], -Vector3::z(), "bore"));
    // annular ends, four strips each
    for (x, facing) in [(x0, -Vector3::x()), (x1, Vector3::x())] {
        for (y0, y1, z0, z1) in [
            (0.0, 3.0, 0.0, 1.0),
            (0.0, 3.0, 2.0, 3.0),
            (0.0, 1.0, 1.0, 2.0),
            (2.0, 3.0, 1.0, 2.0),
        ] {
            faces.push(quad([[x, y0, z0], [x, y1, z0], [x, y1, z1], [x, y0, z1]], facing, "end"));
        }
    }
    Mesh::from_polygons(&faces)
}

#[test]
fn split_box_yields_closed_halves() {
    let cube: TagMesh = Mesh::cuboid(10.0, 1.0, 1.0, Some("side"));
    assert!(approx_eq(volume(&cube), 10.0, 1e-9));

    let plane = Plane::from_normal(Vector3::x(), 4.0);
    let (lower, upper) = cube.split_capped(&plane, Some("cap")).unwrap();

    assert!(approx_eq(volume(&lower), 4.0, 1e-9), "lower volume {}", volume(&lower));
    assert!(approx_eq(volume(&upper), 6.0, 1e-9), "upper volume {}", volume(&upper));
    assert!(approx_eq(lower.bounding_box().maxs.x, 4.0, 1e-9));
    assert!(approx_eq(upper.bounding_box().mins.x, 4.0, 1e-9));
}

#[test]
fn caps_carry_the_cap_metadata_and_face_outward() {
    let cube: TagMesh = Mesh::cuboid(2.0, 2.0, 2.0, Some("side"));
    let plane = Plane::from_normal(Vector3::z(), 0.5);
    let (lower, upper) = cube.split_capped(&plane, Some("cap")).unwrap();

    for (half, outward) in [(&lower, Vector3::z()), (&upper, -Vector3::z())] {
        let caps: Vec<_> = half
            .polygons
            .iter()
            .filter(|p| p.metadata == Some("cap"))
            .collect();
        assert!(!caps.is_empty());
        for cap in caps {
            assert!(cap.vertices.iter().all(|v| approx_eq(v.pos.z, 0.5, 1e-9)));
            assert!((cap.plane.normal() - outward).norm() < 1e-9);
        }
        // the original faces keep their own metadata
        assert!(half.polygons.iter().any(|p| p.metadata == Some("side")));
    }
}

#[test]
fn caps_leave_holes_open() {
    let tube = tube();
    assert!(approx_eq(volume(&tube), 80.0, 1e-9), "tube volume {}", volume(&tube));

    let plane = Plane::from_normal(Vector3::x(), 5.0);
    let (lower, upper) = tube.split_capped(&plane, Some("cap")).unwrap();

    assert!(approx_eq(volume(&lower), 40.0, 1e-9), "lower volume {}", volume(&lower));
    assert!(approx_eq(volume(&upper), 40.0, 1e-9), "upper volume {}", volume(&upper));
}

#[test]
fn separate_islands_get_separate_caps() {
    let mut polygons = Mesh::<&str>::cuboid_between(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0), None).polygons;
    polygons.extend(
        Mesh::<&str>::cuboid_between(Point3::new(0.0, 3.0, 0.0), Point3::new(4.0, 5.0, 1.0), None).polygons,
    );
    let pair = Mesh::from_polygons(&polygons);

    let (lower, upper) = pair
        .split_capped(&Plane::from_normal(Vector3::x(), 1.0), Some("cap"))
        .unwrap();
    assert!(approx_eq(volume(&lower), 1.0 + 2.0, 1e-9));
    assert!(approx_eq(volume(&upper), 3.0 + 6.0, 1e-9));
}

#[test]
fn plane_missing_or_touching_the_mesh_is_no_split() {
    let cube: TagMesh = Mesh::cuboid(1.0, 1.0, 1.0, None);
    assert!(cube.split_capped(&Plane::from_normal(Vector3::x(), 3.0), None).is_none());
    assert!(cube.split_capped(&Plane::from_normal(Vector3::x(), 1.0), None).is_none());
    assert!(cube.split_capped(&Plane::from_normal(-Vector3::y(), 0.0), None).is_none());
    assert!(TagMesh::new().split_capped(&Plane::from_normal(Vector3::x(), 0.0), None).is_none());
}

#[test]
fn oblique_cut_preserves_volume() {
    let cube: TagMesh = Mesh::cuboid(2.0, 2.0, 2.0, None);
    let plane = Plane::from_point_normal(Point3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 2.0, 0.5)).unwrap();
    let (lower, upper) = cube.split_capped(&plane, None).unwrap();

    assert!(approx_eq(volume(&lower) + volume(&upper), 8.0, 1e-9));
    // the plane passes through the center, so it halves the cube
    assert!(approx_eq(volume(&lower), 4.0, 1e-9), "lower volume {}", volume(&lower));
}

#[test]
fn transform_moves_geometry_and_keeps_orientation() {
    let cube: TagMesh = Mesh::cuboid(1.0, 2.0, 3.0, None);
    let mirror = nalgebra::Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
    let mirrored = cube.transform(&mirror).unwrap();

    assert!(approx_eq(mirrored.bounding_box().mins.x, -1.0, 1e-12));
    assert!(approx_eq(volume(&mirrored), 6.0, 1e-9), "mirroring must keep faces outward");
    assert!(cube.transform(&nalgebra::Matrix4::zeros()).is_none());

    let triangles = mirrored.triangulate();
    assert_eq!(triangles.polygons.len(), 12);
    assert!(approx_eq(volume(&triangles), 6.0, 1e-9));
}
