mod support;

use meshchunk::{
    errors::ChunkError,
    float_types::Real,
    scene::{Frame, Scene},
    traits::Hierarchy,
};
use nalgebra::{Matrix4, Point3};
use support::{approx_eq, slab};

fn assert_matrix_eq(a: &Matrix4<Real>, b: &Matrix4<Real>) {
    assert!((a - b).norm() < 1e-9, "{a} != {b}");
}

#[test]
fn world_transform_composes_parents() {
    let mut scene = Scene::new();
    let root = scene
        .add_group(None, "root", &Frame::from_position(1.0, 0.0, 0.0).with_scale(2.0, 2.0, 2.0))
        .unwrap();
    let child = scene
        .add_group(Some(root), "child", &Frame::from_position(0.0, 1.0, 0.0))
        .unwrap();

    let world = scene.world_transform(child).unwrap();
    assert_eq!(world.transform_point(&Point3::origin()), Point3::new(1.0, 2.0, 0.0));
}

#[test]
fn reparent_keeps_world_placement() {
    let mut scene = Scene::new();
    let a = scene
        .add_group(None, "a", &Frame::from_position(3.0, 0.0, 0.0).with_rotation_degrees(0.0, 0.0, 45.0))
        .unwrap();
    let b = scene
        .add_group(None, "b", &Frame::from_position(-1.0, 2.0, 5.0).with_scale(1.0, 3.0, 1.0))
        .unwrap();
    let piece = scene
        .add_piece(Some(a), "piece", &Frame::from_position(1.0, 1.0, 1.0), slab(0.0, 1.0, None))
        .unwrap();

    let before = scene.world_transform(piece).unwrap();
    scene.reparent(piece, b).unwrap();
    let after = scene.world_transform(piece).unwrap();

    assert_matrix_eq(&before, &after);
    assert_eq!(scene.node(piece).unwrap().parent(), Some(b));
    assert!(scene.node(a).unwrap().children().is_empty());
    assert_eq!(scene.node(b).unwrap().children(), &[piece]);
}

#[test]
fn reparent_refuses_cycles() {
    let mut scene = Scene::new();
    let a = scene.add_group(None, "a", &Frame::identity()).unwrap();
    let b = scene.add_group(Some(a), "b", &Frame::identity()).unwrap();

    assert!(matches!(scene.reparent(a, b), Err(ChunkError::CyclicReparent { .. })));
    assert!(matches!(scene.reparent(a, a), Err(ChunkError::CyclicReparent { .. })));
    assert_eq!(scene.node(a).unwrap().parent(), None);
}

#[test]
fn destroy_removes_the_subtree_and_ids_are_not_reused() {
    let mut scene = Scene::new();
    let root = scene.add_group(None, "root", &Frame::identity()).unwrap();
    let a = scene.add_group(Some(root), "a", &Frame::identity()).unwrap();
    let b = scene
        .add_piece(Some(a), "b", &Frame::identity(), slab(0.0, 1.0, None))
        .unwrap();

    scene.destroy(a).unwrap();
    assert!(!scene.contains(a));
    assert!(!scene.contains(b));
    assert!(scene.node(root).unwrap().children().is_empty());
    assert!(matches!(scene.destroy(a), Err(ChunkError::UnknownNode(_))));

    let c = scene.add_group(Some(root), "c", &Frame::identity()).unwrap();
    assert_ne!(c, a);
    assert_ne!(c, b);
    assert_eq!(scene.len(), 2);
}

#[test]
fn list_mesh_pieces_skips_groups_and_the_root() {
    let mut scene = Scene::new();
    let root = scene
        .add_piece(None, "root", &Frame::identity(), slab(0.0, 1.0, None))
        .unwrap();
    let group = scene.add_group(Some(root), "group", &Frame::identity()).unwrap();
    let first = scene
        .add_piece(Some(group), "first", &Frame::identity(), slab(0.0, 1.0, None))
        .unwrap();
    let second = scene
        .add_piece(Some(root), "second", &Frame::identity(), slab(0.0, 1.0, None))
        .unwrap();

    assert_eq!(scene.list_mesh_pieces(root), vec![first, second]);
    assert_eq!(scene.find("second"), Some(second));
    assert_eq!(scene.roots().collect::<Vec<_>>(), vec![root]);
}

#[test]
fn create_piece_node_places_at_world_transform() {
    let mut scene = Scene::new();
    let root = scene
        .add_group(None, "root", &Frame::from_position(0.0, 0.0, 4.0).with_rotation_degrees(90.0, 0.0, 0.0))
        .unwrap();
    let world = Frame::from_position(7.0, 1.0, 1.0).to_matrix();

    let node = scene
        .create_piece_node(root, "placed", &world, slab(0.0, 1.0, None))
        .unwrap();
    assert_matrix_eq(&scene.world_transform(node).unwrap(), &world);

    let group = scene.create_group_node(root, "group").unwrap();
    assert_matrix_eq(&scene.world_transform(group).unwrap(), &scene.world_transform(root).unwrap());
    assert!(scene.piece(group).is_none());
}

#[test]
fn frame_right_and_inverse() {
    let frame = Frame::from_position(1.0, 2.0, 3.0).with_rotation_degrees(0.0, 0.0, 90.0);
    let right = frame.right();
    assert!(approx_eq(right.x, 0.0, 1e-12));
    assert!(approx_eq(right.y, 1.0, 1e-12));

    let p = Point3::new(0.3, -2.0, 9.0);
    let back = frame.inverse_transform_point(&frame.transform_point(&p)).unwrap();
    assert!((back - p).norm() < 1e-9);

    let flat = Frame::identity().with_scale(1.0, 0.0, 1.0);
    assert!(flat.inverse_transform_point(&p).is_none());
    assert_eq!(Frame::default().to_matrix(), Matrix4::identity());
}
