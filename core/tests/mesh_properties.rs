//! Geometric properties of generated and hand-built meshes.

mod common;

use rstest::rstest;

use common::{approx_eq, init_logger};
use polymesh_core::MeshError;
use polymesh_core::math::Vec3;
use polymesh_core::mesh::{Mesh, MeshType, NormalOptions, Polygon, RenderArrayKind, Vertex, VertexId};

#[derive(Debug, Clone, Copy)]
enum Shape {
    Plane,
    VPlane,
    Box,
    Sphere,
    Torus,
    Cylinder,
    Cone,
}

fn build(shape: Shape) -> Mesh {
    let mut mesh = Mesh::default();
    match shape {
        Shape::Plane => mesh.create_plane(2.0, 3.0),
        Shape::VPlane => mesh.create_vplane(2.0, 3.0),
        Shape::Box => mesh.create_box(1.0, 2.0, 3.0),
        Shape::Sphere => mesh.create_sphere(1.0, 10, 16),
        Shape::Torus => mesh.create_torus(1.0, 0.25, 24, 12),
        Shape::Cylinder => mesh.create_cylinder(2.0, 0.5, 12, true),
        Shape::Cone => mesh.create_cone(1.5, 0.5, 12),
    }
    .unwrap();
    mesh
}

/// Cube with 8 shared corners; corner `i` sits at (±1, ±1, ±1) per bit of `i`.
fn shared_cube() -> Mesh {
    let mut mesh = Mesh::new(MeshType::Quad);
    let ids: Vec<VertexId> = (0..8)
        .map(|i| {
            let c = |bit: u32| if i & (1 << bit) != 0 { 1.0 } else { -1.0 };
            mesh.add_vertex(Vertex::new([c(0), c(1), c(2)]))
        })
        .collect();
    // +X, -X, +Y, -Y, +Z, -Z
    for face in [
        [1, 3, 7, 5],
        [0, 4, 6, 2],
        [2, 6, 7, 3],
        [0, 1, 5, 4],
        [4, 5, 7, 6],
        [0, 2, 3, 1],
    ] {
        mesh.add_polygon(Polygon::quad(
            ids[face[0]],
            ids[face[1]],
            ids[face[2]],
            ids[face[3]],
        ))
        .unwrap();
    }
    mesh
}

#[rstest]
#[case::plane(Shape::Plane)]
#[case::vplane(Shape::VPlane)]
#[case::cube(Shape::Box)]
#[case::sphere(Shape::Sphere)]
#[case::torus(Shape::Torus)]
#[case::cylinder(Shape::Cylinder)]
#[case::cone(Shape::Cone)]
fn test_generators_are_deterministic(#[case] shape: Shape) {
    init_logger();
    let a = build(shape);
    let b = build(shape);
    assert_eq!(a.mesh_type(), b.mesh_type());
    assert_eq!(a.vertices(), b.vertices());
    assert_eq!(a.polygons(), b.polygons());
}

#[rstest]
#[case::plane(Shape::Plane)]
#[case::vplane(Shape::VPlane)]
#[case::cube(Shape::Box)]
#[case::sphere(Shape::Sphere)]
#[case::torus(Shape::Torus)]
#[case::cylinder(Shape::Cylinder)]
#[case::cone(Shape::Cone)]
fn test_generated_meshes_are_consistent(#[case] shape: Shape) {
    let mesh = build(shape);

    assert_eq!(mesh.dirty_kinds(), RenderArrayKind::ALL.to_vec());
    for polygon in mesh.polygons() {
        assert!(mesh.mesh_type().accepts(polygon.vertex_count()));
        let n = Vec3::from(polygon.normal());
        assert!((n.norm() - 1.0).abs() < 1e-4, "{shape:?} face normal {n:?}");
    }
    for kind in RenderArrayKind::ALL {
        assert_eq!(mesh.build_render_array(kind).count(), mesh.corner_count());
    }

    for v in mesh.vertices() {
        let n = Vec3::from(v.normal);
        let t = Vec3::from(v.tangent);
        assert!((n.norm() - 1.0).abs() < 1e-4, "{shape:?} normal {n:?}");
        assert!((t.norm() - 1.0).abs() < 1e-4, "{shape:?} tangent {t:?}");
        assert!(t.dot(&n).abs() < 1e-4, "{shape:?} tangent not orthogonal");
    }
}

#[rstest]
#[case::unit(1.0, 1.0, 1.0)]
#[case::flat(4.0, 0.5, 2.0)]
#[case::tall(0.25, 10.0, 0.75)]
fn test_box_extents(#[case] width: f32, #[case] depth: f32, #[case] height: f32) {
    let mut mesh = Mesh::default();
    mesh.create_box(width, depth, height).unwrap();
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.polygon_count(), 6);
    assert!(approx_eq(mesh.calculate_bbox(), [width, depth, height], 1e-6));
}

#[rstest]
#[case::zero_width(|m: &mut Mesh| m.create_box(0.0, 1.0, 1.0))]
#[case::negative_radius(|m: &mut Mesh| m.create_sphere(-2.0, 8, 8))]
#[case::infinite_height(|m: &mut Mesh| m.create_cylinder(f32::INFINITY, 1.0, 8, false))]
#[case::too_few_segments(|m: &mut Mesh| m.create_cone(1.0, 1.0, 2))]
#[case::too_few_rings(|m: &mut Mesh| m.create_sphere(1.0, 1, 8))]
#[case::too_few_tube_segments(|m: &mut Mesh| m.create_torus(1.0, 0.5, 8, 0))]
#[case::huge_torus(|m: &mut Mesh| m.create_torus(1.0, 0.5, u32::MAX, 3))]
#[case::huge_sphere(|m: &mut Mesh| m.create_sphere(1.0, 1 << 16, 1 << 16))]
fn test_invalid_generator_parameters(#[case] generate: fn(&mut Mesh) -> Result<(), MeshError>) {
    let mut mesh = build(Shape::Plane);
    let before = mesh.vertices().to_vec();
    assert!(matches!(generate(&mut mesh), Err(MeshError::InvalidParameter(_))));
    assert_eq!(mesh.vertices(), &before[..]);
    assert_eq!(mesh.mesh_type(), MeshType::Quad);
}

#[test]
fn test_recenter_is_idempotent() {
    let mut mesh = build(Shape::Cone);
    mesh.translate([3.0, -2.0, 5.0]);

    let first = mesh.recenter_mesh();
    assert!(approx_eq(first, [-3.0, 2.0, -5.0], 1e-5));
    let second = mesh.recenter_mesh();
    assert!(approx_eq(second, [0.0; 3], 1e-5));

    let (min, max) = mesh.bounds().unwrap();
    let center = (Vec3::from(min) + Vec3::from(max)) * 0.5;
    assert!(center.norm() < 1e-5);
}

#[test]
fn test_radius_is_furthest_vertex() {
    let mut mesh = build(Shape::Sphere);
    assert!((mesh.radius() - 1.0).abs() < 1e-5);
    mesh.translate([0.0, 2.0, 0.0]);
    assert!((mesh.radius() - 3.0).abs() < 1e-5);
}

#[test]
fn test_sphere_normals_point_outward() {
    let mesh = build(Shape::Sphere);
    for v in mesh.vertices() {
        assert!(approx_eq(v.normal, v.position, 1e-5));
    }
    let top = VertexId::new(0);
    assert_eq!(mesh.connected_faces(top).len(), 16);
}

#[test]
fn test_plane_tangent_is_x_axis() {
    let mesh = build(Shape::Plane);
    for v in mesh.vertices() {
        assert!(approx_eq(v.tangent, [1.0, 0.0, 0.0], 1e-6));
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    }
}

#[test]
fn test_connected_faces_on_shared_cube() {
    let mesh = shared_cube();
    for i in 0..8 {
        assert_eq!(mesh.connected_faces(VertexId::new(i)).len(), 3);
    }
    assert_eq!(mesh.connected_faces(VertexId::new(7)), vec![0, 2, 4]);
}

#[test]
fn test_zero_angle_smoothing_matches_flat_shading() {
    let mut mesh = shared_cube();
    mesh.calculate_normals(NormalOptions::flat());
    let flat: Vec<_> = mesh.vertices().iter().map(|v| v.normal).collect();

    mesh.calculate_normals(NormalOptions::smooth(0.0));
    let smooth_zero: Vec<_> = mesh.vertices().iter().map(|v| v.normal).collect();
    assert_eq!(flat, smooth_zero);

    // Each corner takes its first face's normal.
    assert_eq!(flat[7], [1.0, 0.0, 0.0]);
    for (polygon, expected) in mesh.polygons().iter().zip([
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ]) {
        assert!(approx_eq(polygon.normal(), expected, 1e-6));
    }
}

#[test]
fn test_right_angle_smoothing_blends_corners() {
    let mut mesh = shared_cube();
    mesh.calculate_normals(NormalOptions::smooth(90.0));
    let k = 1.0 / 3.0f32.sqrt();
    for v in mesh.vertices() {
        let expected = [v.position[0] * k, v.position[1] * k, v.position[2] * k];
        assert!(approx_eq(v.normal, expected, 1e-5));
    }
}

#[test]
fn test_vertices_by_distance() {
    let mesh = shared_cube();
    let order = mesh.vertices_by_distance([2.0, 2.0, 2.0]);
    assert_eq!(order.len(), 8);
    assert_eq!(order[0], VertexId::new(7));
    assert_eq!(order[7], VertexId::new(0));
}

#[test]
fn test_prune_after_removing_faces() {
    let mut mesh = shared_cube();
    // Drop +X, leaving every corner still in use.
    mesh.remove_polygon(0).unwrap();
    assert_eq!(mesh.prune_unused_vertices(), 0);

    // Keep only -X: the four +X corners become unused.
    while mesh.polygon_count() > 1 {
        mesh.remove_polygon(1).unwrap();
    }
    assert_eq!(mesh.prune_unused_vertices(), 4);
    assert_eq!(mesh.vertex_count(), 4);
    assert!(mesh.vertices().iter().all(|v| v.position[0] == -1.0));
}
