//! End-to-end explode scenarios against assembled test scenes.

use asmview_explode::{
    CapabilityReason, Exploder, FALLBACK_AXIS, PickingAccel, detect_capability,
    index_scene_geometries,
};
use asmview_scene::{
    Attribute, Geometry, GeometryId, Group, InstancedMeshData, Material, MeshData, Node, NodeId,
    NodeKind, Scene, ShaderHook, Transform, attribute_names::POSITION,
};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Picking collaborator that records the build/dispose lifecycle.
#[derive(Default)]
struct RecordingPicking {
    built: Vec<GeometryId>,
    disposed: Vec<GeometryId>,
}

impl PickingAccel for RecordingPicking {
    fn build_index(&mut self, id: GeometryId, _geometry: &Geometry) {
        self.built.push(id);
    }

    fn dispose_index(&mut self, id: GeometryId) {
        self.disposed.push(id);
    }
}

/// `triangles` disjoint triangles laid out along +X, 3 unshared vertices
/// each.
fn triangle_strip_geometry(triangles: usize) -> Geometry {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for t in 0..triangles {
        #[allow(clippy::cast_precision_loss)]
        let x = t as f32;
        let base = u32::try_from(positions.len() / 3).unwrap();
        positions.extend_from_slice(&[
            x, 0.0, 0.0, //
            x + 0.6, 0.0, 0.0, //
            x + 0.3, 0.5, 0.0,
        ]);
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    let vertex_count = positions.len() / 3;
    let mut g = Geometry::new();
    g.insert_attribute(POSITION, Attribute::new(3, positions));
    g.index = Some(asmview_scene::IndexBuffer::from_indices(
        &indices,
        vertex_count,
    ));
    g
}

fn small_triangle_geometry() -> Geometry {
    let mut g = Geometry::new();
    g.insert_attribute(
        POSITION,
        Attribute::new(3, vec![-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0]),
    );
    g.index = Some(asmview_scene::IndexBuffer::from_indices(&[0, 1, 2], 3));
    g
}

fn spawn_mesh(scene: &mut Scene, geometry: Geometry, at: Vec3) -> NodeId {
    let geometry = scene.add_geometry(geometry);
    let mut node = Node::new(NodeKind::Mesh(MeshData {
        geometry,
        materials: Vec::new(),
    }));
    node.transform = Transform::from_translation(at);
    scene.spawn(scene.root(), node)
}

fn world_center(scene: &Scene, node: NodeId) -> Vec3 {
    let mesh = scene.node(node).kind.mesh_data().unwrap();
    let bounds = scene.geometry(mesh.geometry).bounds.unwrap();
    bounds
        .aabb
        .transformed(scene.world_matrix(node))
        .center()
}

fn assembly_center(scene: &Scene) -> Vec3 {
    let mut merged: Option<asmview_scene::Aabb> = None;
    for node in scene.mesh_nodes() {
        let mesh = scene.node(node).kind.mesh_data().unwrap();
        let aabb = scene
            .geometry(mesh.geometry)
            .bounds
            .unwrap()
            .aabb
            .transformed(scene.world_matrix(node));
        merged = Some(merged.map_or(aabb, |m| m.union(&aabb)));
    }
    merged.unwrap().center()
}

/// Scenario A: one mesh, three material groups of 30/60/90 index entries.
#[test]
fn material_group_split_produces_three_complete_parts() {
    let mut scene = Scene::new();
    let materials: Vec<_> = [
        ("red", Vec4::new(1.0, 0.0, 0.0, 1.0)),
        ("green", Vec4::new(0.0, 1.0, 0.0, 1.0)),
        ("blue", Vec4::new(0.0, 0.0, 1.0, 1.0)),
    ]
    .iter()
    .map(|(name, color)| {
        scene.add_material(Material {
            shader_hook: Some(ShaderHook("asset-patch".into())),
            ..Material::colored(name, *color)
        })
    })
    .collect();

    let mut geometry = triangle_strip_geometry(60);
    geometry.groups = vec![
        Group {
            start: 0,
            count: 30,
            material_index: 0,
        },
        Group {
            start: 30,
            count: 60,
            material_index: 1,
        },
        Group {
            start: 90,
            count: 90,
            material_index: 2,
        },
    ];
    let geometry_id = scene.add_geometry(geometry);
    let source_ids = materials.clone();
    scene.spawn(
        scene.root(),
        Node::named(
            "assembly",
            NodeKind::Mesh(MeshData {
                geometry: geometry_id,
                materials,
            }),
        ),
    );

    assert!(detect_capability(&scene).can_explode);

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 0.0);

    let parts = scene.mesh_nodes();
    assert_eq!(parts.len(), 3);
    assert_eq!(exploder.part_count(), 3);

    // Every referenced source vertex is accounted for, none duplicated
    // (the groups are disjoint and vertices unshared).
    let total: usize = parts
        .iter()
        .map(|&p| {
            let mesh = scene.node(p).kind.mesh_data().unwrap();
            scene.geometry(mesh.geometry).vertex_count()
        })
        .sum();
    assert_eq!(total, 180);

    // Parts carry converted materials, never the source slots, and the
    // hooks are gone; the sources keep theirs.
    for &part in &parts {
        let mesh = scene.node(part).kind.mesh_data().unwrap();
        let material_id = mesh.materials[0];
        assert!(!source_ids.contains(&material_id));
        assert!(scene.material(material_id).shader_hook.is_none());
    }
    for &source in &source_ids {
        assert!(scene.material(source).shader_hook.is_some());
    }

    // Exploding strictly increases each part's distance from the assembly
    // center.
    let center = assembly_center(&scene);
    let assembled: Vec<f32> = parts
        .iter()
        .map(|&p| world_center(&scene, p).distance(center))
        .collect();
    exploder.apply(&mut scene, 1.0);
    for (i, &part) in parts.iter().enumerate() {
        let exploded = world_center(&scene, part).distance(center);
        assert!(
            exploded > assembled[i],
            "part {i} did not move away: {exploded} <= {}",
            assembled[i]
        );
    }
}

/// Scenario B: one mesh, no groups, every triangle centroid in one octant.
#[test]
fn failed_spatial_split_keeps_mesh_rigid() {
    let mut scene = Scene::new();
    let mut g = Geometry::new();
    // A large triangle plus a small one tucked near the min corner; both
    // centroids fall into the all-negative octant of the shared AABB.
    g.insert_attribute(
        POSITION,
        Attribute::new(
            3,
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.1, 0.1, 0.0, //
                0.2, 0.1, 0.0, //
                0.1, 0.2, 0.0,
            ],
        ),
    );
    g.index = Some(asmview_scene::IndexBuffer::from_indices(
        &[0, 1, 2, 3, 4, 5],
        6,
    ));
    let node = spawn_mesh(&mut scene, g, Vec3::new(4.0, 0.0, 0.0));

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 0.0);

    // Still one whole mesh.
    assert_eq!(scene.mesh_nodes(), vec![node]);
    assert_eq!(exploder.part_count(), 1);

    // It still explodes as one rigid unit (fallback axis, radius-scaled).
    let record = *exploder.record(node).unwrap();
    assert_eq!(record.direction, FALLBACK_AXIS);
    exploder.apply(&mut scene, 1.0);
    let moved = scene.node(node).transform.translation;
    assert!(moved.x > 4.0);
    assert_eq!(moved.y, 0.0);
}

/// Scenario C: two meshes at ±1 on X explode to ±(1 + 0.5 R).
#[test]
fn two_meshes_separate_along_x() {
    let mut scene = Scene::new();
    let a = spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(-1.0, 0.0, 0.0));
    let b = spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(1.0, 0.0, 0.0));

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 0.0);

    // Merged world AABB is x in [-1.5, 1.5], y in [-0.5, 0.5], z = 0.
    let radius = 0.5 * Vec3::new(3.0, 1.0, 0.0).length();

    exploder.apply(&mut scene, 0.5);
    let pos_a = scene.node(a).transform.translation;
    let pos_b = scene.node(b).transform.translation;
    assert!((pos_a.x - (-1.0 - 0.5 * radius)).abs() < 1e-5);
    assert!((pos_b.x - (1.0 + 0.5 * radius)).abs() < 1e-5);
    assert!(pos_a.y.abs() < 1e-6 && pos_b.y.abs() < 1e-6);
}

#[test]
fn apply_zero_restores_assembled_pose() {
    let mut scene = Scene::new();
    let a = spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(-2.0, 1.0, 0.0));
    let b = spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(3.0, -1.0, 2.0));
    let originals = [
        scene.node(a).transform.translation,
        scene.node(b).transform.translation,
    ];

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 1.0);
    exploder.apply(&mut scene, 0.37);
    exploder.apply(&mut scene, 0.0);

    assert_eq!(scene.node(a).transform.translation, originals[0]);
    assert_eq!(scene.node(b).transform.translation, originals[1]);
}

#[test]
fn preparation_runs_exactly_once() {
    let mut scene = Scene::new();
    let mut geometry = triangle_strip_geometry(4);
    geometry.groups = vec![
        Group {
            start: 0,
            count: 6,
            material_index: 0,
        },
        Group {
            start: 6,
            count: 6,
            material_index: 0,
        },
    ];
    let geometry = scene.add_geometry(geometry);
    scene.spawn(
        scene.root(),
        Node::new(NodeKind::Mesh(MeshData {
            geometry,
            materials: Vec::new(),
        })),
    );

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 0.2);
    let first = scene.mesh_nodes().len();
    exploder.apply(&mut scene, 0.9);
    exploder.apply(&mut scene, 0.0);
    let second = scene.mesh_nodes().len();

    assert_eq!(first, 2);
    assert_eq!(first, second);
    assert_eq!(exploder.part_count(), first);
}

#[test]
fn reset_restores_graph_and_disposes_indexes() {
    let mut scene = Scene::new();
    let mut geometry = triangle_strip_geometry(4);
    geometry.groups = vec![
        Group {
            start: 0,
            count: 6,
            material_index: 0,
        },
        Group {
            start: 6,
            count: 6,
            material_index: 0,
        },
    ];
    let geometry_id = scene.add_geometry(geometry);
    let hooked = scene.add_material(Material {
        shader_hook: Some(ShaderHook("patch".into())),
        ..Material::default()
    });
    let original = scene.spawn(
        scene.root(),
        Node::named(
            "body",
            NodeKind::Mesh(MeshData {
                geometry: geometry_id,
                materials: vec![hooked],
            }),
        ),
    );
    spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(5.0, 0.0, 0.0));

    let mut picking = RecordingPicking::default();
    index_scene_geometries(&scene, &mut picking);
    let preloaded = picking.built.len();
    assert_eq!(preloaded, 2);

    let before = scene.counts();
    let children_before = scene.node(scene.root()).children.clone();

    let mut exploder = Exploder::with_picking(picking);
    exploder.apply(&mut scene, 0.8);
    assert!(exploder.is_prepared());
    // Two part geometries were created and indexed.
    assert_eq!(exploder.picking().built.len(), preloaded + 2);
    assert!(scene.mesh_nodes().len() > 2);

    exploder.reset(&mut scene);

    assert!(!exploder.is_prepared());
    assert_eq!(scene.counts(), before);
    assert_eq!(scene.node(scene.root()).children, children_before);
    assert_eq!(scene.node(original).parent, Some(scene.root()));
    // Every created index was disposed; the preloaded ones were not.
    let created: Vec<_> = exploder.picking().built[preloaded..].to_vec();
    assert_eq!(exploder.picking().disposed, created);
    // Original material survived untouched.
    assert!(scene.material(hooked).shader_hook.is_some());

    // The session can prepare again from scratch.
    exploder.apply(&mut scene, 0.3);
    assert!(exploder.is_prepared());
    assert_eq!(exploder.part_count(), 3);
}

/// Splitting must not move geometry: parts inherit the source node's local
/// transform, so at amount 0 they render exactly where the source's groups
/// did, even under a rotated and scaled parent.
#[test]
fn split_parts_render_where_the_source_did() {
    let mut scene = Scene::new();
    let mut frame = Node::named("frame", NodeKind::Group);
    frame.transform = Transform {
        translation: Vec3::new(0.0, 10.0, 0.0),
        rotation: Quat::from_rotation_z(0.5),
        scale: Vec3::splat(2.0),
    };
    let frame = scene.spawn(scene.root(), frame);

    let mut geometry = triangle_strip_geometry(2);
    geometry.groups = vec![
        Group {
            start: 0,
            count: 3,
            material_index: 0,
        },
        Group {
            start: 3,
            count: 3,
            material_index: 0,
        },
    ];
    let geometry = scene.add_geometry(geometry);
    let mut body = Node::named(
        "body",
        NodeKind::Mesh(MeshData {
            geometry,
            materials: Vec::new(),
        }),
    );
    body.transform = Transform::from_translation(Vec3::new(100.0, 0.0, 0.0));
    let body = scene.spawn(frame, body);

    // Where each group's triangle renders before the split: its local AABB
    // center under the source's world matrix.
    let world = scene.world_matrix(body);
    let expected = [
        world.transform_point3(Vec3::new(0.3, 0.25, 0.0)),
        world.transform_point3(Vec3::new(1.3, 0.25, 0.0)),
    ];

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 0.0);

    let parts = scene.mesh_nodes();
    assert_eq!(parts.len(), 2);
    for (&part, &expected) in parts.iter().zip(&expected) {
        assert_eq!(scene.node(part).parent, Some(frame));
        let center = world_center(&scene, part);
        assert!(
            center.distance(expected) < 1e-3,
            "part rendered at {center}, expected near {expected}"
        );
    }
}

#[test]
fn instanced_mesh_is_never_partitioned_but_still_explodes() {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(small_triangle_geometry());
    let mut node = Node::named(
        "bolts",
        NodeKind::InstancedMesh(InstancedMeshData {
            mesh: MeshData {
                geometry,
                materials: Vec::new(),
            },
            instances: vec![
                Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
                Mat4::from_translation(Vec3::new(20.0, 0.0, 0.0)),
            ],
        }),
    );
    node.transform = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));
    let bolts = scene.spawn(scene.root(), node);
    let anchor = spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::new(0.0, -2.0, 0.0));

    let mut exploder = Exploder::new();
    exploder.apply(&mut scene, 1.0);

    assert_eq!(exploder.part_count(), 2);
    // The instance cluster sits far along +X, so the node's explode
    // direction follows the cluster's world extent, not the prototype
    // geometry under the node matrix.
    let direction = exploder.record(bolts).unwrap().direction;
    assert!(direction.x > 0.0 && direction.y > 0.0);
    let moved = scene.node(bolts).transform.translation;
    assert!(moved.x > 0.0 && moved.y > 2.0);
    // The anchor mesh moves the other way, as one rigid unit.
    assert!(scene.node(anchor).transform.translation.x < 0.0);
}

#[test]
fn capability_gates_before_any_partitioning() {
    let mut scene = Scene::new();
    spawn_mesh(&mut scene, small_triangle_geometry(), Vec3::ZERO);
    let capability = detect_capability(&scene);
    assert!(!capability.can_explode);
    assert_eq!(capability.reason, CapabilityReason::SinglePrimitive);
    // Detection never partitions.
    assert_eq!(scene.mesh_nodes().len(), 1);
}
