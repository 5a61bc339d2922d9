//! Headless explode walkthrough on a procedural assembly.
//!
//! Builds a small three-piece scene, runs capability detection, prepares the
//! partition and sweeps the explode amount, logging part motion.
//!
//! Run: `cargo run -p asmview-explode --features demo-tools --bin explode_demo`

use asmview_explode::{Exploder, detect_capability};
use asmview_scene::{
    Attribute, Geometry, Group, IndexBuffer, Material, MeshData, Node, NodeKind, Scene, Transform,
    attribute_names::POSITION,
};
use glam::{Vec3, Vec4};

fn box_geometry(half: f32) -> Geometry {
    let mut g = Geometry::new();
    let mut positions = Vec::new();
    for &z in &[-half, half] {
        for &y in &[-half, half] {
            for &x in &[-half, half] {
                positions.extend_from_slice(&[x, y, z]);
            }
        }
    }
    #[rustfmt::skip]
    let indices: [u32; 36] = [
        0, 1, 2, 2, 1, 3, // -z
        4, 6, 5, 5, 6, 7, // +z
        0, 4, 1, 1, 4, 5, // -y
        2, 3, 6, 6, 3, 7, // +y
        0, 2, 4, 4, 2, 6, // -x
        1, 5, 3, 3, 5, 7, // +x
    ];
    g.insert_attribute(POSITION, Attribute::new(3, positions));
    g.index = Some(IndexBuffer::from_indices(&indices, 8));
    g
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut scene = Scene::new();

    // A two-material housing plus a satellite block on each side.
    let shell = scene.add_material(Material::colored("shell", Vec4::new(0.7, 0.7, 0.75, 1.0)));
    let core = scene.add_material(Material::colored("core", Vec4::new(0.9, 0.4, 0.1, 1.0)));
    let mut housing = box_geometry(1.0);
    housing.groups = vec![
        Group {
            start: 0,
            count: 18,
            material_index: 0,
        },
        Group {
            start: 18,
            count: 18,
            material_index: 1,
        },
    ];
    let housing = scene.add_geometry(housing);
    scene.spawn(
        scene.root(),
        Node::named(
            "housing",
            NodeKind::Mesh(MeshData {
                geometry: housing,
                materials: vec![shell, core],
            }),
        ),
    );
    for (name, x) in [("left-cap", -2.5f32), ("right-cap", 2.5)] {
        let geometry = scene.add_geometry(box_geometry(0.5));
        let mut node = Node::named(
            name,
            NodeKind::Mesh(MeshData {
                geometry,
                materials: vec![shell],
            }),
        );
        node.transform = Transform::from_translation(Vec3::new(x, 0.0, 0.0));
        scene.spawn(scene.root(), node);
    }

    let capability = detect_capability(&scene);
    tracing::info!(?capability, "capability");
    if !capability.can_explode {
        return;
    }

    let mut exploder = Exploder::new();
    for step in 0u8..=4 {
        let amount = f32::from(step) / 4.0;
        exploder.apply(&mut scene, amount);
        for id in scene.mesh_nodes() {
            let node = scene.node(id);
            tracing::info!(
                amount,
                part = node.name.as_deref().unwrap_or("?"),
                position = ?node.transform.translation,
            );
        }
    }
    exploder.apply(&mut scene, 0.0);
    tracing::info!(parts = exploder.part_count(), "swept and reassembled");
}
