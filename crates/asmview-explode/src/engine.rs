//! Explode state machine and per-part offset computation.
//!
//! One [`Exploder`] drives one loaded asset. The first [`Exploder::apply`]
//! call performs the one-time Unprepared→Prepared transition: partitionable
//! meshes are replaced by their parts and the assembly's world bounds are
//! captured. Every call, including the first, then repositions each part
//! along its cached radial direction - an O(parts) update.

use std::collections::HashMap;

use asmview_scene::{Aabb, GeometryId, NodeId, NodeKind, Scene, SceneCounts, attribute_names};
use glam::{Mat4, Vec3};

use crate::material::MaterialCache;
use crate::partition::partition_node;
use crate::picking::{NoopPickingAccel, PickingAccel};

/// Axis used when a part's center coincides with the assembly center and no
/// meaningful direction exists. Stored exactly, never normalized.
pub const FALLBACK_AXIS: Vec3 = Vec3::X;

/// Squared direction length below which the fallback axis kicks in.
const DIRECTION_EPSILON_SQ: f32 = 1e-12;

/// Per-part offset cache, written once when the part is first positioned.
#[derive(Debug, Clone, Copy)]
pub struct ExplodeRecord {
    /// The node's translation before any explode offset was applied.
    pub base_position: Vec3,
    /// Unit direction away from the assembly center, in the node's parent's
    /// local space; exactly [`FALLBACK_AXIS`] when degenerate.
    pub direction: Vec3,
}

/// A mesh node swapped out for its parts during preparation. Originals are
/// detached, never destroyed, so reset can restore them.
struct ReplacedMesh {
    parent: NodeId,
    child_index: usize,
    original: NodeId,
    parts: Vec<NodeId>,
}

struct Prepared {
    /// Assembly world-space center, captured once post-partition.
    center: Vec3,
    /// Half the world AABB diagonal; scales the user amount to a distance.
    radius: f32,
    records: HashMap<NodeId, ExplodeRecord>,
    replaced: Vec<ReplacedMesh>,
    created_geometries: Vec<GeometryId>,
    watermark: SceneCounts,
    part_count: usize,
}

enum State {
    Unprepared,
    Prepared(Prepared),
}

/// Explode session for one loaded asset.
///
/// `P` is the external picking-acceleration collaborator; it gets a
/// `build_index` right after each part geometry is created and a
/// `dispose_index` when the session is reset.
pub struct Exploder<P: PickingAccel = NoopPickingAccel> {
    state: State,
    materials: MaterialCache,
    picking: P,
}

impl Default for Exploder<NoopPickingAccel> {
    fn default() -> Self {
        Self::new()
    }
}

impl Exploder<NoopPickingAccel> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_picking(NoopPickingAccel)
    }
}

impl<P: PickingAccel> Exploder<P> {
    pub fn with_picking(picking: P) -> Self {
        Self {
            state: State::Unprepared,
            materials: MaterialCache::new(),
            picking,
        }
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        matches!(self.state, State::Prepared(_))
    }

    /// Number of mesh parts under the root after preparation (0 while
    /// unprepared). Stable across repeated `apply` calls.
    #[must_use]
    pub fn part_count(&self) -> usize {
        match &self.state {
            State::Unprepared => 0,
            State::Prepared(prepared) => prepared.part_count,
        }
    }

    #[must_use]
    pub fn picking(&self) -> &P {
        &self.picking
    }

    /// Cached record for a part, once it has been positioned.
    #[must_use]
    pub fn record(&self, node: NodeId) -> Option<&ExplodeRecord> {
        match &self.state {
            State::Unprepared => None,
            State::Prepared(prepared) => prepared.records.get(&node),
        }
    }

    /// Position every part for the given explode `amount` (0 = assembled,
    /// 1 = fully separated). The first call partitions the scene; later
    /// calls only rewrite translations from the cached records, so
    /// `apply(scene, 0.0)` restores the assembled pose exactly.
    pub fn apply(&mut self, scene: &mut Scene, amount: f32) {
        if matches!(self.state, State::Unprepared) {
            self.prepare(scene);
        }
        let State::Prepared(prepared) = &mut self.state else {
            unreachable!("prepare always transitions to Prepared");
        };

        let distance = amount * prepared.radius;
        for node_id in scene.mesh_nodes() {
            let record = *prepared
                .records
                .entry(node_id)
                .or_insert_with(|| compute_record(scene, node_id, prepared.center));
            scene.node_mut(node_id).transform.translation =
                record.base_position + record.direction * distance;
        }
    }

    /// Tear the session down: restore the original un-partitioned graph and
    /// assembled positions, dispose part picking indexes, and release every
    /// engine-created geometry and converted material. The exploder can then
    /// prepare a new (or the same) asset from scratch.
    pub fn reset(&mut self, scene: &mut Scene) {
        let state = std::mem::replace(&mut self.state, State::Unprepared);
        let State::Prepared(prepared) = state else {
            return;
        };

        // Undo replacements newest-first so recorded child indices line up.
        for replaced in prepared.replaced.iter().rev() {
            for &part in &replaced.parts {
                scene.detach(replaced.parent, part);
            }
            scene.attach_at(replaced.parent, replaced.child_index, replaced.original);
        }

        // Unsplit meshes were moved in place; put them back.
        for (&node_id, record) in &prepared.records {
            if node_id.index() < prepared.watermark.nodes {
                scene.node_mut(node_id).transform.translation = record.base_position;
            }
        }

        for &geometry in &prepared.created_geometries {
            self.picking.dispose_index(geometry);
        }
        scene.truncate(prepared.watermark);
        self.materials.clear();
        tracing::info!(
            released_geometries = prepared.created_geometries.len(),
            "explode session reset"
        );
    }

    /// One-time partition pass plus assembly-bounds capture.
    fn prepare(&mut self, scene: &mut Scene) {
        let watermark = scene.counts();
        let mut replaced = Vec::new();
        let mut created_geometries = Vec::new();

        for node_id in scene.mesh_nodes() {
            let Some(parent) = scene.node(node_id).parent else {
                continue;
            };
            let Some(parts) = partition_node(scene, node_id, &mut self.materials) else {
                continue;
            };
            let child_index = scene
                .detach(parent, node_id)
                .expect("mesh node is a child of its parent");

            let mut part_ids = Vec::with_capacity(parts.len());
            for (offset, part) in parts.into_iter().enumerate() {
                self.picking
                    .build_index(part.geometry, scene.geometry(part.geometry));
                created_geometries.push(part.geometry);
                part_ids.push(scene.spawn_at(parent, child_index + offset, part.node));
            }
            replaced.push(ReplacedMesh {
                parent,
                child_index,
                original: node_id,
                parts: part_ids,
            });
        }

        // Bounds are needed for every surviving mesh's center; fill in any
        // the loader left uncomputed.
        let mesh_ids = scene.mesh_nodes();
        for &node_id in &mesh_ids {
            if let Some(mesh) = scene.node(node_id).kind.mesh_data() {
                let geometry_id = mesh.geometry;
                let geometry = scene.geometry(geometry_id);
                if geometry.bounds.is_none()
                    && geometry.has_attribute(attribute_names::POSITION)
                {
                    scene.geometry_mut(geometry_id).compute_bounds();
                }
            }
        }

        let (center, radius) = assembly_bounds(scene, &mesh_ids);
        tracing::info!(
            meshes = mesh_ids.len(),
            split = replaced.len(),
            radius,
            "explode preparation complete"
        );

        self.state = State::Prepared(Prepared {
            center,
            radius,
            records: HashMap::new(),
            replaced,
            created_geometries,
            watermark,
            part_count: mesh_ids.len(),
        });
    }
}

/// World-space center and explode radius (half the AABB diagonal) of all
/// meshes under the root.
fn assembly_bounds(scene: &Scene, mesh_ids: &[NodeId]) -> (Vec3, f32) {
    let mut merged: Option<Aabb> = None;
    for &node_id in mesh_ids {
        let Some(aabb) = mesh_world_aabb(scene, node_id) else {
            continue;
        };
        merged = Some(match merged {
            Some(total) => total.union(&aabb),
            None => aabb,
        });
    }
    merged.map_or((Vec3::ZERO, 0.0), |aabb| {
        (aabb.center(), 0.5 * aabb.diagonal().length())
    })
}

fn mesh_world_aabb(scene: &Scene, node_id: NodeId) -> Option<Aabb> {
    let node = scene.node(node_id);
    let mesh = node.kind.mesh_data()?;
    let bounds = scene.geometry(mesh.geometry).bounds?;
    let world = scene.world_matrix(node_id);

    // Instanced meshes span the union of their instances, not just the
    // prototype under the node matrix.
    if let NodeKind::InstancedMesh(data) = &node.kind {
        let mut merged: Option<Aabb> = None;
        for &instance in &data.instances {
            let aabb = bounds.aabb.transformed(world * instance);
            merged = Some(merged.map_or(aabb, |total| total.union(&aabb)));
        }
        if let Some(merged) = merged {
            return Some(merged);
        }
    }
    Some(bounds.aabb.transformed(world))
}

/// Direction and base position for one part, both expressed in the part's
/// parent's local space so offsets stay stable under parent transforms.
fn compute_record(scene: &Scene, node_id: NodeId, assembly_center: Vec3) -> ExplodeRecord {
    let world_center = mesh_world_aabb(scene, node_id).map_or_else(
        || scene.world_matrix(node_id).transform_point3(Vec3::ZERO),
        |aabb| aabb.center(),
    );

    let parent_inverse = scene
        .node(node_id)
        .parent
        .map_or(Mat4::IDENTITY, |parent| {
            scene.world_matrix(parent).inverse()
        });
    let local_center = parent_inverse.transform_point3(world_center);
    let local_assembly = parent_inverse.transform_point3(assembly_center);

    let offset = local_center - local_assembly;
    let direction = if offset.length_squared() < DIRECTION_EPSILON_SQ {
        FALLBACK_AXIS
    } else {
        offset.normalize()
    };

    ExplodeRecord {
        base_position: scene.node(node_id).transform.translation,
        direction,
    }
}
