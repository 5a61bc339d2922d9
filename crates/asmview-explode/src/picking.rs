//! Seam to the external picking-acceleration collaborator.
//!
//! The engine treats the per-geometry ray-intersection index as an opaque
//! resource with exactly two lifecycle hooks: build after a geometry is
//! created, dispose when it is discarded.

use asmview_scene::{Geometry, GeometryId, Scene};

/// Collaborator that owns bounding-volume indexes for geometries.
pub trait PickingAccel {
    /// Called right after `id`'s geometry data is created.
    fn build_index(&mut self, id: GeometryId, geometry: &Geometry);

    /// Called when `id` is discarded; the collaborator must drop whatever
    /// `build_index` allocated for it.
    fn dispose_index(&mut self, id: GeometryId);
}

/// Default collaborator for hosts without picking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPickingAccel;

impl PickingAccel for NoopPickingAccel {
    fn build_index(&mut self, _id: GeometryId, _geometry: &Geometry) {}

    fn dispose_index(&mut self, _id: GeometryId) {}
}

/// Build indexes for every geometry a mesh currently references; the loader
/// glue calls this once per loaded asset so the original geometries are
/// pickable before any explode activation.
pub fn index_scene_geometries<P: PickingAccel>(scene: &Scene, picking: &mut P) {
    for node_id in scene.mesh_nodes() {
        if let Some(mesh) = scene.node(node_id).kind.mesh_data() {
            picking.build_index(mesh.geometry, scene.geometry(mesh.geometry));
        }
    }
}
