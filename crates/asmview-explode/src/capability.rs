//! Decides whether explode is meaningful for a loaded scene.

use asmview_scene::Scene;

/// Why a scene cannot explode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityReason {
    /// Explode is possible.
    None,
    /// The asset is a single rigid primitive with nothing to separate.
    SinglePrimitive,
    /// The asset is a single skinned primitive; separating it would tear the
    /// skin.
    SkinnedSinglePrimitive,
}

/// Result of [`detect_capability`]; gates the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub can_explode: bool,
    pub reason: CapabilityReason,
}

/// Cheap read-only traversal, run once per loaded asset. A scene explodes
/// when it has more than one mesh, more than one material group in total, or
/// a skinned mesh with multiple groups.
#[must_use]
pub fn detect_capability(scene: &Scene) -> Capability {
    let mut mesh_count = 0usize;
    let mut group_sum = 0usize;
    let mut skinned_multi_group = false;
    let mut any_skinned = false;

    for id in scene.mesh_nodes() {
        let node = scene.node(id);
        let Some(mesh) = node.kind.mesh_data() else {
            continue;
        };
        mesh_count += 1;
        // A geometry with no authored groups is one primitive.
        let groups = scene.geometry(mesh.geometry).groups.len().max(1);
        group_sum += groups;
        if node.kind.is_skinned() {
            any_skinned = true;
            if groups > 1 {
                skinned_multi_group = true;
            }
        }
    }

    let can_explode = mesh_count > 1 || group_sum > 1 || skinned_multi_group;
    let reason = if can_explode {
        CapabilityReason::None
    } else if any_skinned {
        CapabilityReason::SkinnedSinglePrimitive
    } else {
        CapabilityReason::SinglePrimitive
    };
    tracing::debug!(mesh_count, group_sum, can_explode, "capability detected");

    Capability {
        can_explode,
        reason,
    }
}
