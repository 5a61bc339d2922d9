//! Shared bone hierarchies for skinned meshes.

use crate::scene::NodeId;

/// A bone hierarchy shared by every skinned mesh (and every split part)
/// deriving from one source. Read-only for the explode engine.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub name: Option<String>,
    /// Bone nodes, in the order the skin attributes index them.
    pub bones: Vec<NodeId>,
}
