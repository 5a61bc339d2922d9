//! The scene arena and its stable handles.

use glam::Mat4;

use crate::geometry::Geometry;
use crate::material::Material;
use crate::node::{Node, NodeKind};
use crate::skeleton::Skeleton;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[allow(clippy::cast_possible_truncation)]
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

arena_id!(
    /// Stable handle to a node in one [`Scene`]'s arena.
    NodeId
);
arena_id!(
    /// Stable handle to a geometry.
    GeometryId
);
arena_id!(
    /// Stable handle to a material. Conversion caches key on this, never on
    /// reference identity.
    MaterialId
);
arena_id!(
    /// Stable handle to a shared skeleton.
    SkeletonId
);

/// Arena sizes at a point in time; a watermark for append-only sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCounts {
    pub nodes: usize,
    pub geometries: usize,
    pub materials: usize,
    pub skeletons: usize,
}

/// A loaded asset: arenas of nodes, geometries, materials and skeletons,
/// plus the root node of the transform hierarchy.
///
/// Handles are only meaningful for the scene that issued them; looking up a
/// foreign or truncated handle panics.
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    skeletons: Vec<Skeleton>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with a bare group node as root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::named("root", NodeKind::Group)],
            geometries: Vec::new(),
            materials: Vec::new(),
            skeletons: Vec::new(),
            root: NodeId(0),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ---- arena access -------------------------------------------------

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.index()]
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> &mut Geometry {
        &mut self.geometries[id.index()]
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    #[must_use]
    pub fn skeleton(&self, id: SkeletonId) -> &Skeleton {
        &self.skeletons[id.index()]
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId::from_index(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::from_index(self.materials.len() - 1)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonId {
        self.skeletons.push(skeleton);
        SkeletonId::from_index(self.skeletons.len() - 1)
    }

    // ---- hierarchy ----------------------------------------------------

    /// Insert `node` into the arena and attach it as the last child of
    /// `parent`.
    pub fn spawn(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.nodes.push(node);
        let id = NodeId::from_index(self.nodes.len() - 1);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Insert `node` into the arena and attach it under `parent` at
    /// child-list position `index`.
    pub fn spawn_at(&mut self, parent: NodeId, index: usize, node: Node) -> NodeId {
        self.nodes.push(node);
        let id = NodeId::from_index(self.nodes.len() - 1);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(index, id);
        id
    }

    /// Detach `child` from `parent`, returning the child-list position it
    /// occupied. The node stays in the arena and can be re-attached.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let children = &mut self.nodes[parent.index()].children;
        let position = children.iter().position(|&c| c == child)?;
        children.remove(position);
        self.nodes[child.index()].parent = None;
        Some(position)
    }

    /// Attach an existing arena node under `parent` at child-list position
    /// `index`.
    pub fn attach_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(index, child);
    }

    /// Product of local matrices from the root down to `id`.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Pre-order traversal starting at (and including) `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            // Reverse keeps pre-order left-to-right.
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    /// Every mesh-like node currently under the root.
    #[must_use]
    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.node(id).kind.is_mesh())
            .collect()
    }

    // ---- session watermarks -------------------------------------------

    /// Current arena sizes, recorded before an append-only session.
    #[must_use]
    pub fn counts(&self) -> SceneCounts {
        SceneCounts {
            nodes: self.nodes.len(),
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            skeletons: self.skeletons.len(),
        }
    }

    /// Release everything appended after `counts` was taken. The caller must
    /// first remove any hierarchy references to the released nodes.
    pub fn truncate(&mut self, counts: SceneCounts) {
        self.nodes.truncate(counts.nodes);
        self.geometries.truncate(counts.geometries);
        self.materials.truncate(counts.materials);
        self.skeletons.truncate(counts.skeletons);
    }
}
