//! Scene graph nodes.

use glam::{Mat4, Quat, Vec3};

use crate::scene::{GeometryId, MaterialId, NodeId, SkeletonId};

/// Local TRS transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Geometry plus its material list, indexed by group `material_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshData {
    pub geometry: GeometryId,
    pub materials: Vec<MaterialId>,
}

/// A mesh deformed by a shared skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMeshData {
    pub mesh: MeshData,
    /// Shared, never owned; all parts split from one source reference the
    /// same skeleton.
    pub skeleton: SkeletonId,
    pub bind_matrix: Mat4,
}

/// A mesh rendered many times with per-instance transforms. Never
/// partitioned.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancedMeshData {
    pub mesh: MeshData,
    pub instances: Vec<Mat4>,
}

/// Closed taxonomy of node kinds the engine reasons about.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    /// Pure transform node.
    #[default]
    Group,
    Mesh(MeshData),
    SkinnedMesh(SkinnedMeshData),
    InstancedMesh(InstancedMeshData),
}

impl NodeKind {
    /// The renderable payload, for any mesh-like kind.
    #[must_use]
    pub fn mesh_data(&self) -> Option<&MeshData> {
        match self {
            Self::Group => None,
            Self::Mesh(data) => Some(data),
            Self::SkinnedMesh(data) => Some(&data.mesh),
            Self::InstancedMesh(data) => Some(&data.mesh),
        }
    }

    #[must_use]
    pub fn is_mesh(&self) -> bool {
        self.mesh_data().is_some()
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        matches!(self, Self::SkinnedMesh(_))
    }
}

/// One node of the scene graph. Children are exclusively owned through the
/// scene's node arena; `parent`/`children` are kept consistent by the
/// [`crate::Scene`] attach/detach operations.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub visible: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Default for Node {
    fn default() -> Self {
        Self::new(NodeKind::Group)
    }
}

impl Node {
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    #[must_use]
    pub fn named(name: &str, kind: NodeKind) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::new(kind)
        }
    }
}
