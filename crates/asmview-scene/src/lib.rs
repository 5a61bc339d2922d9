//! In-memory scene graph model for the asmview exploded-assembly viewer.
//!
//! This crate is pure data: a loader decodes an asset into a [`Scene`] and the
//! explode engine (the `asmview-explode` crate) mutates node transforms and
//! swaps mesh parts in and out. Nothing here draws, loads or networks.
//!
//! # Design principles
//!
//! - **Arena ownership**: one [`Scene`] value owns every node, geometry,
//!   material and skeleton; everything else holds copyable ids.
//! - **Closed node taxonomy**: [`NodeKind`] enumerates every node kind the
//!   engine has to reason about - no downcasting, no metadata bags.
//! - **Append-only mutation**: engine-created objects are appended to the
//!   arenas and released by truncating back to a recorded watermark.

mod bounds;
mod error;
mod geometry;
mod material;
mod node;
mod scene;
mod skeleton;

pub use bounds::{Aabb, BoundingSphere, Bounds};
pub use error::SceneError;
pub use geometry::{Attribute, Geometry, Group, IndexBuffer, attribute_names};
pub use material::{Material, ShaderHook, ShadingModel, Side, TextureRef};
pub use node::{InstancedMeshData, MeshData, Node, NodeKind, SkinnedMeshData, Transform};
pub use scene::{GeometryId, MaterialId, NodeId, Scene, SceneCounts, SkeletonId};
pub use skeleton::Skeleton;
