//! Vertex/index buffer data of a mesh.
//!
//! A [`Geometry`] is a set of same-vertex-count attribute buffers keyed by
//! name, an optional index buffer, and material [`Group`] records partitioning
//! the index stream by material slot.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::bounds::{Aabb, BoundingSphere, Bounds};
use crate::error::SceneError;

/// Well-known attribute names. Geometries may carry arbitrary extra
/// attributes; the engine only ever interprets these.
pub mod attribute_names {
    /// 3 floats per vertex.
    pub const POSITION: &str = "position";
    /// 3 floats per vertex.
    pub const NORMAL: &str = "normal";
    /// 2 floats per vertex.
    pub const UV: &str = "uv";
    /// 4 bone indices per vertex (stored as float lanes, copied verbatim).
    pub const JOINTS: &str = "joints";
    /// 4 bone weights per vertex.
    pub const WEIGHTS: &str = "weights";
}

/// One named vertex attribute buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Floats per vertex.
    pub item_size: usize,
    /// `item_size * vertex_count` floats.
    pub data: Vec<f32>,
}

impl Attribute {
    pub fn new(item_size: usize, data: Vec<f32>) -> Self {
        debug_assert!(item_size > 0);
        Self { item_size, data }
    }

    /// Number of vertices in this buffer.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// The `item_size` floats of vertex `i`.
    #[must_use]
    pub fn item(&self, i: usize) -> &[f32] {
        &self.data[i * self.item_size..(i + 1) * self.item_size]
    }
}

/// Triangle index buffer; width is chosen from the vertex count so part
/// buffers stay proportional to part size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Largest vertex count a 16-bit buffer can address.
    pub const U16_VERTEX_LIMIT: usize = 65535;

    /// Build a buffer from widened indices, choosing 16-bit storage when the
    /// addressed vertex count permits it.
    #[must_use]
    pub fn from_indices(indices: &[u32], vertex_count: usize) -> Self {
        if vertex_count <= Self::U16_VERTEX_LIMIT {
            #[allow(clippy::cast_possible_truncation)]
            Self::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            Self::U32(indices.to_vec())
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index value at position `i`, widened to u32.
    #[must_use]
    pub fn get(&self, i: usize) -> u32 {
        match self {
            Self::U16(v) => u32::from(v[i]),
            Self::U32(v) => v[i],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

/// A contiguous index range bound to one material slot.
///
/// Overlapping groups are permitted when authored that way; they are never
/// deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    /// First position in the index stream.
    pub start: usize,
    /// Number of index entries.
    pub count: usize,
    /// Slot into the owning mesh's material list.
    pub material_index: usize,
}

/// Geometry buffer data: named attributes, optional indices, material groups
/// and cached bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    attributes: BTreeMap<String, Attribute>,
    pub index: Option<IndexBuffer>,
    pub groups: Vec<Group>,
    pub bounds: Option<Bounds>,
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_attribute(&mut self, name: impl Into<String>, attribute: Attribute) {
        self.attributes.insert(name.into(), attribute);
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterate attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Vertex count shared by every attribute buffer (0 when there are none).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attributes.values().next().map_or(0, Attribute::count)
    }

    /// Length of the index stream: the index buffer if present, else the
    /// implicit sequential indexing over the vertices.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.index
            .as_ref()
            .map_or_else(|| self.vertex_count(), IndexBuffer::len)
    }

    /// Index value at stream position `i` (implicit identity when
    /// non-indexed).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index_at(&self, i: usize) -> u32 {
        self.index.as_ref().map_or(i as u32, |index| index.get(i))
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }

    /// Vertex indices of triangle `t`.
    #[must_use]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [
            self.index_at(t * 3),
            self.index_at(t * 3 + 1),
            self.index_at(t * 3 + 2),
        ]
    }

    /// Position of vertex `i` as a vector. The caller must have checked that
    /// a position attribute exists.
    #[must_use]
    pub fn position(&self, i: usize) -> Vec3 {
        let attr = self
            .attribute(attribute_names::POSITION)
            .expect("geometry has no position attribute");
        let p = attr.item(i);
        Vec3::new(p[0], p[1], p[2])
    }

    /// Recompute the AABB and bounding sphere from the position attribute.
    /// Leaves bounds untouched (and returns `None`) when positions are
    /// absent.
    pub fn compute_bounds(&mut self) -> Option<Bounds> {
        let positions = self.attribute(attribute_names::POSITION)?;
        let count = positions.count();
        let aabb = Aabb::from_points((0..count).map(|i| {
            let p = positions.item(i);
            Vec3::new(p[0], p[1], p[2])
        }));
        let center = aabb.center();
        let mut radius_sq = 0.0f32;
        for i in 0..count {
            let p = positions.item(i);
            radius_sq = radius_sq.max(Vec3::new(p[0], p[1], p[2]).distance_squared(center));
        }
        let bounds = Bounds {
            aabb,
            sphere: BoundingSphere {
                center,
                radius: radius_sq.sqrt(),
            },
        };
        self.bounds = Some(bounds);
        Some(bounds)
    }

    /// Check the structural invariants the engine assumes: equal vertex
    /// counts across attributes, item-aligned buffers, indices in range and
    /// groups within the index stream.
    pub fn validate(&self) -> Result<(), SceneError> {
        let vertex_count = self.vertex_count();
        for (name, attribute) in &self.attributes {
            if attribute.data.len() % attribute.item_size != 0 {
                return Err(SceneError::AttributeNotItemAligned {
                    name: name.clone(),
                    len: attribute.data.len(),
                    item_size: attribute.item_size,
                });
            }
            if attribute.count() != vertex_count {
                return Err(SceneError::AttributeLengthMismatch {
                    name: name.clone(),
                    expected: vertex_count,
                    actual: attribute.count(),
                });
            }
        }
        if let Some(index) = &self.index {
            for value in index.iter() {
                if value as usize >= vertex_count {
                    return Err(SceneError::IndexOutOfRange {
                        value,
                        vertex_count,
                    });
                }
            }
        }
        let index_count = self.index_count();
        for group in &self.groups {
            if group.start + group.count > index_count {
                return Err(SceneError::GroupOutOfRange {
                    start: group.start,
                    start_plus_count: group.start + group.count,
                    index_count,
                });
            }
        }
        Ok(())
    }
}
