//! Structural validation errors.

/// Errors reported by [`crate::Geometry::validate`].
///
/// These cover the structural invariants the explode engine assumes were
/// checked at load time. Degraded-capability situations (missing optional
/// attributes, unsplittable meshes) are deliberately not errors.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("attribute `{name}` has {actual} vertices, expected {expected}")]
    AttributeLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("attribute `{name}` length {len} is not a multiple of item size {item_size}")]
    AttributeNotItemAligned {
        name: String,
        len: usize,
        item_size: usize,
    },

    #[error("index value {value} out of range for {vertex_count} vertices")]
    IndexOutOfRange { value: u32, vertex_count: usize },

    #[error("group [{start}..{start_plus_count}) exceeds index count {index_count}")]
    GroupOutOfRange {
        start: usize,
        start_plus_count: usize,
        index_count: usize,
    },
}
