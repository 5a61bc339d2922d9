//! Extraction errors.
//!
//! Everything else the engine handles (missing position attributes,
//! degenerate directions, failed spatial splits, bad material indices) is a
//! degraded-capability path and is logged, not returned.

/// Errors from [`crate::extract_sub_geometry`].
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("index selection is empty")]
    EmptySelection,

    #[error("range [{start}..{end}) exceeds index stream of length {len}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("selected index {value} out of range for {vertex_count} vertices")]
    IndexOutOfBounds { value: u32, vertex_count: usize },
}
