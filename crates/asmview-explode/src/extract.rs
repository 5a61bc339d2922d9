//! Attribute-complete sub-geometry extraction.
//!
//! Every partition strategy funnels through [`extract_sub_geometry`]: given a
//! slice of the source's index stream (a material group range, or the
//! triangle indices of one spatial bucket), it compacts the referenced
//! vertices into a fresh, exclusively-owned [`Geometry`].

use std::collections::HashMap;

use asmview_scene::{Attribute, Geometry, IndexBuffer};

use crate::error::ExtractError;

/// Which part of the source index stream to extract.
#[derive(Debug, Clone, Copy)]
pub enum IndexSelection<'a> {
    /// Contiguous range into the index stream (a material group).
    Range { start: usize, count: usize },
    /// Explicit source vertex indices, three per triangle (spatial split).
    Indices(&'a [u32]),
}

/// An extracted sub-geometry plus its compaction trace.
#[derive(Debug)]
pub struct Extraction {
    /// The new geometry: compacted attributes, right-width index buffer,
    /// recomputed bounds, no groups.
    pub geometry: Geometry,
    /// Source vertex index of each new vertex, in first-seen order.
    /// `source_vertices[new] == old`.
    pub source_vertices: Vec<u32>,
}

/// Extract the selected indices of `source` into a new geometry.
///
/// All attributes present on the source are carried over through the
/// compaction map at their original item size; attributes the source lacks
/// are never fabricated. The new index buffer is 16-bit when the compacted
/// vertex count allows it. Bounds are recomputed when the source has a
/// position attribute, otherwise left unset.
pub fn extract_sub_geometry(
    source: &Geometry,
    selection: IndexSelection<'_>,
) -> Result<Extraction, ExtractError> {
    let selected = resolve_selection(source, selection)?;
    if selected.is_empty() {
        return Err(ExtractError::EmptySelection);
    }

    // Compaction map, preserving first-seen order.
    let mut remap = HashMap::new();
    let mut source_vertices = Vec::new();
    let mut new_indices = Vec::with_capacity(selected.len());
    for &src in &selected {
        let next = source_vertices.len();
        #[allow(clippy::cast_possible_truncation)]
        let new = *remap.entry(src).or_insert_with(|| {
            source_vertices.push(src);
            next as u32
        });
        new_indices.push(new);
    }

    let mut geometry = Geometry::new();
    for (name, attribute) in source.attributes() {
        let mut data = Vec::with_capacity(source_vertices.len() * attribute.item_size);
        for &src in &source_vertices {
            data.extend_from_slice(attribute.item(src as usize));
        }
        geometry.insert_attribute(name, Attribute::new(attribute.item_size, data));
    }
    geometry.index = Some(IndexBuffer::from_indices(
        &new_indices,
        source_vertices.len(),
    ));
    geometry.compute_bounds();

    Ok(Extraction {
        geometry,
        source_vertices,
    })
}

fn resolve_selection(
    source: &Geometry,
    selection: IndexSelection<'_>,
) -> Result<Vec<u32>, ExtractError> {
    match selection {
        IndexSelection::Range { start, count } => {
            let len = source.index_count();
            if start + count > len {
                return Err(ExtractError::RangeOutOfBounds {
                    start,
                    end: start + count,
                    len,
                });
            }
            Ok((start..start + count).map(|i| source.index_at(i)).collect())
        }
        IndexSelection::Indices(indices) => {
            let vertex_count = source.vertex_count();
            for &value in indices {
                if value as usize >= vertex_count {
                    return Err(ExtractError::IndexOutOfBounds {
                        value,
                        vertex_count,
                    });
                }
            }
            Ok(indices.to_vec())
        }
    }
}
