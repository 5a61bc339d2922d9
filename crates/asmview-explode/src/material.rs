//! Material safety conversion.
//!
//! Split parts never reuse a source material slot directly: asset-authored
//! materials may carry shader injection hooks referencing geometry state
//! that partitioning invalidates. The converter produces hook-free standard
//! materials, memoized per source handle so every part split from one source
//! shares one converted instance.

use std::collections::HashMap;

use asmview_scene::{Material, MaterialId, Scene, ShadingModel};

/// Conservative defaults when approximating a non-standard source.
const DEFAULT_METALNESS: f32 = 0.0;
const DEFAULT_ROUGHNESS: f32 = 0.8;

/// Per-session memo of source handle → converted handle.
#[derive(Debug, Default)]
pub struct MaterialCache {
    converted: HashMap<MaterialId, MaterialId>,
}

impl MaterialCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render-safe material for `source`, converting on first request.
    ///
    /// The source material is never mutated; the converted copy is appended
    /// to the scene's material arena and released when the session's
    /// watermark truncation runs.
    pub fn safe_material(&mut self, scene: &mut Scene, source: MaterialId) -> MaterialId {
        if let Some(&converted) = self.converted.get(&source) {
            return converted;
        }

        let src = scene.material(source).clone();
        let safe = match src.model {
            ShadingModel::Standard => Material {
                shader_hook: None,
                ..src
            },
            ShadingModel::Basic | ShadingModel::Phong => Material {
                name: src.name,
                base_color: src.base_color,
                texture: src.texture,
                side: src.side,
                metalness: DEFAULT_METALNESS,
                roughness: DEFAULT_ROUGHNESS,
                model: ShadingModel::Standard,
                shader_hook: None,
            },
        };

        let converted = scene.add_material(safe);
        self.converted.insert(source, converted);
        converted
    }

    /// Forget all conversions (the converted materials themselves are
    /// released by the scene watermark truncation).
    pub fn clear(&mut self) {
        self.converted.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.converted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty()
    }
}
