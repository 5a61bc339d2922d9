//! Appearance descriptors.

use glam::Vec4;

/// Which triangle faces get rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Shading model the material was authored with. The explode engine only
/// materializes `Standard` parts; other models are approximated on
/// conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingModel {
    #[default]
    Standard,
    Basic,
    Phong,
}

/// Opaque reference to a texture owned by the renderer; copied, never
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef(pub String);

/// Opaque id of asset-specific shader injection code attached to a material.
/// Split parts must never carry one: injected code may reference geometry
/// state the split invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderHook(pub String);

/// An appearance descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color: Vec4,
    pub texture: Option<TextureRef>,
    pub metalness: f32,
    pub roughness: f32,
    pub side: Side,
    pub model: ShadingModel,
    pub shader_hook: Option<ShaderHook>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: Vec4::ONE,
            texture: None,
            metalness: 0.0,
            roughness: 1.0,
            side: Side::Front,
            model: ShadingModel::Standard,
            shader_hook: None,
        }
    }
}

impl Material {
    /// Plain colored standard material, handy for loaders and tests.
    #[must_use]
    pub fn colored(name: &str, base_color: Vec4) -> Self {
        Self {
            name: Some(name.to_owned()),
            base_color,
            ..Self::default()
        }
    }
}
