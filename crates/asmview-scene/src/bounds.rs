//! Axis-aligned boxes and bounding spheres.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box enclosing a set of points. Empty input yields a degenerate box at
    /// the origin.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        };
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        aabb
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Box enclosing this box's eight corners after transformation.
    #[must_use]
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        Self::from_points(corners.iter().map(|&c| matrix.transform_point3(c)))
    }
}

/// Bounding sphere, center plus radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Cached bounds of one geometry, recomputed whenever the vertex data is
/// rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub aabb: Aabb,
    pub sphere: BoundingSphere,
}
