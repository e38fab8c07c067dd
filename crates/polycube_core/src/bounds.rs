//! Axis-aligned bounds of rendered pieces and the excess-volume metric.

use bevy::math::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box around a single cube of edge `size` centered at `center`.
    pub fn from_cube(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing both.
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }
}

/// Bounds of a set of cube centers, `None` when empty.
pub fn cube_bounds<I>(centers: I, cube_size: f32) -> Option<Aabb>
where
    I: IntoIterator<Item = Vec3>,
{
    centers
        .into_iter()
        .map(|c| Aabb::from_cube(c, cube_size))
        .reduce(Aabb::union)
}

/// AABB volume of a set of cube centers; zero for an empty set.
pub fn bounding_volume<I>(centers: I, cube_size: f32) -> f32
where
    I: IntoIterator<Item = Vec3>,
{
    cube_bounds(centers, cube_size).map_or(0.0, |b| b.volume())
}

/// Normalized excess of `current` over `tight`, never negative.
///
/// `tight` is clamped away from zero so degenerate input cannot divide by zero.
pub fn excess_ratio(current: f32, tight: f32) -> f32 {
    let tight = tight.max(1e-6);
    ((current - tight) / tight).max(0.0)
}
