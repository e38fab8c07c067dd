//! Contact detection between two polycube pieces.
//!
//! Pieces are unions of axis-aligned unit cubes, so every cube pair is tested
//! directly with a per-axis overlap test. Each touching pair contributes a
//! minimum-overlap axis normal; the pair normals are blended into one contact
//! for the whole piece pair.
//!
//! ```text
//! overlap_axis = cube_size - |b_axis - a_axis|
//! touching     = all three overlaps > -epsilon
//! pair normal  = axis of least overlap, pointing from a's cube to b's cube
//! weight       = max(0.005, penetration + epsilon)
//! ```

use bevy::math::Vec3;

use crate::bounds::cube_bounds;

/// Smallest weight a touching pair contributes to the blended normal.
const MIN_PAIR_WEIGHT: f32 = 0.005;

/// A detected contact between piece A and piece B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from A towards B
    pub normal: Vec3,
    /// Deepest per-pair penetration, never negative
    pub penetration: f32,
}

/// Least-overlap axis and its overlap for one cube pair, if touching.
fn cube_pair_contact(a: Vec3, b: Vec3, cube_size: f32, epsilon: f32) -> Option<(Vec3, f32)> {
    let delta = b - a;
    let overlap = Vec3::splat(cube_size) - delta.abs();
    if overlap.min_element() <= -epsilon {
        return None;
    }

    let (axis, depth) = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        (Vec3::X, overlap.x)
    } else if overlap.y <= overlap.z {
        (Vec3::Y, overlap.y)
    } else {
        (Vec3::Z, overlap.z)
    };

    // Coincident centers have no preferred side; push B along +axis
    let sign = if delta.dot(axis) < 0.0 { -1.0 } else { 1.0 };
    Some((axis * sign, depth))
}

/// Contact between two pieces given their world-space cube centers.
///
/// Returns `None` when no cube pair touches or the blended normal degenerates.
pub fn contact(a: &[Vec3], b: &[Vec3], cube_size: f32, epsilon: f32) -> Option<Contact> {
    let (Some(bounds_a), Some(bounds_b)) = (
        cube_bounds(a.iter().copied(), cube_size),
        cube_bounds(b.iter().copied(), cube_size),
    ) else {
        return None;
    };

    // Broad phase: whole-piece boxes must at least come within epsilon
    let gap = (bounds_b.min - bounds_a.max).max(bounds_a.min - bounds_b.max);
    if gap.max_element() >= epsilon {
        return None;
    }

    let mut normal_sum = Vec3::ZERO;
    let mut max_penetration = f32::NEG_INFINITY;
    let mut touching = false;

    for &ca in a {
        for &cb in b {
            let Some((normal, depth)) = cube_pair_contact(ca, cb, cube_size, epsilon) else {
                continue;
            };
            touching = true;
            let weight = (depth + epsilon).max(MIN_PAIR_WEIGHT);
            normal_sum += normal * weight;
            max_penetration = max_penetration.max(depth);
        }
    }

    if !touching {
        return None;
    }
    let normal = normal_sum.try_normalize()?;
    Some(Contact {
        normal,
        penetration: max_penetration.max(0.0),
    })
}
