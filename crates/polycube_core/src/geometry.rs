//! Polycube geometry: cube rotations, piece placement and lattice-to-world
//! conversion.
//!
//! A cube has 24 proper orientations: 6 choices of which face points up,
//! times 4 turns about that axis. Rotation indices are stable:
//!
//! - 0-3: +Z up
//! - 4-7: +Y up
//! - 8-11: -Z up
//! - 12-15: -Y up
//! - 16-19: +X up
//! - 20-23: -X up

use bevy::math::{IVec3, Vec3};

/// Number of proper rotations of a cube.
pub const ROTATION_COUNT: usize = 24;

/// One of the 24 proper rotations of the cube, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CubeRotation(u8);

impl CubeRotation {
    pub const IDENTITY: CubeRotation = CubeRotation(0);

    /// Rotation by index, `None` when out of range.
    pub fn new(index: usize) -> Option<Self> {
        (index < ROTATION_COUNT).then_some(CubeRotation(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All 24 rotations in index order.
    pub fn all() -> impl Iterator<Item = CubeRotation> {
        (0..ROTATION_COUNT as u8).map(CubeRotation)
    }

    /// Apply this rotation to a lattice offset.
    pub fn apply(self, p: IVec3) -> IVec3 {
        let IVec3 { x, y, z } = p;
        let (x, y, z) = match self.0 {
            // +Z up
            0 => (x, y, z),
            1 => (-y, x, z),
            2 => (-x, -y, z),
            3 => (y, -x, z),
            // +Y up
            4 => (x, -z, y),
            5 => (z, x, y),
            6 => (-x, z, y),
            7 => (-z, -x, y),
            // -Z up
            8 => (x, -y, -z),
            9 => (y, x, -z),
            10 => (-x, y, -z),
            11 => (-y, -x, -z),
            // -Y up
            12 => (x, z, -y),
            13 => (-z, x, -y),
            14 => (-x, -z, -y),
            15 => (z, -x, -y),
            // +X up
            16 => (z, y, -x),
            17 => (-y, z, -x),
            18 => (-z, -y, -x),
            19 => (y, -z, -x),
            // -X up
            20 => (-z, y, x),
            21 => (-y, -z, x),
            22 => (z, -y, x),
            _ => (y, z, x),
        };
        IVec3::new(x, y, z)
    }
}

/// Translate cells so the minimum corner sits at the origin, then sort.
///
/// Two placements that differ only by translation normalize to the same list.
pub fn normalize(cells: &[IVec3]) -> Vec<IVec3> {
    let Some(min) = cells.iter().copied().reduce(IVec3::min) else {
        return Vec::new();
    };
    let mut out: Vec<IVec3> = cells.iter().map(|&c| c - min).collect();
    out.sort_by_key(|c| (c.x, c.y, c.z));
    out
}

/// Occupied lattice cells of `shape` rotated by `rotation` then shifted by
/// `translation`.
pub fn place(shape: &[IVec3], rotation: CubeRotation, translation: IVec3) -> Vec<IVec3> {
    shape
        .iter()
        .map(|&c| rotation.apply(c) + translation)
        .collect()
}

/// Unique normalized orientations of a shape.
///
/// Symmetric shapes have fewer than 24.
pub fn orientations(shape: &[IVec3]) -> Vec<Vec<IVec3>> {
    let mut all: Vec<Vec<IVec3>> = CubeRotation::all()
        .map(|r| normalize(&place(shape, r, IVec3::ZERO)))
        .collect();
    all.sort_by(|a, b| {
        a.iter()
            .map(|c| (c.x, c.y, c.z))
            .cmp(b.iter().map(|c| (c.x, c.y, c.z)))
    });
    all.dedup();
    all
}

/// Find a rotation and translation mapping `shape` exactly onto `cells`.
pub fn identify_rotation(shape: &[IVec3], cells: &[IVec3]) -> Option<(CubeRotation, IVec3)> {
    if shape.len() != cells.len() || cells.is_empty() {
        return None;
    }
    let target = normalize(cells);
    let target_min = cells.iter().copied().reduce(IVec3::min)?;

    CubeRotation::all().find_map(|rotation| {
        let rotated = place(shape, rotation, IVec3::ZERO);
        let rotated_min = rotated.iter().copied().reduce(IVec3::min)?;
        (normalize(&rotated) == target).then_some((rotation, target_min - rotated_min))
    })
}

/// World-space center of a lattice cell.
///
/// The solved cube of edge `dim` is centered on the origin.
pub fn lattice_to_world(cell: IVec3, dim: u32, cube_size: f32) -> Vec3 {
    let half = (dim as f32 - 1.0) * 0.5;
    (cell.as_vec3() - Vec3::splat(half)) * cube_size
}

/// Mean of a set of points, `Vec3::ZERO` for an empty set.
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn l_tetracube() -> Vec<IVec3> {
        vec![
            IVec3::new(0, 0, 0),
            IVec3::new(1, 0, 0),
            IVec3::new(2, 0, 0),
            IVec3::new(0, 1, 0),
        ]
    }

    #[test]
    fn test_rotations_are_distinct() {
        // A chiral point distinguishes all 24 rotations
        let point = IVec3::new(1, 2, 3);
        let images: HashSet<IVec3> = CubeRotation::all().map(|r| r.apply(point)).collect();
        assert_eq!(images.len(), ROTATION_COUNT);
    }

    #[test]
    fn test_rotations_preserve_length() {
        let point = IVec3::new(1, -2, 3);
        for r in CubeRotation::all() {
            assert_eq!(
                r.apply(point).length_squared(),
                point.length_squared(),
                "rotation {} changed length",
                r.index()
            );
        }
    }

    #[test]
    fn test_rotation_index_bounds() {
        assert!(CubeRotation::new(23).is_some());
        assert!(CubeRotation::new(24).is_none());
        assert_eq!(CubeRotation::IDENTITY.apply(IVec3::new(4, 5, 6)), IVec3::new(4, 5, 6));
    }

    #[test]
    fn test_l_tetracube_has_24_orientations() {
        assert_eq!(orientations(&l_tetracube()).len(), 24);
    }

    #[test]
    fn test_straight_piece_has_3_orientations() {
        let bar = vec![IVec3::new(0, 0, 0), IVec3::new(1, 0, 0), IVec3::new(2, 0, 0)];
        assert_eq!(orientations(&bar).len(), 3);
    }

    #[test]
    fn test_identify_rotation_roundtrip() {
        let shape = l_tetracube();
        let rotation = CubeRotation::new(13).unwrap();
        let translation = IVec3::new(2, 1, 0);
        let placed = place(&shape, rotation, translation);

        let (found_rot, found_t) = identify_rotation(&shape, &placed).unwrap();
        let mut replaced = place(&shape, found_rot, found_t);
        let mut expected = placed.clone();
        replaced.sort_by_key(|c| (c.x, c.y, c.z));
        expected.sort_by_key(|c| (c.x, c.y, c.z));
        assert_eq!(replaced, expected);
    }

    #[test]
    fn test_identify_rotation_rejects_other_shape() {
        let t_piece = vec![
            IVec3::new(0, 0, 0),
            IVec3::new(1, 0, 0),
            IVec3::new(2, 0, 0),
            IVec3::new(1, 1, 0),
        ];
        assert!(identify_rotation(&l_tetracube(), &t_piece).is_none());
    }

    #[test]
    fn test_lattice_to_world_centers_cube() {
        assert_eq!(lattice_to_world(IVec3::new(1, 1, 1), 3, 1.0), Vec3::ZERO);
        assert_eq!(
            lattice_to_world(IVec3::new(0, 0, 0), 4, 2.0),
            Vec3::splat(-3.0)
        );
    }

    #[test]
    fn test_centroid_empty_is_zero() {
        assert_eq!(centroid(&[]), Vec3::ZERO);
        assert_eq!(
            centroid(&[Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 0.0)]),
            Vec3::new(2.0, 1.0, 0.0)
        );
    }
}
