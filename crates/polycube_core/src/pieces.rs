//! Piece catalogs and per-piece appearance.
//!
//! Shapes are lattice offsets normalized to start at the origin. Appearance
//! (color and wood grain) is fixed per piece index for the whole session.

use bevy::math::IVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A named catalog shape.
#[derive(Debug, Clone, Copy)]
pub struct PieceShape {
    pub name: &'static str,
    pub cells: &'static [[i32; 3]],
}

impl PieceShape {
    /// Cells as lattice vectors.
    pub fn lattice(&self) -> Vec<IVec3> {
        self.cells.iter().map(|&c| IVec3::from_array(c)).collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The seven pieces of the 3x3x3 blocker puzzle.
pub const BLOCKER_PIECES: &[PieceShape] = &[
    PieceShape { name: "L", cells: &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0]] },
    PieceShape { name: "T", cells: &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [1, 1, 0]] },
    PieceShape { name: "S", cells: &[[0, 0, 0], [1, 0, 0], [1, 1, 0], [2, 1, 0]] },
    PieceShape { name: "V", cells: &[[0, 0, 0], [1, 0, 0], [0, 1, 0]] },
    PieceShape { name: "Right screw", cells: &[[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 0, 1]] },
    PieceShape { name: "Branch", cells: &[[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]] },
    PieceShape { name: "Left screw", cells: &[[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 1, 1]] },
];

/// The thirteen pieces of the 4x4x4 Bedlam cube.
pub const BEDLAM_PIECES: &[PieceShape] = &[
    PieceShape { name: "Little corner", cells: &[[0, 0, 0], [0, 1, 0], [1, 0, 0], [0, 0, 1]] },
    PieceShape { name: "Long stick", cells: &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0], [3, 1, 0]] },
    PieceShape { name: "Hat", cells: &[[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 2, 0], [2, 2, 0]] },
    PieceShape { name: "Bucket", cells: &[[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 2, 0], [1, 1, 1]] },
    PieceShape { name: "Screw", cells: &[[0, 0, 0], [1, 0, 0], [1, 0, 1], [1, 1, 1], [2, 1, 1]] },
    PieceShape { name: "Twist", cells: &[[0, 0, 0], [1, 0, 0], [1, 1, 0], [1, 1, 1], [2, 1, 1]] },
    PieceShape { name: "Signpost", cells: &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [1, 1, 0], [1, 0, 1]] },
    PieceShape { name: "Ducktail", cells: &[[0, 0, 0], [1, 0, 0], [1, 1, 0], [2, 1, 0], [1, 0, 1]] },
    PieceShape { name: "Plane", cells: &[[0, 0, 0], [0, 1, 0], [1, 1, 0], [2, 1, 0], [1, 2, 0]] },
    PieceShape { name: "Bridge", cells: &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [0, 1, 0], [2, 1, 0]] },
    PieceShape { name: "Staircase", cells: &[[0, 0, 0], [1, 0, 0], [1, 1, 0], [2, 1, 0], [2, 2, 0]] },
    PieceShape { name: "Spikey zag", cells: &[[0, 0, 1], [0, 1, 0], [0, 1, 1], [1, 1, 0], [1, 2, 0]] },
    PieceShape { name: "Middle zig", cells: &[[0, 0, 0], [0, 1, 0], [0, 1, 1], [1, 1, 0], [1, 2, 0]] },
];

/// Linear sRGB-ish display colors, cycled by piece index.
const PALETTE: [[f32; 3]; 13] = [
    [0.86, 0.36, 0.30],
    [0.95, 0.70, 0.25],
    [0.40, 0.70, 0.35],
    [0.30, 0.55, 0.85],
    [0.65, 0.40, 0.80],
    [0.90, 0.50, 0.65],
    [0.35, 0.78, 0.78],
    [0.78, 0.62, 0.45],
    [0.55, 0.55, 0.25],
    [0.90, 0.85, 0.55],
    [0.45, 0.30, 0.25],
    [0.60, 0.80, 0.95],
    [0.85, 0.45, 0.20],
];

/// Procedural wood-grain parameters fed to the piece shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WoodParams {
    /// Ring frequency
    pub scale: f32,
    /// Grain direction (radians)
    pub angle: f32,
    /// Texture-space shift so neighbouring pieces don't share grain
    pub shift: [f32; 2],
    /// Noise seed
    pub seed: f32,
    /// Blend between flat color and grain, 0..1
    pub mix: f32,
}

impl WoodParams {
    /// Deterministic grain for a piece index.
    pub fn for_piece(index: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(0x5EED_0000 ^ index as u64);
        Self {
            scale: rng.gen_range(3.0..7.0),
            angle: rng.gen_range(0.0..std::f32::consts::PI),
            shift: [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)],
            seed: rng.gen_range(0.0..1000.0),
            mix: rng.gen_range(0.35..0.65),
        }
    }

    /// Flat stand-in for the grain: the piece color darkened toward its
    /// grain tone, by at most `mix * 0.3`.
    pub fn tint(&self, color: [f32; 3]) -> [f32; 3] {
        let grain = 0.5 + 0.5 * (self.seed + self.angle * self.scale).sin();
        let shade = 1.0 - self.mix * 0.3 * grain;
        color.map(|c| (c * shade).clamp(0.0, 1.0))
    }

    /// Surface roughness; finer grain reads as a smoother finish.
    pub fn roughness(&self) -> f32 {
        (0.55 + 0.05 * self.scale).clamp(0.0, 1.0)
    }
}

/// Static piece definition: identity, shape and appearance.
#[derive(Debug, Clone)]
pub struct Piece {
    pub index: usize,
    pub name: &'static str,
    pub shape: Vec<IVec3>,
    pub color: [f32; 3],
    pub wood: WoodParams,
}

impl Piece {
    pub fn from_shape(index: usize, shape: &PieceShape) -> Self {
        Self {
            index,
            name: shape.name,
            shape: shape.lattice(),
            color: PALETTE[index % PALETTE.len()],
            wood: WoodParams::for_piece(index),
        }
    }
}

/// Build the full piece list for a catalog.
pub fn build_pieces(catalog: &[PieceShape]) -> Vec<Piece> {
    catalog
        .iter()
        .enumerate()
        .map(|(i, shape)| Piece::from_shape(i, shape))
        .collect()
}
