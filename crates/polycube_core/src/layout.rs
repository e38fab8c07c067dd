//! Where each piece is drawn.
//!
//! A renderer composes a solution with a `LayoutPolicy` instead of
//! special-casing each visualization. Offsets are added to a piece's solved
//! cube centers.

use bevy::math::Vec3;

use crate::geometry::centroid;
use crate::pieces::WoodParams;
use crate::reassemble::ease_in_out_cubic;

/// Per-piece placement and styling hooks.
pub trait LayoutPolicy {
    /// World offset added to the piece's solved position.
    fn piece_offset(&self, index: usize) -> Vec3;

    /// Highlight strength, 0 for none.
    fn piece_highlight(&self, _index: usize) -> f32 {
        0.0
    }

    /// Wood grain for the piece, `None` for flat shading.
    fn wood_params(&self, _index: usize) -> Option<WoodParams> {
        None
    }
}

/// Unit directions from the cube center to each piece's centroid.
///
/// A piece centered on the cube's center gets a zero direction and stays put.
pub fn explode_directions(solved_cells: &[Vec<Vec3>]) -> Vec<Vec3> {
    solved_cells
        .iter()
        .map(|cells| centroid(cells).normalize_or_zero())
        .collect()
}

/// Static solution view with a global explode amount.
#[derive(Debug, Clone)]
pub struct ExplodedLayout {
    directions: Vec<Vec3>,
    wood: Vec<WoodParams>,
    pub explode: f32,
    pub explode_scale: f32,
}

impl ExplodedLayout {
    pub fn new(solved_cells: &[Vec<Vec3>], wood: Vec<WoodParams>, explode_scale: f32) -> Self {
        Self {
            directions: explode_directions(solved_cells),
            wood,
            explode: 0.0,
            explode_scale,
        }
    }
}

impl LayoutPolicy for ExplodedLayout {
    fn piece_offset(&self, index: usize) -> Vec3 {
        self.directions
            .get(index)
            .map_or(Vec3::ZERO, |d| *d * self.explode * self.explode_scale)
    }

    fn wood_params(&self, index: usize) -> Option<WoodParams> {
        self.wood.get(index).copied()
    }
}

/// Pieces drop into the solved cube one after another in solution order.
#[derive(Debug, Clone)]
pub struct AssemblySequence {
    /// Solution-order position of each piece index
    order: Vec<usize>,
    pub lift: Vec3,
    /// Delay between consecutive pieces (seconds)
    pub interval: f32,
    /// Time for one piece to drop (seconds)
    pub duration: f32,
    /// Elapsed animation time (seconds)
    pub time: f32,
}

impl AssemblySequence {
    /// `order[k]` is the piece index placed k-th.
    pub fn new(order: &[usize], lift: Vec3, interval: f32, duration: f32) -> Self {
        let mut rank = vec![0; order.iter().copied().max().map_or(0, |m| m + 1)];
        for (k, &piece) in order.iter().enumerate() {
            rank[piece] = k;
        }
        Self {
            order: rank,
            lift,
            interval,
            duration: duration.max(1e-3),
            time: 0.0,
        }
    }

    pub fn restart(&mut self) {
        self.time = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
    }

    /// Total time until the last piece has landed.
    pub fn total_time(&self) -> f32 {
        self.order.len().saturating_sub(1) as f32 * self.interval + self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.total_time()
    }

    /// Landing progress of a piece in `[0, 1]`.
    pub fn progress(&self, index: usize) -> f32 {
        let Some(&rank) = self.order.get(index) else {
            return 1.0;
        };
        let local = (self.time - rank as f32 * self.interval) / self.duration;
        ease_in_out_cubic(local)
    }
}

impl LayoutPolicy for AssemblySequence {
    fn piece_offset(&self, index: usize) -> Vec3 {
        self.lift * (1.0 - self.progress(index))
    }

    fn piece_highlight(&self, index: usize) -> f32 {
        // Highlight the piece currently in flight
        let p = self.progress(index);
        if p > 0.0 && p < 1.0 {
            1.0
        } else {
            0.0
        }
    }
}
