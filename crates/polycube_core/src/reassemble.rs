//! Staggered return of every piece to its solved position.
//!
//! Pieces are ranked by how far they are displaced; the farthest starts
//! first and each next piece waits one more stagger step. Each piece eases
//! from its captured offset to zero with a cubic ease-in-out, and the global
//! explode amount eases to zero over the whole span.

use bevy::math::Vec3;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * 0.5
    }
}

/// An in-flight reassembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ReassembleAnimation {
    pub start_time: f64,
    pub start_offsets: Vec<Vec3>,
    /// Start delay per piece index
    pub delays: Vec<f64>,
    pub duration: f64,
    pub start_explode: f32,
}

/// One evaluated frame of a reassembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ReassembleFrame {
    pub offsets: Vec<Vec3>,
    pub explode: f32,
    pub finished: bool,
}

impl ReassembleAnimation {
    /// Capture the current offsets and schedule each piece.
    pub fn new(
        start_time: f64,
        start_offsets: Vec<Vec3>,
        start_explode: f32,
        stagger: f64,
        duration: f64,
    ) -> Self {
        let mut order: Vec<usize> = (0..start_offsets.len()).collect();
        // Stable sort keeps index order between equally displaced pieces
        order.sort_by(|&a, &b| {
            start_offsets[b]
                .length()
                .total_cmp(&start_offsets[a].length())
        });

        let mut delays = vec![0.0; start_offsets.len()];
        for (rank, &piece) in order.iter().enumerate() {
            delays[piece] = rank as f64 * stagger;
        }

        Self {
            start_time,
            start_offsets,
            delays,
            duration: duration.max(1e-3),
            start_explode,
        }
    }

    /// Time from start until the last piece arrives.
    pub fn total_span(&self) -> f64 {
        self.delays.iter().copied().fold(0.0, f64::max) + self.duration
    }

    /// Evaluate the animation at `now`.
    ///
    /// Once every piece's window has elapsed the frame is exactly zero
    /// everywhere and `finished` is set.
    pub fn sample(&self, now: f64) -> ReassembleFrame {
        let elapsed = now - self.start_time;
        if elapsed > self.total_span() {
            return ReassembleFrame {
                offsets: vec![Vec3::ZERO; self.start_offsets.len()],
                explode: 0.0,
                finished: true,
            };
        }

        let offsets = self
            .start_offsets
            .iter()
            .zip(&self.delays)
            .map(|(&start, &delay)| {
                let local = ((elapsed - delay) / self.duration) as f32;
                start * (1.0 - ease_in_out_cubic(local))
            })
            .collect();
        let overall = (elapsed / self.total_span()) as f32;
        ReassembleFrame {
            offsets,
            explode: self.start_explode * (1.0 - ease_in_out_cubic(overall)),
            finished: false,
        }
    }
}
