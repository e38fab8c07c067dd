//! Deciding when to offer the "reassemble" shortcut.
//!
//! The signal is the bounding-box excess of the current layout: pieces that
//! are scattered or jammed half-way out grow the box, while the global explode
//! slider is factored out by comparing against the box with all user offsets
//! removed. The affordance uses hysteresis so it does not flicker while the
//! user is still jostling pieces:
//!
//! - show: excess (or explode) above its show threshold, and the scene has
//!   been still for `settle_delay_sec`
//! - stay: at least `min_visible_sec` once shown
//! - hide: low excess, not exploded, nothing moving, no drag or reassembly,
//!   all held continuously for `hide_debounce_sec`

use bevy::log::{debug, info};

use crate::config::ManipulationConfig;

/// What the detector sees each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StruggleSample {
    /// Wall-clock time in seconds
    pub now: f64,
    /// Bounding-box excess ratio, >= 0
    pub excess: f32,
    /// Global explode amount
    pub explode: f32,
    /// Any piece moved this frame
    pub moving: bool,
    /// A drag or reassembly is in progress
    pub busy: bool,
}

/// Hysteresis state for the reassemble affordance.
#[derive(Debug, Clone, Default)]
pub struct StruggleDetector {
    visible: bool,
    shown_at: f64,
    still_since: Option<f64>,
    hide_candidate_since: Option<f64>,
    attempted: bool,
    last_excess: f32,
}

impl StruggleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Most recent excess ratio fed in.
    pub fn excess(&self) -> f32 {
        self.last_excess
    }

    /// Whether a deliberate drag has been seen since the last reassembly.
    pub fn has_attempt(&self) -> bool {
        self.attempted
    }

    /// Record a finished drag. Long drags count as an attempt at the puzzle
    /// and make the affordance easier to trigger.
    pub fn note_drag(&mut self, distance_px: f32, config: &ManipulationConfig) {
        if distance_px >= config.deliberate_drag_px {
            debug!("deliberate drag of {:.0}px noted", distance_px);
            self.attempted = true;
        }
    }

    /// Forget earlier attempts, typically after a reassembly.
    pub fn reset_attempts(&mut self) {
        self.attempted = false;
    }

    fn show_threshold(&self, config: &ManipulationConfig) -> f32 {
        if self.attempted {
            config.show_excess * config.attempt_threshold_scale
        } else {
            config.show_excess
        }
    }

    /// Re-evaluate visibility. Returns `Some(visible)` when it changed.
    pub fn update(&mut self, sample: StruggleSample, config: &ManipulationConfig) -> Option<bool> {
        self.last_excess = sample.excess;

        if sample.moving || sample.busy {
            self.still_since = None;
        } else if self.still_since.is_none() {
            self.still_since = Some(sample.now);
        }

        if !self.visible {
            let displaced =
                sample.excess > self.show_threshold(config) || sample.explode > config.explode_show;
            let settled = self
                .still_since
                .is_some_and(|since| sample.now - since >= config.settle_delay_sec);
            if displaced && settled && !sample.busy {
                self.visible = true;
                self.shown_at = sample.now;
                self.hide_candidate_since = None;
                info!(
                    "reassemble affordance shown (excess {:.2}, explode {:.2})",
                    sample.excess, sample.explode
                );
                return Some(true);
            }
            return None;
        }

        if sample.now - self.shown_at < config.min_visible_sec {
            return None;
        }

        let should_hide = sample.excess < config.hide_excess
            && sample.explode <= config.explode_hide
            && !sample.moving
            && !sample.busy;
        if !should_hide {
            self.hide_candidate_since = None;
            return None;
        }

        let since = *self.hide_candidate_since.get_or_insert(sample.now);
        if sample.now - since >= config.hide_debounce_sec {
            self.visible = false;
            self.hide_candidate_since = None;
            info!("reassemble affordance hidden");
            return Some(false);
        }
        None
    }
}
