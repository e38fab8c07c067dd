//! Spring-damper integration of piece offsets.
//!
//! Each idle piece is pulled back to its solved position by a spring, with a
//! small constant downward bias. Integration is semi-implicit Euler:
//!
//! 1. `velocity += (-offset * spring_strength - gravity * Y) * dt`
//! 2. `velocity *= exp(-linear_damping * dt)`
//! 3. `offset += velocity * dt`
//!
//! Frames are cut into at most `max_substeps` slices of at most `max_substep`
//! seconds so the spring stays stable when the frame rate drops.

use bevy::math::Vec3;

use crate::config::ManipulationConfig;

/// Mutable per-piece render state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PieceState {
    /// Displacement from the solved position (world units)
    pub offset: Vec3,
    /// Rate of change of `offset`
    pub velocity: Vec3,
    /// `offset` as of the previous frame, for motion detection
    pub last_motion_offset: Vec3,
}

impl PieceState {
    pub fn at_offset(offset: Vec3) -> Self {
        Self {
            offset,
            last_motion_offset: offset,
            ..Default::default()
        }
    }

    /// Whether offset and velocity are both exactly zero.
    pub fn is_at_rest(&self) -> bool {
        self.offset == Vec3::ZERO && self.velocity == Vec3::ZERO
    }
}

/// Split a frame delta into equal slices.
///
/// Returns `(count, slice_dt)` with `1 <= count <= max_substeps`. A slice
/// only exceeds `max_substep` when the frame is longer than
/// `max_substep * max_substeps`.
pub fn substeps(dt: f32, max_substep: f32, max_substeps: u32) -> (u32, f32) {
    if dt <= 0.0 {
        return (1, 0.0);
    }
    let wanted = (dt / max_substep.max(1e-6)).ceil() as u32;
    let count = wanted.clamp(1, max_substeps.max(1));
    (count, dt / count as f32)
}

/// Advance one idle piece by `dt` under the spring, bias and damping.
pub fn integrate_spring(state: &mut PieceState, dt: f32, config: &ManipulationConfig) {
    let force = -state.offset * config.spring_strength - Vec3::Y * config.gravity_strength;
    state.velocity += force * dt;
    state.velocity *= (-config.linear_damping * dt).exp();
    state.offset += state.velocity * dt;
}

/// Snap a nearly-resting piece exactly to rest.
///
/// Returns `true` when the piece was snapped.
pub fn settle(state: &mut PieceState, config: &ManipulationConfig) -> bool {
    if state.offset.length() < config.rest_offset_epsilon
        && state.velocity.length() < config.rest_velocity_epsilon
    {
        state.offset = Vec3::ZERO;
        state.velocity = Vec3::ZERO;
        return true;
    }
    false
}

/// Exponential decay of a drag velocity estimate between pointer events.
pub fn decay_drag_velocity(velocity: Vec3, dt: f32, decay_rate: f32) -> Vec3 {
    velocity * (-decay_rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_config() -> ManipulationConfig {
        ManipulationConfig {
            spring_strength: 20.0,
            linear_damping: 8.0,
            gravity_strength: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_substeps_split() {
        assert_eq!(substeps(0.010, 0.012, 4), (1, 0.010));
        let (n, slice) = substeps(1.0 / 60.0, 0.012, 4);
        assert_eq!(n, 2);
        assert!(slice <= 0.012);
    }

    #[test]
    fn test_substeps_capped() {
        let (n, slice) = substeps(0.5, 0.012, 4);
        assert_eq!(n, 4);
        assert!((slice - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_substeps_zero_dt() {
        assert_eq!(substeps(0.0, 0.012, 4), (1, 0.0));
    }

    #[test]
    fn test_spring_pulls_towards_rest() {
        let config = scenario_config();
        let mut state = PieceState::at_offset(Vec3::new(1.0, 0.0, 0.0));
        integrate_spring(&mut state, 1.0 / 60.0, &config);
        assert!(state.velocity.x < 0.0, "spring should pull back, v = {:?}", state.velocity);
        assert!(state.offset.x < 1.0);
    }

    #[test]
    fn test_gravity_bias_is_vertical_only() {
        let config = ManipulationConfig {
            gravity_strength: 1.0,
            ..scenario_config()
        };
        let mut state = PieceState::default();
        integrate_spring(&mut state, 0.01, &config);
        assert!(state.velocity.y < 0.0);
        assert_eq!(state.velocity.x, 0.0);
        assert_eq!(state.velocity.z, 0.0);
    }

    #[test]
    fn test_spring_settles_within_three_seconds() {
        // offset [2,0,0], k = 20, damping = 8, no gravity, 60 Hz for 3 s
        let config = scenario_config();
        let mut state = PieceState::at_offset(Vec3::new(2.0, 0.0, 0.0));
        let dt = 1.0 / 60.0;
        for _ in 0..180 {
            let (n, slice) = substeps(dt, config.max_substep, config.max_substeps);
            for _ in 0..n {
                integrate_spring(&mut state, slice, &config);
            }
            settle(&mut state, &config);
        }
        assert!(
            state.offset.length() < 0.01,
            "offset should settle, got {:?}",
            state.offset
        );
    }

    #[test]
    fn test_spring_is_stable_from_large_offsets() {
        let config = scenario_config();
        for start in [Vec3::new(-5.0, 3.0, 1.0), Vec3::splat(10.0), Vec3::new(0.0, 0.0, -50.0)] {
            let mut state = PieceState::at_offset(start);
            for _ in 0..600 {
                let (n, slice) = substeps(1.0 / 30.0, config.max_substep, config.max_substeps);
                for _ in 0..n {
                    integrate_spring(&mut state, slice, &config);
                }
                settle(&mut state, &config);
            }
            assert!(state.is_at_rest(), "start {:?} ended at {:?}", start, state);
        }
    }

    #[test]
    fn test_settle_snaps_exactly() {
        let config = ManipulationConfig::default();
        let mut state = PieceState {
            offset: Vec3::new(0.001, 0.0, 0.0),
            velocity: Vec3::new(0.0, 0.005, 0.0),
            last_motion_offset: Vec3::ZERO,
        };
        assert!(settle(&mut state, &config));
        assert!(state.is_at_rest());
    }

    #[test]
    fn test_settle_leaves_moving_piece() {
        let config = ManipulationConfig::default();
        let mut state = PieceState {
            offset: Vec3::new(0.001, 0.0, 0.0),
            velocity: Vec3::new(0.5, 0.0, 0.0),
            last_motion_offset: Vec3::ZERO,
        };
        assert!(!settle(&mut state, &config));
    }

    #[test]
    fn test_drag_velocity_decays() {
        let v = decay_drag_velocity(Vec3::new(4.0, 0.0, 0.0), 0.1, 10.0);
        assert!((v.x - 4.0 * (-1.0f32).exp()).abs() < 1e-5);
    }
}
