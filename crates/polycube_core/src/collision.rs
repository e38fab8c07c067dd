//! Collision response between pieces.
//!
//! Two passes run every integration slice:
//!
//! - **Drag interaction**: pieces touching the held piece get shoved along
//!   the contact normal, pushed out of penetration, and pick up a little of
//!   the held piece's sideways motion.
//! - **Pack-out**: idle pieces that overlap each other are separated
//!   symmetrically, with a mostly inelastic impulse if they are closing.
//!   Only true overlap counts here: near-touching pairs within the contact
//!   tolerance are left to their springs, otherwise neighbours in the solved
//!   cube would hold each other off their rest positions.
//!
//! Both passes work on `base` cube centers (solved position plus explode) and
//! read each piece's current offset from its `PieceState`.

use bevy::math::Vec3;

use crate::config::ManipulationConfig;
use crate::contact::{contact, Contact};
use crate::integrator::PieceState;

/// World-space cube centers of a piece displaced by `offset`.
pub fn offset_cells(base: &[Vec3], offset: Vec3) -> Vec<Vec3> {
    base.iter().map(|&c| c + offset).collect()
}

fn piece_contact(
    base: &[Vec<Vec3>],
    states: &[PieceState],
    a: usize,
    b: usize,
    cube_size: f32,
    epsilon: f32,
) -> Option<Contact> {
    contact(
        &offset_cells(&base[a], states[a].offset),
        &offset_cells(&base[b], states[b].offset),
        cube_size,
        epsilon,
    )
}

/// Shove every piece touching the held piece.
///
/// Returns how many pieces were in contact.
pub fn resolve_drag_contacts(
    states: &mut [PieceState],
    base: &[Vec<Vec3>],
    dragged: usize,
    drag_velocity: Vec3,
    config: &ManipulationConfig,
) -> usize {
    let mut touched = 0;
    for other in 0..states.len() {
        if other == dragged {
            continue;
        }
        let Some(hit) = piece_contact(
            base,
            states,
            dragged,
            other,
            config.cube_size,
            config.contact_epsilon,
        ) else {
            continue;
        };
        touched += 1;

        let n = hit.normal;
        let closing = drag_velocity.dot(n).max(0.0);
        let target_speed = config.drag_impulse_base
            + closing * config.drag_velocity_scale
            + hit.penetration * config.drag_penetration_weight;

        let state = &mut states[other];
        let normal_speed = state.velocity.dot(n);
        if normal_speed < target_speed {
            state.velocity += n * (target_speed - normal_speed);
        }
        state.offset += n * hit.penetration * config.drag_push;

        let tangential = drag_velocity - n * drag_velocity.dot(n);
        state.velocity += tangential * config.drag_tangent_smear;
    }
    touched
}

/// Separate overlapping idle pieces.
///
/// `skip` is excluded from both sides, normally the held piece. Returns how
/// many pairs overlapped.
pub fn resolve_pack_out(
    states: &mut [PieceState],
    base: &[Vec<Vec3>],
    skip: Option<usize>,
    config: &ManipulationConfig,
) -> usize {
    let mut pairs = 0;
    for a in 0..states.len() {
        if Some(a) == skip {
            continue;
        }
        for b in (a + 1)..states.len() {
            if Some(b) == skip {
                continue;
            }
            let Some(hit) = piece_contact(base, states, a, b, config.cube_size, 0.0) else {
                continue;
            };
            if hit.penetration <= 0.0 {
                continue;
            }
            pairs += 1;

            let n = hit.normal;
            let half = n * (hit.penetration * 0.5);
            states[a].offset -= half;
            states[b].offset += half;

            let approach = (states[b].velocity - states[a].velocity).dot(n);
            if approach < 0.0 {
                let impulse = -(1.0 + config.restitution) * approach * 0.5;
                states[a].velocity -= n * impulse;
                states[b].velocity += n * impulse;
            }
        }
    }
    pairs
}
