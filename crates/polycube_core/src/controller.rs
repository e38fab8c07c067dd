//! Interactive piece manipulation for a solved polycube puzzle.
//!
//! `ManipulationController` owns all mutable state of the interactive view:
//! per-piece offsets and velocities, the press-and-hold gesture, struggle
//! detection and the reassembly animation. Platform code feeds it pointer
//! events and frame ticks and reads back offsets and affordance state; it
//! never touches a window or the scene graph itself.
//!
//! Per frame (`step`):
//!
//! 1. A running reassembly overrides physics and drives offsets directly.
//! 2. Otherwise the held piece follows its drag velocity, idle pieces are
//!    integrated under the spring, and both collision passes run, in up to
//!    `max_substeps` slices.
//! 3. Motion is detected and the struggle detector re-evaluated.
//!
//! The camera input lock mirrors whether a piece is grabbed. It is applied
//! immediately by gesture handlers that receive the camera and reconciled at
//! every `step`.

use bevy::log::{debug, info};
use bevy::math::{Vec2, Vec3};

use crate::bounds::{bounding_volume, excess_ratio};
use crate::camera::{CameraBasis, CameraRig, Viewport};
use crate::collision::{offset_cells, resolve_drag_contacts, resolve_pack_out};
use crate::config::ManipulationConfig;
use crate::geometry::centroid;
use crate::integrator::{decay_drag_velocity, integrate_spring, settle, substeps, PieceState};
use crate::interaction::{GestureSource, HoldTicket, Interaction, MoveOutcome, PointerEvent};
use crate::layout::{explode_directions, LayoutPolicy};
use crate::pick::{drag_delta_world, pick_piece, pointer_ray, world_per_pixel, PickHit};
use crate::pieces::{build_pieces, Piece, WoodParams};
use crate::reassemble::ReassembleAnimation;
use crate::solution::Solution;
use crate::struggle::{StruggleDetector, StruggleSample};

/// Visibility handle of the "reassemble" button.
pub trait ReassembleButton: Send + Sync {
    fn set_visible(&mut self, visible: bool);
}

/// Display handle of the explode slider.
pub trait ExplodeSlider: Send + Sync {
    fn set_value(&mut self, value: f32);
}

/// Snapshot of everything the UI layer may want to show.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AffordanceState {
    pub reassemble_visible: bool,
    pub explode: f32,
    /// Grabbed piece
    pub dragging: Option<usize>,
    /// Pressed piece waiting for the hold timer
    pub pending: Option<usize>,
    pub reassembling: bool,
    pub excess: f32,
    /// A deliberate drag was seen since the last reassembly
    pub attempted: bool,
}

/// Owner of the interactive puzzle state.
pub struct ManipulationController {
    config: ManipulationConfig,
    pieces: Vec<Piece>,
    /// Solved cube centers, indexed by piece
    solved: Vec<Vec<Vec3>>,
    explode_dirs: Vec<Vec3>,
    states: Vec<PieceState>,
    interaction: Interaction,
    struggle: StruggleDetector,
    reassembly: Option<ReassembleAnimation>,
    explode: f32,
    viewport: Viewport,
    now: f64,
    moving: bool,
    camera_locked: bool,
    button: Option<Box<dyn ReassembleButton>>,
    slider: Option<Box<dyn ExplodeSlider>>,
}

impl ManipulationController {
    pub fn new(solution: &Solution, config: ManipulationConfig) -> Self {
        let count = solution
            .entries
            .iter()
            .map(|e| e.piece + 1)
            .max()
            .unwrap_or(0);

        let mut solved = vec![Vec::new(); count];
        for (entry, cells) in solution
            .entries
            .iter()
            .zip(solution.world_cells(config.cube_size))
        {
            solved[entry.piece] = cells;
        }

        let mut pieces = build_pieces(solution.kind.catalog());
        pieces.truncate(count);

        info!(
            "manipulation controller ready: {} with {} pieces",
            solution.kind.name(),
            count
        );

        Self {
            explode_dirs: explode_directions(&solved),
            states: vec![PieceState::default(); count],
            pieces,
            solved,
            config,
            interaction: Interaction::new(),
            struggle: StruggleDetector::new(),
            reassembly: None,
            explode: 0.0,
            viewport: Viewport::new(1280.0, 720.0),
            now: 0.0,
            moving: false,
            camera_locked: false,
            button: None,
            slider: None,
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    pub fn piece_count(&self) -> usize {
        self.states.len()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_state(&self, index: usize) -> Option<&PieceState> {
        self.states.get(index)
    }

    pub fn explode(&self) -> f32 {
        self.explode
    }

    pub fn is_reassembling(&self) -> bool {
        self.reassembly.is_some()
    }

    /// Whether any piece moved during the last step.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn dragging_piece(&self) -> Option<usize> {
        self.interaction.active_piece()
    }

    pub fn affordance_state(&self) -> AffordanceState {
        AffordanceState {
            reassemble_visible: self.struggle.is_visible(),
            explode: self.explode,
            dragging: self.interaction.active_piece(),
            pending: self.interaction.pending_piece(),
            reassembling: self.reassembly.is_some(),
            excess: self.struggle.excess(),
            attempted: self.struggle.has_attempt(),
        }
    }

    /// Solved cube centers of a piece.
    pub fn solved_cells(&self, index: usize) -> &[Vec3] {
        self.solved.get(index).map_or(&[], |c| c.as_slice())
    }

    /// Cube centers with explode applied but no user offset.
    fn base_cells(&self, index: usize) -> Vec<Vec3> {
        let shift = self.explode_shift(index);
        self.solved_cells(index).iter().map(|&c| c + shift).collect()
    }

    fn explode_shift(&self, index: usize) -> Vec3 {
        self.explode_dirs
            .get(index)
            .map_or(Vec3::ZERO, |d| *d * self.explode * self.config.explode_scale)
    }

    fn all_base_cells(&self) -> Vec<Vec<Vec3>> {
        (0..self.piece_count()).map(|i| self.base_cells(i)).collect()
    }

    /// Current world-space cube centers of a piece.
    pub fn piece_world_cells(&self, index: usize) -> Vec<Vec3> {
        let offset = self.states.get(index).map_or(Vec3::ZERO, |s| s.offset);
        offset_cells(&self.base_cells(index), offset)
    }

    pub fn all_world_cells(&self) -> Vec<Vec<Vec3>> {
        (0..self.piece_count())
            .map(|i| self.piece_world_cells(i))
            .collect()
    }

    /// Bounding-box excess of the current layout over the same layout with
    /// every user offset removed.
    pub fn bounding_excess(&self) -> f32 {
        let cube = self.config.cube_size;
        let current = bounding_volume(self.all_world_cells().into_iter().flatten(), cube);
        let tight = bounding_volume(self.all_base_cells().into_iter().flatten(), cube);
        excess_ratio(current, tight)
    }

    // ---------------------------------------------------------------------
    // Control surface
    // ---------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_reassemble_button(&mut self, mut button: Box<dyn ReassembleButton>) {
        button.set_visible(self.struggle.is_visible());
        self.button = Some(button);
    }

    pub fn set_explode_slider(&mut self, mut slider: Box<dyn ExplodeSlider>) {
        slider.set_value(self.explode);
        self.slider = Some(slider);
    }

    /// Set the global explode amount. Ignored while reassembling.
    pub fn set_explode(&mut self, amount: f32) {
        if self.reassembly.is_some() {
            return;
        }
        self.apply_explode(amount.clamp(0.0, self.config.max_explode));
    }

    fn apply_explode(&mut self, amount: f32) {
        self.explode = amount;
        if let Some(slider) = self.slider.as_mut() {
            slider.set_value(amount);
        }
    }

    /// Move a piece directly, bypassing the drag gesture.
    pub fn displace_piece(&mut self, index: usize, offset: Vec3) {
        if let Some(state) = self.states.get_mut(index) {
            state.offset = offset;
            state.velocity = Vec3::ZERO;
        }
    }

    /// Animate every piece back to the solved layout.
    ///
    /// Returns `false` (and changes nothing) if a reassembly is already running.
    pub fn start_reassemble_animation(&mut self) -> bool {
        if self.reassembly.is_some() {
            return false;
        }
        if let Some(session) = self.interaction.end() {
            debug!("interaction {:?} cancelled by reassembly", session.id);
        }

        let offsets: Vec<Vec3> = self.states.iter().map(|s| s.offset).collect();
        let anim = ReassembleAnimation::new(
            self.now,
            offsets,
            self.explode,
            self.config.reassemble_stagger_sec,
            self.config.reassemble_duration_sec,
        );
        info!("reassembly started, {:.2}s total", anim.total_span());
        for state in &mut self.states {
            state.velocity = Vec3::ZERO;
        }
        self.reassembly = Some(anim);
        true
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    /// Pick the piece under a pixel.
    pub fn pick(&self, camera: &dyn CameraRig, pixel: Vec2) -> Option<PickHit> {
        let ray = pointer_ray(camera, pixel, self.viewport, self.config.fov_y);
        pick_piece(
            &ray,
            &self.all_world_cells(),
            self.config.cube_size,
            self.config.pick_padding,
        )
    }

    fn begin_press(
        &mut self,
        source: GestureSource,
        event: PointerEvent,
        camera: &mut dyn CameraRig,
    ) -> Option<HoldTicket> {
        self.cancel_interaction(camera);
        if self.reassembly.is_some() || camera.is_page_scrolling() {
            return None;
        }
        let hit = self.pick(camera, event.position)?;
        let ticket = self
            .interaction
            .begin(source, hit.piece, event, self.config.hold_delay_sec);
        debug!("press on piece {} ({:?}), hold until {:.3}", hit.piece, source, ticket.fire_at);
        Some(ticket)
    }

    /// Mouse/pen press. Returns the hold timer to schedule when a piece was
    /// hit.
    pub fn on_pointer_down(
        &mut self,
        event: PointerEvent,
        camera: &mut dyn CameraRig,
    ) -> Option<HoldTicket> {
        self.begin_press(GestureSource::Pointer, event, camera)
    }

    /// Touch start. A second simultaneous touch cancels any gesture.
    pub fn on_touch_start(
        &mut self,
        touch_count: usize,
        event: PointerEvent,
        camera: &mut dyn CameraRig,
    ) -> Option<HoldTicket> {
        if touch_count != 1 {
            self.cancel_interaction(camera);
            return None;
        }
        self.begin_press(GestureSource::Touch, event, camera)
    }

    /// The hold timer for `ticket` fired. Stale tickets are ignored.
    pub fn on_hold_elapsed(&mut self, ticket: HoldTicket, camera: &mut dyn CameraRig) -> bool {
        let Some(piece) = self
            .interaction
            .promote(ticket, self.config.hold_move_threshold_px)
        else {
            return false;
        };
        if let Some(state) = self.states.get_mut(piece) {
            state.velocity = Vec3::ZERO;
        }
        self.lock_camera(camera, true);
        info!("piece {} grabbed", piece);
        true
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent, camera: &mut dyn CameraRig) -> MoveOutcome {
        let outcome = self.interaction.track_move(
            event,
            self.config.hold_move_threshold_px,
            self.config.min_drag_dt,
            self.config.max_drag_dt,
        );
        match outcome {
            MoveOutcome::Dragged { pixel_delta, dt } => self.drag_by(pixel_delta, dt, camera),
            MoveOutcome::Cancelled => debug!("press moved before hold, left to camera"),
            MoveOutcome::Ignored | MoveOutcome::Waiting => {}
        }
        outcome
    }

    fn drag_by(&mut self, pixel_delta: Vec2, dt: f32, camera: &dyn CameraRig) {
        let Some(piece) = self.interaction.active_piece() else {
            return;
        };
        let basis = CameraBasis::from_view(&camera.view_matrix());
        let center = centroid(&self.piece_world_cells(piece));
        let depth = (center - camera.eye_position()).dot(basis.forward);
        let wpp = world_per_pixel(depth, self.config.fov_y, self.viewport.height);
        let delta = drag_delta_world(&basis, pixel_delta, wpp);

        let state = &mut self.states[piece];
        let old = state.offset;
        state.offset = (old + delta).clamp_length_max(self.config.max_drag_radius);
        let velocity = (state.offset - old) / dt;
        state.velocity = velocity;

        if let Some(session) = self.interaction.session_mut() {
            session.drag_velocity = velocity;
        }
    }

    /// Release. Ends the gesture and feeds the drag into struggle detection.
    pub fn on_pointer_up(&mut self, event: PointerEvent, camera: &mut dyn CameraRig) {
        let was_active = self.interaction.active_piece();
        let Some(session) = self.interaction.end() else {
            return;
        };
        if let Some(piece) = was_active {
            if let Some(state) = self.states.get_mut(piece) {
                state.velocity = Vec3::ZERO;
            }
            self.lock_camera(camera, false);
            info!("piece {} released after {:.0}px", piece, session.distance_px);
            self.struggle.note_drag(session.distance_px, &self.config);
            self.now = self.now.max(event.time);
            self.update_struggle();
        }
    }

    /// Touch end behaves as a release.
    pub fn on_touch_end(&mut self, event: PointerEvent, camera: &mut dyn CameraRig) {
        self.on_pointer_up(event, camera);
    }

    /// Window lost focus.
    pub fn on_blur(&mut self, camera: &mut dyn CameraRig) {
        self.cancel_interaction(camera);
    }

    /// Drop any gesture and give the camera back.
    pub fn cancel_interaction(&mut self, camera: &mut dyn CameraRig) {
        let was_active = self.interaction.active_piece();
        if let Some(session) = self.interaction.end() {
            debug!("interaction {:?} cancelled", session.id);
        }
        if let Some(piece) = was_active {
            if let Some(state) = self.states.get_mut(piece) {
                state.velocity = Vec3::ZERO;
            }
        }
        self.lock_camera(camera, false);
    }

    fn lock_camera(&mut self, camera: &mut dyn CameraRig, locked: bool) {
        if self.camera_locked != locked {
            camera.set_input_locked(locked);
            self.camera_locked = locked;
        }
    }

    // ---------------------------------------------------------------------
    // Frame tick
    // ---------------------------------------------------------------------

    /// Advance by `dt` seconds of frame time; `now` is wall-clock seconds.
    pub fn step(&mut self, dt: f32, now: f64, camera: &mut dyn CameraRig) {
        self.now = now;
        let dragging = self.interaction.active_piece();
        self.lock_camera(camera, dragging.is_some());

        if self.reassembly.is_some() {
            self.step_reassembly();
        } else {
            self.step_physics(dt.max(0.0), dragging);
        }

        self.moving = dragging.is_some()
            || self.states.iter().any(|s| {
                (s.offset - s.last_motion_offset).length() > self.config.motion_epsilon
            });
        for state in &mut self.states {
            state.last_motion_offset = state.offset;
        }

        self.update_struggle();
    }

    fn step_reassembly(&mut self) {
        let Some(anim) = self.reassembly.as_ref() else {
            return;
        };
        let frame = anim.sample(self.now);
        for (state, offset) in self.states.iter_mut().zip(frame.offsets) {
            state.offset = offset;
            state.velocity = Vec3::ZERO;
        }
        self.apply_explode(frame.explode);

        if frame.finished {
            self.reassembly = None;
            self.apply_explode(0.0);
            self.struggle.reset_attempts();
            info!("reassembly finished");
        }
    }

    fn step_physics(&mut self, dt: f32, dragging: Option<usize>) {
        let config = &self.config;
        let base = self.all_base_cells();

        let drag_velocity = match (dragging, self.interaction.session_mut()) {
            (Some(_), Some(session)) => {
                session.drag_velocity =
                    decay_drag_velocity(session.drag_velocity, dt, config.drag_velocity_decay);
                session.drag_velocity
            }
            _ => Vec3::ZERO,
        };
        if let Some(piece) = dragging {
            self.states[piece].velocity = drag_velocity;
        }

        let (count, slice) = substeps(dt, config.max_substep, config.max_substeps);
        for _ in 0..count {
            for (index, state) in self.states.iter_mut().enumerate() {
                if Some(index) != dragging {
                    integrate_spring(state, slice, config);
                }
            }
            if let Some(piece) = dragging {
                resolve_drag_contacts(&mut self.states, &base, piece, drag_velocity, config);
            }
            resolve_pack_out(&mut self.states, &base, dragging, config);
        }

        for (index, state) in self.states.iter_mut().enumerate() {
            if Some(index) != dragging {
                settle(state, config);
            }
        }
    }

    fn update_struggle(&mut self) {
        let sample = StruggleSample {
            now: self.now,
            excess: self.bounding_excess(),
            explode: self.explode,
            moving: self.moving,
            busy: self.interaction.active_piece().is_some() || self.reassembly.is_some(),
        };
        if let Some(visible) = self.struggle.update(sample, &self.config) {
            if let Some(button) = self.button.as_mut() {
                button.set_visible(visible);
            }
        }
    }
}

impl LayoutPolicy for ManipulationController {
    fn piece_offset(&self, index: usize) -> Vec3 {
        let offset = self.states.get(index).map_or(Vec3::ZERO, |s| s.offset);
        self.explode_shift(index) + offset
    }

    fn piece_highlight(&self, index: usize) -> f32 {
        if self.interaction.active_piece() == Some(index) {
            1.0
        } else if self.interaction.pending_piece() == Some(index) {
            0.5
        } else {
            0.0
        }
    }

    fn wood_params(&self, index: usize) -> Option<WoodParams> {
        self.pieces.get(index).map(|p| p.wood)
    }
}
