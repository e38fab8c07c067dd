//! Press-and-hold gesture tracking for grabbing pieces.
//!
//! ```text
//!   Idle ──press on piece──▶ Pending ──hold timer, still──▶ Active
//!    ▲                         │                              │
//!    └──── moved / 2nd touch / blur / cancel ─────────────────┤
//!    └──────────────────────────── release ───────────────────┘
//! ```
//!
//! A press only becomes a grab after it has been held for the hold delay
//! without travelling far; anything else is left to the camera or the page.
//! Every session gets a fresh `SessionId` and the hold timer carries the id
//! it was issued for, so a timer firing after its session ended is a no-op
//! even if a newer session has started since.

use bevy::math::{Vec2, Vec3};

/// Identity of one press-to-release gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Where a gesture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Waiting for the hold timer
    Pending,
    /// Piece is grabbed and follows the pointer
    Active,
}

/// A pointer or single-touch sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position in pixels, y down
    pub position: Vec2,
    /// Wall-clock time in seconds
    pub time: f64,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, time: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            time,
        }
    }
}

/// The hold timer issued on press. Hand it back once `fire_at` is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTicket {
    pub session: SessionId,
    pub fire_at: f64,
}

/// State of the gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    pub id: SessionId,
    pub source: GestureSource,
    pub phase: GesturePhase,
    /// Piece under the pointer at press time
    pub piece: usize,
    pub start_position: Vec2,
    pub last_position: Vec2,
    /// Total pointer travel in pixels
    pub distance_px: f32,
    pub last_move_time: f64,
    /// Instantaneous drag velocity estimate (world units/s)
    pub drag_velocity: Vec3,
}

/// Outcome of a pointer move while a session exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No session
    Ignored,
    /// Pending press still within the movement threshold
    Waiting,
    /// Pending press moved too far and was dropped
    Cancelled,
    /// Active drag: pixel delta since the previous sample and the clamped
    /// time step for velocity estimation
    Dragged { pixel_delta: Vec2, dt: f32 },
}

/// Owner of the single in-flight gesture.
#[derive(Debug, Default)]
pub struct Interaction {
    next_id: u64,
    session: Option<InteractionSession>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut InteractionSession> {
        self.session.as_mut()
    }

    /// The grabbed piece, if a session is active.
    pub fn active_piece(&self) -> Option<usize> {
        self.session
            .as_ref()
            .filter(|s| s.phase == GesturePhase::Active)
            .map(|s| s.piece)
    }

    /// The pressed piece while waiting for the hold timer.
    pub fn pending_piece(&self) -> Option<usize> {
        self.session
            .as_ref()
            .filter(|s| s.phase == GesturePhase::Pending)
            .map(|s| s.piece)
    }

    /// Start a new pending session, replacing any previous one.
    pub fn begin(
        &mut self,
        source: GestureSource,
        piece: usize,
        event: PointerEvent,
        hold_delay: f64,
    ) -> HoldTicket {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.session = Some(InteractionSession {
            id,
            source,
            phase: GesturePhase::Pending,
            piece,
            start_position: event.position,
            last_position: event.position,
            distance_px: 0.0,
            last_move_time: event.time,
            drag_velocity: Vec3::ZERO,
        });
        HoldTicket {
            session: id,
            fire_at: event.time + hold_delay,
        }
    }

    /// Hold timer fired. Promotes the session to `Active` and returns the
    /// piece if the ticket still matches a pending, near-stationary press.
    pub fn promote(&mut self, ticket: HoldTicket, move_threshold_px: f32) -> Option<usize> {
        let session = self.session.as_mut()?;
        if session.id != ticket.session || session.phase != GesturePhase::Pending {
            return None;
        }
        if session.distance_px >= move_threshold_px {
            self.session = None;
            return None;
        }
        session.phase = GesturePhase::Active;
        Some(session.piece)
    }

    /// Record a pointer move.
    pub fn track_move(
        &mut self,
        event: PointerEvent,
        move_threshold_px: f32,
        min_dt: f32,
        max_dt: f32,
    ) -> MoveOutcome {
        let Some(session) = self.session.as_mut() else {
            return MoveOutcome::Ignored;
        };
        let pixel_delta = event.position - session.last_position;
        session.distance_px += pixel_delta.length();
        session.last_position = event.position;

        match session.phase {
            GesturePhase::Pending => {
                if session.distance_px >= move_threshold_px {
                    self.session = None;
                    MoveOutcome::Cancelled
                } else {
                    MoveOutcome::Waiting
                }
            }
            GesturePhase::Active => {
                let dt = ((event.time - session.last_move_time) as f32).clamp(min_dt, max_dt);
                session.last_move_time = event.time;
                MoveOutcome::Dragged { pixel_delta, dt }
            }
        }
    }

    /// End the session, returning it.
    pub fn end(&mut self) -> Option<InteractionSession> {
        self.session.take()
    }
}
