//! Core engine for Polycube Studio.
//!
//! This crate provides:
//! - Piece catalogs and bundled solutions for the Blocker and Bedlam cubes
//! - Cube rotations and lattice geometry
//! - Contact detection and collision response between polycube pieces
//! - A spring-damper integrator that pulls pieces back to their solved spots
//! - Press-and-hold drag gestures and ray picking
//! - Struggle detection for the reassemble affordance
//! - Staggered reassembly animation and layout policies
//! - Configuration management
//!
//! Nothing here depends on a window or renderer; `polycube_view` wires it into
//! a Bevy app.

pub mod bounds;
pub mod camera;
pub mod collision;
pub mod config;
pub mod contact;
pub mod controller;
pub mod geometry;
pub mod integrator;
pub mod interaction;
pub mod layout;
pub mod pick;
pub mod pieces;
pub mod reassemble;
pub mod solution;
pub mod struggle;

pub use bounds::{bounding_volume, cube_bounds, excess_ratio, Aabb};
pub use camera::{CameraBasis, CameraRig, StaticCamera, Viewport};
pub use collision::{offset_cells, resolve_drag_contacts, resolve_pack_out};
pub use config::{load_config, ConfigError, ConfigResult, ManipulationConfig};
pub use contact::{contact, Contact};
pub use controller::{AffordanceState, ExplodeSlider, ManipulationController, ReassembleButton};
pub use geometry::{
    centroid, identify_rotation, lattice_to_world, normalize, orientations, place, CubeRotation,
    ROTATION_COUNT,
};
pub use integrator::{decay_drag_velocity, integrate_spring, settle, substeps, PieceState};
pub use interaction::{
    GesturePhase, GestureSource, HoldTicket, Interaction, InteractionSession, MoveOutcome,
    PointerEvent, SessionId,
};
pub use layout::{explode_directions, AssemblySequence, ExplodedLayout, LayoutPolicy};
pub use pick::{
    camera_ray, drag_delta_world, pick_piece, pointer_ray, ray_cube, world_per_pixel, PickHit, Ray,
};
pub use pieces::{build_pieces, Piece, PieceShape, WoodParams, BEDLAM_PIECES, BLOCKER_PIECES};
pub use reassemble::{ease_in_out_cubic, ReassembleAnimation, ReassembleFrame};
pub use solution::{PuzzleKind, Solution, SolutionEntry, SolutionError, SolutionResult};
pub use struggle::{StruggleDetector, StruggleSample};
