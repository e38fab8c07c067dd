//! Bevy front end for Polycube Studio.
//!
//! `PolycubeViewPlugin` loads the puzzle and configuration, spawns the scene
//! and forwards input to `polycube_core::ManipulationController`.
//!
//! Controls:
//! - Press and hold a piece, then drag: move it
//! - Left mouse drag elsewhere / scroll: orbit and zoom
//! - `R`: reassemble
//! - `Up` / `Down`: explode amount
//! - `Tab`: cycle interactive, assembly animation and solution view
//! - `Space`: replay the assembly animation

use std::path::PathBuf;

use bevy::prelude::*;
use polycube_core::{
    load_config, AssemblySequence, ExplodedLayout, ManipulationConfig, ManipulationController,
    PuzzleKind, Solution,
};

pub mod input;
pub mod orbit_camera;
pub mod scene;

pub use orbit_camera::{OrbitCamera, OrbitCameraBundle};
pub use scene::{AffordanceSignals, PieceEntity, PuzzleScene, ViewMode};

/// Seconds between consecutive pieces in the assembly animation.
const ASSEMBLY_INTERVAL: f32 = 0.55;
/// Seconds for one piece to drop into place.
const ASSEMBLY_DROP: f32 = 0.8;

pub struct PolycubeViewPlugin {
    pub kind: PuzzleKind,
    /// JSON file with `ManipulationConfig` overrides
    pub config_path: Option<PathBuf>,
}

impl PolycubeViewPlugin {
    fn load_config(&self) -> ManipulationConfig {
        let Some(path) = &self.config_path else {
            return ManipulationConfig::default();
        };
        match load_config(path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}: {}, using defaults", path.display(), e);
                ManipulationConfig::default()
            }
        }
    }
}

impl Plugin for PolycubeViewPlugin {
    fn build(&self, app: &mut App) {
        let config = self.load_config();
        let solution = match Solution::first(self.kind) {
            Ok(solution) => solution,
            Err(e) => {
                error!("no usable {} solution: {}", self.kind.name(), e);
                return;
            }
        };

        let order: Vec<usize> = solution.entries.iter().map(|e| e.piece).collect();
        let lift = Vec3::Y * (self.kind.dim() as f32 + 2.0) * config.cube_size;
        let assembly = AssemblySequence::new(&order, lift, ASSEMBLY_INTERVAL, ASSEMBLY_DROP);

        let signals = AffordanceSignals::default();
        let mut controller = ManipulationController::new(&solution, config);
        let solved: Vec<Vec<Vec3>> = (0..controller.piece_count())
            .map(|i| controller.solved_cells(i).to_vec())
            .collect();
        let wood = controller.pieces().iter().map(|p| p.wood).collect();
        let exploded = ExplodedLayout::new(&solved, wood, controller.config().explode_scale);
        controller.set_reassemble_button(signals.button());
        controller.set_explode_slider(signals.slider());

        app.insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
            .insert_resource(signals)
            .insert_resource(PuzzleScene {
                kind: self.kind,
                controller,
                assembly,
                exploded,
                mode: ViewMode::Interactive,
                pending_hold: None,
            })
            .add_systems(Startup, scene::setup_scene)
            .add_systems(
                Update,
                (
                    input::keyboard_system,
                    input::pointer_input_system,
                    input::hold_timer_system,
                    input::step_system,
                    orbit_camera::orbit_camera_system,
                    scene::sync_piece_transforms,
                    scene::update_labels,
                )
                    .chain(),
            );
    }
}
