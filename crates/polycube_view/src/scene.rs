//! Puzzle scene: piece entities, lighting and the on-screen labels.
//!
//! Each piece is a parent entity at its layout offset with one cube child per
//! lattice cell, placed at the solved cube center. Only parent translations
//! change from frame to frame.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use polycube_core::{
    AssemblySequence, ExplodeSlider, ExplodedLayout, HoldTicket, LayoutPolicy,
    ManipulationController, PuzzleKind, ReassembleButton,
};

use crate::orbit_camera::OrbitCameraBundle;

/// Which layout drives the piece transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Pieces follow the manipulation controller
    #[default]
    Interactive,
    /// Pieces drop in one by one
    Assembly,
    /// Static solution with its own explode amount
    Exploded,
}

impl ViewMode {
    /// Mode after this one in the `Tab` cycle.
    pub fn next(self) -> Self {
        match self {
            ViewMode::Interactive => ViewMode::Assembly,
            ViewMode::Assembly => ViewMode::Exploded,
            ViewMode::Exploded => ViewMode::Interactive,
        }
    }
}

/// All puzzle state shared by the viewer systems.
#[derive(Resource)]
pub struct PuzzleScene {
    pub kind: PuzzleKind,
    pub controller: ManipulationController,
    pub assembly: AssemblySequence,
    pub exploded: ExplodedLayout,
    pub mode: ViewMode,
    /// Hold timer waiting to fire
    pub pending_hold: Option<HoldTicket>,
}

impl PuzzleScene {
    pub fn layout(&self) -> &dyn LayoutPolicy {
        match self.mode {
            ViewMode::Interactive => &self.controller,
            ViewMode::Assembly => &self.assembly,
            ViewMode::Exploded => &self.exploded,
        }
    }
}

/// State pushed out by the controller through its button and slider handles.
#[derive(Resource, Clone, Default)]
pub struct AffordanceSignals {
    reassemble_visible: Arc<AtomicBool>,
    explode_bits: Arc<AtomicU32>,
}

impl AffordanceSignals {
    pub fn reassemble_visible(&self) -> bool {
        self.reassemble_visible.load(Ordering::Relaxed)
    }

    pub fn explode(&self) -> f32 {
        f32::from_bits(self.explode_bits.load(Ordering::Relaxed))
    }

    pub fn button(&self) -> Box<dyn ReassembleButton> {
        Box::new(SignalButton(self.reassemble_visible.clone()))
    }

    pub fn slider(&self) -> Box<dyn ExplodeSlider> {
        Box::new(SignalSlider(self.explode_bits.clone()))
    }
}

struct SignalButton(Arc<AtomicBool>);

impl ReassembleButton for SignalButton {
    fn set_visible(&mut self, visible: bool) {
        self.0.store(visible, Ordering::Relaxed);
    }
}

struct SignalSlider(Arc<AtomicU32>);

impl ExplodeSlider for SignalSlider {
    fn set_value(&mut self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Parent entity of one piece.
#[derive(Component)]
pub struct PieceEntity {
    pub index: usize,
    pub material: Handle<StandardMaterial>,
    pub base_color: [f32; 3],
    highlight: f32,
}

#[derive(Component)]
pub struct AffordanceText;

#[derive(Component)]
pub struct StatusText;

/// Shrink applied to each drawn cube so piece seams stay visible.
const CUBE_GAP_SCALE: f32 = 0.965;

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scene: Res<PuzzleScene>,
) {
    let controller = &scene.controller;
    let config = controller.config();
    let dim = scene.kind.dim() as f32;

    commands.spawn((
        OrbitCameraBundle::new(dim * 3.2, Vec3::ZERO),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_y,
            ..default()
        }),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 9000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 9.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    // Fill from below-behind so the shadowed faces keep some shape
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            ..default()
        },
        Transform::from_xyz(-5.0, -3.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let cube = config.cube_size;
    let mesh = meshes.add(Cuboid::new(cube, cube, cube));

    for piece in controller.pieces() {
        let (color, roughness) = match controller.wood_params(piece.index) {
            Some(wood) => (wood.tint(piece.color), wood.roughness()),
            None => (piece.color, 0.75),
        };
        let [r, g, b] = color;
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            perceptual_roughness: roughness,
            ..default()
        });

        commands
            .spawn((
                PieceEntity {
                    index: piece.index,
                    material: material.clone(),
                    base_color: color,
                    highlight: 0.0,
                },
                Name::new(format!("piece {} ({})", piece.index, piece.name)),
                Transform::default(),
                Visibility::default(),
            ))
            .with_children(|parent| {
                for &center in controller.solved_cells(piece.index) {
                    parent.spawn((
                        Mesh3d(mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(center).with_scale(Vec3::splat(CUBE_GAP_SCALE)),
                    ));
                }
            });
    }

    commands.spawn((
        AffordanceText,
        Text::new("Press R to reassemble"),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        },
        Visibility::Hidden,
    ));
    commands.spawn((
        StatusText,
        Text::new(""),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));

    info!(
        "spawned {} scene with {} pieces",
        scene.kind.name(),
        controller.piece_count()
    );
}

/// Copy layout offsets and highlights onto the piece entities.
pub fn sync_piece_transforms(
    scene: Res<PuzzleScene>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pieces: Query<(&mut PieceEntity, &mut Transform)>,
) {
    let layout = scene.layout();
    for (mut piece, mut transform) in pieces.iter_mut() {
        transform.translation = layout.piece_offset(piece.index);

        let highlight = layout.piece_highlight(piece.index);
        if highlight == piece.highlight {
            continue;
        }
        piece.highlight = highlight;
        if let Some(material) = materials.get_mut(&piece.material) {
            let [r, g, b] = piece.base_color;
            let glow = 0.35 * highlight;
            material.emissive = LinearRgba::rgb(r * glow, g * glow, b * glow);
        }
    }
}

pub fn update_labels(
    scene: Res<PuzzleScene>,
    signals: Res<AffordanceSignals>,
    mut affordance: Query<&mut Visibility, With<AffordanceText>>,
    mut status: Query<&mut Text, With<StatusText>>,
) {
    let show = scene.mode == ViewMode::Interactive && signals.reassemble_visible();
    for mut visibility in affordance.iter_mut() {
        *visibility = if show {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    let line = match scene.mode {
        ViewMode::Interactive => {
            let state = scene.controller.affordance_state();
            let activity = if state.reassembling {
                "reassembling"
            } else if state.dragging.is_some() {
                "dragging"
            } else if state.attempted {
                "hold a piece to drag it, R to reassemble"
            } else {
                "hold a piece to drag it"
            };
            format!(
                "{} | explode {:.2} | {}",
                scene.kind.name(),
                signals.explode(),
                activity
            )
        }
        ViewMode::Assembly => {
            let state = if scene.assembly.is_finished() {
                "assembled, Space to replay"
            } else {
                "assembling"
            };
            format!("{} | {}", scene.kind.name(), state)
        }
        ViewMode::Exploded => format!(
            "{} | solution view | explode {:.2}",
            scene.kind.name(),
            scene.exploded.explode
        ),
    };
    for mut text in status.iter_mut() {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_follow_handles() {
        let signals = AffordanceSignals::default();
        let mut button = signals.button();
        let mut slider = signals.slider();
        assert!(!signals.reassemble_visible());

        button.set_visible(true);
        slider.set_value(1.25);
        assert!(signals.reassemble_visible());
        assert_eq!(signals.explode(), 1.25);
    }

    #[test]
    fn test_tab_cycles_every_mode() {
        let mut mode = ViewMode::default();
        let mut seen = vec![mode];
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![
                ViewMode::Interactive,
                ViewMode::Assembly,
                ViewMode::Exploded,
                ViewMode::Interactive
            ]
        );
    }
}
