//! End-to-end manipulation scenarios against the bundled puzzles.
//!
//! Each test drives `ManipulationController` the way the viewer does: pointer
//! events in window pixels, a `StaticCamera` standing in for the orbit camera
//! and fixed 60 Hz frame ticks.
//!
//! Run with: `cargo test --test manipulation_scenarios`

use bevy::math::{Vec2, Vec3};
use polycube_core::{
    contact, integrate_spring, load_config, pick_piece, pointer_ray, settle, substeps,
    ManipulationConfig, ManipulationController, PieceState, PointerEvent, PuzzleKind, Ray,
    Solution, StaticCamera, StruggleDetector, StruggleSample, Viewport,
};

const FRAME: f32 = 1.0 / 60.0;

fn controller(kind: PuzzleKind) -> ManipulationController {
    let solution = Solution::first(kind).expect("bundled solution");
    let mut controller = ManipulationController::new(&solution, ManipulationConfig::default());
    controller.set_viewport(Viewport::new(1024.0, 768.0));
    controller
}

fn front_camera() -> StaticCamera {
    StaticCamera::looking_at(Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO)
}

/// Step at 60 Hz from `*t` for `seconds`.
fn run(controller: &mut ManipulationController, camera: &mut StaticCamera, t: &mut f64, seconds: f64) {
    let end = *t + seconds;
    while *t < end {
        *t += FRAME as f64;
        controller.step(FRAME, *t, camera);
    }
}

#[test]
fn test_contact_between_overlapping_cubes() {
    let a = [Vec3::ZERO];
    let b = [Vec3::new(0.9, 0.0, 0.0)];
    let hit = contact(&a, &b, 1.0, 0.03).expect("overlapping cubes touch");
    assert!(hit.normal.abs_diff_eq(Vec3::X, 1e-6));
    assert!((hit.penetration - 0.1).abs() < 1e-5);

    let far = [Vec3::new(1.5, 0.0, 0.0)];
    assert!(contact(&a, &far, 1.0, 0.03).is_none());
}

#[test]
fn test_fully_overlapping_pieces() {
    let cells = [Vec3::ZERO, Vec3::X];
    let hit = contact(&cells, &cells, 1.0, 0.03).expect("identical clusters overlap");
    assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    assert!((hit.penetration - 1.0).abs() < 1e-5);
}

#[test]
fn test_spring_converges_within_three_seconds() {
    let config = ManipulationConfig {
        spring_strength: 20.0,
        linear_damping: 8.0,
        gravity_strength: 0.0,
        ..Default::default()
    };
    let mut state = PieceState::at_offset(Vec3::new(2.0, 0.0, 0.0));
    for _ in 0..180 {
        let (count, slice) = substeps(FRAME, config.max_substep, config.max_substeps);
        for _ in 0..count {
            integrate_spring(&mut state, slice, &config);
        }
        settle(&mut state, &config);
    }
    assert!(state.offset.length() < 0.01);
}

#[test]
fn test_center_click_picks_single_cube() {
    let camera = StaticCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
    let viewport = Viewport::new(800.0, 600.0);
    let config = ManipulationConfig::default();
    let ray = pointer_ray(&camera, Vec2::new(400.0, 300.0), viewport, config.fov_y);

    let hit = pick_piece(&ray, &[vec![Vec3::ZERO]], 1.0, config.pick_padding);
    assert_eq!(hit.map(|h| h.piece), Some(0));
    assert!(pick_piece(&ray, &[], 1.0, config.pick_padding).is_none());
}

#[test]
fn test_pick_returns_nearest_piece() {
    let near = vec![Vec3::ZERO];
    let far = vec![Vec3::new(0.0, 0.0, -2.0)];
    let ray = Ray {
        origin: Vec3::new(0.0, 0.0, 10.0),
        direction: Vec3::NEG_Z,
    };
    let hit = pick_piece(&ray, &[far, near], 1.0, 0.0).expect("ray hits both pieces");
    assert_eq!(hit.piece, 1);
    assert!((hit.t - 9.5).abs() < 1e-5);
}

#[test]
fn test_solved_puzzles_have_no_excess() {
    for kind in [PuzzleKind::Blocker, PuzzleKind::Bedlam] {
        let mut controller = controller(kind);
        assert_eq!(controller.bounding_excess(), 0.0, "{:?}", kind);
        controller.set_explode(1.0);
        assert_eq!(controller.bounding_excess(), 0.0, "{:?} exploded", kind);
    }
}

#[test]
fn test_hold_then_drag_moves_piece_right() {
    let mut controller = controller(PuzzleKind::Bedlam);
    let mut camera = front_camera();
    let mut t = 0.0;
    run(&mut controller, &mut camera, &mut t, 0.1);

    let center = Vec2::new(512.0, 384.0);
    let ticket = controller
        .on_pointer_down(PointerEvent::new(center.x, center.y, t), &mut camera)
        .expect("the cube fills the middle of the screen");

    // Released before the hold fires: a tap, nothing grabbed
    controller.on_pointer_up(PointerEvent::new(center.x, center.y, t + 0.05), &mut camera);
    assert!(!controller.on_hold_elapsed(ticket, &mut camera));

    let ticket = controller
        .on_pointer_down(PointerEvent::new(center.x, center.y, t), &mut camera)
        .expect("second press hits too");
    t = ticket.fire_at;
    assert!(controller.on_hold_elapsed(ticket, &mut camera));
    let piece = controller.dragging_piece().expect("grabbed");
    assert!(camera.input_locked);

    controller.on_pointer_move(PointerEvent::new(center.x + 10.0, center.y, t + 0.02), &mut camera);
    let offset = controller.piece_state(piece).expect("piece state").offset;
    assert!(offset.x > 0.0);
    assert!(offset.y.abs() < 1e-5 && offset.z.abs() < 1e-5);

    controller.on_pointer_up(PointerEvent::new(center.x + 10.0, center.y, t + 0.04), &mut camera);
    assert!(!camera.input_locked);
}

#[test]
fn test_drag_pushes_neighbors_then_cube_resettles() {
    let mut controller = controller(PuzzleKind::Blocker);
    let mut camera = front_camera();
    let mut t = 0.0;

    let center = Vec2::new(512.0, 384.0);
    let ticket = controller
        .on_pointer_down(PointerEvent::new(center.x, center.y, t), &mut camera)
        .expect("hit");
    assert!(controller.on_hold_elapsed(ticket, &mut camera));
    let piece = controller.dragging_piece().expect("grabbed");

    // Sweep the held piece sideways through its neighbors
    for i in 1..=20 {
        t += FRAME as f64;
        let x = center.x + 6.0 * i as f32;
        controller.on_pointer_move(PointerEvent::new(x, center.y, t), &mut camera);
        controller.step(FRAME, t, &mut camera);
    }
    let shoved = (0..controller.piece_count())
        .filter(|&i| i != piece)
        .any(|i| controller.piece_state(i).is_some_and(|s| s.offset != Vec3::ZERO));
    assert!(shoved, "dragging into the cube moves other pieces");

    controller.on_pointer_up(PointerEvent::new(center.x + 120.0, center.y, t), &mut camera);
    assert!(!camera.input_locked);
    assert!(controller.dragging_piece().is_none());

    // Springs alone bring the cube back to exactly solved
    run(&mut controller, &mut camera, &mut t, 4.0);
    for i in 0..controller.piece_count() {
        let state = controller.piece_state(i).expect("state");
        assert!(state.is_at_rest(), "piece {} resting at {:?}", i, state.offset);
    }
    assert_eq!(controller.bounding_excess(), 0.0);

    // Reassembly from rest is still a clean no-op
    assert!(controller.start_reassemble_animation());
    run(&mut controller, &mut camera, &mut t, 3.0);
    for i in 0..controller.piece_count() {
        assert_eq!(controller.piece_state(i).expect("state").offset, Vec3::ZERO);
    }
}

#[test]
fn test_reassembly_restores_solved_cube() {
    let mut controller = controller(PuzzleKind::Bedlam);
    let mut camera = front_camera();
    let mut t = 0.0;

    controller.set_explode(1.5);
    controller.displace_piece(0, Vec3::new(0.0, 0.0, 4.0));
    controller.displace_piece(7, Vec3::new(-3.0, 1.0, 0.0));
    controller.step(FRAME, t, &mut camera);

    assert!(controller.start_reassemble_animation());
    assert!(!controller.start_reassemble_animation(), "second start is a no-op");
    assert!(controller.affordance_state().reassembling);

    run(&mut controller, &mut camera, &mut t, 3.0);
    assert!(!controller.is_reassembling());
    assert_eq!(controller.explode(), 0.0);
    for i in 0..controller.piece_count() {
        assert_eq!(controller.piece_state(i).expect("state").offset, Vec3::ZERO);
    }
    assert_eq!(controller.bounding_excess(), 0.0);
}

#[test]
fn test_affordance_hysteresis_through_explode() {
    let mut controller = controller(PuzzleKind::Blocker);
    let mut camera = front_camera();
    let config = controller.config().clone();
    let mut t = 0.0;

    controller.set_explode(1.0);
    run(&mut controller, &mut camera, &mut t, config.settle_delay_sec + 0.2);
    assert!(controller.affordance_state().reassemble_visible);

    // Collapsing immediately does not hide it before the minimum visible time
    controller.set_explode(0.0);
    run(&mut controller, &mut camera, &mut t, 0.5);
    assert!(controller.affordance_state().reassemble_visible);

    run(
        &mut controller,
        &mut camera,
        &mut t,
        config.min_visible_sec + config.hide_debounce_sec + 0.2,
    );
    assert!(!controller.affordance_state().reassemble_visible);
}

#[test]
fn test_detector_ignores_brief_excess_spikes() {
    let config = ManipulationConfig::default();
    let mut detector = StruggleDetector::new();
    let mut t = 0.0;
    // Excess only while pieces are moving
    for frame in 0..300 {
        let moving = frame % 30 < 25;
        detector.update(
            StruggleSample {
                now: t,
                excess: if moving { 1.0 } else { 0.0 },
                moving,
                ..Default::default()
            },
            &config,
        );
        t += FRAME as f64;
    }
    assert!(!detector.is_visible());
}

#[test]
fn test_config_file_drives_controller() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("polycube.json");
    std::fs::write(&path, r#"{ "explode_scale": 3.0, "max_explode": 1.0 }"#).expect("write");

    let config = load_config(&path).expect("valid config");
    assert_eq!(config.explode_scale, 3.0);
    assert_eq!(config.spring_strength, ManipulationConfig::default().spring_strength);

    let solution = Solution::first(PuzzleKind::Blocker).expect("bundled");
    let mut controller = ManipulationController::new(&solution, config);
    controller.set_explode(4.0);
    assert_eq!(controller.explode(), 1.0);
}
