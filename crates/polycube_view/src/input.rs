//! Forwarding window input to the manipulation controller.
//!
//! Mouse and single-finger touch become pointer events in logical window
//! pixels. A second finger, or the window losing focus, cancels whatever
//! gesture is in flight. The hold timer is polled every frame against the
//! app clock.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use polycube_core::{CameraRig, PointerEvent, Viewport};

use crate::orbit_camera::OrbitCamera;
use crate::scene::{PuzzleScene, ViewMode};

/// Pointer bookkeeping between frames.
#[derive(Default)]
pub struct PointerTracker {
    last_cursor: Option<Vec2>,
    touch_id: Option<u64>,
    was_focused: bool,
}

pub fn pointer_input_system(
    time: Res<Time>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut OrbitCamera>,
    mut scene: ResMut<PuzzleScene>,
    mut tracker: Local<PointerTracker>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok(mut orbit) = cameras.single_mut() else {
        return;
    };
    let camera: &mut dyn CameraRig = &mut *orbit;
    let scene = &mut *scene;
    let now = time.elapsed_secs_f64();

    scene
        .controller
        .set_viewport(Viewport::new(window.width(), window.height()));

    if tracker.was_focused && !window.focused {
        debug!("window lost focus");
        scene.controller.on_blur(camera);
        scene.pending_hold = None;
    }
    tracker.was_focused = window.focused;

    if scene.mode != ViewMode::Interactive {
        return;
    }

    // Touch
    let active_touches = touches.iter().count();
    for touch in touches.iter_just_pressed() {
        let position = touch.position();
        let event = PointerEvent::new(position.x, position.y, now);
        scene.pending_hold = scene.controller.on_touch_start(active_touches, event, camera);
        tracker.touch_id = (active_touches == 1).then(|| touch.id());
    }
    if let Some(id) = tracker.touch_id {
        if let Some(touch) = touches.get_pressed(id) {
            if touch.delta() != Vec2::ZERO {
                let position = touch.position();
                scene
                    .controller
                    .on_pointer_move(PointerEvent::new(position.x, position.y, now), camera);
            }
        } else {
            let position = touches
                .iter_just_released()
                .find(|t| t.id() == id)
                .map_or(Vec2::ZERO, |t| t.position());
            scene
                .controller
                .on_touch_end(PointerEvent::new(position.x, position.y, now), camera);
            scene.pending_hold = None;
            tracker.touch_id = None;
        }
    }
    if tracker.touch_id.is_some() {
        return;
    }

    // Mouse
    let cursor = window.cursor_position();
    if let Some(position) = cursor {
        let event = PointerEvent::new(position.x, position.y, now);
        if mouse_button.just_pressed(MouseButton::Left) {
            scene.pending_hold = scene.controller.on_pointer_down(event, camera);
        } else if mouse_button.pressed(MouseButton::Left) && tracker.last_cursor != cursor {
            scene.controller.on_pointer_move(event, camera);
        }
    }
    if mouse_button.just_released(MouseButton::Left) {
        let position = cursor.or(tracker.last_cursor).unwrap_or_default();
        scene
            .controller
            .on_pointer_up(PointerEvent::new(position.x, position.y, now), camera);
        scene.pending_hold = None;
    }
    tracker.last_cursor = cursor;
}

/// Fire the hold timer once its time has come.
pub fn hold_timer_system(
    time: Res<Time>,
    mut cameras: Query<&mut OrbitCamera>,
    mut scene: ResMut<PuzzleScene>,
) {
    let Some(ticket) = scene.pending_hold else {
        return;
    };
    if time.elapsed_secs_f64() < ticket.fire_at {
        return;
    }
    let Ok(mut orbit) = cameras.single_mut() else {
        return;
    };
    scene.pending_hold = None;
    scene.controller.on_hold_elapsed(ticket, &mut *orbit);
}

pub fn keyboard_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cameras: Query<&mut OrbitCamera>,
    mut scene: ResMut<PuzzleScene>,
) {
    let scene = &mut *scene;

    if keyboard.just_pressed(KeyCode::Tab) {
        if scene.mode == ViewMode::Interactive {
            if let Ok(mut orbit) = cameras.single_mut() {
                scene.controller.cancel_interaction(&mut *orbit);
            }
            scene.pending_hold = None;
        }
        scene.mode = scene.mode.next();
        if scene.mode == ViewMode::Assembly {
            scene.assembly.restart();
        }
        info!("view mode: {:?}", scene.mode);
    }

    match scene.mode {
        ViewMode::Interactive => {
            if keyboard.just_pressed(KeyCode::KeyR) {
                scene.pending_hold = None;
                scene.controller.start_reassemble_animation();
            }
            let step = scene.controller.config().max_explode * 0.1;
            if keyboard.just_pressed(KeyCode::ArrowUp) {
                let explode = scene.controller.explode() + step;
                scene.controller.set_explode(explode);
            }
            if keyboard.just_pressed(KeyCode::ArrowDown) {
                let explode = scene.controller.explode() - step;
                scene.controller.set_explode(explode);
            }
        }
        ViewMode::Assembly => {
            if keyboard.just_pressed(KeyCode::Space) {
                scene.assembly.restart();
            }
        }
        ViewMode::Exploded => {
            let max = scene.controller.config().max_explode;
            let step = max * 0.1;
            let layout = &mut scene.exploded;
            if keyboard.just_pressed(KeyCode::ArrowUp) {
                layout.explode = (layout.explode + step).min(max);
            }
            if keyboard.just_pressed(KeyCode::ArrowDown) {
                layout.explode = (layout.explode - step).max(0.0);
            }
        }
    }
}

/// Advance the controller (or the assembly animation) by one frame.
pub fn step_system(
    time: Res<Time>,
    mut cameras: Query<&mut OrbitCamera>,
    mut scene: ResMut<PuzzleScene>,
) {
    let dt = time.delta_secs();
    let scene = &mut *scene;
    match scene.mode {
        ViewMode::Interactive => {
            let Ok(mut orbit) = cameras.single_mut() else {
                return;
            };
            scene
                .controller
                .step(dt, time.elapsed_secs_f64(), &mut *orbit);
        }
        ViewMode::Assembly => scene.assembly.advance(dt),
        ViewMode::Exploded => {}
    }
}
