//! The camera as seen by the manipulation engine.
//!
//! The engine never moves the camera. It reads the eye and view matrix to
//! build pick rays and drag planes, and holds the input lock while a piece is
//! grabbed so the orbit controller does not rotate underneath the drag.

use bevy::math::{Mat4, Vec2, Vec3};

/// Camera interface consumed by the controller.
pub trait CameraRig {
    /// World-space eye position.
    fn eye_position(&self) -> Vec3;
    /// World-to-view matrix.
    fn view_matrix(&self) -> Mat4;
    /// Point the camera orbits around.
    fn target(&self) -> Vec3;
    /// Lock or unlock the orbit controller's own input handling.
    fn set_input_locked(&mut self, locked: bool);
    /// Whether the page (or host) is currently scrolling.
    fn is_page_scrolling(&self) -> bool {
        false
    }
}

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Normalized device coordinates of a pixel, y up.
    pub fn ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * pixel.x / self.width.max(1.0) - 1.0,
            1.0 - 2.0 * pixel.y / self.height.max(1.0),
        )
    }
}

/// Camera axes in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl CameraBasis {
    /// Read the axes out of a world-to-view matrix.
    pub fn from_view(view: &Mat4) -> Self {
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
        let back = Vec3::new(view.x_axis.z, view.y_axis.z, view.z_axis.z);
        Self {
            right,
            up,
            forward: -back,
        }
    }
}

/// A fixed camera looking at a target. Used headless and in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub input_locked: bool,
    pub page_scrolling: bool,
}

impl StaticCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            input_locked: false,
            page_scrolling: false,
        }
    }
}

impl CameraRig for StaticCamera {
    fn eye_position(&self) -> Vec3 {
        self.eye
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_input_locked(&mut self, locked: bool) {
        self.input_locked = locked;
    }

    fn is_page_scrolling(&self) -> bool {
        self.page_scrolling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_from_look_at() {
        let cam = StaticCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let basis = CameraBasis::from_view(&cam.view_matrix());
        assert!(basis.forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(basis.right.abs_diff_eq(Vec3::X, 1e-6));
        assert!(basis.up.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_basis_from_side() {
        let cam = StaticCamera::looking_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO);
        let basis = CameraBasis::from_view(&cam.view_matrix());
        assert!(basis.forward.abs_diff_eq(Vec3::NEG_X, 1e-6));
        assert!(basis.right.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_viewport_ndc() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.ndc(Vec2::new(400.0, 300.0)), Vec2::ZERO);
        assert_eq!(vp.ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_input_lock_toggles() {
        let mut cam = StaticCamera::looking_at(Vec3::Z, Vec3::ZERO);
        cam.set_input_locked(true);
        assert!(cam.input_locked);
        cam.set_input_locked(false);
        assert!(!cam.input_locked);
    }
}
