//! Ray casting against piece cube clusters, and screen-to-world drag scaling.

use bevy::math::{Vec2, Vec3};

use crate::camera::{CameraBasis, CameraRig, Viewport};

/// A ray with normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub piece: usize,
    /// Ray parameter of the nearest hit cube
    pub t: f32,
    pub point: Vec3,
}

/// Build the world-space ray through a point in normalized device
/// coordinates.
pub fn camera_ray(camera: &dyn CameraRig, ndc: Vec2, fov_y: f32, aspect: f32) -> Ray {
    let basis = CameraBasis::from_view(&camera.view_matrix());
    let tan_half = (fov_y * 0.5).tan();
    let direction = basis.forward
        + basis.right * (ndc.x * tan_half * aspect)
        + basis.up * (ndc.y * tan_half);
    Ray {
        origin: camera.eye_position(),
        direction: direction.normalize_or(basis.forward),
    }
}

/// Ray through a pixel of the viewport.
pub fn pointer_ray(camera: &dyn CameraRig, pixel: Vec2, viewport: Viewport, fov_y: f32) -> Ray {
    camera_ray(camera, viewport.ndc(pixel), fov_y, viewport.aspect())
}

/// Slab test against an axis-aligned cube.
///
/// Returns the entry parameter, or the exit parameter when the origin is
/// inside the cube. Hits behind the origin are ignored.
pub fn ray_cube(ray: &Ray, center: Vec3, half_extent: f32) -> Option<f32> {
    let min = center - Vec3::splat(half_extent);
    let max = center + Vec3::splat(half_extent);

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (min[axis] - o) * inv;
            let b = (max[axis] - o) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}

/// Pick the piece whose nearest cube the ray enters first.
///
/// `pieces[i]` holds piece `i`'s current world cube centers. Each cube is
/// inflated by `padding` so thin silhouettes stay easy to hit.
pub fn pick_piece(ray: &Ray, pieces: &[Vec<Vec3>], cube_size: f32, padding: f32) -> Option<PickHit> {
    let half = cube_size * 0.5 + padding;
    let mut best: Option<PickHit> = None;

    for (piece, cells) in pieces.iter().enumerate() {
        for &center in cells {
            let Some(t) = ray_cube(ray, center, half) else {
                continue;
            };
            if best.is_none_or(|b| t < b.t) {
                best = Some(PickHit {
                    piece,
                    t,
                    point: ray.at(t),
                });
            }
        }
    }
    best
}

/// World units covered by one screen pixel at `depth` in front of the eye.
pub fn world_per_pixel(depth: f32, fov_y: f32, viewport_height: f32) -> f32 {
    2.0 * depth.max(1e-3) * (fov_y * 0.5).tan() / viewport_height.max(1.0)
}

/// Project a pixel delta (y down) onto the camera plane.
pub fn drag_delta_world(basis: &CameraBasis, pixel_delta: Vec2, world_per_pixel: f32) -> Vec3 {
    (basis.right * pixel_delta.x - basis.up * pixel_delta.y) * world_per_pixel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::StaticCamera;

    fn front_camera() -> StaticCamera {
        StaticCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }

    #[test]
    fn test_center_pixel_hits_unit_cube() {
        let camera = front_camera();
        let viewport = Viewport::new(640.0, 480.0);
        let ray = pointer_ray(&camera, Vec2::new(320.0, 240.0), viewport, 45f32.to_radians());

        let hit = pick_piece(&ray, &[vec![Vec3::ZERO]], 1.0, 0.015).expect("should hit");
        assert_eq!(hit.piece, 0);
        assert!((hit.t - (5.0 - 0.515)).abs() < 1e-4, "t = {}", hit.t);
    }

    #[test]
    fn test_empty_scene_has_no_pick() {
        let camera = front_camera();
        let ray = camera_ray(&camera, Vec2::ZERO, 1.0, 1.0);
        assert!(pick_piece(&ray, &[], 1.0, 0.015).is_none());
        assert!(pick_piece(&ray, &[Vec::new()], 1.0, 0.015).is_none());
    }

    #[test]
    fn test_nearest_piece_wins() {
        let camera = front_camera();
        let ray = camera_ray(&camera, Vec2::ZERO, 1.0, 1.0);
        let pieces = vec![vec![Vec3::new(0.0, 0.0, -2.0)], vec![Vec3::new(0.0, 0.0, 1.0)]];
        assert_eq!(pick_piece(&ray, &pieces, 1.0, 0.0).unwrap().piece, 1);
    }

    #[test]
    fn test_ray_misses_offset_cube() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_cube(&ray, Vec3::new(2.0, 0.0, 0.0), 0.5).is_none());
        // Behind the origin
        assert!(ray_cube(&ray, Vec3::new(0.0, 0.0, 8.0), 0.5).is_none());
    }

    #[test]
    fn test_ray_from_inside_cube() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        assert_eq!(ray_cube(&ray, Vec3::ZERO, 0.5), Some(0.5));
    }

    #[test]
    fn test_world_per_pixel() {
        // 90 degree fov: visible height at depth 5 is 10 units
        let wpp = world_per_pixel(5.0, std::f32::consts::FRAC_PI_2, 500.0);
        assert!((wpp - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_drag_delta_follows_camera_right() {
        let camera = StaticCamera::looking_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO);
        let basis = CameraBasis::from_view(&camera.view_matrix());
        let wpp = world_per_pixel(5.0, 45f32.to_radians(), 480.0);

        let delta = drag_delta_world(&basis, Vec2::new(10.0, 0.0), wpp);
        let expected = basis.right * 10.0 * wpp;
        assert!(delta.abs_diff_eq(expected, 1e-6));

        // Screen y grows downward, world up opposes it
        let down = drag_delta_world(&basis, Vec2::new(0.0, 10.0), wpp);
        assert!(down.y < 0.0);
    }
}
