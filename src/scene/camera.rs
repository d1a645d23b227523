//! Perspective camera, pointer rays and orbit controls

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::{cartesian_to_spherical, spherical_to_cartesian};

/// A half-line with unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first intersection with a sphere, if any.
    /// A ray starting inside the sphere hits at distance 0.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let t_near = -b - sqrt_disc;
        let t_far = -b + sqrt_disc;
        if t_far < 0.0 {
            None
        } else {
            Some(t_near.max(0.0))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 35.0, 45.0),
            target: Vec3::ZERO,
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the camera through normalized device coordinates in [-1, 1]²
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - near)
    }

    /// Project a world point to NDC; `None` when behind the camera.
    /// Returns (ndc.xy, view depth).
    pub fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= self.near {
            return None;
        }
        Some((Vec2::new(clip.x / clip.w, clip.y / clip.w), clip.w))
    }

    /// World units per NDC unit (vertical) at the given view depth
    pub fn ndc_scale_at(&self, depth: f32) -> f32 {
        1.0 / (depth * (self.fov_y / 2.0).tan())
    }
}

/// Damped orbit around a target point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitControls {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of pending motion applied per update
    pub damping: f32,
    /// Radians per NDC unit of pointer drag
    pub rotate_speed: f32,
    yaw_pending: f32,
    pitch_pending: f32,
    zoom_pending: f32,
    initial: (f32, f32, f32),
}

const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

impl OrbitControls {
    /// Controls starting from the camera's current pose
    pub fn from_camera(camera: &Camera) -> Self {
        let (yaw, pitch, distance) = cartesian_to_spherical(camera.position - camera.target);
        let pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        Self {
            target: camera.target,
            yaw,
            pitch,
            distance,
            min_distance: 15.0,
            max_distance: 200.0,
            damping: 0.05,
            rotate_speed: std::f32::consts::PI,
            yaw_pending: 0.0,
            pitch_pending: 0.0,
            zoom_pending: 0.0,
            initial: (yaw, pitch, distance),
        }
    }

    /// Queue a rotation from a pointer drag (NDC delta)
    pub fn rotate(&mut self, drag: Vec2) {
        self.yaw_pending -= drag.x * self.rotate_speed;
        self.pitch_pending -= drag.y * self.rotate_speed;
    }

    /// Queue a zoom; positive steps move away
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_pending += steps;
    }

    /// Back to the pose the controls were created with
    pub fn reset(&mut self) {
        (self.yaw, self.pitch, self.distance) = self.initial;
        self.yaw_pending = 0.0;
        self.pitch_pending = 0.0;
        self.zoom_pending = 0.0;
    }

    /// Apply damped motion and write the camera pose
    pub fn update(&mut self, camera: &mut Camera) {
        let yaw_step = self.yaw_pending * self.damping;
        let pitch_step = self.pitch_pending * self.damping;
        let zoom_step = self.zoom_pending * self.damping;
        self.yaw_pending -= yaw_step;
        self.pitch_pending -= pitch_step;
        self.zoom_pending -= zoom_step;

        self.yaw += yaw_step;
        self.pitch = (self.pitch + pitch_step).clamp(MIN_PITCH, MAX_PITCH);
        self.distance = (self.distance * 1.1f32.powf(zoom_step))
            .clamp(self.min_distance, self.max_distance);

        camera.target = self.target;
        camera.position = self.target + spherical_to_cartesian(self.yaw, self.pitch, self.distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_sphere(Vec3::new(10.0, 0.0, 0.0), 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);

        assert!(ray.intersect_sphere(Vec3::new(10.0, 5.0, 0.0), 2.0).is_none());
        // Sphere behind the origin
        assert!(ray.intersect_sphere(Vec3::new(-10.0, 0.0, 0.0), 2.0).is_none());
        // Origin inside the sphere
        assert_eq!(ray.intersect_sphere(Vec3::ZERO, 1.0), Some(0.0));
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let expected = (camera.target - camera.position).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_project_target_lands_at_center() {
        let camera = Camera::default();
        let (ndc, depth) = camera.project(camera.target).unwrap();
        assert!(ndc.length() < 1e-4);
        assert!(depth > 0.0);

        // Behind the camera
        let behind = camera.position + (camera.position - camera.target);
        assert!(camera.project(behind).is_none());
    }

    #[test]
    fn test_project_and_ray_agree() {
        let camera = Camera::default();
        let point = Vec3::new(5.0, 0.0, -3.0);
        let (ndc, _) = camera.project(point).unwrap();
        let ray = camera.ray_from_ndc(ndc);
        let to_point = (point - camera.position).normalize();
        assert!(ray.direction.dot(to_point) > 0.9999);
    }

    #[test]
    fn test_orbit_controls_preserve_initial_pose() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controls = OrbitControls::from_camera(&camera);
        controls.update(&mut camera);
        assert!((camera.position - start).length() < 1e-3);
    }

    #[test]
    fn test_orbit_controls_damped_rotation_and_reset() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let start_yaw = controls.yaw;

        controls.rotate(Vec2::new(0.5, 0.0));
        controls.update(&mut camera);
        let first = controls.yaw - start_yaw;
        controls.update(&mut camera);
        let second = controls.yaw - start_yaw - first;

        // Motion is spread over frames and decays
        assert!(first.abs() > 0.0);
        assert!(second.abs() < first.abs());

        controls.reset();
        controls.update(&mut camera);
        assert!((controls.yaw - start_yaw).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        controls.zoom(1000.0);
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(controls.distance <= controls.max_distance);
        assert!((camera.position - camera.target).length() <= controls.max_distance + 1e-3);
    }
}
