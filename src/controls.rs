//! Damped orbit controller.
//!
//! Left drag orbits the camera around its target, right drag pans the target,
//! the wheel dollies in and out. Input only accumulates pending motion; each
//! call to [`OrbitControls::update`] applies `damping_factor` of what is
//! pending and lets the rest decay, which gives the eased follow-through.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Rad, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{camera::Camera, config::CameraConfig};

/// Keeps the polar angle off the poles so `look_at` never degenerates.
const POLAR_EPSILON: f32 = 1e-6;
/// Pixel distance one wheel "line" counts as.
const PIXELS_PER_LINE: f32 = 100.0;
/// Pending motion below this is snapped to zero.
const REST_THRESHOLD: f32 = 1e-7;
/// Smallest orbit radius; at zero the offset loses its direction.
const MIN_RADIUS: f32 = 1e-3;
/// Largest orbit radius, so an unbounded `max_distance` stays finite.
const MAX_RADIUS: f32 = 1e6;

/// Camera offset from the target in spherical coordinates (Y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    /// Azimuth around Y, measured from +Z towards +X.
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    fovy: Rad<f32>,
    viewport: (f32, f32),
    // pending motion
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    // pointer
    drag: Drag,
    cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            damping_factor: config.damping_factor.clamp(f32::EPSILON, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            fovy: config.fovy.into(),
            viewport: (1.0, 1.0),
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            drag: Drag::None,
            cursor: None,
        }
    }

    /// Pixel size of the surface; drag distances are relative to its height.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1) as f32, height.max(1) as f32);
    }

    /// Queue a rotation around the target's vertical axis (radians).
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Queue a rotation towards the top pole (radians).
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Queue an orbit for a pointer drag of `dx`/`dy` pixels.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        let height = self.viewport.1;
        self.rotate_left(TAU * dx / height * self.rotate_speed);
        self.rotate_up(TAU * dy / height * self.rotate_speed);
    }

    /// Queue a pan for a pointer drag of `dx`/`dy` pixels.
    ///
    /// The pan is scaled so that the point under the target follows the pointer.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, camera: &Camera) {
        let offset = camera.position - camera.target;
        let side = camera.up.cross(offset);
        if offset.magnitude2() == 0.0 || side.magnitude2() == 0.0 {
            return;
        }
        let distance = offset.magnitude() * (self.fovy.0 / 2.0).tan();
        let height = self.viewport.1;
        let forward = -offset.normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let left = -right * (2.0 * dx * distance / height * self.pan_speed);
        let upward = up * (2.0 * dy * distance / height * self.pan_speed);
        self.pan_offset += left + upward;
    }

    /// Queue a dolly. Positive `steps` move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        let per_step = 0.95f32.powf(self.zoom_speed);
        self.scale = (self.scale * per_step.powf(steps)).clamp(f32::MIN_POSITIVE, f32::MAX);
    }

    /// Feed a window event. Returns true if the controller used it.
    pub fn handle_window_event(&mut self, event: &WindowEvent, camera: &Camera) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => return false,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.cursor.replace(current);
                let Some(previous) = previous else {
                    return false;
                };
                let dx = (current.0 - previous.0) as f32;
                let dy = (current.1 - previous.1) as f32;
                match self.drag {
                    Drag::Rotate => self.rotate_by_pixels(dx, dy),
                    Drag::Pan => self.pan_by_pixels(dx, dy, camera),
                    Drag::None => return false,
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.zoom(steps);
                true
            }
            _ => false,
        }
    }

    /// Move the camera by the damped share of the pending motion.
    pub fn update(&mut self, camera: &mut Camera) {
        let factor = self.damping_factor;
        let mut spherical = Spherical::from_offset(camera.position - camera.target);

        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        // Scale is a multiplicative delta, so damp it in log space
        spherical.radius *= self.scale.powf(factor);
        spherical.radius = spherical
            .radius
            .max(self.min_distance.max(MIN_RADIUS))
            .min(self.max_distance.min(MAX_RADIUS));

        camera.target += self.pan_offset * factor;
        camera.position = camera.target + spherical.to_offset();

        self.delta_theta *= 1.0 - factor;
        self.delta_phi *= 1.0 - factor;
        self.scale = self.scale.powf(1.0 - factor);
        self.pan_offset *= 1.0 - factor;

        if self.delta_theta.abs() < REST_THRESHOLD {
            self.delta_theta = 0.0;
        }
        if self.delta_phi.abs() < REST_THRESHOLD {
            self.delta_phi = 0.0;
        }
        if (self.scale - 1.0).abs() < REST_THRESHOLD {
            self.scale = 1.0;
        }
        if self.pan_offset.magnitude2() < REST_THRESHOLD * REST_THRESHOLD {
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
    }

    #[cfg(test)]
    fn is_moving(&self) -> bool {
        self.delta_theta != 0.0
            || self.delta_phi != 0.0
            || self.scale != 1.0
            || self.pan_offset != Vector3::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    fn controls() -> (OrbitControls, Camera) {
        let config = CameraConfig::default();
        let mut controls = OrbitControls::new(&config);
        controls.resize(800, 600);
        (controls, Camera::new(config.position, config.target))
    }

    #[test]
    fn spherical_round_trips_the_start_position() {
        let offset = Vector3::new(0.0, 0.0, 5.0);
        let s = Spherical::from_offset(offset);
        assert!((s.radius - 5.0).abs() < 1e-6);
        assert!((s.phi - PI / 2.0).abs() < 1e-6);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.to_offset() - offset).magnitude() < 1e-5);
    }

    #[test]
    fn idle_update_leaves_camera_in_place() {
        let (mut controls, mut camera) = controls();
        controls.update(&mut camera);
        assert!((camera.position - Point3::new(0.0, 0.0, 5.0)).magnitude() < 1e-5);
        assert!(!controls.is_moving());
    }

    #[test]
    fn first_update_applies_only_the_damped_share() {
        let (mut controls, mut camera) = controls();
        controls.rotate_left(1.0);
        controls.update(&mut camera);
        let s = Spherical::from_offset(camera.position - camera.target);
        assert!((s.theta + 0.05).abs() < 1e-5);
        assert!(controls.is_moving());
    }

    #[test]
    fn damped_rotation_converges_and_keeps_distance() {
        let (mut controls, mut camera) = controls();
        controls.rotate_left(0.5);
        for _ in 0..2000 {
            controls.update(&mut camera);
            let distance = (camera.position - camera.target).magnitude();
            assert!((distance - 5.0).abs() < 1e-3);
        }
        let s = Spherical::from_offset(camera.position - camera.target);
        assert!((s.theta + 0.5).abs() < 1e-3);
        assert!(!controls.is_moving());
    }

    #[test]
    fn polar_angle_is_clamped_at_the_pole() {
        let (mut controls, mut camera) = controls();
        controls.rotate_up(100.0);
        for _ in 0..500 {
            controls.update(&mut camera);
        }
        assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
        assert!(camera.position.y > 4.99);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let (mut controls, mut camera) = controls();
        controls.min_distance = 2.0;
        controls.zoom(200.0);
        for _ in 0..2000 {
            controls.update(&mut camera);
        }
        let distance = (camera.position - camera.target).magnitude();
        assert!((distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zooming_all_the_way_in_and_out_keeps_camera_finite() {
        let (mut controls, mut camera) = controls();
        controls.min_distance = 0.0;
        for _ in 0..2100 {
            controls.zoom(1.0);
            controls.update(&mut camera);
        }
        let closest = (camera.position - camera.target).magnitude();
        assert!(closest > 0.0 && closest < 0.01);
        for _ in 0..2100 {
            controls.zoom(-1.0);
            controls.update(&mut camera);
        }

        let finite = |v: [f32; 3]| v.iter().all(|c| c.is_finite());
        assert!(finite(camera.position.into()));
        assert!(finite(camera.target.into()));
        let view: [[f32; 4]; 4] = camera.calc_matrix().into();
        assert!(view.iter().flatten().all(|c| c.is_finite()));
        assert!((camera.position - camera.target).magnitude() > 5.0);
    }

    #[test]
    fn pan_is_ignored_when_the_view_direction_is_undefined() {
        let (mut controls, mut camera) = controls();
        camera.position = camera.target;
        controls.pan_by_pixels(50.0, 20.0, &camera);
        // looking straight down the up axis
        camera.position = Point3::new(0.0, 5.0, 0.0);
        controls.pan_by_pixels(50.0, 20.0, &camera);
        assert!(!controls.is_moving());
    }

    #[test]
    fn camera_on_its_target_is_pushed_back_out() {
        let (mut controls, mut camera) = controls();
        camera.position = camera.target;
        controls.update(&mut camera);
        let distance = (camera.position - camera.target).magnitude();
        assert!(distance.is_finite() && distance > 0.0);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let (mut controls, mut camera) = controls();
        controls.pan_by_pixels(-100.0, 0.0, &camera);
        for _ in 0..2000 {
            controls.update(&mut camera);
        }
        assert!(camera.target.x > 0.0);
        assert!(camera.target.y.abs() < 1e-5);
        assert!(((camera.position - camera.target).magnitude() - 5.0).abs() < 1e-3);
    }
}
