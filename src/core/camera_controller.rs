//! Orbit camera controller

use crate::core::camera::Camera;
use crate::core::input::InputState;
use crate::core::types::Vec3;
use winit::event::MouseButton;

/// Keeps the camera off the poles so `look_at` has a valid up vector
const PITCH_LIMIT: f32 = 1.45;

/// Orbit-style controller: left drag orbits around the target, the wheel zooms
pub struct OrbitCameraController {
    /// Point the camera circles
    pub target: Vec3,
    /// Radians of rotation per pixel of drag
    pub sensitivity: f32,
    /// Fractional distance change per wheel line
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Current yaw (rotation around Y axis) in radians
    yaw: f32,
    /// Current pitch (elevation) in radians
    pitch: f32,
    distance: f32,
}

impl OrbitCameraController {
    /// Create new controller at the given distance from the origin
    pub fn new(distance: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            min_distance: 1.5,
            max_distance: 20.0,
            yaw: 0.6,
            pitch: 0.35,
            distance,
        }
    }

    /// Update camera based on input
    pub fn update(&mut self, camera: &mut Camera, input: &InputState) {
        if input.is_mouse_button_pressed(MouseButton::Left) {
            let (dx, dy) = input.cursor_delta();
            self.orbit(dx * self.sensitivity, dy * self.sensitivity);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            self.zoom(scroll);
        }

        self.apply(camera);
    }

    /// Rotate by the given yaw/pitch deltas in radians
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw -= d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move toward (positive) or away from (negative) the target
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_speed).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Camera position for the current orbit state
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    /// Place the camera at the current orbit position
    pub fn apply(&self, camera: &mut Camera) {
        camera.set_look_at(self.eye(), self.target, Vec3::Y);
    }

    /// Current distance from the target
    pub fn distance(&self) -> f32 {
        self.distance
    }
}

impl Default for OrbitCameraController {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_distance_matches() {
        let controller = OrbitCameraController::new(4.0);
        assert!((controller.eye().length() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut controller = OrbitCameraController::default();
        controller.orbit(0.0, 10.0);
        let eye = controller.eye();
        let elevation = (eye.y / eye.length()).asin();
        assert!(elevation <= PITCH_LIMIT + 1e-5);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut controller = OrbitCameraController::new(5.0);
        for _ in 0..100 {
            controller.zoom(1.0);
        }
        assert_eq!(controller.distance(), controller.min_distance);
        for _ in 0..100 {
            controller.zoom(-1.0);
        }
        assert_eq!(controller.distance(), controller.max_distance);
    }

    #[test]
    fn test_apply_looks_at_target() {
        let controller = OrbitCameraController::new(5.0);
        let mut camera = Camera::default();
        controller.apply(&mut camera);
        let to_target = (controller.target - camera.position).normalize();
        assert!((camera.forward() - to_target).length() < 1e-4);
    }
}
