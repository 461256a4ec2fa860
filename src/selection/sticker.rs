//! Sticker placement relative to the decal target mesh.

use glam::{EulerRot, Mat4, Quat, Vec3};

pub const POSITION_LIMIT: f32 = 1.0;
pub const ROTATION_LIMIT: f32 = 180.0;
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 2.0;

/// Position, rotation (degrees, XYZ order) and uniform scale of a sticker.
///
/// Every setter clamps, so a transform is always within range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickerTransform {
    position: Vec3,
    rotation: Vec3,
    scale: f32,
}

impl Default for StickerTransform {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.25, 0.0),
            rotation: Vec3::ZERO,
            scale: 0.5,
        }
    }
}

impl StickerTransform {
    pub fn new(position: Vec3, rotation: Vec3, scale: f32) -> Self {
        let mut t = Self::default();
        t.set_position(position);
        t.set_rotation(rotation);
        t.set_scale(scale);
        t
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = sanitize(position).clamp(Vec3::splat(-POSITION_LIMIT), Vec3::splat(POSITION_LIMIT));
    }

    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = sanitize(degrees).clamp(Vec3::splat(-ROTATION_LIMIT), Vec3::splat(ROTATION_LIMIT));
    }

    pub fn set_scale(&mut self, scale: f32) {
        let scale = if scale.is_finite() { scale } else { Self::default().scale };
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn nudge(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    pub fn rotate(&mut self, delta_degrees: Vec3) {
        self.set_rotation(self.rotation + delta_degrees);
    }

    pub fn grow(&mut self, delta: f32) {
        self.set_scale(self.scale + delta);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Projector matrix `T * R * S`, mapping the unit cube onto the sticker box.
    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation * (std::f32::consts::PI / 180.0);
        let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

fn sanitize(v: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.is_finite() { v.x } else { 0.0 },
        if v.y.is_finite() { v.y } else { 0.0 },
        if v.z.is_finite() { v.z } else { 0.0 },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let t = StickerTransform::default();
        assert_eq!(t.position(), Vec3::new(0.0, 0.25, 0.0));
        assert_eq!(t.rotation(), Vec3::ZERO);
        assert_eq!(t.scale(), 0.5);
    }

    #[test]
    fn test_clamps() {
        let t = StickerTransform::new(Vec3::new(3.0, -5.0, 0.5), Vec3::new(270.0, -400.0, 10.0), 9.0);
        assert_eq!(t.position(), Vec3::new(1.0, -1.0, 0.5));
        assert_eq!(t.rotation(), Vec3::new(180.0, -180.0, 10.0));
        assert_eq!(t.scale(), 2.0);

        let mut t = StickerTransform::default();
        t.grow(-5.0);
        assert_eq!(t.scale(), MIN_SCALE);
        t.set_scale(f32::NAN);
        assert_eq!(t.scale(), 0.5);
    }

    #[test]
    fn test_nudge_and_reset() {
        let mut t = StickerTransform::default();
        for _ in 0..100 {
            t.nudge(Vec3::X * 0.05);
        }
        assert_eq!(t.position().x, 1.0);
        t.rotate(Vec3::Z * 15.0);
        t.reset();
        assert_eq!(t, StickerTransform::default());
    }

    #[test]
    fn test_matrix_order() {
        let t = StickerTransform::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 90.0), 2.0);
        let m = t.matrix();
        // Scale, then rotate +X onto +Y, then translate
        let p = m.transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((p - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-5);
    }
}
