//! Sutherland–Hodgman clipping against the projector box.

use glam::Vec3;

/// A polygon vertex in projector space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl ClipVertex {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

/// Clip a convex polygon to the centred box `[-half, half]`, one plane at a
/// time. Returns an empty polygon when fewer than three vertices survive.
pub fn clip_to_box(polygon: &[ClipVertex], half: Vec3) -> Vec<ClipVertex> {
    let mut current = polygon.to_vec();
    for axis in 0..3 {
        for sign in [1.0f32, -1.0] {
            if current.len() < 3 {
                return Vec::new();
            }
            current = clip_plane(&current, axis, sign, half[axis]);
        }
    }
    if current.len() < 3 { Vec::new() } else { current }
}

/// Keep the part of the polygon where `sign * p[axis] <= limit`.
fn clip_plane(polygon: &[ClipVertex], axis: usize, sign: f32, limit: f32) -> Vec<ClipVertex> {
    let distance = |v: &ClipVertex| limit - sign * v.position[axis];
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let d_current = distance(&current);
        let d_next = distance(&next);
        let current_inside = d_current >= 0.0;

        if current_inside {
            out.push(current);
        }
        if current_inside != (d_next >= 0.0) {
            let t = d_current / (d_current - d_next);
            out.push(current.lerp(next, t));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Vec3 = Vec3::splat(0.5);

    fn poly(points: &[Vec3]) -> Vec<ClipVertex> {
        points
            .iter()
            .map(|&position| ClipVertex { position, normal: Vec3::Z })
            .collect()
    }

    #[test]
    fn test_inside_untouched() {
        let tri = poly(&[Vec3::new(-0.1, -0.1, 0.0), Vec3::new(0.1, -0.1, 0.0), Vec3::new(0.0, 0.1, 0.0)]);
        assert_eq!(clip_to_box(&tri, UNIT), tri);
    }

    #[test]
    fn test_outside_removed() {
        let tri = poly(&[Vec3::new(2.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0), Vec3::new(2.0, 3.0, 0.0)]);
        assert!(clip_to_box(&tri, UNIT).is_empty());
        let behind = poly(&[Vec3::new(0.0, 0.0, 0.9), Vec3::new(0.1, 0.0, 0.9), Vec3::new(0.0, 0.1, 0.9)]);
        assert!(clip_to_box(&behind, UNIT).is_empty());
        // A deeper box reaches it
        assert_eq!(clip_to_box(&behind, Vec3::new(0.5, 0.5, 1.0)).len(), 3);
    }

    #[test]
    fn test_large_quad_becomes_box_face() {
        let quad = poly(&[
            Vec3::new(-3.0, -3.0, 0.0),
            Vec3::new(3.0, -3.0, 0.0),
            Vec3::new(3.0, 3.0, 0.0),
            Vec3::new(-3.0, 3.0, 0.0),
        ]);
        let clipped = clip_to_box(&quad, UNIT);
        assert_eq!(clipped.len(), 4);
        for v in &clipped {
            assert!((v.position.x.abs() - 0.5).abs() < 1e-6);
            assert!((v.position.y.abs() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_partial_overlap_stays_in_box() {
        let tri = poly(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 1.5, 0.0)]);
        let clipped = clip_to_box(&tri, UNIT);
        assert!(clipped.len() >= 3);
        for v in &clipped {
            assert!(v.position.abs().max_element() <= 0.5 + 1e-6);
        }
    }
}
