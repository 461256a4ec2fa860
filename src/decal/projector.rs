//! Decal geometry: the target surface cut out by the sticker's box.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::scene::{MeshInstance, Primitive, SceneGraph};
use crate::selection::StickerTransform;

use super::clip::{ClipVertex, clip_to_box};

/// How far the projector reaches either side of the sticker plane, in the
/// target's local units
pub const PROJECTION_REACH: f32 = 2.0;

/// Surface the sticker is projected onto, fixed for a model's lifetime.
#[derive(Clone, Copy, Debug)]
pub struct DecalTarget {
    pub instance: MeshInstance,
    /// Index of the primitive within the mesh
    pub primitive: usize,
}

impl DecalTarget {
    /// First primitive of the first mesh met in depth-first order.
    pub fn find(graph: &SceneGraph) -> Option<Self> {
        graph
            .first_primitive()
            .map(|(instance, _)| Self { instance, primitive: 0 })
    }

    pub fn primitive<'a>(&self, graph: &'a SceneGraph) -> Option<&'a Primitive> {
        graph
            .mesh(self.instance.mesh)?
            .primitives
            .get(self.primitive)
    }
}

/// Triangle list ready for upload, in model space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecalMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl DecalMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Project the sticker onto `primitive`.
///
/// The projector lives in the primitive's local space and looks down its own
/// -Z axis. Its box is one unit wide and tall before scaling and
/// [`PROJECTION_REACH`] deep on each side; only triangles facing the
/// projector are kept. `world` maps the local space to model space and is
/// baked into the output. `None` when nothing is hit.
pub fn project(primitive: &Primitive, world: Mat4, transform: &StickerTransform) -> Option<DecalMesh> {
    let projector = transform.matrix();
    let inverse = projector.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let to_model = world * projector;
    let normal_to_projector = Mat3::from_mat4(projector).transpose();
    let normal_to_model = Mat3::from_mat4(to_model).inverse().transpose();
    let half = Vec3::new(0.5, 0.5, PROJECTION_REACH / transform.scale());

    let mut mesh = DecalMesh::default();
    for [a, b, c] in primitive.triangles() {
        let triangle: Vec<ClipVertex> = [a, b, c]
            .iter()
            .map(|&i| ClipVertex {
                position: inverse.transform_point3(primitive.positions[i]),
                normal: normal_to_projector * primitive.normals[i],
            })
            .collect();
        let facing = (triangle[1].position - triangle[0].position)
            .cross(triangle[2].position - triangle[0].position);
        if facing.z <= 0.0 {
            continue;
        }
        let polygon = clip_to_box(&triangle, half);
        if polygon.len() < 3 {
            continue;
        }

        let base = mesh.positions.len() as u32;
        for v in &polygon {
            mesh.positions.push(to_model.transform_point3(v.position));
            mesh.normals.push((normal_to_model * v.normal).normalize_or_zero());
            // Image v runs downward while projector y runs up
            mesh.uvs.push(Vec2::new(v.position.x + 0.5, 0.5 - v.position.y));
        }
        for i in 1..polygon.len() as u32 - 1 {
            mesh.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }
    (!mesh.is_empty()).then_some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MaterialId;

    /// Flat 2x2 quad in the XY plane facing +Z
    fn plane() -> Primitive {
        Primitive::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            None,
            None,
            Some(vec![0, 1, 2, 0, 2, 3]),
            MaterialId(0),
        )
    }

    #[test]
    fn test_projects_square_patch() {
        let t = StickerTransform::new(Vec3::ZERO, Vec3::ZERO, 0.5);
        let decal = project(&plane(), Mat4::IDENTITY, &t).unwrap();
        let bounds = crate::math::Aabb::from_points(decal.positions.iter().copied()).unwrap();
        assert!((bounds.size().x - 0.5).abs() < 1e-5);
        assert!((bounds.size().y - 0.5).abs() < 1e-5);
        for uv in &decal.uvs {
            assert!(uv.x >= -1e-6 && uv.x <= 1.0 + 1e-6);
            assert!(uv.y >= -1e-6 && uv.y <= 1.0 + 1e-6);
        }
        for n in &decal.normals {
            assert!((*n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_offset_and_world_baked() {
        let t = StickerTransform::new(Vec3::new(0.5, 0.25, 0.0), Vec3::ZERO, 0.2);
        let world = Mat4::from_scale(Vec3::splat(2.0));
        let decal = project(&plane(), world, &t).unwrap();
        let center = crate::math::Aabb::from_points(decal.positions.iter().copied())
            .unwrap()
            .center();
        assert!((center - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_reaches_surface_off_the_sticker_plane() {
        let t = StickerTransform::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO, 0.5);
        assert!(project(&plane(), Mat4::IDENTITY, &t).is_some());
    }

    #[test]
    fn test_miss_returns_none() {
        // Box beside the plane
        let t = StickerTransform::new(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO, 0.5);
        let small = Primitive::new(
            plane().positions.iter().map(|p| *p * 0.25).collect(),
            None,
            None,
            Some(vec![0, 1, 2, 0, 2, 3]),
            MaterialId(0),
        );
        assert!(project(&small, Mat4::IDENTITY, &t).is_none());
    }

    #[test]
    fn test_back_faces_skipped() {
        let mut back = plane();
        back.indices = vec![0, 2, 1, 0, 3, 2];
        let t = StickerTransform::default();
        assert!(project(&back, Mat4::IDENTITY, &t).is_none());
    }

    #[test]
    fn test_cube_gets_front_face_only() {
        let graph = crate::assets::builtin::model("cube").unwrap();
        let (instance, primitive) = graph.first_primitive().unwrap();
        let decal = project(primitive, instance.world, &StickerTransform::default()).unwrap();
        for p in &decal.positions {
            assert!((p.z - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rotation_turns_uvs() {
        let t = StickerTransform::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 90.0), 1.0);
        let decal = project(&plane(), Mat4::IDENTITY, &t).unwrap();
        // The image top (v = 0) now points toward -X
        for (p, uv) in decal.positions.iter().zip(&decal.uvs) {
            if uv.y < 1e-4 {
                assert!((p.x + 0.5).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_target_is_first_primitive() {
        let graph = crate::assets::builtin::model("cube").unwrap();
        let target = DecalTarget::find(&graph).unwrap();
        assert_eq!(target.primitive, 0);
        assert!(target.primitive(&graph).is_some());
        assert!(DecalTarget::find(&SceneGraph::new()).is_none());
    }
}
