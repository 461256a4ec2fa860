//! Mesh and material data for a loaded model.

use glam::{Vec2, Vec3, Vec4};

use crate::assets::texture::TextureHandle;
use crate::math::Aabb;

/// Index of a mesh within its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Index of a material within its model. Material identity is scoped to the
/// loaded model; a new model starts a new id space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Surface description as authored in the asset.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    /// Linear RGBA multiplier
    pub base_color_factor: Vec4,
    /// Authored base colour map
    pub base_color_texture: Option<TextureHandle>,
    /// `None` when the source material has no PBR parameters (e.g. unlit)
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
}

impl Material {
    /// Plain white material without PBR parameters
    pub fn untextured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            metalness: None,
            roughness: None,
        }
    }
}

/// One drawable triangle list.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub material: MaterialId,
}

impl Primitive {
    /// Build a primitive, filling in whatever the source left out: sequential
    /// indices, area-weighted vertex normals, and zero texture coordinates.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        indices: Option<Vec<u32>>,
        material: MaterialId,
    ) -> Self {
        let vertex_count = positions.len();
        let indices = indices.unwrap_or_else(|| (0..vertex_count as u32).collect());
        let normals = match normals {
            Some(n) if n.len() == vertex_count => n,
            _ => compute_vertex_normals(&positions, &indices),
        };
        let uvs = match uvs {
            Some(uv) if uv.len() == vertex_count => uv,
            _ => vec![Vec2::ZERO; vertex_count],
        };
        Self {
            positions,
            normals,
            uvs,
            indices,
            material,
        }
    }

    /// Triangles as index triples. Out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let count = self.positions.len();
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .filter(move |t| t.iter().all(|&i| i < count))
    }

    /// Local-space bounds, `None` without vertices
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }
}

/// A named group of primitives.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        // Cross product length is twice the area, which weights the sum
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Primitive {
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
    fn test_missing_normals_are_computed() {
        let p = quad();
        for n in &p.normals {
            assert!((*n - Vec3::Z).length() < 1e-5);
        }
        assert_eq!(p.uvs, vec![Vec2::ZERO; 4]);
    }

    #[test]
    fn test_missing_indices_are_sequential() {
        let p = Primitive::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
            None,
            MaterialId(0),
        );
        assert_eq!(p.indices, vec![0, 1, 2]);
        assert_eq!(p.triangles().count(), 1);
    }

    #[test]
    fn test_out_of_range_triangles_skipped() {
        let mut p = quad();
        p.indices.extend_from_slice(&[0, 1, 99]);
        assert_eq!(p.triangles().count(), 2);
    }

    #[test]
    fn test_bounds() {
        let b = quad().bounds().unwrap();
        assert_eq!(b.size(), Vec3::new(2.0, 2.0, 0.0));
    }
}
