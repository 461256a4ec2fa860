//! Procedural built-in assets addressed by `builtin:<name>` URLs.
//!
//! These let the viewer run with no asset files on disk.

use glam::{Vec2, Vec3};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::scene::{Material, Mesh, NodeContent, Primitive, SceneGraph};

use super::texture::{ColorSpace, TextureImage};

/// URL scheme prefix of procedural assets
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Name part of a `builtin:` URL
pub fn builtin_name(url: &str) -> Option<&str> {
    url.strip_prefix(BUILTIN_PREFIX)
}

/// Generate a procedural image, `None` for an unknown name.
pub fn image(name: &str) -> Option<TextureImage> {
    let key = format!("{}{}", BUILTIN_PREFIX, name);
    let (size, texels) = match name {
        "uv-grid" => (256, uv_grid(256)),
        "brushed-metal" => (256, brushed_metal(256)),
        "checker" => (256, checker(256)),
        "sticker-star" => (128, star(128)),
        _ => return None,
    };
    TextureImage::new(key, size, size, texels, ColorSpace::Srgb).ok()
}

/// Generate a procedural model, `None` for an unknown name.
///
/// Models span `[-1, 1]` on every axis, the same range sticker positions use.
pub fn model(name: &str) -> Option<SceneGraph> {
    let primitive_fn: fn(crate::scene::MaterialId) -> Primitive = match name {
        "cube" => cube,
        "sphere" => |m| uv_sphere(m, 48, 24),
        _ => return None,
    };
    let mut graph = SceneGraph::new();
    let material = graph.add_material(Material::untextured(name));
    let mesh = graph.add_mesh(Mesh {
        name: name.to_string(),
        primitives: vec![primitive_fn(material)],
    });
    let root = graph.root();
    graph.add_child(root, name, NodeContent::Mesh(mesh));
    Some(graph)
}

fn uv_grid(size: u32) -> Vec<u8> {
    let cell = size / 8;
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let line = x % cell < 2 || y % cell < 2;
            if line {
                out.extend_from_slice(&[245, 245, 245, 255]);
            } else {
                let u = x as f32 / size as f32;
                let v = y as f32 / size as f32;
                let r = (40.0 + 200.0 * u) as u8;
                let g = (40.0 + 200.0 * (1.0 - v)) as u8;
                let b = (90.0 + 120.0 * (1.0 - u) * v) as u8;
                out.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }
    out
}

fn brushed_metal(size: u32) -> Vec<u8> {
    let streaks = Fbm::<Perlin>::new(11).set_octaves(4);
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            // Stretched along x so the grain reads as brush strokes
            let n = streaks.get([x as f64 * 0.01, y as f64 * 0.35]) as f32;
            let v = (0.62 + 0.12 * n).clamp(0.0, 1.0);
            let c = (v * 255.0) as u8;
            out.extend_from_slice(&[c, c, (c as f32 * 1.03).min(255.0) as u8, 255]);
        }
    }
    out
}

fn checker(size: u32) -> Vec<u8> {
    let cell = size / 8;
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                out.extend_from_slice(&[230, 120, 40, 255]);
            } else {
                out.extend_from_slice(&[30, 40, 60, 255]);
            }
        }
    }
    out
}

fn star(size: u32) -> Vec<u8> {
    let center = Vec2::splat(size as f32 * 0.5);
    let outer = size as f32 * 0.48;
    let inner = outer * 0.45;
    let points: Vec<Vec2> = (0..10)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
            let r = if i % 2 == 0 { outer } else { inner };
            center + Vec2::new(angle.cos(), -angle.sin()) * r
        })
        .collect();

    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_in_polygon(p, &points) {
                out.extend_from_slice(&[255, 210, 40, 255]);
            } else {
                out.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    out
}

fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn cube(material: crate::scene::MaterialId) -> Primitive {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push(normal + u * su + v * sv);
            normals.push(normal);
            uvs.push(Vec2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Primitive::new(positions, Some(normals), Some(uvs), Some(indices), material)
}

fn uv_sphere(material: crate::scene::MaterialId, segments: u32, rings: u32) -> Primitive {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * std::f32::consts::PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let phi = u * std::f32::consts::TAU;
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin());
            positions.push(n);
            normals.push(n);
            uvs.push(Vec2::new(u, v));
        }
    }
    let stride = segments + 1;
    let mut indices = Vec::new();
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    Primitive::new(positions, Some(normals), Some(uvs), Some(indices), material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_images() {
        for name in ["uv-grid", "brushed-metal", "checker", "sticker-star"] {
            let img = image(name).unwrap_or_else(|| panic!("missing {}", name));
            assert_eq!(img.key, format!("builtin:{}", name));
            assert_eq!(img.rgba.len(), (img.width * img.height * 4) as usize);
        }
        assert!(image("nope").is_none());
    }

    #[test]
    fn test_sticker_has_transparent_border() {
        let star = image("sticker-star").unwrap();
        assert!(star.has_alpha());
        assert_eq!(star.texel(0, 0)[3], 0);
        assert_eq!(star.texel(64, 64)[3], 255);
    }

    #[test]
    fn test_cube_spans_unit_range() {
        let graph = model("cube").unwrap();
        let bounds = graph.bounds().unwrap();
        assert!((bounds.size() - Vec3::splat(2.0)).length() < 1e-5);
        assert_eq!(graph.materials().len(), 1);
        assert!(graph.materials()[0].metalness.is_none());
    }

    #[test]
    fn test_cube_winding_matches_normals() {
        let graph = model("cube").unwrap();
        let primitive = &graph.meshes()[0].primitives[0];
        for [a, b, c] in primitive.triangles() {
            let p = &primitive.positions;
            let face = (p[b] - p[a]).cross(p[c] - p[a]).normalize();
            assert!(face.dot(primitive.normals[a]) > 0.99);
        }
    }

    #[test]
    fn test_sphere_radius() {
        let graph = model("sphere").unwrap();
        for p in &graph.meshes()[0].primitives[0].positions {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
        assert!(model("teapot").is_none());
    }

    #[test]
    fn test_builtin_name() {
        assert_eq!(builtin_name("builtin:cube"), Some("cube"));
        assert_eq!(builtin_name("assets/cube.glb"), None);
    }
}
