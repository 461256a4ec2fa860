//! glTF 2.0 import into a [`SceneGraph`].
//!
//! Only triangle primitives are kept. Embedded images become shared
//! [`TextureHandle`]s keyed by `model:<url>#image<n>`, so every material that
//! references the same image shares one handle.

use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::core::{Error, Result};
use crate::scene::{LocalTransform, Material, MaterialId, Mesh, NodeContent, Primitive, SceneGraph, SceneNodeId};

use super::texture::{ColorSpace, TextureHandle, TextureImage};

/// Import a `.gltf` or `.glb` file from disk.
pub fn import_file(path: &Path, url: &str) -> Result<SceneGraph> {
    let (document, buffers, images) = gltf::import(path)?;
    build(&document, &buffers, &images, url)
}

/// Import a self-contained glTF (GLB or embedded buffers) from memory.
pub fn import_slice(bytes: &[u8], url: &str) -> Result<SceneGraph> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;
    build(&document, &buffers, &images, url)
}

fn build(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    url: &str,
) -> Result<SceneGraph> {
    let mut graph = SceneGraph::new();

    let textures = images
        .iter()
        .enumerate()
        .map(|(i, data)| convert_image(data, format!("model:{}#image{}", url, i)).map(Arc::new))
        .collect::<Result<Vec<TextureHandle>>>()?;

    for material in document.materials() {
        graph.add_material(convert_material(&material, &textures));
    }
    let mut default_material = None;

    for mesh in document.meshes() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
            let Some(positions) = reader.read_positions() else { continue };
            let positions: Vec<Vec3> = positions.map(Vec3::from).collect();
            let normals = reader.read_normals().map(|n| n.map(Vec3::from).collect());
            let uvs = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().map(Vec2::from).collect());
            let indices = reader.read_indices().map(|i| i.into_u32().collect());

            let material = match primitive.material().index() {
                Some(index) => MaterialId(index),
                None => *default_material
                    .get_or_insert_with(|| graph.add_material(Material::untextured("default"))),
            };
            primitives.push(Primitive::new(positions, normals, uvs, indices, material));
        }
        graph.add_mesh(Mesh {
            name: mesh.name().unwrap_or("mesh").to_string(),
            primitives,
        });
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| Error::Asset(format!("{} contains no scene", url)))?;

    let root = graph.root();
    for node in scene.nodes() {
        add_node(&mut graph, root, &node);
    }
    graph.propagate_transforms();

    if graph.mesh_instances().is_empty() {
        return Err(Error::Asset(format!("{} contains no triangle meshes", url)));
    }
    Ok(graph)
}

fn add_node(graph: &mut SceneGraph, parent: SceneNodeId, node: &gltf::Node) {
    let content = match node.mesh() {
        Some(mesh) => NodeContent::Mesh(crate::scene::MeshId(mesh.index())),
        None => NodeContent::Group,
    };
    let id = graph.add_child(parent, node.name().unwrap_or("node"), content);
    let matrix = Mat4::from_cols_array_2d(&node.transform().matrix());
    graph.set_transform(id, LocalTransform::from_mat4(matrix));
    for child in node.children() {
        add_node(graph, id, &child);
    }
}

fn convert_material(material: &gltf::Material, textures: &[TextureHandle]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let base_color_texture = pbr
        .base_color_texture()
        .and_then(|info| textures.get(info.texture().source().index()).cloned());
    let (metalness, roughness) = if material.unlit() {
        (None, None)
    } else {
        (Some(pbr.metallic_factor()), Some(pbr.roughness_factor()))
    };
    Material {
        name: material.name().unwrap_or("material").to_string(),
        base_color_factor: Vec4::from(pbr.base_color_factor()),
        base_color_texture,
        metalness,
        roughness,
    }
}

fn convert_image(data: &gltf::image::Data, key: String) -> Result<TextureImage> {
    use gltf::image::Format;

    let texel_count = data.width as usize * data.height as usize;
    let mut rgba = Vec::with_capacity(texel_count * 4);
    match data.format {
        Format::R8 => {
            for &l in &data.pixels {
                rgba.extend_from_slice(&[l, l, l, 255]);
            }
        }
        Format::R8G8 => {
            for px in data.pixels.chunks_exact(2) {
                rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        Format::R8G8B8 => {
            for px in data.pixels.chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        Format::R8G8B8A8 => rgba.extend_from_slice(&data.pixels),
        Format::R16G16B16A16 => {
            // Little-endian u16, keep the high byte
            for px in data.pixels.chunks_exact(8) {
                rgba.extend_from_slice(&[px[1], px[3], px[5], px[7]]);
            }
        }
        Format::R16G16B16 => {
            for px in data.pixels.chunks_exact(6) {
                rgba.extend_from_slice(&[px[1], px[3], px[5], 255]);
            }
        }
        other => {
            return Err(Error::Asset(format!("unsupported image format {:?}", other)));
        }
    }
    let image = image::RgbaImage::from_raw(data.width, data.height, rgba)
        .ok_or_else(|| Error::Asset(format!("image {} has truncated pixel data", key)))?;
    TextureImage::from_rgba8(key, image, ColorSpace::Srgb)
}
