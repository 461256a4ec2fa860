//! Forward renderer for the viewer's model and decal

use std::collections::HashMap;

use glam::Mat4;

use crate::assets::loader::LoadBackend;
use crate::assets::texture::TextureHandle;
use crate::core::Result;
use crate::core::camera::Camera;
use crate::material::BlendState;
use crate::render::buffer::{FrameBuffer, MeshBuffer, bake_vertices};
use crate::render::context::GpuContext;
use crate::render::pipeline::{DecalPipeline, MaterialTextures, MaterialUniform, ModelPipeline};
use crate::render::texture::{DepthTexture, TextureCache};
use crate::scene::{Material, MaterialId};
use crate::viewer::Viewer;

/// Frames a texture may go unused before the cache drops it
const TEXTURE_MAX_AGE: u64 = 240;

struct GpuPrimitive {
    mesh: MeshBuffer,
    material: MaterialId,
}

struct GpuMaterial {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Keys of the previous and next maps the bind group was built with
    maps: (String, String),
}

struct GpuDecal {
    mesh: MeshBuffer,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    frame: FrameBuffer,
    depth: DepthTexture,
    textures: TextureCache,
    model_pipeline: ModelPipeline,
    decal_pipeline: DecalPipeline,

    model_revision: Option<u64>,
    primitives: Vec<GpuPrimitive>,
    materials: HashMap<MaterialId, GpuMaterial>,

    decal_key: Option<(u64, String)>,
    decal: Option<GpuDecal>,
}

impl Renderer {
    pub fn new(ctx: &GpuContext) -> Self {
        let (width, height) = ctx.size();
        let frame = FrameBuffer::new(&ctx.device);
        let model_pipeline = ModelPipeline::new(&ctx.device, ctx.format(), frame.bind_group_layout());
        let decal_pipeline = DecalPipeline::new(&ctx.device, ctx.format(), frame.bind_group_layout());
        Self {
            depth: DepthTexture::new(&ctx.device, width, height),
            textures: TextureCache::new(),
            frame,
            model_pipeline,
            decal_pipeline,
            model_revision: None,
            primitives: Vec::new(),
            materials: HashMap::new(),
            decal_key: None,
            decal: None,
        }
    }

    pub fn resize(&mut self, ctx: &GpuContext) {
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
    }

    /// Bring GPU resources in line with the viewer's current state.
    pub fn prepare<B: LoadBackend>(&mut self, ctx: &GpuContext, viewer: &Viewer<B>) {
        self.textures.begin_frame();
        self.prepare_model(ctx, viewer);
        self.prepare_decal(ctx, viewer);

        let evicted = self.textures.evict_unused(TEXTURE_MAX_AGE);
        if evicted > 0 {
            log::debug!("Evicted {} texture(s), {} resident", evicted, self.textures.len());
        }
    }

    fn prepare_model<B: LoadBackend>(&mut self, ctx: &GpuContext, viewer: &Viewer<B>) {
        let Some(model) = viewer.model() else {
            if self.model_revision.take().is_some() {
                self.primitives.clear();
                self.materials.clear();
            }
            return;
        };

        let revision = viewer.model_revision();
        if self.model_revision != Some(revision) {
            self.model_revision = Some(revision);
            self.materials.clear();
            self.primitives = model
                .graph
                .mesh_instances()
                .iter()
                .filter_map(|instance| Some((instance.world, model.graph.mesh(instance.mesh)?)))
                .flat_map(|(world, mesh)| {
                    mesh.primitives.iter().map(move |primitive| (world, &mesh.name, primitive))
                })
                .filter(|(_, _, primitive)| !primitive.indices.is_empty())
                .map(|(world, name, primitive)| {
                    let vertices =
                        bake_vertices(&primitive.positions, &primitive.normals, &primitive.uvs, world);
                    GpuPrimitive {
                        mesh: MeshBuffer::new(&ctx.device, name, &vertices, &primitive.indices),
                        material: primitive.material,
                    }
                })
                .collect();
            log::debug!("Uploaded {} primitive(s) for {}", self.primitives.len(), model.url);
        }

        for (id, state) in model.patcher.states() {
            let Some(material) = model.graph.material(id) else {
                continue;
            };
            self.prepare_material(ctx, id, material, state);
        }
    }

    fn prepare_material(&mut self, ctx: &GpuContext, id: MaterialId, material: &Material, state: &BlendState) {
        let maps = (state.previous_map.key.clone(), state.next_map.key.clone());
        let stale = self.materials.get(&id).is_none_or(|m| m.maps != maps);

        if stale {
            let previous = self.upload(ctx, &state.previous_map);
            let next = self.upload(ctx, &state.next_map);
            let noise = self.upload(ctx, &state.noise_map);
            let uniform = match self.materials.remove(&id) {
                Some(existing) => existing.uniform,
                None => ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("material_uniform"),
                    size: std::mem::size_of::<MaterialUniform>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            };
            let bind_group = self.model_pipeline.create_material_bind_group(
                &ctx.device,
                &uniform,
                MaterialTextures {
                    previous: &previous,
                    next: &next,
                    noise: &noise,
                },
            );
            self.materials.insert(id, GpuMaterial { uniform, bind_group, maps });
        } else {
            self.textures.touch(&state.previous_map.key);
            self.textures.touch(&state.next_map.key);
            self.textures.touch(&state.noise_map.key);
        }

        if let Some(gpu) = self.materials.get(&id) {
            let uniform = MaterialUniform::new(material, state);
            ctx.queue.write_buffer(&gpu.uniform, 0, bytemuck::bytes_of(&uniform));
        }
    }

    fn prepare_decal<B: LoadBackend>(&mut self, ctx: &GpuContext, viewer: &Viewer<B>) {
        let (Some(decal), Some(sticker)) = (viewer.decal(), viewer.sticker_image()) else {
            self.decal_key = None;
            self.decal = None;
            return;
        };

        let key = (viewer.decal_revision(), sticker.key.clone());
        if self.decal_key.as_ref() == Some(&key) {
            self.textures.touch(&sticker.key);
            return;
        }

        let vertices = bake_vertices(&decal.positions, &decal.normals, &decal.uvs, Mat4::IDENTITY);
        let view = self.upload(ctx, sticker);
        self.decal = Some(GpuDecal {
            mesh: MeshBuffer::new(&ctx.device, "decal", &vertices, &decal.indices),
            bind_group: self.decal_pipeline.create_bind_group(&ctx.device, &view),
        });
        self.decal_key = Some(key);
        log::debug!("Decal rebuilt: {} triangle(s)", decal.triangle_count());
    }

    fn upload(&mut self, ctx: &GpuContext, image: &TextureHandle) -> wgpu::TextureView {
        self.textures.get_or_upload(&ctx.device, &ctx.queue, image).view.clone()
    }

    /// Draw one frame. A failed or loading model has no primitives, so only
    /// the background is cleared.
    pub fn render(&mut self, ctx: &GpuContext, camera: &Camera, model: Mat4, background: [f32; 3]) -> Result<()> {
        let frame = ctx.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.frame.update(&ctx.queue, camera, model);

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("forward_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background[0] as f64,
                            g: background[1] as f64,
                            b: background[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(self.model_pipeline.pipeline());
            pass.set_bind_group(0, self.frame.bind_group(), &[]);
            for primitive in &self.primitives {
                let Some(material) = self.materials.get(&primitive.material) else {
                    continue;
                };
                pass.set_bind_group(1, &material.bind_group, &[]);
                primitive.mesh.draw(&mut pass);
            }

            if let Some(decal) = &self.decal {
                pass.set_pipeline(self.decal_pipeline.pipeline());
                pass.set_bind_group(0, self.frame.bind_group(), &[]);
                pass.set_bind_group(1, &decal.bind_group, &[]);
                decal.mesh.draw(&mut pass);
            }
        }

        ctx.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }
}
