//! GPU uniform buffer for per-frame camera and lighting data

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::core::camera::Camera;

/// Direction the key light travels, world space
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(-0.4, -0.8, -0.45);

/// Frame uniform data for GPU (must match `Frame` in the shaders)
/// WGSL vec3 has 16-byte alignment, so vectors are stored as vec4
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    /// View-projection matrix (64 bytes, offset 0)
    pub view_proj: [[f32; 4]; 4],
    /// Model matrix: idle spin (64 bytes, offset 64)
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix (64 bytes, offset 128)
    pub normal_matrix: [[f32; 4]; 4],
    /// Camera position, w unused (16 bytes, offset 192)
    pub camera_position: [f32; 4],
    /// Normalized light direction, w = intensity (16 bytes, offset 208)
    pub light_direction: [f32; 4],
}

impl FrameUniform {
    pub fn new(camera: &Camera, model: Mat4) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            light_direction: LIGHT_DIRECTION.normalize().extend(2.2).to_array(),
        }
    }
}

/// GPU buffer for the frame uniform
pub struct FrameBuffer {
    /// Uniform buffer
    buffer: wgpu::Buffer,
    /// Bind group layout
    bind_group_layout: wgpu::BindGroupLayout,
    /// Bind group
    bind_group: wgpu::BindGroup,
}

impl FrameBuffer {
    /// Create new frame buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Update buffer with camera and model transform
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera, model: Mat4) {
        let uniform = FrameUniform::new(camera, model);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Get bind group layout
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Get bind group
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
