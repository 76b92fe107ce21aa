//! GPU-side mesh data.
//!
//! [`GpuModel`] is the uploaded form of a [`scene::Model`]: the node hierarchy
//! flattened into a list of draw items, one vertex/index buffer pair per mesh,
//! with world transforms baked into per-node uniforms. Re-flattening after an
//! animation step reuses the buffers and only rewrites the uniforms.

use wgpu::util::DeviceExt;

use crate::render::texture::Texture;
use crate::scene::{self, MeshVertex};

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Per-draw-item uniform: world matrix, normal matrix and shadow flags.
/// `flags.x` is 1.0 when the mesh receives shadows.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub flags: [f32; 4],
}

impl NodeUniform {
    fn new(world: &scene::Transform, receive_shadow: bool) -> Self {
        Self {
            model: world.to_matrix().into(),
            normal: world.normal_matrix().into(),
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
}

pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    // Held so the bind group's texture stays alive.
    _texture: Option<Texture>,
}

impl GpuMaterial {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        white: &Texture,
        material: &scene::Material,
    ) -> Self {
        let uniform = MaterialUniform {
            base_color: material.base_color,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_material", material.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let texture = material
            .base_color_image
            .as_ref()
            .map(|image| Texture::from_image(device, queue, image, &material.name));
        let (view, sampler) = match &texture {
            Some(t) => (&t.view, &t.sampler),
            None => (&white.view, &white.sampler),
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(&format!("{}_material_bind_group", material.name)),
        });
        Self {
            bind_group,
            _texture: texture,
        }
    }
}

/// One flattened draw item.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub material: usize,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub cast_shadow: bool,
}

pub struct GpuModel {
    pub name: String,
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<GpuMaterial>,
}

impl GpuModel {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_layout: &wgpu::BindGroupLayout,
        node_layout: &wgpu::BindGroupLayout,
        white: &Texture,
        model: &scene::Model,
    ) -> Self {
        let materials = model
            .materials
            .iter()
            .map(|m| GpuMaterial::new(device, queue, material_layout, white, m))
            .collect();

        let mut meshes = Vec::new();
        model.visit_world(&mut |node, world| {
            for mesh in &node.meshes {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}_vertices", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}_indices", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform = NodeUniform::new(world, mesh.receive_shadow);
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}_node", mesh.name)),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: node_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                    label: Some(&format!("{}_node_bind_group", mesh.name)),
                });
                meshes.push(GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    num_indices: mesh.indices.len() as u32,
                    material: mesh.material.min(model.materials.len().saturating_sub(1)),
                    uniform_buffer,
                    bind_group,
                    cast_shadow: mesh.cast_shadow,
                });
            }
        });

        Self {
            name: model.name.clone(),
            meshes,
            materials,
        }
    }

    /// Rewrite the per-node uniforms from the current hierarchy transforms.
    /// The flattening order matches [`new`](Self::new), so buffers and meshes
    /// pair up by index.
    pub fn update_transforms(&self, queue: &wgpu::Queue, model: &scene::Model) {
        let mut index = 0;
        model.visit_world(&mut |node, world| {
            for mesh in &node.meshes {
                if let Some(gpu_mesh) = self.meshes.get(index) {
                    let uniform = NodeUniform::new(world, mesh.receive_shadow);
                    queue.write_buffer(
                        &gpu_mesh.uniform_buffer,
                        0,
                        bytemuck::cast_slice(&[uniform]),
                    );
                }
                index += 1;
            }
        });
    }
}
