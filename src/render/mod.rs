//! The renderer.
//!
//! Owns every GPU resource derived from the scene: pipelines, bind group
//! layouts, the frame uniforms, the shadow map and the uploaded models. A
//! frame is three passes in one encoder: shadow depth from the directional
//! light, the forward mesh pass with the skybox filling the leftover pixels,
//! then whatever overlay the caller paints on top.

pub mod mesh;
pub mod texture;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::config::ShadowConfig;
use crate::context::Context;
use crate::lights::{Lights, LightsUniform, ShadowUniform};
use crate::pipelines::{
    mesh::mk_mesh_pipeline, shadow::mk_shadow_pipeline, skybox::mk_skybox_pipeline,
};
use crate::render::mesh::GpuModel;
use crate::render::texture::Texture;
use crate::scene::{self, CubemapData};

pub struct Renderer {
    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    node_layout: wgpu::BindGroupLayout,
    sky_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    shadow_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    depth_texture: Texture,
    shadow_map: Texture,
    white: Texture,
    models: Vec<GpuModel>,
    sky_bind_group: Option<wgpu::BindGroup>,
}

impl Renderer {
    pub fn new(ctx: &Context, shadow: &ShadowConfig) -> Self {
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("frame_bind_group_layout"),
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });

        let node_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("node_bind_group_layout"),
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("shadow_bind_group_layout"),
        });

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("sky_bind_group_layout"),
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lights_buffer"),
            contents: bytemuck::cast_slice(&[LightsUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shadow_buffer"),
            contents: bytemuck::cast_slice(&[ShadowUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_map = Texture::create_shadow_map(device, shadow.map_size, "shadow_map");
        let depth_texture = Texture::create_depth_texture(
            device,
            [ctx.config.width, ctx.config.height],
            "depth_texture",
        );
        let white = Texture::white_pixel(device, &ctx.queue);

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: shadow_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_bind_group"),
        });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });

        let mesh_pipeline = mk_mesh_pipeline(
            device,
            &ctx.config,
            &frame_layout,
            &material_layout,
            &node_layout,
        );
        let shadow_pipeline = mk_shadow_pipeline(device, &shadow_layout, &node_layout);
        let skybox_pipeline = mk_skybox_pipeline(device, &ctx.config, &frame_layout, &sky_layout);

        Self {
            mesh_pipeline,
            shadow_pipeline,
            skybox_pipeline,
            material_layout,
            node_layout,
            sky_layout,
            camera_buffer,
            lights_buffer,
            shadow_buffer,
            frame_bind_group,
            shadow_bind_group,
            depth_texture,
            shadow_map,
            white,
            models: Vec::new(),
            sky_bind_group: None,
        }
    }

    /// Recreate the depth attachment after the surface was reconfigured.
    pub fn resize(&mut self, ctx: &Context) {
        self.depth_texture = Texture::create_depth_texture(
            &ctx.device,
            [ctx.config.width, ctx.config.height],
            "depth_texture",
        );
    }

    pub fn set_background(&mut self, ctx: &Context, cubemap: &CubemapData) {
        let sky = Texture::create_cubemap(&ctx.device, &ctx.queue, cubemap, "sky_cubemap");
        self.sky_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sky.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sky.sampler),
                },
            ],
            label: Some("sky_bind_group"),
        }));
    }

    /// Upload a model's buffers. Call order must match the scene's model
    /// list so transform updates land on the right entity.
    pub fn upload(&mut self, ctx: &Context, model: &scene::Model) -> usize {
        let gpu = GpuModel::new(
            &ctx.device,
            &ctx.queue,
            &self.material_layout,
            &self.node_layout,
            &self.white,
            model,
        );
        self.models.push(gpu);
        self.models.len() - 1
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Push the current light state and the shadow camera derived from it.
    pub fn update_lights(&self, queue: &wgpu::Queue, lights: &Lights) {
        queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::cast_slice(&[lights.to_uniform()]),
        );
        let shadow = ShadowUniform {
            light_view_proj: lights.directional.shadow_matrix().into(),
        };
        queue.write_buffer(&self.shadow_buffer, 0, bytemuck::cast_slice(&[shadow]));
    }

    pub fn update_transforms(&self, queue: &wgpu::Queue, index: usize, model: &scene::Model) {
        if let Some(gpu) = self.models.get(index) {
            gpu.update_transforms(queue, model);
        }
    }

    /// Draw one frame. `overlay` is painted into the same encoder after the
    /// scene passes, on top of the finished image.
    pub fn render(
        &mut self,
        ctx: &Context,
        overlay: impl FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = ctx.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            for model in &self.models {
                for mesh in model.meshes.iter().filter(|m| m.cast_shadow) {
                    pass.set_bind_group(1, &mesh.bind_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
                }
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mesh_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for model in &self.models {
                for mesh in &model.meshes {
                    pass.set_bind_group(1, &model.materials[mesh.material].bind_group, &[]);
                    pass.set_bind_group(2, &mesh.bind_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
                }
            }
            if let Some(sky) = &self.sky_bind_group {
                pass.set_pipeline(&self.skybox_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(1, sky, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        overlay(&mut encoder, &view);

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
