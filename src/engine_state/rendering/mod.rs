//! Rendering system for the voxel viewer.
//!
//! [`BlockRenderer`] owns the surface, the device and everything built from them: the
//! block pipeline, the camera uniform, the atlas and the depth buffer. Each frame it
//! issues one 36-vertex draw per uploaded block.
//!
//! The pipeline is shaped by what the shader declares. Vertex attributes and the
//! matrix uniform are looked up by name (see [`shader_reflection`]); an input the
//! shader does not declare gets no vertex buffer slot or binding and is never
//! written.
//!
//! Shader compilation and pipeline creation run inside a validation error scope, so
//! a shader the pipeline cannot be built from surfaces as a
//! [`StartupError::Pipeline`] instead of a panic.

use log::{debug, error, info, warn};
use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration};

use crate::error::StartupError;

use super::{
    camera_state::camera::CameraUniform,
    voxels::{block::block_mesh::VERTICES_PER_BLOCK, chunk::Chunk},
};

pub mod block_buffers;
pub mod shader_reflection;
pub mod texture;
pub mod vertex;

use block_buffers::BlockBuffers;
use shader_reflection::{ResourceBinding, ShaderBindings};

/// Bind group holding the matrix uniform.
pub const CAMERA_BIND_GROUP_INDEX: u32 = 0;
/// Bind group holding the atlas texture (binding 0) and its sampler (binding 1).
pub const ATLAS_BIND_GROUP_INDEX: u32 = 1;

const CAMERA_BIND_GROUP: &str = "camera_bind_group";
const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
const ATLAS_BIND_GROUP: &str = "atlas_bind_group";
const ATLAS_BIND_GROUP_LAYOUT: &str = "atlas_bind_group_layout";
const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Draws the blocks of a chunk with the block shader.
pub struct BlockRenderer {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    render_pipeline: RenderPipeline,
    /// Only present when the shader declares the matrix uniform
    camera_buffer: Option<Buffer>,
    camera_bind_group: BindGroup,
    atlas_bind_group: BindGroup,
    depth_texture: texture::Texture,
    position_slot: Option<u32>,
    texcoord_slot: Option<u32>,
}

impl BlockRenderer {
    /// Builds the pipeline for `shader_source` and uploads the atlas.
    ///
    /// `surface` must already be configured with `surface_config`. Fails when the
    /// shader does not compile or does not fit the pipeline, for example a vertex
    /// input whose name is not `position` or `texcoord`.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        shader_source: &str,
        atlas: &image::RgbaImage,
    ) -> Result<Self, StartupError> {
        let bindings = shader_reflection::reflect(shader_source);
        let matrix_binding = camera_binding(&bindings);

        let (camera_buffer, camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(&device, matrix_binding);

        let atlas_texture = texture::Texture::from_atlas(&device, &queue, atlas, "texture atlas");
        let (atlas_bind_group, atlas_bind_group_layout) =
            Self::generate_atlas_bindgroups(&device, &atlas_texture);

        let depth_texture =
            texture::Texture::create_depth_texture(&device, &surface_config, "DEPTH TEXTURE");

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Block Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &atlas_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Attribute arrays must outlive the layouts that borrow them.
        let position_attributes = bindings.position.map(vertex::position_attributes);
        let texcoord_attributes = bindings.texcoord.map(vertex::texcoord_attributes);

        let mut vertex_buffers = Vec::new();
        let mut position_slot = None;
        let mut texcoord_slot = None;
        if let Some(attributes) = &position_attributes {
            position_slot = Some(vertex_buffers.len() as u32);
            vertex_buffers.push(vertex::position_layout(attributes));
        }
        if let Some(attributes) = &texcoord_attributes {
            texcoord_slot = Some(vertex_buffers.len() as u32);
            vertex_buffers.push(vertex::texcoord_layout(attributes));
        }

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Block Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(pipeline_error(err));
        }

        info!(
            "Block pipeline ready: position slot {position_slot:?}, texcoord slot {texcoord_slot:?}, matrix binding {matrix_binding:?}"
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            atlas_bind_group,
            depth_texture,
            position_slot,
            texcoord_slot,
        })
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Uploads the mesh of every block in `chunk` that has no GPU buffers yet.
    pub fn upload_chunk(&self, chunk: &mut Chunk) {
        let mut uploaded = 0;
        for (_, block) in chunk.iter_mut() {
            if block.buffers().is_none() {
                let buffers = BlockBuffers::for_block(&self.device, block);
                block.attach_buffers(buffers);
                uploaded += 1;
            }
        }
        debug!("Uploaded {uploaded} block meshes");
    }

    /// Writes the camera matrix, if the shader has somewhere to put it.
    pub fn write_camera(&self, uniform: &CameraUniform) {
        if let Some(buffer) = &self.camera_buffer {
            self.queue
                .write_buffer(buffer, 0, bytemuck::cast_slice(&[*uniform]));
        }
    }

    /// Reconfigures the surface and depth buffer for a new window size.
    ///
    /// A zero-sized window (minimized) is ignored until it has an area again.
    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            debug!("Ignoring resize to {}x{}", size.width, size.height);
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, &self.surface_config, "DEPTH TEXTURE");
    }

    /// Draws every uploaded block in `chunk`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, chunk: &Chunk) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                debug!("Reconfiguring surface: {err}");
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(err) => {
                error!("Error getting current frame: {err:?}");
                return;
            }
        };

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = self.device.create_command_encoder(&Default::default());
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Block Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            rpass.set_pipeline(&self.render_pipeline);
            rpass.set_bind_group(CAMERA_BIND_GROUP_INDEX, &self.camera_bind_group, &[]);
            rpass.set_bind_group(ATLAS_BIND_GROUP_INDEX, &self.atlas_bind_group, &[]);

            for (_, block) in chunk.iter() {
                let Some(buffers) = block.buffers() else {
                    continue;
                };
                if let Some(slot) = self.position_slot {
                    rpass.set_vertex_buffer(slot, buffers.position.slice(..));
                }
                if let Some(slot) = self.texcoord_slot {
                    rpass.set_vertex_buffer(slot, buffers.texcoord.slice(..));
                }
                rpass.draw(0..VERTICES_PER_BLOCK as u32, 0..1);
            }
        }

        self.queue.submit([encoder.finish()]);
        frame.present();
    }

    /// Camera bind group. Without a matrix binding the group stays empty.
    fn generate_camera_bindgroups(
        device: &Device,
        matrix_binding: Option<u32>,
    ) -> (Option<Buffer>, BindGroup, wgpu::BindGroupLayout) {
        let Some(binding) = matrix_binding else {
            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &layout,
                entries: &[],
                label: Some(CAMERA_BIND_GROUP),
            });
            return (None, bind_group, layout);
        };

        let buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[CameraUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(CAMERA_BIND_GROUP_LAYOUT),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        (Some(buffer), bind_group, layout)
    }

    fn generate_atlas_bindgroups(
        device: &Device,
        atlas: &texture::Texture,
    ) -> (BindGroup, wgpu::BindGroupLayout) {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    // This should match the filterable field of the corresponding Texture entry above.
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(ATLAS_BIND_GROUP_LAYOUT),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(ATLAS_BIND_GROUP),
        });

        (bind_group, layout)
    }
}

/// Turns an error captured around pipeline creation into a startup error.
fn pipeline_error(err: wgpu::Error) -> StartupError {
    match err {
        wgpu::Error::Validation { description, .. } => StartupError::Pipeline(description),
        other => StartupError::Pipeline(other.to_string()),
    }
}

/// The binding to write the matrix to, if the shader put it in the camera group.
fn camera_binding(bindings: &ShaderBindings) -> Option<u32> {
    match bindings.matrix {
        Some(ResourceBinding {
            group: CAMERA_BIND_GROUP_INDEX,
            binding,
        }) => Some(binding),
        Some(ResourceBinding { group, .. }) => {
            warn!(
                "Uniform `{}` is in group {group}, expected {CAMERA_BIND_GROUP_INDEX}; it will not be written",
                shader_reflection::MATRIX_UNIFORM
            );
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_written_only_in_the_camera_group() {
        let in_camera_group = ShaderBindings {
            matrix: Some(ResourceBinding {
                group: CAMERA_BIND_GROUP_INDEX,
                binding: 3,
            }),
            ..Default::default()
        };
        let in_atlas_group = ShaderBindings {
            matrix: Some(ResourceBinding {
                group: ATLAS_BIND_GROUP_INDEX,
                binding: 0,
            }),
            ..Default::default()
        };

        assert_eq!(camera_binding(&in_camera_group), Some(3));
        assert_eq!(camera_binding(&in_atlas_group), None);
        assert_eq!(camera_binding(&ShaderBindings::default()), None);
    }

    #[test]
    fn validation_errors_become_pipeline_startup_errors() {
        let err = wgpu::Error::Validation {
            source: Box::new(std::io::Error::other("vertex input at location 0 has no buffer")),
            description: "Vertex input at location 0 is not provided".to_string(),
        };

        match pipeline_error(err) {
            StartupError::Pipeline(message) => {
                assert_eq!(message, "Vertex input at location 0 is not provided")
            }
            other => panic!("expected a pipeline error, got {other:?}"),
        }
    }
}
