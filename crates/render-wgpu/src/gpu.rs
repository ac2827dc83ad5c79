use crate::instances::{
    PLAYER_COLOR, TileInstance, instance_chunks, player_instance, tile_instances,
};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tileworld_render::{RenderView, TilePalette};
use tileworld_scene::{Scene, Tilemap};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.08,
    a: 1.0,
};

/// Tile instances currently on the GPU, split across as many buffers as the
/// device's `max_buffer_size` requires.
struct TileLayer {
    buffers: Vec<(wgpu::Buffer, u32)>,
    tilemap_id: u64,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    player_buffer: wgpu::Buffer,
    tiles: Option<TileLayer>,
    palette: TilePalette,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        Self::with_palette(device, surface_format, TilePalette::default())
    }

    pub fn with_palette(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        palette: TilePalette,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::QUAD_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<TileInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            1 => Float32x2,
                            2 => Float32x2,
                            3 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // The y-flipped projection reverses winding; quads are never culled.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let player_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("player_instance_buffer"),
            size: std::mem::size_of::<TileInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            quad_vertex_buffer,
            quad_index_buffer,
            player_buffer,
            tiles: None,
            palette,
            surface_format,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn palette(&self) -> &TilePalette {
        &self.palette
    }

    /// Upload one instance per tile, replacing any previous tilemap.
    pub fn upload_tilemap(&mut self, device: &wgpu::Device, tilemap: &Tilemap) {
        let instances = tile_instances(tilemap, &self.palette);
        let chunks = instance_chunks(instances.len(), device.limits().max_buffer_size);
        let buffers = chunks
            .iter()
            .map(|range| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("tile_instance_buffer"),
                    contents: bytemuck::cast_slice(&instances[range.clone()]),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                (buffer, range.len() as u32)
            })
            .collect();
        tracing::info!(
            tiles = instances.len(),
            buffers = chunks.len(),
            "tilemap uploaded"
        );
        self.tiles = Some(TileLayer {
            buffers,
            tilemap_id: tilemap.id(),
        });
    }

    pub fn has_tilemap(&self) -> bool {
        self.tiles.is_some()
    }

    /// Render one frame: tiles, then the player on top.
    ///
    /// The tilemap is uploaded the first time a ready scene is drawn and
    /// released once the scene no longer has one.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        scene: &Scene,
        view: &RenderView,
    ) {
        match scene.tilemap() {
            Some(tilemap) if self.tiles.as_ref().is_none_or(|t| t.tilemap_id != tilemap.id()) => {
                self.upload_tilemap(device, tilemap);
            }
            None if self.tiles.is_some() => {
                tracing::debug!("releasing tile instances");
                self.tiles = None;
            }
            _ => {}
        }

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view.view_projection().to_cols_array_2d(),
            }),
        );

        let player = scene.player().map(|p| player_instance(p, PLAYER_COLOR));
        if let Some(instance) = &player {
            queue.write_buffer(&self.player_buffer, 0, bytemuck::bytes_of(instance));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
            pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            if let Some(tiles) = &self.tiles {
                for (buffer, count) in &tiles.buffers {
                    pass.set_vertex_buffer(1, buffer.slice(..));
                    pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..*count);
                }
            }

            if player.is_some() {
                pass.set_vertex_buffer(1, self.player_buffer.slice(..));
                pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
