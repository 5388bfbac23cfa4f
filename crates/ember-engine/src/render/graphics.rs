use std::collections::HashMap;
use core::num::NonZeroU32;

use wgpu::util::DeviceExt;

use crate::coords::{Mat4, Viewport};
use crate::gfx::{
    FilterMode, GraphicsApi, GridTexels, HeatmapUniforms, ProgramHandle, ShaderSource,
    TextureHandle, TextureUnit,
};
use crate::paint::Rgba8;
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    draw_vertex_layout, premul_alpha_blend, triangle_list, ubo_min_binding_size, uniform_entry,
    HeatmapUniformBlock, HostUniform,
};
use super::{RenderCtx, RenderTarget};

enum GpuTexture {
    Colormap {
        _texture: wgpu::Texture,
        view: wgpu::TextureView,
        sampler: wgpu::Sampler,
    },
    /// Storage is created on first upload and recreated when the size changes.
    Grid {
        storage: Option<GridStorage>,
    },
}

struct GridStorage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    rows: u32,
    cols: u32,
}

struct HeatmapProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

struct HostPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    ubo: wgpu::Buffer,
}

/// Render state set by callbacks and consumed by the next elements command.
#[derive(Debug, Default)]
struct BoundState {
    program: Option<ProgramHandle>,
    textures: [Option<TextureHandle>; 2],
    uniforms: Option<HeatmapUniforms>,
}

/// Which pipeline an elements command is drawn with.
enum DrawPipeline {
    Host,
    Heatmap { program: ProgramHandle, bind_group: wgpu::BindGroup },
}

struct DrawOp {
    pipeline: DrawPipeline,
    first_index: u32,
    index_count: u32,
}

/// wgpu implementation of [`GraphicsApi`] and host draw-list backend.
///
/// Texture and program handles are names into maps owned by this object;
/// dropping a map entry frees the GPU resource.
pub struct WgpuGraphics<'g> {
    device: &'g wgpu::Device,
    queue: &'g wgpu::Queue,
    target_format: wgpu::TextureFormat,
    viewport: Viewport,

    textures: HashMap<TextureHandle, GpuTexture>,
    programs: HashMap<ProgramHandle, HeatmapProgram>,
    next_name: u32,

    grid_sampler: wgpu::Sampler,
    host: Option<HostPipeline>,
    bound: BoundState,
}

impl<'g> WgpuGraphics<'g> {
    pub fn new(ctx: &RenderCtx<'g>) -> Self {
        let grid_sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember grid sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device: ctx.device,
            queue: ctx.queue,
            target_format: ctx.target_format,
            viewport: ctx.viewport,
            textures: HashMap::new(),
            programs: HashMap::new(),
            next_name: 0,
            grid_sampler,
            host: None,
            bound: BoundState::default(),
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Updates the logical viewport the host projection is derived from.
    #[inline]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Plays `draw_list` back into `target`.
    ///
    /// Commands run in recorded order. Each `Callback` payload is handed to
    /// `on_callback` together with this backend, `ResetRenderState` returns to the
    /// host pipeline, and `Elements` are drawn with whatever state is bound at
    /// that point.
    pub fn render_draw_list<C>(
        &mut self,
        target: &mut RenderTarget<'_>,
        draw_list: &DrawList<C>,
        mut on_callback: impl FnMut(&mut Self, &C),
    ) {
        self.ensure_host_pipeline();
        self.bound = BoundState::default();

        let projection = self.viewport.ortho_projection();
        if let Some(host) = self.host.as_ref() {
            self.queue
                .write_buffer(&host.ubo, 0, bytemuck::bytes_of(&HostUniform { proj_mtx: projection }));
        }

        // Resolve callbacks first; the pass only sees finished draw ops.
        let mut ops = Vec::new();
        for cmd in draw_list.commands() {
            match cmd {
                DrawCmd::Callback(cb) => on_callback(self, cb),
                DrawCmd::ResetRenderState => self.bound = BoundState::default(),
                DrawCmd::Elements { first_index, index_count } => {
                    if *index_count == 0 {
                        continue;
                    }
                    if let Some(pipeline) = self.resolve_pipeline() {
                        ops.push(DrawOp {
                            pipeline,
                            first_index: *first_index,
                            index_count: *index_count,
                        });
                    }
                }
            }
        }
        self.bound = BoundState::default();

        let buffers = if draw_list.indices().is_empty() {
            None
        } else {
            let vbo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ember draw list vbo"),
                contents: bytemuck::cast_slice(draw_list.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let ibo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ember draw list ibo"),
                contents: bytemuck::cast_slice(draw_list.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });
            Some((vbo, ibo))
        };

        let load = match target.clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember draw list pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some((vbo, ibo)) = buffers.as_ref() else { return };
        let Some(host) = self.host.as_ref() else { return };

        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        for op in &ops {
            match &op.pipeline {
                DrawPipeline::Host => {
                    rpass.set_pipeline(&host.pipeline);
                    rpass.set_bind_group(0, &host.bind_group, &[]);
                }
                DrawPipeline::Heatmap { program, bind_group } => {
                    let Some(p) = self.programs.get(program) else { continue };
                    rpass.set_pipeline(&p.pipeline);
                    rpass.set_bind_group(0, bind_group, &[]);
                }
            }
            rpass.draw_indexed(op.first_index..op.first_index + op.index_count, 0, 0..1);
        }
    }

    fn next_name(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        NonZeroU32::new(self.next_name).unwrap_or(NonZeroU32::MIN)
    }

    fn resolve_pipeline(&self) -> Option<DrawPipeline> {
        let Some(program) = self.bound.program else {
            return Some(DrawPipeline::Host);
        };

        let Some(p) = self.programs.get(&program) else {
            log::warn!("draw with deleted program {program:?}; skipped");
            return None;
        };
        let Some(uniforms) = self.bound.uniforms.as_ref() else {
            log::warn!("heatmap draw without uniforms; skipped");
            return None;
        };

        let grid = self.bound.textures[TextureUnit::Grid.index()]
            .and_then(|h| self.textures.get(&h));
        let Some(GpuTexture::Grid { storage: Some(grid) }) = grid else {
            // Rendered before its first data upload.
            log::debug!("heatmap draw without grid data; skipped");
            return None;
        };

        let colormap = self.bound.textures[TextureUnit::Colormap.index()]
            .and_then(|h| self.textures.get(&h));
        let Some(GpuTexture::Colormap { view: cmap_view, sampler: cmap_sampler, .. }) = colormap else {
            log::warn!("heatmap draw without colormap; skipped");
            return None;
        };

        let ubo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ember heatmap ubo"),
            contents: bytemuck::bytes_of(&HeatmapUniformBlock::from(uniforms)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember heatmap bind group"),
            layout: &p.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&grid.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.grid_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(cmap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(cmap_sampler),
                },
            ],
        });

        Some(DrawPipeline::Heatmap { program, bind_group })
    }

    fn ensure_host_pipeline(&mut self) {
        if self.host.is_some() {
            return;
        }

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ember host shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/host.wgsl").into()),
        });

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ember host bgl"),
                entries: &[uniform_entry(0, ubo_min_binding_size::<HostUniform>())],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ember host pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = self.create_pipeline(
            "ember host pipeline",
            &shader,
            &pipeline_layout,
            premul_alpha_blend(),
        );

        let ubo = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ember host ubo"),
            size: std::mem::size_of::<HostUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember host bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.host = Some(HostPipeline { pipeline, bind_group, ubo });
    }

    fn create_pipeline(
        &self,
        label: &str,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        blend: wgpu::BlendState,
    ) -> wgpu::RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[draw_vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl GraphicsApi for WgpuGraphics<'_> {
    fn create_colormap_texture(&mut self, colors: &[Rgba8], filter: FilterMode) -> TextureHandle {
        // One N x 1 row; 1-D textures sample as zero on some backends (GL).
        let width = colors.len().max(1) as u32;
        let size = wgpu::Extent3d { width, height: 1, depth_or_array_layers: 1 };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ember colormap"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let bytes: Vec<u8> = colors.iter().flat_map(|c| c.to_bytes()).collect();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );

        let wgpu_filter = match filter {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        };
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember colormap sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu_filter,
            min_filter: wgpu_filter,
            ..Default::default()
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle(self.next_name());
        self.textures.insert(handle, GpuTexture::Colormap { _texture: texture, view, sampler });
        handle
    }

    fn create_grid_texture(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.next_name());
        self.textures.insert(handle, GpuTexture::Grid { storage: None });
        handle
    }

    fn upload_grid(&mut self, texture: TextureHandle, rows: u32, cols: u32, texels: GridTexels<'_>) {
        let Some(GpuTexture::Grid { storage }) = self.textures.get_mut(&texture) else {
            log::warn!("upload to unknown grid texture {texture:?} ignored");
            return;
        };

        let size = wgpu::Extent3d { width: cols, height: rows, depth_or_array_layers: 1 };
        let reuse = matches!(storage, Some(s) if s.rows == rows && s.cols == cols);
        if !reuse {
            let tex = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("ember heatmap grid"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            *storage = Some(GridStorage { texture: tex, view, rows, cols });
        }
        let Some(s) = storage.as_ref() else { return };

        let data = texels.to_f32();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &s.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&data),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(cols * 4),
                rows_per_image: Some(rows),
            },
            size,
        );
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            log::warn!("delete of unknown texture {texture:?}");
        }
        for slot in &mut self.bound.textures {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }

    fn host_projection(&mut self) -> Mat4 {
        self.viewport.ortho_projection()
    }

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn compile_program(&mut self, source: &ShaderSource) -> ProgramHandle {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
        });

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ember heatmap bgl"),
                entries: &[
                    uniform_entry(0, ubo_min_binding_size::<HeatmapUniformBlock>()),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ember heatmap pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = self.create_pipeline(
            source.label,
            &shader,
            &pipeline_layout,
            wgpu::BlendState::ALPHA_BLENDING,
        );

        let handle = ProgramHandle(self.next_name());
        self.programs.insert(handle, HeatmapProgram { pipeline, bind_group_layout });
        handle
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        if self.bound.program == Some(program) {
            self.bound.program = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.bound.program = Some(program);
    }

    fn bind_texture(&mut self, unit: TextureUnit, texture: Option<TextureHandle>) {
        self.bound.textures[unit.index()] = texture;
    }

    fn set_heatmap_uniforms(&mut self, uniforms: &HeatmapUniforms) {
        self.bound.uniforms = Some(*uniforms);
    }
}
