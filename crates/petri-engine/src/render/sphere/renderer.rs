use anyhow::{ensure, Result};

use crate::mesh::{SphereBuffer, SphereLayout, VertexRecord};
use crate::render::{RenderCtx, RenderTarget, Viewport};

use super::types::{ColorMap, SphereColors, SphereTransforms, SphereUniforms};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32    // tag
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<VertexRecord>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Renderer for a packed `SphereBuffer`.
///
/// GPU buffers are sized once from the `SphereLayout`. Every `render` call
/// re-uploads the whole vertex array and both index lists; there is no
/// dirty-region tracking.
pub struct SphereRenderer {
    layout: SphereLayout,
    colors: SphereColors,

    pipeline_format: Option<wgpu::TextureFormat>,
    triangle_pipeline: Option<wgpu::RenderPipeline>,
    line_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,

    vertex_buffer: wgpu::Buffer,
    triangle_ibo: wgpu::Buffer,
    line_ibo: wgpu::Buffer,

    depth_viewport: Viewport,
    depth_view: Option<wgpu::TextureView>,
}

impl SphereRenderer {
    pub fn new(ctx: &RenderCtx<'_>, layout: SphereLayout) -> Result<Self> {
        layout.validate()?;

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("petri sphere ubo"),
            size: std::mem::size_of::<SphereUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("petri sphere bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SphereUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("petri sphere bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("petri sphere vbo"),
            size: (layout.max_vertices() * std::mem::size_of::<VertexRecord>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let triangle_ibo = create_index_buffer(ctx, "petri sphere triangle ibo", layout.max_triangle_indices());
        let line_ibo = create_index_buffer(ctx, "petri sphere line ibo", layout.max_line_indices());

        log::debug!(
            "sphere renderer: {} spheres x {} vertices, {} + {} index slots",
            layout.max_spheres,
            layout.vertices_per_sphere(),
            layout.max_triangle_indices(),
            layout.max_line_indices()
        );

        let mut renderer = Self {
            layout,
            colors: SphereColors::default(),
            pipeline_format: None,
            triangle_pipeline: None,
            line_pipeline: None,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            triangle_ibo,
            line_ibo,
            depth_viewport: Viewport::default(),
            depth_view: None,
        };
        renderer.ensure_pipelines(ctx);
        Ok(renderer)
    }

    #[inline]
    pub fn layout(&self) -> SphereLayout {
        self.layout
    }

    #[inline]
    pub fn colors(&self) -> SphereColors {
        self.colors
    }

    /// Updates the per-tag colors; `None` entries keep their current value.
    pub fn set_color(&mut self, map: ColorMap) {
        self.colors.apply(map);
    }

    /// Uploads `buffer` and draws every sphere it holds.
    ///
    /// Fails if `buffer` was built for a different layout than this renderer.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        buffer: &SphereBuffer,
        transforms: &SphereTransforms,
    ) -> Result<()> {
        ensure!(
            buffer.layout() == self.layout,
            "sphere buffer layout {:?} does not match renderer layout {:?}",
            buffer.layout(),
            self.layout
        );
        if !ctx.viewport.is_valid() {
            return Ok(());
        }

        self.ensure_pipelines(ctx);
        self.ensure_depth(ctx);

        ctx.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(buffer.records()));
        write_indices(ctx, &self.triangle_ibo, buffer.triangle_indices());
        write_indices(ctx, &self.line_ibo, buffer.line_indices());
        ctx.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&SphereUniforms::new(transforms, &self.colors)),
        );

        let Some(triangle_pipeline) = self.triangle_pipeline.as_ref() else { return Ok(()) };
        let Some(line_pipeline) = self.line_pipeline.as_ref() else { return Ok(()) };
        let Some(depth_view) = self.depth_view.as_ref() else { return Ok(()) };

        let load = target.take_load_op();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("petri sphere pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
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

        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let triangles = buffer.triangle_indices().len() as u32;
        if triangles > 0 {
            rpass.set_pipeline(triangle_pipeline);
            rpass.set_index_buffer(self.triangle_ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..triangles, 0, 0..1);
        }

        let lines = buffer.line_indices().len() as u32;
        if lines > 0 {
            rpass.set_pipeline(line_pipeline);
            rpass.set_index_buffer(self.line_ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..lines, 0, 0..1);
        }

        Ok(())
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.triangle_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("petri sphere shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sphere.wgsl").into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("petri sphere pipeline layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            immediate_size: 0,
        });

        let build = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode, depth_compare| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let triangle_pipeline = build(
            "petri sphere triangle pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
            wgpu::CompareFunction::Less,
        );
        // Grid shells may coincide with field surfaces; let them win ties.
        let line_pipeline = build(
            "petri sphere line pipeline",
            wgpu::PrimitiveTopology::LineList,
            None,
            wgpu::CompareFunction::LessEqual,
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.triangle_pipeline = Some(triangle_pipeline);
        self.line_pipeline = Some(line_pipeline);
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth_view.is_some() && self.depth_viewport == ctx.viewport {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("petri sphere depth"),
            size: wgpu::Extent3d {
                width: ctx.viewport.width.max(1),
                height: ctx.viewport.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.depth_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_viewport = ctx.viewport;
    }
}

fn create_index_buffer(ctx: &RenderCtx<'_>, label: &str, capacity: usize) -> wgpu::Buffer {
    ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity.max(1) * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn write_indices(ctx: &RenderCtx<'_>, ibo: &wgpu::Buffer, indices: &[u32]) {
    if !indices.is_empty() {
        ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(indices));
    }
}
