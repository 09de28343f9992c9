use anyhow::{Context, Result};
use flatshade::{interface, shader, FillColor, Uniforms, Vertex};

use crate::mesh::MeshBuffers;

/// Render pipeline for the flatshade stages plus its uniform binding.
///
/// Owns the uniform buffer bound at group 0, binding 0. The buffer is written
/// once per frame before the draw is recorded.
pub struct FlatPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    warned_non_finite: bool,
}

impl FlatPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, fill: FillColor) -> Result<Self> {
        // Catch layout drift before the driver does.
        interface::check(shader::SOURCE).context("shader does not match the host binding layout")?;

        let module = device.create_shader_module(shader::module_descriptor());

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flatshade uniforms bgl"),
            entries: &[Uniforms::layout_entry()],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flatshade pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let constants = fill.pipeline_constants();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flatshade pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(shader::VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(shader::FRAGMENT_ENTRY),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    ..Default::default()
                },
                targets: &[Some(shader::color_target(format))],
            }),

            primitive: shader::primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flatshade uniforms"),
            size: Uniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flatshade uniforms bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: Uniforms::BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!("flatshade pipeline created for {format:?}, fill {:?}", fill.to_array());

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            warned_non_finite: false,
        })
    }

    /// Uploads this frame's transform.
    ///
    /// A matrix with non-finite entries is not uploaded; the previous
    /// frame's transform stays bound.
    pub fn write_uniforms(&mut self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        if !uniforms.is_finite() {
            if !self.warned_non_finite {
                log::warn!("non-finite view_proj; keeping previous transform");
                self.warned_non_finite = true;
            }
            return;
        }
        queue.write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());
    }

    /// Records one pass that clears `view` and draws every mesh.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear: wgpu::Color,
        meshes: &[MeshBuffers],
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("flatshade pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(Uniforms::GROUP, &self.bind_group, &[]);

        for mesh in meshes {
            if mesh.index_count == 0 {
                continue;
            }
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
