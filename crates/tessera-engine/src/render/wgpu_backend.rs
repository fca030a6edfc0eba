use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::raster::Bitmap;

use super::backend::{GpuBackend, TextureOwner};
use super::error::RenderError;
use super::vertex::Vertex;
use super::{RenderCtx, RenderTarget};

// ── per-draw uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    frame_size: [f32; 2],
    is_textured: u32,
    _pad: u32, // 16-byte alignment
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

// ── recorded frame ────────────────────────────────────────────────────────

/// Texture used by a recorded draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Slot {
    /// 1×1 white; sampled by colored draws and anything drawn before a bind.
    White,
    Atlas,
    /// Index into the frame's image list.
    Image(usize),
}

#[derive(Debug, Clone)]
struct DrawRecord {
    vertices: Range<u32>,
    uniform: DrawUniform,
    slot: Slot,
}

/// wgpu implementation of [`GpuBackend`].
///
/// Backend calls are recorded on the CPU as the renderer issues them and
/// replayed by [`render`](Self::render) into a single render pass. Every draw
/// keeps its own vertex range, uniform slot and texture, so several flushes
/// per frame do not overwrite each other before the queue executes them.
///
/// The font atlas is kept for the backend's lifetime and uploaded again only
/// when the pipeline is rebuilt. Image textures live for one frame.
pub struct WgpuBackend {
    // pipeline
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    uniform_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,

    // textures
    sampler: Option<wgpu::Sampler>,
    white: Option<wgpu::BindGroup>,
    atlas: Option<wgpu::BindGroup>,
    atlas_image: Option<Bitmap>,
    images: Vec<Bitmap>,

    // buffers
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_capacity: u64,

    // current frame
    frame_size: [f32; 2],
    clear_color: Option<Color>,
    textured: bool,
    slot: Slot,
    vertices: Vec<Vertex>,
    staged: Range<u32>,
    draws: Vec<DrawRecord>,
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            uniform_layout: None,
            texture_layout: None,
            sampler: None,
            white: None,
            atlas: None,
            atlas_image: None,
            images: Vec::new(),
            vertex_buffer: None,
            vertex_capacity: 0,
            uniform_buffer: None,
            uniform_bind_group: None,
            uniform_capacity: 0,
            frame_size: [1.0, 1.0],
            clear_color: None,
            textured: false,
            slot: Slot::White,
            vertices: Vec::new(),
            staged: 0..0,
            draws: Vec::new(),
        }
    }
}

impl WgpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draws recorded since the last [`render`](Self::render).
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Replays the recorded frame into `target` and resets the recording.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), RenderError> {
        let result = self.encode(ctx, target);
        self.discard_frame();
        result
    }

    /// Drops the recorded frame without rendering it.
    ///
    /// Used when no surface texture could be acquired.
    pub fn discard_frame(&mut self) {
        self.clear_color = None;
        self.images.clear();
        self.vertices.clear();
        self.staged = 0..0;
        self.draws.clear();
        if self.slot != Slot::Atlas {
            self.slot = Slot::White;
        }
    }

    fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), RenderError> {
        self.ensure_pipeline(ctx)?;
        self.ensure_textures(ctx);

        // Mutating methods must happen before borrowing pipeline/buffers immutably.
        let image_groups = self.upload_images(ctx);
        self.upload_vertex_data(ctx);
        let stride = self.upload_uniforms(ctx);

        let load = match self.clear_color {
            Some(c) => wgpu::LoadOp::Clear(c.into()),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera quad pass"),
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

        if self.draws.is_empty() {
            return Ok(());
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(uniforms) = self.uniform_bind_group.as_ref() else { return Ok(()) };
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return Ok(()) };
        let Some(white) = self.white.as_ref() else { return Ok(()) };

        let vw = (self.frame_size[0] * ctx.scale_factor).min(target.width as f32);
        let vh = (self.frame_size[1] * ctx.scale_factor).min(target.height as f32);
        if vw >= 1.0 && vh >= 1.0 {
            rpass.set_viewport(0.0, 0.0, vw, vh, 0.0, 1.0);
        }

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));

        for (i, draw) in self.draws.iter().enumerate() {
            if draw.vertices.is_empty() {
                continue;
            }
            let textures = match draw.slot {
                Slot::White => white,
                Slot::Atlas => self.atlas.as_ref().unwrap_or(white),
                Slot::Image(idx) => image_groups.get(idx).unwrap_or(white),
            };
            rpass.set_bind_group(0, uniforms, &[(i as u64 * stride) as u32]);
            rpass.set_bind_group(1, textures, &[]);
            rpass.draw(draw.vertices.clone(), 0..1);
        }

        log::trace!("rendered {} draws", self.draws.len());
        Ok(())
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let info = pollster::block_on(shader.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
            .map(|m| match m.location {
                Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                None => m.message.clone(),
            })
            .collect();
        if !errors.is_empty() {
            return Err(RenderError::Shader(errors.join("\n")));
        }

        let uniform_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tessera draw uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                    },
                    count: None,
                }],
            });

        let texture_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tessera texture bgl"),
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
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tessera quad pipeline layout"),
                bind_group_layouts: &[&uniform_layout, &texture_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera quad pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
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
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("quad pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.uniform_layout = Some(uniform_layout);
        self.texture_layout = Some(texture_layout);

        // Bind groups reference the old layouts.
        self.white = None;
        self.atlas = None;
        self.uniform_bind_group = None;
        self.uniform_buffer = None;
        self.uniform_capacity = 0;
        Ok(())
    }

    fn ensure_textures(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("tessera sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }

        if self.white.is_none() {
            let mut white = Bitmap::new(1, 1, 4);
            white.as_bytes_mut().fill(0xFF);
            self.white = self.texture_bind_group(
                ctx,
                &white,
                wgpu::TextureFormat::Rgba8Unorm,
                "tessera white",
            );
        }

        if self.atlas.is_none() {
            if let Some(image) = self.atlas_image.as_ref() {
                // Coverage, not color: keep it linear.
                let group = self.texture_bind_group(
                    ctx,
                    image,
                    wgpu::TextureFormat::Rgba8Unorm,
                    "tessera font atlas",
                );
                log::debug!("font atlas uploaded ({}x{})", image.width(), image.height());
                self.atlas = group;
            }
        }
    }

    fn upload_images(&self, ctx: &RenderCtx<'_>) -> Vec<wgpu::BindGroup> {
        self.images
            .iter()
            .filter_map(|image| {
                self.texture_bind_group(
                    ctx,
                    image,
                    wgpu::TextureFormat::Rgba8UnormSrgb,
                    "tessera image",
                )
            })
            .collect()
    }

    fn texture_bind_group(
        &self,
        ctx: &RenderCtx<'_>,
        bitmap: &Bitmap,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Option<wgpu::BindGroup> {
        let layout = self.texture_layout.as_ref()?;
        let sampler = self.sampler.as_ref()?;

        let size = wgpu::Extent3d {
            width: bitmap.width(),
            height: bitmap.height(),
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.stride() as u32),
                rows_per_image: Some(bitmap.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }))
    }

    fn upload_vertex_data(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertices.is_empty() {
            return;
        }

        let required = self.vertices.len();
        if required > self.vertex_capacity || self.vertex_buffer.is_none() {
            let new_cap = required.next_power_of_two().max(1024);
            self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tessera vertex buffer"),
                size: (new_cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = new_cap;
        }

        if let Some(vbo) = self.vertex_buffer.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertices));
        }
    }

    /// Writes one uniform slot per draw and returns the slot stride.
    fn upload_uniforms(&mut self, ctx: &RenderCtx<'_>) -> u64 {
        let align = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment).max(1);
        let stride = UNIFORM_SIZE.div_ceil(align) * align;

        let slots = (self.draws.len() as u64).max(1);
        if slots > self.uniform_capacity || self.uniform_bind_group.is_none() {
            let Some(layout) = self.uniform_layout.as_ref() else { return stride };
            let new_cap = slots.next_power_of_two().max(16);
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tessera draw uniforms"),
                size: new_cap * stride,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tessera draw uniform bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(UNIFORM_SIZE),
                    }),
                }],
            });
            self.uniform_buffer = Some(buffer);
            self.uniform_bind_group = Some(bind_group);
            self.uniform_capacity = new_cap;
        }

        if self.draws.is_empty() {
            return stride;
        }

        let mut bytes = vec![0u8; (self.draws.len() as u64 * stride) as usize];
        for (chunk, draw) in bytes.chunks_exact_mut(stride as usize).zip(&self.draws) {
            chunk[..UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&draw.uniform));
        }
        if let Some(ubo) = self.uniform_buffer.as_ref() {
            ctx.queue.write_buffer(ubo, 0, &bytes);
        }
        stride
    }
}

impl GpuBackend for WgpuBackend {
    fn set_frame_size(&mut self, width: f32, height: f32) {
        self.frame_size = [width.max(1.0), height.max(1.0)];
    }

    fn clear(&mut self, color: Color) {
        if !self.draws.is_empty() {
            log::debug!("clear discards {} recorded draws", self.draws.len());
            self.draws.clear();
        }
        self.clear_color = Some(color);
    }

    fn set_textured(&mut self, textured: bool) {
        self.textured = textured;
    }

    fn bind_texture(&mut self, owner: TextureOwner, image: &Bitmap) {
        if image.width() == 0 || image.height() == 0 {
            log::warn!("ignoring bind of an empty {owner:?} texture");
            self.slot = Slot::White;
            return;
        }
        match owner {
            TextureOwner::FontAtlas => {
                if self.atlas_image.is_none() {
                    self.atlas_image = Some(image.clone());
                }
                self.slot = Slot::Atlas;
            }
            TextureOwner::Image => {
                self.images.push(image.clone());
                self.slot = Slot::Image(self.images.len() - 1);
            }
        }
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.staged = start..self.vertices.len() as u32;
    }

    fn draw(&mut self, vertex_count: u32) {
        let count = vertex_count.min(self.staged.end - self.staged.start);
        let start = self.staged.start;
        self.draws.push(DrawRecord {
            vertices: start..start + count,
            uniform: DrawUniform {
                frame_size: self.frame_size,
                is_textured: u32::from(self.textured),
                _pad: 0,
            },
            slot: if self.textured { self.slot } else { Slot::White },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_bytes() {
        assert_eq!(UNIFORM_SIZE, 16);
    }

    #[test]
    fn draws_keep_their_own_vertex_ranges() {
        let mut b = WgpuBackend::new();
        b.set_frame_size(800.0, 450.0);
        b.set_textured(false);
        b.upload_vertices(&[Vertex::default(); 12]);
        b.draw(12);
        b.set_textured(true);
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);

        assert_eq!(b.pending_draws(), 2);
        assert_eq!(b.draws[0].vertices, 0..12);
        assert_eq!(b.draws[1].vertices, 12..18);
        assert_eq!(b.draws[0].uniform.is_textured, 0);
        assert_eq!(b.draws[1].uniform.is_textured, 1);
        assert_eq!(b.draws[1].uniform.frame_size, [800.0, 450.0]);
    }

    #[test]
    fn draw_count_is_clamped_to_the_last_upload() {
        let mut b = WgpuBackend::new();
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(60);
        assert_eq!(b.draws[0].vertices, 0..6);
    }

    #[test]
    fn binds_select_the_texture_of_later_draws() {
        let mut b = WgpuBackend::new();
        let atlas = Bitmap::new(8, 8, 4);
        let image = Bitmap::new(2, 2, 4);

        b.bind_texture(TextureOwner::FontAtlas, &atlas);
        b.set_textured(true);
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);

        b.bind_texture(TextureOwner::Image, &image);
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);

        b.set_textured(false);
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);

        let slots: Vec<Slot> = b.draws.iter().map(|d| d.slot).collect();
        assert_eq!(slots, vec![Slot::Atlas, Slot::Image(0), Slot::White]);
        assert!(b.atlas_image.is_some());

        b.discard_frame();
        assert_eq!(b.pending_draws(), 0);
        assert!(b.images.is_empty());
        assert_eq!(b.slot, Slot::White);
    }

    #[test]
    fn atlas_is_kept_from_the_first_bind() {
        let mut b = WgpuBackend::new();
        let atlas = Bitmap::new(8, 8, 4);
        b.bind_texture(TextureOwner::FontAtlas, &atlas);
        b.bind_texture(TextureOwner::Image, &Bitmap::new(1, 1, 4));
        b.bind_texture(TextureOwner::FontAtlas, &Bitmap::new(16, 16, 4));
        assert_eq!(b.atlas_image.as_ref().map(Bitmap::width), Some(8));
        assert_eq!(b.slot, Slot::Atlas);
    }

    #[test]
    fn clear_discards_recorded_draws() {
        let mut b = WgpuBackend::new();
        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);
        assert_eq!(b.pending_draws(), 1);

        b.clear(Color::RED);
        assert_eq!(b.pending_draws(), 0);
        assert_eq!(b.clear_color, Some(Color::RED));

        b.upload_vertices(&[Vertex::default(); 6]);
        b.draw(6);
        assert_eq!(b.pending_draws(), 1);
        assert_eq!(b.clear_color, Some(Color::RED));
    }
}
