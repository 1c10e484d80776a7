//! wgpu rendering for the starfield.
//!
//! Frames accumulate in a persistent offscreen texture: each frame
//! first washes it with the translucent background color (so earlier
//! frames decay, the cross-frame motion blur), then draws the trail
//! strokes and star heads on top, and finally blits the result to the
//! swapchain. The swapchain itself is rewritten every frame; only the
//! accumulation texture carries state across frames.

mod shader;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::StarfieldConfig;
use crate::error::GpuError;
use crate::field::{DrawList, HeadInstance, SegmentInstance};
use crate::surface::Viewport;

/// Shared uniform block. Layout must match `Uniforms` in the WGSL.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    size: [f32; 2],
    _pad: [f32; 2],
    fade_color: [f32; 4],
    star_color: [f32; 4],
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    fade_pipeline: wgpu::RenderPipeline,
    segment_pipeline: wgpu::RenderPipeline,
    head_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,

    segment_buffer: wgpu::Buffer,
    segment_capacity: usize,
    head_buffer: wgpu::Buffer,
    head_capacity: usize,

    accum_view: wgpu::TextureView,
    /// True right after the accumulation texture was (re)created, so
    /// the next frame clears it instead of loading undefined contents.
    accum_fresh: bool,
    blit_bind_group: wgpu::BindGroup,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    base_color: [f32; 4],
    star_color: [f32; 4],
}

impl GpuState {
    pub async fn new(window: Arc<Window>, field_config: &StarfieldConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms {
            size: [config.width as f32, config.height as f32],
            _pad: [0.0; 2],
            fade_color: field_config.base_color,
            star_color: field_config.star_color,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Instance buffers sized for a full field; grown if a caller
        // ever produces more.
        let segment_capacity =
            (field_config.star_count as usize * field_config.trail_length.saturating_sub(1)).max(1);
        let segment_buffer = create_instance_buffer::<SegmentInstance>(
            &device,
            "Segment Instance Buffer",
            segment_capacity,
        );
        let head_capacity = (field_config.star_count as usize).max(1);
        let head_buffer =
            create_instance_buffer::<HeadInstance>(&device, "Head Instance Buffer", head_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Starfield Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let fade_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            "Fade",
            &shader::fade_shader(),
            &[],
            surface_format,
        );

        let segment_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        };
        let segment_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            "Segment",
            &shader::segment_shader(),
            std::slice::from_ref(&segment_layout),
            surface_format,
        );

        let head_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<HeadInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        };
        let head_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            "Head",
            &shader::head_shader(),
            std::slice::from_ref(&head_layout),
            surface_format,
        );

        // Blit pass: accumulation texture -> swapchain.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Accumulation Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
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

        let accum_view = create_accumulation_texture(&device, &config);
        let blit_bind_group = create_blit_bind_group(
            &device,
            &blit_bind_group_layout,
            &accum_view,
            &sampler,
        );

        let blit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Blit Pipeline Layout"),
                bind_group_layouts: &[&blit_bind_group_layout],
                push_constant_ranges: &[],
            });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::blit_shader().into()),
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            fade_pipeline,
            segment_pipeline,
            head_pipeline,
            blit_pipeline,
            segment_buffer,
            segment_capacity,
            head_buffer,
            head_capacity,
            accum_view,
            accum_fresh: true,
            blit_bind_group,
            blit_bind_group_layout,
            sampler,
            base_color: field_config.base_color,
            star_color: field_config.star_color,
        })
    }

    /// Reconfigure the surface and reset the accumulation texture.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.accum_view = create_accumulation_texture(&self.device, &self.config);
            self.blit_bind_group = create_blit_bind_group(
                &self.device,
                &self.blit_bind_group_layout,
                &self.accum_view,
                &self.sampler,
            );
            self.accum_fresh = true;
        }
    }

    /// Draw one frame. `flush` makes the background wash opaque,
    /// erasing accumulated ghosting.
    pub fn render(
        &mut self,
        view: Viewport,
        draw: &DrawList,
        flush: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        self.upload_instances(draw);

        let fade_alpha = if flush { 1.0 } else { self.base_color[3] };
        let uniforms = Uniforms {
            size: [view.width.max(1.0), view.height.max(1.0)],
            _pad: [0.0; 2],
            fade_color: [
                self.base_color[0],
                self.base_color[1],
                self.base_color[2],
                fade_alpha,
            ],
            star_color: self.star_color,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.surface.get_current_texture()?;
        let swapchain_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Starfield Encoder"),
            });

        // Accumulation pass: fade wash, then trails, then heads.
        {
            let load = if self.accum_fresh {
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: self.base_color[0] as f64,
                    g: self.base_color[1] as f64,
                    b: self.base_color[2] as f64,
                    a: 1.0,
                })
            } else {
                wgpu::LoadOp::Load
            };
            self.accum_fresh = false;

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Accumulation Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.accum_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            pass.set_pipeline(&self.fade_pipeline);
            pass.draw(0..3, 0..1);

            if !draw.segments.is_empty() {
                pass.set_pipeline(&self.segment_pipeline);
                pass.set_vertex_buffer(0, self.segment_buffer.slice(..));
                pass.draw(0..6, 0..draw.segments.len() as u32);
            }

            if !draw.heads.is_empty() {
                pass.set_pipeline(&self.head_pipeline);
                pass.set_vertex_buffer(0, self.head_buffer.slice(..));
                pass.draw(0..6, 0..draw.heads.len() as u32);
            }
        }

        // Blit pass: accumulation texture -> swapchain.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swapchain_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn upload_instances(&mut self, draw: &DrawList) {
        if draw.segments.len() > self.segment_capacity {
            self.segment_capacity = draw.segments.len().next_power_of_two();
            self.segment_buffer = create_instance_buffer::<SegmentInstance>(
                &self.device,
                "Segment Instance Buffer",
                self.segment_capacity,
            );
        }
        if draw.heads.len() > self.head_capacity {
            self.head_capacity = draw.heads.len().next_power_of_two();
            self.head_buffer = create_instance_buffer::<HeadInstance>(
                &self.device,
                "Head Instance Buffer",
                self.head_capacity,
            );
        }

        if !draw.segments.is_empty() {
            self.queue
                .write_buffer(&self.segment_buffer, 0, bytemuck::cast_slice(&draw.segments));
        }
        if !draw.heads.is_empty() {
            self.queue
                .write_buffer(&self.head_buffer, 0, bytemuck::cast_slice(&draw.heads));
        }
    }
}

fn create_instance_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity * std::mem::size_of::<T>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_accumulation_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Accumulation Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_blit_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    accum_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Blit Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(accum_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    shader_src: &str,
    vertex_buffers: &[wgpu::VertexBufferLayout],
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
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
        multiview: None,
        cache: None,
    })
}
