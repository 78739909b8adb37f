//! Offscreen point cloud renderer.
//!
//! Holds one fixed-capacity storage buffer of point instances, rewritten
//! wholesale each frame when the pipeline publishes. Each point expands
//! to a 3-vertex triangle in the vertex shader and is clipped to a disc
//! in the fragment shader.

use crate::{read_texture_rgba, rgba_to_rgb, GpuContext, GpuError};
use glam::{Mat4, Vec3};
use image::RgbImage;
use parallax_data::CloudPoint;
use parallax_pipeline::PointSink;
use tracing::{debug, info};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU-side point instance. Matches the layout used by
/// `point_vertex.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct PointInstance {
    /// xyz position and render size packed into w.
    pub position_size: [f32; 4],
    /// rgb color (linear 0-1) and opacity in w.
    pub color: [f32; 4],
}

impl From<&CloudPoint> for PointInstance {
    fn from(point: &CloudPoint) -> Self {
        Self {
            position_size: [
                point.position.x,
                point.position.y,
                point.position.z,
                point.size,
            ],
            color: point.color.to_array(),
        }
    }
}

/// Shared camera uniform layout between host and shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_matrix: [[f32; 4]; 4],
    pub proj_matrix: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniforms {
    pub fn from_matrices(view: Mat4, proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_matrix: view.to_cols_array_2d(),
            proj_matrix: proj.to_cols_array_2d(),
            view_pos: [eye.x, eye.y, eye.z],
            _padding: 0.0,
        }
    }
}

/// Offscreen renderer implementing the pipeline's publish sink.
pub struct PointCloudRenderer {
    ctx: GpuContext,
    capacity: usize,
    point_count: u32,
    instances: Vec<PointInstance>,
    point_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl PointCloudRenderer {
    /// Create a renderer for a fixed point population and output size.
    pub fn new(ctx: GpuContext, capacity: usize, width: u32, height: u32) -> Self {
        let device = &ctx.device;
        info!(
            "Point cloud renderer: {} points, {}x{} output",
            capacity, width, height
        );

        let point_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Buffer"),
            size: (capacity * std::mem::size_of::<PointInstance>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(
                            std::num::NonZeroU64::new(std::mem::size_of::<CameraUniforms>() as u64)
                                .unwrap(),
                        ),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: point_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera_buffer.as_entire_binding(),
                },
            ],
        });

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point_vs"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/point_vertex.wgsl").into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point_fs"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/point_fragment.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Cloud Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cloud Color Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cloud Depth Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut renderer = Self {
            ctx,
            capacity,
            point_count: 0,
            instances: Vec::with_capacity(capacity),
            point_buffer,
            camera_buffer,
            bind_group,
            pipeline,
            color_texture,
            color_view,
            depth_view,
            width,
            height,
        };
        renderer.set_camera(
            Mat4::look_at_rh(Vec3::new(0.0, 0.0, -1.6), Vec3::new(0.0, 0.0, 0.5), Vec3::Y),
            Mat4::perspective_rh(
                45.0f32.to_radians(),
                width as f32 / height as f32,
                0.01,
                10.0,
            ),
            Vec3::new(0.0, 0.0, -1.6),
        );
        renderer
    }

    /// Update the camera uniform.
    pub fn set_camera(&mut self, view: Mat4, proj: Mat4, eye: Vec3) {
        let uniforms = CameraUniforms::from_matrices(view, proj, eye);
        self.ctx
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw the current buffer into the offscreen target.
    pub fn render(&self) {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cloud Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.025,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            // 3 vertices per point (triangle clipped to a disc)
            pass.draw(0..self.point_count * 3, 0..1);
        }
        self.ctx.queue.submit(Some(encoder.finish()));
    }

    /// Render and read the result back as an image.
    pub fn render_to_image(&self) -> Result<RgbImage, GpuError> {
        self.render();
        let rgba = read_texture_rgba(
            &self.ctx.device,
            &self.ctx.queue,
            &self.color_texture,
            self.width,
            self.height,
        )?;
        RgbImage::from_raw(self.width, self.height, rgba_to_rgb(&rgba))
            .ok_or_else(|| GpuError::Readback("render target size mismatch".to_string()))
    }

    pub fn point_count(&self) -> u32 {
        self.point_count
    }
}

impl PointSink for PointCloudRenderer {
    fn submit(&mut self, points: &[CloudPoint]) {
        assert!(
            points.len() <= self.capacity,
            "published cloud exceeds renderer capacity"
        );
        self.instances.clear();
        self.instances.extend(points.iter().map(PointInstance::from));
        self.ctx
            .queue
            .write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(&self.instances));
        self.point_count = points.len() as u32;
        debug!("Published {} points to renderer", self.point_count);
    }
}
