//! GPU rotating cube - textured, depth-tested, redrawn every frame.

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER, GpuContext, GpuError};
use crate::compute::{
    CUBE_POSITION_OFFSET, CUBE_UV_OFFSET, CUBE_VERTEX_COUNT, CUBE_VERTEX_SIZE, cube_projection,
    cube_transform, cube_vertices,
};
use crate::schema::CubeConfig;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
const UNIFORM_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Rotating textured cube renderer.
pub struct GpuCube {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: CubeConfig,

    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    projection: Mat4,
    width: u32,
    height: u32,
}

impl GpuCube {
    /// Build all resources for a `width` x `height` target.
    pub fn new(
        ctx: &GpuContext,
        config: CubeConfig,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        texture_image: &image::RgbaImage,
    ) -> Result<Self, GpuError> {
        config.validate()?;
        let (texture_width, texture_height) = texture_image.dimensions();
        check_texture_size(
            texture_width,
            texture_height,
            ctx.device.limits().max_texture_dimension_2d,
        )?;
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let (width, height) = (width.max(1), height.max(1));

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube vertices"),
            contents: bytemuck::cast_slice(&cube_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cube Uniforms"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube vertex shader"),
            source: wgpu::ShaderSource::Wgsl(CUBE_VERTEX_SHADER.into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube fragment shader"),
            source: wgpu::ShaderSource::Wgsl(CUBE_FRAGMENT_SHADER.into()),
        });

        let bind_group_layout = create_cube_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("vertexMain"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: CUBE_VERTEX_SIZE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: CUBE_POSITION_OFFSET,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: CUBE_UV_OFFSET,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("fragmentMain"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let texture = upload_texture(&device, &queue, texture_image);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cube Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
            ],
        });

        let depth_view = create_depth_view(&device, width, height);
        let projection = cube_projection(&config, width as f32 / height as f32);

        log::info!(
            "Cube ready: {}x{} target, {}x{} texture",
            width,
            height,
            texture_image.width(),
            texture_image.height()
        );

        Ok(Self {
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            uniform_buffer,
            bind_group,
            _texture: texture,
            depth_view,
            projection,
            width,
            height,
        })
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    /// Current target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Recreate the depth buffer and projection for a new target size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.depth_view = create_depth_view(&self.device, width, height);
        self.projection = cube_projection(&self.config, width as f32 / height as f32);
    }

    /// Model-view-projection matrix at `seconds`.
    pub fn transform(&self, seconds: f32) -> Mat4 {
        cube_transform(self.projection, self.config.camera_distance, seconds)
    }

    /// Draw one frame into `view` with the cube posed at `seconds`.
    pub fn frame(&self, view: &wgpu::TextureView, seconds: f32) {
        let matrix = self.transform(seconds).to_cols_array();
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&matrix));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cube Encoder"),
            });
        {
            let [r, g, b, a] = self.config.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
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
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..CUBE_VERTEX_COUNT, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Decode the configured texture, or generate a checkerboard when none is set.
pub fn load_cube_texture(config: &CubeConfig) -> Result<image::RgbaImage, GpuError> {
    match &config.texture_path {
        Some(path) => {
            log::info!("Loading cube texture from {}", path.display());
            Ok(image::open(path)?.to_rgba8())
        }
        None => Ok(checkerboard_texture(256, 8)),
    }
}

/// A `size` x `size` checkerboard with `squares` squares per side.
pub fn checkerboard_texture(size: u32, squares: u32) -> image::RgbaImage {
    let cell = (size / squares.max(1)).max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([235, 235, 235, 255])
        } else {
            image::Rgba([40, 90, 160, 255])
        }
    })
}

/// Reject textures with an empty side or a side beyond `max` texels.
pub fn check_texture_size(width: u32, height: u32, max: u32) -> Result<(), GpuError> {
    if (1..=max).contains(&width) && (1..=max).contains(&height) {
        Ok(())
    } else {
        Err(GpuError::TextureSize { width, height, max })
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &image::RgbaImage,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Cube Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );
    texture
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
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
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_cube_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Cube Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
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
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
        ],
    })
}
