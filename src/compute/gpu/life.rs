//! GPU Game of Life - compute simulation plus instanced cell rendering.

use wgpu::util::DeviceExt;

use super::{GpuContext, GpuError, cell_shader_source, life_compute_source};
use crate::compute::{
    CELL_VERTEX_COUNT, CELL_VERTEX_STRIDE, CELL_VERTICES, LifeStats, PingPong, grid_uniform,
    workgroup_count,
};
use crate::schema::LifeConfig;

/// GPU-resident Game of Life with double-buffered cell state.
///
/// Owns every resource the frame loop touches. Bind group `i` reads state
/// buffer `i` and writes buffer `1 - i`; [`PingPong`] picks the group.
pub struct GpuLife {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: LifeConfig,

    // Pipelines
    cell_pipeline: wgpu::RenderPipeline,
    simulation_pipeline: wgpu::ComputePipeline,

    // GPU buffers
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    cell_state: [wgpu::Buffer; 2],
    staging_buffer: wgpu::Buffer,

    bind_groups: [wgpu::BindGroup; 2],
    ping_pong: PingPong,
    workgroups: u32,
    instances: u32,
}

impl GpuLife {
    /// Build all resources, seeding the grid from `config.seed`.
    ///
    /// `target_format` is the colour format the cell pipeline renders into.
    pub fn new(
        ctx: &GpuContext,
        config: LifeConfig,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, GpuError> {
        config.validate()?;
        state_buffer_layout(config.grid_size, &ctx.device.limits())?;
        let cells = config.seed.generate(config.grid_size);
        Self::with_cells(ctx, config, target_format, &cells)
    }

    /// Build all resources with explicit initial cell states.
    ///
    /// # Panics
    /// Panics if `cells.len()` differs from the configured cell count.
    pub fn with_cells(
        ctx: &GpuContext,
        config: LifeConfig,
        target_format: wgpu::TextureFormat,
        cells: &[u32],
    ) -> Result<Self, GpuError> {
        config.validate()?;
        let (state_size, instances) =
            state_buffer_layout(config.grid_size, &ctx.device.limits())?;
        assert_eq!(
            cells.len(),
            config.cell_count(),
            "initial state must hold one value per cell"
        );

        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        // 1. Vertex buffer
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell vertices"),
            size: std::mem::size_of_val(&CELL_VERTICES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&CELL_VERTICES));
        log::debug!("Vertex buffer populated: {} bytes", vertex_buffer.size());

        // 2. Uniform buffer
        let uniform = grid_uniform(config.grid_size);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Uniforms"),
            contents: bytemuck::cast_slice(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // 3. Cell state buffers
        let cell_state = ["Cell State A", "Cell State B"].map(|label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: state_size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        });
        queue.write_buffer(&cell_state[0], 0, bytemuck::cast_slice(cells));
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell State Staging"),
            size: state_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        log::debug!(
            "Cell state populated: {}x{} cells",
            config.grid_size,
            config.grid_size
        );

        // 4. Shader modules
        let cell_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell shader"),
            source: wgpu::ShaderSource::Wgsl(cell_shader_source().into()),
        });
        let simulation_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Game of Life simulation shader"),
            source: wgpu::ShaderSource::Wgsl(life_compute_source(config.workgroup_size).into()),
        });

        // 5. Binding layouts
        let bind_group_layout = create_cell_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cell Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        // 6. Pipelines
        let cell_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cell_shader,
                entry_point: Some("vertexMain"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: CELL_VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &cell_shader,
                entry_point: Some("fragmentMain"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        let simulation_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Simulation pipeline"),
                layout: Some(&pipeline_layout),
                module: &simulation_shader,
                entry_point: Some("computeMain"),
                compilation_options: Default::default(),
                cache: None,
            });
        log::debug!("Pipelines generated");

        // 7. Bind groups: set i reads buffer i and writes the other
        let bind_groups = [
            ("Cell renderer bind group A", 0usize),
            ("Cell renderer bind group B", 1usize),
        ]
        .map(|(label, read)| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: cell_state[read].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: cell_state[1 - read].as_entire_binding(),
                    },
                ],
            })
        });

        let workgroups = workgroup_count(config.grid_size, config.workgroup_size);
        log::info!(
            "Life ready: {0}x{0} grid, {1}x{1} workgroups of {2}x{2}",
            config.grid_size,
            workgroups,
            config.workgroup_size
        );

        Ok(Self {
            device,
            queue,
            config,
            cell_pipeline,
            simulation_pipeline,
            vertex_buffer,
            uniform_buffer,
            cell_state,
            staging_buffer,
            bind_groups,
            ping_pong: PingPong::new(),
            workgroups,
            instances,
        })
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    /// Number of completed simulation ticks.
    pub fn tick_count(&self) -> u64 {
        self.ping_pong.tick()
    }

    /// Workgroups dispatched along each axis per tick.
    pub fn workgroups(&self) -> u32 {
        self.workgroups
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    /// The state buffer holding the latest generation.
    pub fn current_state_buffer(&self) -> &wgpu::Buffer {
        self.ping_pong.select(&self.cell_state)
    }

    /// Encode one tick: a simulation dispatch, then a render pass that
    /// draws the generation the dispatch produced into `view`.
    pub fn encode_tick(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        self.encode_compute(encoder);
        self.ping_pong.advance();
        self.encode_render(encoder, view);
    }

    /// Run one tick and submit it. Does not wait for the GPU.
    pub fn tick(&mut self, view: &wgpu::TextureView) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Tick Encoder"),
            });
        self.encode_tick(&mut encoder, view);
        self.queue.submit(std::iter::once(encoder.finish()));
        log::trace!("Submitted tick {}", self.ping_pong.tick());
    }

    /// Draw the latest generation without advancing the simulation.
    pub fn render(&self, view: &wgpu::TextureView) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Redraw Encoder"),
            });
        self.encode_render(&mut encoder, view);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Advance the simulation one generation without drawing.
    pub fn step(&mut self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Step Encoder"),
            });
        self.encode_compute(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
        self.ping_pong.advance();
    }

    /// Advance the simulation `steps` generations without drawing.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn encode_compute(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Simulation Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.simulation_pipeline);
        pass.set_bind_group(0, self.ping_pong.select(&self.bind_groups), &[]);
        pass.dispatch_workgroups(self.workgroups, self.workgroups, 1);
    }

    fn encode_render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let [r, g, b, a] = self.config.clear_color;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.cell_pipeline);
        pass.set_bind_group(0, self.ping_pong.select(&self.bind_groups), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..CELL_VERTEX_COUNT, 0..self.instances);
    }

    /// Copy the latest generation back to the host. Blocks until the GPU
    /// has finished all submitted work.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_cells(&self) -> Result<Vec<u32>, GpuError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(
            self.current_state_buffer(),
            0,
            &self.staging_buffer,
            0,
            self.staging_buffer.size(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::wait_indefinitely())?;
        rx.recv().map_err(|_| GpuError::BufferMapAborted)??;

        let cells = {
            let data = buffer_slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&data).to_vec()
        };
        self.staging_buffer.unmap();
        Ok(cells)
    }

    /// Statistics of the latest generation, read back from the GPU.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn stats(&self) -> Result<LifeStats, GpuError> {
        let cells = self.read_cells()?;
        Ok(LifeStats::from_cells(&cells, self.tick_count()))
    }
}

/// Byte size of one cell-state buffer and the number of cell instances
/// drawn, for a grid that fits within `limits`.
pub fn state_buffer_layout(
    grid_size: u32,
    limits: &wgpu::Limits,
) -> Result<(u64, u32), GpuError> {
    let limit = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    let too_large = || GpuError::GridTooLarge { grid_size, limit };

    let instances = grid_size.checked_mul(grid_size).ok_or_else(too_large)?;
    let bytes = u64::from(instances) * std::mem::size_of::<u32>() as u64;
    if bytes > limit {
        return Err(too_large());
    }
    Ok((bytes, instances))
}

fn create_cell_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Cell Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX
                    | wgpu::ShaderStages::FRAGMENT
                    | wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::LifeGrid;
    use crate::schema::{Pattern, Seed};

    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    fn test_config(grid_size: u32, seed: u64) -> LifeConfig {
        LifeConfig {
            grid_size,
            seed: Seed {
                pattern: Pattern::Random {
                    threshold: 0.6,
                    seed: Some(seed),
                },
            },
            ..LifeConfig::default()
        }
    }

    fn context() -> Option<GpuContext> {
        match pollster::block_on(GpuContext::headless()) {
            Ok(ctx) => Some(ctx),
            Err(GpuError::NoAdapter) => {
                eprintln!("Skipping GPU test: no adapter available");
                None
            }
            Err(e) => panic!("Failed to create GPU context: {:?}", e),
        }
    }

    fn offscreen_view(ctx: &GpuContext, size: u32) -> wgpu::TextureView {
        ctx.device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Offscreen Target"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TARGET_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn test_state_buffer_layout_within_default_limits() {
        let limits = wgpu::Limits::default();
        assert_eq!(state_buffer_layout(100, &limits).unwrap(), (40_000, 10_000));
        // 5792^2 * 4 bytes fits in 128 MiB; 5793^2 * 4 does not.
        assert!(state_buffer_layout(5_792, &limits).is_ok());
        assert!(matches!(
            state_buffer_layout(5_793, &limits),
            Err(GpuError::GridTooLarge { grid_size: 5_793, .. })
        ));
        assert!(matches!(
            state_buffer_layout(6_000, &limits),
            Err(GpuError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_state_buffer_layout_instance_overflow() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: u32::MAX.into(),
            max_buffer_size: u64::MAX,
            ..wgpu::Limits::default()
        };
        assert!(state_buffer_layout(65_535, &limits).is_ok());
        assert!(matches!(
            state_buffer_layout(65_536, &limits),
            Err(GpuError::GridTooLarge { .. })
        ));
        assert!(matches!(
            state_buffer_layout(70_000, &limits),
            Err(GpuError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let Some(ctx) = context() else { return };
        let config = LifeConfig {
            grid_size: 6_000,
            ..LifeConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(matches!(
            GpuLife::new(&ctx, config, TARGET_FORMAT),
            Err(GpuError::GridTooLarge { grid_size: 6_000, .. })
        ));
    }

    #[test]
    fn test_resource_sizes() {
        let Some(ctx) = context() else { return };
        let life = GpuLife::new(&ctx, test_config(100, 1), TARGET_FORMAT).unwrap();

        assert_eq!(life.vertex_buffer().size(), (CELL_VERTICES.len() * 4) as u64);
        assert_eq!(life.uniform_buffer().size(), 8);
        assert_eq!(life.current_state_buffer().size(), 100 * 100 * 4);
        assert_eq!(life.workgroups(), 13);
    }

    #[test]
    fn test_initial_state_round_trips() {
        let Some(ctx) = context() else { return };
        let config = test_config(64, 9);
        let expected = config.seed.generate(config.grid_size);
        let life = GpuLife::new(&ctx, config, TARGET_FORMAT).unwrap();

        let cells = life.read_cells().unwrap();
        assert_eq!(cells.len(), 64 * 64);
        assert!(cells.iter().all(|&c| c <= 1));
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_gpu_cpu_equivalence() {
        let Some(ctx) = context() else { return };
        // 100 is not a multiple of the workgroup size, so edge invocations
        // must be discarded.
        let config = test_config(100, 3);
        let mut cpu = LifeGrid::from_config(&config);
        let mut gpu = GpuLife::with_cells(&ctx, config, TARGET_FORMAT, cpu.cells()).unwrap();

        for step in 1..=8 {
            cpu.step();
            gpu.step();
            let cells = gpu.read_cells().unwrap();
            assert_eq!(cells, cpu.cells(), "GPU/CPU mismatch at step {step}");
        }
        assert_eq!(gpu.tick_count(), 8);
    }

    #[test]
    fn test_ticks_render_latest_generation() {
        let Some(ctx) = context() else { return };
        let config = LifeConfig {
            grid_size: 16,
            seed: Seed {
                pattern: Pattern::Blinker { x: 6, y: 8 },
            },
            ..LifeConfig::default()
        };
        let mut cpu = LifeGrid::from_config(&config);
        let view = offscreen_view(&ctx, 64);
        let mut gpu = GpuLife::new(&ctx, config, TARGET_FORMAT).unwrap();

        for _ in 0..5 {
            gpu.tick(&view);
            cpu.step();
            assert_eq!(gpu.read_cells().unwrap(), cpu.cells());
        }
        assert_eq!(gpu.stats().unwrap().population, 3);

        // Redraw leaves the simulation where it was.
        gpu.render(&view);
        assert_eq!(gpu.tick_count(), 5);
    }
}
