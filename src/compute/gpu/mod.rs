//! GPU Backend for the demos
//!
//! Context setup, shader assembly and the per-demo resource builders using
//! WebGPU (wgpu).

mod cube;
mod life;

pub use cube::{GpuCube, check_texture_size, checkerboard_texture, load_cube_texture};
pub use life::{GpuLife, state_buffer_layout};

use crate::schema::ConfigError;

// Embed shader sources at compile time
pub(crate) const CELL_VERTEX_SHADER: &str = include_str!("shaders/cell.vert.wgsl");
pub(crate) const CELL_FRAGMENT_SHADER: &str = include_str!("shaders/cell.frag.wgsl");
pub(crate) const LIFE_COMPUTE_SHADER: &str = include_str!("shaders/life.comp.wgsl");
pub(crate) const CUBE_VERTEX_SHADER: &str = include_str!("shaders/cube.vert.wgsl");
pub(crate) const CUBE_FRAGMENT_SHADER: &str = include_str!("shaders/cube.frag.wgsl");

/// Error type for GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("Buffer mapping callback was dropped")]
    BufferMapAborted,

    #[error("Device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("Grid of {grid_size}x{grid_size} cells exceeds the device limit of {limit} bytes per state buffer")]
    GridTooLarge { grid_size: u32, limit: u64 },

    #[error("Texture of {width}x{height} texels is outside 1..={max} per side")]
    TextureSize { width: u32, height: u32, max: u32 },

    #[error("Failed to load texture: {0}")]
    Texture(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Adapter, device and queue shared by every pipeline of a demo.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Create the wgpu instance every context is requested from.
    pub fn instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Acquire an adapter and device, compatible with `surface` when given.
    ///
    /// Any failure here is fatal for the demos: there is no fallback path.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("GPU Life"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        log::info!("Device acquired");

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    /// Acquire a context with no presentation surface.
    pub async fn headless() -> Result<Self, GpuError> {
        let instance = Self::instance();
        Self::new(&instance, None).await
    }
}

/// Join shader sources into one module, separated by newlines.
pub fn compose_shader(parts: &[&str]) -> String {
    parts.join("\n")
}

/// Simulation shader source with the workgroup size baked in.
pub fn life_compute_source(workgroup_size: u32) -> String {
    let header = format!("const WORKGROUP_SIZE: u32 = {workgroup_size}u;");
    compose_shader(&[&header, LIFE_COMPUTE_SHADER])
}

/// Vertex and fragment sources of the cell renderer as one module.
pub fn cell_shader_source() -> String {
    compose_shader(&[CELL_VERTEX_SHADER, CELL_FRAGMENT_SHADER])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_shader_joins_with_newline() {
        assert_eq!(compose_shader(&["a", "b", "c"]), "a\nb\nc");
        assert_eq!(compose_shader(&["only"]), "only");
    }

    #[test]
    fn test_cell_shader_contains_both_stages() {
        let source = cell_shader_source();
        assert!(source.contains("fn vertexMain"));
        assert!(source.contains("fn fragmentMain"));
        assert!(source.find("fn vertexMain") < source.find("fn fragmentMain"));
    }

    #[test]
    fn test_compute_source_declares_workgroup_size() {
        let source = life_compute_source(16);
        assert!(source.starts_with("const WORKGROUP_SIZE: u32 = 16u;\n"));
        assert!(source.contains("@workgroup_size(WORKGROUP_SIZE, WORKGROUP_SIZE)"));
        assert!(source.contains("fn computeMain"));
    }

    #[test]
    fn test_poll_failure_converts() {
        let err: GpuError = wgpu::PollError::Timeout.into();
        assert!(matches!(err, GpuError::Poll(_)));
        assert!(err.to_string().starts_with("Device poll failed"));
    }

    #[test]
    fn test_headless_context() {
        match pollster::block_on(GpuContext::headless()) {
            Ok(ctx) => assert!(ctx.device.limits().max_storage_buffers_per_shader_stage > 0),
            Err(GpuError::NoAdapter) => eprintln!("Skipping GPU test: no adapter available"),
            Err(e) => panic!("Failed to create GPU context: {:?}", e),
        }
    }
}
