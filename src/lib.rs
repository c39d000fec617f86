//! GPU Life - WebGPU demos built on wgpu.
//!
//! Two small programs share one crate: Conway's Game of Life advanced by a
//! compute shader over a pair of ping-ponged storage buffers, and a rotating
//! textured cube drawn with a depth buffer.
//!
//! # Architecture
//!
//! - `schema`: Configuration types and seeding for the demos
//! - `compute`: Host-side math (dispatch sizing, ping-pong indexing, the tick
//!   schedule, cube geometry), the CPU reference rule, and the GPU backend
//! - `app`: The winit frame loop that drives a demo in a window
//!
//! # Example
//!
//! ```rust,no_run
//! use gpu_life::{
//!     compute::{LifeGrid, gpu::{GpuContext, GpuLife}},
//!     schema::{LifeConfig, Pattern, Seed},
//! };
//!
//! let config = LifeConfig {
//!     grid_size: 64,
//!     seed: Seed { pattern: Pattern::Glider { x: 1, y: 1 } },
//!     ..LifeConfig::default()
//! };
//!
//! let ctx = pollster::block_on(GpuContext::headless()).unwrap();
//! let mut life = GpuLife::new(&ctx, config.clone(), wgpu::TextureFormat::Rgba8Unorm).unwrap();
//! life.run(100);
//!
//! let mut reference = LifeGrid::from_config(&config);
//! reference.run(100);
//! assert_eq!(life.read_cells().unwrap(), reference.cells());
//! ```

pub mod app;
pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{LifeGrid, LifeStats, PingPong, Ticker};
pub use schema::{CubeConfig, LifeConfig, Pattern, Seed};
