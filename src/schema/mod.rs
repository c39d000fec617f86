//! Schema module - Configuration and seeding types for the GPU demos.

mod config;
mod seed;

pub use config::*;
pub use seed::*;
