//! Compute module - Host-side simulation math and the GPU backend.

mod dispatch;
mod geometry;
mod life;
mod ping_pong;
mod ticker;

pub mod gpu;

pub use dispatch::*;
pub use geometry::*;
pub use life::*;
pub use ping_pong::*;
pub use ticker::*;
