//! The two windowed demos: the Game of Life grid and the spinning cube.

use std::time::Duration;

use super::{Demo, SurfaceState, Wake};
use crate::compute::Ticker;
use crate::compute::gpu::{GpuContext, GpuCube, GpuError, GpuLife};
use crate::schema::{CubeConfig, LifeConfig};

/// How often a tick is logged at debug level.
const TICK_LOG_INTERVAL: u64 = 100;

/// What a Life frame does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Advance one generation and draw it.
    Tick,
    /// Draw the current generation again.
    Redraw,
}

/// Consume the tick due at `elapsed`, if any, and pick the frame's work.
pub fn frame_action(ticker: &mut Ticker, elapsed: Duration) -> FrameAction {
    if ticker.poll(elapsed) {
        FrameAction::Tick
    } else {
        FrameAction::Redraw
    }
}

/// When the Life loop should wake next.
pub fn life_wake(ticker: &Ticker, elapsed: Duration) -> Wake {
    if ticker.is_due(elapsed) {
        Wake::Now
    } else {
        Wake::At(ticker.next_deadline())
    }
}

/// Game of Life on a fixed-interval tick.
///
/// Each due tick runs one compute pass and draws the new generation in the
/// same submission. Redraws between ticks show the current generation.
pub struct LifeDemo {
    life: GpuLife,
    ticker: Ticker,
}

impl LifeDemo {
    pub fn life(&self) -> &GpuLife {
        &self.life
    }
}

impl Demo for LifeDemo {
    type Config = LifeConfig;

    const TITLE: &'static str = "Game of Life";

    fn create(
        ctx: &GpuContext,
        surface: &SurfaceState,
        config: LifeConfig,
    ) -> Result<Self, GpuError> {
        let ticker = Ticker::from_millis(config.update_interval_ms);
        log::info!(
            "Game of Life: {0}x{0} grid, {1} ms per tick",
            config.grid_size,
            config.update_interval_ms
        );
        let life = GpuLife::new(ctx, config, surface.format())?;
        Ok(Self { life, ticker })
    }

    fn draw(&mut self, view: &wgpu::TextureView, elapsed: Duration) {
        match frame_action(&mut self.ticker, elapsed) {
            FrameAction::Tick => {
                self.life.tick(view);
                let ticks = self.life.tick_count();
                if ticks % TICK_LOG_INTERVAL == 0 {
                    log::debug!("Tick {ticks}");
                }
            }
            FrameAction::Redraw => self.life.render(view),
        }
    }

    fn wake(&self, elapsed: Duration) -> Wake {
        life_wake(&self.ticker, elapsed)
    }
}

/// Everything the cube demo needs before a window exists.
#[derive(Debug, Clone)]
pub struct CubeSetup {
    pub config: CubeConfig,
    pub texture: image::RgbaImage,
}

impl CubeSetup {
    /// Load the texture named by `config`, falling back to a checkerboard.
    pub fn load(config: CubeConfig) -> Result<Self, GpuError> {
        config.validate()?;
        let texture = crate::compute::gpu::load_cube_texture(&config)?;
        Ok(Self { config, texture })
    }
}

/// A textured cube spinning continuously.
pub struct CubeDemo {
    cube: GpuCube,
}

impl Demo for CubeDemo {
    type Config = CubeSetup;

    const TITLE: &'static str = "Textured Cube";

    fn create(
        ctx: &GpuContext,
        surface: &SurfaceState,
        setup: CubeSetup,
    ) -> Result<Self, GpuError> {
        let (width, height) = surface.size();
        let cube = GpuCube::new(
            ctx,
            setup.config,
            surface.format(),
            width,
            height,
            &setup.texture,
        )?;
        Ok(Self { cube })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.cube.resize(width, height);
    }

    fn draw(&mut self, view: &wgpu::TextureView, elapsed: Duration) {
        self.cube.frame(view, elapsed.as_secs_f32());
    }

    fn wake(&self, _elapsed: Duration) -> Wake {
        Wake::Now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_life_frames_follow_ticker() {
        let mut ticker = Ticker::from_millis(100);

        assert_eq!(life_wake(&ticker, ms(50)), Wake::At(ms(100)));
        assert_eq!(frame_action(&mut ticker, ms(50)), FrameAction::Redraw);

        assert_eq!(life_wake(&ticker, ms(100)), Wake::Now);
        assert_eq!(frame_action(&mut ticker, ms(100)), FrameAction::Tick);
        // A second frame in the same interval only redraws.
        assert_eq!(frame_action(&mut ticker, ms(101)), FrameAction::Redraw);
        assert_eq!(life_wake(&ticker, ms(101)), Wake::At(ms(200)));
    }

    #[test]
    fn test_late_frame_ticks_once() {
        let mut ticker = Ticker::from_millis(100);
        assert_eq!(frame_action(&mut ticker, ms(350)), FrameAction::Tick);
        assert_eq!(frame_action(&mut ticker, ms(350)), FrameAction::Redraw);
        assert_eq!(life_wake(&ticker, ms(350)), Wake::At(ms(450)));
    }

    #[test]
    fn test_cube_setup_defaults_to_checkerboard() {
        let setup = CubeSetup::load(CubeConfig::default()).unwrap();
        assert_eq!(setup.texture.dimensions(), (256, 256));
    }

    #[test]
    fn test_cube_setup_rejects_missing_texture() {
        let config = CubeConfig {
            texture_path: Some("/nonexistent/texture.png".into()),
            ..Default::default()
        };
        assert!(matches!(
            CubeSetup::load(config),
            Err(GpuError::Texture(_))
        ));
    }

    #[test]
    fn test_cube_setup_rejects_invalid_config() {
        let config = CubeConfig {
            near: 10.0,
            far: 1.0,
            ..Default::default()
        };
        assert!(matches!(CubeSetup::load(config), Err(GpuError::Config(_))));
    }
}
