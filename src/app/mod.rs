//! Windowed frame loop shared by both demos.
//!
//! A [`Demo`] owns its GPU resources and decides when it next needs a frame;
//! [`App`] owns the window, the surface and the winit event handling. GPU
//! setup is asynchronous, so the finished [`Graphics`] are delivered back to
//! the event loop as a user event. On native targets the future is driven to
//! completion with `pollster`; in the browser it is spawned on the JS
//! executor.

mod clock;
mod demos;
mod surface;

pub use clock::Clock;
pub use demos::{CubeDemo, CubeSetup, FrameAction, LifeDemo, frame_action, life_wake};
pub use surface::{SurfaceState, preferred_format};

use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::compute::gpu::{GpuContext, GpuError};

/// Initial window size in logical pixels.
pub const DEFAULT_WINDOW_SIZE: (f64, f64) = (800.0, 800.0);

/// Error type for the windowed driver.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// When a demo next wants to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Request a redraw as soon as possible.
    Now,
    /// Sleep until this offset from the start of the demo.
    At(Duration),
}

/// One demo driven by [`App`].
pub trait Demo: Sized + 'static {
    /// Everything needed to build the demo once a surface exists.
    type Config: 'static;

    /// Window title.
    const TITLE: &'static str;

    fn create(
        ctx: &GpuContext,
        surface: &SurfaceState,
        config: Self::Config,
    ) -> Result<Self, GpuError>;

    /// Called after the surface has been reconfigured to a new size.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Record and submit one frame into `view`.
    fn draw(&mut self, view: &wgpu::TextureView, elapsed: Duration);

    fn wake(&self, elapsed: Duration) -> Wake;
}

/// Window, surface and device for a running demo.
pub struct Graphics<D: Demo> {
    window: Arc<Window>,
    // Kept alive alongside the surface created from it.
    _instance: wgpu::Instance,
    surface: SurfaceState,
    ctx: GpuContext,
    demo: D,
    clock: Clock,
}

/// User events sent back into the event loop.
pub enum AppEvent<D: Demo> {
    GraphicsReady(Box<Result<Graphics<D>, GpuError>>),
}

enum State<D: Demo> {
    /// Waiting for the first `resumed` to create a window.
    Pending {
        proxy: EventLoopProxy<AppEvent<D>>,
        config: D::Config,
    },
    /// GPU setup in flight.
    Building,
    Running(Graphics<D>),
}

/// winit application driving a single [`Demo`].
pub struct App<D: Demo> {
    state: State<D>,
    error: Option<AppError>,
}

impl<D: Demo> App<D> {
    pub fn new(proxy: EventLoopProxy<AppEvent<D>>, config: D::Config) -> Self {
        Self {
            state: State::Pending { proxy, config },
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let State::Running(gfx) = &mut self.state else {
            return;
        };

        let frame = match gfx.surface.acquire(&gfx.ctx.device) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gfx.demo.draw(&view, gfx.clock.elapsed());
        gfx.window.pre_present_notify();
        frame.present();
    }
}

async fn create_graphics<D: Demo>(
    window: Arc<Window>,
    config: D::Config,
) -> Result<Graphics<D>, GpuError> {
    let instance = GpuContext::instance();
    let surface = instance.create_surface(window.clone())?;
    let ctx = GpuContext::new(&instance, Some(&surface)).await?;

    let size = window.inner_size();
    let surface = SurfaceState::new(&ctx, surface, size.width, size.height)?;
    let demo = D::create(&ctx, &surface, config)?;

    Ok(Graphics {
        window,
        _instance: instance,
        surface,
        ctx,
        demo,
        clock: Clock::start(),
    })
}

impl<D: Demo> ApplicationHandler<AppEvent<D>> for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let State::Pending { proxy, config } = std::mem::replace(&mut self.state, State::Building)
        else {
            return;
        };

        let (width, height) = DEFAULT_WINDOW_SIZE;
        let attributes = Window::default_attributes()
            .with_title(D::TITLE)
            .with_inner_size(LogicalSize::new(width, height));
        #[cfg(target_arch = "wasm32")]
        let attributes = {
            use winit::platform::web::WindowAttributesExtWebSys;
            attributes.with_append(true)
        };

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = pollster::block_on(create_graphics::<D>(window, config));
            let _ = proxy.send_event(AppEvent::GraphicsReady(Box::new(result)));
        }
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let result = create_graphics::<D>(window, config).await;
            let _ = proxy.send_event(AppEvent::GraphicsReady(Box::new(result)));
        });
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent<D>) {
        match event {
            AppEvent::GraphicsReady(result) => match *result {
                Ok(gfx) => {
                    gfx.window.request_redraw();
                    self.state = State::Running(gfx);
                }
                Err(e) => self.fail(event_loop, e.into()),
            },
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let State::Running(gfx) = &mut self.state
                    && gfx
                        .surface
                        .resize(&gfx.ctx.device, size.width, size.height)
                {
                    gfx.demo.resize(size.width, size.height);
                    gfx.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let State::Running(gfx) = &self.state else {
            return;
        };

        match gfx.demo.wake(gfx.clock.elapsed()) {
            Wake::Now => {
                event_loop.set_control_flow(ControlFlow::Wait);
                gfx.window.request_redraw();
            }
            #[cfg(not(target_arch = "wasm32"))]
            Wake::At(offset) => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(gfx.clock.instant_at(offset)));
            }
            // Browser frames are paced by requestAnimationFrame.
            #[cfg(target_arch = "wasm32")]
            Wake::At(_) => gfx.window.request_redraw(),
        }
    }
}

/// Open a window and run `D` until it is closed.
#[cfg(not(target_arch = "wasm32"))]
pub fn run<D: Demo>(config: D::Config) -> Result<(), AppError> {
    let event_loop = EventLoop::<AppEvent<D>>::with_user_event().build()?;
    let mut app = App::<D>::new(event_loop.create_proxy(), config);
    event_loop.run_app(&mut app)?;
    app.take_error().map_or(Ok(()), Err)
}

/// Attach a canvas to the page and hand `D` to the browser's event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn<D: Demo>(config: D::Config) -> Result<(), AppError> {
    use winit::platform::web::EventLoopExtWebSys;

    let event_loop = EventLoop::<AppEvent<D>>::with_user_event().build()?;
    let app = App::<D>::new(event_loop.create_proxy(), config);
    event_loop.spawn_app(app);
    Ok(())
}

/// Install the native logger at `info`, keeping the wgpu stack quiet.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();
}
