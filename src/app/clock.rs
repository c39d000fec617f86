//! Monotonic elapsed-time source for the frame loop.

use std::time::Duration;

/// Time since the demo started.
///
/// `std::time::Instant` is unavailable on `wasm32-unknown-unknown`, so the
/// browser build reads `Date.now()` instead.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: js_sys::Date::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Duration::from_secs_f64((js_sys::Date::now() - self.start_ms).max(0.0) / 1000.0)
        }
    }

    /// The instant `offset` after the clock started.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn instant_at(&self, offset: Duration) -> std::time::Instant {
        self.start + offset
    }
}
