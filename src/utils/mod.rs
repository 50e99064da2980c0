//! The utilities module provides general capabilities, that may span the
//! input modeling, models, output analysis, and simulator modules: the
//! error type, the wasm panic hook, and wall-clock measurement.

pub mod errors;

use std::time::Duration;

/// When the `console_error_panic_hook` feature is enabled, we can call the
/// `set_panic_hook` function at least once during initialization, and then
/// we will get better error messages if our code ever panics.
///
/// For more details see
/// <https://github.com/rustwasm/console_error_panic_hook#readme>
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Measures the host time spent on a simulation run.  `std::time::Instant`
/// is unavailable on `wasm32-unknown-unknown`, where the measurement is
/// always zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WallClock {
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
}

impl WallClock {
    pub(crate) fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            started: std::time::Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.started.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Duration::from_secs(0)
        }
    }
}
