//! DPI awareness.
//!
//! On Windows the process is switched to Per-Monitor V2 awareness so window
//! rectangles and pointer positions are both reported in physical pixels.
//! Other platforms need nothing.

#[cfg(windows)]
mod windows_dpi {
    use std::sync::Once;
    use tracing::{info, warn};
    use windows_sys::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    static INIT: Once = Once::new();

    /// Set the process DPI awareness to Per-Monitor V2.
    ///
    /// Must be called before any window geometry is read.
    pub fn set_dpi_aware() {
        INIT.call_once(|| {
            let result =
                unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
            if result != 0 {
                info!("Set Per-Monitor V2 DPI awareness");
            } else {
                warn!("Failed to set Per-Monitor V2 DPI awareness, coordinates may be scaled");
            }
        });
    }
}

#[cfg(windows)]
pub use windows_dpi::set_dpi_aware;

/// Set DPI awareness (no-op on this platform).
#[cfg(not(windows))]
pub fn set_dpi_aware() {}
