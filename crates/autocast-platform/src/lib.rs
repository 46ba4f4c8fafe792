//! autocast-platform: OS-backed window tracking and input injection.
//!
//! This crate provides:
//! - Input injection (pointer moves, key presses) via `enigo`
//! - Window discovery, geometry and activation (Win32)
//! - DPI awareness setup
//! - Virtual stand-ins for dry runs
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `injector` - [`EnigoInjector`] and [`NoopInjector`]
//! - `window` - Window discovery, [`DesktopWindows`] and [`VirtualWindow`]
//! - `dpi` - DPI awareness

mod dpi;
mod error;
mod injector;
mod window;

pub use dpi::set_dpi_aware;
pub use error::{PlatformError, PlatformResult};
pub use injector::{validate_key, EnigoInjector, NoopInjector};
pub use window::{
    find_window, get_foreground_window, get_window_rect, list_windows, resolve_window,
    DesktopWindows, VirtualWindow, WindowInfo,
};
