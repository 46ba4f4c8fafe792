//! Window discovery and tracking.
//!
//! Provides functionality for:
//! - Listing visible top-level windows
//! - Finding windows by title or process name
//! - Tracking a window's rectangle and bringing it to the foreground
//!
//! Only Windows has a native implementation (`windows.rs`). Elsewhere no
//! window is ever found or valid; use [`VirtualWindow`] for dry runs.

use crate::{PlatformError, PlatformResult};
use autocast_core::{Rect, WindowHandle, WindowTracker};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(windows)]
mod windows;

/// Information about a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    /// Process name (e.g., "notepad.exe").
    pub process_name: String,
    pub pid: u32,
    /// Window rectangle in screen coordinates.
    pub rect: Rect,
    pub visible: bool,
}

impl WindowInfo {
    /// Case-insensitive partial match on title and process. A `None`
    /// pattern matches anything.
    pub fn matches(&self, title: Option<&str>, process: Option<&str>) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        title.map_or(true, |t| contains(&self.title, t))
            && process.map_or(true, |p| contains(&self.process_name, p))
    }
}

/// Get the currently focused foreground window.
pub fn get_foreground_window() -> Option<WindowInfo> {
    #[cfg(windows)]
    {
        windows::get_foreground_window()
    }
    #[cfg(not(windows))]
    {
        None
    }
}

/// List all visible windows with a title.
pub fn list_windows() -> Vec<WindowInfo> {
    #[cfg(windows)]
    {
        windows::list_windows()
    }
    #[cfg(not(windows))]
    {
        Vec::new()
    }
}

/// Find the first window matching both patterns.
pub fn find_window(title: Option<&str>, process: Option<&str>) -> Option<WindowInfo> {
    list_windows()
        .into_iter()
        .find(|w| w.matches(title, process))
}

/// Like [`find_window`], but at least one pattern is required and a miss is
/// an error.
pub fn resolve_window(title: Option<&str>, process: Option<&str>) -> PlatformResult<WindowInfo> {
    if title.is_none() && process.is_none() {
        return Err(PlatformError::WindowNotFound(
            "no title or process pattern given".into(),
        ));
    }
    find_window(title, process).ok_or_else(|| {
        PlatformError::WindowNotFound(format!(
            "title={} process={}",
            title.unwrap_or("*"),
            process.unwrap_or("*")
        ))
    })
}

/// Get the rectangle of a window by handle.
pub fn get_window_rect(handle: WindowHandle) -> Option<Rect> {
    #[cfg(windows)]
    {
        windows::get_window_rect(handle.0)
    }
    #[cfg(not(windows))]
    {
        let _ = handle;
        None
    }
}

/// [`WindowTracker`] backed by the desktop window manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopWindows;

impl WindowTracker for DesktopWindows {
    fn rect(&self, handle: WindowHandle) -> Option<Rect> {
        get_window_rect(handle)
    }

    fn is_valid(&self, handle: WindowHandle) -> bool {
        #[cfg(windows)]
        {
            windows::is_window_valid(handle.0)
        }
        #[cfg(not(windows))]
        {
            let _ = handle;
            false
        }
    }

    fn activate(&self, handle: WindowHandle) {
        #[cfg(windows)]
        {
            windows::activate_window(handle.0);
        }
        #[cfg(not(windows))]
        {
            debug!(%handle, "window activation unsupported on this platform");
        }
    }
}

/// A window that is always valid and never moves.
#[derive(Debug, Clone, Copy)]
pub struct VirtualWindow {
    rect: Rect,
}

impl VirtualWindow {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl WindowTracker for VirtualWindow {
    fn rect(&self, _handle: WindowHandle) -> Option<Rect> {
        Some(self.rect)
    }

    fn is_valid(&self, _handle: WindowHandle) -> bool {
        true
    }

    fn activate(&self, handle: WindowHandle) {
        debug!(%handle, "VirtualWindow: would activate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(title: &str, process: &str) -> WindowInfo {
        WindowInfo {
            handle: WindowHandle(0x1234),
            title: title.into(),
            process_name: process.into(),
            pid: 42,
            rect: Rect::new(0, 0, 800, 600),
            visible: true,
        }
    }

    #[test]
    fn test_window_info_matches() {
        let w = info("Dragon Quest - Online", "dq.exe");
        assert!(w.matches(None, None));
        assert!(w.matches(Some("dragon"), None));
        assert!(w.matches(Some("ONLINE"), Some("DQ")));
        assert!(!w.matches(Some("dragon"), Some("notepad")));
        assert!(!w.matches(Some("offline"), None));
    }

    #[test]
    fn test_resolve_window_requires_pattern() {
        assert!(matches!(
            resolve_window(None, None),
            Err(PlatformError::WindowNotFound(_))
        ));
    }

    #[test]
    fn test_virtual_window() {
        let window = VirtualWindow::new(Rect::new(100, 50, 640, 480));
        let handle = WindowHandle(1);
        assert!(window.is_valid(handle));
        assert_eq!(window.rect(handle), Some(Rect::new(100, 50, 640, 480)));
        window.activate(handle);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_desktop_windows_unsupported() {
        let tracker = DesktopWindows;
        assert!(!tracker.is_valid(WindowHandle(1)));
        assert_eq!(tracker.rect(WindowHandle(1)), None);
        assert!(list_windows().is_empty());
        assert!(get_foreground_window().is_none());
        assert!(find_window(Some("anything"), None).is_none());
    }
}
