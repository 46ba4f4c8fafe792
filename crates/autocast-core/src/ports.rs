//! Boundaries to the window system and input devices.
//!
//! `autocast-platform` provides the OS-backed implementations; tests use mocks.

use crate::error::PortError;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque window identifier, passed through to the [`WindowTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub usize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Tracks the target window's geometry and focus.
pub trait WindowTracker: Send + Sync {
    /// Current bounding rectangle in screen coordinates.
    fn rect(&self, handle: WindowHandle) -> Option<Rect>;
    fn is_valid(&self, handle: WindowHandle) -> bool;
    /// Bring the window to the foreground. Best effort.
    fn activate(&self, handle: WindowHandle);
}

/// Moves the pointer and presses keys.
pub trait InputInjector: Send + Sync {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), PortError>;
    fn pointer_position(&self) -> Result<Point, PortError>;
    /// Press and release the named key.
    fn press_key(&self, key: &str) -> Result<(), PortError>;
}

impl<T: WindowTracker + ?Sized> WindowTracker for Arc<T> {
    fn rect(&self, handle: WindowHandle) -> Option<Rect> {
        (**self).rect(handle)
    }

    fn is_valid(&self, handle: WindowHandle) -> bool {
        (**self).is_valid(handle)
    }

    fn activate(&self, handle: WindowHandle) {
        (**self).activate(handle)
    }
}

impl<T: InputInjector + ?Sized> InputInjector for Arc<T> {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), PortError> {
        (**self).move_pointer(x, y)
    }

    fn pointer_position(&self) -> Result<Point, PortError> {
        (**self).pointer_position()
    }

    fn press_key(&self, key: &str) -> Result<(), PortError> {
        (**self).press_key(key)
    }
}
