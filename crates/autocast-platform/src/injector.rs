//! Input injection implementations.

use crate::{PlatformError, PlatformResult};
use autocast_core::{InputInjector, Point, PortError};
use enigo::{Coordinate, Direction, Enigo, InputError, Key, Keyboard, Mouse, Settings};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How long a key is held between press and release.
const KEY_HOLD: Duration = Duration::from_millis(10);

/// Real input injector using the `enigo` crate.
pub struct EnigoInjector {
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    /// Create a new EnigoInjector.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn with_enigo<T>(
        &self,
        f: impl FnOnce(&mut Enigo) -> Result<T, InputError>,
    ) -> PlatformResult<T> {
        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| PlatformError::InjectionFailed("input device lock poisoned".into()))?;
        f(&mut enigo).map_err(|e| PlatformError::InjectionFailed(e.to_string()))
    }
}

impl InputInjector for EnigoInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), PortError> {
        debug!(x, y, "injecting pointer move");
        Ok(self.with_enigo(|enigo| enigo.move_mouse(x, y, Coordinate::Abs))?)
    }

    fn pointer_position(&self) -> Result<Point, PortError> {
        let (x, y) = self.with_enigo(|enigo| enigo.location())?;
        Ok(Point::new(x, y))
    }

    fn press_key(&self, key: &str) -> Result<(), PortError> {
        let k = parse_key(key)?;
        debug!(key, "injecting key press");
        self.with_enigo(|enigo| enigo.key(k, Direction::Press))?;
        thread::sleep(KEY_HOLD);
        Ok(self.with_enigo(|enigo| enigo.key(k, Direction::Release))?)
    }
}

/// Injector that performs nothing, for dry runs.
///
/// Reports the last commanded position as the pointer position, so the
/// interference check never fires.
#[derive(Default)]
pub struct NoopInjector {
    pointer: Mutex<Point>,
}

impl NoopInjector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputInjector for NoopInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), PortError> {
        debug!(x, y, "NoopInjector: would move pointer");
        let mut pointer = self
            .pointer
            .lock()
            .map_err(|_| PortError::Injection("pointer lock poisoned".into()))?;
        *pointer = Point::new(x, y);
        Ok(())
    }

    fn pointer_position(&self) -> Result<Point, PortError> {
        self.pointer
            .lock()
            .map(|p| *p)
            .map_err(|_| PortError::Injection("pointer lock poisoned".into()))
    }

    fn press_key(&self, key: &str) -> Result<(), PortError> {
        parse_key(key)?;
        debug!(key, "NoopInjector: would press key");
        Ok(())
    }
}

/// Check that a key name is something [`EnigoInjector`] can press.
pub fn validate_key(key: &str) -> PlatformResult<()> {
    parse_key(key).map(|_| ())
}

/// Parse a key string into an enigo Key.
/// Supports common key names and single characters.
fn parse_key(key: &str) -> PlatformResult<Key> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(if c == ' ' {
            Key::Space
        } else {
            Key::Unicode(c.to_ascii_lowercase())
        });
    }

    // Named keys (case-insensitive)
    let parsed = match key.trim().to_lowercase().as_str() {
        // Function keys
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        // Modifiers
        "shift" => Key::Shift,
        "ctrl" | "control" => Key::Control,
        "alt" => Key::Alt,
        "meta" | "win" | "super" | "cmd" => Key::Meta,

        // Navigation
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "pgup" => Key::PageUp,
        "pagedown" | "pgdn" => Key::PageDown,

        // Editing
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,

        _ => return Err(PlatformError::InvalidKey(key.to_string())),
    };

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_single_char() {
        assert!(matches!(parse_key("q").unwrap(), Key::Unicode('q')));
        assert!(matches!(parse_key("Q").unwrap(), Key::Unicode('q')));
        assert!(matches!(parse_key("3").unwrap(), Key::Unicode('3')));
        assert!(matches!(parse_key(" ").unwrap(), Key::Space));
    }

    #[test]
    fn test_parse_key_named() {
        assert!(matches!(parse_key("Space").unwrap(), Key::Space));
        assert!(matches!(parse_key("ENTER").unwrap(), Key::Return));
        assert!(matches!(parse_key("esc").unwrap(), Key::Escape));
        assert!(matches!(parse_key("ctrl").unwrap(), Key::Control));
        assert!(matches!(parse_key("F12").unwrap(), Key::F12));
    }

    #[test]
    fn test_parse_key_unknown() {
        assert!(matches!(
            parse_key("hyper"),
            Err(PlatformError::InvalidKey(k)) if k == "hyper"
        ));
        assert!(validate_key("").is_err());
    }

    #[test]
    fn test_noop_injector_tracks_pointer() {
        let injector = NoopInjector::new();
        assert_eq!(injector.pointer_position().unwrap(), Point::new(0, 0));
        injector.move_pointer(12, -4).unwrap();
        assert_eq!(injector.pointer_position().unwrap(), Point::new(12, -4));
        assert!(injector.press_key("F5").is_ok());
        assert!(matches!(
            injector.press_key("nope"),
            Err(PortError::InvalidKey(_))
        ));
    }
}
