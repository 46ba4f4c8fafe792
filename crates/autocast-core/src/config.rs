//! Per-session configuration.

use crate::error::{EngineError, EngineResult};
use crate::geometry::Point;
use crate::ports::WindowHandle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(crate) fn default_key() -> String {
    "q".into()
}

pub(crate) fn default_interval_ms() -> u64 {
    100
}

pub(crate) fn default_round_interval_secs() -> f64 {
    5.0
}

pub(crate) fn default_anti_touch() -> bool {
    true
}

fn default_activate_settle_ms() -> u64 {
    10
}

fn default_move_settle_ms() -> u64 {
    20
}

/// Everything one run needs. Immutable once the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub window: WindowHandle,
    /// Window-relative points, visited in order.
    pub points: Vec<Point>,
    #[serde(default = "default_key")]
    pub key: String,
    /// Pause after each point (milliseconds).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Pause between rounds (seconds). 0 disables it.
    #[serde(default = "default_round_interval_secs")]
    pub round_interval_secs: f64,
    /// Pause automatically when the pointer is moved by hand.
    #[serde(default = "default_anti_touch")]
    pub anti_touch: bool,
    /// Settle time after activating the window.
    #[serde(default = "default_activate_settle_ms")]
    pub activate_settle_ms: u64,
    /// Settle time between moving the pointer and pressing the key.
    #[serde(default = "default_move_settle_ms")]
    pub move_settle_ms: u64,
}

impl SessionConfig {
    pub fn new(window: WindowHandle, points: Vec<Point>) -> Self {
        Self {
            window,
            points,
            key: default_key(),
            interval_ms: default_interval_ms(),
            round_interval_secs: default_round_interval_secs(),
            anti_touch: default_anti_touch(),
            activate_settle_ms: default_activate_settle_ms(),
            move_settle_ms: default_move_settle_ms(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.points.is_empty() {
            return Err(EngineError::Configuration("no points recorded".into()));
        }
        if self.key.trim().is_empty() {
            return Err(EngineError::Configuration("key must not be empty".into()));
        }
        if self.interval_ms == 0 {
            return Err(EngineError::Configuration(
                "interval_ms must be greater than 0".into(),
            ));
        }
        if self.round_interval_secs < 0.0
            || Duration::try_from_secs_f64(self.round_interval_secs).is_err()
        {
            return Err(EngineError::Configuration(format!(
                "round_interval_secs must be a non-negative duration, got {}",
                self.round_interval_secs
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// `None` when the inter-round wait is disabled.
    pub fn round_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.round_interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::new(WindowHandle(1), vec![Point::new(1, 2)])
    }

    #[test]
    fn test_defaults() {
        let cfg = config();
        assert_eq!(cfg.key, "q");
        assert_eq!(cfg.interval_ms, 100);
        assert_eq!(cfg.round_interval_secs, 5.0);
        assert!(cfg.anti_touch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_points() {
        let mut cfg = config();
        cfg.points.clear();
        assert!(matches!(cfg.validate(), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_rejects_bad_intervals() {
        let mut cfg = config();
        cfg.interval_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.round_interval_secs = -1.0;
        assert!(cfg.validate().is_err());

        cfg.round_interval_secs = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_round_interval() {
        let mut cfg = config();
        for secs in [1e20, f64::INFINITY, u64::MAX as f64 * 2.0] {
            cfg.round_interval_secs = secs;
            assert!(
                matches!(cfg.validate(), Err(EngineError::Configuration(_))),
                "{secs} accepted"
            );
            assert_eq!(cfg.round_interval(), None);
        }
    }

    #[test]
    fn test_round_interval_disabled_at_zero() {
        let mut cfg = config();
        cfg.round_interval_secs = 0.0;
        assert_eq!(cfg.round_interval(), None);
        cfg.round_interval_secs = 1.5;
        assert_eq!(cfg.round_interval(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"window": 42, "points": [{"x": 3, "y": 4}]}"#).unwrap();
        assert_eq!(cfg.window, WindowHandle(42));
        assert_eq!(cfg.points, vec![Point::new(3, 4)]);
        assert_eq!(cfg.move_settle_ms, 20);
        assert_eq!(cfg.activate_settle_ms, 10);
    }
}
