//! autocast-core: geometry, pattern generation and the execution engine.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! Window tracking and input injection are reached through the traits in
//! [`ports`]; OS implementations live in `autocast-platform`.

mod config;
mod engine;
mod error;
pub mod geometry;
pub mod pattern;
pub mod ports;
mod storage;

pub use config::SessionConfig;
pub use engine::{
    Engine, EngineEvent, EngineState, INTERFERENCE_DISTANCE, POLL_SLICE, SELF_MOVE_TOLERANCE,
};
pub use error::{EngineError, EngineResult, PortError};
pub use geometry::{point_in_polygon, polygon_bounds, GeometryError, Point, Rect, Region};
pub use pattern::{GeneratorState, Pattern, PatternError, PatternGenerator};
pub use ports::{InputInjector, WindowHandle, WindowTracker};
pub use storage::{
    delete_profile, ensure_profiles_dir, get_app_data_dir, get_profiles_dir, list_profiles,
    load_last_used, load_profile, load_profile_file, save_last_used, save_profile,
    save_profile_file, StorageError, StorageResult,
};

use serde::{Deserialize, Serialize};

/// A saved setup: which window to drive and what to do in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// How to find the target window at run time.
    #[serde(default)]
    pub target: TargetWindow,
    /// Window-relative points, in release order.
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default = "config::default_key")]
    pub key: String,
    #[serde(default = "config::default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "config::default_round_interval_secs")]
    pub round_interval_secs: f64,
    #[serde(default = "config::default_anti_touch")]
    pub anti_touch: bool,
}

/// Target window lookup for a profile. Window handles do not survive a
/// restart of the target, so profiles store match patterns instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWindow {
    /// Window title pattern (partial match).
    pub title: Option<String>,
    /// Process name pattern (partial match).
    pub process: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            target: TargetWindow::default(),
            points: Vec::new(),
            key: config::default_key(),
            interval_ms: config::default_interval_ms(),
            round_interval_secs: config::default_round_interval_secs(),
            anti_touch: config::default_anti_touch(),
        }
    }
}

impl Profile {
    /// Session configuration for this profile bound to a resolved window.
    pub fn session_config(&self, window: WindowHandle) -> SessionConfig {
        SessionConfig {
            key: self.key.clone(),
            interval_ms: self.interval_ms,
            round_interval_secs: self.round_interval_secs,
            anti_touch: self.anti_touch,
            ..SessionConfig::new(window, self.points.clone())
        }
    }
}
