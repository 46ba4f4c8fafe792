//! Command-line interface definitions.

use std::path::PathBuf;

use autocast_core::{Pattern, Point, Profile, Rect, WindowHandle};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "autocast",
    about = "Sweep the pointer over a window and press a key at each point",
    version
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a session against a window. Type `p` + Enter to pause or resume,
    /// `s` or `q` to stop.
    Run(RunArgs),
    /// List visible windows.
    Windows(WindowsArgs),
    /// List saved profiles.
    Profiles(ProfilesArgs),
    /// Save a profile.
    Save(SaveArgs),
    /// Print points from a pattern generator.
    Pattern(PatternArgs),
}

/// How to find the target window.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Window title pattern (partial, case-insensitive).
    #[arg(long, value_name = "TITLE")]
    pub window_title: Option<String>,

    /// Process name pattern (partial, case-insensitive).
    #[arg(long, value_name = "NAME")]
    pub window_process: Option<String>,
}

/// Session settings that override the loaded profile.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Window-relative point, repeatable. Replaces the profile's points.
    #[arg(long = "point", value_name = "X,Y", value_parser = parse_point)]
    pub points: Vec<Point>,

    /// Key pressed at each point.
    #[arg(long)]
    pub key: Option<String>,

    /// Delay between points in milliseconds.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Wait between rounds in seconds (0 disables).
    #[arg(long, value_name = "SECS")]
    pub round_interval: Option<f64>,

    /// Do not pause when the pointer is moved by hand.
    #[arg(long)]
    pub no_anti_touch: bool,
}

impl SessionArgs {
    pub fn apply(&self, profile: &mut Profile) {
        if !self.points.is_empty() {
            profile.points = self.points.clone();
        }
        if let Some(key) = &self.key {
            profile.key = key.clone();
        }
        if let Some(ms) = self.interval_ms {
            profile.interval_ms = ms;
        }
        if let Some(secs) = self.round_interval {
            profile.round_interval_secs = secs;
        }
        if self.no_anti_touch {
            profile.anti_touch = false;
        }
    }
}

impl TargetArgs {
    pub fn apply(&self, profile: &mut Profile) {
        if self.window_title.is_some() {
            profile.target.title = self.window_title.clone();
        }
        if self.window_process.is_some() {
            profile.target.process = self.window_process.clone();
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Saved profile to run. Defaults to the last used one.
    #[arg(long, conflicts_with = "file")]
    pub profile: Option<String>,

    /// Profile file to run (JSON or YAML).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Drive this window handle instead of searching (decimal or 0x hex).
    #[arg(long, value_parser = parse_handle)]
    pub handle: Option<WindowHandle>,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Simulate against a virtual window without injecting input.
    #[arg(long)]
    pub dry_run: bool,

    /// Virtual window rectangle for --dry-run.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect, default_value = "0,0,1280,720")]
    pub virtual_rect: Rect,

    /// Print events as JSON lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WindowsArgs {
    /// Only show windows whose title or process contains this.
    #[arg(long)]
    pub filter: Option<String>,

    /// Only show the foreground window.
    #[arg(long)]
    pub foreground: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProfilesArgs {
    /// Delete this saved profile instead of listing.
    #[arg(long, value_name = "NAME")]
    pub delete: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Profile name.
    pub name: String,

    /// Write to this file instead of the profiles directory.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PatternArgs {
    /// Rectangular region.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect, conflicts_with = "polygon", required_unless_present = "polygon")]
    pub rect: Option<Rect>,

    /// Polygon region, vertices separated by `;`.
    #[arg(long, value_name = "X,Y;X,Y;...", value_parser = parse_polygon)]
    pub polygon: Option<PointList>,

    #[arg(long, default_value_t = 20)]
    pub step: i32,

    /// grid, random or spiral.
    #[arg(long, default_value = "grid")]
    pub pattern: Pattern,

    /// Seed for reproducible random output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of points to print.
    #[arg(long, short = 'n', default_value_t = 20)]
    pub count: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointList(pub Vec<Point>);

fn parse_ints(s: &str, expected: usize) -> Result<Vec<i32>, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    if parts.len() != expected {
        return Err(format!(
            "expected {expected} comma-separated numbers, got {:?}",
            s
        ));
    }
    Ok(parts)
}

pub fn parse_point(s: &str) -> Result<Point, String> {
    let v = parse_ints(s, 2)?;
    Ok(Point::new(v[0], v[1]))
}

pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let v = parse_ints(s, 4)?;
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}

pub fn parse_polygon(s: &str) -> Result<PointList, String> {
    s.split(';')
        .filter(|p| !p.trim().is_empty())
        .map(parse_point)
        .collect::<Result<Vec<_>, _>>()
        .map(PointList)
}

pub fn parse_handle(s: &str) -> Result<WindowHandle, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse::<usize>(),
    };
    parsed
        .map(WindowHandle)
        .map_err(|e| format!("invalid window handle {s:?}: {e}"))
}
