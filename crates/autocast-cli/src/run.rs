//! The `run` subcommand: resolve a profile and a window, then supervise one
//! session from the terminal.

use std::io::{self, BufRead};
use std::thread;

use anyhow::{bail, Context, Result};
use autocast_core::{
    load_last_used, load_profile, load_profile_file, save_last_used, Engine, EngineEvent,
    InputInjector, Profile, SessionConfig, WindowHandle, WindowTracker,
};
use autocast_platform::{
    resolve_window, set_dpi_aware, validate_key, DesktopWindows, EnigoInjector, NoopInjector,
    VirtualWindow,
};
use crossbeam_channel::{never, select, unbounded, Receiver};
use tracing::{debug, info, warn};

use crate::cli::RunArgs;

/// Commands typed on stdin while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    TogglePause,
    Stop,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" | "resume" => Some(Self::TogglePause),
            "s" | "q" | "stop" | "quit" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Returns `true` when the session ended with an error.
pub fn run(args: &RunArgs) -> Result<bool> {
    let profile = load_base_profile(args)?;
    validate_key(&profile.key).with_context(|| format!("cannot press {:?}", profile.key))?;

    if args.dry_run {
        info!(rect = ?args.virtual_rect, "dry run against a virtual window");
        let config = profile.session_config(WindowHandle::default());
        let engine = Engine::new(VirtualWindow::new(args.virtual_rect), NoopInjector::new());
        return supervise(engine, config, args.json);
    }

    set_dpi_aware();
    let handle = match args.handle {
        Some(handle) => handle,
        None => {
            let window = resolve_window(
                profile.target.title.as_deref(),
                profile.target.process.as_deref(),
            )?;
            info!(
                handle = %window.handle,
                title = %window.title,
                process = %window.process_name,
                "resolved target window"
            );
            window.handle
        }
    };

    let injector = EnigoInjector::new()?;
    let engine = Engine::new(DesktopWindows, injector);
    supervise(engine, profile.session_config(handle), args.json)
}

fn load_base_profile(args: &RunArgs) -> Result<Profile> {
    let mut profile = if let Some(path) = &args.file {
        load_profile_file(path).with_context(|| format!("loading {}", path.display()))?
    } else if let Some(name) = args.profile.clone().or_else(load_last_used) {
        let profile = load_profile(&name).with_context(|| format!("loading profile {name:?}"))?;
        if let Err(e) = save_last_used(&name) {
            warn!(error = %e, "could not remember last used profile");
        }
        profile
    } else {
        Profile::default()
    };

    args.target.apply(&mut profile);
    args.session.apply(&mut profile);
    if profile.points.is_empty() {
        bail!("no points configured; pass --point X,Y or load a profile");
    }
    debug!(?profile, "effective profile");
    Ok(profile)
}

fn supervise<W, I>(mut engine: Engine<W, I>, config: SessionConfig, json: bool) -> Result<bool>
where
    W: WindowTracker + 'static,
    I: InputInjector + 'static,
{
    let events = engine.events();
    engine.start(config)?;
    eprintln!("running: `p` + Enter to pause/resume, `s` + Enter to stop");

    let commands = spawn_stdin_reader();
    let idle = never();
    let mut stdin_open = true;
    let mut printer = Printer::new(json);
    let mut failed = false;

    loop {
        let command_rx = if stdin_open { &commands } else { &idle };
        select! {
            recv(events) -> event => {
                let Ok(event) = event else { break };
                failed |= matches!(event, EngineEvent::Error { .. });
                let stopped = matches!(event, EngineEvent::Stopped { .. });
                printer.print(&event);
                if stopped {
                    break;
                }
            }
            recv(command_rx) -> command => match command {
                Ok(Command::TogglePause) if engine.is_paused() => engine.resume(),
                Ok(Command::TogglePause) => engine.pause(),
                Ok(Command::Stop) => engine.stop(),
                // stdin closed; keep running until the session ends.
                Err(_) => stdin_open = false,
            },
        }
    }

    engine.stop();
    Ok(failed)
}

fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("autocast-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match Command::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => eprintln!("unknown command {:?} (p = pause/resume, s = stop)", line.trim()),
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "stdin controller unavailable");
    }
    rx
}

/// Renders engine events for the terminal.
struct Printer {
    json: bool,
    last_countdown: Option<u64>,
}

impl Printer {
    fn new(json: bool) -> Self {
        Self {
            json,
            last_countdown: None,
        }
    }

    fn print(&mut self, event: &EngineEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "failed to encode event"),
            }
            return;
        }
        if let Some(line) = self.render(event) {
            println!("{line}");
        }
    }

    fn render(&mut self, event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::Started { round } => Some(format!("started (round {round})")),
            EngineEvent::Progress {
                execution_count,
                point,
                elapsed_secs,
                point_index,
            } => {
                self.last_countdown = None;
                Some(format!(
                    "#{execution_count} point {point_index} at {},{} ({elapsed_secs:.1}s)",
                    point.x, point.y
                ))
            }
            EngineEvent::RoundStatus {
                round,
                waiting: false,
                percent,
                ..
            } => (*percent >= 100.0).then(|| format!("round {round} complete")),
            EngineEvent::RoundStatus {
                round,
                waiting: true,
                remaining_secs,
                ..
            } => {
                let secs = remaining_secs.ceil() as u64;
                if self.last_countdown == Some(secs) {
                    return None;
                }
                self.last_countdown = Some(secs);
                Some(format!("round {} starts in {secs}s", round + 1))
            }
            EngineEvent::Interference => {
                Some("pointer moved by hand, paused (`p` to resume)".to_string())
            }
            EngineEvent::Error { message } => Some(format!("error: {message}")),
            EngineEvent::Stopped {
                execution_count,
                round,
            } => Some(format!(
                "stopped after {execution_count} actions in round {round}"
            )),
        }
    }
}
