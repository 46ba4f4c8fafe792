//! Execution engine: state machine + worker thread.
//!
//! The controller owns an [`Engine`] and calls `start`/`pause`/`resume`/`stop`.
//! Each session runs on its own worker thread; the only state shared with the
//! controller is the set of atomic flags in [`Control`]. Progress flows back
//! over a crossbeam channel in the order actions are performed.

use crate::config::SessionConfig;
use crate::error::{EngineError, EngineResult};
use crate::geometry::Point;
use crate::ports::{InputInjector, WindowTracker};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Pointer displacement from the baseline that counts as manual interference.
pub const INTERFERENCE_DISTANCE: f64 = 15.0;
/// Per-axis slack around the engine's own last move.
pub const SELF_MOVE_TOLERANCE: i32 = 5;
/// Sleep granularity while paused, waiting between rounds, or between points.
pub const POLL_SLICE: Duration = Duration::from_millis(100);

/// Engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// No session, or the session has ended.
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Notifications emitted by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// Worker is up and the pointer baseline has been captured.
    Started { round: u64 },
    /// A point was actioned.
    Progress {
        execution_count: u64,
        /// Window-relative point that was actioned.
        point: Point,
        elapsed_secs: f64,
        /// 1-based index into the point list.
        point_index: usize,
    },
    /// Round progress, or the countdown between rounds when `waiting`.
    RoundStatus {
        round: u64,
        percent: f64,
        waiting: bool,
        remaining_secs: f64,
    },
    /// The pointer was moved by hand; the session is now paused.
    Interference,
    /// Fatal error. At most one per session, always followed by `Stopped`.
    Error { message: String },
    /// Last event of every session.
    Stopped { execution_count: u64, round: u64 },
}

/// Flags shared between the controller and the worker.
#[derive(Debug, Default)]
struct Control {
    running: AtomicBool,
    paused: AtomicBool,
    /// Set by `resume`; the worker re-reads the pointer before its next check.
    rebaseline: AtomicBool,
}

impl Control {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn take_rebaseline(&self) -> bool {
        self.rebaseline.swap(false, Ordering::SeqCst)
    }

    fn state(&self) -> EngineState {
        if !self.is_running() {
            EngineState::Stopped
        } else if self.is_paused() {
            EngineState::Paused
        } else {
            EngineState::Running
        }
    }
}

/// Clears the running flag when the worker exits, including by panic.
struct RunningGuard(Arc<Control>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::SeqCst);
        self.0.paused.store(false, Ordering::SeqCst);
    }
}

/// Controller-side handle. One session at a time.
pub struct Engine<W, I> {
    window: Arc<W>,
    input: Arc<I>,
    control: Arc<Control>,
    worker: Option<JoinHandle<()>>,
    event_tx: Sender<EngineEvent>,
    event_rx: Receiver<EngineEvent>,
}

impl<W, I> Engine<W, I>
where
    W: WindowTracker + 'static,
    I: InputInjector + 'static,
{
    pub fn new(window: W, input: I) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            window: Arc::new(window),
            input: Arc::new(input),
            control: Arc::new(Control::default()),
            worker: None,
            event_tx,
            event_rx,
        }
    }

    /// Validate `config` and spawn the worker.
    ///
    /// Configuration errors are returned here and the engine stays `Stopped`.
    pub fn start(&mut self, config: SessionConfig) -> EngineResult<()> {
        if let Err(err) = config.validate() {
            warn!(%err, "refusing to start session");
            return Err(err);
        }
        if self.control.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        self.join_worker();

        let control = Arc::new(Control::default());
        control.running.store(true, Ordering::SeqCst);

        info!(
            window = %config.window,
            points = config.points.len(),
            key = %config.key,
            interval_ms = config.interval_ms,
            round_interval_secs = config.round_interval_secs,
            anti_touch = config.anti_touch,
            "starting session"
        );

        let session = Session::new(
            config,
            self.window.clone(),
            self.input.clone(),
            control.clone(),
            self.event_tx.clone(),
        );
        let spawned = thread::Builder::new()
            .name("autocast-engine".into())
            .spawn(move || session.run());

        match spawned {
            Ok(handle) => {
                self.control = control;
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to spawn engine worker");
                Err(EngineError::Worker(e.to_string()))
            }
        }
    }
}

impl<W, I> Engine<W, I> {
    /// Suspend actions. No-op unless a session is running.
    pub fn pause(&self) {
        if self.control.is_running() && !self.control.paused.swap(true, Ordering::SeqCst) {
            info!("session paused");
        }
    }

    /// Continue a paused session, re-baselining the interference check.
    pub fn resume(&self) {
        if !self.control.is_paused() {
            return;
        }
        // Request the re-baseline before clearing `paused`: the worker checks
        // `paused` first, so it always sees the request once it sees the resume.
        self.control.rebaseline.store(true, Ordering::SeqCst);
        self.control.paused.store(false, Ordering::SeqCst);
        info!("session resumed");
    }

    /// Stop the session and wait for the worker to exit.
    ///
    /// Once this returns, no further actions are performed and no further
    /// events are sent.
    pub fn stop(&mut self) {
        if self.control.is_running() {
            info!("stopping session");
        }
        self.control.running.store(false, Ordering::SeqCst);
        self.join_worker();
    }

    pub fn state(&self) -> EngineState {
        self.control.state()
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_running() && self.control.is_paused()
    }

    /// A receiver for engine events. All clones share one queue.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.event_rx.clone()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("engine worker panicked");
            }
        }
    }
}

impl<W, I> Drop for Engine<W, I> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker-owned session state.
struct Session<W, I> {
    config: SessionConfig,
    window: Arc<W>,
    input: Arc<I>,
    control: Arc<Control>,
    events: Sender<EngineEvent>,
    execution_count: u64,
    round: u64,
    index: usize,
    started_at: Instant,
    /// Pointer position the interference check compares against.
    last_pointer: Option<Point>,
    /// Where the engine itself last put the pointer.
    expected_pointer: Option<Point>,
}

impl<W: WindowTracker, I: InputInjector> Session<W, I> {
    fn new(
        config: SessionConfig,
        window: Arc<W>,
        input: Arc<I>,
        control: Arc<Control>,
        events: Sender<EngineEvent>,
    ) -> Self {
        Self {
            config,
            window,
            input,
            control,
            events,
            execution_count: 0,
            round: 1,
            index: 0,
            started_at: Instant::now(),
            last_pointer: None,
            expected_pointer: None,
        }
    }

    fn run(mut self) {
        let _guard = RunningGuard(self.control.clone());
        debug!("engine worker started");

        if let Err(err) = self.run_loop() {
            error!(%err, executions = self.execution_count, round = self.round, "session failed");
            self.emit(EngineEvent::Error {
                message: err.to_string(),
            });
        }

        info!(
            executions = self.execution_count,
            round = self.round,
            "session stopped"
        );
        self.emit(EngineEvent::Stopped {
            execution_count: self.execution_count,
            round: self.round,
        });
    }

    fn run_loop(&mut self) -> EngineResult<()> {
        self.started_at = Instant::now();
        self.sample_baseline()?;
        self.emit(EngineEvent::Started { round: self.round });

        while self.control.is_running() {
            if self.control.is_paused() {
                self.sample_baseline()?;
                thread::sleep(POLL_SLICE);
                continue;
            }

            if self.control.take_rebaseline() {
                self.sample_baseline()?;
                self.expected_pointer = None;
            }

            if self.config.anti_touch && self.manually_moved()? {
                self.control.paused.store(true, Ordering::SeqCst);
                warn!(round = self.round, point = self.index + 1, "manual pointer movement detected, pausing");
                self.emit(EngineEvent::Interference);
                continue;
            }

            self.perform_action()?;
            self.advance()?;
            self.sleep_while_running(self.config.interval());
        }

        Ok(())
    }

    fn perform_action(&mut self) -> EngineResult<()> {
        let handle = self.config.window;
        if !self.window.is_valid(handle) {
            return Err(EngineError::WindowLost(
                "target window is no longer valid".into(),
            ));
        }
        let rect = self.window.rect(handle).ok_or_else(|| {
            EngineError::WindowLost("unable to read target window geometry".into())
        })?;

        let point = self.config.points[self.index];
        let target = rect.to_absolute(point);

        self.window.activate(handle);
        settle(self.config.activate_settle_ms);

        self.input.move_pointer(target.x, target.y)?;
        self.expected_pointer = Some(target);
        settle(self.config.move_settle_ms);

        self.input.press_key(&self.config.key)?;
        self.sample_baseline()?;

        self.execution_count += 1;
        debug!(
            count = self.execution_count,
            round = self.round,
            index = self.index,
            ?point,
            ?target,
            "action performed"
        );

        let len = self.config.points.len();
        self.emit(EngineEvent::Progress {
            execution_count: self.execution_count,
            point,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
            point_index: self.index + 1,
        });
        self.emit(EngineEvent::RoundStatus {
            round: self.round,
            percent: (self.index + 1) as f64 / len as f64 * 100.0,
            waiting: false,
            remaining_secs: 0.0,
        });
        Ok(())
    }

    fn advance(&mut self) -> EngineResult<()> {
        self.index += 1;
        if self.index >= self.config.points.len() {
            self.wait_between_rounds()?;
            debug!(round = self.round, "round completed");
            self.round += 1;
            self.index = 0;
        }
        Ok(())
    }

    /// Count down the inter-round interval in `POLL_SLICE` steps.
    ///
    /// The countdown is frozen while paused and abandoned on stop. The pointer
    /// baseline is refreshed every slice.
    fn wait_between_rounds(&mut self) -> EngineResult<()> {
        let Some(total) = self.config.round_interval() else {
            return Ok(());
        };
        debug!(round = self.round, secs = total.as_secs_f64(), "waiting between rounds");

        let mut waited = Duration::ZERO;
        while self.control.is_running() {
            self.sample_baseline()?;
            if self.control.is_paused() {
                thread::sleep(POLL_SLICE);
                continue;
            }

            let remaining = total.saturating_sub(waited);
            if remaining.is_zero() {
                break;
            }
            self.emit(EngineEvent::RoundStatus {
                round: self.round,
                percent: 100.0,
                waiting: true,
                remaining_secs: remaining.as_secs_f64(),
            });

            let slice_start = Instant::now();
            thread::sleep(remaining.min(POLL_SLICE));
            waited += slice_start.elapsed();
        }

        self.sample_baseline()
    }

    fn manually_moved(&self) -> EngineResult<bool> {
        let Some(last) = self.last_pointer else {
            return Ok(false);
        };
        let current = self.input.pointer_position()?;

        if let Some(expected) = self.expected_pointer {
            if current.near(expected, SELF_MOVE_TOLERANCE) {
                return Ok(false);
            }
        }

        Ok(current.distance_to(last) > INTERFERENCE_DISTANCE)
    }

    fn sample_baseline(&mut self) -> EngineResult<()> {
        self.last_pointer = Some(self.input.pointer_position()?);
        Ok(())
    }

    fn sleep_while_running(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while self.control.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(POLL_SLICE));
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Err(e) = self.events.send(event) {
            warn!("Failed to emit event: {}", e);
        }
    }
}

fn settle(ms: u64) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms));
    }
}
