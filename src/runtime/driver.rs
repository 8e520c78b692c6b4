//! Real-Time Session Driver
//!
//! Runs one `GameClock` against wall-clock timers on the tokio runtime.
//!
//! ```text
//!   InputListener ──mpsc──┐
//!                         ▼
//!   60 Hz interval ──> select! loop ──> GameClock ──watch──> Snapshot
//!   1 Hz interval  ──>      ▲                    └──> Settlement (once)
//!   SessionHandle ──shutdown┘
//! ```
//!
//! One `select!` loop owns the clock, so a tick, a countdown step and an
//! input event never interleave. Key events that arrive between ticks are
//! buffered in the clock's `InputState` and read by the next tick.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::config::GameConfig;
use crate::core::rng::derive_session_seed;
use crate::game::clock::{GameClock, Settlement};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::InputRecorder;
use crate::game::state::{Snapshot, format_score};

/// Unique session identifier (UUID v4 bytes).
pub type SessionId = [u8; 16];

/// Driver errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The session loop has stopped and no longer accepts input.
    #[error("Session input channel closed")]
    InputClosed,

    /// The session task panicked or was cancelled.
    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The session has already been joined.
    #[error("Session task already joined")]
    AlreadyJoined,
}

/// A key event from the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key pressed (or auto-repeated)
    KeyDown(String),
    /// Key released
    KeyUp(String),
}

/// Sending side of a session's input channel.
///
/// Never blocks. Cloneable; the channel closes when the session ends.
#[derive(Debug, Clone)]
pub struct InputListener {
    sender: mpsc::UnboundedSender<InputEvent>,
}

impl InputListener {
    /// Forward a key-down event.
    pub fn key_down(&self, key: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(InputEvent::KeyDown(key.into()))
    }

    /// Forward a key-up event.
    pub fn key_up(&self, key: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(InputEvent::KeyUp(key.into()))
    }

    /// Forward any input event.
    pub fn send(&self, event: InputEvent) -> Result<(), RuntimeError> {
        self.sender.send(event).map_err(|_| RuntimeError::InputClosed)
    }

    /// Check whether the session has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Outcome of a driven session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: SessionId,
    /// RNG seed the session ran with
    pub rng_seed: u64,
    /// Final score (current score if the session was torn down early)
    pub final_score: i32,
    /// Whether the countdown reached zero
    pub completed: bool,
    /// Simulation ticks run
    pub ticks_run: u32,
    /// Hex state hash at the end of the session
    pub final_hash: String,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
    /// Input record for replay
    pub recorder: InputRecorder,
}

impl SessionSummary {
    /// Session id formatted as a UUID.
    pub fn session_uuid(&self) -> uuid::Uuid {
        uuid::Uuid::from_bytes(self.session_id)
    }
}

/// Control handle for a running session.
///
/// Dropping the handle tears the session down.
pub struct SessionHandle {
    session_id: SessionId,
    input: InputListener,
    snapshots: watch::Receiver<Snapshot>,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<SessionSummary>>,
}

impl SessionHandle {
    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.session_id
    }

    /// A sender for key events.
    pub fn input(&self) -> InputListener {
        self.input.clone()
    }

    /// Subscribe to snapshots. Always holds the latest one.
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stop the timers and close the input listener.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Wait for the session to end.
    pub async fn join(mut self) -> Result<SessionSummary, RuntimeError> {
        let task = self.task.take().ok_or(RuntimeError::AlreadyJoined)?;
        Ok(task.await?)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.shutdown_tx.send(());
        }
    }
}

/// Start a session on the current tokio runtime.
///
/// The RNG seed comes from `config.rng_seed` or is derived from a fresh
/// session id.
pub fn spawn_session<S>(config: GameConfig, settlement: S) -> SessionHandle
where
    S: Settlement + Send + 'static,
{
    let session_id = uuid::Uuid::new_v4().into_bytes();
    let rng_seed = config.rng_seed.unwrap_or_else(|| derive_session_seed(&session_id));

    let clock = GameClock::new(config, rng_seed, settlement);
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(clock.snapshot());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    info!(
        "Session {} starting (seed {})",
        hex::encode(&session_id[..4]),
        rng_seed
    );

    let task = tokio::spawn(run_session(
        clock,
        session_id,
        rng_seed,
        input_rx,
        snapshot_tx,
        shutdown_rx,
    ));

    SessionHandle {
        session_id,
        input: InputListener { sender: input_tx },
        snapshots: snapshot_rx,
        shutdown_tx,
        task: Some(task),
    }
}

/// The session loop: timers, input and shutdown multiplexed on one task.
#[instrument(skip_all, fields(session = %hex::encode(&session_id[..4])))]
async fn run_session(
    mut clock: GameClock,
    session_id: SessionId,
    rng_seed: u64,
    mut input_rx: mpsc::UnboundedReceiver<InputEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> SessionSummary {
    let started_at = Utc::now();

    let tick_period = Duration::from_nanos(1_000_000_000 / clock.config().tick_rate.max(1) as u64);
    let countdown_period = Duration::from_secs(1);
    let start = Instant::now();

    let mut tick_interval = interval_at(start + tick_period, tick_period);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut countdown_interval = interval_at(start + countdown_period, countdown_period);
    countdown_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // Shutdown first, then input, then tick before countdown
            biased;

            _ = shutdown_rx.recv() => {
                info!("Session shutdown requested");
                break;
            }

            event = input_rx.recv() => {
                match event {
                    Some(InputEvent::KeyDown(key)) => clock.on_key_down(&key),
                    Some(InputEvent::KeyUp(key)) => clock.on_key_up(&key),
                    None => {
                        info!("Input listener closed");
                        break;
                    }
                }
            }

            _ = tick_interval.tick() => {
                let result = clock.tick();
                log_events(&result.events);
                snapshot_tx.send_replace(clock.snapshot());
            }

            _ = countdown_interval.tick() => {
                let result = clock.countdown();
                log_events(&result.events);
                snapshot_tx.send_replace(clock.snapshot());

                if result.session_finished {
                    break;
                }
                debug!(
                    seconds_remaining = clock.state().seconds_remaining,
                    score = clock.state().score,
                    "Countdown"
                );
            }
        }
    }

    // Stop accepting input
    input_rx.close();

    let state = clock.state();
    let completed = clock.is_finished();
    if !completed {
        warn!(tick = state.tick, "Session torn down before the countdown finished");
    }

    let summary = SessionSummary {
        session_id,
        rng_seed,
        final_score: clock.final_score().unwrap_or(state.score),
        completed,
        ticks_run: state.tick,
        final_hash: hex::encode(state.compute_hash()),
        started_at,
        finished_at: Utc::now(),
        recorder: clock.recorder().clone(),
    };

    info!(
        score = %format_score(summary.final_score),
        ticks = summary.ticks_run,
        hash = %&summary.final_hash[..16],
        "Session ended"
    );

    summary
}

/// Log notable events at debug level.
fn log_events(events: &[GameEvent]) {
    for event in events {
        match &event.data {
            GameEventData::ActorHit { target, delta, new_score, .. } => {
                debug!(tick = event.tick, ?target, delta, new_score, "Actor hit");
            }
            GameEventData::OpponentTurned { facing } => {
                debug!(tick = event.tick, ?facing, "Opponent turned");
            }
            GameEventData::SessionFinished { final_score } => {
                debug!(tick = event.tick, final_score, "Countdown reached zero");
            }
            _ => {
                #[cfg(feature = "debug-tracing")]
                tracing::trace!(tick = event.tick, data = ?event.data, "Game event");
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
