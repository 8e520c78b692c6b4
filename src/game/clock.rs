//! Session Clock
//!
//! Owns one session: its state, the player's input, the input record and
//! the settlement hand-off. Two schedules drive it:
//!
//! - `step(dt)`: deterministic accumulator that runs whole 60 Hz ticks and
//!   whole 1 Hz countdown steps in timestamp order. Used by tests and any
//!   scheduler with its own time source.
//! - `tick()` / `countdown()`: called directly by a scheduler that runs two
//!   independent timers (see `runtime::driver`).
//!
//! Use one or the other for a given session, not both.

use std::time::Duration;
use tracing::info;

use crate::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::input::{InputRecorder, InputState};
use crate::game::state::{SessionState, Snapshot, format_score};
use crate::game::tick::{self, TickResult};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Receives the final score when a session finishes.
pub trait Settlement {
    /// Called exactly once per session.
    fn settle(&mut self, final_score: i32);
}

impl<F: FnMut(i32)> Settlement for F {
    fn settle(&mut self, final_score: i32) {
        self(final_score)
    }
}

/// What a `step` call ran.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Simulation ticks run
    pub ticks: u32,
    /// Countdown decrements applied
    pub countdowns: u32,
    /// Events from every step, in the order they were produced
    pub events: Vec<GameEvent>,
    /// Whether the session is finished
    pub finished: bool,
}

/// One duel session and its timers.
pub struct GameClock {
    config: GameConfig,
    state: SessionState,
    input: InputState,
    recorder: InputRecorder,
    settlement: Option<Box<dyn Settlement + Send>>,
    final_score: Option<i32>,

    // step() accumulator
    elapsed_nanos: u128,
    ticks_stepped: u128,
    countdowns_stepped: u128,
}

impl GameClock {
    /// Create a session in the Playing phase.
    pub fn new<S>(config: GameConfig, rng_seed: u64, settlement: S) -> Self
    where
        S: Settlement + Send + 'static,
    {
        let state = SessionState::new(&config, rng_seed);
        Self {
            config,
            state,
            input: InputState::new(),
            recorder: InputRecorder::new(rng_seed),
            settlement: Some(Box::new(settlement)),
            final_score: None,
            elapsed_nanos: 0,
            ticks_stepped: 0,
            countdowns_stepped: 0,
        }
    }

    /// Key-down event by name.
    pub fn on_key_down(&mut self, key: &str) {
        self.input.on_key_down(key);
    }

    /// Key-up event by name.
    pub fn on_key_up(&mut self, key: &str) {
        self.input.on_key_up(key);
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Renderer snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Input record so far.
    pub fn recorder(&self) -> &InputRecorder {
        &self.recorder
    }

    /// Final score, once the session has finished.
    pub fn final_score(&self) -> Option<i32> {
        self.final_score
    }

    /// Check if the session has finished.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Run one simulation tick with the currently buffered input.
    pub fn tick(&mut self) -> TickResult {
        if self.state.is_finished() {
            return TickResult { events: Vec::new(), session_finished: true };
        }

        let frame = self.input.sample();
        self.recorder.record(self.state.tick, frame);
        tick::tick(&mut self.state, frame, &self.config)
    }

    /// Decrement the countdown by one second.
    pub fn countdown(&mut self) -> TickResult {
        if self.state.is_finished() {
            return TickResult { events: Vec::new(), session_finished: true };
        }

        self.recorder.mark_countdown(self.state.tick);
        let result = tick::countdown(&mut self.state);
        if result.session_finished {
            self.finish();
        }
        result
    }

    /// Advance simulated time by `dt`, running every tick and countdown step
    /// that falls due, in timestamp order. A tick and a countdown due at the
    /// same instant run tick first.
    pub fn step(&mut self, dt: Duration) -> StepReport {
        let mut report = StepReport::default();
        self.elapsed_nanos = self.elapsed_nanos.saturating_add(dt.as_nanos());
        let rate = self.config.tick_rate as u128;

        while !self.state.is_finished() {
            let next_tick = self.ticks_stepped + 1;
            let next_countdown = self.countdowns_stepped + 1;
            let tick_due = next_tick * NANOS_PER_SECOND <= self.elapsed_nanos * rate;
            let countdown_due = next_countdown * NANOS_PER_SECOND <= self.elapsed_nanos;

            let run_tick = match (tick_due, countdown_due) {
                (false, false) => break,
                (true, false) => true,
                (false, true) => false,
                (true, true) => next_tick <= next_countdown * rate,
            };

            if run_tick {
                self.ticks_stepped = next_tick;
                report.ticks += 1;
                report.events.extend(self.tick().events);
            } else {
                self.countdowns_stepped = next_countdown;
                report.countdowns += 1;
                report.events.extend(self.countdown().events);
            }
        }

        report.finished = self.state.is_finished();
        report
    }

    /// Hand the final score to the settlement, at most once.
    fn finish(&mut self) {
        if self.final_score.is_some() {
            return;
        }
        let score = self.state.score;
        self.final_score = Some(score);
        self.input.clear();
        info!(
            score,
            display = %format_score(score),
            ticks = self.state.tick,
            "Session finished"
        );

        if let Some(mut settlement) = self.settlement.take() {
            settlement.settle(score);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
