//! Input Capture and Recording
//!
//! Turns key-down/key-up events into one `InputFrame` per tick.
//!
//! Movement and jump are level-triggered: only the held state at sample time
//! matters. Fire is edge-triggered: each fresh press of the fire key queues
//! exactly one shot, consumed by the next `sample()`.

use serde::{Serialize, Deserialize};

// =============================================================================
// KEYS
// =============================================================================

/// Logical keys understood by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Key {
    /// `a` / ArrowLeft
    Left = 0,
    /// `d` / ArrowRight
    Right = 1,
    /// `w` / ArrowUp
    Jump = 2,
    /// `s` / ArrowDown (tracked, no gameplay effect)
    Down = 3,
    /// Space bar
    Fire = 4,
}

impl Key {
    /// Parse a browser-style key name. Returns `None` for keys the game ignores.
    ///
    /// ```
    /// use arena_duel::game::input::Key;
    /// assert_eq!(Key::parse("ArrowLeft"), Some(Key::Left));
    /// assert_eq!(Key::parse(" "), Some(Key::Fire));
    /// assert_eq!(Key::parse("q"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        if name == " " {
            return Some(Key::Fire);
        }
        match name.to_ascii_lowercase().as_str() {
            "a" | "arrowleft" => Some(Key::Left),
            "d" | "arrowright" => Some(Key::Right),
            "w" | "arrowup" => Some(Key::Jump),
            "s" | "arrowdown" => Some(Key::Down),
            "space" | "spacebar" => Some(Key::Fire),
            _ => None,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Everything the simulation reads from the player in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Horizontal intent: -1 (left), 0, +1 (right)
    pub intent: i8,
    /// Jump key held
    pub jump: bool,
    /// One queued shot
    pub fire: bool,
}

impl InputFrame {
    /// Frame with no keys held.
    pub const IDLE: Self = Self { intent: 0, jump: false, fire: false };

    /// Create a frame. Intent is clamped to -1..=1.
    pub fn new(intent: i32, jump: bool, fire: bool) -> Self {
        Self {
            intent: intent.signum() as i8,
            jump,
            fire,
        }
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}

// =============================================================================
// INPUT STATE
// =============================================================================

/// Currently held keys plus the pending fire shot.
///
/// Never blocks and never fails; unknown key names are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// One bit per `Key`
    held: u8,
    /// Fire pressed since the last sample
    fire_queued: bool,
}

impl InputState {
    /// Create with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest level state of a key.
    ///
    /// A press of `Fire` that was not already held queues one shot.
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            if key == Key::Fire && !self.is_held(Key::Fire) {
                self.fire_queued = true;
            }
            self.held |= key.bit();
        } else {
            self.held &= !key.bit();
        }
    }

    /// Whether a key is currently held.
    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    /// Key-down event by name.
    pub fn on_key_down(&mut self, name: &str) {
        if let Some(key) = Key::parse(name) {
            self.set_key(key, true);
        }
    }

    /// Key-up event by name.
    pub fn on_key_up(&mut self, name: &str) {
        if let Some(key) = Key::parse(name) {
            self.set_key(key, false);
        }
    }

    /// Whether a shot is waiting for the next sample.
    #[inline]
    pub fn fire_pending(&self) -> bool {
        self.fire_queued
    }

    /// Build this tick's frame and consume the queued shot.
    ///
    /// Opposing horizontal holds cancel to zero intent.
    pub fn sample(&mut self) -> InputFrame {
        let left = self.is_held(Key::Left) as i32;
        let right = self.is_held(Key::Right) as i32;
        InputFrame::new(
            right - left,
            self.is_held(Key::Jump),
            std::mem::take(&mut self.fire_queued),
        )
    }

    /// Release every key and drop any queued shot.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Delta-compressed input entry.
///
/// Only stored when input CHANGES (not every tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

/// Complete input recording for one session.
///
/// Holds everything needed to replay the session: per-tick player input and
/// the tick counts at which the countdown fired. The opponent needs no
/// recording since it is driven by the seeded RNG.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecorder {
    /// RNG seed used for this session
    pub rng_seed: u64,

    /// Ticks recorded (one past the last recorded tick)
    ticks: u32,

    /// Only ticks where input changed
    deltas: Vec<InputDelta>,

    /// Value of the tick counter at each countdown decrement
    countdowns: Vec<u32>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecorder {
    /// Create an empty recording.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ticks: 0,
            deltas: Vec::with_capacity(256),
            countdowns: Vec::new(),
            last_frame: InputFrame::IDLE,
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.ticks = self.ticks.max(tick.saturating_add(1));

        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Record a countdown decrement that happened after `ticks_run` ticks.
    pub fn mark_countdown(&mut self, ticks_run: u32) {
        self.countdowns.push(ticks_run);
    }

    /// Get input at a specific tick.
    pub fn get_input_at(&self, tick: u32) -> InputFrame {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::IDLE
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Number of ticks covered.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Countdown marks in the order they happened.
    pub fn countdowns(&self) -> &[u32] {
        &self.countdowns
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing() {
        assert_eq!(Key::parse("a"), Some(Key::Left));
        assert_eq!(Key::parse("A"), Some(Key::Left));
        assert_eq!(Key::parse("arrowright"), Some(Key::Right));
        assert_eq!(Key::parse("ArrowUp"), Some(Key::Jump));
        assert_eq!(Key::parse("S"), Some(Key::Down));
        assert_eq!(Key::parse("Space"), Some(Key::Fire));
        assert_eq!(Key::parse("Enter"), None);
        assert_eq!(Key::parse(""), None);
    }

    #[test]
    fn test_level_triggered_movement() {
        let mut input = InputState::new();
        input.on_key_down("d");
        assert_eq!(input.sample().intent, 1);
        // Still held on the next tick
        assert_eq!(input.sample().intent, 1);

        input.on_key_up("d");
        assert_eq!(input.sample().intent, 0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = InputState::new();
        input.on_key_down("a");
        input.on_key_down("ArrowRight");
        assert_eq!(input.sample().intent, 0);

        input.on_key_up("a");
        assert_eq!(input.sample().intent, 1);
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let mut input = InputState::new();
        input.on_key_down(" ");
        // Auto-repeat while held
        input.on_key_down(" ");
        input.on_key_down(" ");

        assert!(input.sample().fire);
        assert!(!input.sample().fire);

        input.on_key_up(" ");
        input.on_key_down(" ");
        assert!(input.sample().fire);
    }

    #[test]
    fn test_tap_between_ticks_still_fires() {
        let mut input = InputState::new();
        input.on_key_down(" ");
        input.on_key_up(" ");
        assert!(!input.is_held(Key::Fire));
        assert!(input.fire_pending());
        assert!(input.sample().fire);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut input = InputState::new();
        input.on_key_down("Escape");
        input.on_key_up("F5");
        assert!(input.sample().is_idle());
    }

    #[test]
    fn test_recorder_delta_compression() {
        let mut recorder = InputRecorder::new(12345);
        let frame = InputFrame::new(1, false, false);
        recorder.record(0, frame);
        recorder.record(1, frame);
        recorder.record(2, frame);
        assert_eq!(recorder.delta_count(), 1);

        recorder.record(3, InputFrame::new(1, true, false));
        assert_eq!(recorder.delta_count(), 2);
        assert_eq!(recorder.ticks(), 4);
    }

    #[test]
    fn test_recorder_get_at() {
        let mut recorder = InputRecorder::new(1);
        let left = InputFrame::new(-1, false, false);
        let shot = InputFrame::new(-1, false, true);

        recorder.record(10, left);
        recorder.record(20, shot);
        recorder.record(21, left);

        assert!(recorder.get_input_at(5).is_idle());
        assert_eq!(recorder.get_input_at(10), left);
        assert_eq!(recorder.get_input_at(15), left);
        assert_eq!(recorder.get_input_at(20), shot);
        assert_eq!(recorder.get_input_at(21), left);
        assert_eq!(recorder.get_input_at(500), left);
    }

    #[test]
    fn test_new_frame_clamps_intent() {
        assert_eq!(InputFrame::new(7, false, false).intent, 1);
        assert_eq!(InputFrame::new(-3, false, false).intent, -1);
    }
}
