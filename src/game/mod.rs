//! Game Logic Module
//!
//! All duel simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Key state, per-tick input frames, input recording
//! - `kinematics`: Horizontal stepping, jumping, gravity
//! - `ai`: Opponent commitment state machine
//! - `projectile`: Projectile spawning, flight, retirement
//! - `collision`: Projectile hits and scoring
//! - `state`: Session state, actors, snapshots
//! - `tick`: Authoritative simulation loop and replay
//! - `clock`: Session timers and settlement hand-off
//! - `events`: Game events for replay/verification

pub mod input;
pub mod kinematics;
pub mod ai;
pub mod projectile;
pub mod collision;
pub mod state;
pub mod tick;
pub mod clock;
pub mod events;

// Re-export key types
pub use input::{InputFrame, InputRecorder, InputState, Key};
pub use state::{Actor, Combatant, Facing, SessionPhase, SessionState, Snapshot, format_score};
pub use tick::{TickResult, tick, countdown, replay_session};
pub use clock::{GameClock, Settlement, StepReport};
pub use events::GameEvent;
