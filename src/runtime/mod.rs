//! Runtime Layer
//!
//! Drives a session against wall-clock timers.
//! This layer is **non-deterministic**; all game logic runs through `game/`.

pub mod driver;

pub use driver::{
    spawn_session, InputEvent, InputListener, RuntimeError, SessionHandle, SessionId,
    SessionSummary,
};
