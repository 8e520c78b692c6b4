//! # Arena Duel
//!
//! Deterministic two-actor combat simulation for the Arena Duel minigame.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ARENA DUEL                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Key state, input frames, recording        │
//! │  ├── kinematics.rs - Movement, jumping, gravity              │
//! │  ├── ai.rs       - Opponent commitment state machine         │
//! │  ├── projectile.rs - Projectile flight and retirement        │
//! │  ├── collision.rs- Hits and scoring                          │
//! │  ├── state.rs    - Session state and snapshots               │
//! │  ├── tick.rs     - Authoritative simulation loop             │
//! │  └── clock.rs    - Session timers and settlement             │
//! │                                                              │
//! │  runtime/        - Wall-clock driver (non-deterministic)     │
//! │  └── driver.rs   - tokio timers, input channel, snapshots    │
//! │                                                              │
//! │  config.rs       - Geometry, physics and AI tuning           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given identical inputs and RNG seed, a session replays to the same
//! state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rng::{DeterministicRng, RandomSource};
pub use config::{GameConfig, ConfigError};
pub use game::clock::{GameClock, Settlement};
pub use game::input::{InputFrame, InputState, InputRecorder};
pub use game::state::{SessionState, Snapshot, format_score};
pub use runtime::driver::{spawn_session, SessionHandle, SessionSummary, RuntimeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
