//! Core deterministic primitives.
//!
//! Everything the simulation computes with: fixed-point numbers, vectors,
//! the seeded RNG and the state hasher used for replay verification.

pub mod fixed;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use rng::{DeterministicRng, RandomSource};
pub use hash::{StateHash, compute_state_hash};
