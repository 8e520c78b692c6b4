//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the duel simulation.
//! All gameplay arithmetic is integer-only so a recorded session replays
//! bit-for-bit on any platform.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arena is 800 x 400 pixels, so the integer range leaves plenty of
//! headroom for projectiles flying past the edge.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// GAME CONSTANTS (All as integer literals - NO float conversion!)
//
// Distances are pixels, speeds are pixels per 60 Hz tick.
// =============================================================================

/// Arena width: 800 px
pub const ARENA_WIDTH: Fixed = 800 * FIXED_ONE;

/// Arena height: 400 px
pub const ARENA_HEIGHT: Fixed = 400 * FIXED_ONE;

/// Height of the ground strip at the bottom of the arena: 50 px
pub const GROUND_OFFSET: Fixed = 50 * FIXED_ONE;

/// Actor box edge (both player and opponent): 30 px
pub const ACTOR_SIZE: Fixed = 30 * FIXED_ONE;

/// Projectile box edge: 8 px
pub const PROJECTILE_SIZE: Fixed = 8 * FIXED_ONE;

/// Player horizontal speed: 5 px/tick
pub const PLAYER_SPEED: Fixed = 5 * FIXED_ONE;

/// Opponent approach step: 2 px/tick
pub const OPPONENT_STEP: Fixed = 2 * FIXED_ONE;

/// Jump impulse: -15 px/tick (negative is up)
pub const JUMP_IMPULSE: Fixed = -15 * FIXED_ONE;

/// Gravity: 0.8 px/tick² = floor(0.8 * 65536) = 52428
pub const GRAVITY: Fixed = 52428;

/// Projectile speed: 8 px/tick
pub const PROJECTILE_SPEED: Fixed = 8 * FIXED_ONE;

/// Opponent jump chance per tick: 0.02 = floor(0.02 * 65536) = 1310
pub const OPPONENT_JUMP_CHANCE: Fixed = 1310;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use arena_duel::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer pixel count to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Clamp a fixed-point number to a range.
///
/// If `max < min` the result is `min`, so a degenerate range never panics.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    if value > max {
        max.max(min)
    } else if value < min {
        min
    } else {
        value
    }
}

// =============================================================================
// TESTS
// =============================================================================
