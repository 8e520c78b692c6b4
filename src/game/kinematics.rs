//! Actor Kinematics
//!
//! Horizontal stepping, jumping and gravity for both actors.
//!
//! `dt` is measured in ticks: `FIXED_ONE` is one 60 Hz tick, so the default
//! constants (pixels per tick) apply unscaled.

use crate::config::GameConfig;
use crate::core::fixed::{Fixed, fixed_mul, fixed_clamp};
use crate::game::state::{Actor, Facing};

/// Who owns an actor's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingPolicy {
    /// Facing follows any non-zero horizontal intent (player)
    FollowIntent,
    /// Facing is left alone; the AI commits it separately (opponent)
    External,
}

/// Per-actor movement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionProfile {
    /// Horizontal distance per tick at full intent
    pub speed: Fixed,
    /// Facing ownership
    pub facing: FacingPolicy,
}

impl MotionProfile {
    /// Player: full speed, facing follows keys.
    pub fn player(config: &GameConfig) -> Self {
        Self { speed: config.player_speed, facing: FacingPolicy::FollowIntent }
    }

    /// Opponent: approach step, facing owned by the AI.
    pub fn opponent(config: &GameConfig) -> Self {
        Self { speed: config.opponent_step, facing: FacingPolicy::External }
    }
}

/// Advance one actor by `dt`.
///
/// Returns `true` if the actor left the ground this step.
pub fn advance(
    actor: &mut Actor,
    horizontal_intent: i32,
    jump_requested: bool,
    dt: Fixed,
    config: &GameConfig,
    profile: MotionProfile,
) -> bool {
    let intent = horizontal_intent.signum();

    // Horizontal
    if intent != 0 {
        let step = fixed_mul(profile.speed, dt) * intent;
        actor.position.x = fixed_clamp(
            actor.position.x.saturating_add(step),
            0,
            config.max_actor_x(),
        );
        if profile.facing == FacingPolicy::FollowIntent {
            if let Some(facing) = Facing::from_intent(intent) {
                actor.facing = facing;
            }
        }
    }

    // Jump (no-op while airborne)
    let jumped = jump_requested && actor.grounded;
    if jumped {
        actor.velocity_y = config.jump_impulse;
        actor.grounded = false;
    }

    // Gravity always accumulates, then integrate
    actor.velocity_y = actor.velocity_y.saturating_add(fixed_mul(config.gravity, dt));
    actor.position.y = actor.position.y.saturating_add(fixed_mul(actor.velocity_y, dt));

    // Ground contact
    let ground = config.ground_line();
    if actor.position.y >= ground {
        actor.position.y = ground;
        actor.velocity_y = 0;
        actor.grounded = true;
    }

    jumped
}

// =============================================================================
// TESTS
// =============================================================================
