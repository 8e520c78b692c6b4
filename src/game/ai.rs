//! Opponent Controller
//!
//! Directional-commitment state machine for the AI opponent.
//!
//! ```text
//!                 desired != facing
//!                 && now - last_turn > hysteresis
//!   ┌─────────────┐ ─────────────────────────────> ┌──────────────┐
//!   │ Approaching │                                │   Turning    │
//!   └─────────────┘ <───────────────────────────── └──────────────┘
//!                     now - since > turn_lock
//! ```
//!
//! Approaching steps toward the player and may jump. Turning holds still.
//! The fire timer runs in both modes.

use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::fixed::{Fixed, fixed_abs};
use crate::core::hash::StateHasher;
use crate::core::rng::RandomSource;
use crate::game::state::{Actor, Facing};

/// Opponent mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiMode {
    /// Walking toward the player
    #[default]
    Approaching,
    /// Facing just flipped, movement locked
    Turning {
        /// Tick the commitment was made
        since: u32,
    },
}

/// Opponent decision state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiState {
    /// Current mode
    pub mode: AiMode,
    /// Tick of the last facing commitment
    pub last_turn_tick: u32,
    /// Tick of the last shot
    pub last_fire_tick: u32,
}

impl AiState {
    /// Fresh state: approaching, no turn or shot yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether movement is locked.
    #[inline]
    pub fn is_turning(&self) -> bool {
        matches!(self.mode, AiMode::Turning { .. })
    }

    /// Hash this state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        match self.mode {
            AiMode::Approaching => hasher.update_u8(0),
            AiMode::Turning { since } => {
                hasher.update_u8(1);
                hasher.update_u32(since);
            }
        }
        hasher.update_u32(self.last_turn_tick);
        hasher.update_u32(self.last_fire_tick);
    }
}

/// What the opponent wants to do this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AiDecision {
    /// Horizontal intent: -1, 0, +1
    pub intent: i32,
    /// Jump trial succeeded
    pub jump: bool,
    /// Fire timer elapsed
    pub fire: bool,
    /// Facing committed this tick
    pub turned: Option<Facing>,
}

/// Opponent tuning resolved to ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiController {
    /// Minimum ticks between commitments
    pub hysteresis: u32,
    /// Lock window after a commitment
    pub turn_lock: u32,
    /// Minimum ticks between shots
    pub fire_interval: u32,
    /// Centre distance at or below which the opponent holds
    pub proximity: Fixed,
    /// Per-tick jump probability
    pub jump_chance: Fixed,
}

impl AiController {
    /// Build from session configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            hysteresis: config.hysteresis_ticks(),
            turn_lock: config.turn_lock_ticks(),
            fire_interval: config.fire_interval_ticks(),
            proximity: config.opponent.proximity,
            jump_chance: config.opponent.jump_chance,
        }
    }

    /// Facing toward the player: Left when the player's centre is strictly left.
    #[inline]
    pub fn desired_facing(opponent: &Actor, player: &Actor) -> Facing {
        if player.center_x() < opponent.center_x() {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Run one tick of the state machine.
    ///
    /// Commits facing on `opponent` directly. Movement and jump are returned
    /// for the caller to apply through kinematics.
    pub fn update<R: RandomSource + ?Sized>(
        &self,
        ai: &mut AiState,
        opponent: &mut Actor,
        player: &Actor,
        now: u32,
        rng: &mut R,
    ) -> AiDecision {
        let mut decision = AiDecision::default();
        let desired = Self::desired_facing(opponent, player);

        // Mode transitions
        match ai.mode {
            AiMode::Approaching => {
                if desired != opponent.facing
                    && now.wrapping_sub(ai.last_turn_tick) > self.hysteresis
                {
                    opponent.facing = desired;
                    ai.last_turn_tick = now;
                    ai.mode = AiMode::Turning { since: now };
                    decision.turned = Some(desired);
                }
            }
            AiMode::Turning { since } => {
                if now.wrapping_sub(since) > self.turn_lock {
                    ai.mode = AiMode::Approaching;
                }
            }
        }

        // Movement and jump only while approaching
        if !ai.is_turning() {
            let distance = fixed_abs(player.center_x() - opponent.center_x());
            if distance > self.proximity {
                decision.intent = match desired {
                    Facing::Left => -1,
                    Facing::Right => 1,
                };
            }
            // Trial runs every approaching tick so the RNG stream stays aligned
            decision.jump = rng.chance(self.jump_chance) && opponent.grounded;
        }

        // Fire timer is independent of mode
        if now.wrapping_sub(ai.last_fire_tick) > self.fire_interval {
            ai.last_fire_tick = now;
            decision.fire = true;
        }

        decision
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{FIXED_ONE, from_int};

    struct Always(bool);

    impl RandomSource for Always {
        fn chance(&mut self, _probability: Fixed) -> bool {
            self.0
        }
    }

    fn setup(player_x: i32, opponent_x: i32, facing: Facing) -> (AiController, AiState, Actor, Actor) {
        let config = GameConfig::default();
        let ground = config.ground_line();
        (
            AiController::from_config(&config),
            AiState::new(),
            Actor::grounded_at(from_int(player_x), ground, Facing::Right, config.actor_size),
            Actor::grounded_at(from_int(opponent_x), ground, facing, config.actor_size),
        )
    }

    #[test]
    fn test_default_tuning() {
        let (ai, ..) = setup(0, 0, Facing::Left);
        assert_eq!(ai.hysteresis, 60);
        assert_eq!(ai.turn_lock, 6);
        assert_eq!(ai.fire_interval, 30);
        assert_eq!(ai.proximity, from_int(30));
    }

    #[test]
    fn test_approaches_player() {
        let (ai, mut state, player, mut opponent) = setup(100, 500, Facing::Left);
        let decision = ai.update(&mut state, &mut opponent, &player, 1, &mut Always(false));
        assert_eq!(decision.intent, -1);
        assert!(!decision.jump);
        assert!(decision.turned.is_none());
    }

    #[test]
    fn test_holds_within_proximity() {
        let (ai, mut state, player, mut opponent) = setup(380, 400, Facing::Left);
        let decision = ai.update(&mut state, &mut opponent, &player, 1, &mut Always(false));
        assert_eq!(decision.intent, 0);

        // Exactly at the threshold still holds
        let (ai, mut state, player, mut opponent) = setup(370, 400, Facing::Left);
        let decision = ai.update(&mut state, &mut opponent, &player, 1, &mut Always(false));
        assert_eq!(decision.intent, 0);
    }

    #[test]
    fn test_turn_requires_hysteresis() {
        let (ai, mut state, player, mut opponent) = setup(600, 400, Facing::Left);

        // Tick 60 is not strictly past the window
        let decision = ai.update(&mut state, &mut opponent, &player, 60, &mut Always(false));
        assert!(decision.turned.is_none());
        assert_eq!(opponent.facing, Facing::Left);
        // Still walks toward the player's side
        assert_eq!(decision.intent, 1);

        let decision = ai.update(&mut state, &mut opponent, &player, 61, &mut Always(false));
        assert_eq!(decision.turned, Some(Facing::Right));
        assert_eq!(opponent.facing, Facing::Right);
        assert_eq!(state.mode, AiMode::Turning { since: 61 });
        assert_eq!(decision.intent, 0);
    }

    #[test]
    fn test_turn_lock_releases() {
        let (ai, mut state, player, mut opponent) = setup(600, 400, Facing::Left);
        ai.update(&mut state, &mut opponent, &player, 61, &mut Always(true));

        // Locked: no movement, no jump, even with a forced trial
        for now in 62..=67 {
            let decision = ai.update(&mut state, &mut opponent, &player, now, &mut Always(true));
            assert!(state.is_turning(), "released early at {}", now);
            assert_eq!(decision.intent, 0);
            assert!(!decision.jump);
        }

        let decision = ai.update(&mut state, &mut opponent, &player, 68, &mut Always(true));
        assert_eq!(state.mode, AiMode::Approaching);
        assert_eq!(decision.intent, 1);
        assert!(decision.jump);
    }

    #[test]
    fn test_no_second_turn_inside_hysteresis() {
        let (ai, mut state, mut player, mut opponent) = setup(600, 400, Facing::Left);
        ai.update(&mut state, &mut opponent, &player, 61, &mut Always(false));
        for now in 62..=70 {
            ai.update(&mut state, &mut opponent, &player, now, &mut Always(false));
        }

        // Player crosses back; commitment must wait until tick 122
        player.position.x = from_int(100);
        for now in 71..=121 {
            let decision = ai.update(&mut state, &mut opponent, &player, now, &mut Always(false));
            assert!(decision.turned.is_none());
        }
        let decision = ai.update(&mut state, &mut opponent, &player, 122, &mut Always(false));
        assert_eq!(decision.turned, Some(Facing::Left));
    }

    #[test]
    fn test_fire_timer() {
        let (ai, mut state, player, mut opponent) = setup(100, 500, Facing::Left);
        let mut shots = Vec::new();
        for now in 1..=100 {
            if ai.update(&mut state, &mut opponent, &player, now, &mut Always(false)).fire {
                shots.push(now);
            }
        }
        assert_eq!(shots, vec![31, 62, 93]);
    }

    #[test]
    fn test_fires_while_turning() {
        let (ai, mut state, player, mut opponent) = setup(600, 400, Facing::Left);
        state.last_fire_tick = 30;
        let decision = ai.update(&mut state, &mut opponent, &player, 61, &mut Always(false));
        assert!(decision.turned.is_some());
        assert!(decision.fire);
    }

    #[test]
    fn test_airborne_does_not_jump() {
        let (ai, mut state, player, mut opponent) = setup(100, 500, Facing::Left);
        opponent.grounded = false;
        opponent.velocity_y = -FIXED_ONE;
        let decision = ai.update(&mut state, &mut opponent, &player, 1, &mut Always(true));
        assert!(!decision.jump);
    }
}
