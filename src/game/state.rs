//! Game State Definitions
//!
//! All state types for the duel simulation.
//! Uses BTreeMap (inside the projectile manager) for deterministic iteration.

use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::ai::AiState;
use crate::game::events::GameEvent;
use crate::game::projectile::{Projectile, ProjectileManager};

// =============================================================================
// SIDES AND FACING
// =============================================================================

/// One of the two actors in a duel.
///
/// Used both to name an actor and to record who fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Combatant {
    /// Keyboard-controlled actor
    Player = 0,
    /// AI-controlled actor
    Opponent = 1,
}

impl Combatant {
    /// The other side.
    #[inline]
    pub fn rival(self) -> Self {
        match self {
            Combatant::Player => Combatant::Opponent,
            Combatant::Opponent => Combatant::Player,
        }
    }
}

/// Horizontal facing of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    /// Looking toward x = 0
    Left = 0,
    /// Looking toward x = arena width
    Right = 1,
}

impl Facing {
    /// Unit direction vector.
    #[inline]
    pub fn direction(self) -> FixedVec2 {
        match self {
            Facing::Left => FixedVec2::LEFT,
            Facing::Right => FixedVec2::RIGHT,
        }
    }

    /// Facing implied by a horizontal intent, if any.
    #[inline]
    pub fn from_intent(intent: i32) -> Option<Self> {
        match intent.signum() {
            -1 => Some(Facing::Left),
            1 => Some(Facing::Right),
            _ => None,
        }
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// A body in the arena: the player or the opponent.
///
/// `position` is the top-left corner of the actor's box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner
    pub position: FixedVec2,
    /// Vertical velocity (negative is up)
    pub velocity_y: Fixed,
    /// Resting on the ground line
    pub grounded: bool,
    /// Horizontal facing
    pub facing: Facing,
    /// Box edge length
    pub size: Fixed,
}

impl Actor {
    /// Create an actor standing on the ground.
    pub fn grounded_at(x: Fixed, ground_line: Fixed, facing: Facing, size: Fixed) -> Self {
        Self {
            position: FixedVec2::new(x, ground_line),
            velocity_y: 0,
            grounded: true,
            facing,
            size,
        }
    }

    /// Horizontal centre.
    #[inline]
    pub fn center_x(&self) -> Fixed {
        self.position.x + (self.size >> 1)
    }

    /// Centre point (where projectiles spawn).
    #[inline]
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(self.center_x(), self.position.y + (self.size >> 1))
    }

    /// Hash this actor's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_fixed(self.velocity_y);
        hasher.update_bool(self.grounded);
        hasher.update_u8(self.facing as u8);
    }
}

// =============================================================================
// SESSION PHASE
// =============================================================================

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum SessionPhase {
    /// Clock running, simulation ticking
    #[default]
    Playing,
    /// Countdown reached zero. Terminal: state is frozen.
    Finished,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Complete state of a duel session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Simulation ticks run so far
    pub tick: u32,

    /// Current phase
    pub phase: SessionPhase,

    /// Whole seconds left on the countdown
    pub seconds_remaining: u32,

    /// Running score (+1 per opponent hit, -2 per player hit)
    pub score: i32,

    /// Keyboard-controlled actor
    pub player: Actor,

    /// AI-controlled actor
    pub opponent: Actor,

    /// Opponent decision state
    pub ai: AiState,

    /// Live projectiles
    pub projectiles: ProjectileManager,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    #[serde(skip)]
    pub rng: DeterministicRng,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl SessionState {
    /// Create a fresh session with both actors on the ground.
    pub fn new(config: &GameConfig, rng_seed: u64) -> Self {
        let ground = config.ground_line();
        Self {
            tick: 0,
            phase: SessionPhase::Playing,
            seconds_remaining: config.session_seconds,
            score: 0,
            player: Actor::grounded_at(config.player_spawn_x, ground, Facing::Right, config.actor_size),
            opponent: Actor::grounded_at(config.opponent_spawn_x, ground, Facing::Left, config.actor_size),
            ai: AiState::new(),
            projectiles: ProjectileManager::from_config(config),
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            pending_events: Vec::new(),
        }
    }

    /// Get an actor by side.
    pub fn actor(&self, who: Combatant) -> &Actor {
        match who {
            Combatant::Player => &self.player,
            Combatant::Opponent => &self.opponent,
        }
    }

    /// Check if the session has finished.
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished)
    }

    /// Immutable copy of everything a renderer needs.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            score: self.score,
            player: self.player.clone(),
            opponent: self.opponent.clone(),
            projectiles: self.projectiles.iter().cloned().collect(),
        }
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            hasher.update_u32(self.seconds_remaining);
            hasher.update_i32(self.score);

            self.player.hash_into(hasher);
            self.opponent.hash_into(hasher);
            self.ai.hash_into(hasher);

            // BTreeMap keeps projectiles in id order
            hasher.update_u32(self.projectiles.next_id());
            for projectile in self.projectiles.iter() {
                projectile.hash_into(hasher);
            }
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Read-only view of a session, published once per tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation tick this snapshot was taken at
    pub tick: u32,
    /// Session phase
    pub phase: SessionPhase,
    /// Whole seconds left
    pub seconds_remaining: u32,
    /// Current score
    pub score: i32,
    /// Player actor
    pub player: Actor,
    /// Opponent actor
    pub opponent: Actor,
    /// Live projectiles, ordered by id
    pub projectiles: Vec<Projectile>,
}

impl Snapshot {
    /// Serialize for a browser renderer bridge.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Render a score the way the minigame displays it: one hit is 0.01.
///
/// ```
/// use arena_duel::game::state::format_score;
/// assert_eq!(format_score(3), "0.03");
/// assert_eq!(format_score(-250), "-2.50");
/// ```
pub fn format_score(score: i32) -> String {
    let sign = if score < 0 { "-" } else { "" };
    let abs = score.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    #[test]
    fn test_new_session_layout() {
        let config = GameConfig::default();
        let state = SessionState::new(&config, 12345);

        assert_eq!(state.phase, SessionPhase::Playing);
        assert_eq!(state.seconds_remaining, 20);
        assert_eq!(state.score, 0);

        assert_eq!(state.player.position, FixedVec2::from_ints(100, 320));
        assert_eq!(state.player.facing, Facing::Right);
        assert!(state.player.grounded);

        assert_eq!(state.opponent.position, FixedVec2::from_ints(650, 320));
        assert_eq!(state.opponent.facing, Facing::Left);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_actor_center() {
        let actor = Actor::grounded_at(from_int(100), from_int(320), Facing::Right, from_int(30));
        assert_eq!(actor.center_x(), from_int(115));
        assert_eq!(actor.center(), FixedVec2::from_ints(115, 335));
    }

    #[test]
    fn test_facing_helpers() {
        assert_eq!(Facing::from_intent(-3), Some(Facing::Left));
        assert_eq!(Facing::from_intent(0), None);
        assert_eq!(Facing::from_intent(1), Some(Facing::Right));
        assert_eq!(Combatant::Player.rival(), Combatant::Opponent);
    }

    #[test]
    fn test_session_hash_determinism() {
        let config = GameConfig::default();
        let state1 = SessionState::new(&config, 12345);
        let state2 = SessionState::new(&config, 12345);
        assert_eq!(state1.compute_hash(), state2.compute_hash());

        let mut state3 = SessionState::new(&config, 12345);
        state3.score = 1;
        assert_ne!(state1.compute_hash(), state3.compute_hash());
    }

    #[test]
    fn test_snapshot_json() {
        let config = GameConfig::default();
        let state = SessionState::new(&config, 1);
        let json = state.snapshot().to_json().unwrap();
        assert!(json.contains("\"seconds_remaining\":20"));
        assert!(json.contains("\"phase\":\"Playing\""));
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0.00");
        assert_eq!(format_score(1), "0.01");
        assert_eq!(format_score(-2), "-0.02");
        assert_eq!(format_score(123), "1.23");
        assert_eq!(format_score(i32::MIN), "-21474836.48");
    }
}
