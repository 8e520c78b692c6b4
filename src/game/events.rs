//! Game Events
//!
//! Events generated during simulation for replay and verification.

use serde::{Serialize, Deserialize};
use crate::core::vec2::FixedVec2;
use crate::game::state::{Combatant, Facing};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Score changes processed first
    Hit = 0,
    /// Then projectile spawns and retirements
    Projectile = 1,
    /// Then opponent decisions
    Decision = 2,
    /// Then movement
    Movement = 3,
    /// Lowest priority
    Other = 255,
}

/// Why a projectile left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetireReason {
    /// Crossed the arena bounds
    OutOfBounds,
    /// Struck an actor
    Hit,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// An actor fired a projectile
    ProjectileFired {
        projectile_id: u32,
        owner: Combatant,
        position: FixedVec2,
    },

    /// A projectile was removed from play
    ProjectileRetired {
        projectile_id: u32,
        reason: RetireReason,
    },

    /// An actor was struck and the score changed
    ActorHit {
        target: Combatant,
        projectile_id: u32,
        delta: i32,
        new_score: i32,
    },

    /// The opponent committed to a new facing
    OpponentTurned {
        facing: Facing,
    },

    /// An actor left the ground
    ActorJumped {
        actor: Combatant,
    },

    /// Countdown reached zero
    SessionFinished {
        final_score: i32,
    },
}

/// A game event with timing and priority.
///
/// Equality compares every field. Processing order is `order_key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Actor involved (for tie-breaking)
    pub actor: Option<Combatant>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let actor = match &data {
            GameEventData::ProjectileFired { owner, .. } => Some(*owner),
            GameEventData::ActorHit { target, .. } => Some(*target),
            GameEventData::OpponentTurned { .. } => Some(Combatant::Opponent),
            GameEventData::ActorJumped { actor } => Some(*actor),
            _ => None,
        };

        Self {
            tick,
            priority,
            actor,
            data,
        }
    }

    /// Create projectile fired event.
    pub fn projectile_fired(tick: u32, projectile_id: u32, owner: Combatant, position: FixedVec2) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            GameEventData::ProjectileFired { projectile_id, owner, position },
        )
    }

    /// Create projectile retired event.
    pub fn projectile_retired(tick: u32, projectile_id: u32, reason: RetireReason) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            GameEventData::ProjectileRetired { projectile_id, reason },
        )
    }

    /// Create actor hit event.
    pub fn actor_hit(tick: u32, target: Combatant, projectile_id: u32, delta: i32, new_score: i32) -> Self {
        Self::new(
            tick,
            EventPriority::Hit,
            GameEventData::ActorHit { target, projectile_id, delta, new_score },
        )
    }

    /// Create opponent turned event.
    pub fn opponent_turned(tick: u32, facing: Facing) -> Self {
        Self::new(tick, EventPriority::Decision, GameEventData::OpponentTurned { facing })
    }

    /// Create actor jumped event.
    pub fn actor_jumped(tick: u32, actor: Combatant) -> Self {
        Self::new(tick, EventPriority::Movement, GameEventData::ActorJumped { actor })
    }

    /// Create session finished event.
    pub fn session_finished(tick: u32, final_score: i32) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::SessionFinished { final_score })
    }

    /// Processing order: tick, then priority, then actor.
    #[inline]
    pub fn order_key(&self) -> (u32, EventPriority, Option<Combatant>) {
        (self.tick, self.priority, self.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let hit = GameEvent::actor_hit(10, Combatant::Opponent, 3, 1, 1);
        let fired = GameEvent::projectile_fired(10, 4, Combatant::Player, FixedVec2::ZERO);
        let jumped = GameEvent::actor_jumped(9, Combatant::Opponent);
        let player_hit = GameEvent::actor_hit(10, Combatant::Player, 5, -2, -1);

        // Same tick, but hit < fire
        assert!(hit.order_key() < fired.order_key());

        // Earlier tick wins regardless of priority
        assert!(jumped.order_key() < hit.order_key());

        // Same tick and priority, player before opponent
        assert!(player_hit.order_key() < hit.order_key());
    }

    #[test]
    fn test_equality_includes_payload() {
        let a = GameEvent::actor_hit(10, Combatant::Opponent, 3, 1, 1);
        let b = GameEvent::actor_hit(10, Combatant::Opponent, 4, 1, 2);

        assert_eq!(a.order_key(), b.order_key());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_event_actor_tag() {
        assert_eq!(GameEvent::opponent_turned(1, Facing::Right).actor, Some(Combatant::Opponent));
        assert_eq!(GameEvent::projectile_retired(1, 0, RetireReason::OutOfBounds).actor, None);
        assert_eq!(GameEvent::session_finished(1200, -4).actor, None);
    }
}
