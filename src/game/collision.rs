//! Collision Detection
//!
//! Projectile-vs-actor hits and scoring.

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::events::{GameEvent, RetireReason};
use crate::game::projectile::{Projectile, ProjectileId};
use crate::game::state::{Actor, Combatant, SessionState};

/// Score change when the opponent is hit.
pub const OPPONENT_HIT_SCORE: i32 = 1;

/// Score change when the player is hit.
pub const PLAYER_HIT_SCORE: i32 = -2;

/// Check if two axis-aligned boxes overlap (touching edges do not count).
#[inline]
pub fn aabb_overlap(pos_a: FixedVec2, size_a: Fixed, pos_b: FixedVec2, size_b: Fixed) -> bool {
    pos_a.x < pos_b.x + size_b
        && pos_a.x + size_a > pos_b.x
        && pos_a.y < pos_b.y + size_b
        && pos_a.y + size_a > pos_b.y
}

/// Score change for a hit on `target`.
#[inline]
pub fn hit_score(target: Combatant) -> i32 {
    match target {
        Combatant::Opponent => OPPONENT_HIT_SCORE,
        Combatant::Player => PLAYER_HIT_SCORE,
    }
}

/// A projectile striking an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileHit {
    /// Projectile that struck
    pub projectile_id: ProjectileId,
    /// Actor that was struck
    pub target: Combatant,
    /// Score change
    pub delta: i32,
}

/// Check a projectile against the actor it is allowed to hit.
pub fn check_projectile_hit(projectile: &Projectile, size: Fixed, target: &Actor) -> bool {
    aabb_overlap(projectile.position, size, target.position, target.size)
}

/// Find every hit in deterministic (id) order.
///
/// Projectiles only test against the rival of their owner.
pub fn check_all_projectile_hits(state: &SessionState) -> Vec<ProjectileHit> {
    let size = state.projectiles.size();
    state
        .projectiles
        .iter()
        .filter_map(|projectile| {
            let target = projectile.owner.rival();
            check_projectile_hit(projectile, size, state.actor(target)).then(|| ProjectileHit {
                projectile_id: projectile.id,
                target,
                delta: hit_score(target),
            })
        })
        .collect()
}

/// Apply hits: retire each projectile and adjust the score.
///
/// Returns the hits applied.
pub fn resolve_hits(state: &mut SessionState) -> Vec<ProjectileHit> {
    let hits = check_all_projectile_hits(state);
    let tick = state.tick;

    for hit in &hits {
        if state.projectiles.retire(hit.projectile_id).is_none() {
            continue;
        }
        state.score = state.score.saturating_add(hit.delta);
        state.push_event(GameEvent::actor_hit(
            tick,
            hit.target,
            hit.projectile_id,
            hit.delta,
            state.score,
        ));
        state.push_event(GameEvent::projectile_retired(tick, hit.projectile_id, RetireReason::Hit));
    }

    hits
}
