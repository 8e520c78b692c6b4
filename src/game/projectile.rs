//! Projectile Management
//!
//! Spawning, straight-line flight and retirement of projectiles.
//! Projectiles live in a BTreeMap keyed by id so iteration order is
//! deterministic; ids are never reused within a session.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::fixed::Fixed;
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::state::Combatant;

/// Unique projectile identifier within a session.
pub type ProjectileId = u32;

/// A projectile in flight.
///
/// `position` is the top-left corner of its box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique id
    pub id: ProjectileId,
    /// Top-left corner
    pub position: FixedVec2,
    /// Constant velocity per tick
    pub velocity: FixedVec2,
    /// Who fired it
    pub owner: Combatant,
    /// Tick it was spawned
    pub spawn_tick: u32,
}

impl Projectile {
    /// Hash this projectile for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_u8(self.owner as u8);
        hasher.update_u32(self.spawn_tick);
    }
}

/// Owns every live projectile in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileManager {
    /// Live projectiles by id
    projectiles: BTreeMap<ProjectileId, Projectile>,
    /// Next id to hand out
    next_id: ProjectileId,
    /// Box edge
    size: Fixed,
    /// Speed per tick
    speed: Fixed,
    /// Arena width
    arena_width: Fixed,
    /// Arena height
    arena_height: Fixed,
}

impl ProjectileManager {
    /// Create an empty manager for the given arena.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            projectiles: BTreeMap::new(),
            next_id: 0,
            size: config.projectile_size,
            speed: config.projectile_speed,
            arena_width: config.arena_width,
            arena_height: config.arena_height,
        }
    }

    /// Spawn a projectile at `origin` travelling along `direction` at the
    /// configured speed.
    pub fn spawn(
        &mut self,
        origin: FixedVec2,
        direction: FixedVec2,
        owner: Combatant,
        tick: u32,
    ) -> ProjectileId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.projectiles.insert(id, Projectile {
            id,
            position: origin,
            velocity: direction.scale(self.speed),
            owner,
            spawn_tick: tick,
        });
        id
    }

    /// Move every projectile by its velocity scaled by `dt` (ticks) and
    /// remove those that left the expanded arena.
    ///
    /// Returns the ids removed, in id order.
    pub fn advance(&mut self, dt: Fixed) -> Vec<ProjectileId> {
        let mut retired = Vec::new();
        for projectile in self.projectiles.values_mut() {
            projectile.position = projectile.position + projectile.velocity.scale(dt);
        }

        let (size, width, height) = (self.size, self.arena_width, self.arena_height);
        self.projectiles.retain(|id, projectile| {
            let p = projectile.position;
            let inside = p.x > -size && p.x < width + size && p.y > -size && p.y < height + size;
            if !inside {
                retired.push(*id);
            }
            inside
        });
        retired
    }

    /// Remove a projectile after a hit.
    pub fn retire(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    /// Look up a live projectile.
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Live projectiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Number of live projectiles.
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Check if no projectiles are live.
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Id the next spawn will receive.
    pub fn next_id(&self) -> ProjectileId {
        self.next_id
    }

    /// Projectile box edge.
    pub fn size(&self) -> Fixed {
        self.size
    }
}

// =============================================================================
// TESTS
// =============================================================================
