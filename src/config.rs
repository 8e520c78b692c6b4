//! Session Configuration
//!
//! Geometry, physics and opponent tuning for one duel.
//! Defaults reproduce the browser minigame exactly; a JSON file can override
//! any subset of fields.
//!
//! Distances and speeds are written in pixels (floats) in JSON and stored as
//! Q16.16 fixed-point internally.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed, FIXED_ONE, from_int,
    ARENA_WIDTH, ARENA_HEIGHT, GROUND_OFFSET, ACTOR_SIZE, PROJECTILE_SIZE,
    PLAYER_SPEED, OPPONENT_STEP, JUMP_IMPULSE, GRAVITY, PROJECTILE_SPEED,
    OPPONENT_JUMP_CHANCE,
};

/// Highest tick rate the runtime driver can schedule (one tick per nanosecond).
pub const MAX_TICK_RATE: u32 = 1_000_000_000;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Opponent behaviour tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Minimum time between two facing commitments (ms).
    pub hysteresis_ms: u32,
    /// Movement lock after a commitment (ms).
    pub turn_lock_ms: u32,
    /// Minimum time between two shots (ms).
    pub fire_interval_ms: u32,
    /// Centre distance at or below which the opponent holds position.
    #[serde(with = "pixels")]
    pub proximity: Fixed,
    /// Per-tick jump probability (0.0 to 1.0).
    #[serde(with = "pixels")]
    pub jump_chance: Fixed,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            hysteresis_ms: 1000,
            turn_lock_ms: 100,
            fire_interval_ms: 500,
            proximity: ACTOR_SIZE,
            jump_chance: OPPONENT_JUMP_CHANCE,
        }
    }
}

/// Complete configuration for a duel session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation tick rate (Hz)
    pub tick_rate: u32,
    /// Session length (seconds)
    pub session_seconds: u32,
    /// Fixed RNG seed. When absent the seed is derived from the session id.
    pub rng_seed: Option<u64>,

    /// Arena width
    #[serde(with = "pixels")]
    pub arena_width: Fixed,
    /// Arena height
    #[serde(with = "pixels")]
    pub arena_height: Fixed,
    /// Height of the ground strip below the ground line
    #[serde(with = "pixels")]
    pub ground_offset: Fixed,
    /// Actor box edge
    #[serde(with = "pixels")]
    pub actor_size: Fixed,
    /// Projectile box edge
    #[serde(with = "pixels")]
    pub projectile_size: Fixed,

    /// Player horizontal speed per tick
    #[serde(with = "pixels")]
    pub player_speed: Fixed,
    /// Opponent approach step per tick
    #[serde(with = "pixels")]
    pub opponent_step: Fixed,
    /// Vertical velocity applied on jump (negative is up)
    #[serde(with = "pixels")]
    pub jump_impulse: Fixed,
    /// Gravity added to vertical velocity every tick
    #[serde(with = "pixels")]
    pub gravity: Fixed,
    /// Projectile speed per tick
    #[serde(with = "pixels")]
    pub projectile_speed: Fixed,

    /// Player spawn x (left edge)
    #[serde(with = "pixels")]
    pub player_spawn_x: Fixed,
    /// Opponent spawn x (left edge)
    #[serde(with = "pixels")]
    pub opponent_spawn_x: Fixed,

    /// Opponent tuning
    pub opponent: OpponentConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: crate::TICK_RATE,
            session_seconds: 20,
            rng_seed: None,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            ground_offset: GROUND_OFFSET,
            actor_size: ACTOR_SIZE,
            projectile_size: PROJECTILE_SIZE,
            player_speed: PLAYER_SPEED,
            opponent_step: OPPONENT_STEP,
            jump_impulse: JUMP_IMPULSE,
            gravity: GRAVITY,
            projectile_speed: PROJECTILE_SPEED,
            player_spawn_x: from_int(100),
            opponent_spawn_x: ARENA_WIDTH - from_int(150),
            opponent: OpponentConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check that the geometry and tuning describe a playable arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid { field, reason: reason.into() }
        }

        if self.tick_rate == 0 || self.tick_rate > MAX_TICK_RATE {
            return Err(invalid("tick_rate", format!("must be between 1 and {}", MAX_TICK_RATE)));
        }
        if self.session_seconds == 0 {
            return Err(invalid("session_seconds", "must be positive"));
        }
        if self.actor_size <= 0 || self.actor_size >= self.arena_width {
            return Err(invalid("actor_size", "must be positive and narrower than the arena"));
        }
        if self.projectile_size <= 0 {
            return Err(invalid("projectile_size", "must be positive"));
        }
        if self.ground_offset < 0 || self.ground_line() < 0 {
            return Err(invalid("ground_offset", "ground line must lie inside the arena"));
        }
        if self.gravity <= 0 {
            return Err(invalid("gravity", "must be positive"));
        }
        if self.jump_impulse >= 0 {
            return Err(invalid("jump_impulse", "must be negative (upward)"));
        }
        if self.projectile_speed <= 0 {
            return Err(invalid("projectile_speed", "must be positive"));
        }
        if self.player_speed < 0 {
            return Err(invalid("player_speed", "must not be negative"));
        }
        if self.opponent_step < 0 {
            return Err(invalid("opponent_step", "must not be negative"));
        }

        // A projectile may sit just inside the expanded bounds, move one more
        // step and still be hit-tested against its own size
        let reach = |extent: Fixed| {
            extent
                .checked_add(self.projectile_size)
                .and_then(|v| v.checked_add(self.projectile_size))
                .and_then(|v| v.checked_add(self.projectile_speed))
        };
        if reach(self.arena_width).is_none() {
            return Err(invalid("arena_width", "too large for projectile bounds"));
        }
        if reach(self.arena_height).is_none() {
            return Err(invalid("arena_height", "too large for projectile bounds"));
        }
        for (field, x) in [
            ("player_spawn_x", self.player_spawn_x),
            ("opponent_spawn_x", self.opponent_spawn_x),
        ] {
            if x < 0 || x > self.max_actor_x() {
                return Err(invalid(field, "spawn must lie inside the arena"));
            }
        }
        if !(0..=FIXED_ONE).contains(&self.opponent.jump_chance) {
            return Err(invalid("opponent.jump_chance", "must be between 0 and 1"));
        }
        if self.opponent.proximity < 0 {
            return Err(invalid("opponent.proximity", "must not be negative"));
        }
        Ok(())
    }

    /// Y of an actor's top edge when it stands on the ground.
    #[inline]
    pub fn ground_line(&self) -> Fixed {
        self.arena_height - self.actor_size - self.ground_offset
    }

    /// Largest x an actor's left edge may reach.
    #[inline]
    pub fn max_actor_x(&self) -> Fixed {
        self.arena_width - self.actor_size
    }

    /// Convert a millisecond interval to whole ticks (rounded).
    #[inline]
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        ((ms as u64 * self.tick_rate as u64 + 500) / 1000) as u32
    }

    /// Hysteresis window in ticks.
    pub fn hysteresis_ticks(&self) -> u32 {
        self.ms_to_ticks(self.opponent.hysteresis_ms)
    }

    /// Turn lock window in ticks.
    pub fn turn_lock_ticks(&self) -> u32 {
        self.ms_to_ticks(self.opponent.turn_lock_ms)
    }

    /// Fire interval in ticks.
    pub fn fire_interval_ticks(&self) -> u32 {
        self.ms_to_ticks(self.opponent.fire_interval_ms)
    }
}

/// Serde adapter: pixels as floats on the wire, Q16.16 in memory.
mod pixels {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;

    use crate::core::fixed::{Fixed, to_fixed, to_float};

    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(to_float(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() || value.abs() >= 32768.0 {
            return Err(D::Error::custom(format!(
                "{} is outside the fixed-point range",
                value
            )));
        }
        Ok(to_fixed(value))
    }
}

// =============================================================================
// TESTS
// =============================================================================
