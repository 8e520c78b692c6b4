//! Property tests for the simulation invariants.
//!
//! Random input scripts and random opponent dice are fed through the tick
//! loop; every tick is checked against the arena, projectile, scoring and
//! opponent-mode invariants.

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arena_duel::core::fixed::{Fixed, FIXED_ONE};
use arena_duel::game::ai::AiMode;
use arena_duel::game::events::GameEventData;
use arena_duel::game::tick::{countdown, tick_with};
use arena_duel::{GameClock, GameConfig, InputFrame, RandomSource, SessionState};

/// `RandomSource` backed by a seeded `rand` generator.
struct RandSource(StdRng);

impl RandomSource for RandSource {
    fn chance(&mut self, probability: Fixed) -> bool {
        self.0.gen_range(0..FIXED_ONE) < probability
    }
}

fn frame_strategy() -> impl Strategy<Value = InputFrame> {
    (-1i32..=1, any::<bool>(), prop::bool::weighted(0.1))
        .prop_map(|(intent, jump, fire)| InputFrame::new(intent, jump, fire))
}

fn check_actor_bounds(state: &SessionState, config: &GameConfig) -> Result<(), TestCaseError> {
    for actor in [&state.player, &state.opponent] {
        prop_assert!(actor.position.x >= 0);
        prop_assert!(actor.position.x <= config.max_actor_x());
        prop_assert!(actor.position.y <= config.ground_line());
        if actor.grounded {
            prop_assert_eq!(actor.position.y, config.ground_line());
            prop_assert_eq!(actor.velocity_y, 0);
        }
    }
    Ok(())
}

fn check_projectile_bounds(state: &SessionState, config: &GameConfig) -> Result<(), TestCaseError> {
    let size = config.projectile_size;
    for projectile in state.projectiles.iter() {
        let p = projectile.position;
        prop_assert!(p.x > -size && p.x < config.arena_width + size);
        prop_assert!(p.y > -size && p.y < config.arena_height + size);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Arena, projectile, score and countdown invariants hold on every tick.
    #[test]
    fn prop_session_invariants(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 1..600),
        jump_chance in 0.0f64..0.3,
    ) {
        let config = GameConfig {
            session_seconds: 8,
            opponent: arena_duel::config::OpponentConfig {
                jump_chance: (jump_chance * FIXED_ONE as f64) as Fixed,
                ..Default::default()
            },
            ..GameConfig::default()
        };
        let mut state = SessionState::new(&config, seed);
        let mut dice = RandSource(StdRng::seed_from_u64(seed));
        let mut scored = BTreeSet::new();
        let mut finished_events = 0;

        for frame in frames {
            let score_before = state.score;
            let seconds_before = state.seconds_remaining;

            let result = tick_with(&mut state, frame, &config, &mut dice);

            let mut expected_delta = 0;
            for event in &result.events {
                if let GameEventData::ActorHit { projectile_id, delta, .. } = event.data {
                    prop_assert!(delta == 1 || delta == -2);
                    prop_assert!(scored.insert(projectile_id), "projectile scored twice");
                    prop_assert!(state.projectiles.get(projectile_id).is_none());
                    expected_delta += delta;
                }
            }
            prop_assert_eq!(state.score - score_before, expected_delta);

            check_actor_bounds(&state, &config)?;
            check_projectile_bounds(&state, &config)?;

            if state.tick % 60 == 0 {
                let result = countdown(&mut state);
                finished_events += result
                    .events
                    .iter()
                    .filter(|e| matches!(e.data, GameEventData::SessionFinished { .. }))
                    .count();
            }
            prop_assert!(state.seconds_remaining <= seconds_before);
            prop_assert!(seconds_before - state.seconds_remaining <= 1);
        }

        prop_assert!(finished_events <= 1);
        prop_assert_eq!(finished_events == 1, state.is_finished());
    }

    /// Every commitment is followed by exactly one release, once the lock
    /// window has passed.
    #[test]
    fn prop_turning_pairs_with_release(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 200..900),
    ) {
        let config = GameConfig::default();
        let lock = config.turn_lock_ticks();
        let mut state = SessionState::new(&config, seed);
        let mut dice = RandSource(StdRng::seed_from_u64(seed ^ 0x5eed));

        let mut commits = 0u32;
        let mut releases = 0u32;
        let mut previous = state.ai.mode;

        for frame in frames {
            tick_with(&mut state, frame, &config, &mut dice);
            let now = state.tick;

            match (previous, state.ai.mode) {
                (AiMode::Approaching, AiMode::Turning { since }) => {
                    prop_assert_eq!(since, now);
                    commits += 1;
                }
                (AiMode::Turning { since }, AiMode::Approaching) => {
                    prop_assert_eq!(now - since, lock + 1);
                    releases += 1;
                }
                (AiMode::Turning { since: a }, AiMode::Turning { since: b }) => {
                    prop_assert_eq!(a, b);
                }
                _ => {}
            }
            previous = state.ai.mode;
        }

        prop_assert!(commits == releases || commits == releases + 1);
    }

    /// Splitting elapsed time into arbitrary steps runs the same ticks.
    #[test]
    fn prop_step_is_split_invariant(
        steps in prop::collection::vec(1u64..400, 1..40),
    ) {
        let config = GameConfig { session_seconds: 30, rng_seed: Some(3), ..GameConfig::default() };
        let mut split = GameClock::new(config.clone(), 3, |_score: i32| {});
        let mut whole = GameClock::new(config, 3, |_score: i32| {});

        let mut total = 0u64;
        for ms in &steps {
            split.step(Duration::from_millis(*ms));
            total += ms;
        }
        whole.step(Duration::from_millis(total));

        prop_assert_eq!(split.state().tick as u64, total * 60 / 1000);
        prop_assert_eq!(split.state().compute_hash(), whole.state().compute_hash());
    }
}
