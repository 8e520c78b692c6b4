//! End-to-end duel scenarios driven through the public tick API.

use arena_duel::core::fixed::{from_int, Fixed};
use arena_duel::core::vec2::FixedVec2;
use arena_duel::game::ai::AiMode;
use arena_duel::game::events::{GameEventData, RetireReason};
use arena_duel::game::state::{Combatant, Facing, SessionPhase};
use arena_duel::game::tick::{countdown, tick_with, TickResult};
use arena_duel::{GameConfig, InputFrame, RandomSource, SessionState};

/// Opponent never jumps.
struct NeverJump;

impl RandomSource for NeverJump {
    fn chance(&mut self, _probability: Fixed) -> bool {
        false
    }
}

fn duel(player_x: i32, opponent_x: i32) -> (GameConfig, SessionState) {
    let config = GameConfig {
        player_spawn_x: from_int(player_x),
        opponent_spawn_x: from_int(opponent_x),
        ..GameConfig::default()
    };
    let state = SessionState::new(&config, 7);
    (config, state)
}

fn run_idle(state: &mut SessionState, config: &GameConfig, ticks: u32) -> Vec<TickResult> {
    (0..ticks)
        .map(|_| tick_with(state, InputFrame::IDLE, config, &mut NeverJump))
        .collect()
}

#[test]
fn test_player_shot_scores_on_opponent() {
    let (config, mut state) = duel(100, 500);

    let first = tick_with(&mut state, InputFrame::new(0, false, true), &config, &mut NeverJump);
    let fired = first
        .events
        .iter()
        .find_map(|e| match e.data {
            GameEventData::ProjectileFired { projectile_id, owner: Combatant::Player, .. } => Some(projectile_id),
            _ => None,
        })
        .expect("player shot");

    let mut hit_tick = None;
    for result in run_idle(&mut state, &config, 49) {
        for event in &result.events {
            if let GameEventData::ActorHit { target, projectile_id, delta, new_score } = event.data {
                assert_eq!(target, Combatant::Opponent);
                assert_eq!(projectile_id, fired);
                assert_eq!((delta, new_score), (1, 1));
                hit_tick = Some(event.tick);
            }
        }
    }

    assert_eq!(hit_tick, Some(38));
    assert_eq!(state.score, 1);
    assert!(state.projectiles.get(fired).is_none());
    // Opponent's own shot (tick 31) is still in flight
    assert_eq!(state.projectiles.len(), 1);
}

#[test]
fn test_session_ends_after_twenty_countdowns() {
    let (config, mut state) = duel(100, 650);

    let mut finished = Vec::new();
    for _ in 0..20 {
        let result = countdown(&mut state);
        finished.extend(result.events.into_iter().filter_map(|e| match e.data {
            GameEventData::SessionFinished { final_score } => Some(final_score),
            _ => None,
        }));
    }

    assert_eq!(state.seconds_remaining, 0);
    assert_eq!(state.phase, SessionPhase::Finished);
    assert_eq!(finished, vec![0]);

    // Further steps are no-ops
    let after = countdown(&mut state);
    assert!(after.session_finished);
    assert!(after.events.is_empty());
    let frozen = tick_with(&mut state, InputFrame::new(1, true, true), &config, &mut NeverJump);
    assert!(frozen.session_finished);
    assert_eq!(state.tick, 0);
}

#[test]
fn test_opponent_holds_within_proximity() {
    let (config, mut state) = duel(380, 400);

    run_idle(&mut state, &config, 10);

    assert_eq!(state.opponent.position.x, from_int(400));
    assert_eq!(state.opponent.facing, Facing::Left);
    assert_eq!(state.ai.mode, AiMode::Approaching);
}

#[test]
fn test_projectile_retires_past_right_edge() {
    let (config, mut state) = duel(100, 650);
    let id = state
        .projectiles
        .spawn(FixedVec2::from_ints(799, 100), FixedVec2::RIGHT, Combatant::Player, 0);

    let first = tick_with(&mut state, InputFrame::IDLE, &config, &mut NeverJump);
    assert_eq!(state.projectiles.get(id).map(|p| p.position.x), Some(from_int(807)));
    assert!(first.events.iter().all(|e| !matches!(e.data, GameEventData::ProjectileRetired { .. })));

    let second = tick_with(&mut state, InputFrame::IDLE, &config, &mut NeverJump);
    assert!(state.projectiles.get(id).is_none());
    assert!(second.events.iter().any(|e| e.data
        == GameEventData::ProjectileRetired { projectile_id: id, reason: RetireReason::OutOfBounds }));
}

#[test]
fn test_opponent_turn_locks_movement() {
    // Player starts to the right of an opponent facing left
    let (config, mut state) = duel(600, 200);

    let mut turned_at = Vec::new();
    let mut xs = Vec::new();
    for _ in 0..70 {
        let result = tick_with(&mut state, InputFrame::IDLE, &config, &mut NeverJump);
        turned_at.extend(result.events.iter().filter_map(|e| match e.data {
            GameEventData::OpponentTurned { facing } => Some((e.tick, facing)),
            _ => None,
        }));
        xs.push(state.opponent.position.x);
    }

    // Hysteresis window has to pass before the first commitment
    assert_eq!(turned_at, vec![(61, Facing::Right)]);

    // xs[n] is the position after tick n + 1. Frozen for ticks 61..=67.
    for t in 61..=67 {
        assert_eq!(xs[t - 1], xs[59], "moved during lock at tick {}", t);
    }
    assert_eq!(xs[67], xs[59] + from_int(2));
    assert_eq!(state.ai.mode, AiMode::Approaching);
}
