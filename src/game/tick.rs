//! Authoritative Simulation Tick
//!
//! The core game loop. Must be 100% deterministic: given the same seed,
//! config and input record, a session replays to the same state hash.

use crate::config::GameConfig;
use crate::core::fixed::FIXED_ONE;
use crate::core::rng::RandomSource;
use crate::core::vec2::FixedVec2;
use crate::game::ai::AiController;
use crate::game::collision::resolve_hits;
use crate::game::events::{GameEvent, RetireReason};
use crate::game::input::{InputFrame, InputRecorder};
use crate::game::kinematics::{advance, MotionProfile};
use crate::game::state::{Combatant, SessionPhase, SessionState};

/// Result of a tick or countdown step.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated, sorted by tick then priority
    pub events: Vec<GameEvent>,
    /// Whether the session is finished after this step
    pub session_finished: bool,
}

/// Run one simulation tick using the session's own RNG.
pub fn tick(state: &mut SessionState, frame: InputFrame, config: &GameConfig) -> TickResult {
    let mut rng = std::mem::take(&mut state.rng);
    let result = tick_with(state, frame, config, &mut rng);
    state.rng = rng;
    result
}

/// Run one simulation tick with an explicit random source.
///
/// Order: player kinematics, opponent decision and kinematics, projectile
/// flight, then collision. A finished session is frozen and returns at once.
pub fn tick_with<R: RandomSource + ?Sized>(
    state: &mut SessionState,
    frame: InputFrame,
    config: &GameConfig,
    rng: &mut R,
) -> TickResult {
    let mut result = TickResult::default();

    if state.is_finished() {
        result.session_finished = true;
        return result;
    }

    // 0. Advance tick counter
    state.tick = state.tick.wrapping_add(1);
    let now = state.tick;

    // 1. Player
    apply_player_input(state, frame, config);

    // 2. Opponent
    update_opponent(state, config, rng);

    // 3. Projectile flight
    for id in state.projectiles.advance(FIXED_ONE) {
        state.push_event(GameEvent::projectile_retired(now, id, RetireReason::OutOfBounds));
    }

    // 4. Hits
    resolve_hits(state);

    result.events = state.take_events();
    result.events.sort_by_key(GameEvent::order_key);
    result
}

/// Apply the player's frame: fire from the current position, then move.
fn apply_player_input(state: &mut SessionState, frame: InputFrame, config: &GameConfig) {
    let now = state.tick;

    if frame.fire {
        fire(state, Combatant::Player);
    }

    let jumped = advance(
        &mut state.player,
        frame.intent as i32,
        frame.jump,
        FIXED_ONE,
        config,
        MotionProfile::player(config),
    );
    if jumped {
        state.push_event(GameEvent::actor_jumped(now, Combatant::Player));
    }
}

/// Run the opponent state machine and apply its decision.
fn update_opponent<R: RandomSource + ?Sized>(state: &mut SessionState, config: &GameConfig, rng: &mut R) {
    let now = state.tick;
    let controller = AiController::from_config(config);

    let decision = controller.update(&mut state.ai, &mut state.opponent, &state.player, now, rng);
    if let Some(facing) = decision.turned {
        state.push_event(GameEvent::opponent_turned(now, facing));
    }

    // Shots leave from the height the opponent had before this tick's
    // vertical step
    let launch_y = state.opponent.position.y;

    let jumped = advance(
        &mut state.opponent,
        decision.intent,
        decision.jump,
        FIXED_ONE,
        config,
        MotionProfile::opponent(config),
    );
    if jumped {
        state.push_event(GameEvent::actor_jumped(now, Combatant::Opponent));
    }

    if decision.fire {
        let half = state.opponent.size >> 1;
        let origin = FixedVec2::new(state.opponent.center_x(), launch_y + half);
        fire_from(state, Combatant::Opponent, origin);
    }
}

/// Spawn a projectile from an actor's centre in its facing direction.
fn fire(state: &mut SessionState, owner: Combatant) {
    let origin = state.actor(owner).center();
    fire_from(state, owner, origin);
}

fn fire_from(state: &mut SessionState, owner: Combatant, origin: FixedVec2) {
    let direction = state.actor(owner).facing.direction();
    let id = state.projectiles.spawn(origin, direction, owner, state.tick);
    state.push_event(GameEvent::projectile_fired(state.tick, id, owner, origin));
}

/// Decrement the countdown by one second.
///
/// Reaching zero finishes the session exactly once; later calls are no-ops.
pub fn countdown(state: &mut SessionState) -> TickResult {
    let mut result = TickResult::default();

    if state.is_finished() {
        result.session_finished = true;
        return result;
    }

    state.seconds_remaining = state.seconds_remaining.saturating_sub(1);
    if state.seconds_remaining == 0 {
        state.phase = SessionPhase::Finished;
        state.push_event(GameEvent::session_finished(state.tick, state.score));
        result.session_finished = true;
    }

    result.events = state.take_events();
    result
}

/// Replay a session from its input record.
///
/// Countdown decrements are re-applied at the tick counts where they
/// originally happened, so the replay matches however the two timers
/// interleaved live.
pub fn replay_session(config: &GameConfig, recorder: &InputRecorder) -> (SessionState, Vec<GameEvent>) {
    let mut state = SessionState::new(config, recorder.rng_seed);
    let mut all_events = Vec::new();
    let mut countdowns = recorder.countdowns().iter().copied().peekable();

    loop {
        while countdowns.next_if_eq(&state.tick).is_some() {
            all_events.extend(countdown(&mut state).events);
        }

        if state.is_finished() || state.tick >= recorder.ticks() {
            break;
        }

        let frame = recorder.get_input_at(state.tick);
        all_events.extend(tick(&mut state, frame, config).events);
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================
