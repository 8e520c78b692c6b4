//! Arena Duel Demo
//!
//! Runs one real-time session with a scripted player, settles the final
//! score to the log, then replays the session from its input record to
//! verify determinism.
//!
//! Usage: `arena-duel [config.json]`

use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arena_duel::{
    VERSION, GameConfig, Settlement, format_score, spawn_session,
    game::tick::replay_session,
    runtime::{InputListener, RuntimeError},
};

/// Settlement that reports the score to the log.
struct LogSettlement;

impl Settlement for LogSettlement {
    fn settle(&mut self, final_score: i32) {
        info!("Settling final score {} ({})", final_score, format_score(final_score));
    }
}

/// One step of the scripted player: wait, then press or release a key.
enum Step {
    Down(&'static str),
    Up(&'static str),
    Wait(u64),
}

/// Walk right, shoot, hop, back off and shoot again. Loops until the
/// session stops listening.
const SCRIPT: &[Step] = &[
    Step::Down("d"),
    Step::Wait(600),
    Step::Up("d"),
    Step::Down(" "),
    Step::Up(" "),
    Step::Wait(250),
    Step::Down(" "),
    Step::Up(" "),
    Step::Down("w"),
    Step::Wait(120),
    Step::Up("w"),
    Step::Down("a"),
    Step::Wait(400),
    Step::Up("a"),
    Step::Down(" "),
    Step::Up(" "),
    Step::Wait(300),
];

async fn run_script(input: InputListener) -> Result<(), RuntimeError> {
    loop {
        for step in SCRIPT {
            match step {
                Step::Down(key) => input.key_down(*key)?,
                Step::Up(key) => input.key_up(*key)?,
                Step::Wait(ms) => tokio::time::sleep(Duration::from_millis(*ms)).await,
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Arena Duel v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => GameConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    info!("Tick Rate: {} Hz", config.tick_rate);
    info!("Session Length: {} seconds", config.session_seconds);

    // Run the live session
    let handle = spawn_session(config.clone(), LogSettlement);
    let feeder = tokio::spawn(run_script(handle.input()));

    let mut snapshots = handle.snapshots();
    let reporter = tokio::spawn(async move {
        let mut last_second = None;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if last_second != Some(snapshot.seconds_remaining) {
                last_second = Some(snapshot.seconds_remaining);
                info!(
                    "{}s left, score {}, {} projectiles",
                    snapshot.seconds_remaining,
                    format_score(snapshot.score),
                    snapshot.projectiles.len()
                );
            }
        }
    });

    let summary = handle.join().await?;

    // Feeder ends with InputClosed once the session stops listening
    if let Ok(Err(e)) = feeder.await {
        info!("Scripted input stopped: {}", e);
    }
    reporter.await?;

    info!("=== Session Results ===");
    info!("Session: {}", summary.session_uuid());
    info!("Final Score: {}", format_score(summary.final_score));
    info!("Ticks: {}", summary.ticks_run);
    info!(
        "Duration: {} ms",
        (summary.finished_at - summary.started_at).num_milliseconds()
    );
    info!("Final State Hash: {}", summary.final_hash);
    info!("Input deltas recorded: {}", summary.recorder.delta_count());

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, events) = replay_session(&config, &summary.recorder);
    let replay_hash = hex::encode(replayed.compute_hash());
    info!("Replay State Hash: {} ({} events)", replay_hash, events.len());

    if replay_hash != summary.final_hash {
        warn!("DETERMINISM FAILURE: Hashes differ!");
        bail!("replay diverged from live session");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");

    Ok(())
}
