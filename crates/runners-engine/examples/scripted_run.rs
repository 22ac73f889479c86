//! Headless run of the hybrid 1-1 level from a scripted input tape.
//!
//! The run is recorded, then replayed against its own checkpoints.
//!
//! Run with:
//!   cargo run --example scripted_run -p runners-engine
//!
//! Set `RUST_LOG=runners_sim=debug` to see every stomp, kick and block hit.

use runners_engine::prelude::*;

/// Ground surface height of the hybrid 1-1 level.
const GROUND_Y: f64 = 432.0;
/// Wall-clock milliseconds per simulated frame.
const FRAME_MS: f64 = 16.0;

// ---------------------------------------------------------------------------
// Input tape
// ---------------------------------------------------------------------------

/// `(frames, input)` segments, played in order and then repeated.
fn tape() -> Vec<(u32, InputFrame)> {
    let run = InputFrame::right();
    let run_jump = InputFrame {
        right: true,
        jump: true,
        ..Default::default()
    };
    let run_fire = InputFrame {
        right: true,
        fire: true,
        ..Default::default()
    };
    vec![(40, run), (12, run_jump), (20, run), (2, run_fire), (18, run_jump), (30, run)]
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let world = World::new(
        LevelDescriptor::hybrid_1_1(GROUND_Y),
        SimParams::default(),
        Viewport::default(),
        2024,
    )?;
    let config = TickConfig {
        frame_ms: FRAME_MS,
        ..Default::default()
    };
    let mut tick_loop = TickLoop::new(world, config);
    let mut recorder = ReplayRecorder::new(tick_loop.capture_snapshot(), 60);

    let mut outcome = LevelOutcome::Running;
    'tape: for _ in 0..20 {
        for (frames, input) in tape() {
            for _ in 0..frames {
                let report = recorder.record_and_tick(&mut tick_loop, input);
                outcome = report.outcome;
                if outcome.is_finished() {
                    break 'tape;
                }
            }
        }
    }

    let totals = *tick_loop.journal().totals();
    let player = tick_loop.world().player();
    println!("outcome:          {outcome:?} after {} ticks", tick_loop.tick_count());
    println!(
        "player:           {:?} at ({:.1}, {:.1})",
        player.form, player.body.rect.x, player.body.rect.y
    );
    println!("enemies defeated: {}", totals.enemies_defeated);
    println!("coins:            {}", totals.coins);
    println!("power-ups:        {}", totals.power_ups_collected);
    println!("bonus lives:      {}", totals.bonus_lives);
    println!("final hash:       {}", tick_loop.state_hash());

    let log = recorder.finish();
    let result = replay(&mut tick_loop, &log)?;
    match result.first_divergence {
        None => println!("replay:           {} ticks verified", result.ticks_replayed),
        Some(divergence) => {
            return Err(anyhow::anyhow!(
                "replay diverged at tick {}: expected {}, got {}",
                divergence.tick,
                divergence.expected_hash,
                divergence.actual_hash
            ))
        }
    }
    Ok(())
}
