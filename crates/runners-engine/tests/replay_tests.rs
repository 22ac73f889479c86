//! Integration tests for the deterministic replay system.
//!
//! These tests validate recording, replaying, checkpoint verification,
//! divergence detection, and JSON serialization of [`ReplayLog`].

use runners_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hybrid_loop(seed: u64) -> TickLoop {
    let world = World::new(
        LevelDescriptor::hybrid_1_1(432.0),
        SimParams::default(),
        Viewport::default(),
        seed,
    )
    .unwrap();
    TickLoop::new(world, TickConfig::default())
}

/// Run-and-jump pattern that reaches the first enemies and blocks.
fn scripted_input(tick: u64) -> InputFrame {
    InputFrame {
        right: tick % 90 < 80,
        left: tick % 90 >= 85,
        jump: tick % 45 < 14,
        fire: tick % 30 == 0,
    }
}

fn record(tick_loop: &mut TickLoop, ticks: u64, interval: u64) -> ReplayLog {
    let mut recorder = ReplayRecorder::new(tick_loop.capture_snapshot(), interval);
    for _ in 0..ticks {
        let input = scripted_input(tick_loop.tick_count());
        recorder.record_and_tick(tick_loop, input);
    }
    recorder.finish()
}

// ---------------------------------------------------------------------------
// Record and replay
// ---------------------------------------------------------------------------

#[test]
fn recorded_run_replays_with_matching_checkpoints() {
    let mut tick_loop = hybrid_loop(42);
    let log = record(&mut tick_loop, 600, 30);
    let final_hash = tick_loop.state_hash();

    let mut fresh = hybrid_loop(7);
    let result = replay(&mut fresh, &log).unwrap();
    assert!(result.completed);
    assert_eq!(result.ticks_replayed, 600);
    assert!(result.first_divergence.is_none());
    assert_eq!(fresh.state_hash(), final_hash);
}

#[test]
fn replay_from_a_mid_run_snapshot() {
    let mut tick_loop = hybrid_loop(3);
    for _ in 0..120 {
        let input = scripted_input(tick_loop.tick_count());
        tick_loop.set_input(input);
        tick_loop.tick();
    }
    let log = record(&mut tick_loop, 200, 25);
    assert_eq!(log.initial_snapshot.tick_counter, 120);

    let expected = tick_loop.state_hash();
    let result = replay(&mut tick_loop, &log).unwrap();
    assert!(result.completed);
    assert_eq!(tick_loop.tick_count(), 320);
    assert_eq!(tick_loop.state_hash(), expected);
}

#[test]
fn replay_log_serializable_to_json() {
    let mut tick_loop = hybrid_loop(11);
    let log = record(&mut tick_loop, 150, 50);

    let json = serde_json::to_string(&log).unwrap();
    let parsed: ReplayLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.total_ticks, 150);
    assert_eq!(parsed.entries, log.entries);

    let result = replay(&mut hybrid_loop(0), &parsed).unwrap();
    assert!(result.completed);
}

#[test]
fn checkpoint_interval_respected() {
    let mut tick_loop = hybrid_loop(1);
    let log = record(&mut tick_loop, 100, 25);
    let ticks: Vec<u64> = log
        .entries
        .iter()
        .filter_map(|e| match e {
            ReplayEntry::Checkpoint { tick, .. } => Some(*tick),
            ReplayEntry::Input { .. } => None,
        })
        .collect();
    assert_eq!(ticks, vec![0, 25, 50, 75]);
}

// ---------------------------------------------------------------------------
// Divergence
// ---------------------------------------------------------------------------

#[test]
fn edited_input_is_detected_at_the_next_checkpoint() {
    let mut tick_loop = hybrid_loop(5);
    let mut log = record(&mut tick_loop, 100, 10);

    // Swap the held direction on tick 12.
    for entry in &mut log.entries {
        if let ReplayEntry::Input { tick: 12, input } = entry {
            input.right = false;
            input.left = true;
        }
    }

    let result = replay(&mut hybrid_loop(5), &log).unwrap();
    assert!(!result.completed);
    let divergence = result.first_divergence.expect("divergence reported");
    assert_eq!(divergence.tick, 20);
    assert_eq!(result.ticks_replayed, 20);
    assert_ne!(divergence.expected_hash, divergence.actual_hash);
}

#[test]
fn shell_revive_rolls_replay_exactly() {
    let params = SimParams {
        revive: RevivePolicy::Chance {
            min_ticks: 0.0,
            per_tick: 0.5,
        },
        ..Default::default()
    };
    let world = World::new(LevelDescriptor::flat(432.0, 2000.0), params, Viewport::default(), 1).unwrap();
    let mut tick_loop = TickLoop::new(world, TickConfig::default());
    for x in [600.0, 900.0, 1200.0] {
        let mut shell = ShellEnemy::spawn(x, 384.0, 0.0);
        shell.state = ShellState::Shelled;
        tick_loop.world_mut().spawn(Entity::Shell(shell));
    }

    let log = record(&mut tick_loop, 200, 20);
    let expected = tick_loop.state_hash();

    // Replaying on a loop built from another seed: the RNG state travels
    // with the snapshot.
    let other = World::new(
        LevelDescriptor::flat(432.0, 2000.0),
        SimParams::default(),
        Viewport::default(),
        99,
    )
    .unwrap();
    let mut other = TickLoop::new(other, TickConfig::default());
    let result = replay(&mut other, &log).unwrap();
    assert!(result.completed);
    assert_eq!(other.state_hash(), expected);
}

// ---------------------------------------------------------------------------
// Malformed logs
// ---------------------------------------------------------------------------

#[test]
fn replay_rejects_duplicate_input_entries() {
    let mut tick_loop = hybrid_loop(2);
    let mut log = record(&mut tick_loop, 10, 5);
    log.entries.push(ReplayEntry::Input {
        tick: 3,
        input: InputFrame::right(),
    });
    log.entries.push(ReplayEntry::Input {
        tick: 3,
        input: InputFrame::left(),
    });

    let before = tick_loop.state_hash();
    let err = replay(&mut tick_loop, &log).unwrap_err();
    assert!(err.to_string().contains("duplicate Input"));
    assert_eq!(tick_loop.state_hash(), before, "loop untouched");
}

#[test]
fn replay_rejects_duplicate_checkpoint_entries() {
    let mut tick_loop = hybrid_loop(2);
    let mut log = record(&mut tick_loop, 10, 5);
    log.entries.push(ReplayEntry::Checkpoint {
        tick: 5,
        state_hash: "00".repeat(32),
    });
    let err = replay(&mut tick_loop, &log).unwrap_err();
    assert!(err.to_string().contains("duplicate Checkpoint"));
}

#[test]
fn replay_rejects_tampered_initial_snapshot() {
    let mut tick_loop = hybrid_loop(2);
    let mut log = record(&mut tick_loop, 10, 5);
    log.initial_snapshot.world.player_mut().form = Form::Fire;

    let err = replay(&mut tick_loop, &log).unwrap_err();
    assert!(err.to_string().contains("failed to restore initial snapshot"));
}

#[test]
fn replay_rejects_tick_range_overflow() {
    let mut tick_loop = hybrid_loop(2);
    let mut log = record(&mut tick_loop, 10, 5);
    log.initial_snapshot.tick_counter = u64::MAX - 2;
    let err = replay(&mut tick_loop, &log).unwrap_err();
    assert!(err.to_string().contains("overflow"));
}
