//! Deterministic replay with input recording and checkpoint verification.
//!
//! A [`ReplayRecorder`] captures the [`InputFrame`] held on each tick and a
//! BLAKE3 state hash every `checkpoint_interval` ticks, producing a
//! [`ReplayLog`]. [`replay`] restores the log's initial snapshot, feeds the
//! inputs back tick by tick and compares hashes at every checkpoint. The
//! first mismatch is reported as a [`ReplayDivergence`].
//!
//! Only non-empty inputs are stored; a tick with no entry replays with
//! [`InputFrame::NONE`].
//!
//! # Recording and replaying
//!
//! ```
//! use runners_engine::prelude::*;
//!
//! let world = World::new(
//!     LevelDescriptor::hybrid_1_1(432.0),
//!     SimParams::default(),
//!     Viewport::default(),
//!     42,
//! )
//! .unwrap();
//! let mut tick_loop = TickLoop::new(world, TickConfig::default());
//!
//! let mut recorder = ReplayRecorder::new(tick_loop.capture_snapshot(), 10);
//! for _ in 0..100 {
//!     recorder.record_and_tick(&mut tick_loop, InputFrame::right());
//! }
//! let log = recorder.finish();
//!
//! let result = replay(&mut tick_loop, &log).expect("log is well formed");
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::collections::BTreeMap;

use runners_sim::events::TickReport;
use runners_sim::input::InputFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::snapshot::EngineSnapshot;
use crate::tick::TickLoop;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A complete recording: starting state, length and per-tick entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    /// State the recording started from.
    pub initial_snapshot: EngineSnapshot,
    /// Number of ticks recorded.
    pub total_ticks: u64,
    /// Inputs and checkpoints, in recording order.
    pub entries: Vec<ReplayEntry>,
}

/// One entry in a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Input held during `tick`.
    Input { tick: u64, input: InputFrame },
    /// State hash just before `tick` ran, with its input already set.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every tick was replayed without divergence.
    pub completed: bool,
    pub ticks_replayed: u64,
    pub first_divergence: Option<ReplayDivergence>,
}

/// Where a replay first stopped matching its recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] tick by tick.
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`. A checkpoint is kept on every tick
    /// divisible by `checkpoint_interval`; `0` keeps every hash supplied.
    pub fn new(snapshot: EngineSnapshot, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    /// Record the input for `tick` and, if due, its state hash.
    ///
    /// `state_hash` must be taken after the input was set and before the
    /// tick ran.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previous one.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input { tick, input: *input });
        }

        if let Some(hash) = state_hash {
            let should_checkpoint = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
            if should_checkpoint {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    tick,
                    state_hash: hash,
                });
            }
        }
    }

    /// Set `input` on the loop, record it (hashing only when a checkpoint
    /// is due) and run the tick.
    pub fn record_and_tick(&mut self, tick_loop: &mut TickLoop, input: InputFrame) -> TickReport {
        let tick = tick_loop.tick_count();
        tick_loop.set_input(input);
        let due = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
        let hash = due.then(|| tick_loop.state_hash());
        self.record_tick(tick, &input, hash);
        tick_loop.tick()
    }

    /// Ticks recorded so far.
    pub fn ticks_recorded(&self) -> u64 {
        self.ticks_recorded
    }

    /// Finish recording.
    pub fn finish(mut self) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `tick_loop`, verifying every checkpoint.
///
/// The log is validated before the loop is touched. A divergence is not an
/// error: it is reported in the [`ReplayResult`] with the loop left at the
/// diverging tick.
///
/// # Errors
///
/// Returns an error for duplicate entries, a tick range that overflows, or
/// an initial snapshot that fails to restore.
pub fn replay(tick_loop: &mut TickLoop, log: &ReplayLog) -> Result<ReplayResult, anyhow::Error> {
    let mut input_map: BTreeMap<u64, InputFrame> = BTreeMap::new();
    let mut checkpoint_map: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if input_map.insert(*tick, *input).is_some() {
                    return Err(anyhow::anyhow!("replay log contains duplicate Input entry at tick {tick}"));
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoint_map.insert(*tick, state_hash).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Checkpoint entry at tick {tick}"
                    ));
                }
            }
        }
    }

    let start_tick = log.initial_snapshot.tick_counter;
    let total_ticks = log.total_ticks;
    if total_ticks == 0 {
        return Ok(ReplayResult {
            completed: true,
            ticks_replayed: 0,
            first_divergence: None,
        });
    }

    // Exclusive end.
    let end_tick = start_tick.checked_add(total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start_tick ({start_tick}) + total_ticks ({total_ticks}) exceeds u64::MAX"
        )
    })?;

    tick_loop
        .restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    let mut ticks_replayed: u64 = 0;
    for tick in start_tick..end_tick {
        tick_loop.set_input(input_map.get(&tick).copied().unwrap_or_default());

        if let Some(&expected_hash) = checkpoint_map.get(&tick) {
            let actual_hash = tick_loop.state_hash();
            if actual_hash != expected_hash {
                warn!(tick, expected = expected_hash, actual = %actual_hash, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected_hash.to_owned(),
                        actual_hash,
                    }),
                });
            }
        }

        tick_loop.tick();
        ticks_replayed += 1;
    }

    debug!(ticks_replayed, checkpoints = checkpoint_map.len(), "replay completed");
    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
