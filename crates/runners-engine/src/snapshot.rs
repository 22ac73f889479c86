//! Engine-level snapshot and restore with BLAKE3 hashing.
//!
//! An [`EngineSnapshot`] is the whole simulation state (the [`World`], which
//! carries its own seeded RNG, plus the loop's tick counter, step length and
//! held input) together with a BLAKE3 digest of that state. The digest makes
//! snapshots usable as determinism checkpoints and rejects corrupted ones on
//! restore.
//!
//! # Usage
//!
//! ```
//! use runners_engine::prelude::*;
//!
//! let world = World::new(
//!     LevelDescriptor::hybrid_1_1(432.0),
//!     SimParams::default(),
//!     Viewport::default(),
//!     3,
//! )
//! .unwrap();
//! let mut tick_loop = TickLoop::new(world, TickConfig::default());
//! tick_loop.run_ticks(10);
//!
//! let snapshot = tick_loop.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 10);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! tick_loop.run_ticks(10);
//! tick_loop.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(tick_loop.tick_count(), 10);
//! assert_eq!(tick_loop.state_hash(), snapshot.hash);
//! ```
//!
//! # What Is NOT Snapshotted
//!
//! - **Config** other than `fixed_dt`: pacing is the host's business.
//! - **Accumulator** and **journal**: reset on restore.
//! - **Diagnostics**: transient.

use runners_sim::input::InputFrame;
use runners_sim::world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tick::TickLoop;

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of the full simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Complete level state, RNG included.
    pub world: World,
    /// Steps executed at the time of capture.
    pub tick_counter: u64,
    /// Fixed step length in frame units.
    pub fixed_dt: f64,
    /// Input held at the time of capture.
    pub current_input: InputFrame,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest over the canonical JSON of the hashable state.
fn compute_hash(world: &World, tick_counter: u64, fixed_dt: f64, input: &InputFrame) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        world: &'a World,
        tick_counter: u64,
        fixed_dt: f64,
        current_input: &'a InputFrame,
    }

    let hashable = HashableState {
        world,
        tick_counter,
        fixed_dt,
        current_input: input,
    };

    let json_bytes = serde_json::to_vec(&hashable).expect("engine state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

impl EngineSnapshot {
    /// Whether the stored hash matches the snapshot's contents.
    pub fn verify(&self) -> bool {
        compute_hash(&self.world, self.tick_counter, self.fixed_dt, &self.current_input) == self.hash
    }
}

// ---------------------------------------------------------------------------
// TickLoop snapshot/restore methods
// ---------------------------------------------------------------------------

impl TickLoop {
    /// Capture the current simulation state and its hash.
    pub fn capture_snapshot(&self) -> EngineSnapshot {
        let world = self.world().clone();
        let tick_counter = self.tick_count();
        let fixed_dt = self.fixed_dt();
        let current_input = *self.current_input();
        let hash = compute_hash(&world, tick_counter, fixed_dt, &current_input);

        EngineSnapshot {
            world,
            tick_counter,
            fixed_dt,
            current_input,
            hash,
        }
    }

    /// Restore the simulation state from a snapshot.
    ///
    /// The snapshot's hash is recomputed first; on mismatch nothing is
    /// modified. Restoring also resets the frame accumulator and clears the
    /// event journal.
    ///
    /// # Errors
    ///
    /// Returns an error if `fixed_dt` is invalid or the hash does not match
    /// (corruption or tampering).
    pub fn restore_from_snapshot(&mut self, snapshot: &EngineSnapshot) -> Result<(), anyhow::Error> {
        if !(snapshot.fixed_dt > 0.0 && snapshot.fixed_dt.is_finite()) {
            warn!(fixed_dt = snapshot.fixed_dt, "rejected snapshot");
            return Err(anyhow::anyhow!(
                "snapshot has invalid fixed_dt: {}. Must be positive and finite.",
                snapshot.fixed_dt
            ));
        }

        let expected_hash = compute_hash(
            &snapshot.world,
            snapshot.tick_counter,
            snapshot.fixed_dt,
            &snapshot.current_input,
        );
        if expected_hash != snapshot.hash {
            warn!(recorded = %snapshot.hash, recomputed = %expected_hash, "rejected snapshot");
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected_hash
            ));
        }

        self.restore_state(
            snapshot.world.clone(),
            snapshot.tick_counter,
            snapshot.fixed_dt,
            snapshot.current_input,
        );
        debug!(tick = snapshot.tick_counter, "restored snapshot");
        Ok(())
    }

    /// The BLAKE3 state hash, without keeping a snapshot around.
    pub fn state_hash(&self) -> String {
        compute_hash(self.world(), self.tick_count(), self.fixed_dt(), self.current_input())
    }

    /// Same as [`capture_snapshot`](Self::capture_snapshot), named for
    /// branching workflows.
    pub fn fork_snapshot(&self) -> EngineSnapshot {
        self.capture_snapshot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
