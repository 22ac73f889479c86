//! Runners engine -- frame pacing, snapshots and deterministic replay for
//! the platformer simulation.
//!
//! This crate drives a [`runners_sim::world::World`]: the [`TickLoop`](tick::TickLoop)
//! turns wall-clock frames into clamped simulation steps, every step's
//! [`TickReport`](runners_sim::events::TickReport) lands in an
//! [`EventJournal`](journal::EventJournal), and the whole state can be
//! captured as a BLAKE3-hashed [`EngineSnapshot`](snapshot::EngineSnapshot)
//! or recorded into a replay log and verified later.
//!
//! # Quick Start
//!
//! ```
//! use runners_engine::prelude::*;
//!
//! let world = World::new(
//!     LevelDescriptor::hybrid_1_1(432.0),
//!     SimParams::default(),
//!     Viewport::default(),
//!     7,
//! )
//! .unwrap();
//! let mut tick_loop = TickLoop::new(world, TickConfig::default());
//!
//! tick_loop.set_input(InputFrame::right());
//! tick_loop.run_ticks(100);
//! assert_eq!(tick_loop.tick_count(), 100);
//! assert!(tick_loop.world().player().body.rect.x > 120.0);
//! ```

#![deny(unsafe_code)]

pub mod journal;
pub mod replay;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the simulation crate for convenience.
pub use runners_sim;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use runners_sim::prelude::*;

    pub use crate::journal::{EventJournal, JournalEntry, RunTotals};
    pub use crate::replay::{replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult};
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::tick::{frame_dt, StepMode, TickConfig, TickDiagnostics, TickLoop};
}
