//! Frame pacing and the tick loop that drives a [`World`].
//!
//! The host calls [`TickLoop::advance`] once per rendered frame with the
//! wall-clock milliseconds since the previous frame. The elapsed time is
//! clamped (a backgrounded tab must not produce one enormous step) and
//! converted to frame units, where `1.0` is one nominal 16 ms frame.
//! What happens next depends on [`StepMode`]:
//!
//! - [`StepMode::Fixed`] feeds an accumulator and runs whole steps of
//!   `fixed_dt`, at most `max_steps_per_frame` per frame. Replays and
//!   snapshots assume this mode.
//! - [`StepMode::Variable`] runs exactly one step with the clamped frame
//!   delta.
//!
//! [`TickLoop::tick`] bypasses the pacing and runs one fixed step; tests,
//! replays and headless runs use it directly.
//!
//! # Example
//!
//! ```
//! use runners_engine::prelude::*;
//!
//! let world = World::new(
//!     LevelDescriptor::hybrid_1_1(432.0),
//!     SimParams::default(),
//!     Viewport::default(),
//!     1,
//! )
//! .unwrap();
//! let mut tick_loop = TickLoop::new(world, TickConfig::default());
//!
//! tick_loop.set_input(InputFrame::right());
//! // 32 ms of wall-clock time is two fixed steps.
//! assert_eq!(tick_loop.advance(32.0), 2);
//! assert_eq!(tick_loop.tick_count(), 2);
//! ```

use std::time::{Duration, Instant};

use runners_sim::events::TickReport;
use runners_sim::input::InputFrame;
use runners_sim::world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::journal::EventJournal;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// How wall-clock frames turn into simulation steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// One step per frame, `dt` = clamped frame delta.
    Variable,
    /// Accumulate frame time and run whole `fixed_dt` steps.
    #[default]
    Fixed,
}

/// Configuration for the tick loop.
///
/// Time inside the simulation is measured in frames: gravity and speeds are
/// tuned per 16 ms frame, so `fixed_dt = 1.0` is one such frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    /// Length of one fixed step in frame units. Must be positive and finite.
    pub fixed_dt: f64,
    /// Wall-clock milliseconds in one frame unit.
    pub frame_ms: f64,
    /// Frame deltas above this are clamped.
    pub max_frame_ms: f64,
    pub step_mode: StepMode,
    /// Cap on fixed steps per [`TickLoop::advance`] call.
    pub max_steps_per_frame: u32,
    /// Rebuild the level as soon as it finishes (death or completion).
    pub auto_restart: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0,
            frame_ms: 16.0,
            max_frame_ms: 40.0,
            step_mode: StepMode::Fixed,
            max_steps_per_frame: 5,
            auto_restart: false,
        }
    }
}

/// Convert a wall-clock frame delta to frame units.
///
/// The delta is clamped to `[0, max_frame_ms]`; a non-finite delta counts as
/// no time at all.
pub fn frame_dt(elapsed_ms: f64, max_frame_ms: f64, frame_ms: f64) -> f64 {
    if !elapsed_ms.is_finite() {
        return 0.0;
    }
    elapsed_ms.clamp(0.0, max_frame_ms) / frame_ms
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last step.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Time inside [`World::step`].
    pub step_time: Duration,
    /// Total time for the tick (step + journal).
    pub total_time: Duration,
    /// Step length in frame units.
    pub dt: f64,
    /// Events the step produced.
    pub event_count: usize,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// Owns a [`World`] and steps it.
///
/// All randomness lives in the world's seeded generator, so given the same
/// world, the same config and the same input per tick, two loops produce
/// identical worlds.
pub struct TickLoop {
    world: World,
    config: TickConfig,
    /// Steps executed so far, across restarts.
    tick_counter: u64,
    /// Unspent frame time in [`StepMode::Fixed`].
    accumulator: f64,
    current_input: InputFrame,
    journal: EventJournal,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a new tick loop with the given world and configuration.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_dt` or `frame_ms` is not positive and finite, or if
    /// `max_frame_ms` is negative or not finite.
    pub fn new(world: World, config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        assert!(
            config.frame_ms > 0.0 && config.frame_ms.is_finite(),
            "frame_ms must be positive and finite, got {}",
            config.frame_ms
        );
        assert!(
            config.max_frame_ms >= 0.0 && config.max_frame_ms.is_finite(),
            "max_frame_ms must be non-negative and finite, got {}",
            config.max_frame_ms
        );
        Self {
            world,
            config,
            tick_counter: 0,
            accumulator: 0.0,
            current_input: InputFrame::default(),
            journal: EventJournal::new(),
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Run one fixed step with the current input.
    pub fn tick(&mut self) -> TickReport {
        self.step_with(self.config.fixed_dt)
    }

    /// Run `count` fixed steps. Returns the total number of events produced.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        let mut total_events = 0u64;
        for _ in 0..count {
            total_events += self.tick().events.len() as u64;
        }
        total_events
    }

    /// Account for one rendered frame that took `elapsed_ms` of wall-clock
    /// time. Returns the number of steps run.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        let dt = frame_dt(elapsed_ms, self.config.max_frame_ms, self.config.frame_ms);
        match self.config.step_mode {
            StepMode::Variable => {
                self.step_with(dt);
                1
            }
            StepMode::Fixed => {
                self.accumulator += dt;
                let mut steps = 0;
                while self.accumulator >= self.config.fixed_dt {
                    if steps == self.config.max_steps_per_frame {
                        debug!(
                            dropped = self.accumulator,
                            "step cap reached, dropping accumulated time"
                        );
                        self.accumulator = 0.0;
                        break;
                    }
                    self.tick();
                    self.accumulator -= self.config.fixed_dt;
                    steps += 1;
                }
                steps
            }
        }
    }

    fn step_with(&mut self, dt: f64) -> TickReport {
        let tick_start = Instant::now();

        let step_start = Instant::now();
        let report = self.world.step(&self.current_input, dt);
        let step_time = step_start.elapsed();

        self.tick_counter += 1;
        trace!(tick = self.tick_counter, dt, events = report.events.len(), "tick");
        self.journal.record(self.tick_counter, &report);

        if self.config.auto_restart && report.outcome.is_finished() {
            info!(tick = self.tick_counter, outcome = ?report.outcome, "restarting level");
            self.world.restart();
        }

        self.last_diagnostics = TickDiagnostics {
            step_time,
            total_time: tick_start.elapsed(),
            dt,
            event_count: report.events.len(),
        };
        report
    }

    // -- accessors ----------------------------------------------------------

    /// The number of steps executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in frame units, computed as `tick_count * fixed_dt`.
    ///
    /// Variable-mode steps count as one fixed step each.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Unspent frame time carried into the next [`advance`](Self::advance).
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Diagnostics from the last step.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// Set the controls held for the following steps.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }

    // -- restore helpers ----------------------------------------------------

    pub(crate) fn restore_state(&mut self, world: World, tick_counter: u64, fixed_dt: f64, input: InputFrame) {
        self.world = world;
        self.tick_counter = tick_counter;
        self.config.fixed_dt = fixed_dt;
        self.current_input = input;
        self.accumulator = 0.0;
        self.journal.clear();
        self.last_diagnostics = TickDiagnostics::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
