//! Rolling journal of recent tick reports plus whole-run totals.
//!
//! HUD, audio and debugging tools read what happened from here instead of
//! holding on to every [`TickReport`] themselves. Only the last
//! `max_history` ticks are kept; the [`RunTotals`] cover every tick recorded
//! since the journal was created or last cleared.

use std::collections::VecDeque;

use runners_sim::events::{LevelEvent, TickReport};
use serde::{Deserialize, Serialize};

/// Default number of ticks kept (one second of frames).
pub const DEFAULT_MAX_HISTORY: usize = 60;

/// A report stamped with the loop tick it was produced on.
///
/// The world's own tick restarts at zero when the level restarts; the loop
/// tick does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub tick: u64,
    pub report: TickReport,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub ticks: u64,
    pub events: u64,
    pub enemies_defeated: u64,
    pub coins: u64,
    pub power_ups_collected: u64,
    pub bonus_lives: u64,
    pub deaths: u64,
    pub completions: u64,
}

impl RunTotals {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.events += report.events.len() as u64;
        for event in &report.events {
            match event {
                LevelEvent::EnemyDefeated { .. } => self.enemies_defeated += 1,
                LevelEvent::CoinPopped { .. } => self.coins += 1,
                LevelEvent::PowerUpCollected { .. } => self.power_ups_collected += 1,
                LevelEvent::BonusLife { .. } => self.bonus_lives += 1,
                LevelEvent::PlayerDied => self.deaths += 1,
                LevelEvent::LevelComplete => self.completions += 1,
                _ => {}
            }
        }
    }
}

/// Bounded history of [`TickReport`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventJournal {
    history: VecDeque<JournalEntry>,
    max_history: usize,
    totals: RunTotals,
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl EventJournal {
    /// Journal keeping the last [`DEFAULT_MAX_HISTORY`] ticks.
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// Journal keeping the last `max_history` ticks. Zero keeps only totals.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
            totals: RunTotals::default(),
        }
    }

    /// Record the report produced on loop tick `tick`.
    pub fn record(&mut self, tick: u64, report: &TickReport) {
        self.totals.absorb(report);
        self.history.push_back(JournalEntry {
            tick,
            report: report.clone(),
        });
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Retained entries, oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> + ExactSizeIterator {
        self.history.iter()
    }

    pub fn latest(&self) -> Option<&JournalEntry> {
        self.history.back()
    }

    /// The report for loop tick `tick`, if still retained.
    pub fn report_at_tick(&self, tick: u64) -> Option<&TickReport> {
        // Ticks are recorded in increasing order.
        let front = self.history.front()?.tick;
        let index = usize::try_from(tick.checked_sub(front)?).ok()?;
        self.history
            .get(index)
            .filter(|entry| entry.tick == tick)
            .map(|entry| &entry.report)
    }

    /// Retained events from ticks after `tick`, in order.
    pub fn events_since(&self, tick: u64) -> impl Iterator<Item = (u64, &LevelEvent)> {
        self.history
            .iter()
            .filter(move |entry| entry.tick > tick)
            .flat_map(|entry| entry.report.events.iter().map(move |e| (entry.tick, e)))
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop the history and reset the totals.
    pub fn clear(&mut self) {
        self.history.clear();
        self.totals = RunTotals::default();
    }
}
