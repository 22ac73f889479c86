//! What a tick reports back to the outside world.
//!
//! The core never calls into audio, HUD or scene code. Everything those
//! collaborators might react to is a [`LevelEvent`] in the tick's
//! [`TickReport`], in the order it happened.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::items::PowerUpKind;
use crate::player::Form;

/// How an enemy was taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatCause {
    Stomp,
    Shell,
    Fireball,
    /// Dropped below the kill plane.
    Fell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    /// The player landed on an enemy. Patrol enemies die; shell enemies retreat.
    EnemyStomped { enemy: EntityId },
    /// The player sent a shell sliding.
    ShellKicked { shell: EntityId },
    /// A fireball knocked a shell enemy back into its shell.
    ShellHit { shell: EntityId },
    /// A resting shell got back on its feet.
    ShellRevived { shell: EntityId },
    /// An enemy left play.
    EnemyDefeated { enemy: EntityId, by: DefeatCause },
    /// A question block was triggered.
    BlockHit { block: usize },
    CoinPopped { block: usize },
    PowerUpSpawned { id: EntityId, kind: PowerUpKind },
    PowerUpCollected { id: EntityId, kind: PowerUpKind, form: Form },
    /// The player lost a form.
    PlayerDamaged { form: Form },
    FireballThrown { id: EntityId },
    /// `combo` is the shell combo count that earned it.
    BonusLife { combo: u32 },
    /// The player touched the goal; the slide has started.
    GoalReached,
    /// The goal slide finished.
    LevelComplete,
    PlayerDied,
}

/// Whether the level is still being played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelOutcome {
    #[default]
    Running,
    Died,
    Completed,
}

impl LevelOutcome {
    pub fn is_finished(self) -> bool {
        self != LevelOutcome::Running
    }
}

/// Result of one [`World::step`](crate::world::World::step).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number this report belongs to (1 for the first step).
    pub tick: u64,
    pub events: Vec<LevelEvent>,
    pub outcome: LevelOutcome,
}

impl TickReport {
    /// Whether any event matches `pred`.
    pub fn has(&self, pred: impl Fn(&LevelEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&LevelEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
