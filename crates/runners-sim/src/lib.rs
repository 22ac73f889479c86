//! Runners simulation core -- platformer physics, collision and gameplay rules.
//!
//! This crate is the deterministic heart of the game: everything between
//! "input was read" and "the world is ready to draw". One call to
//! [`World::step`](world::World::step) is one tick:
//!
//! 1. Apply the [`InputFrame`](input::InputFrame) to the player.
//! 2. Integrate every body ([`physics::integrate`]).
//! 3. Resolve every body against static geometry
//!    ([`collision::resolve_axis_collisions`]).
//! 4. Run per-entity behavior (edge turning, revive timers, bounces).
//! 5. Evaluate pairwise interaction rules ([`interact`]).
//! 6. Report what happened as a [`TickReport`](events::TickReport).
//!
//! Rendering, audio and input wiring are external: they read the world
//! through shared references and react to [`LevelEvent`](events::LevelEvent)s.
//!
//! # Quick Start
//!
//! ```
//! use runners_sim::prelude::*;
//!
//! let level = LevelDescriptor::hybrid_1_1(432.0);
//! let mut world = World::new(level, SimParams::default(), Viewport::default(), 7).unwrap();
//!
//! let right = InputFrame { right: true, ..Default::default() };
//! for _ in 0..10 {
//!     let report = world.step(&right, 1.0);
//!     assert_eq!(report.outcome, LevelOutcome::Running);
//! }
//! assert!(world.player().body.rect.x > 120.0);
//! ```

#![deny(unsafe_code)]

pub mod collision;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod geometry;
pub mod input;
pub mod interact;
pub mod items;
pub mod level;
pub mod params;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod tiles;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced when constructing a level or world.
///
/// Nothing inside a tick can fail; malformed state is rejected here, at the
/// construction boundary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A rectangle had a non-finite coordinate or a non-positive size.
    #[error("malformed {what} rectangle: {details}")]
    MalformedRect { what: String, details: String },

    /// A velocity or other scalar was not finite.
    #[error("non-finite value in {what}")]
    NonFinite { what: String },

    /// The level has no ground to stand on.
    #[error("level has no ground segments")]
    NoGround,

    /// A bounds span was empty or inverted.
    #[error("invalid {what} bounds: min {min} must be less than max {max}")]
    InvalidBounds { what: &'static str, min: f64, max: f64 },

    /// A gameplay tunable was out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::collision::{resolve_axis_collisions, CollisionEvent, CollisionKind};
    pub use crate::enemy::{PatrolEnemy, RevivePolicy, ShellEnemy, ShellState};
    pub use crate::entity::{Actor, Body, Entity, EntityId, Facing};
    pub use crate::events::{DefeatCause, LevelEvent, LevelOutcome, TickReport};
    pub use crate::geometry::{intersects, Rect, Span, Vec2};
    pub use crate::input::InputFrame;
    pub use crate::items::{BlockContents, GoalTrigger, InteractiveBlock, PowerUp, PowerUpKind};
    pub use crate::level::{EnemySpawn, LevelDescriptor};
    pub use crate::params::{SimParams, Viewport};
    pub use crate::physics::{integrate, GRAVITY};
    pub use crate::player::{Form, Player};
    pub use crate::projectile::Projectile;
    pub use crate::tiles::{Solid, StaticGeometry, TileHit, TileId, TileKind, TileQuery};
    pub use crate::world::World;
    pub use crate::SimError;
}
