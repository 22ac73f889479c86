//! Entity identifiers, the shared physical [`Body`], and the closed set of
//! non-player entity variants.
//!
//! The player is not part of [`Entity`]: a level has exactly one player, so
//! [`World`](crate::world::World) holds it in a dedicated field. Every other
//! dynamic thing in a level is an [`Actor`]: a stable [`EntityId`] plus one
//! [`Entity`] variant.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enemy::{PatrolEnemy, ShellEnemy};
use crate::geometry::{Rect, Vec2};
use crate::items::PowerUp;
use crate::projectile::Projectile;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A stable identifier for an entity within one level run.
///
/// Ids are handed out sequentially and never reused while the level is
/// alive, so an id seen in a [`LevelEvent`](crate::events::LevelEvent) always
/// refers to the same entity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// The id reserved for the player.
    pub const PLAYER: EntityId = EntityId(0);

    /// Construct an id from its raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out [`EntityId`]s. Index 0 is reserved for the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Facing
// ---------------------------------------------------------------------------

/// Horizontal direction an entity faces or moves toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Direction of travel for a horizontal velocity. Zero counts as right.
    pub fn of_velocity(vx: f64) -> Facing {
        if vx < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The physical state every simulated entity shares: an AABB, a velocity,
/// an optional per-entity gravity, and the ground contact flag maintained by
/// the collision resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Position (top-left) and size.
    pub rect: Rect,
    /// Velocity in world units per tick.
    pub vel: Vec2,
    /// Per-entity gravity override. `None` uses the world default.
    pub gravity: Option<f64>,
    /// Set by the resolver's vertical pass.
    pub on_ground: bool,
}

impl Body {
    /// A body at rest with the default gravity.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
            gravity: None,
            on_ground: false,
        }
    }

    /// Builder-style velocity setter.
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    /// Builder-style gravity override.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Whether position, size and velocity are all finite and the size positive.
    pub fn is_well_formed(&self) -> bool {
        self.rect.is_well_formed()
            && self.vel.x.is_finite()
            && self.vel.y.is_finite()
            && self.gravity.map_or(true, f64::is_finite)
    }
}

// ---------------------------------------------------------------------------
// Entity / Actor
// ---------------------------------------------------------------------------

/// Every non-player entity variant a level can contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// Ground-patrol enemy (goomba-like).
    Patrol(PatrolEnemy),
    /// Shell-capable enemy (koopa-like).
    Shell(ShellEnemy),
    /// Player fireball.
    Projectile(Projectile),
    /// Collectible spawned by a block.
    PowerUp(PowerUp),
}

impl Entity {
    /// Shared read access to the physical body.
    pub fn body(&self) -> &Body {
        match self {
            Entity::Patrol(e) => &e.body,
            Entity::Shell(e) => &e.body,
            Entity::Projectile(p) => &p.body,
            Entity::PowerUp(p) => &p.body,
        }
    }

    /// Mutable access to the physical body.
    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Entity::Patrol(e) => &mut e.body,
            Entity::Shell(e) => &mut e.body,
            Entity::Projectile(p) => &mut p.body,
            Entity::PowerUp(p) => &mut p.body,
        }
    }

    /// Whether this entity is an enemy that can still interact.
    pub fn is_live_enemy(&self) -> bool {
        match self {
            Entity::Patrol(e) => e.alive,
            Entity::Shell(s) => s.is_in_play(),
            _ => false,
        }
    }

    /// Whether the entity should be dropped at the end of the tick.
    pub fn is_spent(&self) -> bool {
        match self {
            Entity::Patrol(e) => !e.alive,
            Entity::Shell(s) => !s.is_in_play(),
            Entity::Projectile(p) => p.hit,
            Entity::PowerUp(p) => p.collected,
        }
    }

    /// Take the entity out of play so the end-of-tick sweep drops it.
    /// Returns `true` if it was a live enemy.
    pub fn remove_from_play(&mut self) -> bool {
        let was_live_enemy = self.is_live_enemy();
        match self {
            Entity::Patrol(e) => e.defeat(),
            Entity::Shell(s) => s.defeat(),
            Entity::Projectile(p) => p.hit = true,
            Entity::PowerUp(p) => p.collected = true,
        }
        was_live_enemy
    }

    /// Short type name for logs and render lookups.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Patrol(_) => "patrol",
            Entity::Shell(_) => "shell",
            Entity::Projectile(_) => "projectile",
            Entity::PowerUp(_) => "powerup",
        }
    }
}

/// A non-player entity with its stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub entity: Entity,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
