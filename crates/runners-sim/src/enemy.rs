//! Enemy state machines: the ground patrol and the shell-capable walker.
//!
//! Both enemies run their per-state behavior *after* the collision resolver
//! has moved them, using the resolver's [`CollisionEvent`]s to react to walls.
//! Interactions with the player and with each other live in
//! [`interact`](crate::interact).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::{ground_ahead, CollisionEvent, CollisionKind};
use crate::entity::{Body, Facing};
use crate::geometry::{Rect, Span};
use crate::params::SimParams;
use crate::tiles::TileQuery;
use crate::SimError;

pub const PATROL_SIZE: (f64, f64) = (40.0, 40.0);
pub const SHELL_SIZE: (f64, f64) = (40.0, 48.0);

/// Horizontal velocity a wall hit should leave behind, if any.
///
/// The resolver zeroes `vx` on a side hit; the pre-hit speed is in the event.
fn wall_bounce(collisions: &[CollisionEvent]) -> Option<f64> {
    collisions.iter().find_map(|event| match event.kind {
        CollisionKind::Blocked(_) => Some(-event.impact_speed),
        _ => None,
    })
}

/// Turn `body` back inside `span` if it has walked past either end.
///
/// Only flips when moving outward, so a body sitting past the edge does not
/// jitter back and forth. Returns whether it turned.
fn turn_at(body: &mut Body, span: Span) -> bool {
    if body.rect.x < span.min && body.vel.x < 0.0 {
        body.vel.x = -body.vel.x;
        true
    } else if body.rect.x > span.max && body.vel.x > 0.0 {
        body.vel.x = -body.vel.x;
        true
    } else {
        false
    }
}

/// Reverse `body` when its edges leave the world span. Returns whether it turned.
fn bounce_off_edges(body: &mut Body, world: Span) -> bool {
    let outward = (body.rect.left() < world.min && body.vel.x < 0.0)
        || (body.rect.right() > world.max && body.vel.x > 0.0);
    if outward {
        body.vel.x = -body.vel.x;
    }
    outward
}

// ---------------------------------------------------------------------------
// PatrolEnemy
// ---------------------------------------------------------------------------

/// A walker that dies to a single stomp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolEnemy {
    pub body: Body,
    pub alive: bool,
}

impl PatrolEnemy {
    pub fn spawn(x: f64, y: f64, vx: f64) -> Self {
        let (w, h) = PATROL_SIZE;
        Self {
            body: Body::new(Rect::new(x, y, w, h)).with_velocity(vx, 0.0),
            alive: true,
        }
    }

    /// Post-resolution behavior: reverse on walls and at the patrol bounds.
    pub fn after_resolve(&mut self, collisions: &[CollisionEvent], patrol: Span) {
        if let Some(vx) = wall_bounce(collisions) {
            self.body.vel.x = vx;
        }
        turn_at(&mut self.body, patrol);
    }

    pub fn defeat(&mut self) {
        self.alive = false;
        self.body.vel.x = 0.0;
    }
}

// ---------------------------------------------------------------------------
// RevivePolicy
// ---------------------------------------------------------------------------

/// How a `Shelled` enemy decides to get back up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RevivePolicy {
    /// Once the timer passes `min_ticks`, revive with probability `per_tick`
    /// on every tick.
    Chance { min_ticks: f64, per_tick: f64 },
    /// Sample a deadline uniformly in `[min_ticks, max_ticks]` on entering
    /// the shell and revive when the timer reaches it.
    Deadline { min_ticks: f64, max_ticks: f64 },
}

impl Default for RevivePolicy {
    fn default() -> Self {
        RevivePolicy::Chance {
            min_ticks: 720.0,
            per_tick: 0.01,
        }
    }
}

impl RevivePolicy {
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            RevivePolicy::Chance { min_ticks, per_tick } => {
                if !(min_ticks.is_finite() && min_ticks >= 0.0) {
                    return Err(SimError::InvalidParam {
                        name: "revive.min_ticks",
                        reason: format!("must be finite and non-negative, got {min_ticks}"),
                    });
                }
                if !(0.0..=1.0).contains(&per_tick) {
                    return Err(SimError::InvalidParam {
                        name: "revive.per_tick",
                        reason: format!("must be a probability in [0, 1], got {per_tick}"),
                    });
                }
            }
            RevivePolicy::Deadline { min_ticks, max_ticks } => {
                if !(min_ticks.is_finite() && max_ticks.is_finite() && 0.0 <= min_ticks && min_ticks <= max_ticks) {
                    return Err(SimError::InvalidParam {
                        name: "revive.deadline",
                        reason: format!("need 0 <= min_ticks <= max_ticks, got {min_ticks}..{max_ticks}"),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ShellEnemy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellState {
    Walking,
    Shelled,
    Sliding,
    Dead,
}

/// A walker that retreats into a kickable shell when stomped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellEnemy {
    pub body: Body,
    pub state: ShellState,
    /// Ticks spent in the current `Shelled` stint.
    pub revive_timer: f64,
    /// Revive deadline, sampled on entering `Shelled` under
    /// [`RevivePolicy::Deadline`].
    pub revive_deadline: Option<f64>,
    /// Ticks during which the player cannot touch this enemy.
    pub contact_cooldown: u32,
}

impl ShellEnemy {
    pub fn spawn(x: f64, y: f64, vx: f64) -> Self {
        let (w, h) = SHELL_SIZE;
        Self {
            body: Body::new(Rect::new(x, y, w, h)).with_velocity(vx, 0.0),
            state: ShellState::Walking,
            revive_timer: 0.0,
            revive_deadline: None,
            contact_cooldown: 0,
        }
    }

    /// Whether this enemy still takes part in the level.
    pub fn is_in_play(&self) -> bool {
        self.state != ShellState::Dead
    }

    /// Whether the player can currently touch it.
    pub fn is_touchable(&self) -> bool {
        self.is_in_play() && self.contact_cooldown == 0
    }

    fn set_state(&mut self, state: ShellState) {
        self.state = state;
        self.revive_timer = 0.0;
        self.revive_deadline = None;
    }

    /// Retreat into the shell (stomped, or hit by a fireball).
    pub fn enter_shell<R: Rng + ?Sized>(&mut self, params: &SimParams, rng: &mut R) {
        self.set_state(ShellState::Shelled);
        self.body.vel.x = 0.0;
        if let RevivePolicy::Deadline { min_ticks, max_ticks } = params.revive {
            self.revive_deadline = Some(rng.gen_range(min_ticks..=max_ticks));
        }
    }

    /// Send the shell sliding away from a player facing `facing`.
    pub fn kick(&mut self, facing: Facing, params: &SimParams) {
        self.set_state(ShellState::Sliding);
        self.body.vel.x = facing.sign() * params.shell_kick_speed;
    }

    pub fn defeat(&mut self) {
        self.set_state(ShellState::Dead);
        self.body.vel.x = 0.0;
    }

    /// Start the player-contact cooldown.
    pub fn start_cooldown(&mut self, params: &SimParams) {
        self.contact_cooldown = params.shell_contact_cooldown;
    }

    /// Post-resolution behavior for the current state.
    pub fn after_resolve<Q>(&mut self, collisions: &[CollisionEvent], geometry: &Q, patrol: Span, world: Span)
    where
        Q: TileQuery + ?Sized,
    {
        match self.state {
            ShellState::Walking => {
                if let Some(vx) = wall_bounce(collisions) {
                    self.body.vel.x = vx;
                    return;
                }
                if turn_at(&mut self.body, patrol) {
                    return;
                }
                let facing = Facing::of_velocity(self.body.vel.x);
                if self.body.on_ground && !ground_ahead(&self.body, facing, geometry) {
                    self.body.vel.x = -self.body.vel.x;
                }
            }
            ShellState::Shelled => self.body.vel.x = 0.0,
            ShellState::Sliding => {
                if let Some(vx) = wall_bounce(collisions) {
                    self.body.vel.x = vx;
                }
                bounce_off_edges(&mut self.body, world);
            }
            ShellState::Dead => {}
        }
    }

    /// Advance the revive timer. Returns `true` if the enemy got back up.
    pub fn tick_revive<R: Rng + ?Sized>(&mut self, dt: f64, params: &SimParams, rng: &mut R) -> bool {
        if self.state != ShellState::Shelled {
            return false;
        }
        self.revive_timer += dt;
        let revive = match params.revive {
            RevivePolicy::Chance { min_ticks, per_tick } => {
                self.revive_timer > min_ticks && rng.gen::<f64>() < per_tick
            }
            RevivePolicy::Deadline { .. } => self.revive_deadline.is_some_and(|deadline| self.revive_timer >= deadline),
        };
        if revive {
            self.set_state(ShellState::Walking);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            self.body.vel.x = sign * params.shell_walk_speed;
        }
        revive
    }

    /// End-of-tick countdown.
    pub fn tick_timers(&mut self) {
        self.contact_cooldown = self.contact_cooldown.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
