//! The level aggregate and its per-tick update.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::collision::{resolve_axis_collisions, CollisionKind};
use crate::enemy::{PatrolEnemy, ShellEnemy};
use crate::entity::{Actor, Entity, EntityId, IdAllocator};
use crate::events::{DefeatCause, LevelEvent, LevelOutcome, TickReport};
use crate::input::InputFrame;
use crate::interact::Rules;
use crate::items::InteractiveBlock;
use crate::level::{EnemySpawn, LevelDescriptor};
use crate::params::{SimParams, Viewport};
use crate::physics::integrate;
use crate::player::Player;
use crate::projectile::Projectile;
use crate::tiles::StaticGeometry;
use crate::SimError;

/// Everything that changes while a level is played, plus what it was built from.
///
/// All mutation goes through [`World::step`]; renderers read through the
/// accessors. The random source lives here too, so a world restored from
/// its serialized form continues exactly where the original left off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    level: LevelDescriptor,
    params: SimParams,
    viewport: Viewport,
    seed: u64,

    geometry: StaticGeometry,
    blocks: Vec<InteractiveBlock>,
    player: Player,
    actors: Vec<Actor>,
    ids: IdAllocator,
    rng: Pcg32,
    shell_combo: u32,
    tick: u64,
    outcome: LevelOutcome,
}

impl World {
    /// Validate `level`, `params` and `viewport`, then build the level.
    pub fn new(level: LevelDescriptor, params: SimParams, viewport: Viewport, seed: u64) -> Result<World, SimError> {
        level.validate()?;
        params.validate()?;
        viewport.validate()?;
        let world = Self::build(level, params, viewport, seed);
        debug!(
            seed,
            actors = world.actors.len(),
            solids = world.geometry.len(),
            "world created"
        );
        Ok(world)
    }

    fn build(level: LevelDescriptor, params: SimParams, viewport: Viewport, seed: u64) -> World {
        let mut ids = IdAllocator::new();
        let actors = level
            .enemies
            .iter()
            .map(|spawn| {
                let entity = match *spawn {
                    EnemySpawn::Patrol { x, y, vx } => Entity::Patrol(PatrolEnemy::spawn(x, y, vx)),
                    EnemySpawn::Shell { x, y, vx } => Entity::Shell(ShellEnemy::spawn(x, y, vx)),
                };
                Actor {
                    id: ids.allocate(),
                    entity,
                }
            })
            .collect();

        World {
            geometry: level.geometry(),
            blocks: level.blocks.clone(),
            player: Player::spawn(level.player_spawn.x, level.player_spawn.y),
            actors,
            ids,
            rng: Pcg32::seed_from_u64(seed),
            shell_combo: 0,
            tick: 0,
            outcome: LevelOutcome::Running,
            level,
            params,
            viewport,
            seed,
        }
    }

    /// Throw the current run away and start the level again from its
    /// descriptor, with the original seed.
    pub fn restart(&mut self) {
        info!(tick = self.tick, "level restarted");
        let level = self.level.clone();
        let params = self.params.clone();
        *self = Self::build(level, params, self.viewport, self.seed);
    }

    // -- accessors ------------------------------------------------------------

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct player access, for scripted setups.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn blocks(&self) -> &[InteractiveBlock] {
        &self.blocks
    }

    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    pub fn level(&self) -> &LevelDescriptor {
        &self.level
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shell_combo(&self) -> u32 {
        self.shell_combo
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn outcome(&self) -> LevelOutcome {
        self.outcome
    }

    /// Left edge of the view, centered on the player. Render-only, apart
    /// from fireball culling.
    pub fn camera_x(&self) -> f64 {
        self.viewport.camera_x(self.player.body.rect.x)
    }

    /// Add an actor to the level and return its id.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.ids.allocate();
        trace!(%id, kind = entity.kind_name(), "spawned");
        self.actors.push(Actor { id, entity });
        id
    }

    // -- update ---------------------------------------------------------------

    /// Advance the level by one tick of length `dt` (1.0 = one 16 ms frame).
    ///
    /// Once the level has finished the world is frozen: further steps only
    /// advance the tick counter and report the final outcome.
    pub fn step(&mut self, input: &InputFrame, dt: f64) -> TickReport {
        self.tick += 1;
        let tick = self.tick;
        if self.outcome.is_finished() {
            return TickReport {
                tick,
                events: Vec::new(),
                outcome: self.outcome,
            };
        }

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "ignoring invalid step length");
            0.0
        };
        trace!(tick, dt, "step");

        let mut events = Vec::new();
        let mut completed = false;

        // Input, or the scripted goal slide.
        if self.player.goal.is_some() {
            if self.player.advance_goal_slide(dt, &self.params) {
                info!(tick, "level complete");
                events.push(LevelEvent::LevelComplete);
                completed = true;
            }
        } else if self.player.apply_input(input, &self.params) {
            let (x, y, facing) = self.player.fireball_origin();
            let id = self.spawn(Entity::Projectile(Projectile::launch(x, y, facing, &self.params)));
            events.push(LevelEvent::FireballThrown { id });
        }

        // Player physics.
        let mut player_collisions = Vec::new();
        if self.player.is_controllable() {
            let body = &mut self.player.body;
            integrate(body, dt, self.params.gravity);
            player_collisions = resolve_axis_collisions(EntityId::PLAYER, body, &self.geometry);
            if player_collisions.iter().any(|c| c.kind == CollisionKind::Landed) {
                self.player.jumping = false;
            }
            let bounds = self.level.world_bounds;
            let rect = &mut self.player.body.rect;
            rect.x = rect.x.max(bounds.min).min(bounds.max - rect.w);
        }

        // Actor physics and per-state behavior.
        let camera_x = self.camera_x();
        for actor in &mut self.actors {
            let body = actor.entity.body_mut();
            integrate(body, dt, self.params.gravity);
            let collisions = resolve_axis_collisions(actor.id, body, &self.geometry);
            match &mut actor.entity {
                Entity::Patrol(enemy) => enemy.after_resolve(&collisions, self.level.patrol_bounds),
                Entity::Shell(shell) => shell.after_resolve(
                    &collisions,
                    &self.geometry,
                    self.level.patrol_bounds,
                    self.level.world_bounds,
                ),
                Entity::Projectile(fireball) => {
                    fireball.after_resolve(&collisions, &self.params);
                    fireball.cull(camera_x, self.viewport.width, &self.params);
                }
                Entity::PowerUp(powerup) => powerup.after_resolve(&collisions),
            }
        }

        // Interactions, in rule order.
        let mut rules = Rules {
            params: &self.params,
            rng: &mut self.rng,
            shell_combo: &mut self.shell_combo,
            events: &mut events,
        };
        let emerged = rules.block_hits(&mut self.player, &player_collisions, &mut self.blocks);
        for powerup in emerged {
            let kind = powerup.kind;
            let id = self.ids.allocate();
            self.actors.push(Actor {
                id,
                entity: Entity::PowerUp(powerup),
            });
            rules.events.push(LevelEvent::PowerUpSpawned { id, kind });
        }
        rules.player_vs_walkers(&mut self.player, &mut self.actors);
        rules.player_vs_shelled(&mut self.player, &mut self.actors);
        rules.sliding_shells(&mut self.actors);
        rules.projectiles(&mut self.actors);
        rules.pickups(&mut self.player, &mut self.actors);
        rules.goal(&mut self.player, &self.level.goal);
        rules.kill_plane(&mut self.player, self.level.kill_y);

        // Actors below the kill plane leave the level.
        for actor in &mut self.actors {
            if actor.entity.is_spent() || actor.entity.body().rect.top() <= self.level.kill_y {
                continue;
            }
            debug!(id = %actor.id, kind = actor.entity.kind_name(), "fell out of the level");
            if actor.entity.remove_from_play() {
                events.push(LevelEvent::EnemyDefeated {
                    enemy: actor.id,
                    by: DefeatCause::Fell,
                });
            }
        }

        // Timers, then sweep.
        self.player.tick_timers();
        for actor in &mut self.actors {
            if let Entity::Shell(shell) = &mut actor.entity {
                if shell.tick_revive(dt, &self.params, &mut self.rng) {
                    debug!(shell = %actor.id, "shell enemy revived");
                    events.push(LevelEvent::ShellRevived { shell: actor.id });
                }
                shell.tick_timers();
            }
        }
        self.actors.retain(|a| !a.entity.is_spent());

        self.outcome = if !self.player.alive {
            LevelOutcome::Died
        } else if completed {
            LevelOutcome::Completed
        } else {
            LevelOutcome::Running
        };
        if self.outcome.is_finished() {
            info!(tick, outcome = ?self.outcome, "level finished");
        }

        TickReport {
            tick,
            events,
            outcome: self.outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
