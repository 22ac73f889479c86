//! Entity-vs-entity interaction rules.
//!
//! Each rule is a method on [`Rules`], which bundles the tunables, the
//! world's random source, the shell combo counter and the event sink for
//! one tick. [`World::step`](crate::world::World::step) calls them in a fixed
//! order after every body has been integrated and resolved:
//!
//! 1. [`Rules::block_hits`]
//! 2. [`Rules::player_vs_walkers`]
//! 3. [`Rules::player_vs_shelled`]
//! 4. [`Rules::sliding_shells`]
//! 5. [`Rules::projectiles`]
//! 6. [`Rules::pickups`]
//! 7. [`Rules::goal`]
//! 8. [`Rules::kill_plane`]
//!
//! A sliding shell never touches the player: only other enemies are in its
//! way.
//!
//! Rules only mutate state; spawning new actors (power-ups) is left to the
//! caller, which owns the id allocator.

use rand::Rng;
use tracing::{debug, info};

use crate::collision::{CollisionEvent, CollisionKind};
use crate::enemy::ShellState;
use crate::entity::{Actor, Body, Entity};
use crate::events::{DefeatCause, LevelEvent};
use crate::geometry::intersects;
use crate::items::{BlockReward, GoalTrigger, InteractiveBlock, PowerUp};
use crate::params::SimParams;
use crate::player::{Damage, Player};
use crate::tiles::TileKind;

/// Whether an overlapping player is landing on `enemy` rather than running into it.
///
/// The player must be falling and its bottom must be less than `threshold`
/// below the enemy's top.
pub fn is_stomp(player: &Body, enemy: &Body, threshold: f64) -> bool {
    player.vel.y > 0.0 && player.rect.bottom() - enemy.rect.top() < threshold
}

/// Per-tick rule context.
pub struct Rules<'a, R: Rng + ?Sized> {
    pub params: &'a SimParams,
    pub rng: &'a mut R,
    pub shell_combo: &'a mut u32,
    pub events: &'a mut Vec<LevelEvent>,
}

impl<'a, R: Rng + ?Sized> Rules<'a, R> {
    fn hurt(&mut self, player: &mut Player) {
        match player.take_damage(self.params) {
            Damage::Ignored => {}
            Damage::Downgraded { from, to } => {
                debug!(?from, ?to, "player damaged");
                self.events.push(LevelEvent::PlayerDamaged { form: to });
            }
            Damage::Killed => {
                info!("player died");
                self.events.push(LevelEvent::PlayerDied);
            }
        }
    }

    fn count_combo_kill(&mut self) {
        *self.shell_combo += 1;
        let combo = *self.shell_combo;
        if combo % self.params.combo_per_bonus_life == 0 {
            info!(combo, "bonus life");
            self.events.push(LevelEvent::BonusLife { combo });
        }
    }

    /// Question blocks struck by the player's head this tick.
    ///
    /// Returns the power-ups that emerged, for the caller to spawn.
    pub fn block_hits(
        &mut self,
        player: &mut Player,
        collisions: &[CollisionEvent],
        blocks: &mut [InteractiveBlock],
    ) -> Vec<PowerUp> {
        let mut spawned = Vec::new();
        for event in collisions {
            let (CollisionKind::HeadBump, TileKind::Block(index)) = (event.kind, event.tile.kind) else {
                continue;
            };
            let Some(block) = blocks.get_mut(index) else {
                continue;
            };
            let Some(reward) = block.hit(event.penetration, player.form, self.params) else {
                continue;
            };
            debug!(block = index, "block hit");
            player.body.vel.y = self.params.block_bounce_vy;
            self.events.push(LevelEvent::BlockHit { block: index });
            match reward {
                BlockReward::PowerUp(powerup) => spawned.push(powerup),
                BlockReward::Coin => self.events.push(LevelEvent::CoinPopped { block: index }),
            }
        }
        spawned
    }

    /// Stomp-or-hurt against patrol enemies and walking shells.
    pub fn player_vs_walkers(&mut self, player: &mut Player, actors: &mut [Actor]) {
        for actor in actors.iter_mut() {
            if !player.is_controllable() {
                return;
            }
            match &mut actor.entity {
                Entity::Patrol(enemy) if enemy.alive => {
                    if !intersects(&player.body.rect, &enemy.body.rect) {
                        continue;
                    }
                    if is_stomp(&player.body, &enemy.body, self.params.patrol_stomp_threshold) {
                        debug!(enemy = %actor.id, "patrol stomped");
                        enemy.defeat();
                        player.stomp_bounce(self.params);
                        self.events.push(LevelEvent::EnemyStomped { enemy: actor.id });
                        self.events.push(LevelEvent::EnemyDefeated {
                            enemy: actor.id,
                            by: DefeatCause::Stomp,
                        });
                    } else {
                        self.hurt(player);
                    }
                }
                Entity::Shell(shell) if shell.state == ShellState::Walking && shell.is_touchable() => {
                    if !intersects(&player.body.rect, &shell.body.rect) {
                        continue;
                    }
                    if is_stomp(&player.body, &shell.body, self.params.shell_stomp_threshold) {
                        debug!(enemy = %actor.id, "shell enemy stomped");
                        shell.enter_shell(self.params, &mut *self.rng);
                        shell.start_cooldown(self.params);
                        player.stomp_bounce(self.params);
                        self.events.push(LevelEvent::EnemyStomped { enemy: actor.id });
                    } else {
                        self.hurt(player);
                    }
                }
                _ => {}
            }
        }
    }

    /// Touching a resting shell from any side kicks it in the player's facing
    /// direction and restarts the combo.
    pub fn player_vs_shelled(&mut self, player: &mut Player, actors: &mut [Actor]) {
        if !player.is_controllable() {
            return;
        }
        for actor in actors.iter_mut() {
            let Entity::Shell(shell) = &mut actor.entity else {
                continue;
            };
            if shell.state != ShellState::Shelled || !shell.is_touchable() {
                continue;
            }
            if intersects(&player.body.rect, &shell.body.rect) {
                debug!(shell = %actor.id, facing = ?player.facing, "shell kicked");
                shell.kick(player.facing, self.params);
                *self.shell_combo = 0;
                self.events.push(LevelEvent::ShellKicked { shell: actor.id });
            }
        }
    }

    /// Sliding shells knock out every patrol enemy and every walking or
    /// sliding shell they touch, feeding the combo.
    pub fn sliding_shells(&mut self, actors: &mut [Actor]) {
        for i in 0..actors.len() {
            let rect = match &actors[i].entity {
                Entity::Shell(s) if s.state == ShellState::Sliding => s.body.rect,
                _ => continue,
            };
            for (j, victim) in actors.iter_mut().enumerate() {
                if j == i || !intersects(&rect, &victim.entity.body().rect) {
                    continue;
                }
                let knocked_out = match &mut victim.entity {
                    Entity::Patrol(enemy) if enemy.alive => {
                        enemy.defeat();
                        true
                    }
                    Entity::Shell(other) if matches!(other.state, ShellState::Walking | ShellState::Sliding) => {
                        other.defeat();
                        true
                    }
                    _ => false,
                };
                if knocked_out {
                    debug!(enemy = %victim.id, "knocked out by shell");
                    self.events.push(LevelEvent::EnemyDefeated {
                        enemy: victim.id,
                        by: DefeatCause::Shell,
                    });
                    self.count_combo_kill();
                }
            }
        }
    }

    /// Each live fireball hits at most one enemy: the first in list order.
    pub fn projectiles(&mut self, actors: &mut [Actor]) {
        for i in 0..actors.len() {
            let rect = match &actors[i].entity {
                Entity::Projectile(p) if !p.hit => p.body.rect,
                _ => continue,
            };
            let target = actors
                .iter()
                .position(|a| a.entity.is_live_enemy() && intersects(&rect, &a.entity.body().rect));
            let Some(j) = target else {
                continue;
            };

            let enemy_id = actors[j].id;
            match &mut actors[j].entity {
                Entity::Patrol(enemy) => {
                    enemy.defeat();
                    self.events.push(LevelEvent::EnemyDefeated {
                        enemy: enemy_id,
                        by: DefeatCause::Fireball,
                    });
                }
                Entity::Shell(shell) => {
                    shell.enter_shell(self.params, &mut *self.rng);
                    self.events.push(LevelEvent::ShellHit { shell: enemy_id });
                }
                _ => {}
            }
            debug!(projectile = %actors[i].id, enemy = %enemy_id, "fireball hit");
            if let Entity::Projectile(p) = &mut actors[i].entity {
                p.hit = true;
            }
        }
    }

    /// Collect every overlapping power-up.
    pub fn pickups(&mut self, player: &mut Player, actors: &mut [Actor]) {
        if !player.is_controllable() {
            return;
        }
        for actor in actors.iter_mut() {
            let Entity::PowerUp(powerup) = &mut actor.entity else {
                continue;
            };
            if powerup.collected || !intersects(&player.body.rect, &powerup.body.rect) {
                continue;
            }
            powerup.collected = true;
            let (from, to) = player.collect(powerup.kind);
            debug!(kind = ?powerup.kind, ?from, ?to, "power-up collected");
            self.events.push(LevelEvent::PowerUpCollected {
                id: actor.id,
                kind: powerup.kind,
                form: to,
            });
        }
    }

    /// Start the goal slide on first contact with the pole.
    pub fn goal(&mut self, player: &mut Player, goal: &GoalTrigger) {
        if !player.is_controllable() || !intersects(&player.body.rect, &goal.rect) {
            return;
        }
        info!(x = player.body.rect.x, "goal reached");
        player.begin_goal_slide(goal.rect.x, goal.base_y, self.params);
        self.events.push(LevelEvent::GoalReached);
    }

    /// Falling out of the level is fatal in any form.
    pub fn kill_plane(&mut self, player: &mut Player, kill_y: f64) {
        if player.alive && player.goal.is_none() && player.body.rect.top() > kill_y {
            player.alive = false;
            info!(y = player.body.rect.y, "player fell out of the level");
            self.events.push(LevelEvent::PlayerDied);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
