//! Gameplay scenarios driven through `World::step`.
//!
//! Each test builds a small flat level, places the actors it needs, and
//! checks the events and state the rules produce.

use runners_sim::prelude::*;

const GROUND_Y: f64 = 432.0;

fn world_with(level: LevelDescriptor) -> World {
    World::new(level, SimParams::default(), Viewport::default(), 3).unwrap()
}

fn flat() -> LevelDescriptor {
    LevelDescriptor::flat(GROUND_Y, 2000.0)
}

fn resting_patrol(x: f64) -> EnemySpawn {
    EnemySpawn::Patrol {
        x,
        y: GROUND_Y - 40.0,
        vx: 0.0,
    }
}

fn resting_shell(x: f64) -> Entity {
    let mut shell = ShellEnemy::spawn(x, GROUND_Y - 48.0, 0.0);
    shell.state = ShellState::Shelled;
    Entity::Shell(shell)
}

fn run(world: &mut World, input: InputFrame, ticks: usize) -> Vec<LevelEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(world.step(&input, 1.0).events);
    }
    events
}

// ---------------------------------------------------------------------------
// Stomp vs damage
// ---------------------------------------------------------------------------

#[test]
fn falling_onto_patrol_stomps_it() {
    let mut level = flat();
    level.enemies.push(resting_patrol(300.0));
    let mut world = world_with(level);
    let enemy = world.actors()[0].id;

    let player = world.player_mut();
    player.body.rect.x = 300.0;
    player.body.rect.y = GROUND_Y - 40.0 - 48.0 - 1.0;
    player.body.vel.y = 2.0;

    let report = world.step(&InputFrame::NONE, 1.0);
    assert!(report.has(|e| *e == LevelEvent::EnemyStomped { enemy }));
    assert!(report.has(|e| *e
        == LevelEvent::EnemyDefeated {
            enemy,
            by: DefeatCause::Stomp
        }));
    assert!(world.actor(enemy).is_none(), "defeated enemy is swept");
    assert_eq!(world.player().body.vel.y, -15.0 / 1.6);
    assert_eq!(world.player().form, Form::Small);
}

#[test]
fn rising_into_patrol_hurts() {
    let mut level = flat();
    level.enemies.push(resting_patrol(300.0));
    let mut world = world_with(level);

    let player = world.player_mut();
    player.form = Form::Big;
    player.body.rect.x = 280.0;
    player.body.vel.y = -1.0;

    let report = world.step(&InputFrame::NONE, 1.0);
    assert_eq!(report.events, vec![LevelEvent::PlayerDamaged { form: Form::Small }]);
    assert_eq!(world.player().invincibility_frames, 59, "set to 60, then one tick elapsed");
    assert_eq!(world.actors().len(), 1);

    // Still overlapping, but invincible.
    let again = world.step(&InputFrame::NONE, 1.0);
    assert!(again.events.is_empty());
    assert_eq!(world.player().form, Form::Small);
}

// ---------------------------------------------------------------------------
// Question blocks
// ---------------------------------------------------------------------------

#[test]
fn question_block_releases_one_power_up() {
    let mut level = flat();
    level
        .blocks
        .push(InteractiveBlock::new(Rect::new(100.0, 300.0, 40.0, 40.0), BlockContents::PowerUp));
    let mut world = world_with(level);
    let jump = InputFrame {
        jump: true,
        ..Default::default()
    };

    let mut events = Vec::new();
    for _ in 0..2 {
        events.extend(run(&mut world, jump, 1));
        events.extend(run(&mut world, InputFrame::NONE, 60));
        assert!(!world.player().jumping, "landed between jumps");
    }

    let spawned = events
        .iter()
        .filter(|e| matches!(e, LevelEvent::PowerUpSpawned { .. }))
        .count();
    let hits = events.iter().filter(|e| matches!(e, LevelEvent::BlockHit { .. })).count();
    assert_eq!(spawned, 1);
    assert_eq!(hits, 1);
    assert!(world.blocks()[0].used);
    assert!(events.contains(&LevelEvent::PowerUpSpawned {
        id: EntityId::new(1),
        kind: PowerUpKind::Mushroom
    }));
}

#[test]
fn coin_block_pops_a_coin() {
    let mut level = flat();
    level
        .blocks
        .push(InteractiveBlock::new(Rect::new(100.0, 300.0, 40.0, 40.0), BlockContents::Coin));
    let mut world = world_with(level);
    let jump = InputFrame {
        jump: true,
        ..Default::default()
    };
    let mut events = run(&mut world, jump, 1);
    events.extend(run(&mut world, InputFrame::NONE, 10));
    assert!(events.contains(&LevelEvent::CoinPopped { block: 0 }));
    assert!(world.actors().is_empty());
}

// ---------------------------------------------------------------------------
// Shells
// ---------------------------------------------------------------------------

#[test]
fn kicked_shell_chains_a_combo() {
    let mut level = flat();
    for x in [400.0, 460.0, 520.0] {
        level.enemies.push(resting_patrol(x));
    }
    let mut world = world_with(level);
    let shell = world.spawn(resting_shell(200.0));

    let events = run(&mut world, InputFrame::right(), 60);

    assert!(events.contains(&LevelEvent::ShellKicked { shell }));
    let shell_kills = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                LevelEvent::EnemyDefeated {
                    by: DefeatCause::Shell,
                    ..
                }
            )
        })
        .count();
    assert_eq!(shell_kills, 3);
    assert_eq!(world.shell_combo(), 3);
    assert!(!events.iter().any(|e| matches!(e, LevelEvent::BonusLife { .. })));
    assert!(world.player().alive);
}

#[test]
fn eighth_combo_kill_awards_one_bonus_life() {
    let mut level = flat();
    for i in 0..9 {
        level.enemies.push(resting_patrol(400.0 + 45.0 * f64::from(i)));
    }
    let mut world = world_with(level);
    world.spawn(resting_shell(200.0));

    let events = run(&mut world, InputFrame::right(), 90);
    assert_eq!(world.shell_combo(), 9);
    let bonus: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, LevelEvent::BonusLife { .. }))
        .collect();
    assert_eq!(bonus, vec![&LevelEvent::BonusLife { combo: 8 }]);
}

#[test]
fn shelled_enemy_revives_after_the_minimum_wait() {
    let params = SimParams {
        revive: RevivePolicy::Chance {
            min_ticks: 720.0,
            per_tick: 1.0,
        },
        ..Default::default()
    };
    let mut world = World::new(flat(), params, Viewport::default(), 3).unwrap();
    let shell = world.spawn(resting_shell(1500.0));

    run(&mut world, InputFrame::NONE, 720);
    let Some(Actor {
        entity: Entity::Shell(s),
        ..
    }) = world.actor(shell)
    else {
        panic!("shell missing");
    };
    assert_eq!(s.state, ShellState::Shelled);

    let revived = run(&mut world, InputFrame::NONE, 1);
    assert_eq!(revived, vec![LevelEvent::ShellRevived { shell }]);
    let Some(Actor {
        entity: Entity::Shell(s),
        ..
    }) = world.actor(shell)
    else {
        panic!("shell missing");
    };
    assert_eq!(s.state, ShellState::Walking);
    assert_eq!(s.revive_timer, 0.0);
    assert_eq!(s.body.vel.x.abs(), 1.0);
}

#[test]
fn knocked_out_shell_never_comes_back() {
    let params = SimParams {
        revive: RevivePolicy::Chance {
            min_ticks: 720.0,
            per_tick: 1.0,
        },
        ..Default::default()
    };
    let mut world = World::new(flat(), params, Viewport::default(), 3).unwrap();
    let slider = world.spawn(resting_shell(200.0));
    let victim = world.spawn(Entity::Shell(ShellEnemy::spawn(500.0, GROUND_Y - 48.0, 0.0)));

    let mut events = run(&mut world, InputFrame::right(), 60);
    assert!(events.contains(&LevelEvent::ShellKicked { shell: slider }));
    assert!(events.contains(&LevelEvent::EnemyDefeated {
        enemy: victim,
        by: DefeatCause::Shell
    }));
    assert!(world.actor(victim).is_none());

    // Well past the revive window.
    events.extend(run(&mut world, InputFrame::NONE, 800));
    assert!(world.actor(victim).is_none());
    assert!(!events.contains(&LevelEvent::ShellRevived { shell: victim }));
    assert_eq!(world.shell_combo(), 1);
    assert!(world.player().alive);
}

#[test]
fn sliding_shell_passes_through_the_player() {
    let mut world = world_with(flat());
    let mut shell = ShellEnemy::spawn(160.0, GROUND_Y - 48.0, 0.0);
    shell.kick(Facing::Left, &SimParams::default());
    world.spawn(Entity::Shell(shell));
    world.player_mut().form = Form::Big;

    let events = run(&mut world, InputFrame::NONE, 10);
    assert!(!events.iter().any(|e| matches!(e, LevelEvent::PlayerDamaged { .. })));
    assert_eq!(world.player().form, Form::Big);
}

// ---------------------------------------------------------------------------
// Kill plane
// ---------------------------------------------------------------------------

#[test]
fn enemy_falling_into_a_pit_leaves_the_level() {
    let mut level = flat();
    level.ground = vec![
        Rect::new(0.0, GROUND_Y, 1000.0, 64.0),
        Rect::new(1100.0, GROUND_Y, 900.0, 64.0),
    ];
    level.enemies.push(resting_patrol(1040.0));
    let mut world = world_with(level);
    let enemy = world.actors()[0].id;

    let events = run(&mut world, InputFrame::NONE, 200);
    let fell: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, LevelEvent::EnemyDefeated { .. }))
        .collect();
    assert_eq!(
        fell,
        vec![&LevelEvent::EnemyDefeated {
            enemy,
            by: DefeatCause::Fell
        }]
    );
    assert!(world.actors().is_empty());
    assert_eq!(world.outcome(), LevelOutcome::Running);
}

#[test]
fn no_actor_outlives_the_kill_plane() {
    let mut world = world_with(LevelDescriptor::hybrid_1_1(GROUND_Y));
    let pit_walker = world
        .actors()
        .iter()
        .find(|a| a.entity.body().rect.x == 2500.0)
        .map(|a| a.id)
        .unwrap();
    let kill_y = world.level().kill_y;

    let mut events = Vec::new();
    for _ in 0..600 {
        events.extend(world.step(&InputFrame::NONE, 1.0).events);
        for actor in world.actors() {
            assert!(actor.entity.body().rect.top() <= kill_y, "{} below the kill plane", actor.id);
        }
    }
    assert!(events.contains(&LevelEvent::EnemyDefeated {
        enemy: pit_walker,
        by: DefeatCause::Fell
    }));
    assert!(world.actor(pit_walker).is_none());
}

// ---------------------------------------------------------------------------
// Fireballs
// ---------------------------------------------------------------------------

#[test]
fn fireball_defeats_patrol_enemy() {
    let mut level = flat();
    level.enemies.push(resting_patrol(300.0));
    let mut world = world_with(level);
    let enemy = world.actors()[0].id;
    world.player_mut().form = Form::Fire;

    let fire = InputFrame {
        fire: true,
        ..Default::default()
    };
    let mut events = run(&mut world, fire, 1);
    events.extend(run(&mut world, InputFrame::NONE, 40));

    assert!(events.contains(&LevelEvent::EnemyDefeated {
        enemy,
        by: DefeatCause::Fireball
    }));
    assert!(world.actors().is_empty(), "fireball and enemy both gone");
}
