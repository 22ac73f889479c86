//! Level descriptions: inline shape lists, validated once and turned into
//! [`StaticGeometry`] plus the initial dynamic population.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Span, Vec2};
use crate::items::{BlockContents, GoalTrigger, InteractiveBlock};
use crate::tiles::{Solid, StaticGeometry, TileKind};
use crate::SimError;

/// Depth of a ground segment below its surface.
pub const GROUND_DEPTH: f64 = 64.0;
/// Edge of a question block or brick.
pub const BLOCK_SIZE: f64 = 40.0;
/// Edge of a stair step.
pub const STAIR_SIZE: f64 = 48.0;

/// An enemy placed at level start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemySpawn {
    Patrol { x: f64, y: f64, vx: f64 },
    Shell { x: f64, y: f64, vx: f64 },
}

impl EnemySpawn {
    fn values(&self) -> [f64; 3] {
        match *self {
            EnemySpawn::Patrol { x, y, vx } | EnemySpawn::Shell { x, y, vx } => [x, y, vx],
        }
    }
}

/// Everything needed to build a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Walkable ground. Gaps between segments are pits.
    pub ground: Vec<Rect>,
    pub bricks: Vec<Rect>,
    pub stairs: Vec<Rect>,
    pub blocks: Vec<InteractiveBlock>,
    pub enemies: Vec<EnemySpawn>,
    pub goal: GoalTrigger,
    /// Top-left corner of the player at start.
    pub player_spawn: Vec2,
    /// Walkers turn around outside this range.
    pub patrol_bounds: Span,
    /// The player is clamped to it and sliding shells bounce off its ends.
    pub world_bounds: Span,
    /// Falling below this y is fatal.
    pub kill_y: f64,
}

impl LevelDescriptor {
    /// The hybrid 1-1 layout: three question blocks, a brick cluster, a
    /// floating staircase, one pit, four patrol enemies, two shell enemies
    /// and the goal pole at x = 4200.
    pub fn hybrid_1_1(ground_y: f64) -> Self {
        let block = |x: f64, y: f64| Rect::new(x, y, BLOCK_SIZE, BLOCK_SIZE);
        let ground_at = |from: f64, to: f64| Rect::new(from, ground_y, to - from, GROUND_DEPTH);

        // Step 0 would sit flush inside the ground.
        let stairs = (1..6)
            .map(|i| {
                let i = f64::from(i);
                Rect::new(3000.0 + i * STAIR_SIZE, ground_y - i * STAIR_SIZE, STAIR_SIZE, STAIR_SIZE)
            })
            .collect();

        let enemy_y = ground_y - 48.0;
        Self {
            ground: vec![ground_at(0.0, 2300.0), ground_at(2396.0, 9000.0)],
            bricks: vec![
                block(760.0, ground_y - 160.0),
                block(800.0, ground_y - 200.0),
                block(840.0, ground_y - 160.0),
            ],
            stairs,
            blocks: vec![
                InteractiveBlock::new(block(600.0, ground_y - 160.0), BlockContents::PowerUp),
                InteractiveBlock::new(block(900.0, ground_y - 160.0), BlockContents::Coin),
                InteractiveBlock::new(block(1300.0, ground_y - 160.0), BlockContents::PowerUp),
            ],
            enemies: vec![
                EnemySpawn::Patrol { x: 1100.0, y: enemy_y, vx: -0.9 },
                EnemySpawn::Patrol { x: 1700.0, y: enemy_y, vx: -1.0 },
                EnemySpawn::Patrol { x: 2500.0, y: enemy_y, vx: -1.0 },
                EnemySpawn::Patrol { x: 3400.0, y: enemy_y, vx: -1.2 },
                EnemySpawn::Shell { x: 2100.0, y: enemy_y, vx: -1.0 },
                EnemySpawn::Shell { x: 3200.0, y: enemy_y, vx: 1.0 },
            ],
            goal: GoalTrigger {
                rect: Rect::new(4200.0, ground_y - 240.0, 40.0, 240.0),
                base_y: ground_y,
            },
            player_spawn: Vec2::new(120.0, ground_y - 48.0),
            patrol_bounds: Span::new(200.0, 3800.0),
            world_bounds: Span::new(0.0, 9000.0),
            kill_y: ground_y + 200.0,
        }
    }

    /// A single unbroken floor of `width` with nothing on it; the goal sits
    /// at the far end.
    pub fn flat(ground_y: f64, width: f64) -> Self {
        Self {
            ground: vec![Rect::new(0.0, ground_y, width, GROUND_DEPTH)],
            bricks: Vec::new(),
            stairs: Vec::new(),
            blocks: Vec::new(),
            enemies: Vec::new(),
            goal: GoalTrigger {
                rect: Rect::new(width - 80.0, ground_y - 240.0, 40.0, 240.0),
                base_y: ground_y,
            },
            player_spawn: Vec2::new(100.0, ground_y - 48.0),
            patrol_bounds: Span::new(0.0, width),
            world_bounds: Span::new(0.0, width),
            kill_y: ground_y + 200.0,
        }
    }

    /// Reject shapes the simulation cannot run on.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.ground.is_empty() {
            return Err(SimError::NoGround);
        }

        let rects = self
            .ground
            .iter()
            .map(|r| ("ground", r))
            .chain(self.bricks.iter().map(|r| ("brick", r)))
            .chain(self.stairs.iter().map(|r| ("stair", r)))
            .chain(self.blocks.iter().map(|b| ("block", &b.rect)))
            .chain(std::iter::once(("goal", &self.goal.rect)));
        for (what, rect) in rects {
            if !rect.is_well_formed() {
                return Err(SimError::MalformedRect {
                    what: what.to_owned(),
                    details: format!("{rect:?}"),
                });
            }
        }

        for (i, spawn) in self.enemies.iter().enumerate() {
            if spawn.values().iter().any(|v| !v.is_finite()) {
                return Err(SimError::NonFinite {
                    what: format!("enemy spawn {i}"),
                });
            }
        }
        let scalars = [
            ("player spawn", self.player_spawn.x),
            ("player spawn", self.player_spawn.y),
            ("goal base", self.goal.base_y),
            ("kill plane", self.kill_y),
        ];
        for (what, value) in scalars {
            if !value.is_finite() {
                return Err(SimError::NonFinite { what: what.to_owned() });
            }
        }

        for (what, span) in [("patrol", self.patrol_bounds), ("world", self.world_bounds)] {
            if !span.is_valid() {
                return Err(SimError::InvalidBounds {
                    what,
                    min: span.min,
                    max: span.max,
                });
            }
        }
        Ok(())
    }

    /// Static geometry in resolver priority order: ground, bricks, stairs,
    /// then question blocks tagged with their index.
    pub fn geometry(&self) -> StaticGeometry {
        let tagged = |kind: TileKind| move |rect: &Rect| Solid { rect: *rect, kind };
        let solids = self
            .ground
            .iter()
            .map(tagged(TileKind::Ground))
            .chain(self.bricks.iter().map(tagged(TileKind::Brick)))
            .chain(self.stairs.iter().map(tagged(TileKind::Stair)))
            .chain(self.blocks.iter().enumerate().map(|(i, b)| Solid {
                rect: b.rect,
                kind: TileKind::Block(i),
            }))
            .collect();
        StaticGeometry::new(solids)
    }
}
