//! Question blocks, the power-ups they release, and the goal pole.

use serde::{Deserialize, Serialize};

use crate::collision::{CollisionEvent, CollisionKind};
use crate::entity::Body;
use crate::geometry::Rect;
use crate::params::SimParams;
use crate::player::Form;

pub const POWERUP_SIZE: f64 = 40.0;

/// Which collectible a power-up is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    FireFlower,
    Mushroom,
}

impl PowerUpKind {
    /// What a power-up block releases for a player in `form`.
    pub fn for_form(form: Form) -> PowerUpKind {
        match form {
            Form::Small => PowerUpKind::Mushroom,
            Form::Big | Form::Fire => PowerUpKind::FireFlower,
        }
    }
}

// ---------------------------------------------------------------------------
// PowerUp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub body: Body,
    pub kind: PowerUpKind,
    pub collected: bool,
}

impl PowerUp {
    /// Spawn sitting on top of `block`.
    ///
    /// Mushrooms slide right under default gravity; flowers stay put.
    pub fn emerge(block: &Rect, kind: PowerUpKind, params: &SimParams) -> Self {
        let rect = Rect::new(block.x, block.top() - POWERUP_SIZE, POWERUP_SIZE, POWERUP_SIZE);
        let body = match kind {
            PowerUpKind::Mushroom => Body::new(rect).with_velocity(params.mushroom_speed, 0.0),
            PowerUpKind::FireFlower => Body::new(rect).with_gravity(0.0),
        };
        Self {
            body,
            kind,
            collected: false,
        }
    }

    /// Mushrooms turn around on walls.
    pub fn after_resolve(&mut self, collisions: &[CollisionEvent]) {
        for event in collisions {
            if let CollisionKind::Blocked(_) = event.kind {
                self.body.vel.x = -event.impact_speed;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InteractiveBlock
// ---------------------------------------------------------------------------

/// What a block gives on its single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockContents {
    PowerUp,
    Coin,
}

/// What came out of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReward {
    PowerUp(PowerUp),
    Coin,
}

/// A question block. Solid; releases its contents once when bumped from below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveBlock {
    pub rect: Rect,
    pub used: bool,
    pub contains: BlockContents,
}

impl InteractiveBlock {
    pub fn new(rect: Rect, contains: BlockContents) -> Self {
        Self {
            rect,
            used: false,
            contains,
        }
    }

    /// Whether a head bump that pushed the player back by `penetration`
    /// struck the block's lower region.
    pub fn struck_from_below(&self, penetration: f64) -> bool {
        penetration < self.rect.h - 10.0
    }

    /// Try to trigger the block. `None` if it is used or the bump was too deep.
    pub fn hit(&mut self, penetration: f64, form: Form, params: &SimParams) -> Option<BlockReward> {
        if self.used || !self.struck_from_below(penetration) {
            return None;
        }
        self.used = true;
        Some(match self.contains {
            BlockContents::PowerUp => BlockReward::PowerUp(PowerUp::emerge(&self.rect, PowerUpKind::for_form(form), params)),
            BlockContents::Coin => BlockReward::Coin,
        })
    }
}

// ---------------------------------------------------------------------------
// GoalTrigger
// ---------------------------------------------------------------------------

/// The goal pole. Touching it starts the end-of-level slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalTrigger {
    pub rect: Rect,
    /// Ground level under the pole; the slide ends when the player's bottom reaches it.
    pub base_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(contains: BlockContents) -> InteractiveBlock {
        InteractiveBlock::new(Rect::new(600.0, 272.0, 40.0, 40.0), contains)
    }

    #[test]
    fn block_is_a_one_shot_latch() {
        let params = SimParams::default();
        let mut b = block(BlockContents::PowerUp);
        let first = b.hit(5.0, Form::Small, &params);
        assert!(matches!(
            first,
            Some(BlockReward::PowerUp(PowerUp {
                kind: PowerUpKind::Mushroom,
                ..
            }))
        ));
        assert!(b.used);
        assert_eq!(b.hit(5.0, Form::Small, &params), None);
    }

    #[test]
    fn deep_bump_does_not_trigger() {
        let params = SimParams::default();
        let mut b = block(BlockContents::Coin);
        assert_eq!(b.hit(30.0, Form::Big, &params), None);
        assert!(!b.used);
        assert_eq!(b.hit(29.0, Form::Big, &params), Some(BlockReward::Coin));
    }

    #[test]
    fn powered_player_gets_flower() {
        let params = SimParams::default();
        let mut b = block(BlockContents::PowerUp);
        match b.hit(1.0, Form::Big, &params) {
            Some(BlockReward::PowerUp(p)) => {
                assert_eq!(p.kind, PowerUpKind::FireFlower);
                assert_eq!(p.body.gravity, Some(0.0));
                assert_eq!(p.body.rect.bottom(), 272.0);
            }
            other => panic!("expected a power-up, got {other:?}"),
        }
    }

    #[test]
    fn mushroom_slides() {
        let params = SimParams::default();
        let m = PowerUp::emerge(&Rect::new(0.0, 100.0, 40.0, 40.0), PowerUpKind::Mushroom, &params);
        assert_eq!(m.body.vel.x, 2.0);
        assert_eq!(m.body.gravity, None);
    }
}
