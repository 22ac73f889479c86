//! Player fireballs.

use serde::{Deserialize, Serialize};

use crate::collision::{CollisionEvent, CollisionKind};
use crate::entity::{Body, Facing};
use crate::geometry::Rect;
use crate::params::SimParams;

/// A bouncing fireball thrown by a `Fire`-form player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    /// Set by the first ground landing.
    pub bounced: bool,
    /// Spent: hit an enemy, a wall, landed twice or left the view.
    pub hit: bool,
}

impl Projectile {
    /// Launch from `(x, y)` toward `facing`.
    pub fn launch(x: f64, y: f64, facing: Facing, params: &SimParams) -> Self {
        let size = params.fireball_size;
        Self {
            body: Body::new(Rect::new(x, y, size, size))
                .with_velocity(facing.sign() * params.fireball_speed, params.fireball_launch_vy)
                .with_gravity(params.fireball_gravity),
            bounced: false,
            hit: false,
        }
    }

    /// React to this tick's resolutions: bounce once, burn out on the second
    /// landing or on any wall.
    pub fn after_resolve(&mut self, collisions: &[CollisionEvent], params: &SimParams) {
        for event in collisions {
            match event.kind {
                CollisionKind::Landed if !self.bounced => {
                    self.body.vel.y = -event.impact_speed * params.fireball_bounce_damping;
                    self.body.on_ground = false;
                    self.bounced = true;
                }
                CollisionKind::Landed | CollisionKind::Blocked(_) => self.hit = true,
                CollisionKind::HeadBump => {}
            }
        }
    }

    /// Cull once `x` leaves `[camera_x - margin, camera_x + view_width + margin]`.
    pub fn cull(&mut self, camera_x: f64, view_width: f64, params: &SimParams) {
        let x = self.body.rect.x;
        if x < camera_x - params.fireball_cull_margin || x > camera_x + view_width + params.fireball_cull_margin {
            self.hit = true;
        }
    }
}
