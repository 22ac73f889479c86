//! Two-pass axis collision resolution against static geometry.
//!
//! [`resolve_axis_collisions`] moves a body out of the level geometry after
//! integration. The order is fixed and matters for determinism:
//!
//! 1. **Vertical pass** on the integrated AABB: a falling body lands on the
//!    tile top, a rising body bumps its head on the tile bottom. A miss
//!    clears `on_ground`.
//! 2. **Horizontal pass** on the *vertically corrected* AABB: the body is
//!    pushed out of the tile on the side it was moving toward.
//!
//! Only the first solid the query returns is resolved per axis per tick.
//! This is not swept collision; it relies on per-tick velocities being
//! small relative to tile size.
//!
//! Instead of callbacks, every resolution is reported as a
//! [`CollisionEvent`] that the caller interprets (question blocks react to
//! [`CollisionKind::HeadBump`], walkers turn around on
//! [`CollisionKind::Blocked`], and so on).

use serde::{Deserialize, Serialize};

use crate::entity::{Body, EntityId, Facing};
use crate::geometry::{overlap_down, overlap_left, overlap_right, overlap_up, Rect};
use crate::tiles::{TileHit, TileQuery};

/// What the resolver did to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Falling body pushed up onto the tile top.
    Landed,
    /// Rising body pushed down below the tile bottom.
    HeadBump,
    /// Horizontal motion stopped; the payload is the side that hit the tile.
    Blocked(Facing),
}

/// A single resolution performed on one entity against one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub entity: EntityId,
    pub tile: TileHit,
    pub kind: CollisionKind,
    /// How far the body was pushed back (before the push).
    pub penetration: f64,
    /// Velocity along the resolved axis just before it was zeroed.
    pub impact_speed: f64,
}

/// Resolve `body` against `geometry`, mutating position, velocity and
/// `on_ground` in place. Returns the resolutions performed (0–2 events).
pub fn resolve_axis_collisions<Q>(entity: EntityId, body: &mut Body, geometry: &Q) -> Vec<CollisionEvent>
where
    Q: TileQuery + ?Sized,
{
    let mut events = Vec::new();

    // Vertical pass.
    match geometry.query(&body.rect).filter(|hit| hit.solid) {
        Some(hit) => {
            if body.vel.y > 0.0 {
                let penetration = overlap_down(&body.rect, &hit.rect);
                body.rect.y -= penetration;
                events.push(CollisionEvent {
                    entity,
                    tile: hit,
                    kind: CollisionKind::Landed,
                    penetration,
                    impact_speed: body.vel.y,
                });
                body.vel.y = 0.0;
                body.on_ground = true;
            } else if body.vel.y < 0.0 {
                let penetration = overlap_up(&body.rect, &hit.rect);
                body.rect.y += penetration;
                events.push(CollisionEvent {
                    entity,
                    tile: hit,
                    kind: CollisionKind::HeadBump,
                    penetration,
                    impact_speed: body.vel.y,
                });
                body.vel.y = 0.0;
            }
        }
        None => body.on_ground = false,
    }

    // Horizontal pass, re-probed at the corrected position.
    if let Some(hit) = geometry.query(&body.rect).filter(|hit| hit.solid) {
        if body.vel.x > 0.0 {
            let penetration = overlap_right(&body.rect, &hit.rect);
            body.rect.x -= penetration;
            events.push(CollisionEvent {
                entity,
                tile: hit,
                kind: CollisionKind::Blocked(Facing::Right),
                penetration,
                impact_speed: body.vel.x,
            });
            body.vel.x = 0.0;
        } else if body.vel.x < 0.0 {
            let penetration = overlap_left(&body.rect, &hit.rect);
            body.rect.x += penetration;
            events.push(CollisionEvent {
                entity,
                tile: hit,
                kind: CollisionKind::Blocked(Facing::Left),
                penetration,
                impact_speed: body.vel.x,
            });
            body.vel.x = 0.0;
        }
    }

    events
}

/// Whether there is solid ground just past the leading edge of `body`.
///
/// Probes a 2×2 rectangle 4 units beyond the edge in `facing` direction and
/// 1 unit below the feet. Walkers use this to turn around at ledges.
pub fn ground_ahead<Q>(body: &Body, facing: Facing, geometry: &Q) -> bool
where
    Q: TileQuery + ?Sized,
{
    let ahead_x = match facing {
        Facing::Left => body.rect.left() - 4.0,
        Facing::Right => body.rect.right() + 4.0,
    };
    let foot = Rect::new(ahead_x, body.rect.bottom() + 1.0, 2.0, 2.0);
    geometry.query(&foot).is_some_and(|hit| hit.solid)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{integrate, GRAVITY};
    use crate::tiles::{Solid, StaticGeometry, TileKind};

    const ID: EntityId = EntityId::new(1);

    fn platform(rect: Rect) -> StaticGeometry {
        StaticGeometry::new(vec![Solid {
            rect,
            kind: TileKind::Ground,
        }])
    }

    #[test]
    fn falling_body_lands_exactly_on_top() {
        // Platform top sits 3 units below the body's pre-step bottom.
        let geo = platform(Rect::new(0.0, 103.0, 200.0, 40.0));
        let mut body = Body::new(Rect::new(10.0, 52.0, 20.0, 48.0))
            .with_velocity(0.0, 5.0)
            .with_gravity(0.0);

        integrate(&mut body, 1.0, GRAVITY);
        let events = resolve_axis_collisions(ID, &mut body, &geo);

        assert_eq!(body.rect.bottom(), 103.0);
        assert_eq!(body.vel.y, 0.0);
        assert!(body.on_ground);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CollisionKind::Landed);
        assert_eq!(events[0].penetration, 2.0);
        assert_eq!(events[0].impact_speed, 5.0);
    }

    #[test]
    fn resting_body_never_sinks() {
        let geo = platform(Rect::new(0.0, 432.0, 1000.0, 64.0));
        let mut body = Body::new(Rect::new(100.0, 384.0, 40.0, 48.0));
        for _ in 0..200 {
            integrate(&mut body, 1.0, GRAVITY);
            resolve_axis_collisions(ID, &mut body, &geo);
            assert_eq!(body.rect.y, 384.0);
            assert_eq!(body.vel.y, 0.0);
            assert!(body.on_ground);
        }
    }

    #[test]
    fn rising_body_bumps_head() {
        let geo = platform(Rect::new(0.0, 0.0, 100.0, 40.0));
        let mut body = Body::new(Rect::new(10.0, 36.0, 20.0, 48.0)).with_velocity(0.0, -6.0);
        let events = resolve_axis_collisions(ID, &mut body, &geo);

        assert_eq!(body.rect.top(), 40.0);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(events[0].kind, CollisionKind::HeadBump);
        assert_eq!(events[0].penetration, 4.0);
    }

    #[test]
    fn airborne_miss_clears_on_ground() {
        let mut body = Body::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        body.on_ground = true;
        let events = resolve_axis_collisions(ID, &mut body, &());
        assert!(events.is_empty());
        assert!(!body.on_ground);
    }

    #[test]
    fn horizontal_pass_uses_corrected_position() {
        // Ground first, then a wall standing on it.
        let geo = StaticGeometry::new(vec![
            Solid {
                rect: Rect::new(0.0, 100.0, 400.0, 40.0),
                kind: TileKind::Ground,
            },
            Solid {
                rect: Rect::new(50.0, 52.0, 48.0, 48.0),
                kind: TileKind::Stair,
            },
        ]);
        // Walking right into the wall while sinking 0.5 into the ground.
        let mut body = Body::new(Rect::new(13.0, 52.5, 40.0, 48.0)).with_velocity(5.0, 0.5);
        let events = resolve_axis_collisions(ID, &mut body, &geo);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, CollisionKind::Landed);
        assert_eq!(events[1].kind, CollisionKind::Blocked(Facing::Right));
        assert_eq!(body.rect.right(), 50.0);
        assert_eq!(body.rect.bottom(), 100.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn moving_left_is_pushed_right() {
        let geo = platform(Rect::new(0.0, 0.0, 50.0, 100.0));
        let mut body = Body::new(Rect::new(47.0, 10.0, 20.0, 20.0)).with_velocity(-3.0, 0.0);
        let events = resolve_axis_collisions(ID, &mut body, &geo);
        assert_eq!(body.rect.left(), 50.0);
        assert_eq!(body.vel.x, 0.0);
        assert_eq!(events.last().map(|e| e.kind), Some(CollisionKind::Blocked(Facing::Left)));
    }

    #[test]
    fn only_first_solid_is_resolved_per_axis() {
        let geo = StaticGeometry::new(vec![
            Solid {
                rect: Rect::new(0.0, 100.0, 30.0, 40.0),
                kind: TileKind::Ground,
            },
            Solid {
                rect: Rect::new(30.0, 98.0, 30.0, 40.0),
                kind: TileKind::Brick,
            },
        ]);
        let mut body = Body::new(Rect::new(20.0, 55.0, 20.0, 48.0)).with_velocity(0.0, 3.0);
        let events = resolve_axis_collisions(ID, &mut body, &geo);
        // Landed on the first tile even though the second one is higher.
        assert_eq!(events[0].tile.tile.0, 0);
        assert_eq!(body.rect.bottom(), 100.0);
    }

    #[test]
    fn ground_ahead_detects_ledge() {
        let geo = platform(Rect::new(0.0, 100.0, 100.0, 40.0));
        let body = Body::new(Rect::new(40.0, 52.0, 40.0, 48.0));
        assert!(ground_ahead(&body, Facing::Left, &geo));
        // Right edge at 80, probe at 84..86 still on ground (ends at 100).
        assert!(ground_ahead(&body, Facing::Right, &geo));

        let near_edge = Body::new(Rect::new(55.0, 52.0, 40.0, 48.0));
        // Right edge at 95, probe at 99..101 overlaps ground up to 100.
        assert!(ground_ahead(&near_edge, Facing::Right, &geo));
        let over_edge = Body::new(Rect::new(58.0, 52.0, 40.0, 48.0));
        assert!(!ground_ahead(&over_edge, Facing::Right, &geo));
    }
}
