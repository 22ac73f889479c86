//! Gravity and velocity integration.
//!
//! Time is measured in *frame multipliers*: `dt = 1.0` is one reference
//! 16 ms frame, so velocities are world units per tick and gravity is world
//! units per tick². Integration is explicit Euler with velocity updated
//! first, and it never clamps position. Collision resolution always runs
//! afterwards (see [`collision`](crate::collision)).

use crate::entity::Body;

/// Default downward acceleration, world units per tick².
pub const GRAVITY: f64 = 0.7;

/// The gravity acting on `body`: its override if set, else `default_gravity`.
#[inline]
pub fn gravity_of(body: &Body, default_gravity: f64) -> f64 {
    body.gravity.unwrap_or(default_gravity)
}

/// Advance `body` by one step of length `dt`.
///
/// `vy += g * dt; x += vx * dt; y += vy * dt`
pub fn integrate(body: &mut Body, dt: f64, default_gravity: f64) {
    body.vel.y += gravity_of(body, default_gravity) * dt;
    body.rect.x += body.vel.x * dt;
    body.rect.y += body.vel.y * dt;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn one_tick_from_rest_matches_closed_form() {
        let mut body = Body::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        integrate(&mut body, 1.0, GRAVITY);
        assert!((body.vel.y - 0.7).abs() < 1e-12);
        assert!((body.rect.y - 0.7).abs() < 1e-12);
        assert_eq!(body.rect.x, 0.0);
    }

    #[test]
    fn n_ticks_accumulate_triangular_sum() {
        let mut body = Body::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_velocity(2.0, 0.0);
        let n = 10;
        for _ in 0..n {
            integrate(&mut body, 1.0, GRAVITY);
        }
        // vy_n = n*g, y_n = g * n(n+1)/2
        let expected_y = GRAVITY * (n * (n + 1)) as f64 / 2.0;
        assert!((body.vel.y - GRAVITY * n as f64).abs() < 1e-9);
        assert!((body.rect.y - expected_y).abs() < 1e-9);
        assert_eq!(body.rect.x, 20.0);
    }

    #[test]
    fn gravity_override_wins() {
        let mut body = Body::new(Rect::new(0.0, 0.0, 1.0, 1.0)).with_gravity(0.0);
        integrate(&mut body, 1.0, GRAVITY);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.rect.y, 0.0);
    }

    #[test]
    fn dt_scales_the_step() {
        let mut body = Body::new(Rect::new(0.0, 0.0, 1.0, 1.0)).with_velocity(4.0, 0.0);
        integrate(&mut body, 0.5, 2.0);
        assert_eq!(body.vel.y, 1.0);
        assert_eq!(body.rect.x, 2.0);
        assert_eq!(body.rect.y, 0.5);
    }
}
