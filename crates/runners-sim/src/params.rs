//! Gameplay tunables.
//!
//! [`SimParams::default`] is the tuning the levels were built around: a
//! reference frame is 16 ms and every speed below is in world units per such
//! frame.

use serde::{Deserialize, Serialize};

use crate::enemy::RevivePolicy;
use crate::SimError;

/// Every constant the simulation rules depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Default gravity for bodies without an override.
    pub gravity: f64,

    // -- player -------------------------------------------------------------
    /// Horizontal run speed.
    pub player_speed: f64,
    /// Initial vertical velocity of a jump (negative is up).
    pub jump_power: f64,
    /// Divisor applied to `jump_power` for the bounce after a stomp.
    pub stomp_bounce_divisor: f64,
    /// Ticks of invulnerability granted by a damage transition.
    pub invincibility_frames: u32,
    /// Downward velocity given to the player after hitting a block from below.
    pub block_bounce_vy: f64,

    // -- enemies ------------------------------------------------------------
    /// Maximum vertical penetration that still counts as a stomp on a patrol enemy.
    pub patrol_stomp_threshold: f64,
    /// Same, for shell enemies.
    pub shell_stomp_threshold: f64,
    /// Walking speed of a shell enemy after it revives.
    pub shell_walk_speed: f64,
    /// Speed of a kicked shell.
    pub shell_kick_speed: f64,
    /// Ticks after a stomp during which the player cannot kick the shell.
    pub shell_contact_cooldown: u32,
    /// How a shelled enemy comes back to life.
    pub revive: RevivePolicy,
    /// Combo kills per bonus life.
    pub combo_per_bonus_life: u32,

    // -- projectiles --------------------------------------------------------
    pub fireball_speed: f64,
    pub fireball_launch_vy: f64,
    pub fireball_gravity: f64,
    pub fireball_size: f64,
    /// Fraction of the impact speed kept by the ground bounce.
    pub fireball_bounce_damping: f64,
    /// How far past the visible area a fireball may travel before it is culled.
    pub fireball_cull_margin: f64,

    // -- power-ups ----------------------------------------------------------
    pub mushroom_speed: f64,

    // -- goal ---------------------------------------------------------------
    /// Vertical slide speed down the goal pole.
    pub goal_slide_speed: f64,
    /// Player x offset from the goal trigger's left edge while sliding.
    pub goal_snap_offset: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            gravity: crate::physics::GRAVITY,

            player_speed: 5.0,
            jump_power: -15.0,
            stomp_bounce_divisor: 1.6,
            invincibility_frames: 60,
            block_bounce_vy: 2.0,

            patrol_stomp_threshold: 18.0,
            shell_stomp_threshold: 20.0,
            shell_walk_speed: 1.0,
            shell_kick_speed: 8.0,
            shell_contact_cooldown: 8,
            revive: RevivePolicy::default(),
            combo_per_bonus_life: 8,

            fireball_speed: 8.0,
            fireball_launch_vy: -2.0,
            fireball_gravity: 0.25,
            fireball_size: 12.0,
            fireball_bounce_damping: 0.8,
            fireball_cull_margin: 200.0,

            mushroom_speed: 2.0,

            goal_slide_speed: 4.0,
            goal_snap_offset: -8.0,
        }
    }
}

impl SimParams {
    /// The upward velocity given to the player after a stomp.
    pub fn stomp_bounce_vy(&self) -> f64 {
        self.jump_power / self.stomp_bounce_divisor
    }

    /// Reject parameter sets the rules cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [
            ("gravity", self.gravity),
            ("player_speed", self.player_speed),
            ("jump_power", self.jump_power),
            ("block_bounce_vy", self.block_bounce_vy),
            ("shell_walk_speed", self.shell_walk_speed),
            ("shell_kick_speed", self.shell_kick_speed),
            ("fireball_speed", self.fireball_speed),
            ("fireball_launch_vy", self.fireball_launch_vy),
            ("fireball_gravity", self.fireball_gravity),
            ("fireball_bounce_damping", self.fireball_bounce_damping),
            ("fireball_cull_margin", self.fireball_cull_margin),
            ("mushroom_speed", self.mushroom_speed),
            ("goal_snap_offset", self.goal_snap_offset),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::InvalidParam {
                    name,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        let positive = [
            ("stomp_bounce_divisor", self.stomp_bounce_divisor),
            ("patrol_stomp_threshold", self.patrol_stomp_threshold),
            ("shell_stomp_threshold", self.shell_stomp_threshold),
            ("fireball_size", self.fireball_size),
            ("goal_slide_speed", self.goal_slide_speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::InvalidParam {
                    name,
                    reason: format!("must be positive and finite, got {value}"),
                });
            }
        }

        if self.combo_per_bonus_life == 0 {
            return Err(SimError::InvalidParam {
                name: "combo_per_bonus_life",
                reason: "must be at least 1".to_owned(),
            });
        }

        self.revive.validate()
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible area, as far as the core needs it.
///
/// Only used to derive the camera position (render-only) and the bounds
/// outside of which fireballs are culled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Render zoom; `1.5` shows a smaller slice of the world.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            zoom: 1.5,
        }
    }
}

impl Viewport {
    /// Camera left edge that centers the view on `focus_x`.
    pub fn camera_x(&self, focus_x: f64) -> f64 {
        focus_x - self.width / (2.0 * self.zoom)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [("viewport.width", self.width), ("viewport.height", self.height), ("viewport.zoom", self.zoom)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::InvalidParam {
                    name,
                    reason: format!("must be positive and finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
