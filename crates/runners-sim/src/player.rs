//! The player character: input handling, form progression and damage.

use serde::{Deserialize, Serialize};

use crate::entity::{Body, Facing};
use crate::geometry::Rect;
use crate::input::InputFrame;
use crate::items::PowerUpKind;
use crate::params::SimParams;

/// Player width in world units.
pub const PLAYER_WIDTH: f64 = 40.0;
/// Player height in world units.
pub const PLAYER_HEIGHT: f64 = 48.0;

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Power-up form. Damage walks it back down one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Form {
    Small,
    Big,
    Fire,
}

impl Form {
    /// Form after collecting `kind`.
    ///
    /// A mushroom only upgrades `Small`; a fire flower always yields `Fire`.
    pub fn upgraded(self, kind: PowerUpKind) -> Form {
        match (kind, self) {
            (PowerUpKind::Mushroom, Form::Small) => Form::Big,
            (PowerUpKind::Mushroom, form) => form,
            (PowerUpKind::FireFlower, _) => Form::Fire,
        }
    }

    /// Form after taking a hit, or `None` if the hit is fatal.
    pub fn downgraded(self) -> Option<Form> {
        match self {
            Form::Fire => Some(Form::Big),
            Form::Big => Some(Form::Small),
            Form::Small => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Damage
// ---------------------------------------------------------------------------

/// Result of [`Player::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Invincibility frames were active; nothing happened.
    Ignored,
    /// The player lost a form and became briefly invincible.
    Downgraded { from: Form, to: Form },
    /// The player was `Small` and died.
    Killed,
}

// ---------------------------------------------------------------------------
// GoalSlide
// ---------------------------------------------------------------------------

/// State of the scripted slide down the goal pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalSlide {
    /// Ground level the slide ends on (player bottom).
    pub base_y: f64,
    /// Set once the player has reached `base_y`.
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub form: Form,
    pub facing: Facing,
    /// Set by a jump, cleared when the resolver reports a landing.
    pub jumping: bool,
    /// Ticks of remaining invulnerability.
    pub invincibility_frames: u32,
    /// Fire trigger latch: a shot needs the fire control released in between.
    pub can_shoot: bool,
    pub alive: bool,
    /// `Some` once the goal has been reached; input is ignored from then on.
    pub goal: Option<GoalSlide>,
}

impl Player {
    /// A small player standing at `(x, y)` facing right.
    pub fn spawn(x: f64, y: f64) -> Self {
        Self {
            body: Body::new(Rect::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT)),
            form: Form::Small,
            facing: Facing::Right,
            jumping: false,
            invincibility_frames: 0,
            can_shoot: true,
            alive: true,
            goal: None,
        }
    }

    /// Whether the player still responds to input.
    pub fn is_controllable(&self) -> bool {
        self.alive && self.goal.is_none()
    }

    /// Apply one tick of input. Returns `true` when a fireball should be launched.
    ///
    /// Horizontal velocity is set directly (no acceleration). Left wins over
    /// right when both are held.
    pub fn apply_input(&mut self, input: &InputFrame, params: &SimParams) -> bool {
        if !self.is_controllable() {
            return false;
        }

        if input.left {
            self.body.vel.x = -params.player_speed;
            self.facing = Facing::Left;
        } else if input.right {
            self.body.vel.x = params.player_speed;
            self.facing = Facing::Right;
        } else {
            self.body.vel.x = 0.0;
        }

        if input.jump && !self.jumping {
            self.body.vel.y = params.jump_power;
            self.jumping = true;
        }

        if !input.fire {
            self.can_shoot = true;
            return false;
        }
        if self.form == Form::Fire && self.can_shoot {
            self.can_shoot = false;
            return true;
        }
        false
    }

    /// Take one hit.
    pub fn take_damage(&mut self, params: &SimParams) -> Damage {
        if self.invincibility_frames > 0 || !self.alive {
            return Damage::Ignored;
        }
        match self.form.downgraded() {
            Some(to) => {
                let from = self.form;
                self.form = to;
                self.invincibility_frames = params.invincibility_frames;
                Damage::Downgraded { from, to }
            }
            None => {
                self.alive = false;
                self.body.vel.x = 0.0;
                Damage::Killed
            }
        }
    }

    /// Collect a power-up. Returns the `(from, to)` forms.
    pub fn collect(&mut self, kind: PowerUpKind) -> (Form, Form) {
        let from = self.form;
        self.form = from.upgraded(kind);
        (from, self.form)
    }

    /// Bounce after stomping an enemy.
    pub fn stomp_bounce(&mut self, params: &SimParams) {
        self.body.vel.y = params.stomp_bounce_vy();
    }

    /// End-of-tick countdown.
    pub fn tick_timers(&mut self) {
        self.invincibility_frames = self.invincibility_frames.saturating_sub(1);
    }

    /// Start the scripted goal slide: freeze, snap to the pole.
    pub fn begin_goal_slide(&mut self, pole_x: f64, base_y: f64, params: &SimParams) {
        self.body.vel.x = 0.0;
        self.body.vel.y = 0.0;
        self.body.rect.x = pole_x + params.goal_snap_offset;
        self.jumping = false;
        self.goal = Some(GoalSlide {
            base_y,
            finished: false,
        });
    }

    /// Advance the goal slide. Returns `true` on the tick the player lands.
    pub fn advance_goal_slide(&mut self, dt: f64, params: &SimParams) -> bool {
        let Some(slide) = self.goal.as_mut() else {
            return false;
        };
        if slide.finished {
            return false;
        }
        self.body.rect.y += params.goal_slide_speed * dt;
        if self.body.rect.bottom() >= slide.base_y {
            self.body.rect.y = slide.base_y - self.body.rect.h;
            self.body.on_ground = true;
            slide.finished = true;
            return true;
        }
        false
    }

    /// Where a fireball thrown now starts, and which way it flies.
    pub fn fireball_origin(&self) -> (f64, f64, Facing) {
        let rect = &self.body.rect;
        let x = match self.facing {
            Facing::Right => rect.right(),
            Facing::Left => rect.left() - 10.0,
        };
        (x, rect.top() + 20.0, self.facing)
    }

    /// Sprite lookup key for the renderer.
    pub fn sprite_key(&self) -> &'static str {
        match self.form {
            Form::Small => "mario_small",
            Form::Big => "mario_big",
            Form::Fire => "mario_fire",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
