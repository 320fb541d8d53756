//! Playfield geometry and the two kinds of bodies that live on it.
//!
//! All positions are in world units with the origin at the top-left corner
//! of the playfield and `y` growing downward.

/// Vertical clearance between the upper and lower half of a pipe.
pub const GAP_HEIGHT: f64 = 140.0;
/// Horizontal extent of every pipe.
pub const PIPE_WIDTH: f64 = 50.0;
/// Smallest allowed `top_height` of a freshly spawned pipe.
pub const PIPE_TOP_MARGIN: f64 = 20.0;
/// Space kept free under the lower pipe's top edge in the worst case.
pub const PIPE_BOTTOM_MARGIN: f64 = 100.0;

pub const BIRD_X: f64 = 50.0;
pub const BIRD_SIZE: f64 = 32.0;
pub const GRAVITY: f64 = 0.6;
pub const JUMP_IMPULSE: f64 = -10.0;

pub const MAX_FIELD_WIDTH: f64 = 400.0;
pub const MAX_FIELD_HEIGHT: f64 = 500.0;
/// Fraction of the viewport height the playfield may take.
pub const FIELD_HEIGHT_SHARE: f64 = 0.8;

// ── Playfield ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Playfield {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size the playfield for a viewport measured in world units.
    pub fn fit(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            width: viewport_w.min(MAX_FIELD_WIDTH).max(0.0),
            height: (viewport_h * FIELD_HEIGHT_SHARE).min(MAX_FIELD_HEIGHT).max(0.0),
        }
    }

    /// Map a uniform roll in `[0, 1)` onto the allowed `top_height` range
    /// `[20, height - 140 - 100 + 20)`.
    ///
    /// On playfields too short for that range every pipe opens at the top
    /// margin.
    pub fn pipe_top_for_roll(&self, roll: f64) -> f64 {
        let span = (self.height - GAP_HEIGHT - PIPE_BOTTOM_MARGIN).max(0.0);
        PIPE_TOP_MARGIN + roll.clamp(0.0, 1.0) * span
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(MAX_FIELD_WIDTH, MAX_FIELD_HEIGHT)
    }
}

// ── Bird ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub velocity: f64,
    pub gravity: f64,
    pub jump_impulse: f64,
}

impl Bird {
    /// A bird at rest, vertically centered on the playfield.
    pub fn spawn(field: &Playfield) -> Self {
        Self {
            x: BIRD_X,
            y: field.height / 2.0,
            size: BIRD_SIZE,
            velocity: 0.0,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
        }
    }

    /// One frame of gravity: velocity first, then position.
    pub fn integrate(&mut self) {
        self.velocity += self.gravity;
        self.y += self.velocity;
    }

    pub fn jump(&mut self) {
        self.velocity = self.jump_impulse;
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.size
    }

    pub fn right(&self) -> f64 {
        self.x + self.size
    }
}

// ── Pipe ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    top_height: f64,
    pub scored: bool,
}

impl Pipe {
    pub fn new(x: f64, top_height: f64) -> Self {
        Self {
            x,
            top_height,
            scored: false,
        }
    }

    /// Bottom edge of the upper obstacle.
    pub fn top_height(&self) -> f64 {
        self.top_height
    }

    /// Top edge of the lower obstacle. Always `top_height + GAP_HEIGHT`.
    pub fn bottom_start(&self) -> f64 {
        self.top_height + GAP_HEIGHT
    }

    pub fn right(&self) -> f64 {
        self.x + PIPE_WIDTH
    }

    /// True once the trailing edge has left the playfield on the left.
    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}
