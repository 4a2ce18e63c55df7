// Character controller: jump impulse plus gravity with a hard floor.
use crate::config::{GameConfig, Viewport};
use crate::render::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Vertical velocity in px/frame; negative is upward.
    pub velocity: f64,
    pub jump_impulse: f64,
    pub gravity: f64,
    pub airborne: bool,
    ground_y: f64,
}

impl Character {
    /// Standing on the ground line at its configured horizontal position.
    pub fn new(config: &GameConfig, viewport: Viewport) -> Self {
        let ground_y = viewport.height - config.character_height - config.ground_offset;
        Self {
            x: viewport.width * config.character_x_ratio,
            y: ground_y,
            width: config.character_width,
            height: config.character_height,
            velocity: 0.0,
            jump_impulse: config.jump_impulse,
            gravity: config.gravity,
            airborne: false,
            ground_y,
        }
    }

    /// Highest y (lowest on screen) the character may rest at.
    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Start a jump. Ignored mid-air, so there is no double jump.
    pub fn apply_jump(&mut self) {
        if !self.airborne {
            self.airborne = true;
            self.velocity = self.jump_impulse;
        }
    }

    pub fn update(&mut self) {
        if !self.airborne {
            return;
        }
        self.velocity += self.gravity;
        self.y += self.velocity;
        if self.y > self.ground_y {
            self.y = self.ground_y;
            self.velocity = 0.0;
            self.airborne = false;
        }
    }

    /// Park the character below the visible area after a crash.
    pub fn knock_out(&mut self, viewport: Viewport, drop: f64) {
        self.y = viewport.height + drop;
        self.velocity = 0.0;
        self.airborne = false;
    }
}
