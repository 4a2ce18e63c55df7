//! Tuning constants for a run. Everything is in CSS pixels, pixels per frame
//! or milliseconds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tuning values.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Character
    pub const CHARACTER_X_RATIO: f64 = 0.2;
    pub const CHARACTER_WIDTH: f64 = 50.0;
    pub const CHARACTER_HEIGHT: f64 = 50.0;
    pub const JUMP_IMPULSE: f64 = -10.0;
    pub const GRAVITY: f64 = 0.3;
    pub const GROUND_OFFSET: f64 = 100.0;
    /// How far below the bottom edge a knocked-out character is parked.
    pub const KNOCKOUT_DROP: f64 = 100.0;

    // Obstacles
    pub const OBSTACLE_WIDTH: f64 = 50.0;
    pub const OBSTACLE_HEIGHT: f64 = 50.0;
    pub const OBSTACLE_BOTTOM_OFFSET: f64 = 150.0;
    pub const GAME_SPEED: f64 = 2.0;
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 900.0;
    pub const MAX_SPAWN_INTERVAL_MS: f64 = 3000.0;

    // Collision / restart
    pub const HITBOX_MARGIN: f64 = 15.0;
    pub const RESTART_DELAY_MS: i32 = 2000;
}

/// Per-run configuration. `Default` mirrors [`Params`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub character_x_ratio: f64,
    pub character_width: f64,
    pub character_height: f64,
    pub jump_impulse: f64,
    pub gravity: f64,
    pub ground_offset: f64,
    pub knockout_drop: f64,
    pub obstacle_width: f64,
    pub obstacle_height: f64,
    pub obstacle_bottom_offset: f64,
    pub game_speed: f64,
    pub min_spawn_interval_ms: f64,
    pub max_spawn_interval_ms: f64,
    pub hitbox_margin: f64,
    pub restart_delay_ms: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            character_x_ratio: Params::CHARACTER_X_RATIO,
            character_width: Params::CHARACTER_WIDTH,
            character_height: Params::CHARACTER_HEIGHT,
            jump_impulse: Params::JUMP_IMPULSE,
            gravity: Params::GRAVITY,
            ground_offset: Params::GROUND_OFFSET,
            knockout_drop: Params::KNOCKOUT_DROP,
            obstacle_width: Params::OBSTACLE_WIDTH,
            obstacle_height: Params::OBSTACLE_HEIGHT,
            obstacle_bottom_offset: Params::OBSTACLE_BOTTOM_OFFSET,
            game_speed: Params::GAME_SPEED,
            min_spawn_interval_ms: Params::MIN_SPAWN_INTERVAL_MS,
            max_spawn_interval_ms: Params::MAX_SPAWN_INTERVAL_MS,
            hitbox_margin: Params::HITBOX_MARGIN,
            restart_delay_ms: Params::RESTART_DELAY_MS,
        }
    }
}

impl GameConfig {
    /// Parse a partial JSON override; missing fields keep their defaults.
    /// Swapped spawn bounds are put back in order.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        Ok(cfg.normalized())
    }

    pub fn normalized(mut self) -> Self {
        if self.min_spawn_interval_ms > self.max_spawn_interval_ms {
            std::mem::swap(&mut self.min_spawn_interval_ms, &mut self.max_spawn_interval_ms);
        }
        self
    }
}

/// Size of the drawing surface, captured once at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
