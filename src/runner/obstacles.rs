//! Obstacle spawner: scrolls obstacles left, culls the ones that left the
//! screen and appends new ones on a randomized real-time schedule.

use rand::Rng;

use crate::config::{GameConfig, Viewport};
use crate::render::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Timestamp (ms) of the frame that created this obstacle.
    pub spawned_at_ms: f64,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn off_screen(&self) -> bool {
        self.x + self.width <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    obstacles: Vec<Obstacle>,
    next_spawn_ms: f64,
    min_interval_ms: f64,
    max_interval_ms: f64,
    width: f64,
    height: f64,
    bottom_offset: f64,
}

impl ObstacleSpawner {
    /// Empty spawner whose first obstacle is due one random interval after `now_ms`.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, now_ms: f64, rng: &mut R) -> Self {
        let mut spawner = Self {
            obstacles: Vec::new(),
            next_spawn_ms: now_ms,
            min_interval_ms: config.min_spawn_interval_ms,
            max_interval_ms: config.max_spawn_interval_ms,
            width: config.obstacle_width,
            height: config.obstacle_height,
            bottom_offset: config.obstacle_bottom_offset,
        };
        spawner.next_spawn_ms = now_ms + spawner.random_interval(rng);
        spawner
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn next_spawn_ms(&self) -> f64 {
        self.next_spawn_ms
    }

    pub fn update<R: Rng + ?Sized>(&mut self, now_ms: f64, game_speed: f64, viewport: Viewport, rng: &mut R) {
        self.advance(game_speed);
        self.cull();
        if now_ms > self.next_spawn_ms {
            self.spawn(now_ms, viewport);
            self.next_spawn_ms = now_ms + self.random_interval(rng);
        }
    }

    fn advance(&mut self, game_speed: f64) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= game_speed;
        }
    }

    fn cull(&mut self) {
        self.obstacles.retain(|o| !o.off_screen());
    }

    fn spawn(&mut self, now_ms: f64, viewport: Viewport) {
        self.obstacles.push(Obstacle {
            x: viewport.width,
            y: viewport.height - self.bottom_offset,
            width: self.width,
            height: self.height,
            spawned_at_ms: now_ms,
        });
    }

    fn random_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_interval_ms <= self.min_interval_ms {
            return self.min_interval_ms;
        }
        rng.gen_range(self.min_interval_ms..=self.max_interval_ms)
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}
