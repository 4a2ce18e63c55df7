//! Endless-runner game loop.
//!
//! [`GameLoop::frame`] is one update + render pass. It is driven by the
//! browser's animation-frame chain in `web`, but has no browser dependency of
//! its own: tests drive it with synthetic timestamps and a recording renderer.
//!
//! Per frame: elapsed score, clear, background, character, obstacles,
//! character update, obstacle update (while obstacles move), collision check,
//! score overlays.

use rand::Rng;

use crate::config::{GameConfig, Viewport};
use crate::render::{Point, Renderer, obstacle_opacity};

pub mod character;
pub mod collision;
pub mod obstacles;

pub use character::Character;
pub use obstacles::{Obstacle, ObstacleSpawner};

// --- State ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    /// Crashed; frozen until the restart timer (or a visibility loss) resets.
    Over,
}

/// Everything a run mutates. Owned by [`GameLoop`]; components receive it by
/// reference.
#[derive(Debug, Clone)]
pub struct GameState {
    pub viewport: Viewport,
    pub character: Character,
    pub spawner: ObstacleSpawner,
    /// Whole seconds survived; the live score.
    pub elapsed_secs: u32,
    /// Timestamp of the first frame of this run.
    pub start_ms: Option<f64>,
    pub phase: RunPhase,
    pub obstacles_moving: bool,
    /// Obstacle velocity in px/frame, constant for a run.
    pub game_speed: f64,
    /// Cached best score shown in the overlay.
    pub high_score: u32,
    /// Bumped by every reset; lets stale restart requests be ignored.
    pub generation: u64,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, viewport: Viewport, now_ms: f64, rng: &mut R) -> Self {
        Self {
            viewport,
            character: Character::new(config, viewport),
            spawner: ObstacleSpawner::new(config, now_ms, rng),
            elapsed_secs: 0,
            start_ms: None,
            phase: RunPhase::Running,
            obstacles_moving: true,
            game_speed: config.game_speed,
            high_score: 0,
            generation: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::Over
    }
}

/// Result of a crash, handed to the shell for persistence and the restart timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crash {
    pub score: u32,
    /// Set when `score` beat the cached high score; the shell persists it.
    pub new_high_score: Option<u32>,
    /// Run generation the crash belongs to.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Still running; schedule the next frame.
    Continue,
    /// Crashed on this frame; stop scheduling and start the restart timer.
    GameOver(Crash),
    /// The run was already over; nothing was updated or drawn.
    Halted,
}

// --- Loop -------------------------------------------------------------------

pub struct GameLoop<R: Rng> {
    config: GameConfig,
    state: GameState,
    rng: R,
}

impl<R: Rng> GameLoop<R> {
    pub fn new(config: GameConfig, viewport: Viewport, now_ms: f64, mut rng: R) -> Self {
        let state = GameState::new(&config, viewport, now_ms, &mut rng);
        Self { config, state, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    /// Player input. Ignored while the run is over.
    pub fn apply_jump(&mut self) {
        if !self.state.is_over() {
            self.state.character.apply_jump();
        }
    }

    /// Merge a value read from the score store into the cached high score.
    /// A run that already beat the stored value keeps its own score.
    pub fn apply_stored_high_score(&mut self, stored: u32) {
        self.state.high_score = self.state.high_score.max(stored);
    }

    /// Reset every per-run value unconditionally and start a new run. Returns
    /// the new run generation. The cached high score survives.
    pub fn reset_and_start(&mut self, now_ms: f64) -> u64 {
        let state = &mut self.state;
        state.character = Character::new(&self.config, state.viewport);
        state.spawner = ObstacleSpawner::new(&self.config, now_ms, &mut self.rng);
        state.elapsed_secs = 0;
        state.start_ms = None;
        state.phase = RunPhase::Running;
        state.obstacles_moving = true;
        state.game_speed = self.config.game_speed;
        state.generation += 1;
        console_log!("Game Started!");
        state.generation
    }

    /// Reset only if nothing else reset the game since `generation` was issued.
    /// Collapses a crash timer and a visibility-loss restart into one reset.
    pub fn restart_if_current(&mut self, generation: u64, now_ms: f64) -> bool {
        if self.state.generation != generation {
            return false;
        }
        self.reset_and_start(now_ms);
        true
    }

    /// One update + render pass for the animation frame at `now_ms`.
    pub fn frame<D: Renderer + ?Sized>(&mut self, now_ms: f64, renderer: &mut D) -> FrameOutcome {
        if self.state.is_over() {
            return FrameOutcome::Halted;
        }
        let start = *self.state.start_ms.get_or_insert(now_ms);
        self.state.elapsed_secs = ((now_ms - start).max(0.0) / 1000.0).floor() as u32;

        self.draw_scene(renderer);

        self.state.character.update();
        if self.state.obstacles_moving {
            let GameState { spawner, game_speed, viewport, .. } = &mut self.state;
            spawner.update(now_ms, *game_speed, *viewport, &mut self.rng);
        }
        let crash = collision::check_collisions(&mut self.state, &self.config);

        self.draw_scores(renderer);

        match crash {
            Some(crash) => FrameOutcome::GameOver(crash),
            None => FrameOutcome::Continue,
        }
    }

    fn draw_scene<D: Renderer + ?Sized>(&self, renderer: &mut D) {
        renderer.clear();
        renderer.draw_background();
        renderer.draw_character(self.state.character.rect());
        let width = self.state.viewport.width;
        for obstacle in self.state.spawner.obstacles() {
            renderer.draw_obstacle(obstacle.rect(), obstacle_opacity(obstacle.x, width));
        }
    }

    fn draw_scores<D: Renderer + ?Sized>(&self, renderer: &mut D) {
        let Viewport { width, height } = self.state.viewport;
        renderer.draw_text(
            &format!("Score: {}s", self.state.elapsed_secs),
            Point::new(width * 0.1, height * 0.47),
        );
        renderer.draw_text(
            &format!("High Score: {}s", self.state.high_score),
            Point::new(width * 0.1, height * 0.5),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rect;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Background,
        Character(Rect),
        Obstacle(Rect, f64),
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Renderer for Recorder {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }
        fn draw_background(&mut self) {
            self.calls.push(Call::Background);
        }
        fn draw_character(&mut self, rect: Rect) {
            self.calls.push(Call::Character(rect));
        }
        fn draw_obstacle(&mut self, rect: Rect, opacity: f64) {
            self.calls.push(Call::Obstacle(rect, opacity));
        }
        fn draw_text(&mut self, content: &str, _position: Point) {
            self.calls.push(Call::Text(content.to_string()));
        }
    }

    fn game() -> GameLoop<StdRng> {
        GameLoop::new(
            GameConfig::default(),
            Viewport::new(800.0, 600.0),
            0.0,
            StdRng::seed_from_u64(11),
        )
    }

    /// Obstacle sitting right on top of the character.
    fn place_obstacle_on_character(g: &mut GameLoop<StdRng>) {
        let c = g.state().character.rect();
        g.state_mut().spawner.push_for_test(Obstacle {
            x: c.x,
            y: c.y,
            width: 50.0,
            height: 50.0,
            spawned_at_ms: 0.0,
        });
    }

    #[test]
    fn elapsed_is_floored_seconds_from_first_frame() {
        let mut g = game();
        let mut r = Recorder::default();
        g.frame(500.0, &mut r);
        assert_eq!(g.state().start_ms, Some(500.0));
        assert_eq!(g.state().elapsed_secs, 0);
        g.frame(1_499.0, &mut r);
        assert_eq!(g.state().elapsed_secs, 0);
        g.frame(2_600.0, &mut r);
        assert_eq!(g.state().elapsed_secs, 2);
    }

    #[test]
    fn draw_order_is_scene_then_scores() {
        let mut g = game();
        g.state_mut().spawner.push_for_test(Obstacle {
            x: 400.0,
            y: 450.0,
            width: 50.0,
            height: 50.0,
            spawned_at_ms: 0.0,
        });
        let mut r = Recorder::default();
        assert_eq!(g.frame(0.0, &mut r), FrameOutcome::Continue);
        assert_eq!(r.calls[0], Call::Clear);
        assert_eq!(r.calls[1], Call::Background);
        assert!(matches!(r.calls[2], Call::Character(_)));
        assert_eq!(r.calls[3], Call::Obstacle(Rect::new(400.0, 450.0, 50.0, 50.0), 1.0));
        assert_eq!(r.calls[4], Call::Text("Score: 0s".into()));
        assert_eq!(r.calls[5], Call::Text("High Score: 0s".into()));
        assert_eq!(r.calls.len(), 6);
    }

    #[test]
    fn crash_ends_run_and_reports_new_high_score() {
        let mut g = game();
        let mut r = Recorder::default();
        g.frame(0.0, &mut r);
        place_obstacle_on_character(&mut g);
        let outcome = g.frame(3_200.0, &mut r);
        assert_eq!(
            outcome,
            FrameOutcome::GameOver(Crash { score: 3, new_high_score: Some(3), generation: 0 })
        );
        let s = g.state();
        assert!(s.is_over());
        assert!(!s.obstacles_moving);
        assert_eq!(s.character.y, 700.0);
        assert_eq!(s.high_score, 3);
        assert_eq!(r.calls.last(), Some(&Call::Text("High Score: 3s".into())));
    }

    #[test]
    fn crash_below_high_score_does_not_report() {
        let mut g = game();
        g.apply_stored_high_score(10);
        let mut r = Recorder::default();
        g.frame(0.0, &mut r);
        place_obstacle_on_character(&mut g);
        match g.frame(5_000.0, &mut r) {
            FrameOutcome::GameOver(crash) => {
                assert_eq!(crash.score, 5);
                assert_eq!(crash.new_high_score, None);
            }
            other => panic!("expected game over, got {other:?}"),
        }
        assert_eq!(g.state().high_score, 10);
    }

    #[test]
    fn equal_score_is_not_a_new_high() {
        let mut g = game();
        g.apply_stored_high_score(4);
        let mut r = Recorder::default();
        g.frame(0.0, &mut r);
        place_obstacle_on_character(&mut g);
        let FrameOutcome::GameOver(crash) = g.frame(4_000.0, &mut r) else {
            panic!("expected game over");
        };
        assert_eq!(crash.new_high_score, None);
    }

    #[test]
    fn frames_after_crash_are_halted() {
        let mut g = game();
        let mut r = Recorder::default();
        place_obstacle_on_character(&mut g);
        assert!(matches!(g.frame(0.0, &mut r), FrameOutcome::GameOver(_)));
        r.calls.clear();
        assert_eq!(g.frame(16.0, &mut r), FrameOutcome::Halted);
        assert!(r.calls.is_empty());
    }

    #[test]
    fn jump_ignored_while_over() {
        let mut g = game();
        let mut r = Recorder::default();
        place_obstacle_on_character(&mut g);
        g.frame(0.0, &mut r);
        g.apply_jump();
        assert!(!g.state().character.airborne);
    }

    #[test]
    fn reset_restores_fresh_run_and_keeps_high_score() {
        let mut g = game();
        let mut r = Recorder::default();
        g.frame(0.0, &mut r);
        place_obstacle_on_character(&mut g);
        g.frame(7_000.0, &mut r);
        let generation = g.reset_and_start(9_000.0);
        assert_eq!(generation, 1);
        let s = g.state();
        assert_eq!(s.phase, RunPhase::Running);
        assert!(s.obstacles_moving);
        assert!(s.spawner.obstacles().is_empty());
        assert!(s.spawner.next_spawn_ms() >= 9_900.0);
        assert_eq!(s.start_ms, None);
        assert_eq!(s.elapsed_secs, 0);
        assert_eq!(s.character.y, s.character.ground_y());
        assert_eq!(s.high_score, 7);
    }

    #[test]
    fn stale_restart_is_ignored() {
        let mut g = game();
        let mut r = Recorder::default();
        place_obstacle_on_character(&mut g);
        let FrameOutcome::GameOver(crash) = g.frame(0.0, &mut r) else {
            panic!("expected game over");
        };
        // visibility loss resets first, then the crash timer fires
        g.reset_and_start(100.0);
        assert!(!g.restart_if_current(crash.generation, 2_000.0));
        assert_eq!(g.generation(), 1);
        assert!(g.restart_if_current(1, 2_100.0));
        assert_eq!(g.generation(), 2);
    }

    #[test]
    fn obstacles_freeze_while_disabled() {
        let mut g = game();
        g.state_mut().spawner.push_for_test(Obstacle {
            x: 600.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
            spawned_at_ms: 0.0,
        });
        g.state_mut().obstacles_moving = false;
        let mut r = Recorder::default();
        g.frame(0.0, &mut r);
        g.frame(16.0, &mut r);
        assert_eq!(g.state().spawner.obstacles()[0].x, 600.0);
    }

    #[test]
    fn stored_high_score_never_lowers_cache() {
        let mut g = game();
        g.apply_stored_high_score(12);
        g.apply_stored_high_score(3);
        assert_eq!(g.state().high_score, 12);
    }
}
