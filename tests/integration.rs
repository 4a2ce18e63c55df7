// Integration tests (native) for the `dino-run` crate.
// These drive the game loop with synthetic frame timestamps and the in-memory
// score store, so they run under `cargo test` on the host without a browser.

use dino_run::{
    FrameOutcome, GameConfig, GameLoop, MemoryStore, Point, Rect, Renderer, ScoreStore, Viewport,
    submit_score,
};
use futures::executor::block_on;
use rand::SeedableRng;
use rand::rngs::StdRng;

const FRAME_MS: f64 = 16.0;

/// Counts draw calls; only obstacles matter for these tests.
#[derive(Default)]
struct CountingRenderer {
    obstacles_drawn: usize,
}

impl Renderer for CountingRenderer {
    fn clear(&mut self) {}
    fn draw_background(&mut self) {}
    fn draw_character(&mut self, _rect: Rect) {}
    fn draw_obstacle(&mut self, _rect: Rect, _opacity: f64) {
        self.obstacles_drawn += 1;
    }
    fn draw_text(&mut self, _content: &str, _position: Point) {}
}

fn new_game(seed: u64) -> GameLoop<StdRng> {
    GameLoop::new(
        GameConfig::default(),
        Viewport::new(800.0, 600.0),
        0.0,
        StdRng::seed_from_u64(seed),
    )
}

/// Run frames without jumping until the character hits a tree.
fn run_until_crash(game: &mut GameLoop<StdRng>, start_ms: f64) -> (dino_run::Crash, f64) {
    let mut renderer = CountingRenderer::default();
    let mut now = start_ms;
    for _ in 0..10_000 {
        match game.frame(now, &mut renderer) {
            FrameOutcome::Continue => now += FRAME_MS,
            FrameOutcome::GameOver(crash) => return (crash, now),
            FrameOutcome::Halted => panic!("run halted before crashing"),
        }
    }
    panic!("no crash within 10k frames");
}

#[test]
fn idle_runner_eventually_crashes() {
    let mut game = new_game(1);
    let (crash, _) = run_until_crash(&mut game, 0.0);
    let state = game.state();
    assert!(state.is_over());
    assert!(!state.obstacles_moving);
    assert!(state.character.y > 600.0, "character parked off-screen");
    assert_eq!(crash.score, state.elapsed_secs);
    assert!(crash.score >= 1, "first tree needs at least ~0.9s to spawn");
}

#[test]
fn jumping_over_the_first_tree_survives_it() {
    let mut game = new_game(2);
    let mut renderer = CountingRenderer::default();
    let mut now = 0.0;
    let mut passed = false;
    for _ in 0..2_000 {
        // jump when the nearest tree is just in front of the character
        let cx = game.state().character.x;
        if game.state().spawner.obstacles().iter().any(|o| o.x > cx && o.x - cx < 60.0) {
            game.apply_jump();
        }
        match game.frame(now, &mut renderer) {
            FrameOutcome::Continue => {}
            other => panic!("crashed while jumping: {other:?}"),
        }
        if game.state().spawner.obstacles().iter().any(|o| o.x + o.width < cx) {
            passed = true;
            break;
        }
        now += FRAME_MS;
    }
    assert!(passed, "never cleared a tree");
    assert!(renderer.obstacles_drawn > 0);
}

#[test]
fn restart_after_crash_starts_clean_run() {
    let mut game = new_game(3);
    let (crash, end) = run_until_crash(&mut game, 0.0);
    let restart_at = end + f64::from(game.config().restart_delay_ms);
    assert!(game.restart_if_current(crash.generation, restart_at));
    assert!(!game.state().is_over());
    assert!(game.state().spawner.obstacles().is_empty());

    let mut renderer = CountingRenderer::default();
    assert_eq!(game.frame(restart_at + FRAME_MS, &mut renderer), FrameOutcome::Continue);
    assert_eq!(game.state().start_ms, Some(restart_at + FRAME_MS));
    assert_eq!(game.state().elapsed_secs, 0);
}

#[test]
fn high_score_persists_only_on_improvement() {
    let store = MemoryStore::with_score(10);
    let mut game = new_game(4);
    game.apply_stored_high_score(block_on(store.high_score()).unwrap());

    // run 1 ends at 15s
    assert_eq!(block_on(submit_score(&store, 15)), Ok(Some(15)));
    // run 2 ends at 5s
    assert_eq!(block_on(submit_score(&store, 5)), Ok(None));
    assert_eq!(block_on(store.high_score()), Ok(15));

    // the loop's own crash path agrees with the store
    let (crash, _) = run_until_crash(&mut game, 0.0);
    if crash.score > 10 {
        assert_eq!(crash.new_high_score, Some(crash.score));
    } else {
        assert_eq!(crash.new_high_score, None);
        assert_eq!(game.state().high_score, 10);
    }
}
