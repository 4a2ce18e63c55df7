// Collision detection with a shrunken hitbox on every facing edge.
use crate::config::GameConfig;
use crate::render::Rect;

use super::obstacles::Obstacle;
use super::{Crash, GameState, RunPhase};

/// AABB overlap where each box is pulled in by `margin` on the facing side,
/// so grazing contact does not count.
pub fn hitboxes_overlap(character: &Rect, obstacle: &Rect, margin: f64) -> bool {
    character.x < obstacle.right() - margin
        && character.right() > obstacle.x + margin
        && character.y < obstacle.bottom() - margin
        && character.bottom() > obstacle.y + margin
}

/// Index of the first obstacle (in screen order) hit by the character.
pub fn first_collision(character: &Rect, obstacles: &[Obstacle], margin: f64) -> Option<usize> {
    obstacles
        .iter()
        .position(|o| hitboxes_overlap(character, &o.rect(), margin))
}

/// Test the character against every obstacle. On the first hit the run is
/// over: the character is parked off-screen, obstacles stop, and a strictly
/// better score replaces the cached high score.
pub fn check_collisions(state: &mut GameState, config: &GameConfig) -> Option<Crash> {
    let character = state.character.rect();
    if first_collision(&character, state.spawner.obstacles(), config.hitbox_margin).is_none() {
        return None;
    }

    console_log!("You Lose!");
    state.phase = RunPhase::Over;
    state.character.knock_out(state.viewport, config.knockout_drop);
    state.obstacles_moving = false;

    let score = state.elapsed_secs;
    let new_high_score = if score > state.high_score {
        state.high_score = score;
        Some(score)
    } else {
        None
    };
    Some(Crash { score, new_high_score, generation: state.generation })
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: f64 = 15.0;

    fn obstacle(x: f64, y: f64) -> Obstacle {
        Obstacle { x, y, width: 50.0, height: 50.0, spawned_at_ms: 0.0 }
    }

    #[test]
    fn full_overlap_collides() {
        let c = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert!(hitboxes_overlap(&c, &Rect::new(100.0, 100.0, 50.0, 50.0), M));
    }

    #[test]
    fn margin_boundary_is_exclusive() {
        let c = Rect::new(100.0, 100.0, 50.0, 50.0);
        // character right edge 150 must exceed obstacle.x + 15
        assert!(!hitboxes_overlap(&c, &Rect::new(135.0, 100.0, 50.0, 50.0), M));
        assert!(hitboxes_overlap(&c, &Rect::new(134.9, 100.0, 50.0, 50.0), M));
        // vertical: character bottom 150 must exceed obstacle.y + 15
        assert!(!hitboxes_overlap(&c, &Rect::new(100.0, 135.0, 50.0, 50.0), M));
        assert!(hitboxes_overlap(&c, &Rect::new(100.0, 134.0, 50.0, 50.0), M));
    }

    #[test]
    fn overlap_on_one_axis_only_is_a_miss() {
        let c = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert!(!hitboxes_overlap(&c, &Rect::new(110.0, 300.0, 50.0, 50.0), M));
        assert!(!hitboxes_overlap(&c, &Rect::new(400.0, 110.0, 50.0, 50.0), M));
    }

    #[test]
    fn reports_first_hit_in_order() {
        let c = Rect::new(100.0, 100.0, 50.0, 50.0);
        let obstacles = [obstacle(500.0, 100.0), obstacle(110.0, 100.0), obstacle(100.0, 100.0)];
        assert_eq!(first_collision(&c, &obstacles, M), Some(1));
        assert_eq!(first_collision(&c, &obstacles[..1], M), None);
    }

    #[test]
    fn no_hit_leaves_state_alone() {
        use crate::config::Viewport;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let cfg = GameConfig::default();
        let mut state = GameState::new(&cfg, Viewport::new(800.0, 600.0), 0.0, &mut StdRng::seed_from_u64(2));
        state.elapsed_secs = 9;
        assert_eq!(check_collisions(&mut state, &cfg), None);
        assert_eq!(state.phase, RunPhase::Running);
        assert!(state.obstacles_moving);
        assert_eq!(state.high_score, 0);
    }
}
