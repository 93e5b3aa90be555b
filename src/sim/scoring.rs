//! Score, combo and lives bookkeeping

use super::state::{Brick, GameState, ScoreState};
use crate::consts::*;

/// `floor(base × (1 + combo × COMBO_STEP) × multiplier)`
pub fn points_for(base: u32, combo: u32, multiplier: f32) -> u64 {
    let combo_bonus = 1.0 + f64::from(combo) * f64::from(COMBO_STEP);
    (f64::from(base) * combo_bonus * f64::from(multiplier)).floor() as u64
}

/// Credit a destroyed brick at the current combo, then extend the combo
pub fn add_score(score: &ScoreState, brick: &Brick) -> ScoreState {
    let mut next = score.clone();
    next.score += points_for(brick.points, score.combo, score.multiplier);
    next.bricks_destroyed += 1;
    next.combo = score.combo + 1;
    next.best_combo = score.best_combo.max(next.combo);
    next.since_last_hit = 0.0;
    next
}

/// Milestone reached when the combo crosses a multiple of `COMBO_MILESTONE`
pub fn combo_milestone(before: u32, after: u32) -> Option<u32> {
    (after > before && after / COMBO_MILESTONE > before / COMBO_MILESTONE)
        .then_some(after / COMBO_MILESTONE * COMBO_MILESTONE)
}

/// Advance the combo window; the combo lapses after `COMBO_TIMEOUT` without a kill
pub fn update_combo(score: &mut ScoreState, dt: f32) {
    score.since_last_hit += dt;
    if score.combo > 0 && score.since_last_hit > COMBO_TIMEOUT {
        score.combo = 0;
    }
}

pub fn is_game_over(score: &ScoreState) -> bool {
    score.lives == 0
}

/// Spend one life; returns true when that was the last one
pub fn lose_life(score: &mut ScoreState) -> bool {
    score.lives = score.lives.saturating_sub(1);
    is_game_over(score)
}

/// Reset the board for a fresh serve after a life was spent
///
/// Clears pickups, lasers and effects, restores the paddle and spawns one stuck
/// ball. Bricks, score and lives stay.
pub fn reset_after_life_lost(state: &mut GameState) {
    state.score.combo = 0;
    state.score.multiplier = 1.0;
    state.score.since_last_hit = 0.0;

    state.power_ups.clear();
    state.lasers.clear();
    state.active_power_ups.clear();
    state.paddle.reset_modifiers();
    state.balls.clear();
    state.spawn_ball_stuck();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyConfig;
    use crate::sim::state::{ActivePowerUp, BrickKind, PowerUpKind};
    use glam::Vec2;

    fn normal_brick(id: u32) -> Brick {
        Brick::new(id, Vec2::ZERO, 60.0, 20.0, BrickKind::Normal)
    }

    #[test]
    fn test_combo_scoring_sequence() {
        let mut score = ScoreState::new(3);
        let mut gains = Vec::new();
        for id in 0..3 {
            let before = score.score;
            score = add_score(&score, &normal_brick(id));
            gains.push(score.score - before);
        }
        assert_eq!(gains, vec![10, 11, 12]);
        assert_eq!(score.combo, 3);
        assert_eq!(score.best_combo, 3);
        assert_eq!(score.bricks_destroyed, 3);
    }

    #[test]
    fn test_multiplier_doubles() {
        assert_eq!(points_for(10, 0, 2.0), 20);
        assert_eq!(points_for(30, 4, 2.0), 84);
        assert_eq!(points_for(15, 3, 1.0), 19);
    }

    #[test]
    fn test_best_combo_survives_reset() {
        let mut score = ScoreState::new(3);
        for id in 0..4 {
            score = add_score(&score, &normal_brick(id));
        }
        update_combo(&mut score, COMBO_TIMEOUT + 0.1);
        assert_eq!(score.combo, 0);
        assert_eq!(score.best_combo, 4);
    }

    #[test]
    fn test_combo_holds_inside_window() {
        let mut score = add_score(&ScoreState::new(3), &normal_brick(1));
        update_combo(&mut score, COMBO_TIMEOUT * 0.5);
        score = add_score(&score, &normal_brick(2));
        update_combo(&mut score, COMBO_TIMEOUT * 0.9);
        assert_eq!(score.combo, 2);
    }

    #[test]
    fn test_milestones() {
        assert_eq!(combo_milestone(4, 5), Some(5));
        assert_eq!(combo_milestone(5, 6), None);
        assert_eq!(combo_milestone(9, 10), Some(10));
        assert_eq!(combo_milestone(3, 0), None);
    }

    #[test]
    fn test_reset_after_life_lost() {
        let mut state = GameState::new(DifficultyConfig::default(), 5).unwrap();
        state.score.combo = 7;
        state.score.multiplier = 2.0;
        state.paddle.set_size_multiplier(EXPAND_MULTIPLIER);
        state.paddle.is_sticky = true;
        state.active_power_ups.push(ActivePowerUp {
            kind: PowerUpKind::Sticky,
            time_remaining: 2.0,
            duration: 10.0,
        });
        state.balls.clear();

        assert!(!lose_life(&mut state.score));
        reset_after_life_lost(&mut state);

        assert_eq!(state.score.lives, 2);
        assert_eq!(state.score.combo, 0);
        assert_eq!(state.score.multiplier, 1.0);
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
        assert!(!state.paddle.is_sticky);
        assert!(state.active_power_ups.is_empty());
        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].is_stuck);
        assert!(!is_game_over(&state.score));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut score = ScoreState::new(1);
        assert!(lose_life(&mut score));
        assert_eq!(score.lives, 0);
        // Never underflows
        assert!(lose_life(&mut score));
        assert_eq!(score.lives, 0);
    }
}
