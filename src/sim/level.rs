//! Brick layout, damage and level progression

use glam::Vec2;
use rand::Rng;

use super::powerup::roll_power_up_kind;
use super::state::{Brick, BrickKind, GameState};
use crate::config::{BrickDistribution, LevelConfig, level_tier};
use crate::consts::*;
use crate::error::ConfigError;

/// Horizontal margin between the side walls and the brick grid
const GRID_MARGIN: f32 = 30.0;

/// Pick a brick kind by cumulative thresholds over the distribution
///
/// Rolls 0..100 and walks the kinds in order; anything left over is `Normal`.
pub fn roll_brick_kind<R: Rng + ?Sized>(distribution: &BrickDistribution, rng: &mut R) -> BrickKind {
    let roll = rng.random_range(0..100u32);
    let mut threshold = 0;
    for (kind, pct) in distribution.entries() {
        threshold += pct;
        if roll < threshold {
            return kind;
        }
    }
    BrickKind::Normal
}

/// Width of one brick for a column count
pub fn brick_width(cols: u32) -> f32 {
    let cols = cols.max(1) as f32;
    (FIELD_WIDTH - 2.0 * GRID_MARGIN - (cols - 1.0) * BRICK_GAP) / cols
}

/// Build the centered `rows × cols` grid, ids starting at `first_id`
pub fn generate_bricks<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R, first_id: u32) -> Vec<Brick> {
    let width = brick_width(config.cols);
    let grid_width = config.cols as f32 * width + (config.cols.saturating_sub(1)) as f32 * BRICK_GAP;
    let left = (FIELD_WIDTH - grid_width) / 2.0;

    let mut bricks = Vec::with_capacity((config.rows * config.cols) as usize);
    let mut id = first_id;
    for row in 0..config.rows {
        for col in 0..config.cols {
            let pos = Vec2::new(
                left + col as f32 * (width + BRICK_GAP),
                BRICK_TOP_OFFSET + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
            );
            let kind = roll_brick_kind(&config.distribution, rng);
            let mut brick = Brick::new(id, pos, width, BRICK_HEIGHT, kind);
            if kind == BrickKind::PowerUp {
                brick.power_up = Some(roll_power_up_kind(rng));
            }
            bricks.push(brick);
            id += 1;
        }
    }

    log::info!(
        "Level {}: {}x{} bricks, tier {}, ball speed {:.0}, drop chance {:.3}",
        config.level,
        config.rows,
        config.cols,
        level_tier(config.level),
        config.ball_speed,
        config.power_up_chance
    );
    bricks
}

/// Apply `amount` damage
///
/// Unbreakable and already destroyed bricks come back unchanged.
pub fn damage_brick(brick: &Brick, amount: u32) -> Brick {
    let mut next = brick.clone();
    if brick.kind == BrickKind::Unbreakable || brick.is_destroyed {
        return next;
    }
    next.hp = brick.hp.saturating_sub(amount);
    next.is_destroyed = next.hp == 0;
    next
}

/// Damage the brick with `brick_id` in place; unknown ids are ignored
///
/// Returns true when this call destroyed the brick.
pub fn damage_brick_by_id(bricks: &mut [Brick], brick_id: u32, amount: u32) -> bool {
    match bricks.iter_mut().find(|b| b.id == brick_id) {
        Some(brick) => {
            let was_destroyed = brick.is_destroyed;
            *brick = damage_brick(brick, amount);
            !was_destroyed && brick.is_destroyed
        }
        None => false,
    }
}

/// Indices of intact bricks whose centers lie within `EXPLOSION_RADIUS` of
/// the exploded brick's center
///
/// Single pass: the caller damages them and does not re-detonate.
pub fn explosion_victims(exploded: &Brick, bricks: &[Brick]) -> Vec<usize> {
    let origin = exploded.center();
    bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.id != exploded.id && !b.is_destroyed)
        .filter(|(_, b)| b.center().distance(origin) <= EXPLOSION_RADIUS)
        .map(|(i, _)| i)
        .collect()
}

/// Every brick is destroyed or unbreakable
pub fn is_level_complete(bricks: &[Brick]) -> bool {
    bricks.iter().all(|b| b.is_destroyed || !b.counts_for_clear())
}

/// Move to the next level
///
/// Regenerates config and bricks, resets to one stuck ball and clears pickups,
/// lasers and timed effects. Paddle modifiers carry over.
pub fn advance_level(state: &mut GameState) -> Result<(), ConfigError> {
    let next_level = state.score.level + 1;
    state.level_config = LevelConfig::for_level(&state.difficulty, next_level)?;
    state.score.level = next_level;
    state.score.bricks_destroyed = 0;
    state.score.multiplier = 1.0;

    state.build_bricks();
    state.balls.clear();
    state.power_ups.clear();
    state.lasers.clear();
    state.active_power_ups.clear();
    state.spawn_ball_stuck();
    Ok(())
}
