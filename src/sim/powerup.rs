//! Power-up drops, timed effects and lasers

use glam::Vec2;
use rand::Rng;

use super::collision::{Rect, rects_overlap};
use super::physics::{scale_speed, split_ball};
use super::state::{
    ActivePowerUp, Brick, BrickKind, GameEvent, GameState, Laser, Paddle, PowerUp, PowerUpKind,
};
use crate::consts::*;

/// Whether a destroyed brick drops something
///
/// `PowerUp` bricks always drop; anything else is a coin flip at `chance`.
pub fn should_drop_power_up<R: Rng + ?Sized>(brick: &Brick, chance: f32, rng: &mut R) -> bool {
    brick.kind == BrickKind::PowerUp || rng.random::<f32>() < chance
}

/// Weighted draw over the power-up table
pub fn roll_power_up_kind<R: Rng + ?Sized>(rng: &mut R) -> PowerUpKind {
    let total: u32 = PowerUpKind::ALL.iter().map(|k| k.weight()).sum();
    let mut roll = rng.random_range(0..total);
    for kind in PowerUpKind::ALL {
        if roll < kind.weight() {
            return kind;
        }
        roll -= kind.weight();
    }
    PowerUpKind::Expand
}

/// Type to drop for a destroyed brick (pre-assigned for `PowerUp` bricks)
pub fn drop_kind_for<R: Rng + ?Sized>(brick: &Brick, rng: &mut R) -> PowerUpKind {
    match brick.power_up {
        Some(kind) => kind,
        None => roll_power_up_kind(rng),
    }
}

/// Fall one step; deactivates once fully below the field
pub fn update_power_up(power_up: &PowerUp, dt: f32) -> PowerUp {
    let mut next = power_up.clone();
    next.pos += next.vel * dt;
    if next.pos.y > FIELD_HEIGHT {
        next.is_active = false;
    }
    next
}

/// Paddle catch test
pub fn is_caught(power_up: &PowerUp, paddle: &Paddle) -> bool {
    power_up.is_active && rects_overlap(&power_up.rect(), &paddle.rect())
}

/// Start or restart a timed effect. Returns true if it was already running.
fn start_timer(active: &mut Vec<ActivePowerUp>, kind: PowerUpKind, duration: f32) -> bool {
    if let Some(existing) = active.iter_mut().find(|e| e.kind == kind) {
        existing.time_remaining = duration;
        existing.duration = duration;
        true
    } else {
        active.push(ActivePowerUp {
            kind,
            time_remaining: duration,
            duration,
        });
        false
    }
}

/// Apply a collected power-up to the state
///
/// Timed effects reset an existing timer instead of stacking.
pub fn apply_power_up_effect(state: &mut GameState, kind: PowerUpKind) {
    let refreshed = match kind.duration() {
        Some(duration) => start_timer(&mut state.active_power_ups, kind, duration),
        None => false,
    };

    match kind {
        PowerUpKind::Expand => {
            state.paddle.set_size_multiplier(EXPAND_MULTIPLIER);
            remove_effect(state, PowerUpKind::Shrink);
        }
        PowerUpKind::Shrink => {
            state.paddle.set_size_multiplier(SHRINK_MULTIPLIER);
            remove_effect(state, PowerUpKind::Expand);
        }
        PowerUpKind::MultiBall => {
            let source = state
                .balls
                .iter()
                .find(|b| b.is_active && !b.is_stuck)
                .cloned();
            if let Some(source) = source {
                let first_id = state.next_entity_id();
                let second_id = state.next_entity_id();
                state.balls.extend(split_ball(&source, [first_id, second_id]));
            }
        }
        PowerUpKind::Sticky => state.paddle.is_sticky = true,
        PowerUpKind::Laser => state.paddle.has_laser = true,
        PowerUpKind::Slow | PowerUpKind::Fast if !refreshed => {
            let factor = if kind == PowerUpKind::Slow {
                SLOW_FACTOR
            } else {
                FAST_FACTOR
            };
            for ball in state.balls.iter_mut().filter(|b| b.is_active && !b.is_stuck) {
                scale_speed(ball, factor);
            }
        }
        PowerUpKind::Slow | PowerUpKind::Fast => {}
        PowerUpKind::ExtraLife => state.score.lives += 1,
        PowerUpKind::PointsX2 => state.score.multiplier = POINTS_MULTIPLIER,
        // Checked by the collision step
        PowerUpKind::Invincible => {}
    }
    log::debug!("Power-up applied: {:?} (refreshed: {})", kind, refreshed);
}

/// Drop a running effect without firing its reversal
fn remove_effect(state: &mut GameState, kind: PowerUpKind) {
    state.active_power_ups.retain(|e| e.kind != kind);
}

/// Undo an expired effect
fn reverse_effect(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Expand | PowerUpKind::Shrink => state.paddle.set_size_multiplier(1.0),
        PowerUpKind::Sticky => state.paddle.is_sticky = false,
        PowerUpKind::Laser => {
            state.paddle.has_laser = false;
            state.paddle.laser_cooldown = 0.0;
        }
        PowerUpKind::PointsX2 => state.score.multiplier = 1.0,
        PowerUpKind::Slow
        | PowerUpKind::Fast
        | PowerUpKind::MultiBall
        | PowerUpKind::ExtraLife
        | PowerUpKind::Invincible => {}
    }
}

/// Tick every timer down by `dt`; expired effects are removed and reversed
pub fn update_active_power_ups(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let mut expired = Vec::new();
    for effect in state.active_power_ups.iter_mut() {
        effect.time_remaining -= dt;
        if effect.time_remaining <= 0.0 {
            expired.push(effect.kind);
        }
    }
    state.active_power_ups.retain(|e| e.time_remaining > 0.0);

    for kind in expired {
        reverse_effect(state, kind);
        log::debug!("Power-up expired: {:?}", kind);
        events.push(GameEvent::PowerUpExpired { kind });
    }
}

/// Fire from the paddle's top center
///
/// Returns `None` without a laser or while cooling down. The caller resets
/// `laser_cooldown`.
pub fn fire_laser(paddle: &Paddle, id: u32) -> Option<Laser> {
    if !paddle.has_laser || paddle.laser_cooldown > 0.0 {
        log::trace!("Laser rejected (armed: {}, cooldown: {:.2})", paddle.has_laser, paddle.laser_cooldown);
        return None;
    }
    Some(Laser {
        id,
        pos: Vec2::new(
            paddle.center_x() - LASER_WIDTH / 2.0,
            paddle.pos.y - LASER_HEIGHT,
        ),
        vel: Vec2::new(0.0, -LASER_SPEED),
        width: LASER_WIDTH,
        height: LASER_HEIGHT,
        is_active: true,
    })
}

/// Move a laser up; deactivates once it leaves the top edge
pub fn update_laser(laser: &Laser, dt: f32) -> Laser {
    let mut next = laser.clone();
    next.pos += next.vel * dt;
    if next.pos.y + next.height < 0.0 {
        next.is_active = false;
    }
    next
}

/// Index of the first solid brick the laser overlaps
pub fn laser_brick_collision(laser: &Laser, bricks: &[Brick]) -> Option<usize> {
    let rect: Rect = laser.rect();
    bricks
        .iter()
        .position(|b| b.is_solid() && rects_overlap(&rect, &b.rect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        let mut state = GameState::new(DifficultyConfig::default(), 1234).unwrap();
        state.phase = crate::sim::state::GamePhase::Playing;
        state
    }

    fn launch_first(state: &mut GameState) {
        let ball = &mut state.balls[0];
        ball.is_stuck = false;
        ball.pos = Vec2::new(400.0, 400.0);
        ball.vel = Vec2::new(0.0, -300.0);
    }

    #[test]
    fn test_power_up_brick_always_drops() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut brick = Brick::new(1, Vec2::ZERO, 60.0, 20.0, BrickKind::PowerUp);
        brick.power_up = Some(PowerUpKind::Laser);
        for _ in 0..20 {
            assert!(should_drop_power_up(&brick, 0.0, &mut rng));
            assert_eq!(drop_kind_for(&brick, &mut rng), PowerUpKind::Laser);
        }
        let normal = Brick::new(2, Vec2::ZERO, 60.0, 20.0, BrickKind::Normal);
        assert!(!should_drop_power_up(&normal, 0.0, &mut rng));
        assert!(should_drop_power_up(&normal, 1.0, &mut rng));
    }

    #[test]
    fn test_weighted_roll_hits_every_kind() {
        let mut rng = Pcg32::seed_from_u64(77);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            seen.insert(roll_power_up_kind(&mut rng));
        }
        assert_eq!(seen.len(), PowerUpKind::ALL.len());
    }

    #[test]
    fn test_power_up_falls_and_is_caught() {
        let paddle = Paddle::default();
        let drop = PowerUp::new(1, Vec2::new(paddle.center_x(), paddle.pos.y - 30.0), PowerUpKind::Expand);
        assert!(!is_caught(&drop, &paddle));
        let fallen = update_power_up(&drop, 0.2);
        assert!(fallen.pos.y > drop.pos.y);
        assert!(is_caught(&fallen, &paddle));

        let gone = update_power_up(&PowerUp::new(2, Vec2::new(50.0, FIELD_HEIGHT), PowerUpKind::Slow), 0.1);
        assert!(!gone.is_active);
    }

    #[test]
    fn test_expand_round_trip() {
        let mut state = playing_state();
        let before = state.paddle.clone();
        apply_power_up_effect(&mut state, PowerUpKind::Expand);
        assert!((state.paddle.width - PADDLE_WIDTH * EXPAND_MULTIPLIER).abs() < 1e-3);

        let mut events = Vec::new();
        update_active_power_ups(&mut state, 10.5, &mut events);
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
        assert_eq!(state.paddle, before);
        assert!(state.active_power_ups.is_empty());
        assert_eq!(events, vec![GameEvent::PowerUpExpired { kind: PowerUpKind::Expand }]);
    }

    #[test]
    fn test_points_round_trip() {
        let mut state = playing_state();
        apply_power_up_effect(&mut state, PowerUpKind::PointsX2);
        assert_eq!(state.score.multiplier, 2.0);
        update_active_power_ups(&mut state, 11.0, &mut Vec::new());
        assert_eq!(state.score.multiplier, 1.0);
    }

    #[test]
    fn test_reapply_resets_timer() {
        let mut state = playing_state();
        apply_power_up_effect(&mut state, PowerUpKind::Sticky);
        update_active_power_ups(&mut state, 6.0, &mut Vec::new());
        apply_power_up_effect(&mut state, PowerUpKind::Sticky);
        assert_eq!(state.active_power_ups.len(), 1);
        assert!((state.active_power_ups[0].time_remaining - 10.0).abs() < 1e-5);
        update_active_power_ups(&mut state, 6.0, &mut Vec::new());
        assert!(state.paddle.is_sticky);
    }

    #[test]
    fn test_slow_applies_once() {
        let mut state = playing_state();
        launch_first(&mut state);
        apply_power_up_effect(&mut state, PowerUpKind::Slow);
        let once = state.balls[0].vel;
        assert!((once.length() - 300.0 * SLOW_FACTOR).abs() < 1e-2);
        assert!((state.balls[0].speed_multiplier - SLOW_FACTOR).abs() < 1e-5);

        apply_power_up_effect(&mut state, PowerUpKind::Slow);
        assert_eq!(state.balls[0].vel, once);

        // Expiry leaves the ball alone
        update_active_power_ups(&mut state, 9.0, &mut Vec::new());
        assert_eq!(state.balls[0].vel, once);
    }

    #[test]
    fn test_multi_ball_needs_flying_ball() {
        let mut state = playing_state();
        apply_power_up_effect(&mut state, PowerUpKind::MultiBall);
        assert_eq!(state.balls.len(), 1);

        launch_first(&mut state);
        apply_power_up_effect(&mut state, PowerUpKind::MultiBall);
        assert_eq!(state.balls.len(), 3);
        assert!(state.active_power_ups.is_empty());
        let ids: Vec<u32> = state.balls.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[2], ids[1] + 1);
        // Both child ids are reserved; the next allocation follows them
        assert_eq!(state.next_entity_id(), ids[2] + 1);
    }

    #[test]
    fn test_extra_life_not_timed() {
        let mut state = playing_state();
        let lives = state.score.lives;
        apply_power_up_effect(&mut state, PowerUpKind::ExtraLife);
        assert_eq!(state.score.lives, lives + 1);
        assert!(state.active_power_ups.is_empty());
    }

    #[test]
    fn test_shrink_replaces_expand() {
        let mut state = playing_state();
        apply_power_up_effect(&mut state, PowerUpKind::Expand);
        apply_power_up_effect(&mut state, PowerUpKind::Shrink);
        assert!(!state.has_effect(PowerUpKind::Expand));
        assert!((state.paddle.size_multiplier - SHRINK_MULTIPLIER).abs() < 1e-6);
        update_active_power_ups(&mut state, 8.5, &mut Vec::new());
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
    }

    #[test]
    fn test_fire_laser_rules() {
        let mut paddle = Paddle::default();
        assert!(fire_laser(&paddle, 1).is_none());
        paddle.has_laser = true;
        let laser = fire_laser(&paddle, 1).unwrap();
        assert!((laser.pos.x + laser.width / 2.0 - paddle.center_x()).abs() < 1e-3);
        assert!(laser.vel.y < 0.0);
        paddle.laser_cooldown = LASER_COOLDOWN;
        assert!(fire_laser(&paddle, 2).is_none());
    }

    #[test]
    fn test_laser_leaves_top() {
        let mut paddle = Paddle::default();
        paddle.has_laser = true;
        let mut laser = fire_laser(&paddle, 1).unwrap();
        for _ in 0..100 {
            laser = update_laser(&laser, 0.016);
        }
        assert!(!laser.is_active);
    }

    #[test]
    fn test_laser_hits_first_solid_brick() {
        let mut paddle = Paddle::default();
        paddle.has_laser = true;
        let mut laser = fire_laser(&paddle, 1).unwrap();
        laser.pos.y = 110.0;
        let x = paddle.center_x() - 30.0;
        let mut bricks = vec![
            Brick::new(1, Vec2::new(x, 100.0), 60.0, 20.0, BrickKind::Normal),
            Brick::new(2, Vec2::new(x, 115.0), 60.0, 20.0, BrickKind::Normal),
        ];
        assert_eq!(laser_brick_collision(&laser, &bricks), Some(0));
        bricks[0].is_destroyed = true;
        assert_eq!(laser_brick_collision(&laser, &bricks), Some(1));
    }
}
