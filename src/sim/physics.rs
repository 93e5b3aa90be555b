//! Ball motion: integration, launch, speed ramp and multi-ball splitting

use glam::Vec2;

use super::collision::{paddle_bounce_normal, paddle_hit_position};
use super::state::{Ball, Paddle};
use crate::consts::*;
use crate::rotate;

/// Upper bound on collision substeps per frame
pub const MAX_SUBSTEPS: usize = 20;

/// Substeps needed to cover `distance` in moves no longer than `step`
pub fn substep_count(distance: f32, step: f32) -> usize {
    if !(distance.is_finite() && step > 0.0) {
        return 1;
    }
    ((distance / step).ceil() as usize).clamp(1, MAX_SUBSTEPS)
}

/// Integrate a free ball's position
#[inline]
pub fn move_ball(ball: &mut Ball, dt: f32) {
    ball.pos += ball.vel * dt;
}

/// Advance one ball by `dt`
///
/// A stuck ball is pinned to the paddle; a free ball integrates its velocity
/// and records its previous position in the trail.
pub fn update_ball(ball: &Ball, paddle: &Paddle, dt: f32) -> Ball {
    let mut next = ball.clone();
    if next.is_stuck {
        next.follow_paddle(paddle);
    } else {
        next.record_trail();
        move_ball(&mut next, dt);
    }
    next
}

/// Release a stuck ball at `base_speed × speed_multiplier`
///
/// The launch angle comes from the stuck offset, mapped like a paddle hit.
pub fn launch(ball: &mut Ball, paddle: &Paddle, base_speed: f32) {
    if !ball.is_stuck {
        return;
    }
    let hit = paddle_hit_position(paddle.center_x() + ball.stuck_offset, paddle);
    let speed = (base_speed * ball.speed_multiplier).min(BALL_MAX_SPEED);
    ball.vel = paddle_bounce_normal(hit) * speed;
    ball.is_stuck = false;
    ball.stuck_offset = 0.0;
    ball.clear_trail();
}

/// Catch a ball on a sticky paddle at its current offset
pub fn stick_to_paddle(ball: &mut Ball, paddle: &Paddle) {
    let half = paddle.width / 2.0;
    ball.stuck_offset = (ball.pos.x - paddle.center_x()).clamp(-half, half);
    ball.is_stuck = true;
    ball.vel = Vec2::ZERO;
    ball.follow_paddle(paddle);
}

/// Per-hit speed ramp
///
/// Grows `speed_multiplier` by `rate` (capped), rescales the velocity by the
/// same ratio and keeps the absolute speed under `BALL_MAX_SPEED`.
pub fn ramp_speed(ball: &mut Ball, rate: f32) {
    let old = ball.speed_multiplier;
    if old >= MAX_SPEED_MULTIPLIER {
        clamp_speed(ball);
        return;
    }
    let new = (old * (1.0 + rate)).min(MAX_SPEED_MULTIPLIER);
    if old > 0.0 {
        ball.vel *= new / old;
    }
    ball.speed_multiplier = new;
    clamp_speed(ball);
}

/// One-off velocity scale (slow/fast effects)
pub fn scale_speed(ball: &mut Ball, factor: f32) {
    ball.vel *= factor;
    ball.speed_multiplier *= factor;
    clamp_speed(ball);
}

/// Keep |v| at or under the absolute cap
pub fn clamp_speed(ball: &mut Ball) {
    ball.vel = ball.vel.clamp_length_max(BALL_MAX_SPEED);
}

/// Two children of `source` rotated by ±`MULTI_BALL_SPREAD` at the same speed
pub fn split_ball(source: &Ball, ids: [u32; 2]) -> [Ball; 2] {
    let make = |id: u32, angle: f32| {
        let mut child = source.clone();
        child.id = id;
        child.vel = rotate(source.vel, angle);
        child
    };
    [
        make(ids[0], MULTI_BALL_SPREAD),
        make(ids[1], -MULTI_BALL_SPREAD),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Angle from +x (radians, screen coordinates)
    fn heading(v: Vec2) -> f32 {
        v.y.atan2(v.x)
    }

    /// Wrap into [-π, π)
    fn normalize_angle(mut angle: f32) -> f32 {
        use std::f32::consts::PI;
        while angle >= PI {
            angle -= 2.0 * PI;
        }
        while angle < -PI {
            angle += 2.0 * PI;
        }
        angle
    }

    fn flying(vel: Vec2) -> Ball {
        let mut ball = Ball::new_stuck(1, &Paddle::default());
        ball.is_stuck = false;
        ball.pos = Vec2::new(400.0, 300.0);
        ball.vel = vel;
        ball
    }

    #[test]
    fn test_stuck_ball_follows_paddle() {
        let mut paddle = Paddle::default();
        let ball = Ball::new_stuck(1, &paddle);
        paddle.pos.x += 40.0;
        let moved = update_ball(&ball, &paddle, 0.016);
        assert!((moved.pos.x - paddle.center_x()).abs() < 1e-3);
        assert!(moved.pos.y < paddle.pos.y);
        assert!(moved.trail.is_empty());
    }

    #[test]
    fn test_free_ball_integrates() {
        let ball = flying(Vec2::new(100.0, -200.0));
        let moved = update_ball(&ball, &Paddle::default(), 0.5);
        assert_eq!(moved.pos, Vec2::new(450.0, 200.0));
        assert_eq!(moved.trail[0], ball.pos);
        // Source untouched
        assert_eq!(ball.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_launch_from_center_goes_straight_up() {
        let paddle = Paddle::default();
        let mut ball = Ball::new_stuck(1, &paddle);
        launch(&mut ball, &paddle, 300.0);
        assert!(!ball.is_stuck);
        assert!(ball.vel.x.abs() < 1e-3);
        assert!((ball.vel.y + 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_sticky_catch_keeps_offset() {
        let paddle = Paddle::default();
        let mut ball = flying(Vec2::new(0.0, 200.0));
        ball.pos = Vec2::new(paddle.center_x() + 20.0, paddle.pos.y - 2.0);
        stick_to_paddle(&mut ball, &paddle);
        assert!(ball.is_stuck);
        assert!((ball.stuck_offset - 20.0).abs() < 1e-3);
        launch(&mut ball, &paddle, 300.0);
        assert!(ball.vel.x > 0.0 && ball.vel.y < 0.0);
    }

    #[test]
    fn test_speed_ramp_capped() {
        let mut ball = flying(Vec2::new(0.0, -300.0));
        ramp_speed(&mut ball, 0.02);
        assert!((ball.speed_multiplier - 1.02).abs() < 1e-5);
        assert!((ball.speed() - 306.0).abs() < 1e-2);

        for _ in 0..200 {
            ramp_speed(&mut ball, 0.02);
        }
        assert!((ball.speed_multiplier - MAX_SPEED_MULTIPLIER).abs() < 1e-5);
        assert!(ball.speed() <= BALL_MAX_SPEED + 1e-3);
    }

    #[test]
    fn test_absolute_speed_cap() {
        let mut ball = flying(Vec2::new(0.0, -700.0));
        scale_speed(&mut ball, FAST_FACTOR);
        assert!((ball.speed() - BALL_MAX_SPEED).abs() < 1e-2);
    }

    #[test]
    fn test_substep_count() {
        // 800 px/s over a 0.1 s frame in 2.4 px steps hits the cap
        assert_eq!(substep_count(80.0, BALL_RADIUS * 0.3), MAX_SUBSTEPS);
        assert_eq!(substep_count(5.0, BALL_RADIUS * 0.3), 3);
        assert_eq!(substep_count(0.0, 2.4), 1);
        assert_eq!(substep_count(f32::NAN, 2.4), 1);
        assert_eq!(substep_count(10.0, 0.0), 1);
    }

    #[test]
    fn test_split_angles() {
        let source = flying(Vec2::new(0.0, -300.0));
        let [a, b] = split_ball(&source, [10, 11]);
        assert_eq!((a.id, b.id), (10, 11));
        let base = heading(source.vel);
        let da = normalize_angle(heading(a.vel) - base);
        let db = normalize_angle(heading(b.vel) - base);
        assert!((da - MULTI_BALL_SPREAD).abs() < 1e-4);
        assert!((db + MULTI_BALL_SPREAD).abs() < 1e-4);
        assert!((a.speed() - 300.0).abs() < 1e-2);
        assert!((b.speed() - 300.0).abs() < 1e-2);
    }
}
