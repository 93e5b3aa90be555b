//! Collision detection and response for balls, boxes and walls
//!
//! All tests are discrete. The step calls them once per substep, so a fast
//! ball never moves more than a fraction of its radius between checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Brick, Paddle};
use crate::consts::*;

/// Axis-aligned rectangle (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Closest point inside the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Circle vs rectangle: clamp the center into the box, compare squared distance
pub fn circle_rect_intersects(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) <= radius * radius
}

/// Standard AABB overlap (touching edges count)
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.min().x <= b.max().x
        && a.max().x >= b.min().x
        && a.min().y <= b.max().y
        && a.max().y >= b.min().y
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n. A zero-length normal or velocity
/// returns the input unchanged.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    let n = normal.normalize_or_zero();
    if n == Vec2::ZERO || velocity == Vec2::ZERO {
        return velocity;
    }
    velocity - 2.0 * velocity.dot(n) * n
}

/// Hit offset from paddle center: -1 at the left edge, +1 at the right edge
pub fn paddle_hit_position(ball_x: f32, paddle: &Paddle) -> f32 {
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball_x - paddle.center_x()) / half).clamp(-1.0, 1.0)
}

/// Surface normal for a hit position: `(sin θ, -cos θ)` with θ = hit × max angle
pub fn paddle_bounce_normal(hit_position: f32) -> Vec2 {
    let angle = hit_position.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE;
    Vec2::new(angle.sin(), -angle.cos())
}

/// Outgoing velocity after a paddle hit
///
/// The ball leaves along the bounce normal at its incoming speed, so the
/// center sends it straight up and the edges at `MAX_BOUNCE_ANGLE`. |vy| is
/// then held above `MIN_VERTICAL_SPEED`.
pub fn paddle_bounce(velocity: Vec2, hit_position: f32) -> Vec2 {
    let speed = velocity.length();
    if speed == 0.0 {
        return velocity;
    }
    let mut out = paddle_bounce_normal(hit_position) * speed;
    if out.y.abs() < MIN_VERTICAL_SPEED {
        out.y = MIN_VERTICAL_SPEED.copysign(out.y);
    }
    out
}

/// Ball vs paddle; only counts while the ball is moving down
pub fn ball_hits_paddle(ball: &Ball, paddle: &Paddle) -> bool {
    ball.vel.y > 0.0 && circle_rect_intersects(ball.pos, ball.radius, &paddle.rect())
}

/// Face normal of a box hit by a circle at `center`
///
/// The larger of |dx|/halfWidth and |dy|/halfHeight picks the axis.
pub fn brick_normal(center: Vec2, rect: &Rect) -> Vec2 {
    let d = center - rect.center();
    let half = rect.half_extents();
    let rx = if half.x > 0.0 { d.x.abs() / half.x } else { 0.0 };
    let ry = if half.y > 0.0 { d.y.abs() / half.y } else { 0.0 };
    if rx > ry {
        Vec2::new(d.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, d.y.signum())
    }
}

/// Index of the first solid brick the ball touches (iteration order)
pub fn find_brick_collision(ball: &Ball, bricks: &[Brick]) -> Option<usize> {
    bricks
        .iter()
        .position(|b| b.is_solid() && circle_rect_intersects(ball.pos, ball.radius, &b.rect()))
}

/// Reflect the ball off a brick face and move it just outside that face
pub fn resolve_brick_bounce(ball: &mut Ball, rect: &Rect) {
    let normal = brick_normal(ball.pos, rect);
    if ball.vel.dot(normal) < 0.0 {
        ball.vel = reflect(ball.vel, normal);
    }
    if normal.x > 0.0 {
        ball.pos.x = rect.max().x + ball.radius;
    } else if normal.x < 0.0 {
        ball.pos.x = rect.min().x - ball.radius;
    } else if normal.y > 0.0 {
        ball.pos.y = rect.max().y + ball.radius;
    } else {
        ball.pos.y = rect.min().y - ball.radius;
    }
}

/// Which wall was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
}

/// Bounce off the side and top walls. There is no bottom wall.
pub fn resolve_wall_collision(ball: &mut Ball) -> Option<Wall> {
    let r = ball.radius;
    let (wall, normal) = if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        (Wall::Left, Vec2::X)
    } else if ball.pos.x + r > FIELD_WIDTH {
        ball.pos.x = FIELD_WIDTH - r;
        (Wall::Right, Vec2::NEG_X)
    } else if ball.pos.y - r < 0.0 {
        ball.pos.y = r;
        (Wall::Top, Vec2::Y)
    } else {
        return None;
    };

    // Only flip when heading into the wall
    if ball.vel.dot(normal) < 0.0 {
        ball.vel = reflect(ball.vel, normal);
    }
    Some(wall)
}

/// Ball has fallen out past the bottom edge
pub fn is_ball_lost(ball: &Ball) -> bool {
    !ball.is_stuck && ball.pos.y - ball.radius > FIELD_HEIGHT
}
