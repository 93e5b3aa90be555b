//! Brick Breaker - A deterministic Breakout simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, bricks, power-ups, scoring)
//! - `config`: Difficulty presets and per-level scaling
//! - `error`: Configuration validation failures
//!
//! Rendering, audio and input wiring are the host's job. The host calls
//! [`sim::advance`] once per frame and drains the returned events.

pub mod config;
pub mod error;
pub mod sim;

pub use config::{BrickDistribution, Difficulty, DifficultyConfig, LevelConfig};
pub use error::ConfigError;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical playfield dimensions (origin top-left, y down)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Gap between the side walls and the paddle's travel range
    pub const SIDE_PADDING: f32 = 10.0;

    /// Largest frame delta the host should feed into `advance`
    pub const MAX_DT: f32 = 0.1;
    /// Seconds of countdown before play starts
    pub const COUNTDOWN_SECONDS: f32 = 3.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    pub const PADDLE_Y: f32 = FIELD_HEIGHT - 40.0;
    pub const PADDLE_SPEED: f32 = 600.0;
    /// Bounce angle at the paddle edges (radians, 70 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = 70.0 * std::f32::consts::PI / 180.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_SPEED: f32 = 300.0;
    /// Absolute speed cap regardless of multipliers
    pub const BALL_MAX_SPEED: f32 = 800.0;
    /// Smallest |vy| after a paddle bounce
    pub const MIN_VERTICAL_SPEED: f32 = 80.0;
    /// Ceiling for the per-hit speed ramp
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;
    /// Default per-hit speed ramp (+2%)
    pub const SPEED_INCREASE: f32 = 0.02;
    pub const TRAIL_LENGTH: usize = 10;

    /// Brick grid
    pub const BRICK_COLS: u32 = 10;
    pub const MAX_BRICK_ROWS: u32 = 8;
    pub const BRICK_HEIGHT: f32 = 22.0;
    pub const BRICK_GAP: f32 = 4.0;
    pub const BRICK_TOP_OFFSET: f32 = 60.0;
    /// Center-to-center reach of an explosive brick
    pub const EXPLOSION_RADIUS: f32 = 85.0;

    /// Power-ups
    pub const POWERUP_WIDTH: f32 = 30.0;
    pub const POWERUP_HEIGHT: f32 = 14.0;
    pub const POWERUP_FALL_SPEED: f32 = 150.0;
    pub const EXPAND_MULTIPLIER: f32 = 1.5;
    pub const SHRINK_MULTIPLIER: f32 = 0.6;
    pub const SLOW_FACTOR: f32 = 0.7;
    pub const FAST_FACTOR: f32 = 1.3;
    pub const POINTS_MULTIPLIER: f32 = 2.0;
    /// Rotation applied to each multi-ball child (30 degrees)
    pub const MULTI_BALL_SPREAD: f32 = std::f32::consts::PI / 6.0;

    /// Lasers
    pub const LASER_WIDTH: f32 = 4.0;
    pub const LASER_HEIGHT: f32 = 14.0;
    pub const LASER_SPEED: f32 = 700.0;
    pub const LASER_COOLDOWN: f32 = 0.3;

    /// Scoring
    pub const COMBO_TIMEOUT: f32 = 2.0;
    pub const COMBO_STEP: f32 = 0.1;
    pub const COMBO_MILESTONE: u32 = 5;
}

/// Rotate a vector by `angle` radians (positive turns +x toward +y)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
