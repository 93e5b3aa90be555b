//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, carried inside the state
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod level;
pub mod physics;
pub mod powerup;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Rect, Wall, circle_rect_intersects, paddle_bounce, reflect};
pub use level::{advance_level, damage_brick, generate_bricks, is_level_complete};
pub use powerup::{apply_power_up_effect, roll_power_up_kind};
pub use scoring::{add_score, points_for};
pub use state::{
    ActivePowerUp, Ball, Brick, BrickKind, GameEvent, GamePhase, GameState, Laser, Paddle,
    Particle, PowerUp, PowerUpKind, ScoreState, ScoreSubmission,
};
pub use tick::{StepResult, TickInput, advance, autopilot_input, tick};
