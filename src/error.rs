//! Error types for configuration construction.
//!
//! Gameplay outcomes (ball loss, game over, level clear) are state, not errors.

use thiserror::Error;

/// Errors raised while building difficulty or level configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Brick-type percentages must add up to exactly 100.
    #[error("Brick distribution sums to {total}, expected 100")]
    DistributionSum { total: u32 },

    /// A size, speed or rate that must be strictly positive.
    #[error("'{field}' must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    /// A probability outside [0, 1].
    #[error("Power-up chance {value} is outside [0, 1]")]
    ChanceOutOfRange { value: f32 },

    /// The brick grid has no cells.
    #[error("Brick grid must be non-empty, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },

    /// A session cannot start without lives.
    #[error("Starting lives must be at least 1")]
    NoLives,
}

/// Reject non-finite or non-positive values.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Reject probabilities outside [0, 1].
pub(crate) fn ensure_chance(value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ChanceOutOfRange { value })
    }
}
