//! Difficulty presets and per-level configuration
//!
//! Everything here is plain data plus pure scaling functions. Values are
//! validated once at construction so the simulation never meets a bad config.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ensure_chance, ensure_positive};
use crate::sim::state::BrickKind;

/// Named difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }
}

/// Game-start parameters for one difficulty tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub difficulty: Difficulty,
    /// Default paddle width (px)
    pub paddle_width: f32,
    /// Level-1 ball speed (px/s)
    pub ball_speed: f32,
    /// Starting lives
    pub lives: u32,
    /// Level-1 chance that a destroyed brick drops a power-up
    pub power_up_chance: f32,
    /// Level-1 brick rows
    pub brick_rows: u32,
    /// Fractional speed-multiplier gain per brick hit
    pub speed_increase: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self::preset(Difficulty::Normal)
    }
}

impl DifficultyConfig {
    /// Built-in preset for a tier
    pub fn preset(difficulty: Difficulty) -> Self {
        let (paddle_width, ball_speed, lives, power_up_chance, brick_rows, speed_increase) =
            match difficulty {
                Difficulty::Easy => (PADDLE_WIDTH * 1.2, BALL_SPEED * 0.85, 5, 0.2, 4, 0.01),
                Difficulty::Normal => (PADDLE_WIDTH, BALL_SPEED, 3, 0.15, 5, SPEED_INCREASE),
                Difficulty::Hard => (PADDLE_WIDTH * 0.8, BALL_SPEED * 1.25, 3, 0.1, 6, 0.03),
                Difficulty::Expert => (PADDLE_WIDTH * 0.7, BALL_SPEED * 1.5, 2, 0.08, 7, 0.04),
            };
        Self {
            difficulty,
            paddle_width,
            ball_speed,
            lives,
            power_up_chance,
            brick_rows,
            speed_increase,
        }
    }

    /// Check every field; called by `GameState::new`
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("paddle_width", self.paddle_width)?;
        ensure_positive("ball_speed", self.ball_speed)?;
        ensure_chance(self.power_up_chance)?;
        if self.speed_increase < 0.0 || !self.speed_increase.is_finite() {
            return Err(ConfigError::NonPositive {
                field: "speed_increase",
                value: self.speed_increase,
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.brick_rows == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.brick_rows,
                cols: BRICK_COLS,
            });
        }
        if self.paddle_width > FIELD_WIDTH - 2.0 * SIDE_PADDING {
            return Err(ConfigError::NonPositive {
                field: "paddle travel",
                value: FIELD_WIDTH - 2.0 * SIDE_PADDING - self.paddle_width,
            });
        }
        Ok(())
    }
}

/// Percentage share of each brick kind in a level (sums to 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickDistribution {
    pub normal: u32,
    pub strong: u32,
    pub very_strong: u32,
    pub unbreakable: u32,
    pub explosive: u32,
    pub powerup: u32,
}

/// Escalating tiers, selected by `(level - 1) / 2`
const DISTRIBUTION_TIERS: [BrickDistribution; 4] = [
    BrickDistribution {
        normal: 70,
        strong: 15,
        very_strong: 0,
        unbreakable: 0,
        explosive: 5,
        powerup: 10,
    },
    BrickDistribution {
        normal: 55,
        strong: 20,
        very_strong: 5,
        unbreakable: 3,
        explosive: 7,
        powerup: 10,
    },
    BrickDistribution {
        normal: 40,
        strong: 25,
        very_strong: 12,
        unbreakable: 5,
        explosive: 8,
        powerup: 10,
    },
    BrickDistribution {
        normal: 30,
        strong: 25,
        very_strong: 20,
        unbreakable: 7,
        explosive: 8,
        powerup: 10,
    },
];

impl BrickDistribution {
    pub fn new(
        normal: u32,
        strong: u32,
        very_strong: u32,
        unbreakable: u32,
        explosive: u32,
        powerup: u32,
    ) -> Result<Self, ConfigError> {
        let dist = Self {
            normal,
            strong,
            very_strong,
            unbreakable,
            explosive,
            powerup,
        };
        dist.validate()?;
        Ok(dist)
    }

    pub fn total(&self) -> u32 {
        self.entries().iter().map(|(_, pct)| pct).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.total() {
            100 => Ok(()),
            total => Err(ConfigError::DistributionSum { total }),
        }
    }

    /// Kinds in sampling order
    pub fn entries(&self) -> [(BrickKind, u32); 6] {
        [
            (BrickKind::Normal, self.normal),
            (BrickKind::Strong, self.strong),
            (BrickKind::VeryStrong, self.very_strong),
            (BrickKind::Unbreakable, self.unbreakable),
            (BrickKind::Explosive, self.explosive),
            (BrickKind::PowerUp, self.powerup),
        ]
    }
}

/// Distribution tier index for a level (0..=3)
pub fn level_tier(level: u32) -> usize {
    ((level.saturating_sub(1) / 2) as usize).min(DISTRIBUTION_TIERS.len() - 1)
}

/// Brick mix for a level; harder kinds appear as levels climb
pub fn level_brick_distribution(level: u32) -> BrickDistribution {
    DISTRIBUTION_TIERS[level_tier(level)]
}

/// `base × min(1 + (level-1)×0.05, 1.5)`
pub fn level_ball_speed(level: u32, base: f32) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    base * (1.0 + steps * 0.05).min(1.5)
}

/// `base × max(0.5, 1 - (level-1)×0.02)`
pub fn level_power_up_chance(level: u32, base: f32) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    base * (1.0 - steps * 0.02).max(0.5)
}

/// Parameters for a single level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub rows: u32,
    pub cols: u32,
    pub distribution: BrickDistribution,
    pub ball_speed: f32,
    pub power_up_chance: f32,
}

impl LevelConfig {
    pub fn new(
        level: u32,
        rows: u32,
        cols: u32,
        distribution: BrickDistribution,
        ball_speed: f32,
        power_up_chance: f32,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        distribution.validate()?;
        ensure_positive("ball_speed", ball_speed)?;
        ensure_chance(power_up_chance)?;
        Ok(Self {
            level,
            rows,
            cols,
            distribution,
            ball_speed,
            power_up_chance,
        })
    }

    /// Derive a level's config from the difficulty preset
    pub fn for_level(difficulty: &DifficultyConfig, level: u32) -> Result<Self, ConfigError> {
        let level = level.max(1);
        let rows = (difficulty.brick_rows + (level - 1) / 2).min(MAX_BRICK_ROWS);
        Self::new(
            level,
            rows,
            BRICK_COLS,
            level_brick_distribution(level),
            level_ball_speed(level, difficulty.ball_speed),
            level_power_up_chance(level, difficulty.power_up_chance),
        )
    }
}
