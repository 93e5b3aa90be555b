//! Game state and core simulation types
//!
//! Every entity is a plain value. Nothing holds a reference to another entity;
//! relationships go through ids.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level;
use crate::config::{DifficultyConfig, LevelConfig};
use crate::consts::*;
use crate::error::ConfigError;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-play countdown; the paddle moves, the ball stays stuck
    Countdown,
    /// Active gameplay
    Playing,
    /// Host paused the session
    Paused,
    /// Run ended, terminal
    GameOver,
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Normal,
    Strong,
    VeryStrong,
    /// Cannot be destroyed, doesn't count for level clear
    Unbreakable,
    Explosive,
    PowerUp,
}

impl BrickKind {
    /// Starting hit points. `u32::MAX` stands for infinite.
    pub fn hit_points(&self) -> u32 {
        match self {
            BrickKind::VeryStrong => 3,
            BrickKind::Strong => 2,
            BrickKind::Unbreakable => u32::MAX,
            BrickKind::Normal | BrickKind::Explosive | BrickKind::PowerUp => 1,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            BrickKind::Normal => 10,
            BrickKind::Strong => 20,
            BrickKind::VeryStrong => 30,
            BrickKind::Unbreakable => 0,
            BrickKind::Explosive => 15,
            BrickKind::PowerUp => 10,
        }
    }

    /// 0xRRGGBB
    pub fn color(&self) -> u32 {
        match self {
            BrickKind::Normal => 0x4fc3f7,
            BrickKind::Strong => 0x81c784,
            BrickKind::VeryStrong => 0xe57373,
            BrickKind::Unbreakable => 0x9e9e9e,
            BrickKind::Explosive => 0xff9800,
            BrickKind::PowerUp => 0xba68c8,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Expand,
    Shrink,
    MultiBall,
    Laser,
    Sticky,
    Slow,
    Fast,
    ExtraLife,
    PointsX2,
    Invincible,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 10] = [
        PowerUpKind::Expand,
        PowerUpKind::Shrink,
        PowerUpKind::MultiBall,
        PowerUpKind::Laser,
        PowerUpKind::Sticky,
        PowerUpKind::Slow,
        PowerUpKind::Fast,
        PowerUpKind::ExtraLife,
        PowerUpKind::PointsX2,
        PowerUpKind::Invincible,
    ];

    /// Relative drop weight
    pub fn weight(&self) -> u32 {
        match self {
            PowerUpKind::Expand => 20,
            PowerUpKind::Shrink => 10,
            PowerUpKind::MultiBall => 15,
            PowerUpKind::Laser => 15,
            PowerUpKind::Sticky => 15,
            PowerUpKind::Slow => 15,
            PowerUpKind::Fast => 5,
            PowerUpKind::ExtraLife => 5,
            PowerUpKind::PointsX2 => 10,
            PowerUpKind::Invincible => 5,
        }
    }

    /// Effect duration in seconds; `None` for instantaneous effects
    pub fn duration(&self) -> Option<f32> {
        match self {
            PowerUpKind::Expand | PowerUpKind::Laser | PowerUpKind::Sticky => Some(10.0),
            PowerUpKind::PointsX2 => Some(10.0),
            PowerUpKind::Shrink | PowerUpKind::Slow | PowerUpKind::Fast => Some(8.0),
            PowerUpKind::Invincible => Some(5.0),
            PowerUpKind::MultiBall | PowerUpKind::ExtraLife => None,
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    /// Horizontal velocity (px/s)
    pub vel_x: f32,
    pub width: f32,
    pub height: f32,
    /// Width at `size_multiplier == 1.0`
    pub base_width: f32,
    pub size_multiplier: f32,
    pub is_sticky: bool,
    pub has_laser: bool,
    /// Seconds until the next laser may fire
    pub laser_cooldown: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new(PADDLE_WIDTH)
    }
}

impl Paddle {
    /// Centered paddle with default modifiers
    pub fn new(base_width: f32) -> Self {
        Self {
            pos: Vec2::new((FIELD_WIDTH - base_width) / 2.0, PADDLE_Y),
            vel_x: 0.0,
            width: base_width,
            height: PADDLE_HEIGHT,
            base_width,
            size_multiplier: 1.0,
            is_sticky: false,
            has_laser: false,
            laser_cooldown: 0.0,
        }
    }

    pub fn min_x(&self) -> f32 {
        SIDE_PADDING
    }

    pub fn max_x(&self) -> f32 {
        (FIELD_WIDTH - SIDE_PADDING - self.width).max(SIDE_PADDING)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(self.width, self.height))
    }

    /// Keep the paddle inside its travel range
    pub fn clamp_to_field(&mut self) {
        self.pos.x = self.pos.x.clamp(self.min_x(), self.max_x());
    }

    /// Move by input direction (-1 left, +1 right)
    pub fn steer(&mut self, direction: f32, dt: f32) {
        self.vel_x = direction.clamp(-1.0, 1.0) * PADDLE_SPEED;
        self.pos.x += self.vel_x * dt;
        self.clamp_to_field();
    }

    /// Resize around the current center
    pub fn set_size_multiplier(&mut self, multiplier: f32) {
        let center = self.center_x();
        self.size_multiplier = multiplier;
        self.width = self.base_width * multiplier;
        self.pos.x = center - self.width / 2.0;
        self.clamp_to_field();
    }

    /// Drop size, sticky and laser modifiers
    pub fn reset_modifiers(&mut self) {
        self.set_size_multiplier(1.0);
        self.is_sticky = false;
        self.has_laser = false;
        self.laser_cooldown = 0.0;
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Grows with brick hits, capped at `MAX_SPEED_MULTIPLIER`
    pub speed_multiplier: f32,
    /// Riding the paddle, waiting for launch
    pub is_stuck: bool,
    /// Horizontal offset from paddle center while stuck
    pub stuck_offset: f32,
    pub is_active: bool,
    /// Recent centers for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Ball {
    /// A fresh ball resting on the paddle center
    pub fn new_stuck(id: u32, paddle: &Paddle) -> Self {
        let mut ball = Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            speed_multiplier: 1.0,
            is_stuck: true,
            stuck_offset: 0.0,
            is_active: true,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        };
        ball.follow_paddle(paddle);
        ball
    }

    /// Pin a stuck ball on top of the paddle
    pub fn follow_paddle(&mut self, paddle: &Paddle) {
        if self.is_stuck {
            self.pos = Vec2::new(
                paddle.center_x() + self.stuck_offset,
                paddle.pos.y - self.radius - 1.0,
            );
        }
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        self.trail.truncate(TRAIL_LENGTH);
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A brick entity (axis-aligned box)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: BrickKind,
    pub hp: u32,
    pub max_hp: u32,
    pub is_destroyed: bool,
    pub points: u32,
    pub color: u32,
    /// Drop assigned at creation for `PowerUp` bricks
    pub power_up: Option<PowerUpKind>,
}

impl Brick {
    pub fn new(id: u32, pos: Vec2, width: f32, height: f32, kind: BrickKind) -> Self {
        let hp = kind.hit_points();
        Self {
            id,
            pos,
            width,
            height,
            kind,
            hp,
            max_hp: hp,
            is_destroyed: false,
            points: kind.points(),
            color: kind.color(),
            power_up: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(self.width, self.height))
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Returns true if this brick must be destroyed to clear the level
    pub fn counts_for_clear(&self) -> bool {
        self.kind != BrickKind::Unbreakable
    }

    /// Still on the board and collidable
    pub fn is_solid(&self) -> bool {
        !self.is_destroyed
    }
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: PowerUpKind,
    pub is_active: bool,
}

impl PowerUp {
    /// Spawn centered on `center`, falling
    pub fn new(id: u32, center: Vec2, kind: PowerUpKind) -> Self {
        Self {
            id,
            pos: center - Vec2::new(POWERUP_WIDTH, POWERUP_HEIGHT) / 2.0,
            vel: Vec2::new(0.0, POWERUP_FALL_SPEED),
            kind,
            is_active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(POWERUP_WIDTH, POWERUP_HEIGHT))
    }
}

/// A running timed effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub time_remaining: f32,
    pub duration: f32,
}

/// A laser bolt fired from the paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub is_active: bool,
}

impl Laser {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(self.width, self.height))
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0xRRGGBB of the source brick
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Score, lives and combo bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub bricks_destroyed: u32,
    /// Breakable bricks in the current level
    pub total_bricks: u32,
    /// Score multiplier (2.0 while points-2x is active)
    pub multiplier: f32,
    pub combo: u32,
    pub best_combo: u32,
    /// Seconds since the last brick destruction
    pub since_last_hit: f32,
}

impl ScoreState {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            level: 1,
            lives,
            bricks_destroyed: 0,
            total_bricks: 0,
            multiplier: 1.0,
            combo: 0,
            best_combo: 0,
            since_last_hit: 0.0,
        }
    }
}

/// Discrete happenings for audio/UI collaborators, drained after each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickHit { brick_id: u32, kind: BrickKind },
    BrickDestroyed { brick_id: u32, kind: BrickKind },
    PaddleHit { ball_id: u32 },
    WallBounce { ball_id: u32 },
    PowerUpDropped { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    LaserFired,
    LaserHit { brick_id: u32 },
    BallLost { ball_id: u32 },
    LifeLost { lives_remaining: u32 },
    LevelComplete { level: u32 },
    GameOver { score: u64, level: u32 },
    ComboMilestone { combo: u32 },
}

/// Final tuple handed to the score-submission collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: u64,
    pub level: u32,
    pub session_id: u64,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub session_id: u64,
    /// Gameplay RNG (drops, brick rolls)
    pub rng: Pcg32,
    pub difficulty: DifficultyConfig,
    pub level_config: LevelConfig,
    pub phase: GamePhase,
    /// Seconds left in the countdown phase
    pub countdown: f32,
    /// Simulated seconds
    pub time: f32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    /// Destroyed bricks stay in place (flagged) until the level changes
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub lasers: Vec<Laser>,
    pub active_power_ups: Vec<ActivePowerUp>,
    pub score: ScoreState,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a session at level 1 in the countdown phase
    pub fn new(difficulty: DifficultyConfig, seed: u64) -> Result<Self, ConfigError> {
        difficulty.validate()?;
        let level_config = LevelConfig::for_level(&difficulty, 1)?;
        let paddle = Paddle::new(difficulty.paddle_width);
        let session_id = seed
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .rotate_left(17);

        let mut state = Self {
            seed,
            session_id,
            rng: Pcg32::seed_from_u64(seed),
            score: ScoreState::new(difficulty.lives),
            difficulty,
            level_config,
            phase: GamePhase::Countdown,
            countdown: COUNTDOWN_SECONDS,
            time: 0.0,
            paddle,
            balls: Vec::new(),
            bricks: Vec::new(),
            power_ups: Vec::new(),
            lasers: Vec::new(),
            active_power_ups: Vec::new(),
            particles: Vec::new(),
            next_id: 1,
        };

        state.build_bricks();
        state.spawn_ball_stuck();
        log::info!(
            "Session {:x} started on {} (seed {})",
            state.session_id,
            state.difficulty.difficulty.as_str(),
            seed
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a ball stuck to the paddle
    pub fn spawn_ball_stuck(&mut self) {
        let id = self.next_entity_id();
        self.balls.push(Ball::new_stuck(id, &self.paddle));
    }

    /// Lay out the grid for the current level config
    pub fn build_bricks(&mut self) {
        let bricks = level::generate_bricks(&self.level_config, &mut self.rng, self.next_id);
        self.next_id += bricks.len() as u32;
        self.score.total_bricks = bricks.iter().filter(|b| b.counts_for_clear()).count() as u32;
        self.bricks = bricks;
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Whether the timed effect is currently running
    pub fn has_effect(&self, kind: PowerUpKind) -> bool {
        self.active_power_ups.iter().any(|e| e.kind == kind)
    }

    /// Score tuple for submission, only once the run has ended
    pub fn submission(&self) -> Option<ScoreSubmission> {
        self.is_game_over().then(|| ScoreSubmission {
            score: self.score.score,
            level: self.score.level,
            session_id: self.session_id,
        })
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.bricks.sort_by_key(|b| b.id);
        self.power_ups.sort_by_key(|p| p.id);
        self.lasers.sort_by_key(|l| l.id);
    }
}
