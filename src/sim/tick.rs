//! Per-frame simulation step
//!
//! Order inside a playing frame: paddle, balls, bricks, power-ups, lasers,
//! effect timers, then combo / level / lives checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    ball_hits_paddle, find_brick_collision, is_ball_lost, paddle_bounce, paddle_hit_position,
    resolve_brick_bounce, resolve_wall_collision,
};
use super::level::{advance_level, damage_brick, explosion_victims, is_level_complete};
use super::physics::{
    launch, move_ball, ramp_speed, stick_to_paddle, substep_count, update_ball,
};
use super::powerup::{
    apply_power_up_effect, drop_kind_for, fire_laser, is_caught, laser_brick_collision,
    should_drop_power_up, update_active_power_ups, update_laser, update_power_up,
};
use super::scoring::{
    add_score, combo_milestone, lose_life, reset_after_life_lost, update_combo,
};
use super::state::{
    BrickKind, GameEvent, GamePhase, GameState, MAX_PARTICLES, Particle, PowerUp, PowerUpKind,
};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Paddle steering, -1 (left) to 1 (right)
    pub direction: f32,
    /// Launch stuck balls (click/tap/space)
    pub launch: bool,
    /// Fire the laser if armed
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

/// New snapshot plus the events produced while computing it
#[derive(Debug, Clone)]
pub struct StepResult {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Compute the next snapshot from the previous one
///
/// The input state is never modified; renderers may keep reading it.
pub fn advance(state: &GameState, input: &TickInput, dt: f32) -> StepResult {
    let mut next = state.clone();
    let events = tick(&mut next, input, dt);
    StepResult {
        state: next,
        events,
    }
}

/// Demo-mode input: chase the most dangerous ball, grab pickups when safe
pub fn autopilot_input(state: &GameState) -> TickInput {
    let paddle = &state.paddle;
    let mut input = TickInput {
        launch: state.is_playing() && state.balls.iter().any(|b| b.is_stuck),
        fire: paddle.has_laser,
        ..Default::default()
    };

    // Lowest ball still coming down
    let threat = state
        .balls
        .iter()
        .filter(|b| !b.is_stuck && b.vel.y > 0.0)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let safe = threat.is_none_or(|b| b.pos.y < FIELD_HEIGHT / 2.0);
    let pickup = state
        .power_ups
        .iter()
        .filter(|p| p.kind != PowerUpKind::Shrink)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = match (threat, pickup) {
        (_, Some(p)) if safe => Some(p.pos.x + POWERUP_WIDTH / 2.0),
        // Aim off-center so the bounce angle varies
        (Some(ball), _) => Some(ball.pos.x + (state.time * 1.7).sin() * paddle.width * 0.3),
        _ => None,
    };

    if let Some(x) = target_x {
        let error = x - paddle.center_x();
        input.direction = (error / (paddle.width / 4.0)).clamp(-1.0, 1.0);
    }
    input
}

/// Advance an owned state in place by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Countdown => {
                state.phase = GamePhase::Paused;
                return events;
            }
            GamePhase::Paused => {
                state.phase = if state.countdown > 0.0 {
                    GamePhase::Countdown
                } else {
                    GamePhase::Playing
                };
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return events,
        _ => {}
    }

    state.time += dt;

    match state.phase {
        GamePhase::Countdown => {
            state.paddle.steer(input.direction, dt);
            for ball in state.balls.iter_mut() {
                ball.follow_paddle(&state.paddle);
            }
            update_particles(state, dt);

            state.countdown = (state.countdown - dt).max(0.0);
            if state.countdown == 0.0 {
                state.phase = GamePhase::Playing;
            }
        }

        GamePhase::Playing => {
            step_playing(state, input, dt, &mut events);
            state.normalize_order();
        }

        GamePhase::Paused | GamePhase::GameOver => {}
    }

    events
}

fn step_playing(state: &mut GameState, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
    // --- PADDLE ---
    state.paddle.steer(input.direction, dt);
    state.paddle.laser_cooldown = (state.paddle.laser_cooldown - dt).max(0.0);

    if input.launch {
        let base_speed = state.level_config.ball_speed;
        for ball in state.balls.iter_mut().filter(|b| b.is_stuck) {
            launch(ball, &state.paddle, base_speed);
        }
    }

    if input.fire {
        if let Some(mut laser) = fire_laser(&state.paddle, 0) {
            laser.id = state.next_entity_id();
            state.lasers.push(laser);
            state.paddle.laser_cooldown = LASER_COOLDOWN;
            events.push(GameEvent::LaserFired);
        }
    }

    // --- BALLS ---
    let invincible = state.has_effect(PowerUpKind::Invincible);
    let ramp = state.difficulty.speed_increase;
    let mut brick_hits = Vec::new();

    for i in 0..state.balls.len() {
        if state.balls[i].is_stuck {
            state.balls[i] = update_ball(&state.balls[i], &state.paddle, dt);
            continue;
        }

        let mut ball = state.balls[i].clone();
        ball.record_trail();

        // Small steps so fast balls can't skip through bricks or the paddle
        let num_steps = substep_count(ball.speed() * dt, ball.radius * 0.3);
        let step_dt = dt / num_steps as f32;
        let mut brick_resolved = false;

        for _step in 0..num_steps {
            move_ball(&mut ball, step_dt);

            if resolve_wall_collision(&mut ball).is_some() {
                events.push(GameEvent::WallBounce { ball_id: ball.id });
            }

            if ball_hits_paddle(&ball, &state.paddle) {
                events.push(GameEvent::PaddleHit { ball_id: ball.id });
                if state.paddle.is_sticky {
                    stick_to_paddle(&mut ball, &state.paddle);
                    break;
                }
                let hit = paddle_hit_position(ball.pos.x, &state.paddle);
                ball.vel = paddle_bounce(ball.vel, hit);
                ball.pos.y = state.paddle.pos.y - ball.radius;
            }

            // One brick per ball per frame; invincible balls pass through
            if !invincible && !brick_resolved {
                if let Some(idx) = find_brick_collision(&ball, &state.bricks) {
                    let rect = state.bricks[idx].rect();
                    resolve_brick_bounce(&mut ball, &rect);
                    ramp_speed(&mut ball, ramp);
                    brick_hits.push(idx);
                    brick_resolved = true;
                }
            }

            if is_ball_lost(&ball) {
                break;
            }
        }

        state.balls[i] = ball;
    }

    for ball in state.balls.iter().filter(|b| is_ball_lost(b)) {
        events.push(GameEvent::BallLost { ball_id: ball.id });
    }
    state.balls.retain(|b| !is_ball_lost(b));

    // --- BRICKS ---
    for idx in brick_hits {
        hit_brick(state, idx, events);
    }

    // --- POWER-UPS ---
    let mut collected = Vec::new();
    let mut falling = Vec::with_capacity(state.power_ups.len());
    for power_up in &state.power_ups {
        let moved = update_power_up(power_up, dt);
        if is_caught(&moved, &state.paddle) {
            collected.push(moved.kind);
        } else if moved.is_active {
            falling.push(moved);
        }
    }
    state.power_ups = falling;
    for kind in collected {
        apply_power_up_effect(state, kind);
        events.push(GameEvent::PowerUpCollected { kind });
    }

    // --- LASERS ---
    let lasers = std::mem::take(&mut state.lasers);
    for mut laser in lasers {
        let num_steps = substep_count(laser.vel.length() * dt, laser.height);
        let step_dt = dt / num_steps as f32;
        let mut struck = None;
        for _step in 0..num_steps {
            laser = update_laser(&laser, step_dt);
            if !laser.is_active {
                break;
            }
            struck = laser_brick_collision(&laser, &state.bricks);
            if struck.is_some() {
                break;
            }
        }

        match struck {
            Some(idx) => {
                events.push(GameEvent::LaserHit {
                    brick_id: state.bricks[idx].id,
                });
                hit_brick(state, idx, events);
            }
            None if laser.is_active => state.lasers.push(laser),
            None => {}
        }
    }

    // --- TIMERS ---
    update_active_power_ups(state, dt, events);
    update_combo(&mut state.score, dt);
    update_particles(state, dt);

    // --- LEVEL ---
    if is_level_complete(&state.bricks) {
        let level = state.score.level;
        log::info!("Level {} complete, score {}", level, state.score.score);
        events.push(GameEvent::LevelComplete { level });
        if let Err(err) = advance_level(state) {
            // No next level to play
            log::error!("Could not build level {}: {}", level + 1, err);
            end_game(state, events);
            return;
        }
    }

    // --- LIVES ---
    if state.balls.is_empty() {
        let game_over = lose_life(&mut state.score);
        events.push(GameEvent::LifeLost {
            lives_remaining: state.score.lives,
        });
        if game_over {
            end_game(state, events);
        } else {
            reset_after_life_lost(state);
            log::info!("Life lost, {} remaining", state.score.lives);
        }
    }
}

fn end_game(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.score.combo = 0;
    state.phase = GamePhase::GameOver;
    log::info!(
        "Game over at level {} with score {}",
        state.score.level,
        state.score.score
    );
    events.push(GameEvent::GameOver {
        score: state.score.score,
        level: state.score.level,
    });
}

/// Apply one point of damage to the brick at `idx` and everything that follows
///
/// Explosive bricks damage their neighbours once; victims do not re-detonate.
fn hit_brick(state: &mut GameState, idx: usize, events: &mut Vec<GameEvent>) {
    if state.bricks[idx].is_destroyed {
        return;
    }
    events.push(GameEvent::BrickHit {
        brick_id: state.bricks[idx].id,
        kind: state.bricks[idx].kind,
    });

    let damaged = damage_brick(&state.bricks[idx], 1);
    state.bricks[idx] = damaged.clone();
    if !damaged.is_destroyed {
        return;
    }
    brick_destroyed(state, idx, events);

    if damaged.kind == BrickKind::Explosive {
        for victim in explosion_victims(&damaged, &state.bricks) {
            let before = &state.bricks[victim];
            events.push(GameEvent::BrickHit {
                brick_id: before.id,
                kind: before.kind,
            });
            let after = damage_brick(before, 1);
            let newly_destroyed = after.is_destroyed;
            state.bricks[victim] = after;
            if newly_destroyed {
                brick_destroyed(state, victim, events);
            }
        }
    }
}

/// Score, debris and drop roll for a brick that just hit zero HP
fn brick_destroyed(state: &mut GameState, idx: usize, events: &mut Vec<GameEvent>) {
    let brick = state.bricks[idx].clone();
    events.push(GameEvent::BrickDestroyed {
        brick_id: brick.id,
        kind: brick.kind,
    });

    let combo_before = state.score.combo;
    state.score = add_score(&state.score, &brick);
    if let Some(combo) = combo_milestone(combo_before, state.score.combo) {
        events.push(GameEvent::ComboMilestone { combo });
    }

    spawn_debris(state, brick.center(), brick.color, brick.id);

    if should_drop_power_up(&brick, state.level_config.power_up_chance, &mut state.rng) {
        let kind = drop_kind_for(&brick, &mut state.rng);
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp::new(id, brick.center(), kind));
        events.push(GameEvent::PowerUpDropped { kind });
    }
}

/// Brick debris; hash-driven so visuals never consume gameplay randomness
fn spawn_debris(state: &mut GameState, center: Vec2, color: u32, seed: u32) {
    let particle_count = 12;
    for i in 0..particle_count {
        if state.particles.len() >= MAX_PARTICLES {
            // Remove oldest particles to make room
            state.particles.remove(0);
        }
        let hash = seed
            .wrapping_mul(2654435761)
            .wrapping_add(i * 7919);
        let angle = (hash % 1000) as f32 / 1000.0 * std::f32::consts::TAU;
        let speed = 60.0 + ((hash / 1000) % 120) as f32;
        let size = 2.0 + ((hash / 100_000) % 100) as f32 / 100.0 * 3.0;
        state.particles.push(Particle {
            pos: center,
            vel: Vec2::from_angle(angle) * speed,
            color,
            life: 1.0,
            size,
        });
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        // Light gravity and drag
        particle.vel.y += 200.0 * dt;
        particle.vel *= 0.98;
        particle.life -= dt * 1.5;
        particle.size *= 0.995;
    }
    state.particles.retain(|p| p.life > 0.0);
}
