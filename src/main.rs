//! Brick Breaker headless driver
//!
//! Plays a seeded session on autopilot at a fixed timestep and prints a JSON
//! summary. Useful for replaying a seed or checking balance changes.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::{Result, anyhow};
    use clap::Parser;
    use serde::Serialize;

    use brick_breaker::sim::{GameEvent, GameState, ScoreSubmission, autopilot_input, tick};
    use brick_breaker::{Difficulty, DifficultyConfig};

    const STEP: f32 = 1.0 / 60.0;

    /// Run a seeded Breakout session without a window.
    #[derive(Parser)]
    #[command(name = "brick-breaker", version)]
    struct Args {
        /// RNG seed for the session
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// easy, normal, hard or expert
        #[arg(long, default_value = "normal", value_parser = parse_difficulty)]
        difficulty: Difficulty,
        /// Simulated seconds before giving up
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        difficulty: &'static str,
        simulated_seconds: f32,
        score: u64,
        level: u32,
        lives: u32,
        best_combo: u32,
        bricks_destroyed: u32,
        power_ups_collected: usize,
        submission: Option<ScoreSubmission>,
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();
        if !(args.seconds.is_finite() && args.seconds > 0.0) {
            return Err(anyhow!("--seconds must be positive, got {}", args.seconds));
        }

        let config = DifficultyConfig::preset(args.difficulty);
        let mut state = GameState::new(config, args.seed)?;
        log::info!(
            "Brick Breaker starting: seed {}, {}",
            args.seed,
            args.difficulty.as_str()
        );

        let mut collected = 0;
        while state.time < args.seconds && !state.is_game_over() {
            let input = autopilot_input(&state);
            for event in tick(&mut state, &input, STEP) {
                match event {
                    GameEvent::PowerUpCollected { kind } => {
                        collected += 1;
                        log::debug!("Collected {:?}", kind);
                    }
                    GameEvent::LevelComplete { level } => log::info!("Cleared level {}", level),
                    GameEvent::LifeLost { lives_remaining } => {
                        log::info!("Life lost, {} left", lives_remaining)
                    }
                    GameEvent::ComboMilestone { combo } => log::debug!("Combo x{}", combo),
                    _ => {}
                }
            }
        }

        let summary = Summary {
            seed: args.seed,
            difficulty: args.difficulty.as_str(),
            simulated_seconds: state.time,
            score: state.score.score,
            level: state.score.level,
            lives: state.score.lives,
            best_combo: state.score.best_combo,
            bricks_destroyed: state.score.bricks_destroyed,
            power_ups_collected: collected,
            submission: state.submission(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm
}
