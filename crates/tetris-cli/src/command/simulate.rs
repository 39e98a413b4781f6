use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use rand::{Rng, rngs::ThreadRng};
use tetris_engine::{GameSession, InputState, Key, KeyEvent, PieceSeed};

use crate::util::{self, Output};

/// Chance per tick that a random-mode driver flips a key.
const RANDOM_TOGGLE_PROBABILITY: f64 = 0.05;

/// Where key presses come from when no script is given.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr)]
pub enum InputMode {
    /// Press nothing; pieces fall and lock under gravity.
    #[default]
    Idle,
    /// Press and release keys at random (not reproducible).
    Random,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Piece seed as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Number of ticks to run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Key script file (JSON list of {tick, key, pressed})
    #[arg(long)]
    script: Option<PathBuf>,
    /// Input used when no script is given
    #[arg(long, default_value_t)]
    input: InputMode,
    /// Override the configured start level
    #[arg(long)]
    start_level: Option<u32>,
    /// Halve the gravity delay
    #[arg(long)]
    accelerated_gravity: bool,
    /// Snapshot output file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Lock event output file (JSON lines)
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug)]
enum InputDriver {
    Idle,
    Random(ThreadRng),
    Script { events: Vec<KeyEvent>, next: usize },
}

impl InputDriver {
    /// Applies the key changes scheduled for `tick`.
    fn update(&mut self, tick: u64, input: &mut InputState) {
        match self {
            Self::Idle => {}
            Self::Random(rng) => {
                for key in Key::ALL {
                    if rng.random_bool(RANDOM_TOGGLE_PROBABILITY) {
                        if input.is_pressed(key) {
                            input.release(key);
                        } else {
                            input.press(key);
                        }
                    }
                }
            }
            Self::Script { events, next } => {
                while let Some(event) = events.get(*next).filter(|event| event.tick <= tick) {
                    input.apply(event);
                    *next += 1;
                }
            }
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        seed,
        ticks,
        config,
        script,
        input,
        start_level,
        accelerated_gravity,
        output,
        events,
    } = arg;

    let mut config = match config {
        Some(path) => util::read_config_file(path)?,
        None => tetris_engine::EngineConfig::default(),
    };
    if let Some(level) = start_level {
        config.start_level = *level;
    }
    if *accelerated_gravity {
        config.accelerated_gravity = true;
    }

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Piece seed: {}", seed.to_hex());

    let mut driver = match (script, input) {
        (Some(path), _) => {
            let events = util::read_script_file(path)?;
            eprintln!("Loaded {} key events from {}", events.len(), path.display());
            InputDriver::Script { events, next: 0 }
        }
        (None, InputMode::Idle) => InputDriver::Idle,
        (None, InputMode::Random) => InputDriver::Random(rand::rng()),
    };
    let mut event_output = events.clone().map(Output::open).transpose()?;

    let mut session =
        GameSession::with_seed(config, seed).context("Invalid engine configuration")?;
    let mut input = InputState::new();

    eprintln!("Simulating {ticks} ticks...");
    for tick in 0..*ticks {
        driver.update(tick, &mut input);
        for event in session.tick(&input) {
            if event.leveled_up {
                eprintln!("Level {} reached at tick {}", event.level + 1, tick + 1);
            }
            if let Some(output) = &mut event_output {
                output.write_json_line(&event)?;
            }
        }
        if session.is_game_over() {
            eprintln!("Game over at tick {}", tick + 1);
            break;
        }
    }
    if let Some(mut output) = event_output {
        output
            .flush()
            .with_context(|| format!("Failed to flush {}", output.display_path()))?;
        eprintln!("Lock events written to {}", output.display_path());
    }

    let stats = session.state().stats();
    eprintln!(
        "Simulated {:.2}s: {} pieces, {} lines, score {}, level {}",
        session.duration().as_secs_f64(),
        stats.completed_pieces(),
        stats.total_cleared_lines(),
        stats.score(),
        stats.level(),
    );

    Output::save_json(&session.snapshot(Utc::now()), output.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tick: u64, key: Key, pressed: bool) -> KeyEvent {
        KeyEvent { tick, key, pressed }
    }

    #[test]
    fn test_script_applies_events_up_to_tick() {
        let mut driver = InputDriver::Script {
            events: vec![
                event(0, Key::Left, true),
                event(2, Key::Left, false),
                event(2, Key::Rotate, true),
            ],
            next: 0,
        };
        let mut input = InputState::new();
        driver.update(0, &mut input);
        assert!(input.is_pressed(Key::Left));
        driver.update(1, &mut input);
        assert!(input.is_pressed(Key::Left));
        driver.update(2, &mut input);
        assert!(!input.is_pressed(Key::Left));
        assert!(input.is_pressed(Key::Rotate));
    }

    #[test]
    fn test_input_mode_parses_display() {
        for mode in [InputMode::Idle, InputMode::Random] {
            assert_eq!(mode.to_string().parse::<InputMode>().unwrap(), mode);
        }
    }
}
