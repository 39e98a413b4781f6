//! Match rules and scheduling on top of the core data types.
//!
//! - [`GameState`] - Board, active piece, hold slot, piece supply and stats
//! - [`GameLoop`] - Tick scheduler for gravity, held keys and one-shot keys
//! - [`GameSession`] - Configured match with pause and game-over states
//! - [`GameStats`] - Score, level and line statistics
//! - [`PieceGenerator`] - Bag-randomized piece supply with lookahead
//! - [`EngineConfig`] - Options fixed at match start
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from an [`EngineConfig`] and a seed
//! 2. Each tick, pass the held keys in an [`InputState`], or apply
//!    [`Command`]s directly
//! 3. Pieces fall, lock, clear lines and score
//! 4. The match ends when a piece locks in the top row or a new piece has no
//!    room to spawn
//!
//! # Example
//!
//! ```
//! use tetris_engine::{EngineConfig, GameSession, InputState, Key, PieceSeed};
//!
//! let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
//! let mut session = GameSession::with_seed(EngineConfig::default(), seed).unwrap();
//!
//! let mut input = InputState::new();
//! input.press(Key::HardDrop);
//! let locks = session.tick(&input);
//! assert_eq!(locks.len(), 1);
//! assert_eq!(session.score(), 2);
//! ```

pub use self::{
    config::*, game_loop::*, game_session::*, game_state::*, game_stats::*, gravity::*, hold::*,
    input::*, piece_generator::*, snapshot::*,
};

mod config;
mod game_loop;
mod game_session;
mod game_state;
mod game_stats;
mod gravity;
mod hold;
mod input;
mod piece_generator;
mod snapshot;
