use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand_pcg::Pcg32;

use crate::{
    ConfigError, HoldError,
    core::{
        board::Board,
        collision::Move,
        piece::Piece,
    },
};

use super::{
    config::EngineConfig,
    game_loop::{GameLoop, TickHook},
    game_state::{GameState, LockEvent, MoveOutcome},
    input::{Command, InputState},
    piece_generator::{PieceGenerator, PieceSeed},
    snapshot::MatchSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// Result of [`GameSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum CommandOutcome {
    Move(MoveOutcome),
    Hold(Result<(), HoldError>),
    /// The session is paused or over, so the command was dropped.
    Ignored,
}

/// A configured match driven by ticks and commands.
#[derive(Debug, Clone)]
pub struct GameSession<R = Pcg32> {
    config: EngineConfig,
    state: GameState<R>,
    game_loop: GameLoop,
    session_state: SessionState,
}

impl GameSession {
    /// Starts a match with a random piece seed.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        Self::with_generator(config, PieceGenerator::with_seed(seed))
    }
}

impl<R> GameSession<R>
where
    R: Rng,
{
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_generator(config, PieceGenerator::with_rng(rng))
    }

    fn with_generator(
        config: EngineConfig,
        generator: PieceGenerator<R>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = generator.with_spawn_col(config.spawn_col);
        let state = GameState::new(config.dims, config.start_level, generator);
        let game_loop = GameLoop::new(
            config.tick_rate_hz,
            config.move_repeat_delay(),
            config.accelerated_gravity,
        );
        let mut this = Self {
            config,
            state,
            game_loop,
            session_state: SessionState::Playing,
        };
        this.sync_game_over();
        Ok(this)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState<R> {
        &self.state
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.game_loop.ticks()
    }

    /// Simulated play time, not counting paused ticks.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.game_loop.elapsed()
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    /// Runs one tick and returns the locks it caused.
    pub fn tick(&mut self, input: &InputState) -> Vec<LockEvent> {
        let mut events = Vec::new();
        self.tick_with(input, &mut events);
        events
    }

    /// Runs one tick, reporting to `hook`.
    ///
    /// While paused or over only [`TickHook::before_tick`] runs.
    pub fn tick_with<H>(&mut self, input: &InputState, hook: &mut H)
    where
        H: TickHook<R> + ?Sized,
    {
        if !self.session_state.is_playing() {
            hook.before_tick(&self.state);
            return;
        }
        self.game_loop.tick(&mut self.state, input, hook);
        self.sync_game_over();
    }

    /// Applies a single command immediately.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        if !self.session_state.is_playing() {
            return CommandOutcome::Ignored;
        }
        let outcome = match command {
            Command::Left => CommandOutcome::Move(self.state.move_piece(Move::Left)),
            Command::Right => CommandOutcome::Move(self.state.move_piece(Move::Right)),
            Command::Rotate => CommandOutcome::Move(self.state.move_piece(Move::Rotate)),
            Command::Down => CommandOutcome::Move(self.state.soft_drop()),
            Command::HardDrop => CommandOutcome::Move(self.state.hard_drop()),
            Command::Hold => CommandOutcome::Hold(self.state.hold()),
        };
        self.sync_game_over();
        outcome
    }

    fn sync_game_over(&mut self) {
        if self.state.is_game_over() {
            self.session_state = SessionState::GameOver;
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.state.board()
    }

    /// Board as shown to the player, with the active piece drawn in.
    ///
    /// Locked cells are hidden when `invisible_locked_cells` is set.
    #[must_use]
    pub fn display_cells(&self) -> Board {
        let mut board = if self.config.invisible_locked_cells {
            Board::new(self.config.dims)
        } else {
            self.state.board().clone()
        };
        if let Some(piece) = self.state.active_piece() {
            board.fill_piece(piece);
        }
        board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.state.active_piece()
    }

    /// Landing position of the active piece, if the preview is enabled.
    #[must_use]
    pub fn landing_preview(&self) -> Option<Piece> {
        if !self.config.show_landing_preview {
            return None;
        }
        self.state.landing()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.state.next_pieces()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.state.held_piece()
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.state.stats().score()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.state.level()
    }

    #[must_use]
    pub fn rows_cleared(&self) -> u32 {
        self.state.stats().total_cleared_lines()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> MatchSnapshot {
        MatchSnapshot {
            board: self.state.board().clone(),
            active_piece: self.state.active_piece().cloned(),
            next_pieces: self.state.next_pieces().cloned().collect(),
            saved_piece: self.state.hold_slot().clone(),
            game_over: self.state.is_game_over(),
            score: self.score(),
            level: self.level(),
            rows_cleared: self.rows_cleared(),
            timestamp,
        }
    }
}
