use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    HoldError, PieceCollisionError,
    core::{
        board::{Board, BoardDims},
        collision::{Collision, Move, check_collision},
        piece::{Coord, Coords, Piece, PieceColor, PieceKind},
    },
};

use super::{
    game_stats::{DropType, GameStats, ScoredAction},
    hold::HoldSlot,
    piece_generator::{PieceGenerator, PieceSeed},
};

/// Everything that happened when a piece locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEvent {
    pub drop_type: DropType,
    pub kind: PieceKind,
    pub color: PieceColor,
    /// Cells the piece occupied when it merged.
    pub coords: Coords,
    /// Indices of the cleared rows before the clear, bottom to top.
    pub cleared_rows: Vec<usize>,
    pub action: ScoredAction,
    pub points: u32,
    /// Level the lock was scored at.
    pub level: u32,
    pub leveled_up: bool,
    pub game_over: bool,
}

/// Result of moving, rotating or dropping the active piece.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The piece moved or rotated.
    Moved,
    /// The move was rejected and nothing changed.
    Blocked,
    /// The piece locked into the board.
    Locked(LockEvent),
    /// There is no active piece to move.
    Idle,
}

/// Complete rules state of one match.
///
/// Owns the board, the active piece, the hold slot, the piece supply and the
/// statistics. All moves go through the collision resolver; a piece that
/// cannot move down locks, clears lines, scores and spawns the next piece.
///
/// # Game over
///
/// The match ends when a locked cell lands in row 0, or when a newly spawned
/// piece overlaps the stack. After that the active piece is `None` and every
/// operation is a no-op.
///
/// # Example
///
/// ```
/// use tetris_engine::{BoardDims, GameState, MoveOutcome, Move, PieceSeed};
///
/// let seed: PieceSeed = "00000000000000000000000000000001".parse().unwrap();
/// let mut state = GameState::with_seed(BoardDims::STANDARD, 1, seed);
/// assert_eq!(state.move_piece(Move::Left), MoveOutcome::Moved);
///
/// let landing = state.landing().unwrap();
/// let MoveOutcome::Locked(event) = state.hard_drop() else { unreachable!() };
/// assert_eq!(event.coords.as_slice(), landing.coords());
/// assert_eq!(state.stats().score(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GameState<R = Pcg32> {
    board: Board,
    active: Option<Piece>,
    hold: HoldSlot,
    generator: PieceGenerator<R>,
    stats: GameStats,
    last_drop_type: Option<DropType>,
    game_over: bool,
}

impl GameState {
    #[must_use]
    pub fn with_seed(dims: BoardDims, start_level: u32, seed: PieceSeed) -> Self {
        Self::new(dims, start_level, PieceGenerator::with_seed(seed))
    }
}

impl<R> GameState<R>
where
    R: Rng,
{
    /// Starts a match on an empty board and spawns the first piece.
    pub fn new(dims: BoardDims, start_level: u32, generator: PieceGenerator<R>) -> Self {
        let mut this = Self {
            board: Board::new(dims),
            active: None,
            hold: HoldSlot::new(),
            generator,
            stats: GameStats::new(start_level),
            last_drop_type: None,
            game_over: false,
        };
        let first = this.generator.next_piece();
        this.spawn(first);
        this
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn hold_slot(&self) -> &HoldSlot {
        &self.hold
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.hold.piece()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.generator.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    #[must_use]
    pub fn last_drop_type(&self) -> Option<DropType> {
        self.last_drop_type
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Where the active piece would land if hard-dropped now.
    #[must_use]
    pub fn landing(&self) -> Option<Piece> {
        self.active.as_ref().map(|piece| piece.landed(&self.board))
    }

    /// Replaces the active piece if it fits on the board.
    pub fn set_active_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.game_over || !check_collision(Move::Rotate, piece.coords(), &self.board).is_no() {
            return Err(PieceCollisionError);
        }
        self.active = Some(piece);
        Ok(())
    }

    /// Tests `mv` without changing anything.
    #[must_use]
    pub fn check(&self, mv: Move) -> Option<Collision> {
        let piece = self.active.as_ref()?;
        Some(match mv {
            Move::Rotate => match piece.rotated_cw(&self.board) {
                Some(_) => Collision::No,
                None => Collision::Continue,
            },
            Move::Down | Move::Left | Move::Right => {
                check_collision(mv, piece.translated(mv).coords(), &self.board)
            }
        })
    }

    /// Moves or rotates the active piece without locking.
    ///
    /// A downward move that hits the stack leaves the piece in place and
    /// reports [`MoveOutcome::Blocked`]; use [`Self::soft_drop`] to lock.
    pub fn move_piece(&mut self, mv: Move) -> MoveOutcome {
        let Some(piece) = &self.active else {
            return MoveOutcome::Idle;
        };
        let candidate = match mv {
            Move::Rotate => piece.rotated_cw(&self.board),
            Move::Down | Move::Left | Move::Right => {
                let moved = piece.translated(mv);
                check_collision(mv, moved.coords(), &self.board)
                    .is_no()
                    .then_some(moved)
            }
        };
        match candidate {
            Some(piece) => {
                self.active = Some(piece);
                MoveOutcome::Moved
            }
            None => MoveOutcome::Blocked,
        }
    }

    /// Moves the active piece down one row, locking it if it is resting.
    pub fn soft_drop(&mut self) -> MoveOutcome {
        match self.check(Move::Down) {
            None => MoveOutcome::Idle,
            Some(Collision::No) => self.move_piece(Move::Down),
            Some(Collision::Continue) => MoveOutcome::Blocked,
            Some(Collision::Lock) => self.lock_outcome(DropType::Soft),
        }
    }

    /// Sends the active piece to its landing position and locks it.
    pub fn hard_drop(&mut self) -> MoveOutcome {
        let Some(landed) = self.landing() else {
            return MoveOutcome::Idle;
        };
        self.active = Some(landed);
        self.lock_outcome(DropType::Hard)
    }

    fn lock_outcome(&mut self, drop: DropType) -> MoveOutcome {
        self.lock(drop).map_or(MoveOutcome::Idle, MoveOutcome::Locked)
    }

    /// Locks the active piece where it is.
    ///
    /// Merges it into the board, clears full rows, scores, checks for game
    /// over and, if the game continues, re-enables hold and spawns the next
    /// piece. Returns `None` when there is no active piece.
    pub fn lock(&mut self, drop: DropType) -> Option<LockEvent> {
        let piece = self.active.take()?;
        self.board.fill_piece(&piece);
        let topped_out = piece.coords().iter().any(|c| c.row == 0);
        let cleared_rows = self.board.clear_full_rows();
        let update = self.stats.complete_piece_drop(cleared_rows.len(), drop);
        self.last_drop_type = Some(drop);

        if topped_out {
            self.game_over = true;
        } else {
            self.hold.enable();
            let next = self.generator.next_piece();
            self.spawn(next);
        }

        Some(LockEvent {
            drop_type: drop,
            kind: piece.kind(),
            color: piece.color(),
            coords: piece.coords().iter().copied().collect(),
            cleared_rows,
            action: update.action,
            points: update.points,
            level: update.level,
            leveled_up: update.leveled_up,
            game_over: self.game_over,
        })
    }

    /// Swaps the active piece with the held one.
    ///
    /// With an empty slot the active piece is saved and the next piece
    /// spawns. Either way hold stays disabled until the next lock.
    pub fn hold(&mut self) -> Result<(), HoldError> {
        if self.game_over {
            return Err(HoldError::GameOver);
        }
        if self.hold.is_disabled() {
            return Err(HoldError::Disabled);
        }
        let active = self.active.take().ok_or(HoldError::NoActivePiece)?;
        let spawn_col = self.generator.spawn_col();
        let next = match self.hold.swap(active.respawned(spawn_col)) {
            Some(held) => held.respawned(spawn_col),
            None => self.generator.next_piece(),
        };
        self.spawn(next);
        Ok(())
    }

    /// A piece that overlaps the stack or sticks out of the board ends the
    /// match.
    fn spawn(&mut self, piece: Piece) {
        if !check_collision(Move::Rotate, piece.coords(), &self.board).is_no() {
            self.game_over = true;
            self.active = None;
        } else {
            self.active = Some(piece);
        }
    }

    /// Cells occupied by the active piece, empty when there is none.
    #[must_use]
    pub fn active_coords(&self) -> &[Coord] {
        self.active.as_ref().map_or(&[], Piece::coords)
    }
}
