use serde::{Deserialize, Serialize};

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 9;

/// Total cleared lines needed to leave each level, indexed by `level - 1`.
///
/// There is no entry for [`MAX_LEVEL`]; the level stops there.
pub const LEVEL_LINE_THRESHOLDS: [u32; MAX_LEVEL as usize - 1] = [10, 20, 30, 40, 50, 60, 70, 80];

/// Base points per scoring action, multiplied by the level for line clears.
pub mod points {
    pub const SINGLE: u32 = 100;
    pub const DOUBLE: u32 = 300;
    pub const TRIPLE: u32 = 500;
    pub const TETRIS: u32 = 800;
    pub const TETRIS_BACK_TO_BACK: u32 = 1200;
    /// Flat bonus for a lock caused by gravity or soft drop that clears nothing.
    pub const SOFT_DROP: u32 = 1;
    /// Flat bonus for a hard-drop lock that clears nothing.
    pub const HARD_DROP: u32 = 2;
}

/// How the active piece came to lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum DropType {
    /// Gravity or a manual down move hit the stack or floor.
    Soft,
    /// The piece was sent straight to its landing position.
    Hard,
}

/// What a single lock scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoredAction {
    Single,
    Double,
    Triple,
    Tetris,
    TetrisBackToBack,
    SoftDrop,
    HardDrop,
}

impl ScoredAction {
    #[must_use]
    pub fn is_tetris(self) -> bool {
        matches!(self, Self::Tetris | Self::TetrisBackToBack)
    }
}

/// Result of scoring one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub action: ScoredAction,
    pub points: u32,
    /// Level the points were scored at.
    pub level: u32,
    pub leveled_up: bool,
}

/// Score, level and line statistics for a match.
///
/// # Scoring
///
/// - 1/2/3 lines: 100/300/500 × level
/// - 4 lines: 800 × level, or 1200 × level when the previous lock was also a
///   4-line clear
/// - 0 lines: flat 1 (soft drop) or 2 (hard drop)
///
/// Every lock replaces the last scored action, so any other lock between two
/// 4-line clears breaks the back-to-back chain.
///
/// # Leveling
///
/// After scoring, if the total lines reach the current level's threshold the
/// level goes up by one. Never more than one per lock, and never past
/// [`MAX_LEVEL`].
///
/// # Example
///
/// ```
/// use tetris_engine::{DropType, GameStats, ScoredAction};
///
/// let mut stats = GameStats::new(1);
/// let update = stats.complete_piece_drop(4, DropType::Hard);
/// assert_eq!(update.action, ScoredAction::Tetris);
/// assert_eq!(stats.score(), 800);
///
/// let update = stats.complete_piece_drop(4, DropType::Hard);
/// assert_eq!(update.action, ScoredAction::TetrisBackToBack);
/// assert_eq!(stats.score(), 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    level: u32,
    completed_pieces: usize,
    total_cleared_lines: u32,
    line_cleared_counter: [usize; 5],
    last_scored_action: Option<ScoredAction>,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GameStats {
    /// Creates statistics starting at `start_level`, clamped to `1..=MAX_LEVEL`.
    #[must_use]
    pub fn new(start_level: u32) -> Self {
        Self {
            score: 0,
            level: start_level.clamp(1, MAX_LEVEL),
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            last_scored_action: None,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Total number of pieces locked so far.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> u32 {
        self.total_cleared_lines
    }

    /// Histogram of locks by lines cleared.
    ///
    /// Index 0 counts locks with no clear, 1..=3 singles to triples, 4 counts
    /// four or more.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn last_scored_action(&self) -> Option<ScoredAction> {
        self.last_scored_action
    }

    /// Lines needed in total to leave the current level, `None` at the cap.
    #[must_use]
    pub fn lines_to_advance(&self) -> Option<u32> {
        LEVEL_LINE_THRESHOLDS
            .get(self.level as usize - 1)
            .copied()
    }

    /// Scores one lock and updates line totals and level.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize, drop: DropType) -> ScoreUpdate {
        let level = self.level;
        let previous_was_tetris = self.last_scored_action.is_some_and(ScoredAction::is_tetris);
        let (action, points) = match cleared_lines {
            0 => match drop {
                DropType::Soft => (ScoredAction::SoftDrop, points::SOFT_DROP),
                DropType::Hard => (ScoredAction::HardDrop, points::HARD_DROP),
            },
            1 => (ScoredAction::Single, points::SINGLE * level),
            2 => (ScoredAction::Double, points::DOUBLE * level),
            3 => (ScoredAction::Triple, points::TRIPLE * level),
            _ if previous_was_tetris => (
                ScoredAction::TetrisBackToBack,
                points::TETRIS_BACK_TO_BACK * level,
            ),
            _ => (ScoredAction::Tetris, points::TETRIS * level),
        };

        self.score += u64::from(points);
        self.last_scored_action = Some(action);
        self.completed_pieces += 1;
        self.line_cleared_counter[cleared_lines.min(4)] += 1;
        self.total_cleared_lines += u32::try_from(cleared_lines).unwrap_or(u32::MAX);

        let leveled_up = self
            .lines_to_advance()
            .is_some_and(|threshold| self.total_cleared_lines >= threshold);
        if leveled_up {
            self.level += 1;
        }

        ScoreUpdate {
            action,
            points,
            level,
            leveled_up,
        }
    }
}
