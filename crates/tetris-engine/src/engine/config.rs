use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{board::BoardDims, shape::MAX_SHAPE_SIDE},
};

use super::{game_stats::MAX_LEVEL, piece_generator::DEFAULT_SPAWN_COL};

/// Engine options fixed at the start of a match.
///
/// Missing fields take their default when deserialized, so a partial JSON
/// object is a valid configuration.
///
/// # Example
///
/// ```
/// use tetris_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"start_level": 4}"#).unwrap();
/// assert_eq!(config.start_level, 4);
/// assert_eq!(config.tick_rate_hz, 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expose the landing position of the active piece.
    pub show_landing_preview: bool,
    /// Hide locked cells from the display board.
    pub invisible_locked_cells: bool,
    /// Halve the gravity delay.
    pub accelerated_gravity: bool,
    pub start_level: u32,
    pub tick_rate_hz: u32,
    /// Delay between repeated moves while a direction key is held.
    pub move_repeat_delay_ms: u64,
    pub dims: BoardDims,
    /// Left edge of spawned pieces.
    pub spawn_col: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            show_landing_preview: true,
            invisible_locked_cells: false,
            accelerated_gravity: false,
            start_level: 1,
            tick_rate_hz: 60,
            move_repeat_delay_ms: 100,
            dims: BoardDims::STANDARD,
            spawn_col: DEFAULT_SPAWN_COL,
        }
    }
}

impl EngineConfig {
    /// Checks that a match can be played with these settings.
    ///
    /// The board must fit any piece in any orientation, and a 4-wide piece
    /// spawned at `spawn_col` must fit inside the columns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = u8::try_from(MAX_SHAPE_SIDE).unwrap_or(u8::MAX);
        let BoardDims {
            cols,
            visible_rows,
            buffer_rows,
        } = self.dims;
        if cols < side || visible_rows < side {
            return Err(ConfigError::BoardTooSmall { cols, visible_rows });
        }
        if buffer_rows == 0 {
            return Err(ConfigError::NoBufferRows);
        }
        if u16::from(self.spawn_col) + u16::from(side) > u16::from(cols) {
            return Err(ConfigError::SpawnColumnOutOfRange {
                spawn_col: self.spawn_col,
                cols,
            });
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if !(1..=MAX_LEVEL).contains(&self.start_level) {
            return Err(ConfigError::StartLevelOutOfRange {
                level: self.start_level,
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn move_repeat_delay(&self) -> Duration {
        Duration::from_millis(self.move_repeat_delay_ms)
    }
}
