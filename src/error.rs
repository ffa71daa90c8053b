use crate::grid::Tile;
use crate::session::SessionState;

/// Contract violations surfaced by the engine.
///
/// None of these leave the grid or session in a partially updated state; the
/// caller can retry with corrected input or start a new game.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid random range [{min}, {max}]; need 0 <= min <= max <= 255")]
    InvalidRange { min: i32, max: i32 },
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell ({row}, {col}) holds {value}, not an empty cell or a power-of-two tile")]
    InvalidTile { row: usize, col: usize, value: Tile },
    #[error("unrecognized direction {0:?}")]
    InvalidDirection(String),
    #[error("no empty cell left to spawn into")]
    NoEmptyCell,
    #[error("session is not accepting moves (state: {0:?})")]
    SessionEnded(SessionState),
}

pub type Result<T> = std::result::Result<T, EngineError>;
