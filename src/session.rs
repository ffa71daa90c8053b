use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SessionConfig};
use crate::engine::{self, Direction};
use crate::error::{EngineError, Result};
use crate::grid::{Grid, Position, Tile};
use crate::random::RandomSource;
use crate::spawner::{SpawnedTile, TileSpawner};

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl SessionState {
    /// Won and Lost accept no further moves.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Won | SessionState::Lost)
    }
}

/// What a move request did, for the caller to re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub direction: Direction,
    pub score_delta: u64,
    /// Cells changed by the slide/merge itself (not including the spawn).
    pub changed_cells: Vec<Position>,
    pub spawned: Option<SpawnedTile>,
    /// Session state after the move.
    pub state: SessionState,
}

impl MoveResult {
    fn noop(direction: Direction, state: SessionState) -> Self {
        MoveResult { direction, score_delta: 0, changed_cells: Vec::new(), spawned: None, state }
    }

    /// True if the move was rejected as illegal and nothing changed.
    pub fn is_noop(&self) -> bool {
        self.changed_cells.is_empty()
    }
}

/// Everything a front end needs to persist and later resume a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub grid: Grid,
    pub score: u64,
    pub high_score: u64,
    pub state: SessionState,
}

/// A single game: grid, scores and the spawner that feeds it.
///
/// All operations run to completion on the calling thread. Shared access
/// from several callers should wrap the whole session in one lock.
#[derive(Debug, Clone)]
pub struct GameSession<R = OsRng> {
    grid: Grid,
    score: u64,
    high_score: u64,
    state: SessionState,
    spawner: TileSpawner<R>,
    config: SessionConfig,
}

impl GameSession<OsRng> {
    /// Session drawing tiles from the OS CSPRNG.
    pub fn new(config: SessionConfig) -> std::result::Result<Self, ConfigError> {
        GameSession::with_source(config, RandomSource::new())
    }
}

impl<R: RngCore + CryptoRng> GameSession<R> {
    /// Fails if `config` does not pass [`SessionConfig::validate`].
    pub fn with_source(config: SessionConfig, source: RandomSource<R>) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let spawner = TileSpawner::from_source(source).with_four_threshold(config.four_threshold);
        Ok(GameSession {
            grid: Grid::EMPTY,
            score: 0,
            high_score: 0,
            state: SessionState::NotStarted,
            spawner,
            config,
        })
    }

    /// Seed the high score persisted by a previous run.
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.high_score = high_score;
        self
    }

    /// Clear the board, zero the score and place the opening tiles.
    ///
    /// The high score is kept. On error the previous game is left untouched.
    pub fn start_new_game(&mut self) -> Result<Vec<SpawnedTile>> {
        let mut grid = Grid::EMPTY;
        let mut spawned = Vec::with_capacity(usize::from(self.config.initial_tiles));
        for _ in 0..self.config.initial_tiles {
            spawned.push(self.spawner.spawn_into(&mut grid)?);
        }
        self.grid = grid;
        self.score = 0;
        self.state = SessionState::InProgress;
        log::debug!("new game started with {} tile(s)", spawned.len());
        Ok(spawned)
    }

    /// Slide towards `direction`, score merges and spawn one tile.
    ///
    /// An illegal direction returns a no-op result without spawning.
    pub fn request_move(&mut self, direction: Direction) -> Result<MoveResult> {
        if self.state != SessionState::InProgress {
            return Err(EngineError::SessionEnded(self.state));
        }
        if !engine::can_move(&self.grid, direction) {
            if !self.grid.has_empty_cell() && engine::is_game_over(&self.grid) {
                self.finish(SessionState::Lost);
                return Err(EngineError::SessionEnded(self.state));
            }
            return Ok(MoveResult::noop(direction, self.state));
        }

        let outcome = engine::apply(&mut self.grid, direction);
        self.score = self.score.saturating_add(outcome.score_delta);
        self.high_score = self.high_score.max(self.score);

        let spawned = if self.grid.has_empty_cell() {
            Some(self.spawner.spawn_into(&mut self.grid)?)
        } else {
            None
        };

        if self.grid.highest_tile() >= self.config.winning_tile {
            self.finish(SessionState::Won);
        } else if !self.grid.has_empty_cell() && engine::is_game_over(&self.grid) {
            self.finish(SessionState::Lost);
        }

        Ok(MoveResult {
            direction,
            score_delta: outcome.score_delta,
            changed_cells: outcome.changed_cells,
            spawned,
            state: self.state,
        })
    }

    fn finish(&mut self, state: SessionState) {
        log::info!("game ended: {state:?}, score {} (high {})", self.score, self.high_score);
        self.state = state;
    }

    /// Resume from a snapshot produced by [`GameSession::snapshot`].
    ///
    /// A snapshot holding a cell that is not a valid tile is rejected.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<()> {
        snapshot.grid.validate()?;
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.high_score = snapshot.high_score.max(snapshot.score);
        self.state = snapshot.state;
        Ok(())
    }
}

impl<R> GameSession<R> {
    pub fn cell(&self, row: usize, col: usize) -> Result<Tile> {
        self.grid.get(row, col)
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the swipe control for `direction` should be enabled.
    pub fn can_move(&self, direction: Direction) -> bool {
        self.state == SessionState::InProgress && engine::can_move(&self.grid, direction)
    }

    pub fn legal_directions(&self) -> Vec<Direction> {
        Direction::ALL.into_iter().filter(|&d| self.can_move(d)).collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { grid: self.grid, score: self.score, high_score: self.high_score, state: self.state }
    }
}
