use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::grid::{Grid, Position, Tile, SIZE};
use crate::random::RandomSource;

/// Spawn draws at or above this value (out of `1..=254`) produce a 4.
pub const DEFAULT_FOUR_THRESHOLD: u8 = 245;

/// A tile written by the spawner, reported back for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedTile {
    pub position: Position,
    pub value: Tile,
}

/// Picks the value and location of new tiles.
#[derive(Debug, Clone)]
pub struct TileSpawner<R = OsRng> {
    source: RandomSource<R>,
    four_threshold: u8,
}

impl TileSpawner<OsRng> {
    pub fn new() -> Self {
        TileSpawner::from_source(RandomSource::new())
    }
}

impl Default for TileSpawner<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> TileSpawner<R> {
    pub fn from_source(source: RandomSource<R>) -> Self {
        TileSpawner { source, four_threshold: DEFAULT_FOUR_THRESHOLD }
    }

    /// Override the 2-vs-4 cut-off; 255 never spawns a 4.
    pub fn with_four_threshold(mut self, threshold: u8) -> Self {
        self.four_threshold = threshold;
        self
    }

    /// 2 for draws `1..threshold`, 4 otherwise (~96% / ~4% at the default).
    pub fn spawn_value(&mut self) -> Result<Tile> {
        let draw = self.source.next_in_range(1, 254)?;
        Ok(if draw < self.four_threshold { 2 } else { 4 })
    }

    /// Uniformly pick an empty cell by redrawing until one is found.
    pub fn spawn_position(&mut self, grid: &Grid) -> Result<Position> {
        if !grid.has_empty_cell() {
            return Err(EngineError::NoEmptyCell);
        }
        let max = SIZE as i32;
        loop {
            let row = self.source.next_in_range(1, max)? as usize;
            let col = self.source.next_in_range(1, max)? as usize;
            let pos = Position::from_one_based(row, col)?;
            if grid.at(pos) == 0 {
                return Ok(pos);
            }
        }
    }

    /// Place one new tile and report where it went.
    pub fn spawn_into(&mut self, grid: &mut Grid) -> Result<SpawnedTile> {
        let position = self.spawn_position(grid)?;
        let value = self.spawn_value()?;
        grid.put(position, value);
        log::debug!("spawned {value} at {position}");
        Ok(SpawnedTile { position, value })
    }
}
