use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::{Tile, MAX_TILE, SIZE};
use crate::spawner::DEFAULT_FOUR_THRESHOLD;

mod defaults {
    pub fn winning_tile() -> super::Tile {
        2048
    }
    pub fn four_threshold() -> u8 {
        super::DEFAULT_FOUR_THRESHOLD
    }
    pub fn initial_tiles() -> u8 {
        1
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("winning_tile must be a power of two in 8..=2^48, got {0}")]
    WinningTile(Tile),
    #[error("four_threshold must be in 1..=255, got {0}")]
    FourThreshold(u8),
    #[error("initial_tiles must be in 1..={max}, got {got}")]
    InitialTiles { got: u8, max: usize },
}

/// Per-session rules.
///
/// Example TOML:
/// ```toml
/// winning_tile = 4096
/// four_threshold = 230
/// initial_tiles = 2
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reaching this tile wins the game.
    pub winning_tile: Tile,
    /// Spawn draws (out of 1..=254) at or above this value produce a 4.
    pub four_threshold: u8,
    /// Tiles placed by a new game.
    pub initial_tiles: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            winning_tile: defaults::winning_tile(),
            four_threshold: defaults::four_threshold(),
            initial_tiles: defaults::initial_tiles(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.winning_tile < 8 || self.winning_tile > MAX_TILE || !self.winning_tile.is_power_of_two() {
            return Err(ConfigError::WinningTile(self.winning_tile));
        }
        if self.four_threshold == 0 {
            return Err(ConfigError::FourThreshold(self.four_threshold));
        }
        if self.initial_tiles == 0 || usize::from(self.initial_tiles) > SIZE * SIZE {
            return Err(ConfigError::InitialTiles { got: self.initial_tiles, max: SIZE * SIZE });
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }
}
