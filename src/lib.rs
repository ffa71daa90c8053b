//! slide-2048: an 8x8 sliding-tile (2048-style) game engine
//!
//! This crate provides:
//! - A bounds-checked `Grid` of tiles (`grid` module)
//! - A `RandomSource` drawing bytes from a CSPRNG with rejection sampling (`random` module)
//! - A `TileSpawner` placing 2s (~96%) and 4s (~4%) on empty cells (`spawner` module)
//! - Legality queries and the slide/merge transform for each `Direction` (`engine` module)
//! - A `GameSession` tying it together with score, high score and win/loss detection (`session` module)
//!
//! The engine never renders and never performs I/O; a front end drives it and
//! draws the grid, e.g. through [`Grid::for_each_cell`].
//!
//! Quick start:
//! ```
//! use slide_2048::{GameSession, SessionConfig, SessionState};
//!
//! let mut game = GameSession::new(SessionConfig::default()).unwrap();
//! let opening = game.start_new_game().unwrap();
//! assert_eq!(opening.len(), 1);
//!
//! if let Some(&dir) = game.legal_directions().first() {
//!     let result = game.request_move(dir).unwrap();
//!     assert!(!result.is_noop());
//! }
//! assert_eq!(game.state(), SessionState::InProgress);
//! ```
//!
//! Deterministic runs: inject any seeded CSPRNG.
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use slide_2048::{GameSession, RandomSource, SessionConfig};
//!
//! let source = RandomSource::from_rng(StdRng::seed_from_u64(42));
//! let mut game = GameSession::with_source(SessionConfig::default(), source).unwrap();
//! game.start_new_game().unwrap();
//! println!("{}", game.grid());
//! ```
//!
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod random;
pub mod session;
pub mod spawner;

pub use config::{ConfigError, SessionConfig};
pub use engine::{Direction, MoveOutcome};
pub use error::{EngineError, Result};
pub use grid::{Grid, Position, Tile, SIZE};
pub use random::RandomSource;
pub use session::{GameSession, MoveResult, SessionSnapshot, SessionState};
pub use spawner::{SpawnedTile, TileSpawner};
