use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Board edge length.
pub const SIZE: usize = 8;

/// Tile value; `0` is an empty cell, anything else a power of two.
pub type Tile = u64;

/// Largest tile the board holds; two of these never merge.
pub const MAX_TILE: Tile = 1 << 48;

/// `0`, or a power of two in `2..=MAX_TILE`.
#[inline]
pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// A 0-indexed board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Checked constructor.
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= SIZE || col >= SIZE {
            return Err(EngineError::OutOfBounds { row, col });
        }
        Ok(Position { row, col })
    }

    /// Build from the 1..=8 board framing used by front ends.
    pub fn from_one_based(row: usize, col: usize) -> Result<Self> {
        if row == 0 || col == 0 {
            return Err(EngineError::OutOfBounds { row, col });
        }
        Position::new(row - 1, col - 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

/// The 8x8 cell array, stored row-major.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Tile; SIZE]; SIZE],
}

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid { cells: [[0; SIZE]; SIZE] };

    pub fn new() -> Self {
        Grid::EMPTY
    }

    /// Construct a grid from explicit rows (row 0 first).
    pub fn from_rows(cells: [[Tile; SIZE]; SIZE]) -> Self {
        Grid { cells }
    }

    /// Borrow the raw rows.
    #[inline]
    pub fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Result<Tile> {
        check(row, col)?;
        Ok(self.cells[row][col])
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Tile) -> Result<()> {
        check(row, col)?;
        if !is_valid_tile(value) {
            return Err(EngineError::InvalidTile { row, col, value });
        }
        self.cells[row][col] = value;
        Ok(())
    }

    /// Check every cell holds a valid tile; for grids built with `from_rows` or deserialized.
    pub fn validate(&self) -> Result<()> {
        match positions().find(|&pos| !is_valid_tile(self.at(pos))) {
            Some(Position { row, col }) => Err(EngineError::InvalidTile { row, col, value: self.cells[row][col] }),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn is_empty(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.get(row, col)? == 0)
    }

    /// Value at an already validated position.
    #[inline]
    pub fn at(&self, pos: Position) -> Tile {
        self.cells[pos.row][pos.col]
    }

    #[inline]
    pub(crate) fn put(&mut self, pos: Position, value: Tile) {
        self.cells[pos.row][pos.col] = value;
    }

    pub fn count_non_empty_in_row(&self, row: usize) -> Result<usize> {
        check(row, 0)?;
        Ok(self.cells[row].iter().filter(|&&v| v != 0).count())
    }

    pub fn count_non_empty_in_column(&self, col: usize) -> Result<usize> {
        check(0, col)?;
        Ok(self.cells.iter().filter(|row| row[col] != 0).count())
    }

    /// Clear every cell.
    pub fn reset(&mut self) {
        self.cells = [[0; SIZE]; SIZE];
    }

    pub fn has_empty_cell(&self) -> bool {
        self.cells.iter().flatten().any(|&v| v == 0)
    }

    /// Count the number of empty cells on the grid.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Empty positions in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        positions().filter(move |&pos| self.at(pos) == 0)
    }

    /// Return the highest tile value present (0 on an empty grid).
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn total_value(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Visit every cell in row-major order; the rendering callback contract.
    pub fn for_each_cell<F: FnMut(Position, Tile)>(&self, mut f: F) {
        for pos in positions() {
            f(pos, self.at(pos));
        }
    }
}

/// Every board position, row-major.
pub fn positions() -> impl Iterator<Item = Position> {
    (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Position { row, col }))
}

#[inline]
fn check(row: usize, col: usize) -> Result<()> {
    if row >= SIZE || col >= SIZE {
        return Err(EngineError::OutOfBounds { row, col });
    }
    Ok(())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divider = "-".repeat(SIZE * 8 - 1);
        for (idx, row) in self.cells.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{divider}")?;
            }
            let line: Vec<String> = row.iter().map(format_val).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: &Tile) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{x:^7}"),
    }
}
