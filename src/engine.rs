use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::grid::{positions, Grid, Position, Tile, MAX_TILE, SIZE};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// 0=Up, 1=Down, 2=Left, 3=Right.
    pub fn from_u8(value: u8) -> Result<Direction> {
        match value {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(EngineError::InvalidDirection(other.to_string())),
        }
    }

    /// Row/column step towards the neighbour a tile would move into.
    #[inline]
    fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    fn neighbour(self, pos: Position) -> Option<Position> {
        let (dr, dc) = self.offset();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        (row < SIZE && col < SIZE).then_some(Position { row, col })
    }

    /// Cells of line `idx`, ordered from the leading edge backwards.
    fn line(self, idx: usize) -> [Position; SIZE] {
        std::array::from_fn(|k| match self {
            Direction::Left => Position { row: idx, col: k },
            Direction::Right => Position { row: idx, col: SIZE - 1 - k },
            Direction::Up => Position { row: k, col: idx },
            Direction::Down => Position { row: SIZE - 1 - k, col: idx },
        })
    }
}

impl TryFrom<u8> for Direction {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self> {
        Direction::from_u8(value)
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "l" | "a" => Ok(Direction::Left),
            "right" | "r" | "d" => Ok(Direction::Right),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

/// Result of committing a move to a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Sum of every tile created by a merge.
    pub score_delta: u64,
    /// Cells whose value differs from before the move, row-major.
    pub changed_cells: Vec<Position>,
}

impl MoveOutcome {
    /// True if nothing on the grid changed.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.changed_cells.is_empty()
    }
}

/// Count slide and merge opportunities in `direction`.
///
/// A cell counts once if it holds a tile and its neighbour in `direction` is
/// empty, and once more if the two can merge.
/// Only the sign of the result is meaningful: `> 0` means the move is legal.
pub fn movable_count(grid: &Grid, direction: Direction) -> usize {
    let mut count = 0;
    for pos in positions() {
        let Some(next) = direction.neighbour(pos) else { continue };
        let (here, there) = (grid.at(pos), grid.at(next));
        if here != 0 && there == 0 {
            count += 1;
        }
        if can_merge(here, there) {
            count += 1;
        }
    }
    count
}

#[inline]
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    movable_count(grid, direction) > 0
}

/// True if no direction is legal.
pub fn is_game_over(grid: &Grid) -> bool {
    Direction::ALL.iter().all(|&d| !can_move(grid, d))
}

/// Slide and merge every line of `grid` towards the leading edge of `direction`.
pub fn apply(grid: &mut Grid, direction: Direction) -> MoveOutcome {
    let before = *grid;
    let mut score_delta = 0;
    for idx in 0..SIZE {
        let cells = direction.line(idx);
        let (shifted, score) = shift_line(cells.map(|pos| before.at(pos)));
        score_delta += score;
        for (pos, value) in cells.into_iter().zip(shifted) {
            grid.put(pos, value);
        }
    }
    let changed_cells: Vec<Position> = positions().filter(|&pos| before.at(pos) != grid.at(pos)).collect();
    if !changed_cells.is_empty() {
        log::debug!("moved {direction}: {} cells changed, +{score_delta}", changed_cells.len());
    }
    MoveOutcome { score_delta, changed_cells }
}

/// Like [`apply`] but on a copy, leaving `grid` untouched.
pub fn preview(grid: &Grid, direction: Direction) -> (Grid, MoveOutcome) {
    let mut next = *grid;
    let outcome = apply(&mut next, direction);
    (next, outcome)
}

/// Equal non-empty tiles merge unless they are already at `MAX_TILE`.
#[inline]
fn can_merge(a: Tile, b: Tile) -> bool {
    a != 0 && a == b && a < MAX_TILE
}

/// Compact a line towards index 0, merging equal neighbours once each.
/// Returns the new line and the sum of merged values.
fn shift_line(line: [Tile; SIZE]) -> ([Tile; SIZE], u64) {
    let mut out = [0; SIZE];
    let mut len = 0;
    let mut score = 0;
    let mut pending: Option<Tile> = None;
    for value in line.into_iter().filter(|&v| v != 0) {
        match pending {
            Some(prev) if can_merge(prev, value) => {
                out[len] = prev * 2;
                score += prev * 2;
                len += 1;
                pending = None;
            }
            Some(prev) => {
                out[len] = prev;
                len += 1;
                pending = Some(value);
            }
            None => pending = Some(value),
        }
    }
    if let Some(prev) = pending {
        out[len] = prev;
    }
    (out, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(head: &[Tile]) -> [Tile; SIZE] {
        let mut out = [0; SIZE];
        out[..head.len()].copy_from_slice(head);
        out
    }

    fn grid_with_row(row: usize, head: &[Tile]) -> Grid {
        let mut grid = Grid::new();
        for (col, &v) in head.iter().enumerate() {
            grid.set(row, col, v).unwrap();
        }
        grid
    }

    #[test]
    fn it_shift_line() {
        assert_eq!(shift_line(line(&[])), (line(&[]), 0));
        assert_eq!(shift_line(line(&[2, 4, 2, 4])), (line(&[2, 4, 2, 4]), 0));
        assert_eq!(shift_line(line(&[2, 2, 4, 4])), (line(&[4, 8]), 12));
        assert_eq!(shift_line(line(&[2, 0, 0, 2])), (line(&[4]), 4));
        assert_eq!(shift_line(line(&[2, 2, 2])), (line(&[4, 2]), 4));
        assert_eq!(shift_line(line(&[4, 4, 8])), (line(&[8, 8]), 8));
        assert_eq!(shift_line([2; SIZE]), (line(&[4, 4, 4, 4]), 16));
        assert_eq!(shift_line(line(&[0, 0, 0, 0, 0, 0, 0, 2])), (line(&[2]), 0));
    }

    #[test]
    fn large_tiles_merge_without_overflow() {
        let big = 1 << 31;
        let mut rows = [[0; SIZE]; SIZE];
        rows[0][0] = big;
        rows[0][1] = big;
        let mut grid = Grid::from_rows(rows);
        let out = apply(&mut grid, Direction::Left);
        assert_eq!(grid.get(0, 0).unwrap(), 1 << 32);
        assert_eq!(grid.get(0, 1).unwrap(), 0);
        assert_eq!(out.score_delta, 1 << 32);
    }

    #[test]
    fn max_tiles_do_not_merge() {
        let grid = grid_with_row(0, &[MAX_TILE, MAX_TILE]);
        assert_eq!(movable_count(&grid, Direction::Left), 0);
        assert_eq!(movable_count(&grid, Direction::Right), 1);
        let (_, out) = preview(&grid, Direction::Left);
        assert!(out.is_noop());
        assert_eq!(shift_line(line(&[MAX_TILE / 2, MAX_TILE / 2, MAX_TILE])), (line(&[MAX_TILE, MAX_TILE]), MAX_TILE));
    }

    #[test]
    fn row_example_left_and_right() {
        let grid = grid_with_row(0, &[2, 0, 2, 4]);

        let mut left = grid;
        let out = apply(&mut left, Direction::Left);
        assert_eq!(left.rows()[0], line(&[4, 4]));
        assert_eq!(out.score_delta, 4);

        let mut right = grid;
        let out = apply(&mut right, Direction::Right);
        assert_eq!(right.rows()[0], [0, 0, 0, 0, 0, 0, 4, 4]);
        assert_eq!(out.score_delta, 4);
    }

    #[test]
    fn full_row_without_pairs_is_a_noop() {
        let row = [2, 4, 8, 16, 32, 64, 128, 256];
        let mut rows = [[0; SIZE]; SIZE];
        rows[0] = row;
        let mut grid = Grid::from_rows(rows);
        assert_eq!(movable_count(&grid, Direction::Left), 0);
        assert_eq!(movable_count(&grid, Direction::Right), 0);
        let out = apply(&mut grid, Direction::Left);
        assert!(out.is_noop());
        assert_eq!(out.score_delta, 0);
        assert_eq!(grid.rows()[0], row);
    }

    #[test]
    fn columns_move_up_and_down() {
        let mut grid = Grid::new();
        grid.set(1, 3, 2).unwrap();
        grid.set(4, 3, 2).unwrap();
        grid.set(7, 3, 8).unwrap();

        let mut up = grid;
        let out = apply(&mut up, Direction::Up);
        assert_eq!(up.get(0, 3).unwrap(), 4);
        assert_eq!(up.get(1, 3).unwrap(), 8);
        assert_eq!(up.count_non_empty_in_column(3).unwrap(), 2);
        assert_eq!(out.score_delta, 4);

        let mut down = grid;
        let out = apply(&mut down, Direction::Down);
        assert_eq!(down.get(7, 3).unwrap(), 8);
        assert_eq!(down.get(6, 3).unwrap(), 4);
        assert_eq!(down.count_non_empty_in_column(3).unwrap(), 2);
        assert_eq!(out.score_delta, 4);
    }

    #[test]
    fn down_merges_from_the_bottom() {
        let mut grid = Grid::new();
        for row in 5..8 {
            grid.set(row, 0, 2).unwrap();
        }
        apply(&mut grid, Direction::Down);
        assert_eq!(grid.get(7, 0).unwrap(), 4);
        assert_eq!(grid.get(6, 0).unwrap(), 2);
        assert_eq!(grid.get(5, 0).unwrap(), 0);
    }

    #[test]
    fn changed_cells_are_exact() {
        let mut grid = grid_with_row(2, &[0, 2]);
        let out = apply(&mut grid, Direction::Left);
        assert_eq!(out.changed_cells, vec![Position { row: 2, col: 0 }, Position { row: 2, col: 1 }]);
    }

    #[test]
    fn movable_count_per_direction() {
        let mut grid = Grid::new();
        grid.set(0, 0, 2).unwrap();
        assert_eq!(movable_count(&grid, Direction::Up), 0);
        assert_eq!(movable_count(&grid, Direction::Left), 0);
        assert_eq!(movable_count(&grid, Direction::Down), 1);
        assert_eq!(movable_count(&grid, Direction::Right), 1);

        grid.set(0, 1, 2).unwrap();
        // (0,1) can merge left; (0,0) can merge right and (0,1) can slide right
        assert_eq!(movable_count(&grid, Direction::Left), 1);
        assert_eq!(movable_count(&grid, Direction::Right), 2);
    }

    #[test]
    fn empty_grid_has_no_moves() {
        assert!(is_game_over(&Grid::EMPTY));
        for d in Direction::ALL {
            assert_eq!(movable_count(&Grid::EMPTY, d), 0);
        }
    }

    #[test]
    fn checkerboard_is_game_over() {
        let rows = std::array::from_fn(|r| std::array::from_fn(|c| if (r + c) % 2 == 0 { 2 } else { 4 }));
        assert!(is_game_over(&Grid::from_rows(rows)));
    }

    #[test]
    fn repeating_a_direction_is_a_noop() {
        let mut grid = Grid::new();
        grid.set(3, 3, 4).unwrap();
        grid.set(3, 6, 4).unwrap();
        grid.set(5, 1, 2).unwrap();
        for d in Direction::ALL {
            let mut g = grid;
            assert!(!apply(&mut g, d).is_noop());
            assert_eq!(movable_count(&g, d), 0);
            assert!(apply(&mut g, d).is_noop());
        }
    }

    #[test]
    fn preview_leaves_grid_untouched() {
        let grid = grid_with_row(0, &[0, 0, 2]);
        let (next, out) = preview(&grid, Direction::Left);
        assert_eq!(grid.get(0, 2).unwrap(), 2);
        assert_eq!(next.get(0, 0).unwrap(), 2);
        assert_eq!(out.changed_cells.len(), 2);
    }

    #[test]
    fn parse_directions() {
        assert_eq!("Up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("s".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!(" LEFT ".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("d".parse::<Direction>().unwrap(), Direction::Right);
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(EngineError::InvalidDirection("sideways".to_string()))
        );
        assert_eq!(Direction::try_from(3).unwrap(), Direction::Right);
        assert_eq!(Direction::try_from(4), Err(EngineError::InvalidDirection("4".to_string())));
        assert_eq!(Direction::Left.to_string(), "LEFT");
    }
}
