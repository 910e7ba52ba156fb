//! Tile Grid
//!
//! Terrain classification and destructible state. The authored CSV map is
//! surrounded by a permanent one-cell Wall border, so authored cell (0,0)
//! lives at grid cell (1,1). Anything outside the grid classifies as Wall.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::vec2::FixedVec2;
use crate::game::config::TileIndexMap;

/// Errors raised while loading a map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),

    #[error("map has no tiles")]
    Empty,

    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("row {row}, column {col}: {text:?} is not an integer")]
    BadIndex { row: usize, col: usize, text: String },

    #[error("row {row}, column {col}: tile index {index} is not mapped")]
    UnknownIndex { row: usize, col: usize, index: i32 },
}

/// Terrain kind of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    Free = 0,
    Wall = 1,
    Brick = 2,
    PickupBomb = 3,
    PickupPower = 4,
}

impl TileKind {
    /// Wall and Brick stop movement and blasts.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Brick)
    }

    /// Is this one of the pickup kinds?
    #[inline]
    pub fn is_pickup(self) -> bool {
        matches!(self, TileKind::PickupBomb | TileKind::PickupPower)
    }
}

/// Grid coordinate (column, row) in bordered space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Cell containing a continuous position.
    #[inline]
    pub fn containing(position: FixedVec2) -> Self {
        let (col, row) = position.tile();
        Self { col, row }
    }

    /// Continuous position of this cell's center.
    #[inline]
    pub fn center(self) -> FixedVec2 {
        FixedVec2::tile_center(self.col, self.row)
    }

    /// Cell `steps` away in `direction`.
    #[inline]
    pub fn step(self, direction: Direction, steps: i32) -> Self {
        let (dc, dr) = direction.offset();
        Self {
            col: self.col + dc * steps,
            row: self.row + dr * steps,
        }
    }
}

/// Cardinal direction. Rows grow downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise from Up; the order blasts walk in.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// (column, row) delta of one step.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// The session's terrain, border included.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
}

impl TileMap {
    /// Build from authored rows, adding the Wall border.
    pub fn from_rows(rows: &[Vec<TileKind>]) -> Result<Self, MapError> {
        let authored_w = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || authored_w == 0 {
            return Err(MapError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != authored_w {
                return Err(MapError::Ragged { row, expected: authored_w, found: cells.len() });
            }
        }

        let width = authored_w as i32 + 2;
        let height = rows.len() as i32 + 2;
        let mut tiles = vec![TileKind::Wall; (width * height) as usize];
        for (r, cells) in rows.iter().enumerate() {
            for (c, kind) in cells.iter().enumerate() {
                let idx = ((r as i32 + 1) * width + (c as i32 + 1)) as usize;
                tiles[idx] = *kind;
            }
        }

        Ok(Self { width, height, tiles })
    }

    /// Parse a row-major CSV of tile indices.
    pub fn from_csv(text: &str, indices: &TileIndexMap) -> Result<Self, MapError> {
        let mut rows = Vec::new();
        for (row, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let mut cells = Vec::new();
            for (col, field) in line.split(',').map(str::trim).enumerate() {
                let index: i32 = field.parse().map_err(|_| MapError::BadIndex {
                    row,
                    col,
                    text: field.to_string(),
                })?;
                let kind = indices
                    .kind_of(index)
                    .ok_or(MapError::UnknownIndex { row, col, index })?;
                cells.push(kind);
            }
            rows.push(cells);
        }
        Self::from_rows(&rows)
    }

    /// Read and parse a CSV map file.
    pub fn load(path: impl AsRef<Path>, indices: &TileIndexMap) -> Result<Self, MapError> {
        let text = fs::read_to_string(path)?;
        Self::from_csv(&text, indices)
    }

    /// Width including the border.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height including the border.
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 || cell.col >= self.width || cell.row >= self.height {
            return None;
        }
        Some((cell.row * self.width + cell.col) as usize)
    }

    #[inline]
    fn is_border(&self, cell: Cell) -> bool {
        cell.col == 0 || cell.row == 0 || cell.col == self.width - 1 || cell.row == self.height - 1
    }

    /// Terrain at a cell; out of bounds reads as Wall.
    #[inline]
    pub fn classify(&self, cell: Cell) -> TileKind {
        self.index(cell)
            .and_then(|idx| self.tiles.get(idx).copied())
            .unwrap_or(TileKind::Wall)
    }

    /// Can bodies move through this cell?
    #[inline]
    pub fn is_passable(&self, cell: Cell) -> bool {
        !self.classify(cell).is_solid()
    }

    /// Turn a Brick into Free. Returns false (and changes nothing) otherwise.
    pub fn destroy(&mut self, cell: Cell) -> bool {
        match self.index(cell) {
            Some(idx) if self.tiles[idx] == TileKind::Brick => {
                self.tiles[idx] = TileKind::Free;
                true
            }
            _ => false,
        }
    }

    /// Overwrite a non-border cell. Used for pickup hide/reveal.
    pub fn set_kind(&mut self, cell: Cell, kind: TileKind) -> bool {
        if self.is_border(cell) {
            return false;
        }
        match self.index(cell) {
            Some(idx) => {
                self.tiles[idx] = kind;
                true
            }
            None => false,
        }
    }

    /// Corner spawn cells: top-left, top-right, bottom-right, bottom-left.
    pub fn spawn_points(&self) -> [Cell; 4] {
        let last_col = self.width - 2;
        let last_row = self.height - 2;
        [
            Cell::new(1, 1),
            Cell::new(last_col, 1),
            Cell::new(last_col, last_row),
            Cell::new(1, last_row),
        ]
    }

    /// Every cell currently holding a pickup tile, row-major.
    pub fn pickup_cells(&self) -> Vec<(Cell, TileKind)> {
        self.cells()
            .filter(|(_, kind)| kind.is_pickup())
            .collect()
    }

    /// All cells with their kinds, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, TileKind)> + '_ {
        self.tiles.iter().enumerate().map(move |(idx, kind)| {
            let idx = idx as i32;
            (Cell::new(idx % self.width, idx / self.width), *kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(csv: &str) -> TileMap {
        TileMap::from_csv(csv, &TileIndexMap::default()).unwrap()
    }

    #[test]
    fn test_border_added() {
        let grid = map("0,0,0\n0,2,0\n0,0,0\n");
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        for i in 0..5 {
            assert_eq!(grid.classify(Cell::new(i, 0)), TileKind::Wall);
            assert_eq!(grid.classify(Cell::new(i, 4)), TileKind::Wall);
            assert_eq!(grid.classify(Cell::new(0, i)), TileKind::Wall);
            assert_eq!(grid.classify(Cell::new(4, i)), TileKind::Wall);
        }
        // Authored (1,1) shifted by the border
        assert_eq!(grid.classify(Cell::new(2, 2)), TileKind::Brick);
        assert_eq!(grid.classify(Cell::new(1, 1)), TileKind::Free);
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = map("0\n");
        assert_eq!(grid.classify(Cell::new(-1, 0)), TileKind::Wall);
        assert_eq!(grid.classify(Cell::new(0, -5)), TileKind::Wall);
        assert_eq!(grid.classify(Cell::new(3, 1)), TileKind::Wall);
        assert_eq!(grid.classify(Cell::new(100, 100)), TileKind::Wall);
        assert!(!grid.is_passable(Cell::new(-1, -1)));
    }

    #[test]
    fn test_passability() {
        let grid = map("0,1,2,8,9\n");
        assert!(grid.is_passable(Cell::new(1, 1)));
        assert!(!grid.is_passable(Cell::new(2, 1)));
        assert!(!grid.is_passable(Cell::new(3, 1)));
        assert!(grid.is_passable(Cell::new(4, 1)));
        assert!(grid.is_passable(Cell::new(5, 1)));
    }

    #[test]
    fn test_destroy_brick_once() {
        let mut grid = map("2,1\n");
        assert!(grid.destroy(Cell::new(1, 1)));
        assert_eq!(grid.classify(Cell::new(1, 1)), TileKind::Free);
        assert!(!grid.destroy(Cell::new(1, 1)), "already Free");

        // Walls and the border never break
        assert!(!grid.destroy(Cell::new(2, 1)));
        assert!(!grid.destroy(Cell::new(0, 0)));
        assert!(!grid.destroy(Cell::new(-3, 9)));
        assert_eq!(grid.classify(Cell::new(2, 1)), TileKind::Wall);
    }

    #[test]
    fn test_spawn_points_are_corners() {
        let grid = map("0,0,0,0\n0,0,0,0\n0,0,0,0\n");
        assert_eq!(
            grid.spawn_points(),
            [Cell::new(1, 1), Cell::new(4, 1), Cell::new(4, 3), Cell::new(1, 3)]
        );
    }

    #[test]
    fn test_pickup_cells() {
        let grid = map("8,0\n0,9\n");
        assert_eq!(
            grid.pickup_cells(),
            vec![
                (Cell::new(1, 1), TileKind::PickupBomb),
                (Cell::new(2, 2), TileKind::PickupPower),
            ]
        );
    }

    #[test]
    fn test_set_kind_skips_border() {
        let mut grid = map("9\n");
        assert!(grid.set_kind(Cell::new(1, 1), TileKind::Free));
        assert_eq!(grid.classify(Cell::new(1, 1)), TileKind::Free);
        assert!(!grid.set_kind(Cell::new(0, 1), TileKind::Free));
        assert_eq!(grid.classify(Cell::new(0, 1)), TileKind::Wall);
    }

    #[test]
    fn test_csv_errors() {
        let indices = TileIndexMap::default();
        assert!(matches!(TileMap::from_csv("", &indices), Err(MapError::Empty)));
        assert!(matches!(
            TileMap::from_csv("0,0\n0\n", &indices),
            Err(MapError::Ragged { row: 1, expected: 2, found: 1 })
        ));
        assert!(matches!(
            TileMap::from_csv("0,x\n", &indices),
            Err(MapError::BadIndex { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            TileMap::from_csv("0,7\n", &indices),
            Err(MapError::UnknownIndex { row: 0, col: 1, index: 7 })
        ));
    }

    #[test]
    fn test_csv_tolerates_whitespace_and_blank_lines() {
        let grid = map("\n 0 , 2 \r\n\n 1 ,0\n\n");
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.classify(Cell::new(2, 1)), TileKind::Brick);
        assert_eq!(grid.classify(Cell::new(1, 2)), TileKind::Wall);
    }

    #[test]
    fn test_cell_step() {
        let c = Cell::new(3, 3);
        assert_eq!(c.step(Direction::Up, 2), Cell::new(3, 1));
        assert_eq!(c.step(Direction::Right, 1), Cell::new(4, 3));
        assert_eq!(c.step(Direction::Down, 0), c);
        assert_eq!(c.step(Direction::Left, 3), Cell::new(0, 3));
    }
}
