/// A cell coordinate. Signed so that clicks landing off the board can still be
/// represented and rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

/// Moore neighborhood offsets as (row, column) deltas: N, NE, E, SE, S, SW, W, NW.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

impl Position {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Converts a row-major linear index back into a position.
    pub fn from_index(index: usize, columns: usize) -> Self {
        Self::new((index / columns) as i32, (index % columns) as i32)
    }

    /// Row-major linear index. Only meaningful for in-bounds positions.
    pub fn to_index(self, columns: usize) -> usize {
        self.row as usize * columns + self.column as usize
    }

    /// All eight surrounding positions, including ones off the board.
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        MOORE_OFFSETS
            .iter()
            .map(move |&(dr, dc)| Position::new(self.row + dr, self.column + dc))
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, column): (i32, i32)) -> Self {
        Self::new(row, column)
    }
}
