use crate::placement::choose_mine_positions;
use crate::{GameError, Position};
use itertools::Itertools;
use ndarray::Array2;
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Numeric value reported for mine cells, one past the largest possible count.
pub const MINE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Mine,
    /// Number of mines among the cell's in-bounds neighbors, 0 through 8.
    Count(u8),
}

impl Cell {
    pub fn is_mine(self) -> bool {
        matches!(self, Cell::Mine)
    }

    pub fn count(self) -> Option<u8> {
        match self {
            Cell::Mine => None,
            Cell::Count(n) => Some(n),
        }
    }

    /// The cell as a single integer, [`MINE`] for mines.
    pub fn value(self) -> u8 {
        self.count().unwrap_or(MINE)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Count(0)
    }
}

/// The mine layout of a single game: fixed dimensions, mines placed once, and
/// each safe cell holding its adjacent mine count.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Array2<Cell>,
    generated: bool,
    mine_count: usize,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Result<Self, GameError> {
        check_dimensions(rows, columns)?;

        Ok(Self {
            cells: Array2::default((rows, columns)),
            generated: false,
            mine_count: 0,
        })
    }

    /// Builds an already generated grid with mines at exactly the given positions.
    pub fn from_mines(rows: usize, columns: usize, mines: &[Position]) -> Result<Self, GameError> {
        let mut grid = Self::new(rows, columns)?;
        for &pos in mines {
            if !grid.valid(pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            grid.cells[nd_index(pos)] = Cell::Mine;
        }
        grid.finish_generation();
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn columns(&self) -> usize {
        self.cells.ncols()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn density(&self) -> f64 {
        self.mine_count as f64 / self.area() as f64
    }

    pub fn valid(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.column >= 0
            && (pos.row as usize) < self.rows()
            && (pos.column as usize) < self.columns()
    }

    pub fn value(&self, pos: Position) -> Result<Cell, GameError> {
        self.cell(pos).ok_or(GameError::OutOfBounds(pos))
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.valid(pos).then(|| self.cells[nd_index(pos)])
    }

    /// In-bounds neighbors of `pos`, in N, NE, E, SE, S, SW, W, NW order.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors().filter(|&p| self.valid(p)).collect()
    }

    pub fn mines(&self) -> BTreeSet<Position> {
        self.positions()
            .filter(|&pos| self.cells[nd_index(pos)].is_mine())
            .collect()
    }

    /// Every position on the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns();
        (0..self.area()).map(move |i| Position::from_index(i, columns))
    }

    pub fn generate(&mut self, mine_count: usize, safe_index: Option<usize>) {
        self.generate_with_rng(&mut rand::thread_rng(), mine_count, safe_index);
    }

    /// Places up to `mine_count` mines, keeping the cell at `safe_index` clear,
    /// and fills in the adjacency counts. A grid is only ever generated once.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mine_count: usize,
        safe_index: Option<usize>,
    ) {
        if self.generated {
            log::warn!("Ignoring request to regenerate an already generated grid");
            return;
        }

        let columns = self.columns();
        for index in choose_mine_positions(rng, self.area(), mine_count, safe_index) {
            let pos = Position::from_index(index, columns);
            self.cells[nd_index(pos)] = Cell::Mine;
        }
        self.finish_generation();

        log::debug!(
            "Generated {}x{} grid with {} mines (safe cell {:?})",
            self.rows(),
            self.columns(),
            self.mine_count,
            safe_index
        );
    }

    fn finish_generation(&mut self) {
        for pos in self.positions().collect_vec() {
            let index = nd_index(pos);
            if self.cells[index].is_mine() {
                continue;
            }
            self.cells[index] = Cell::Count(self.count_adjacent_mines(pos));
        }
        self.mine_count = self.cells.iter().filter(|cell| cell.is_mine()).count();
        self.generated = true;
    }

    fn count_adjacent_mines(&self, pos: Position) -> u8 {
        pos.neighbors()
            .filter_map(|p| self.cell(p))
            .filter(|cell| cell.is_mine())
            .count() as u8
    }

    /// Breadth-first flood fill from `start`. `uncover` is offered each cell the
    /// fill reaches and returns whether it was newly uncovered; only newly
    /// uncovered zero cells spread to their neighbors.
    pub(crate) fn flood_fill<F>(&self, start: Position, mut uncover: F)
    where
        F: FnMut(Position, Cell) -> bool,
    {
        let mut queue = VecDeque::from([start]);

        while let Some(pos) = queue.pop_front() {
            let Some(cell) = self.cell(pos) else {
                continue;
            };
            if !uncover(pos, cell) {
                continue;
            }
            if cell == Cell::Count(0) {
                queue.extend(pos.neighbors());
            }
        }
    }

    /// The cells a flood fill from `pos` would uncover on an untouched board,
    /// in the order it uncovers them.
    pub fn flood_region(&self, pos: Position) -> Vec<Position> {
        let mut visited = Array2::from_elem(self.dimensions(), false);
        let mut region = Vec::new();

        self.flood_fill(pos, |p, _| {
            let seen = &mut visited[nd_index(p)];
            if *seen {
                return false;
            }
            *seen = true;
            region.push(p);
            true
        });

        region
    }
}

/// Both sides must be addressable by a [`Position`] and the cell count must fit
/// in an array.
pub(crate) fn check_dimensions(rows: usize, columns: usize) -> Result<(), GameError> {
    let max_side = i32::MAX as usize;
    let fits = rows > 0
        && columns > 0
        && rows <= max_side
        && columns <= max_side
        && rows
            .checked_mul(columns)
            .is_some_and(|area| area <= isize::MAX as usize);

    if fits {
        Ok(())
    } else {
        Err(GameError::InvalidDimensions { rows, columns })
    }
}

fn nd_index(pos: Position) -> (usize, usize) {
    (pos.row as usize, pos.column as usize)
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .cells
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Mine => format!("{:>2}", '*'),
                        Cell::Count(n) => format!("{:>2}", n),
                    })
                    .join(" ")
            })
            .join("\n");
        f.write_str(&text)
    }
}
