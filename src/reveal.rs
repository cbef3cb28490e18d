use crate::{Cell, Grid, Position};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// What the player can see: which cells are uncovered and which carry flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealState {
    revealed: Array2<bool>,
    flags: BTreeSet<Position>,
    revealed_count: usize,
}

impl RevealState {
    pub fn new(grid: &Grid) -> Self {
        Self {
            revealed: Array2::from_elem(grid.dimensions(), false),
            flags: BTreeSet::new(),
            revealed_count: 0,
        }
    }

    pub fn is_revealed(&self, pos: Position) -> bool {
        self.slot(pos).is_some_and(|&revealed| revealed)
    }

    pub fn is_flagged(&self, pos: Position) -> bool {
        self.flags.contains(&pos)
    }

    pub fn flags(&self) -> &BTreeSet<Position> {
        &self.flags
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Marks `pos` uncovered, returning false if it already was or lies
    /// outside this mask.
    fn reveal(&mut self, pos: Position) -> bool {
        if pos.row < 0 || pos.column < 0 {
            return false;
        }
        let Some(slot) = self.revealed.get_mut((pos.row as usize, pos.column as usize)) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
        self.revealed_count += 1;
        true
    }

    fn slot(&self, pos: Position) -> Option<&bool> {
        if pos.row < 0 || pos.column < 0 {
            return None;
        }
        self.revealed.get((pos.row as usize, pos.column as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// No reveal or flag has happened yet.
    NotStarted,
    InProgress,
    Exploded(Position),
    Solved,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::Exploded(_) | GameStatus::Solved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Exploded(Position),
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealedCell {
    pub position: Position,
    pub cell: Cell,
}

/// The cells an operation uncovered, flags it cleared on the way, and whether
/// it ended the game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealResult {
    pub revealed: Vec<RevealedCell>,
    pub unflagged: Vec<Position>,
    pub terminal: Option<Terminal>,
}

impl RevealResult {
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty() && self.terminal.is_none()
    }

    /// Folds another result into this one. An explosion outranks a win.
    pub fn absorb(&mut self, other: RevealResult) {
        self.revealed.extend(other.revealed);
        self.unflagged.extend(other.unflagged);
        self.terminal = match (self.terminal, other.terminal) {
            (Some(Terminal::Exploded(pos)), _) | (_, Some(Terminal::Exploded(pos))) => {
                Some(Terminal::Exploded(pos))
            }
            (Some(Terminal::Solved), _) | (_, Some(Terminal::Solved)) => Some(Terminal::Solved),
            (None, None) => None,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagResult {
    Placed(Position),
    Removed(Position),
    Ignored,
}

/// Drives one game over a caller-owned [`Grid`] and [`RevealState`].
///
/// Player input that cannot apply (off the board, already uncovered, flagged,
/// after the game ended) yields an empty result rather than an error.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    mine_count: usize,
    guaranteed_start: bool,
    status: GameStatus,
    rng: StdRng,
}

impl RevealEngine {
    pub fn new(mine_count: usize, guaranteed_start: bool) -> Self {
        Self::with_rng(mine_count, guaranteed_start, StdRng::from_entropy())
    }

    pub fn with_seed(mine_count: usize, guaranteed_start: bool, seed: u64) -> Self {
        Self::with_rng(mine_count, guaranteed_start, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mine_count: usize, guaranteed_start: bool, rng: StdRng) -> Self {
        Self {
            mine_count,
            guaranteed_start,
            status: GameStatus::NotStarted,
            rng,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn exploded_at(&self) -> Option<Position> {
        match self.status {
            GameStatus::Exploded(pos) => Some(pos),
            _ => None,
        }
    }

    /// Mines left to find by the flag count; negative when over-flagged.
    pub fn mines_remaining(&self, grid: &Grid, state: &RevealState) -> isize {
        let mines = if grid.is_generated() {
            grid.mine_count()
        } else {
            self.mine_count
        };
        mines as isize - state.flags.len() as isize
    }

    /// Generates the grid up front, with no safe cell.
    pub fn generate(&mut self, grid: &mut Grid) {
        if !grid.is_generated() {
            grid.generate_with_rng(&mut self.rng, self.mine_count, None);
        }
    }

    pub fn reveal_cell(
        &mut self,
        grid: &mut Grid,
        state: &mut RevealState,
        pos: Position,
    ) -> RevealResult {
        if self.is_finished()
            || !grid.valid(pos)
            || state.is_revealed(pos)
            || state.is_flagged(pos)
        {
            return RevealResult::default();
        }

        if !grid.is_generated() {
            let safe = self.guaranteed_start.then(|| pos.to_index(grid.columns()));
            grid.generate_with_rng(&mut self.rng, self.mine_count, safe);
        }
        self.start();

        let mut result = RevealResult::default();
        grid.flood_fill(pos, |p, cell| {
            if !state.reveal(p) {
                return false;
            }
            if state.flags.remove(&p) {
                result.unflagged.push(p);
            }
            result.revealed.push(RevealedCell { position: p, cell });
            true
        });
        log::trace!("Reveal at {:?} uncovered {} cells", pos, result.revealed.len());

        if grid.value(pos).is_ok_and(Cell::is_mine) {
            log::debug!("Mine detonated at {:?}", pos);
            self.status = GameStatus::Exploded(pos);
            result.terminal = Some(Terminal::Exploded(pos));
        } else if grid.area() - state.revealed_count == grid.mine_count() {
            log::debug!("Board solved with {} cells revealed", state.revealed_count);
            self.status = GameStatus::Solved;
            result.terminal = Some(Terminal::Solved);
        }

        result
    }

    pub fn toggle_flag(
        &mut self,
        grid: &Grid,
        state: &mut RevealState,
        pos: Position,
    ) -> FlagResult {
        if self.is_finished() || !grid.valid(pos) || state.is_revealed(pos) {
            return FlagResult::Ignored;
        }
        self.start();

        if state.flags.remove(&pos) {
            FlagResult::Removed(pos)
        } else {
            state.flags.insert(pos);
            FlagResult::Placed(pos)
        }
    }

    /// Reveals every neighbor of an uncovered numbered cell whose flagged
    /// neighbor count matches its number exactly.
    pub fn chord_reveal(
        &mut self,
        grid: &mut Grid,
        state: &mut RevealState,
        pos: Position,
    ) -> RevealResult {
        let mut result = RevealResult::default();
        if self.is_finished() || !state.is_revealed(pos) {
            return result;
        }

        let Some(Cell::Count(count)) = grid.cell(pos) else {
            return result;
        };
        if count == 0 {
            return result;
        }

        let neighbors = grid.neighbors(pos);
        let flagged = neighbors.iter().filter(|&&p| state.is_flagged(p)).count();
        if flagged != count as usize {
            return result;
        }

        for neighbor in neighbors {
            result.absorb(self.reveal_cell(grid, state, neighbor));
        }
        result
    }

    /// Debug shortcut: uncovers the whole board, flags included, without
    /// changing the game status.
    pub fn reveal_all(&mut self, grid: &mut Grid, state: &mut RevealState) -> RevealResult {
        self.generate(grid);

        let mut result = RevealResult::default();
        for pos in grid.positions() {
            if !state.reveal(pos) {
                continue;
            }
            if state.flags.remove(&pos) {
                result.unflagged.push(pos);
            }
            if let Some(cell) = grid.cell(pos) {
                result.revealed.push(RevealedCell { position: pos, cell });
            }
        }
        result
    }

    fn start(&mut self) {
        if self.status == GameStatus::NotStarted {
            self.status = GameStatus::InProgress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(
        rows: usize,
        columns: usize,
        mines: &[(i32, i32)],
    ) -> (Grid, RevealState, RevealEngine) {
        let mines: Vec<Position> = mines.iter().map(|&m| m.into()).collect();
        let grid = Grid::from_mines(rows, columns, &mines).unwrap();
        let state = RevealState::new(&grid);
        let engine = RevealEngine::with_seed(mines.len(), true, 0);
        (grid, state, engine)
    }

    fn positions(result: &RevealResult) -> BTreeSet<Position> {
        result.revealed.iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_reveal_numbered_cell_only_uncovers_itself() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0)]);

        let result = engine.reveal_cell(&mut grid, &mut state, Position::new(1, 1));

        assert_eq!(
            result.revealed,
            vec![RevealedCell {
                position: Position::new(1, 1),
                cell: Cell::Count(1),
            }]
        );
        assert_eq!(result.terminal, None);
        assert_eq!(engine.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_flood_fill_stops_at_boundary() {
        let (mut grid, mut state, mut engine) = setup(1, 6, &[(0, 3)]);

        let result = engine.reveal_cell(&mut grid, &mut state, Position::new(0, 0));

        assert_eq!(
            positions(&result),
            BTreeSet::from([Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)])
        );
        assert!(!state.is_revealed(Position::new(0, 4)));
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0)]);
        let pos = Position::new(1, 1);

        assert!(!engine.reveal_cell(&mut grid, &mut state, pos).is_empty());
        assert!(engine.reveal_cell(&mut grid, &mut state, pos).is_empty());
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0)]);

        assert!(engine
            .reveal_cell(&mut grid, &mut state, Position::new(-1, 4))
            .is_empty());
        assert_eq!(
            engine.toggle_flag(&grid, &mut state, Position::new(3, 0)),
            FlagResult::Ignored
        );
        assert_eq!(engine.status(), GameStatus::NotStarted);
    }

    #[test]
    fn test_flagged_cell_cannot_be_revealed_directly() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0)]);
        let pos = Position::new(2, 2);

        assert_eq!(engine.toggle_flag(&grid, &mut state, pos), FlagResult::Placed(pos));
        assert!(engine.reveal_cell(&mut grid, &mut state, pos).is_empty());
        assert_eq!(engine.toggle_flag(&grid, &mut state, pos), FlagResult::Removed(pos));
        assert!(!engine.reveal_cell(&mut grid, &mut state, pos).is_empty());
    }

    #[test]
    fn test_revealed_cell_cannot_be_flagged() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0)]);
        let pos = Position::new(1, 1);

        engine.reveal_cell(&mut grid, &mut state, pos);

        assert_eq!(engine.toggle_flag(&grid, &mut state, pos), FlagResult::Ignored);
    }

    #[test]
    fn test_flood_fill_clears_flags() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(2, 2)]);
        engine.toggle_flag(&grid, &mut state, Position::new(0, 0));

        let result = engine.reveal_cell(&mut grid, &mut state, Position::new(0, 1));

        assert_eq!(result.unflagged, vec![Position::new(0, 0)]);
        assert!(state.is_revealed(Position::new(0, 0)));
        assert!(!state.is_flagged(Position::new(0, 0)));
        assert_eq!(result.terminal, Some(Terminal::Solved));
    }

    #[test]
    fn test_explosion_is_absorbing() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0), (2, 2)]);
        engine.reveal_cell(&mut grid, &mut state, Position::new(0, 2));

        let result = engine.reveal_cell(&mut grid, &mut state, Position::new(0, 0));

        assert_eq!(result.terminal, Some(Terminal::Exploded(Position::new(0, 0))));
        assert_eq!(engine.exploded_at(), Some(Position::new(0, 0)));
        assert!(engine
            .reveal_cell(&mut grid, &mut state, Position::new(2, 0))
            .is_empty());
        assert_eq!(
            engine.toggle_flag(&grid, &mut state, Position::new(2, 0)),
            FlagResult::Ignored
        );
    }

    #[test]
    fn test_lazy_generation_keeps_first_click_safe() {
        for seed in 0..50 {
            let mut grid = Grid::new(4, 4).unwrap();
            let mut state = RevealState::new(&grid);
            let mut engine = RevealEngine::with_seed(15, true, seed);

            let result = engine.reveal_cell(&mut grid, &mut state, Position::new(1, 2));

            assert!(grid.is_generated());
            assert_eq!(grid.mine_count(), 15);
            assert_eq!(result.terminal, Some(Terminal::Solved));
        }
    }

    #[test]
    fn test_flag_starts_game_without_generating() {
        let mut grid = Grid::new(4, 4).unwrap();
        let mut state = RevealState::new(&grid);
        let mut engine = RevealEngine::with_seed(3, true, 5);

        engine.toggle_flag(&grid, &mut state, Position::new(0, 0));

        assert_eq!(engine.status(), GameStatus::InProgress);
        assert!(!grid.is_generated());
        assert_eq!(engine.mines_remaining(&grid, &state), 2);
    }

    #[test]
    fn test_chord_requires_exact_flag_count() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0), (0, 2)]);
        let center = Position::new(1, 1);
        engine.reveal_cell(&mut grid, &mut state, center);

        engine.toggle_flag(&grid, &mut state, Position::new(0, 0));
        assert!(engine.chord_reveal(&mut grid, &mut state, center).is_empty());

        engine.toggle_flag(&grid, &mut state, Position::new(0, 2));
        engine.toggle_flag(&grid, &mut state, Position::new(2, 2));
        assert!(engine.chord_reveal(&mut grid, &mut state, center).is_empty());

        engine.toggle_flag(&grid, &mut state, Position::new(2, 2));
        let result = engine.chord_reveal(&mut grid, &mut state, center);
        assert_eq!(result.revealed.len(), 6);
        assert_eq!(result.terminal, Some(Terminal::Solved));
    }

    #[test]
    fn test_chord_with_wrong_flag_explodes() {
        let (mut grid, mut state, mut engine) = setup(3, 3, &[(0, 0), (2, 2)]);
        let center = Position::new(1, 1);
        engine.reveal_cell(&mut grid, &mut state, center);
        engine.toggle_flag(&grid, &mut state, Position::new(0, 0));
        engine.toggle_flag(&grid, &mut state, Position::new(2, 0));

        let result = engine.chord_reveal(&mut grid, &mut state, center);

        assert_eq!(result.terminal, Some(Terminal::Exploded(Position::new(2, 2))));
        assert_eq!(engine.status(), GameStatus::Exploded(Position::new(2, 2)));
        assert!(!state.is_revealed(Position::new(2, 1)));
    }

    #[test]
    fn test_chord_ignores_hidden_and_zero_cells() {
        let (mut grid, mut state, mut engine) = setup(3, 5, &[(0, 2), (1, 2), (2, 2)]);

        assert!(engine
            .chord_reveal(&mut grid, &mut state, Position::new(1, 4))
            .is_empty());

        engine.reveal_cell(&mut grid, &mut state, Position::new(0, 0));
        assert_eq!(engine.status(), GameStatus::InProgress);
        assert!(engine
            .chord_reveal(&mut grid, &mut state, Position::new(0, 0))
            .is_empty());
    }

    #[test]
    fn test_mismatched_state_stays_within_its_mask() {
        let mut grid = Grid::from_mines(5, 5, &[]).unwrap();
        let small = Grid::new(2, 2).unwrap();
        let mut state = RevealState::new(&small);
        let mut engine = RevealEngine::with_seed(0, true, 0);

        let result = engine.reveal_cell(&mut grid, &mut state, Position::new(0, 0));
        assert_eq!(result.revealed.len(), 4);
        assert_eq!(state.revealed_count(), 4);

        assert!(engine
            .reveal_cell(&mut grid, &mut state, Position::new(4, 4))
            .is_empty());
    }

    #[test]
    fn test_reveal_all() {
        let (mut grid, mut state, mut engine) = setup(2, 2, &[(0, 0)]);
        engine.toggle_flag(&grid, &mut state, Position::new(0, 0));

        let result = engine.reveal_all(&mut grid, &mut state);

        assert_eq!(result.revealed.len(), 4);
        assert_eq!(result.unflagged, vec![Position::new(0, 0)]);
        assert_eq!(state.revealed_count(), 4);
        assert_eq!(engine.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_absorb_prefers_explosion() {
        let mut result = RevealResult {
            terminal: Some(Terminal::Solved),
            ..Default::default()
        };
        result.absorb(RevealResult {
            terminal: Some(Terminal::Exploded(Position::new(1, 1))),
            ..Default::default()
        });

        assert_eq!(result.terminal, Some(Terminal::Exploded(Position::new(1, 1))));
    }
}
