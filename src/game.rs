use crate::{
    FlagResult, GameConfig, GameError, GameStatus, Grid, Position, RevealEngine, RevealResult,
    RevealState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal,
    Flag,
    Chord,
    /// Uncover the whole board. Not part of normal play.
    RevealAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Revealed(RevealResult),
    Flagged(FlagResult),
}

impl ActionOutcome {
    pub fn has_update(&self) -> bool {
        match self {
            ActionOutcome::Revealed(result) => !result.is_empty(),
            ActionOutcome::Flagged(result) => *result != FlagResult::Ignored,
        }
    }
}

/// One game session: the grid, what the player has uncovered, and the engine
/// tying them together. A difficulty change means building a new `Game`.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    state: RevealState,
    engine: RevealEngine,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_engine(config, RevealEngine::new(config.mines, config.guaranteed_start))
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_engine(
            config,
            RevealEngine::with_seed(config.mines, config.guaranteed_start, seed),
        )
    }

    fn with_engine(config: GameConfig, mut engine: RevealEngine) -> Result<Self, GameError> {
        config.validate()?;
        let mut grid = Grid::new(config.rows, config.columns)?;
        if !config.guaranteed_start {
            engine.generate(&mut grid);
        }

        Ok(Self {
            config,
            state: RevealState::new(&grid),
            grid,
            engine,
        })
    }

    pub fn perform_action(&mut self, pos: Position, action: Action) -> ActionOutcome {
        let Self {
            grid,
            state,
            engine,
            ..
        } = self;

        match action {
            Action::Reveal => ActionOutcome::Revealed(engine.reveal_cell(grid, state, pos)),
            Action::Flag => ActionOutcome::Flagged(engine.toggle_flag(grid, state, pos)),
            Action::Chord => ActionOutcome::Revealed(engine.chord_reveal(grid, state, pos)),
            Action::RevealAll => ActionOutcome::Revealed(engine.reveal_all(grid, state)),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.engine.status()
    }

    /// True once the game ended or nothing is left covered.
    pub fn is_over(&self) -> bool {
        self.status().is_finished() || self.state.revealed_count() == self.grid.area()
    }

    pub fn mines_remaining(&self) -> isize {
        self.engine.mines_remaining(&self.grid, &self.state)
    }

    /// (rows, columns)
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }
}
