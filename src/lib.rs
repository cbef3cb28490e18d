pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod placement;
pub mod position;
pub mod render;
pub mod reveal;

pub use config::{Difficulty, GameConfig};
pub use error::{ConfigError, GameError};
pub use game::{Action, ActionOutcome, Game};
pub use grid::{Cell, Grid, MINE};
pub use placement::choose_mine_positions;
pub use position::Position;
pub use render::render_board;
pub use reveal::{
    FlagResult, GameStatus, RevealEngine, RevealResult, RevealState, RevealedCell, Terminal,
};
