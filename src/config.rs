use crate::error::ConfigError;
use crate::grid::check_dimensions;
use crate::GameError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Preset board sizes and mine counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
    /// Tiny, dense board where the first click may already be a mine.
    Lottery,
    Benchmark,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
        Difficulty::Lottery,
        Difficulty::Benchmark,
    ];

    pub fn config(self) -> GameConfig {
        let (columns, rows, mines, guaranteed_start) = match self {
            Difficulty::Easy => (10, 8, 10, true),
            Difficulty::Medium => (18, 14, 40, true),
            Difficulty::Hard => (24, 20, 99, true),
            Difficulty::Extreme => (38, 30, 300, true),
            Difficulty::Lottery => (5, 5, 24, false),
            Difficulty::Benchmark => (152, 120, 4000, true),
        };
        GameConfig {
            columns,
            rows,
            mines,
            guaranteed_start,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
            Difficulty::Lottery => "Lottery",
            Difficulty::Benchmark => "Benchmark",
        }
    }
}

/// Everything needed to set up a game. Persisted as TOML; missing keys fall
/// back to the Easy preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub columns: usize,
    pub rows: usize,
    pub mines: usize,
    /// Whether the first revealed cell is guaranteed not to be a mine.
    pub guaranteed_start: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::Easy.config()
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_dimensions(self.rows, self.columns)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading game configuration from {}", path.display());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
