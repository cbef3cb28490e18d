use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Grid dimensions {rows}x{columns} must both be positive")]
    InvalidDimensions { rows: usize, columns: usize },
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] GameError),
}
