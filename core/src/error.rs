use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid cell id")]
    InvalidCellId,
    #[error("Region must be non-empty and fit the raster coordinate type")]
    InvalidRegion,
    #[error("Too many cells for the region")]
    TooManyCells,
    #[error("Mine layout does not match board size")]
    InvalidLayout,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
