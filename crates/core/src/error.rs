//! Error types for chess-server-core

use thiserror::Error;

/// Why a piece could not be selected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    #[error("Piece not found")]
    NotFound,

    #[error("Not your turn")]
    WrongTurn,

    #[error("Game is already over")]
    GameOver,
}

/// Why a move was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece selected")]
    NoSelection,

    #[error("Invalid move")]
    IllegalMove,

    #[error("Game is already over")]
    GameOver,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Game {0} was modified concurrently")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Select(SelectError::NotFound) => "not_found",
            Error::Select(SelectError::WrongTurn) => "wrong_turn",
            Error::Select(SelectError::GameOver) | Error::Move(MoveError::GameOver) => "game_over",
            Error::Move(MoveError::NoSelection) => "no_selection",
            Error::Move(MoveError::IllegalMove) => "illegal_move",
            Error::GameNotFound(_) => "game_not_found",
            Error::MalformedInput(_) => "malformed_input",
            Error::Conflict(_) => "conflict",
            Error::Database(_) => "database",
            Error::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
