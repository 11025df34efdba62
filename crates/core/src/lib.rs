//! Chess Server Core Library

use serde::Serialize;

pub mod board;
pub mod error;
pub mod game;
pub mod rules;
pub mod service;
pub mod storage;

pub use board::{Board, Color, Occupant, PieceKind, Square};
pub use error::{Error, MoveError, Result, SelectError};
pub use game::{GameRecord, GameState, Phase};
pub use rules::{MoveTable, Terminal};
pub use service::{ChessService, EventKind, GameEvent};
pub use storage::Database;

/// Basic position information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    pub piece_count: u32,
    pub legal_move_count: u32,
    pub side_to_move: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

/// Analyzes a position with `turn` to move
pub fn analyze_position(board: &Board, turn: Color) -> PositionInfo {
    let piece_count = board.piece_count() as u32;
    let legal_move_count = rules::generate_legal_moves(board, turn).move_count() as u32;
    let is_check = rules::is_in_check(board, turn);
    let terminal = Terminal::classify(legal_move_count > 0, is_check);

    PositionInfo {
        piece_count,
        legal_move_count,
        side_to_move: turn,
        is_check,
        is_checkmate: terminal == Some(Terminal::Checkmate),
        is_stalemate: terminal == Some(Terminal::Stalemate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position() {
        let info = analyze_position(&Board::starting(), Color::White);

        assert_eq!(info.piece_count, 32);
        assert_eq!(info.side_to_move, Color::White);
        // 16 pawn moves + 4 knight moves
        assert_eq!(info.legal_move_count, 20);
        assert!(!info.is_check);
        assert!(!info.is_checkmate);
        assert!(!info.is_stalemate);
    }
}
