//! Check and game-end detection

use serde::{Deserialize, Serialize};

use super::movegen::{attacked_squares, generate_legal_moves};
use crate::board::{Board, Color, Square};

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    Checkmate,
    Stalemate,
}

impl Terminal {
    /// Classifies a position from whether the side to move has any legal
    /// move and whether it is in check.
    pub fn classify(has_legal_move: bool, in_check: bool) -> Option<Self> {
        match (has_legal_move, in_check) {
            (true, _) => None,
            (false, true) => Some(Terminal::Checkmate),
            (false, false) => Some(Terminal::Stalemate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::Checkmate => "checkmate",
            Terminal::Stalemate => "stalemate",
        }
    }
}

/// True if any piece of color `by` attacks `target`.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, _)| attacked_squares(board, from).contains(&target))
}

/// True if `color`'s king is attacked.
///
/// # Panics
/// If `color` has no king, which no position reachable through the game
/// state machine allows.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_attacked(board, king, !color),
        None => panic!("{} king missing from board", color),
    }
}

/// Checkmate or stalemate for `color` to move, `None` while the game goes on.
pub fn evaluate_terminal(board: &Board, color: Color) -> Option<Terminal> {
    let has_legal_move = !generate_legal_moves(board, color).is_empty();
    Terminal::classify(has_legal_move, is_in_check(board, color))
}
