//! Move legality and check detection

pub mod check;
pub mod movegen;

pub use check::{evaluate_terminal, is_in_check, is_square_attacked, Terminal};
pub use movegen::{
    apply_move, generate_legal_moves, legal_moves_from, pseudo_legal_moves, MoveTable, PieceMoves,
};
