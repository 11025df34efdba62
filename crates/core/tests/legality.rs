//! Seeded random games checked against shakmaty and the game invariants

use std::collections::BTreeSet;

use chess_server_core::board::{Board, Color, Occupant, Square};
use chess_server_core::rules::{self, Terminal};
use chess_server_core::GameState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakmaty::{fen::Fen, CastlingMode, Chess, Position};

const GAMES: u64 = 24;
const MAX_PLIES: usize = 160;

/// FEN without castling rights or en passant square, which the server never plays.
fn to_fen(board: &Board, turn: Color) -> String {
    let mut rows = Vec::new();
    for y in 0..8 {
        let mut row = String::new();
        let mut empty = 0;
        for x in 0..8 {
            match board.get(Square::new(x, y).unwrap()) {
                Some(occ) => {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let code = occ.kind.code();
                    row.push(match occ.color {
                        Color::White => code.to_ascii_uppercase(),
                        Color::Black => code,
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            row.push_str(&empty.to_string());
        }
        rows.push(row);
    }
    let side = match turn {
        Color::White => "w",
        Color::Black => "b",
    };
    format!("{} {} - - 0 1", rows.join("/"), side)
}

/// Every position reached by legal play must be accepted by shakmaty.
fn reference_position(state: &GameState) -> Chess {
    let fen = to_fen(state.board(), state.turn());
    let parsed: Fen = fen
        .parse()
        .unwrap_or_else(|e| panic!("unparsable fen {}: {}", fen, e));
    parsed
        .into_position(CastlingMode::Standard)
        .unwrap_or_else(|e| panic!("position rejected {}: {}", fen, e))
}

fn our_moves(state: &GameState) -> BTreeSet<(String, String)> {
    let mut moves = BTreeSet::new();
    for entry in state.legal_moves().iter() {
        let from = state.board().find(entry.piece).unwrap();
        for to in &entry.moves {
            moves.insert((from.to_string(), to.to_string()));
        }
    }
    moves
}

fn reference_moves(pos: &Chess) -> BTreeSet<(String, String)> {
    pos.legal_moves()
        .iter()
        .filter_map(|m| m.from().map(|from| (from.to_string(), m.to().to_string())))
        .collect()
}

fn all_moves(state: &GameState) -> Vec<(Occupant, Square)> {
    state
        .legal_moves()
        .iter()
        .flat_map(|entry| entry.moves.iter().map(move |to| (entry.piece, *to)))
        .collect()
}

#[test]
fn test_random_games_match_reference() {
    let mut compared = 0;

    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = GameState::new();

        for _ in 0..MAX_PLIES {
            let pos = reference_position(&state);
            assert_eq!(
                our_moves(&state),
                reference_moves(&pos),
                "seed {} position {}",
                seed,
                to_fen(state.board(), state.turn())
            );
            assert_eq!(state.is_in_check(), pos.is_check());
            assert_eq!(state.outcome() == Some(Terminal::Checkmate), pos.is_checkmate());
            assert_eq!(state.outcome() == Some(Terminal::Stalemate), pos.is_stalemate());
            compared += 1;

            if state.is_game_over() {
                break;
            }

            let moves = all_moves(&state);
            let (piece, to) = moves[rng.random_range(0..moves.len())];
            state = state.select_piece(piece).unwrap().attempt_move(to).unwrap();
        }
    }

    // every game reaches at least a few plies
    assert!(compared >= GAMES as usize * 4);
}

#[test]
fn test_random_games_keep_invariants() {
    for seed in 100..100 + GAMES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = GameState::new();
        let mut captures = 0;

        for _ in 0..MAX_PLIES {
            if state.is_game_over() {
                break;
            }

            // no listed move leaves the mover's own king attacked
            for (piece, to) in all_moves(&state) {
                let from = state.board().find(piece).unwrap();
                let mut scratch = state.board().clone();
                rules::apply_move(&mut scratch, from, to);
                assert!(!rules::is_in_check(&scratch, state.turn()));
            }

            // generation is idempotent
            assert_eq!(
                &rules::generate_legal_moves(state.board(), state.turn()),
                state.legal_moves()
            );

            let moves = all_moves(&state);
            let (piece, to) = moves[rng.random_range(0..moves.len())];
            let lands_on_piece = state.board().get(to).is_some();
            let before = state.captured().to_vec();

            // a rejected move never flips the turn
            let selected = state.select_piece(piece).unwrap();
            let illegal = Square::all().find(|sq| !state.legal_moves().contains(piece, *sq));
            if let Some(illegal) = illegal {
                assert!(selected.attempt_move(illegal).is_err());
                assert_eq!(selected.turn(), state.turn());
            }

            let next = selected.attempt_move(to).unwrap();
            assert_eq!(next.turn(), !state.turn());

            if lands_on_piece {
                captures += 1;
            }
            assert_eq!(next.captured().len(), captures);
            assert_eq!(&next.captured()[..before.len()], before.as_slice());
            assert!(next.board().validate().is_ok());

            state = next;
        }
    }
}
