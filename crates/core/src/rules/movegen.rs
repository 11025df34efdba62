//! Move generation for all six piece kinds
//!
//! Everything here is a pure function of the board. Pseudo-legal moves follow
//! the movement shape, blocking and capture rules; legal moves additionally
//! never leave the mover's own king attacked.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::check::is_in_check;
use crate::board::{Board, Color, Occupant, PieceKind, Square};

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Legal destinations of a single piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceMoves {
    pub piece: Occupant,
    pub moves: Vec<Square>,
}

/// Legal moves of one side, keyed by occupant in board scan order.
///
/// Pieces without any legal move are left out, so an empty table means the
/// side has no move at all. Serialized as an object from occupant id to
/// destinations, with keys in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveTable(Vec<PieceMoves>);

impl MoveTable {
    /// Destinations for `piece`, empty if it has none.
    pub fn get(&self, piece: Occupant) -> &[Square] {
        self.0
            .iter()
            .find(|entry| entry.piece == piece)
            .map(|entry| entry.moves.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, piece: Occupant, to: Square) -> bool {
        self.get(piece).contains(&to)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pieces that can move.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Total number of legal moves.
    pub fn move_count(&self) -> usize {
        self.0.iter().map(|entry| entry.moves.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceMoves> {
        self.0.iter()
    }
}

impl FromIterator<PieceMoves> for MoveTable {
    fn from_iter<T: IntoIterator<Item = PieceMoves>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for MoveTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.piece, &entry.moves)?;
        }
        map.end()
    }
}

struct MoveTableVisitor;

impl<'de> Visitor<'de> for MoveTableVisitor {
    type Value = MoveTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from occupant id to a list of squares")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<PieceMoves> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((piece, moves)) = access.next_entry::<Occupant, Vec<Square>>()? {
            if entries.iter().any(|entry| entry.piece == piece) {
                return Err(de::Error::custom(format!("duplicate occupant {}", piece)));
            }
            entries.push(PieceMoves { piece, moves });
        }
        Ok(MoveTable(entries))
    }
}

impl<'de> Deserialize<'de> for MoveTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MoveTableVisitor)
    }
}

/// Legal moves for every piece of `side`.
pub fn generate_legal_moves(board: &Board, side: Color) -> MoveTable {
    board
        .pieces_of(side)
        .filter_map(|(from, piece)| {
            let moves = legal_moves_from(board, from);
            (!moves.is_empty()).then_some(PieceMoves { piece, moves })
        })
        .collect()
}

/// Legal destinations of the piece on `from`, empty if the square is empty.
pub fn legal_moves_from(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };

    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|&to| {
            // kings are never taken; a position where one could be is already lost
            if matches!(board.get(to), Some(target) if target.kind == PieceKind::King) {
                return false;
            }
            let mut scratch = board.clone();
            apply_move(&mut scratch, from, to);
            !is_in_check(&scratch, piece.color)
        })
        .collect()
}

/// Destinations allowed by the piece's movement rules, ignoring self-check.
pub fn pseudo_legal_moves(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };

    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_JUMPS),
        PieceKind::King => step_moves(board, from, piece.color, &KING_STEPS),
        PieceKind::Bishop => slide_moves(board, from, piece.color, &DIAGONAL),
        PieceKind::Rook => slide_moves(board, from, piece.color, &ORTHOGONAL),
        PieceKind::Queen => {
            let mut moves = slide_moves(board, from, piece.color, &ORTHOGONAL);
            moves.extend(slide_moves(board, from, piece.color, &DIAGONAL));
            moves
        }
    }
}

/// Squares the piece on `from` attacks. Differs from the pseudo-legal moves
/// only for pawns, which attack both forward diagonals whether or not
/// something stands there and never attack straight ahead.
pub fn attacked_squares(board: &Board, from: Square) -> Vec<Square> {
    match board.get(from) {
        Some(piece) if piece.kind == PieceKind::Pawn => [-1, 1]
            .into_iter()
            .filter_map(|dx| from.offset(dx, piece.color.forward()))
            .collect(),
        Some(_) => pseudo_legal_moves(board, from),
        None => Vec::new(),
    }
}

/// Plays `from -> to` on `board`, promoting a pawn that reaches the far row
/// to a queen. Returns the captured occupant, if any.
pub fn apply_move(board: &mut Board, from: Square, to: Square) -> Option<Occupant> {
    let captured = board.relocate(from, to);
    if let Some(piece) = board.get(to) {
        if piece.kind == PieceKind::Pawn && to.y() == piece.color.promotion_row() {
            board.set(to, Some(piece.promoted(PieceKind::Queen)));
        }
    }
    captured
}

fn is_enemy(board: &Board, square: Square, color: Color) -> bool {
    matches!(board.get(square), Some(occ) if occ.color != color)
}

fn pawn_moves(board: &Board, from: Square, color: Color) -> Vec<Square> {
    let mut moves = Vec::new();
    let dy = color.forward();

    if let Some(one) = from.offset(0, dy) {
        if board.get(one).is_none() {
            moves.push(one);
            if from.y() == color.pawn_row() {
                if let Some(two) = from.offset(0, 2 * dy) {
                    if board.get(two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for dx in [-1, 1] {
        if let Some(diag) = from.offset(dx, dy) {
            if is_enemy(board, diag, color) {
                moves.push(diag);
            }
        }
    }

    moves
}

fn step_moves(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(dx, dy)| from.offset(dx, dy))
        .filter(|&to| match board.get(to) {
            Some(occ) => occ.color != color,
            None => true,
        })
        .collect()
}

fn slide_moves(board: &Board, from: Square, color: Color, directions: &[(i8, i8)]) -> Vec<Square> {
    let mut moves = Vec::new();
    for &(dx, dy) in directions {
        let mut current = from;
        while let Some(next) = current.offset(dx, dy) {
            match board.get(next) {
                None => moves.push(next),
                Some(occ) => {
                    if occ.color != color {
                        moves.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }
    moves
}
