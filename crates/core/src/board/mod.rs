//! Board and position model

mod piece;
mod square;

pub use piece::{Color, Occupant, PieceKind};
pub use square::Square;

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// 8x8 grid of occupants, indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Occupant>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
        }
    }

    /// The standard starting position, Black on rows 0-1 and White on rows 6-7.
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for sq in Square::all() {
            let (color, kind) = match sq.y() {
                0 => (Color::Black, PieceKind::BACK_RANK[sq.x() as usize]),
                1 => (Color::Black, PieceKind::Pawn),
                6 => (Color::White, PieceKind::Pawn),
                7 => (Color::White, PieceKind::BACK_RANK[sq.x() as usize]),
                _ => continue,
            };
            board.place(color, kind, sq);
        }
        board
    }

    /// Builds a board from `(square, color, kind)` placements. Each piece's
    /// origin is the square it is placed on.
    pub fn from_placements<I>(placements: I) -> Self
    where
        I: IntoIterator<Item = (Square, Color, PieceKind)>,
    {
        let mut board = Self::empty();
        for (square, color, kind) in placements {
            board.place(color, kind, square);
        }
        board
    }

    fn place(&mut self, color: Color, kind: PieceKind, square: Square) {
        self.set(square, Some(Occupant::new(color, kind, square)));
    }

    pub fn get(&self, square: Square) -> Option<Occupant> {
        self.cells[square.y() as usize][square.x() as usize]
    }

    pub fn set(&mut self, square: Square, occupant: Option<Occupant>) {
        self.cells[square.y() as usize][square.x() as usize] = occupant;
    }

    /// Occupied squares in scan order.
    pub fn occupants(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|occ| (sq, occ)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        self.occupants().filter(move |(_, occ)| occ.color == color)
    }

    /// Where `occupant` currently stands.
    pub fn find(&self, occupant: Occupant) -> Option<Square> {
        self.occupants()
            .find(|(_, occ)| *occ == occupant)
            .map(|(sq, _)| sq)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, occ)| occ.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    pub fn piece_count(&self) -> usize {
        self.occupants().count()
    }

    /// Moves whatever stands on `from` to `to` and returns the occupant that
    /// was overwritten. Removing a king breaks the board invariant and panics.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Occupant> {
        let moving = self.get(from);
        let captured = self.get(to);
        assert!(
            !matches!(captured, Some(occ) if occ.kind == PieceKind::King),
            "king on {} cannot be captured",
            to
        );
        self.set(from, None);
        self.set(to, moving);
        captured
    }

    /// Checks the invariants a game position must satisfy: every occupant
    /// appears once and each side has exactly one king.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (sq, occ) in self.occupants() {
            if !seen.insert(occ) {
                return Err(Error::MalformedInput(format!(
                    "piece {} appears twice (again on {})",
                    occ, sq
                )));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces_of(color)
                .filter(|(_, occ)| occ.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(Error::MalformedInput(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }

        Ok(())
    }

    /// Rows as plain data, `None` for empty cells.
    pub fn to_rows(&self) -> Vec<Vec<Option<Occupant>>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }

    pub fn from_rows(rows: &[Vec<Option<Occupant>>]) -> Result<Self> {
        if rows.len() != Square::SIZE as usize
            || rows.iter().any(|row| row.len() != Square::SIZE as usize)
        {
            return Err(Error::MalformedInput("board must be 8x8".to_string()));
        }

        let mut board = Self::empty();
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                board.cells[y][x] = *cell;
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(occ) => {
                        let code = occ.kind.code();
                        match occ.color {
                            Color::White => code.to_ascii_uppercase().to_string(),
                            Color::Black => code.to_string(),
                        }
                    }
                    None => ".".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
