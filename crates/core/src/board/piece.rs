//! Piece colors, kinds and occupant identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Square;
use crate::error::{Error, Result};

/// Side to move / owner of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Row delta of a forward pawn step.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row the pawns start on.
    pub fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row a pawn promotes on.
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    fn code(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Back rank layout from the a-file to the h-file.
    pub const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    pub fn code(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }
}

/// One piece instance on the board.
///
/// `origin` is the square the piece started the game on. It only serves to
/// tell identical pieces apart and is never recomputed from the current
/// position. On the wire an occupant is a compact token: color letter, origin
/// row, origin file, kind letter (`W60p` is White's a-pawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Occupant {
    pub color: Color,
    pub kind: PieceKind,
    pub origin: Square,
}

impl Occupant {
    pub fn new(color: Color, kind: PieceKind, origin: Square) -> Self {
        Self { color, kind, origin }
    }

    /// Same instance after promotion.
    pub fn promoted(self, kind: PieceKind) -> Self {
        Self { kind, ..self }
    }

    pub fn token(&self) -> String {
        format!(
            "{}{}{}{}",
            self.color.code(),
            self.origin.y(),
            self.origin.x(),
            self.kind.code()
        )
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl FromStr for Occupant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedInput(format!("invalid piece id '{}'", s));

        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 4 {
            return Err(malformed());
        }

        let color = match chars[0] {
            'W' => Color::White,
            'B' => Color::Black,
            _ => return Err(malformed()),
        };
        let y = chars[1].to_digit(10).ok_or_else(malformed)?;
        let x = chars[2].to_digit(10).ok_or_else(malformed)?;
        let origin = Square::new(x as u8, y as u8).ok_or_else(malformed)?;
        let kind = PieceKind::from_code(chars[3]).ok_or_else(malformed)?;

        Ok(Self { color, kind, origin })
    }
}

impl TryFrom<String> for Occupant {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Occupant> for String {
    fn from(occupant: Occupant) -> String {
        occupant.token()
    }
}
