//! Board coordinates

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A square on the 8x8 board.
///
/// `x` is the file (0 = a-file) and `y` the row counted from the top, so
/// `y = 0` is Black's back rank and `y = 7` is White's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    x: u8,
    y: u8,
}

#[derive(Deserialize)]
struct RawSquare {
    x: i64,
    y: i64,
}

impl TryFrom<RawSquare> for Square {
    type Error = Error;

    fn try_from(raw: RawSquare) -> Result<Self> {
        Square::from_coords(raw.x, raw.y)
    }
}

impl Square {
    pub const SIZE: u8 = 8;

    /// Builds a square, returning `None` when either coordinate is off the board.
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < Self::SIZE && y < Self::SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Like [`Square::new`] but for untrusted input.
    pub fn from_coords(x: i64, y: i64) -> Result<Self> {
        if (0..Self::SIZE as i64).contains(&x) && (0..Self::SIZE as i64).contains(&y) {
            Ok(Self { x: x as u8, y: y as u8 })
        } else {
            Err(Error::MalformedInput(format!(
                "square ({}, {}) is off the board",
                x, y
            )))
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// The square shifted by `(dx, dy)`, if it stays on the board.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if (0..Self::SIZE as i8).contains(&x) && (0..Self::SIZE as i8).contains(&y) {
            Some(Self { x: x as u8, y: y as u8 })
        } else {
            None
        }
    }

    /// All 64 squares in scan order: row by row from the top, then by file.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::SIZE).flat_map(|y| (0..Self::SIZE).map(move |x| Square { x, y }))
    }

    /// Algebraic name such as `e4`.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", (b'a' + self.x) as char, Self::SIZE - self.y)
    }

    pub fn from_algebraic(name: &str) -> Result<Self> {
        let bytes = name.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(Error::MalformedInput(format!("invalid square name '{}'", name)));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(Error::MalformedInput(format!("invalid square name '{}'", name)));
        }
        Ok(Self {
            x: file - b'a',
            y: Self::SIZE - (rank - b'0'),
        })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_off_board() {
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::from_coords(-1, 3).is_err());
    }

    #[test]
    fn test_algebraic_orientation() {
        let a2 = Square::new(0, 6).unwrap();
        assert_eq!(a2.to_algebraic(), "a2");
        assert_eq!(Square::from_algebraic("e8").unwrap(), Square::new(4, 0).unwrap());
        assert!(Square::from_algebraic("i9").is_err());
    }

    #[test]
    fn test_scan_order() {
        let squares: Vec<Square> = Square::all().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], Square::new(0, 0).unwrap());
        assert_eq!(squares[1], Square::new(1, 0).unwrap());
        assert_eq!(squares[8], Square::new(0, 1).unwrap());
    }

    #[test]
    fn test_deserialize_validates_bounds() {
        let sq: Square = serde_json::from_str(r#"{"x": 0, "y": 5}"#).unwrap();
        assert_eq!(sq, Square::new(0, 5).unwrap());
        assert!(serde_json::from_str::<Square>(r#"{"x": 9, "y": 5}"#).is_err());
    }
}
