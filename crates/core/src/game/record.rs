//! Plain-data form of a game state

use serde::{Deserialize, Serialize};

use super::GameState;
use crate::board::{Board, Color, Occupant, PieceKind};
use crate::error::{Error, Result};
use crate::rules::MoveTable;

/// Everything a [`GameState`] holds, as plain serializable data.
///
/// Field names follow the JSON shape clients already consume. Empty cells
/// are written as `""`; `null` is accepted as well on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(with = "board_rows")]
    pub board: Vec<Vec<Option<Occupant>>>,
    pub turn: Color,
    #[serde(default)]
    pub selected_piece: Option<Occupant>,
    #[serde(default)]
    pub next_moves_possible: MoveTable,
    #[serde(default)]
    pub is_check: bool,
    #[serde(default)]
    pub is_game_over: bool,
    #[serde(default)]
    pub killed_pieces: Vec<Occupant>,
}

impl From<GameState> for GameRecord {
    fn from(state: GameState) -> Self {
        Self {
            board: state.board.to_rows(),
            turn: state.turn,
            selected_piece: state.selected,
            next_moves_possible: state.legal_moves,
            is_check: state.in_check,
            is_game_over: state.game_over,
            killed_pieces: state.captured,
        }
    }
}

impl TryFrom<GameRecord> for GameState {
    type Error = Error;

    /// The move table and the check/game-over flags are derived data and
    /// are recomputed from the board rather than taken from the record.
    fn try_from(record: GameRecord) -> Result<Self> {
        let board = Board::from_rows(&record.board)?;
        board.validate()?;

        if let Some(selected) = record.selected_piece {
            if board.find(selected).is_none() {
                return Err(Error::MalformedInput(format!(
                    "selected piece {} is not on the board",
                    selected
                )));
            }
            if selected.color != record.turn {
                return Err(Error::MalformedInput(format!(
                    "selected piece {} does not belong to {}",
                    selected, record.turn
                )));
            }
        }

        for taken in &record.killed_pieces {
            if taken.kind == PieceKind::King {
                return Err(Error::MalformedInput(format!("king {} cannot be captured", taken)));
            }
            if board.find(*taken).is_some() {
                return Err(Error::MalformedInput(format!(
                    "captured piece {} is still on the board",
                    taken
                )));
            }
        }

        let mut state = GameState::from_position(board, record.turn)?;
        state.captured = record.killed_pieces;
        state.selected = if state.game_over {
            None
        } else {
            record.selected_piece
        };
        Ok(state)
    }
}

mod board_rows {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::ser::{SerializeSeq, Serializer};

    use crate::board::Occupant;

    type Rows = Vec<Vec<Option<Occupant>>>;

    pub fn serialize<S: Serializer>(rows: &Rows, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(rows.len()))?;
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| cell.map(String::from).unwrap_or_default())
                .collect();
            seq.serialize_element(&cells)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rows, D::Error> {
        let raw: Vec<Vec<Option<String>>> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell.as_deref() {
                        None | Some("") => Ok(None),
                        Some(token) => token.parse().map(Some).map_err(de::Error::custom),
                    })
                    .collect()
            })
            .collect()
    }
}
