//! Game state machine
//!
//! A [`GameState`] only changes through [`GameState::select_piece`] and
//! [`GameState::attempt_move`]. Both take `&self` and hand back a new state,
//! so a rejected transition can never leave a half-applied move behind.

mod record;

pub use record::GameRecord;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Occupant, Square};
use crate::error::{MoveError, Result, SelectError};
use crate::rules::{self, MoveTable, Terminal};

/// Where a game stands between transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingSelection,
    PieceSelected,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GameRecord", try_from = "GameRecord")]
pub struct GameState {
    board: Board,
    turn: Color,
    selected: Option<Occupant>,
    legal_moves: MoveTable,
    in_check: bool,
    game_over: bool,
    captured: Vec<Occupant>,
}

impl GameState {
    /// Standard starting position with White to move.
    pub fn new() -> Self {
        let mut state = Self {
            board: Board::starting(),
            turn: Color::White,
            selected: None,
            legal_moves: MoveTable::default(),
            in_check: false,
            game_over: false,
            captured: Vec::new(),
        };
        state.refresh();
        state
    }

    /// Starts a game from an arbitrary position.
    pub fn from_position(board: Board, turn: Color) -> Result<Self> {
        board.validate()?;
        let mut state = Self {
            board,
            turn,
            selected: None,
            legal_moves: MoveTable::default(),
            in_check: false,
            game_over: false,
            captured: Vec::new(),
        };
        state.refresh();
        Ok(state)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn selected(&self) -> Option<Occupant> {
        self.selected
    }

    /// Legal moves of the side to move.
    pub fn legal_moves(&self) -> &MoveTable {
        &self.legal_moves
    }

    pub fn is_in_check(&self) -> bool {
        self.in_check
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Captured occupants in the order they were taken.
    pub fn captured(&self) -> &[Occupant] {
        &self.captured
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.selected.is_some() {
            Phase::PieceSelected
        } else {
            Phase::AwaitingSelection
        }
    }

    pub fn outcome(&self) -> Option<Terminal> {
        if self.game_over {
            Terminal::classify(false, self.in_check)
        } else {
            None
        }
    }

    /// The side that delivered mate.
    pub fn winner(&self) -> Option<Color> {
        match self.outcome() {
            Some(Terminal::Checkmate) => Some(!self.turn),
            _ => None,
        }
    }

    /// Marks `piece` as the one to move next. Replaces any earlier selection.
    pub fn select_piece(&self, piece: Occupant) -> std::result::Result<Self, SelectError> {
        if self.game_over {
            return Err(SelectError::GameOver);
        }
        if self.board.find(piece).is_none() {
            return Err(SelectError::NotFound);
        }
        if piece.color != self.turn {
            return Err(SelectError::WrongTurn);
        }

        Ok(Self {
            selected: Some(piece),
            ..self.clone()
        })
    }

    /// Moves the selected piece to `to`.
    ///
    /// Legality is checked against moves generated from the current board,
    /// never against the cached table.
    pub fn attempt_move(&self, to: Square) -> std::result::Result<Self, MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        let piece = self.selected.ok_or(MoveError::NoSelection)?;
        let from = self.board.find(piece).ok_or(MoveError::NoSelection)?;

        if !rules::legal_moves_from(&self.board, from).contains(&to) {
            return Err(MoveError::IllegalMove);
        }

        let mut next = self.clone();
        if let Some(taken) = rules::apply_move(&mut next.board, from, to) {
            next.captured.push(taken);
        }
        next.selected = None;
        next.turn = !self.turn;
        next.refresh();
        Ok(next)
    }

    /// Recomputes everything derived from board and turn.
    fn refresh(&mut self) {
        self.legal_moves = rules::generate_legal_moves(&self.board, self.turn);
        self.in_check = rules::is_in_check(&self.board, self.turn);
        self.game_over = Terminal::classify(!self.legal_moves.is_empty(), self.in_check).is_some();
    }

    pub fn to_record(&self) -> GameRecord {
        GameRecord::from(self.clone())
    }

    /// Rebuilds a state from its plain-data record, validating the board
    /// invariants and recomputing the derived fields.
    pub fn from_record(record: GameRecord) -> Result<Self> {
        Self::try_from(record)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn piece(token: &str) -> Occupant {
        token.parse().unwrap()
    }

    fn play(state: &GameState, token: &str, to: &str) -> GameState {
        state
            .select_piece(piece(token))
            .unwrap()
            .attempt_move(sq(to))
            .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();
        assert_eq!(state.turn(), Color::White);
        assert_eq!(state.phase(), Phase::AwaitingSelection);
        assert_eq!(state.legal_moves().move_count(), 20);
        assert!(!state.is_in_check());
        assert!(!state.is_game_over());
        assert!(state.captured().is_empty());
    }

    #[test]
    fn test_select_and_move_pawn() {
        let state = GameState::new();
        let selected = state.select_piece(piece("W60p")).unwrap();
        assert_eq!(selected.phase(), Phase::PieceSelected);

        let target = Square::new(0, 5).unwrap();
        let moved = selected.attempt_move(target).unwrap();
        assert_eq!(moved.board().get(target), Some(piece("W60p")));
        assert_eq!(moved.board().get(Square::new(0, 6).unwrap()), None);
        assert_eq!(moved.turn(), Color::Black);
        assert_eq!(moved.selected(), None);
        assert!(moved.captured().is_empty());
        assert_eq!(moved.legal_moves().move_count(), 20);

        // the previous state is untouched
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_select_on_wrong_turn() {
        let state = GameState::new();
        assert_eq!(state.select_piece(piece("B10p")), Err(SelectError::WrongTurn));
    }

    #[test]
    fn test_select_missing_piece() {
        let state = GameState::new();
        // no such piece: the white a-pawn is not a knight
        assert_eq!(state.select_piece(piece("W60n")), Err(SelectError::NotFound));
    }

    #[test]
    fn test_move_without_selection() {
        let state = GameState::new();
        assert_eq!(state.attempt_move(sq("a3")), Err(MoveError::NoSelection));
    }

    #[test]
    fn test_illegal_knight_move_leaves_state_unchanged() {
        let state = GameState::new().select_piece(piece("W71n")).unwrap();
        assert_eq!(state.legal_moves().get(piece("W71n")).len(), 2);

        let before = state.clone();
        assert_eq!(state.attempt_move(sq("b3")), Err(MoveError::IllegalMove));
        assert_eq!(state, before);
        assert_eq!(state.turn(), Color::White);
        assert_eq!(state.selected(), Some(piece("W71n")));
    }

    #[test]
    fn test_piece_without_moves_can_be_selected() {
        let state = GameState::new().select_piece(piece("W70r")).unwrap();
        assert_eq!(state.selected(), Some(piece("W70r")));
        assert_eq!(state.attempt_move(sq("a3")), Err(MoveError::IllegalMove));
    }

    #[test]
    fn test_reselect_replaces_selection() {
        let state = GameState::new()
            .select_piece(piece("W71n"))
            .unwrap()
            .select_piece(piece("W64p"))
            .unwrap();
        assert_eq!(state.selected(), Some(piece("W64p")));
        assert!(state.attempt_move(sq("e4")).is_ok());
    }

    #[test]
    fn test_capture_is_recorded() {
        let mut state = GameState::new();
        state = play(&state, "W64p", "e4");
        state = play(&state, "B13p", "d5");
        state = play(&state, "W64p", "d5");

        assert_eq!(state.captured(), &[piece("B13p")]);
        assert_eq!(state.turn(), Color::Black);
        assert_eq!(state.board().piece_count(), 31);

        // the captured pawn can no longer be selected
        state = play(&state, "B03q", "d5");
        assert_eq!(state.captured(), &[piece("B13p"), piece("W64p")]);
        assert_eq!(state.select_piece(piece("W64p")), Err(SelectError::NotFound));
    }

    #[test]
    fn test_stale_table_is_not_trusted() {
        // cached table claims the knight may jump, but the board says otherwise
        let state = GameState::new().select_piece(piece("W71n")).unwrap();
        let mut board = state.board().clone();
        board.set(sq("a3"), Some(Occupant::new(Color::White, PieceKind::Pawn, sq("a3"))));
        board.set(sq("a2"), None);
        let record = GameRecord {
            board: board.to_rows(),
            ..state.to_record()
        };
        let restored = GameState::from_record(record).unwrap();
        assert_eq!(restored.attempt_move(sq("a3")), Err(MoveError::IllegalMove));
    }

    #[test]
    fn test_fools_mate_ends_game() {
        let mut state = GameState::new();
        state = play(&state, "W65p", "f3");
        state = play(&state, "B14p", "e5");
        state = play(&state, "W66p", "g4");
        state = play(&state, "B03q", "h4");

        assert!(state.is_in_check());
        assert!(state.is_game_over());
        assert!(state.legal_moves().is_empty());
        assert_eq!(state.phase(), Phase::GameOver);
        assert_eq!(state.outcome(), Some(Terminal::Checkmate));
        assert_eq!(state.winner(), Some(Color::Black));

        assert_eq!(state.select_piece(piece("W74k")), Err(SelectError::GameOver));
        assert_eq!(state.attempt_move(sq("e2")), Err(MoveError::GameOver));
    }

    #[test]
    fn test_from_position_stalemate() {
        let board = Board::from_placements([
            (sq("a8"), Color::Black, PieceKind::King),
            (sq("c7"), Color::White, PieceKind::Queen),
            (sq("e1"), Color::White, PieceKind::King),
        ]);
        let state = GameState::from_position(board, Color::Black).unwrap();
        assert!(state.is_game_over());
        assert_eq!(state.outcome(), Some(Terminal::Stalemate));
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_from_position_rejects_missing_king() {
        let board = Board::from_placements([(sq("e1"), Color::White, PieceKind::King)]);
        assert!(GameState::from_position(board, Color::White).is_err());
    }

    #[test]
    fn test_promotion_through_transition() {
        let board = Board::from_placements([
            (sq("b7"), Color::White, PieceKind::Pawn),
            (sq("e1"), Color::White, PieceKind::King),
            (sq("h5"), Color::Black, PieceKind::King),
            (sq("a8"), Color::Black, PieceKind::Rook),
        ]);
        let state = GameState::from_position(board, Color::White).unwrap();
        let pawn = state.board().get(sq("b7")).unwrap();

        let next = state.select_piece(pawn).unwrap().attempt_move(sq("a8")).unwrap();
        let queen = next.board().get(sq("a8")).unwrap();
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.origin, pawn.origin);
        assert_eq!(next.captured().len(), 1);
        assert_eq!(next.captured()[0].kind, PieceKind::Rook);
    }
}
