//! Game sessions on top of the store
//!
//! Every transition runs load, apply, compare-and-swap, broadcast while
//! holding the database lock, so two transitions on the same game never
//! interleave inside one process. The version check catches writers in other
//! processes sharing the same database file.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::board::{Occupant, Square};
use crate::error::{Error, Result};
use crate::game::{GameRecord, GameState};
use crate::storage::{Database, StoredGame};

const GAME_ID_LEN: usize = 9;
const GAME_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_STORE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Created,
    Selected,
    Moved,
}

/// Published after every successful change to a game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub game_id: String,
    pub kind: EventKind,
    pub game: GameRecord,
}

pub struct ChessService {
    db: Mutex<Database>,
    events: broadcast::Sender<GameEvent>,
}

impl ChessService {
    /// `capacity` bounds how many events a slow subscriber may fall behind
    /// before it starts missing them.
    pub fn new(db: Database, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            db: Mutex::new(db),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create_game(&self) -> Result<(String, GameState)> {
        let state = GameState::new();
        let db = self.db();

        for _ in 0..MAX_STORE_ATTEMPTS {
            let id = generate_game_id();
            if db.insert_game(&id, &state)? {
                info!(game_id = %id, "game created");
                self.publish(&id, EventKind::Created, &state);
                return Ok((id, state));
            }
            warn!(game_id = %id, "game id collision, retrying");
        }

        Err(Error::Conflict("could not allocate a game id".to_string()))
    }

    pub fn get_game(&self, id: &str) -> Result<GameState> {
        self.db()
            .load_game(id)?
            .map(|game| game.state)
            .ok_or_else(|| Error::GameNotFound(id.to_string()))
    }

    pub fn list_games(&self, limit: u32) -> Result<Vec<StoredGame>> {
        self.db().get_recent_games(limit)
    }

    pub fn select_piece(&self, id: &str, piece: Occupant) -> Result<GameState> {
        self.transition(id, EventKind::Selected, |state| {
            state.select_piece(piece).map_err(Error::from)
        })
    }

    pub fn make_move(&self, id: &str, to: Square) -> Result<GameState> {
        self.transition(id, EventKind::Moved, |state| {
            state.attempt_move(to).map_err(Error::from)
        })
    }

    fn transition<F>(&self, id: &str, kind: EventKind, apply: F) -> Result<GameState>
    where
        F: Fn(&GameState) -> Result<GameState>,
    {
        let db = self.db();

        for attempt in 1..=MAX_STORE_ATTEMPTS {
            let current = db
                .load_game(id)?
                .ok_or_else(|| Error::GameNotFound(id.to_string()))?;

            let next = match apply(&current.state) {
                Ok(next) => next,
                Err(e) => {
                    debug!(game_id = %id, error = %e, "transition rejected");
                    return Err(e);
                }
            };

            if db.compare_and_swap(id, current.version, &next)? {
                info!(
                    game_id = %id,
                    event = ?kind,
                    turn = %next.turn(),
                    check = next.is_in_check(),
                    game_over = next.is_game_over(),
                    "game updated"
                );
                self.publish(id, kind, &next);
                return Ok(next);
            }

            warn!(game_id = %id, attempt, "stale game version, retrying");
        }

        Err(Error::Conflict(id.to_string()))
    }

    fn publish(&self, id: &str, kind: EventKind, state: &GameState) {
        let event = GameEvent {
            game_id: id.to_string(),
            kind,
            game: state.to_record(),
        };
        // no subscribers is fine
        match self.events.send(event) {
            Ok(receivers) => debug!(game_id = %id, receivers, "event published"),
            Err(_) => debug!(game_id = %id, "event dropped, no subscribers"),
        }
    }
}

fn generate_game_id() -> String {
    let mut rng = rand::rng();
    (0..GAME_ID_LEN)
        .map(|_| GAME_ID_ALPHABET[rng.random_range(0..GAME_ID_ALPHABET.len())] as char)
        .collect()
}
