//! Database models

use serde::{Deserialize, Serialize};

use crate::game::GameState;

/// Summary row of a stored game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: String,
    pub turn: String,
    pub is_game_over: bool,
    pub version: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A loaded game together with the version it was read at
#[derive(Debug, Clone)]
pub struct VersionedGame {
    pub state: GameState,
    pub version: u64,
}
