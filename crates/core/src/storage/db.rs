//! Database operations

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::*;
use crate::error::Result;
use crate::game::GameState;

/// Key-value store of game states, one JSON record per game id.
///
/// Every row carries a version that goes up on each write, so concurrent
/// writers can detect that someone else stored first.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id TEXT PRIMARY KEY NOT NULL,
                state TEXT NOT NULL,
                turn TEXT NOT NULL,
                is_game_over INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_updated_at ON games(updated_at);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    /// Stores a new game. Returns `false` if the id is already taken.
    pub fn insert_game(&self, id: &str, state: &GameState) -> Result<bool> {
        let json = serde_json::to_string(state)?;
        let now = Self::now();

        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO games
            (id, state, turn, is_game_over, version, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            "#,
            params![id, json, state.turn().as_str(), state.is_game_over(), now],
        )?;

        Ok(inserted == 1)
    }

    pub fn load_game(&self, id: &str) -> Result<Option<VersionedGame>> {
        let row = self
            .conn
            .query_row(
                "SELECT state, version FROM games WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)),
            )
            .optional()?;

        match row {
            Some((json, version)) => Ok(Some(VersionedGame {
                state: serde_json::from_str(&json)?,
                version,
            })),
            None => Ok(None),
        }
    }

    /// Writes `state` only if the stored version still equals `expected`.
    /// Returns `false` when another writer got there first.
    pub fn compare_and_swap(&self, id: &str, expected: u64, state: &GameState) -> Result<bool> {
        let json = serde_json::to_string(state)?;

        let updated = self.conn.execute(
            r#"
            UPDATE games
            SET state = ?1, turn = ?2, is_game_over = ?3, version = version + 1, updated_at = ?4
            WHERE id = ?5 AND version = ?6
            "#,
            params![
                json,
                state.turn().as_str(),
                state.is_game_over(),
                Self::now(),
                id,
                expected,
            ],
        )?;

        Ok(updated == 1)
    }

    pub fn get_recent_games(&self, limit: u32) -> Result<Vec<StoredGame>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, turn, is_game_over, version, created_at, updated_at
            FROM games ORDER BY updated_at DESC, id LIMIT ?1
            "#,
        )?;

        let games = stmt
            .query_map(params![limit], |row| {
                Ok(StoredGame {
                    id: row.get(0)?,
                    turn: row.get(1)?,
                    is_game_over: row.get(2)?,
                    version: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    pub fn count_games(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn advanced(state: &GameState) -> GameState {
        state
            .select_piece("W60p".parse().unwrap())
            .unwrap()
            .attempt_move(Square::new(0, 5).unwrap())
            .unwrap()
    }

    #[test]
    fn test_insert_and_load() {
        let db = Database::open_in_memory().unwrap();
        let state = GameState::new();

        assert!(db.insert_game("abc", &state).unwrap());
        assert!(!db.insert_game("abc", &state).unwrap());

        let loaded = db.load_game("abc").unwrap().unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.version, 0);
        assert!(db.load_game("missing").unwrap().is_none());
        assert_eq!(db.count_games().unwrap(), 1);
    }

    #[test]
    fn test_compare_and_swap_rejects_stale_version() {
        let db = Database::open_in_memory().unwrap();
        let state = GameState::new();
        db.insert_game("g1", &state).unwrap();

        let next = advanced(&state);
        assert!(db.compare_and_swap("g1", 0, &next).unwrap());
        // a second writer still holding version 0 loses
        assert!(!db.compare_and_swap("g1", 0, &state).unwrap());

        let loaded = db.load_game("g1").unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.state, next);
    }

    #[test]
    fn test_compare_and_swap_on_missing_game() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.compare_and_swap("nope", 0, &GameState::new()).unwrap());
    }

    #[test]
    fn test_recent_games_summary() {
        let db = Database::open_in_memory().unwrap();
        let state = GameState::new();
        db.insert_game("a", &state).unwrap();
        db.insert_game("b", &state).unwrap();
        db.compare_and_swap("b", 0, &advanced(&state)).unwrap();

        let games = db.get_recent_games(10).unwrap();
        assert_eq!(games.len(), 2);
        let b = games.iter().find(|g| g.id == "b").unwrap();
        assert_eq!(b.turn, "black");
        assert_eq!(b.version, 1);
        assert!(!b.is_game_over);

        assert_eq!(db.get_recent_games(1).unwrap().len(), 1);
    }
}
