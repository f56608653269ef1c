// ═══════════════════════════════════════════════════════════════════════
// Persistence — the repository seam plus the two stock backends.
//
// The service writes the full match state after every committed action
// and a result row when a match finishes; the leaderboard is an
// aggregate over recorded results.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use war_engine::{MatchId, MatchState};

use crate::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub username: String,
    pub agent: String,
    pub won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub seed: u64,
    pub turns: u32,
    pub winner: String,
    pub condition: String,
    pub players: Vec<PlayerResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub username: String,
    pub played: u32,
    pub wins: u32,
}

impl LeaderboardRow {
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.played)
        }
    }
}

pub trait Repository: Send + Sync {
    fn save_state(&self, state: &MatchState) -> Result<(), ServiceError>;
    fn load_state(&self, id: MatchId) -> Result<Option<MatchState>, ServiceError>;
    fn record_result(&self, result: &MatchResult) -> Result<(), ServiceError>;
    fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, ServiceError>;
}

// ── In-memory backend ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRepository {
    states: Mutex<HashMap<u64, String>>,
    results: Mutex<Vec<MatchResult>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        MemoryRepository::default()
    }
}

impl Repository for MemoryRepository {
    fn save_state(&self, state: &MatchState) -> Result<(), ServiceError> {
        let encoded = serde_json::to_string(state)?;
        self.states
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?
            .insert(state.id.0, encoded);
        Ok(())
    }

    fn load_state(&self, id: MatchId) -> Result<Option<MatchState>, ServiceError> {
        let states = self.states.lock().map_err(|_| ServiceError::LockPoisoned)?;
        match states.get(&id.0) {
            Some(encoded) => Ok(Some(serde_json::from_str(encoded)?)),
            None => Ok(None),
        }
    }

    fn record_result(&self, result: &MatchResult) -> Result<(), ServiceError> {
        self.results
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?
            .push(result.clone());
        Ok(())
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, ServiceError> {
        let results = self.results.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let mut rows: HashMap<String, LeaderboardRow> = HashMap::new();
        for result in results.iter() {
            for p in &result.players {
                let row = rows
                    .entry(p.username.clone())
                    .or_insert_with(|| LeaderboardRow {
                        username: p.username.clone(),
                        played: 0,
                        wins: 0,
                    });
                row.played += 1;
                if p.won {
                    row.wins += 1;
                }
            }
        }
        let mut rows: Vec<LeaderboardRow> = rows.into_values().collect();
        rows.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.username.cmp(&b.username)));
        Ok(rows)
    }
}

// ── SQLite backend ─────────────────────────────────────────────────────

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ServiceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS matches (
                 id         INTEGER PRIMARY KEY,
                 created_at INTEGER NOT NULL,
                 seed       INTEGER NOT NULL,
                 phase      TEXT NOT NULL,
                 state      TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS results (
                 match_id  INTEGER PRIMARY KEY,
                 seed      INTEGER NOT NULL,
                 turns     INTEGER NOT NULL,
                 winner    TEXT NOT NULL,
                 condition TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS match_players (
                 match_id INTEGER NOT NULL,
                 username TEXT NOT NULL,
                 agent    TEXT NOT NULL,
                 won      INTEGER NOT NULL
             );",
        )?;
        Ok(SqliteRepository {
            conn: Mutex::new(conn),
        })
    }
}

impl Repository for SqliteRepository {
    fn save_state(&self, state: &MatchState) -> Result<(), ServiceError> {
        let encoded = serde_json::to_string(state)?;
        let conn = self.conn.lock().map_err(|_| ServiceError::LockPoisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO matches (id, created_at, seed, phase, state)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                state.id.0 as i64,
                state.created_at_ms as i64,
                state.seed as i64,
                state.phase.to_string(),
                encoded,
            ],
        )?;
        Ok(())
    }

    fn load_state(&self, id: MatchId) -> Result<Option<MatchState>, ServiceError> {
        let conn = self.conn.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT state FROM matches WHERE id = ?1")?;
        let mut rows = stmt.query(params![id.0 as i64])?;
        match rows.next()? {
            Some(row) => {
                let encoded: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&encoded)?))
            }
            None => Ok(None),
        }
    }

    fn record_result(&self, result: &MatchResult) -> Result<(), ServiceError> {
        let mut conn = self.conn.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO results (match_id, seed, turns, winner, condition)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result.match_id.0 as i64,
                result.seed as i64,
                result.turns,
                result.winner,
                result.condition,
            ],
        )?;
        tx.execute(
            "DELETE FROM match_players WHERE match_id = ?1",
            params![result.match_id.0 as i64],
        )?;
        for p in &result.players {
            tx.execute(
                "INSERT INTO match_players (match_id, username, agent, won)
                 VALUES (?1, ?2, ?3, ?4)",
                params![result.match_id.0 as i64, p.username, p.agent, p.won],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, ServiceError> {
        let conn = self.conn.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT username, COUNT(*), SUM(won)
             FROM match_players
             GROUP BY username
             ORDER BY SUM(won) DESC, username ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardRow {
                username: row.get(0)?,
                played: row.get(1)?,
                wins: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use war_engine::setup::{join_lobby, new_lobby};

    fn sample_state() -> MatchState {
        let mut state = new_lobby(MatchId(9), 123, 77, "alice", false);
        join_lobby(&mut state, "bob", true).unwrap();
        state
    }

    fn sample_result(id: u64, winner: &str) -> MatchResult {
        MatchResult {
            match_id: MatchId(id),
            seed: 1,
            turns: 10,
            winner: winner.to_string(),
            condition: "EliminationComplete".to_string(),
            players: vec![
                PlayerResult {
                    username: "alice".into(),
                    agent: "heuristic".into(),
                    won: winner == "alice",
                },
                PlayerResult {
                    username: "bob".into(),
                    agent: "random".into(),
                    won: winner == "bob",
                },
            ],
        }
    }

    fn roundtrip(repo: &dyn Repository) {
        let state = sample_state();
        repo.save_state(&state).unwrap();
        let loaded = repo.load_state(MatchId(9)).unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            serde_json::to_string(&loaded).unwrap()
        );
        assert!(repo.load_state(MatchId(404)).unwrap().is_none());

        repo.record_result(&sample_result(9, "alice")).unwrap();
        repo.record_result(&sample_result(10, "alice")).unwrap();
        repo.record_result(&sample_result(11, "bob")).unwrap();

        let board = repo.leaderboard().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].wins, 2);
        assert_eq!(board[0].played, 3);
        assert!((board[0].win_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn memory_repository_roundtrip() {
        roundtrip(&MemoryRepository::new());
    }

    #[test]
    fn sqlite_repository_roundtrip() {
        roundtrip(&SqliteRepository::open_in_memory().unwrap());
    }

    #[test]
    fn result_recording_is_idempotent_per_match() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.record_result(&sample_result(9, "alice")).unwrap();
        repo.record_result(&sample_result(9, "alice")).unwrap();
        let board = repo.leaderboard().unwrap();
        assert_eq!(board[0].played, 1);
    }
}
