use std::collections::BTreeMap;
use std::path::Path;

use itertools::Itertools;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// How many rows the leaderboard shows
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub best_wpm: u32,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            best_wpm: 0,
        }
    }
}

/// Credential and best-score persistence
pub trait UserStore {
    /// Check credentials. Unknown usernames are registered on the spot.
    fn login(&mut self, username: &str, password: &str) -> Result<UserRecord>;
    /// Raise the stored best score to `wpm` if it is higher
    fn update_best_wpm(&mut self, username: &str, wpm: u32) -> Result<()>;
    fn users(&self) -> Result<Vec<UserRecord>>;
}

/// Trim and validate credentials, then hand them to the store
pub fn check_credentials(
    store: &mut dyn UserStore,
    username: &str,
    password: &str,
) -> Result<UserRecord> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }
    store.login(username, password)
}

/// SQLite-backed user store
#[derive(Debug)]
pub struct SqliteUserStore {
    conn: Connection,
}

impl SqliteUserStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "user store opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                best_wpm INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }

    fn find(&self, username: &str) -> Result<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT username, password, best_wpm FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRecord {
                        username: row.get(0)?,
                        password: row.get(1)?,
                        best_wpm: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }
}

impl UserStore for SqliteUserStore {
    fn login(&mut self, username: &str, password: &str) -> Result<UserRecord> {
        match self.find(username)? {
            Some(user) if user.password == password => Ok(user),
            Some(_) => {
                debug!(username, "password mismatch");
                Err(Error::InvalidCredentials)
            }
            None => {
                let user = UserRecord::new(username, password);
                self.conn.execute(
                    "INSERT INTO users (username, password, best_wpm) VALUES (?1, ?2, ?3)",
                    params![user.username, user.password, user.best_wpm],
                )?;
                info!(username, "registered new user");
                Ok(user)
            }
        }
    }

    fn update_best_wpm(&mut self, username: &str, wpm: u32) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE users SET best_wpm = MAX(best_wpm, ?2) WHERE username = ?1",
            params![username, wpm],
        )?;
        if changed == 0 {
            return Err(Error::UserNotFound(username.to_string()));
        }
        Ok(())
    }

    fn users(&self) -> Result<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username, password, best_wpm FROM users ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(UserRecord {
                username: row.get(0)?,
                password: row.get(1)?,
                best_wpm: row.get(2)?,
            })
        })?;

        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }
}

/// In-memory store, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: BTreeMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.username.clone(), u))
                .collect(),
        }
    }
}

impl UserStore for MemoryUserStore {
    fn login(&mut self, username: &str, password: &str) -> Result<UserRecord> {
        match self.users.get(username) {
            Some(user) if user.password == password => Ok(user.clone()),
            Some(_) => Err(Error::InvalidCredentials),
            None => {
                let user = UserRecord::new(username, password);
                self.users.insert(username.to_string(), user.clone());
                Ok(user)
            }
        }
    }

    fn update_best_wpm(&mut self, username: &str, wpm: u32) -> Result<()> {
        let user = self
            .users
            .get_mut(username)
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;
        user.best_wpm = user.best_wpm.max(wpm);
        Ok(())
    }

    fn users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.values().cloned().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: usize,
    pub username: String,
    pub best_wpm: u32,
}

/// Top scores, best first. Equal scores keep their store order.
pub fn leaderboard(users: &[UserRecord]) -> Vec<LeaderboardEntry> {
    users
        .iter()
        .sorted_by(|a, b| b.best_wpm.cmp(&a.best_wpm))
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(idx, u)| LeaderboardEntry {
            rank: idx + 1,
            username: u.username.clone(),
            best_wpm: u.best_wpm,
        })
        .collect()
}

/// Leaderboard from the store; a failing store yields an empty board
pub fn fetch_leaderboard(store: &dyn UserStore) -> Vec<LeaderboardEntry> {
    match store.users() {
        Ok(users) => leaderboard(&users),
        Err(err) => {
            warn!(error = %err, "leaderboard unavailable");
            Vec::new()
        }
    }
}
