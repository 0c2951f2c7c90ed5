use crate::models::{JokeListRow, JokeRow, UserRow};
use crate::Database;
use anyhow::Result;
use chrono::SecondsFormat;
use rusqlite::Connection;

/// Microsecond RFC 3339 timestamps sort lexicographically in insertion order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    // -- Users --

    /// Insert a user. Returns false, leaving the store untouched, when the
    /// username is already taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<bool> {
        let now = now_timestamp();
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(username) DO NOTHING",
                (id, username, password_hash, &now),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    // -- Jokes --

    pub fn insert_joke(&self, id: &str, jokester_id: &str, name: &str, content: &str) -> Result<()> {
        let now = now_timestamp();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO jokes (id, jokester_id, name, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![id, jokester_id, name, content, now],
            )?;
            Ok(())
        })
    }

    /// Most recent jokes first, `{id, name}` only.
    pub fn get_recent_jokes(&self, limit: u32) -> Result<Vec<JokeListRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name FROM jokes ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(JokeListRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_joke(&self, id: &str) -> Result<Option<JokeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, jokester_id, name, content, created_at FROM jokes WHERE id = ?1",
            )?;
            stmt.query_row([id], map_joke).optional()
        })
    }

    pub fn count_jokes(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM jokes", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    /// Joke at a stable position, used to pick a random one after `count_jokes`.
    pub fn get_joke_at(&self, offset: u64) -> Result<Option<JokeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, jokester_id, name, content, created_at FROM jokes
                 ORDER BY created_at, rowid
                 LIMIT 1 OFFSET ?1",
            )?;
            stmt.query_row([offset as i64], map_joke).optional()
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of our own literals, never user input.
    let sql = format!(
        "SELECT id, username, password_hash, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    })
    .optional()
}

fn map_joke(row: &rusqlite::Row<'_>) -> rusqlite::Result<JokeRow> {
    Ok(JokeRow {
        id: row.get(0)?,
        jokester_id: row.get(1)?,
        name: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
