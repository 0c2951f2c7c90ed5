//! Database row types. These map directly to SQLite rows and stay
//! separate from the jokes-types models so the store does not leak upward.

use chrono::{DateTime, Utc};
use jokes_types::models::{Joke, JokeListItem, User};
use tracing::warn;
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct JokeRow {
    pub id: String,
    pub jokester_id: String,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

pub struct JokeListRow {
    pub id: String,
    pub name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: parse_id(&row.id, "user"),
            created_at: parse_timestamp(&row.created_at, &row.id),
            username: row.username,
        }
    }
}

impl From<JokeRow> for Joke {
    fn from(row: JokeRow) -> Self {
        Joke {
            id: parse_id(&row.id, "joke"),
            jokester_id: parse_id(&row.jokester_id, "jokester"),
            created_at: parse_timestamp(&row.created_at, &row.id),
            name: row.name,
            content: row.content,
        }
    }
}

impl From<JokeListRow> for JokeListItem {
    fn from(row: JokeListRow) -> Self {
        JokeListItem {
            id: parse_id(&row.id, "joke"),
            name: row.name,
        }
    }
}

fn parse_id(raw: &str, kind: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", kind, raw, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt created_at '{}' on row '{}': {}", raw, row_id, e);
        DateTime::default()
    })
}
