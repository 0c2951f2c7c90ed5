use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joke {
    pub id: Uuid,
    pub jokester_id: Uuid,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Entry of the recent-jokes sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JokeListItem {
    pub id: Uuid,
    pub name: String,
}
