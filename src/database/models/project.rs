use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project owned by exactly one user. Participants are referenced by id and
/// never include the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i32,
    pub participant_ids: Vec<i32>,
}

impl Project {
    pub fn is_owner(&self, user_id: i32) -> bool {
        self.owner_id == user_id
    }

    pub fn is_participant(&self, user_id: i32) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// Owner or participant.
    pub fn is_member(&self, user_id: i32) -> bool {
        self.is_owner(user_id) || self.is_participant(user_id)
    }
}
