use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{conversations, messages};

pub mod message_kind {
    pub const TEXT: &str = "text";
    pub const FILE: &str = "file";
    pub const VOICE: &str = "voice";
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = conversations)]
pub struct Conversation {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub match_id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub kind: String,
    pub content: Option<String>,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub kind: String,
    pub content: Option<String>,
    pub attachment_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_either_side() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let conv = Conversation {
            id: Uuid::now_v7(),
            match_id: Uuid::now_v7(),
            user_a: a,
            user_b: b,
            last_message_at: None,
            created_at: Utc::now(),
        };
        assert!(conv.has_member(a));
        assert!(conv.has_member(b));
        assert!(!conv.has_member(Uuid::now_v7()));
    }
}
