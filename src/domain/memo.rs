use crate::domain::ids::{MemoId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discussion note attached to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memo {
    pub id: MemoId,
    pub content: String,
    pub author_id: ParticipantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memo {
    pub fn new(content: String, author_id: ParticipantId) -> Self {
        let now = Utc::now();
        Self {
            id: MemoId::new(),
            content,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }
}
