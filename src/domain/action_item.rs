use crate::domain::ids::{ActionItemId, CardId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Follow-up agreed on during the ACTION_ITEMS phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ActionItemId,
    pub content: String,
    pub assignee_id: Option<ParticipantId>,
    /// Card the item came out of, if any
    pub card_id: Option<CardId>,
    pub created_by: ParticipantId,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActionItem {
    pub fn new(
        content: String,
        created_by: ParticipantId,
        assignee_id: Option<ParticipantId>,
        card_id: Option<CardId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ActionItemId::new(),
            content,
            assignee_id,
            card_id,
            created_by,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionItemChange {
    pub content: Option<String>,
    /// `Some(None)` clears the assignee
    pub assignee_id: Option<Option<ParticipantId>>,
    pub is_completed: Option<bool>,
}

impl ActionItemChange {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.assignee_id.is_none() && self.is_completed.is_none()
    }
}
