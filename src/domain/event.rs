//! Domain events recorded by board and card mutations.
//!
//! Aggregates never hold events themselves: every mutating method appends to
//! an [`Events`] buffer owned by the caller, which drains it after the new
//! state has been saved.

use crate::domain::{
    framework::Framework,
    ids::{ActionItemId, BoardId, CardId, ColumnId, MemoId, ParticipantId, VoteId},
    phase::Phase,
    slug::Slug,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic family an event is broadcast on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Cards,
    Votes,
    Phase,
    Participants,
    Memos,
    Timer,
    ActionItems,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Votes => "votes",
            Self::Phase => "phase",
            Self::Participants => "participants",
            Self::Memos => "memos",
            Self::Timer => "timer",
            Self::ActionItems => "action-items",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What changed, with exactly the fields a client needs to apply it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DomainEvent {
    #[serde(rename = "BOARD_CREATED")]
    BoardCreated {
        board_id: BoardId,
        title: String,
        framework: Framework,
        phase: Phase,
    },

    #[serde(rename = "PHASE_CHANGED")]
    PhaseChanged {
        previous: Phase,
        phase: Phase,
        changed_by: ParticipantId,
    },

    #[serde(rename = "JOINED")]
    ParticipantJoined {
        participant_id: ParticipantId,
        nickname: String,
        is_facilitator: bool,
    },

    #[serde(rename = "ONLINE")]
    ParticipantOnline { participant_id: ParticipantId },

    #[serde(rename = "OFFLINE")]
    ParticipantOffline { participant_id: ParticipantId },

    #[serde(rename = "CARD_CREATED")]
    CardCreated {
        card_id: CardId,
        column_id: ColumnId,
        content: String,
        /// `None` on anonymous boards
        author_id: Option<ParticipantId>,
        author_nickname: Option<String>,
        sort_order: u32,
        created_at: DateTime<Utc>,
    },

    #[serde(rename = "CARD_UPDATED")]
    CardUpdated {
        card_id: CardId,
        content: String,
        updated_at: DateTime<Utc>,
    },

    #[serde(rename = "CARD_MOVED")]
    CardMoved {
        card_id: CardId,
        source_column_id: ColumnId,
        target_column_id: ColumnId,
        sort_order: u32,
    },

    #[serde(rename = "CARD_DELETED")]
    CardDeleted { card_id: CardId, column_id: ColumnId },

    #[serde(rename = "CARD_DISCUSSED")]
    CardDiscussionChanged { card_id: CardId, is_discussed: bool },

    #[serde(rename = "VOTE_ADDED")]
    VoteAdded {
        card_id: CardId,
        vote_id: VoteId,
        /// `None` on anonymous boards
        participant_id: Option<ParticipantId>,
        vote_count: usize,
    },

    #[serde(rename = "VOTE_REMOVED")]
    VoteRemoved {
        card_id: CardId,
        vote_id: VoteId,
        /// `None` on anonymous boards
        participant_id: Option<ParticipantId>,
        vote_count: usize,
    },

    #[serde(rename = "MEMO_CREATED")]
    MemoCreated {
        card_id: CardId,
        memo_id: MemoId,
        content: String,
        /// `None` on anonymous boards
        author_id: Option<ParticipantId>,
    },

    #[serde(rename = "MEMO_UPDATED")]
    MemoUpdated {
        card_id: CardId,
        memo_id: MemoId,
        content: String,
    },

    #[serde(rename = "MEMO_DELETED")]
    MemoDeleted { card_id: CardId, memo_id: MemoId },

    #[serde(rename = "TIMER_STARTED")]
    TimerStarted {
        duration_seconds: u32,
        ends_at: DateTime<Utc>,
    },

    #[serde(rename = "TIMER_PAUSED")]
    TimerPaused { remaining_seconds: u32 },

    #[serde(rename = "TIMER_RESUMED")]
    TimerResumed {
        remaining_seconds: u32,
        ends_at: DateTime<Utc>,
    },

    #[serde(rename = "TIMER_RESET")]
    TimerReset {},

    #[serde(rename = "ACTION_ITEM_CREATED")]
    ActionItemCreated {
        action_item_id: ActionItemId,
        content: String,
        assignee_id: Option<ParticipantId>,
        card_id: Option<CardId>,
    },

    #[serde(rename = "ACTION_ITEM_UPDATED")]
    ActionItemUpdated {
        action_item_id: ActionItemId,
        content: String,
        assignee_id: Option<ParticipantId>,
        is_completed: bool,
    },

    #[serde(rename = "ACTION_ITEM_DELETED")]
    ActionItemDeleted { action_item_id: ActionItemId },
}

impl DomainEvent {
    /// Wire tag, identical to the serialized `type` field
    pub fn tag(&self) -> &'static str {
        match self {
            Self::BoardCreated { .. } => "BOARD_CREATED",
            Self::PhaseChanged { .. } => "PHASE_CHANGED",
            Self::ParticipantJoined { .. } => "JOINED",
            Self::ParticipantOnline { .. } => "ONLINE",
            Self::ParticipantOffline { .. } => "OFFLINE",
            Self::CardCreated { .. } => "CARD_CREATED",
            Self::CardUpdated { .. } => "CARD_UPDATED",
            Self::CardMoved { .. } => "CARD_MOVED",
            Self::CardDeleted { .. } => "CARD_DELETED",
            Self::CardDiscussionChanged { .. } => "CARD_DISCUSSED",
            Self::VoteAdded { .. } => "VOTE_ADDED",
            Self::VoteRemoved { .. } => "VOTE_REMOVED",
            Self::MemoCreated { .. } => "MEMO_CREATED",
            Self::MemoUpdated { .. } => "MEMO_UPDATED",
            Self::MemoDeleted { .. } => "MEMO_DELETED",
            Self::TimerStarted { .. } => "TIMER_STARTED",
            Self::TimerPaused { .. } => "TIMER_PAUSED",
            Self::TimerResumed { .. } => "TIMER_RESUMED",
            Self::TimerReset {} => "TIMER_RESET",
            Self::ActionItemCreated { .. } => "ACTION_ITEM_CREATED",
            Self::ActionItemUpdated { .. } => "ACTION_ITEM_UPDATED",
            Self::ActionItemDeleted { .. } => "ACTION_ITEM_DELETED",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::BoardCreated { .. } | Self::PhaseChanged { .. } => Category::Phase,
            Self::ParticipantJoined { .. }
            | Self::ParticipantOnline { .. }
            | Self::ParticipantOffline { .. } => Category::Participants,
            Self::CardCreated { .. }
            | Self::CardUpdated { .. }
            | Self::CardMoved { .. }
            | Self::CardDeleted { .. }
            | Self::CardDiscussionChanged { .. } => Category::Cards,
            Self::VoteAdded { .. } | Self::VoteRemoved { .. } => Category::Votes,
            Self::MemoCreated { .. } | Self::MemoUpdated { .. } | Self::MemoDeleted { .. } => {
                Category::Memos
            }
            Self::TimerStarted { .. }
            | Self::TimerPaused { .. }
            | Self::TimerResumed { .. }
            | Self::TimerReset {} => Category::Timer,
            Self::ActionItemCreated { .. }
            | Self::ActionItemUpdated { .. }
            | Self::ActionItemDeleted { .. } => Category::ActionItems,
        }
    }

    /// Strips who wrote or voted on what, for anonymous boards
    pub fn without_identities(self) -> Self {
        match self {
            Self::CardCreated {
                card_id,
                column_id,
                content,
                sort_order,
                created_at,
                ..
            } => Self::CardCreated {
                card_id,
                column_id,
                content,
                author_id: None,
                author_nickname: None,
                sort_order,
                created_at,
            },
            Self::VoteAdded {
                card_id,
                vote_id,
                vote_count,
                ..
            } => Self::VoteAdded {
                card_id,
                vote_id,
                participant_id: None,
                vote_count,
            },
            Self::VoteRemoved {
                card_id,
                vote_id,
                vote_count,
                ..
            } => Self::VoteRemoved {
                card_id,
                vote_id,
                participant_id: None,
                vote_count,
            },
            Self::MemoCreated {
                card_id,
                memo_id,
                content,
                ..
            } => Self::MemoCreated {
                card_id,
                memo_id,
                content,
                author_id: None,
            },
            other => other,
        }
    }
}

/// A recorded event addressed to one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub board_slug: Slug,
    pub occurred_at: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    /// `/topic/board/{slug}/{category}`
    pub fn topic(&self) -> String {
        format!(
            "/topic/board/{}/{}",
            self.board_slug,
            self.event.category()
        )
    }
}

/// Caller-owned buffer of events produced during one operation
#[derive(Debug)]
pub struct Events {
    board_slug: Slug,
    hide_identities: bool,
    pending: Vec<EventEnvelope>,
}

impl Events {
    pub fn new(board_slug: Slug) -> Self {
        Self {
            board_slug,
            hide_identities: false,
            pending: Vec::new(),
        }
    }

    /// Buffer that records every event [without identities](DomainEvent::without_identities)
    pub fn anonymous(board_slug: Slug) -> Self {
        Self {
            hide_identities: true,
            ..Self::new(board_slug)
        }
    }

    pub fn board_slug(&self) -> &Slug {
        &self.board_slug
    }

    pub fn record(&mut self, event: DomainEvent) {
        let event = if self.hide_identities {
            event.without_identities()
        } else {
            event
        };
        self.pending.push(EventEnvelope {
            board_slug: self.board_slug.clone(),
            occurred_at: Utc::now(),
            event,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainEvent> {
        self.pending.iter().map(|envelope| &envelope.event)
    }

    /// Empties the buffer, preserving append order
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slug() -> Slug {
        Slug::parse("abcd1234").unwrap()
    }

    #[test]
    fn test_body_shape() {
        let participant_id = ParticipantId::new();
        let event = DomainEvent::ParticipantOnline { participant_id };
        let body = serde_json::to_value(&event).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "ONLINE",
                "payload": { "participant_id": participant_id.to_string() }
            })
        );
    }

    #[test]
    fn test_empty_payload_is_object() {
        let body = serde_json::to_value(DomainEvent::TimerReset {}).unwrap();
        assert_eq!(body, json!({ "type": "TIMER_RESET", "payload": {} }));
    }

    #[test]
    fn test_tag_matches_serialized_type() {
        let events = vec![
            DomainEvent::PhaseChanged {
                previous: Phase::Writing,
                phase: Phase::Voting,
                changed_by: ParticipantId::new(),
            },
            DomainEvent::CardDeleted {
                card_id: CardId::new(),
                column_id: ColumnId::new(),
            },
            DomainEvent::TimerPaused {
                remaining_seconds: 30,
            },
            DomainEvent::ActionItemDeleted {
                action_item_id: ActionItemId::new(),
            },
        ];
        for event in events {
            let body = serde_json::to_value(&event).unwrap();
            assert_eq!(body["type"], event.tag());
        }
    }

    #[test]
    fn test_topic() {
        let mut events = Events::new(slug());
        events.record(DomainEvent::VoteAdded {
            card_id: CardId::new(),
            vote_id: VoteId::new(),
            participant_id: Some(ParticipantId::new()),
            vote_count: 1,
        });
        let drained = events.drain();
        assert_eq!(drained[0].topic(), "/topic/board/abcd1234/votes");
    }

    #[test]
    fn test_anonymous_buffer_strips_identities() {
        let mut events = Events::anonymous(slug());
        let voter = ParticipantId::new();
        let card_id = CardId::new();
        events.record(DomainEvent::VoteAdded {
            card_id,
            vote_id: VoteId::new(),
            participant_id: Some(voter),
            vote_count: 1,
        });
        events.record(DomainEvent::MemoCreated {
            card_id,
            memo_id: MemoId::new(),
            content: "Ask ops".to_string(),
            author_id: Some(voter),
        });
        events.record(DomainEvent::ParticipantOnline {
            participant_id: voter,
        });

        let drained = events.drain();
        assert!(matches!(
            drained[0].event,
            DomainEvent::VoteAdded {
                participant_id: None,
                vote_count: 1,
                ..
            }
        ));
        match &drained[1].event {
            DomainEvent::MemoCreated {
                author_id, content, ..
            } => {
                assert_eq!(*author_id, None);
                assert_eq!(content, "Ask ops");
            }
            other => panic!("unexpected event {:?}", other),
        }
        // presence is not authorship
        assert_eq!(
            drained[2].event,
            DomainEvent::ParticipantOnline {
                participant_id: voter
            }
        );
    }

    #[test]
    fn test_drain_keeps_order_and_empties() {
        let mut events = Events::new(slug());
        let first = ParticipantId::new();
        let second = ParticipantId::new();
        events.record(DomainEvent::ParticipantOnline {
            participant_id: first,
        });
        events.record(DomainEvent::ParticipantOffline {
            participant_id: second,
        });
        assert_eq!(events.len(), 2);

        let drained = events.drain();
        assert!(events.is_empty());
        assert_eq!(
            drained[0].event,
            DomainEvent::ParticipantOnline {
                participant_id: first
            }
        );
        assert_eq!(drained[1].event.tag(), "OFFLINE");
    }
}
