//! Request and response shapes of the use-case layer.

use crate::domain::{
    ActionItem, Board, Card, CardId, ColumnId, Framework, Memo, MemoId, Participant,
    ParticipantId, Phase, Slug, Timer,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinBoardRequest {
    pub nickname: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub column_id: ColumnId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCardRequest {
    pub target_column_id: ColumnId,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateActionItemRequest {
    pub content: String,
    #[serde(default)]
    pub assignee_id: Option<ParticipantId>,
    #[serde(default)]
    pub card_id: Option<CardId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub nickname: String,
    pub is_facilitator: bool,
    pub is_online: bool,
}

impl From<&Participant> for ParticipantView {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id,
            nickname: participant.nickname.clone(),
            is_facilitator: participant.is_facilitator,
            is_online: participant.is_online,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoView {
    pub id: MemoId,
    pub content: String,
    /// Hidden on anonymous boards
    pub author_id: Option<ParticipantId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoView {
    pub fn new(memo: &Memo, board: &Board) -> Self {
        Self {
            id: memo.id,
            content: memo.content.clone(),
            author_id: (!board.is_anonymous()).then_some(memo.author_id),
            created_at: memo.created_at,
            updated_at: memo.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub column_id: ColumnId,
    pub content: String,
    /// Hidden on anonymous boards
    pub author_id: Option<ParticipantId>,
    pub author_nickname: Option<String>,
    pub vote_count: usize,
    pub sort_order: u32,
    pub is_discussed: bool,
    pub memos: Vec<MemoView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardView {
    pub fn new(card: &Card, board: &Board) -> Self {
        let (author_id, author_nickname) = if board.is_anonymous() {
            (None, None)
        } else {
            let nickname = card
                .author_id
                .and_then(|id| board.find_participant_by_id(id).ok())
                .map(|p| p.nickname.clone());
            (card.author_id, nickname)
        };
        Self {
            id: card.id,
            column_id: card.column_id,
            content: card.content.clone(),
            author_id,
            author_nickname,
            vote_count: card.vote_count(),
            sort_order: card.sort_order,
            is_discussed: card.is_discussed,
            memos: card.memos().iter().map(|m| MemoView::new(m, board)).collect(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub color: String,
    pub sort_order: u32,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub state: Timer,
    pub remaining_seconds: Option<u32>,
}

impl TimerView {
    pub fn new(timer: &Timer, now: DateTime<Utc>) -> Self {
        Self {
            state: timer.clone(),
            remaining_seconds: timer.remaining_seconds(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub card_id: CardId,
    pub vote_count: usize,
    pub remaining_votes: u32,
    pub max_votes: u32,
}

/// Everything a client needs to rebuild its view of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub slug: Slug,
    pub title: String,
    pub framework: Framework,
    pub phase: Phase,
    pub max_votes_per_person: u32,
    pub is_anonymous: bool,
    pub team_name: Option<String>,
    pub columns: Vec<ColumnView>,
    pub participants: Vec<ParticipantView>,
    /// Votes each participant may still cast
    pub remaining_votes: HashMap<ParticipantId, u32>,
    pub action_items: Vec<ActionItem>,
    pub timer: TimerView,
    pub created_at: DateTime<Utc>,
}

impl BoardSnapshot {
    /// Builds the snapshot; cards are laid out in their columns' order
    pub fn new(board: &Board, cards: &[Card], now: DateTime<Utc>) -> Self {
        let by_id: HashMap<CardId, &Card> = cards.iter().map(|c| (c.id, c)).collect();
        let columns = board
            .columns()
            .iter()
            .map(|column| ColumnView {
                id: column.id,
                name: column.name.clone(),
                color: column.color.clone(),
                sort_order: column.sort_order,
                cards: column
                    .card_ids
                    .iter()
                    .filter_map(|id| by_id.get(id))
                    .map(|card| CardView::new(card, board))
                    .collect(),
            })
            .collect();

        let limit = board.vote_limit();
        let remaining_votes = board
            .participants()
            .iter()
            .map(|p| {
                let used: usize = cards.iter().map(|c| c.votes_from(p.id)).sum();
                let used = u32::try_from(used).unwrap_or(u32::MAX);
                (p.id, limit.remaining(used))
            })
            .collect();

        Self {
            slug: board.slug().clone(),
            title: board.title.clone(),
            framework: board.framework(),
            phase: board.phase(),
            max_votes_per_person: limit.max(),
            is_anonymous: board.is_anonymous(),
            team_name: board.team_name.clone(),
            columns,
            participants: board.participants().iter().map(ParticipantView::from).collect(),
            remaining_votes,
            action_items: board.action_items().to_vec(),
            timer: TimerView::new(board.timer(), now),
            created_at: board.created_at(),
        }
    }
}
