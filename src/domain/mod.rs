pub mod action_item;
pub mod authorization;
pub mod board;
pub mod card;
pub mod event;
pub mod framework;
pub mod ids;
pub mod memo;
pub mod phase;
pub mod slug;
pub mod timer;
pub mod validation;
pub mod vote_limit;

pub use action_item::{ActionItem, ActionItemChange};
pub use board::{Board, BoardDraft, Column, Participant};
pub use card::{Card, Vote};
pub use event::{Category, DomainEvent, EventEnvelope, Events};
pub use framework::{ColumnTemplate, Framework};
pub use ids::{ActionItemId, BoardId, CardId, ColumnId, MemoId, ParticipantId, VoteId};
pub use memo::Memo;
pub use phase::Phase;
pub use slug::Slug;
pub use timer::Timer;
pub use vote_limit::VoteLimit;
