use crate::{
    domain::{
        ids::{BoardId, CardId, ParticipantId},
        Board, Card, Slug,
    },
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Persistence for board aggregates, participants included
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Inserts or overwrites a board; last writer wins
    async fn save_board(&self, board: &Board) -> Result<()>;

    async fn load_board(&self, id: &BoardId) -> Result<Board>;

    async fn load_board_by_slug(&self, slug: &Slug) -> Result<Board>;

    async fn slug_exists(&self, slug: &Slug) -> Result<bool>;
}

/// Persistence for card aggregates, votes and memos included
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn save_card(&self, card: &Card) -> Result<()>;

    async fn load_card(&self, board_id: &BoardId, id: &CardId) -> Result<Card>;

    async fn delete_card(&self, board_id: &BoardId, id: &CardId) -> Result<()>;

    async fn list_cards(&self, board_id: &BoardId) -> Result<Vec<Card>>;

    /// Votes cast by `participant_id` across every card of the board
    async fn count_votes_by_participant(
        &self,
        board_id: &BoardId,
        participant_id: &ParticipantId,
    ) -> Result<u32> {
        let cards = self.list_cards(board_id).await?;
        let total: usize = cards.iter().map(|c| c.votes_from(*participant_id)).sum();
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }
}

/// Everything the engine needs from a storage backend
pub trait Storage: BoardRepository + CardRepository {}

impl<T: BoardRepository + CardRepository> Storage for T {}
