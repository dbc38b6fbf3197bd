use crate::{
    domain::{
        ids::{BoardId, CardId},
        Board, Card, Slug,
    },
    error::{Result, RetroError},
    storage::{BoardRepository, CardRepository},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local storage; also the backend used throughout the tests
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<BoardId, Board>>,
    cards: RwLock<HashMap<CardId, Card>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardRepository for MemoryStorage {
    async fn save_board(&self, board: &Board) -> Result<()> {
        self.boards.write().insert(board.id(), board.clone());
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        self.boards
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RetroError::not_found("Board", id))
    }

    async fn load_board_by_slug(&self, slug: &Slug) -> Result<Board> {
        self.boards
            .read()
            .values()
            .find(|b| b.slug() == slug)
            .cloned()
            .ok_or_else(|| RetroError::not_found("Board", slug))
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool> {
        Ok(self.boards.read().values().any(|b| b.slug() == slug))
    }
}

#[async_trait]
impl CardRepository for MemoryStorage {
    async fn save_card(&self, card: &Card) -> Result<()> {
        self.cards.write().insert(card.id, card.clone());
        Ok(())
    }

    async fn load_card(&self, board_id: &BoardId, id: &CardId) -> Result<Card> {
        self.cards
            .read()
            .get(id)
            .filter(|c| c.board_id == *board_id)
            .cloned()
            .ok_or_else(|| RetroError::not_found("Card", id))
    }

    async fn delete_card(&self, board_id: &BoardId, id: &CardId) -> Result<()> {
        let mut cards = self.cards.write();
        if !cards.get(id).is_some_and(|c| c.board_id == *board_id) {
            return Err(RetroError::not_found("Card", id));
        }
        cards.remove(id);
        Ok(())
    }

    async fn list_cards(&self, board_id: &BoardId) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .cards
            .read()
            .values()
            .filter(|c| c.board_id == *board_id)
            .cloned()
            .collect();
        cards.sort_by_key(|c| c.created_at);
        Ok(cards)
    }
}
