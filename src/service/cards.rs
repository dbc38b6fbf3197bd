use super::{
    views::{CardView, CreateCardRequest, MoveCardRequest, VoteSummary},
    RetroService,
};
use crate::{
    domain::{
        authorization, validation::required_text, Board, Card, CardId, Events, MemoId,
        ParticipantId, Slug,
    },
    error::{Result, RetroError},
};
use tracing::{debug, info};

impl RetroService {
    async fn load_card(&self, board: &Board, card_id: CardId) -> Result<Card> {
        self.storage.load_card(&board.id(), &card_id).await
    }

    async fn commit_card(&self, card: &Card, events: Events) -> Result<()> {
        self.storage.save_card(card).await?;
        self.publish(events);
        Ok(())
    }

    /// Card first, then the board holding its position
    async fn commit_card_and_board(&self, card: &Card, board: &Board, events: Events) -> Result<()> {
        self.storage.save_card(card).await?;
        self.storage.save_board(board).await?;
        self.publish(events);
        Ok(())
    }

    fn ensure_card_changes(board: &Board) -> Result<()> {
        if !board.phase().accepts_card_changes() {
            return Err(RetroError::bad_request("The board is closed"));
        }
        Ok(())
    }

    /// Appends a new card to the end of a column
    pub async fn create_card(
        &self,
        slug: &Slug,
        author_id: ParticipantId,
        request: CreateCardRequest,
    ) -> Result<CardView> {
        let content = required_text("content", &request.content, self.limits().card_content_max_len)?;
        let mut board = self.load_board(slug).await?;
        let author = board.find_participant_by_id(author_id)?;
        let column = board.find_column_by_id(request.column_id)?;
        let position = column.card_ids.len();
        let sort_order = u32::try_from(position).unwrap_or(u32::MAX);

        let mut events = board.events();
        let card = Card::create(&board, request.column_id, content, author, sort_order, &mut events)?;
        board.attach_card(card.column_id, card.id, position)?;
        self.commit_card_and_board(&card, &board, events).await?;

        info!(board = %slug, card = %card.id, column = %card.column_id, "card created");
        Ok(CardView::new(&card, &board))
    }

    /// Replaces a card's content; author only
    pub async fn update_card(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
        content: &str,
    ) -> Result<CardView> {
        let content = required_text("content", content, self.limits().card_content_max_len)?;
        let board = self.load_board(slug).await?;
        Self::ensure_card_changes(&board)?;
        board.find_participant_by_id(executor_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        card.update_content(content, executor_id, &mut events)?;
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, "card updated");
        Ok(CardView::new(&card, &board))
    }

    /// Deletes a card with its votes and memos; author or facilitator
    pub async fn delete_card(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
    ) -> Result<()> {
        let mut board = self.load_board(slug).await?;
        Self::ensure_card_changes(&board)?;
        board.find_participant_by_id(executor_id)?;
        let card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        card.delete(executor_id, board.is_facilitator(executor_id), &mut events)?;
        board.detach_card(card_id);
        // board first: a failed save leaves the card listed and intact
        self.storage.save_board(&board).await?;
        self.storage.delete_card(&board.id(), &card_id).await?;
        self.publish(events);

        info!(board = %slug, card = %card_id, "card deleted");
        Ok(())
    }

    /// Moves or reorders a card, subject to the phase's move rules
    pub async fn move_card(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
        request: MoveCardRequest,
    ) -> Result<CardView> {
        let mut board = self.load_board(slug).await?;
        board.find_participant_by_id(executor_id)?;
        board.find_column_by_id(request.target_column_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        authorization::validate_card_move(
            board.phase(),
            card.is_author(executor_id),
            board.is_facilitator(executor_id),
            card.is_cross_column_move(request.target_column_id),
        )?;

        let index = board.relocate_card(
            card_id,
            request.target_column_id,
            usize::try_from(request.sort_order).unwrap_or(usize::MAX),
        )?;
        let sort_order = u32::try_from(index).unwrap_or(u32::MAX);
        let mut events = board.events();
        card.move_to(request.target_column_id, sort_order, &mut events);
        self.commit_card_and_board(&card, &board, events).await?;

        debug!(
            board = %slug,
            card = %card_id,
            column = %request.target_column_id,
            sort_order,
            "card moved"
        );
        Ok(CardView::new(&card, &board))
    }

    /// Casts one vote, within the participant's board-wide quota
    pub async fn add_vote(
        &self,
        slug: &Slug,
        card_id: CardId,
        participant_id: ParticipantId,
    ) -> Result<VoteSummary> {
        let board = self.load_board(slug).await?;
        if !board.phase().can_vote() {
            return Err(RetroError::bad_request(format!(
                "Votes cannot be cast during {}",
                board.phase()
            )));
        }
        board.find_participant_by_id(participant_id)?;
        let mut card = self.load_card(&board, card_id).await?;
        // a repeat vote is a conflict even once the quota is spent
        if card.votes_from(participant_id) > 0 {
            return Err(RetroError::conflict(format!(
                "Participant {} already voted on card {}",
                participant_id, card_id
            )));
        }

        let limit = board.vote_limit();
        let used = self
            .storage
            .count_votes_by_participant(&board.id(), &participant_id)
            .await?;
        if limit.is_exceeded(used) {
            return Err(RetroError::bad_request(format!(
                "Vote limit of {} reached",
                limit.max()
            )));
        }

        let mut events = board.events();
        card.add_vote(participant_id, &mut events)?;
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, participant = %participant_id, "vote added");
        Ok(VoteSummary {
            card_id,
            vote_count: card.vote_count(),
            remaining_votes: limit.remaining(used + 1),
            max_votes: limit.max(),
        })
    }

    pub async fn remove_vote(
        &self,
        slug: &Slug,
        card_id: CardId,
        participant_id: ParticipantId,
    ) -> Result<VoteSummary> {
        let board = self.load_board(slug).await?;
        if !board.phase().can_vote() {
            return Err(RetroError::bad_request(format!(
                "Votes cannot be withdrawn during {}",
                board.phase()
            )));
        }
        board.find_participant_by_id(participant_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        card.remove_vote(participant_id, &mut events)?;
        self.commit_card(&card, events).await?;

        let limit = board.vote_limit();
        let used = self
            .storage
            .count_votes_by_participant(&board.id(), &participant_id)
            .await?;
        debug!(board = %slug, card = %card_id, participant = %participant_id, "vote removed");
        Ok(VoteSummary {
            card_id,
            vote_count: card.vote_count(),
            remaining_votes: limit.remaining(used),
            max_votes: limit.max(),
        })
    }

    /// Votes `participant_id` may still cast on this board
    pub async fn remaining_votes(&self, slug: &Slug, participant_id: ParticipantId) -> Result<u32> {
        let board = self.load_board(slug).await?;
        board.find_participant_by_id(participant_id)?;
        let used = self
            .storage
            .count_votes_by_participant(&board.id(), &participant_id)
            .await?;
        Ok(board.vote_limit().remaining(used))
    }

    pub async fn mark_discussed(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
    ) -> Result<CardView> {
        self.set_discussed(slug, card_id, executor_id, true).await
    }

    pub async fn unmark_discussed(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
    ) -> Result<CardView> {
        self.set_discussed(slug, card_id, executor_id, false).await
    }

    async fn set_discussed(
        &self,
        slug: &Slug,
        card_id: CardId,
        executor_id: ParticipantId,
        is_discussed: bool,
    ) -> Result<CardView> {
        let board = self.load_board(slug).await?;
        board.find_participant_by_id(executor_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        if is_discussed {
            card.mark_as_discussed(board.phase(), &mut events)?;
        } else {
            card.unmark_as_discussed(board.phase(), &mut events)?;
        }
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, is_discussed, "discussion flag changed");
        Ok(CardView::new(&card, &board))
    }

    pub async fn add_memo(
        &self,
        slug: &Slug,
        card_id: CardId,
        author_id: ParticipantId,
        content: &str,
    ) -> Result<MemoId> {
        let content = required_text("content", content, self.limits().memo_max_len)?;
        let board = self.load_board(slug).await?;
        board.find_participant_by_id(author_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        let memo_id = card.add_memo(board.phase(), author_id, content, &mut events)?;
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, memo = %memo_id, "memo added");
        Ok(memo_id)
    }

    pub async fn update_memo(
        &self,
        slug: &Slug,
        card_id: CardId,
        memo_id: MemoId,
        executor_id: ParticipantId,
        content: &str,
    ) -> Result<()> {
        let content = required_text("content", content, self.limits().memo_max_len)?;
        let board = self.load_board(slug).await?;
        board.find_participant_by_id(executor_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        card.update_memo(board.phase(), memo_id, executor_id, content, &mut events)?;
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, memo = %memo_id, "memo updated");
        Ok(())
    }

    /// Memo author or facilitator
    pub async fn delete_memo(
        &self,
        slug: &Slug,
        card_id: CardId,
        memo_id: MemoId,
        executor_id: ParticipantId,
    ) -> Result<()> {
        let board = self.load_board(slug).await?;
        Self::ensure_card_changes(&board)?;
        board.find_participant_by_id(executor_id)?;
        let mut card = self.load_card(&board, card_id).await?;

        let mut events = board.events();
        card.remove_memo(memo_id, executor_id, board.is_facilitator(executor_id), &mut events)?;
        self.commit_card(&card, events).await?;

        debug!(board = %slug, card = %card_id, memo = %memo_id, "memo deleted");
        Ok(())
    }
}
