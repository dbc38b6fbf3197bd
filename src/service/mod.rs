//! Use cases: the only entry points a transport layer calls.
//!
//! Every mutating operation follows the same path: load the aggregate,
//! validate and mutate it (collecting events in an [`Events`] buffer),
//! persist it, then publish the drained events. Nothing is published when
//! any step before the save fails.
//!
//! There is no version check on saves. Two concurrent writers to the same
//! board or card resolve as last-write-wins, and the vote quota is checked
//! against whatever is committed when the call starts.

mod cards;
mod facilitation;
pub mod views;


use crate::{
    config::{Limits, RetroConfig},
    domain::{
        validation::required_text, Board, BoardDraft, Events, ParticipantId, Phase, Slug,
    },
    error::{Result, RetroError},
    realtime::EventPublisher,
    storage::Storage,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

pub use views::{
    BoardSnapshot, CardView, ColumnView, CreateActionItemRequest, CreateCardRequest,
    JoinBoardRequest, MemoView, MoveCardRequest, ParticipantView, TimerView, VoteSummary,
};

pub struct RetroService {
    storage: Arc<dyn Storage>,
    publisher: Arc<dyn EventPublisher>,
    config: RetroConfig,
}

impl RetroService {
    pub fn new(
        storage: Arc<dyn Storage>,
        publisher: Arc<dyn EventPublisher>,
        config: RetroConfig,
    ) -> Self {
        Self {
            storage,
            publisher,
            config,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.config.limits
    }

    async fn load_board(&self, slug: &Slug) -> Result<Board> {
        self.storage.load_board_by_slug(slug).await
    }

    /// Hands committed events to the publisher, in append order
    fn publish(&self, mut events: Events) {
        let drained = events.drain();
        if drained.is_empty() {
            return;
        }
        debug!(board = %events.board_slug(), count = drained.len(), "publishing events");
        self.publisher.publish_all(drained);
    }

    async fn commit_board(&self, board: &Board, events: Events) -> Result<()> {
        self.storage.save_board(board).await?;
        self.publish(events);
        Ok(())
    }

    async fn unique_slug(&self) -> Result<Slug> {
        for attempt in 1..=self.config.slug_attempts {
            let slug = Slug::generate(&mut rand::rng());
            if !self.storage.slug_exists(&slug).await? {
                return Ok(slug);
            }
            debug!(attempt, slug = %slug, "slug already taken");
        }
        Err(RetroError::StorageError(format!(
            "Could not allocate a unique slug after {} attempts",
            self.config.slug_attempts
        )))
    }

    /// Creates a board with a fresh slug and the framework's columns
    pub async fn create_board(&self, draft: BoardDraft) -> Result<BoardSnapshot> {
        let slug = self.unique_slug().await?;
        let (board, events) = Board::create(slug, draft, self.limits())?;
        self.commit_board(&board, events).await?;

        info!(
            board = %board.slug(),
            framework = %board.framework(),
            max_votes = board.vote_limit().max(),
            "board created"
        );
        Ok(BoardSnapshot::new(&board, &[], Utc::now()))
    }

    /// Full read model used by clients to (re)synchronise
    pub async fn board_snapshot(&self, slug: &Slug) -> Result<BoardSnapshot> {
        let board = self.load_board(slug).await?;
        let cards = self.storage.list_cards(&board.id()).await?;
        Ok(BoardSnapshot::new(&board, &cards, Utc::now()))
    }

    /// Adds a participant; the first one to join facilitates the board
    pub async fn join_board(
        &self,
        slug: &Slug,
        request: JoinBoardRequest,
    ) -> Result<ParticipantView> {
        let nickname = required_text("nickname", &request.nickname, self.limits().nickname_max_len)?;
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();

        let id = board.add_participant(nickname, request.session_id, &mut events);
        let view = ParticipantView::from(board.find_participant_by_id(id)?);
        self.commit_board(&board, events).await?;

        info!(
            board = %slug,
            participant = %id,
            facilitator = view.is_facilitator,
            "participant joined"
        );
        Ok(view)
    }

    pub async fn mark_online(
        &self,
        slug: &Slug,
        participant_id: ParticipantId,
        session_id: String,
    ) -> Result<()> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.mark_online(participant_id, session_id, &mut events)?;
        self.commit_board(&board, events).await?;
        debug!(board = %slug, participant = %participant_id, "participant online");
        Ok(())
    }

    pub async fn mark_offline(&self, slug: &Slug, session_id: &str) -> Result<ParticipantId> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        let participant_id = board.mark_offline(session_id, &mut events)?;
        self.commit_board(&board, events).await?;
        debug!(board = %slug, participant = %participant_id, "participant offline");
        Ok(participant_id)
    }

    /// Moves the board to `target`; facilitator only, forward by one step
    pub async fn transition_phase(
        &self,
        slug: &Slug,
        target: Phase,
        executor_id: ParticipantId,
    ) -> Result<Phase> {
        let mut board = self.load_board(slug).await?;
        let previous = board.phase();
        let mut events = board.events();

        let phase = board.transition_phase(target, executor_id, &mut events)?;
        self.commit_board(&board, events).await?;

        info!(board = %slug, from = %previous, to = %phase, "phase changed");
        Ok(phase)
    }
}
