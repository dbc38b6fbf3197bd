use super::{
    views::{CreateActionItemRequest, TimerView},
    RetroService,
};
use crate::{
    domain::{
        validation::{optional_text, required_text},
        ActionItem, ActionItemChange, ActionItemId, Board, Events, ParticipantId, Slug,
    },
    error::{Result, RetroError},
};
use chrono::Utc;
use tracing::{debug, info};

impl RetroService {
    async fn commit_timer(&self, board: &Board, events: Events) -> Result<TimerView> {
        self.commit_board(board, events).await?;
        Ok(TimerView::new(board.timer(), Utc::now()))
    }

    pub async fn start_timer(
        &self,
        slug: &Slug,
        executor_id: ParticipantId,
        duration_seconds: u32,
    ) -> Result<TimerView> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.start_timer(
            executor_id,
            duration_seconds,
            self.limits().timer_max_seconds,
            &mut events,
        )?;
        let view = self.commit_timer(&board, events).await?;
        info!(board = %slug, duration_seconds, "timer started");
        Ok(view)
    }

    pub async fn pause_timer(&self, slug: &Slug, executor_id: ParticipantId) -> Result<TimerView> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.pause_timer(executor_id, &mut events)?;
        let view = self.commit_timer(&board, events).await?;
        debug!(board = %slug, remaining = ?view.remaining_seconds, "timer paused");
        Ok(view)
    }

    pub async fn resume_timer(&self, slug: &Slug, executor_id: ParticipantId) -> Result<TimerView> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.resume_timer(executor_id, &mut events)?;
        let view = self.commit_timer(&board, events).await?;
        debug!(board = %slug, "timer resumed");
        Ok(view)
    }

    pub async fn reset_timer(&self, slug: &Slug, executor_id: ParticipantId) -> Result<TimerView> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.reset_timer(executor_id, &mut events)?;
        let view = self.commit_timer(&board, events).await?;
        debug!(board = %slug, "timer reset");
        Ok(view)
    }

    pub async fn create_action_item(
        &self,
        slug: &Slug,
        creator_id: ParticipantId,
        request: CreateActionItemRequest,
    ) -> Result<ActionItem> {
        let content = required_text("content", &request.content, self.limits().action_item_max_len)?;
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();

        let id = board.add_action_item(
            creator_id,
            content,
            request.assignee_id,
            request.card_id,
            &mut events,
        )?;
        let item = board
            .action_items()
            .iter()
            .find(|item| item.id == id)
            .cloned();
        self.commit_board(&board, events).await?;

        info!(board = %slug, action_item = %id, "action item created");
        item.ok_or_else(|| RetroError::not_found("ActionItem", id))
    }

    pub async fn update_action_item(
        &self,
        slug: &Slug,
        action_item_id: ActionItemId,
        executor_id: ParticipantId,
        mut change: ActionItemChange,
    ) -> Result<ActionItem> {
        change.content = optional_text(
            "content",
            change.content.as_deref(),
            self.limits().action_item_max_len,
        )?;
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();

        let item = board
            .update_action_item(executor_id, action_item_id, change, &mut events)?
            .clone();
        self.commit_board(&board, events).await?;

        debug!(
            board = %slug,
            action_item = %action_item_id,
            completed = item.is_completed,
            "action item updated"
        );
        Ok(item)
    }

    /// Creator or facilitator
    pub async fn delete_action_item(
        &self,
        slug: &Slug,
        action_item_id: ActionItemId,
        executor_id: ParticipantId,
    ) -> Result<()> {
        let mut board = self.load_board(slug).await?;
        let mut events = board.events();
        board.remove_action_item(executor_id, action_item_id, &mut events)?;
        self.commit_board(&board, events).await?;

        info!(board = %slug, action_item = %action_item_id, "action item deleted");
        Ok(())
    }
}
