use crate::{
    config::Limits,
    domain::{
        action_item::{ActionItem, ActionItemChange},
        authorization,
        event::{DomainEvent, Events},
        framework::Framework,
        ids::{ActionItemId, BoardId, CardId, ColumnId, ParticipantId},
        phase::Phase,
        slug::Slug,
        timer::Timer,
        validation::{optional_text, required_text},
        vote_limit::VoteLimit,
    },
    error::{Result, RetroError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board column; owns the ordered ids of the cards it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub sort_order: u32,
    pub color: String,
    pub card_ids: Vec<CardId>,
}

/// Someone taking part in a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub nickname: String,
    pub is_facilitator: bool,
    pub is_online: bool,
    /// Transport correlation only, never identity
    pub session_id: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Input for [`Board::create`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDraft {
    pub title: String,
    pub framework: Framework,
    pub max_votes_per_person: i64,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Board aggregate: phase, roster, columns, timer and action items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    slug: Slug,
    pub title: String,
    framework: Framework,
    phase: Phase,
    max_votes_per_person: VoteLimit,
    is_anonymous: bool,
    pub team_name: Option<String>,
    columns: Vec<Column>,
    participants: Vec<Participant>,
    #[serde(default)]
    action_items: Vec<ActionItem>,
    #[serde(default)]
    timer: Timer,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a board in WRITING with the framework's columns
    pub fn create(slug: Slug, draft: BoardDraft, limits: &Limits) -> Result<(Self, Events)> {
        let max_votes_per_person = VoteLimit::new(draft.max_votes_per_person)?;
        let title = required_text("title", &draft.title, limits.title_max_len)?;
        let team_name = optional_text(
            "teamName",
            draft.team_name.as_deref(),
            limits.team_name_max_len,
        )?;

        let columns = draft
            .framework
            .columns()
            .iter()
            .zip(0u32..)
            .map(|(template, sort_order)| Column {
                id: ColumnId::new(),
                name: template.name.to_string(),
                sort_order,
                color: template.color.to_string(),
                card_ids: Vec::new(),
            })
            .collect();

        let now = Utc::now();
        let board = Self {
            id: BoardId::new(),
            slug,
            title,
            framework: draft.framework,
            phase: Phase::Writing,
            max_votes_per_person,
            is_anonymous: draft.is_anonymous,
            team_name,
            columns,
            participants: Vec::new(),
            action_items: Vec::new(),
            timer: Timer::Idle,
            created_at: now,
            updated_at: now,
        };

        let mut events = board.events();
        events.record(DomainEvent::BoardCreated {
            board_id: board.id,
            title: board.title.clone(),
            framework: board.framework,
            phase: board.phase,
        });
        Ok((board, events))
    }

    /// Event buffer for one operation on this board; identities are
    /// stripped when the board is anonymous
    pub fn events(&self) -> Events {
        if self.is_anonymous {
            Events::anonymous(self.slug.clone())
        } else {
            Events::new(self.slug.clone())
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn vote_limit(&self) -> VoteLimit {
        self.max_votes_per_person
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn action_items(&self) -> &[ActionItem] {
        &self.action_items
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Appends a participant; only the very first one becomes facilitator
    pub fn add_participant(
        &mut self,
        nickname: String,
        session_id: Option<String>,
        events: &mut Events,
    ) -> ParticipantId {
        let participant = Participant {
            id: ParticipantId::new(),
            nickname,
            is_facilitator: self.participants.is_empty(),
            is_online: session_id.is_some(),
            session_id,
            joined_at: Utc::now(),
        };
        let id = participant.id;
        events.record(DomainEvent::ParticipantJoined {
            participant_id: id,
            nickname: participant.nickname.clone(),
            is_facilitator: participant.is_facilitator,
        });
        self.participants.push(participant);
        self.touch();
        id
    }

    pub fn find_participant_by_id(&self, id: ParticipantId) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| RetroError::not_found("Participant", id))
    }

    fn find_participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RetroError::not_found("Participant", id))
    }

    pub fn facilitator(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_facilitator)
    }

    pub fn is_facilitator(&self, id: ParticipantId) -> bool {
        self.participants
            .iter()
            .any(|p| p.id == id && p.is_facilitator)
    }

    pub fn find_column_by_id(&self, id: ColumnId) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| RetroError::not_found("Column", id))
    }

    fn find_column_mut(&mut self, id: ColumnId) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RetroError::not_found("Column", id))
    }

    /// Column currently holding `card_id`
    pub fn column_of(&self, card_id: CardId) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|c| c.card_ids.contains(&card_id))
            .map(|c| c.id)
    }

    /// Advances the phase; only the facilitator may do this
    pub fn transition_phase(
        &mut self,
        target: Phase,
        executor_id: ParticipantId,
        events: &mut Events,
    ) -> Result<Phase> {
        let executor = self.find_participant_by_id(executor_id)?;
        authorization::validate_facilitator(executor.is_facilitator, "change the phase")?;

        let previous = self.phase;
        self.phase = previous.transition_to(target)?;
        self.touch();
        events.record(DomainEvent::PhaseChanged {
            previous,
            phase: self.phase,
            changed_by: executor_id,
        });
        Ok(self.phase)
    }

    pub fn mark_online(
        &mut self,
        participant_id: ParticipantId,
        session_id: String,
        events: &mut Events,
    ) -> Result<()> {
        let participant = self.find_participant_mut(participant_id)?;
        participant.is_online = true;
        participant.session_id = Some(session_id);
        events.record(DomainEvent::ParticipantOnline { participant_id });
        Ok(())
    }

    /// Marks whoever holds `session_id` as offline
    pub fn mark_offline(&mut self, session_id: &str, events: &mut Events) -> Result<ParticipantId> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.session_id.as_deref() == Some(session_id))
            .ok_or_else(|| RetroError::not_found("Session", session_id))?;
        participant.is_online = false;
        participant.session_id = None;
        let participant_id = participant.id;
        events.record(DomainEvent::ParticipantOffline { participant_id });
        Ok(participant_id)
    }

    /// Places a card in a column at `position`, clamped to the end;
    /// returns the index it landed at
    pub fn attach_card(
        &mut self,
        column_id: ColumnId,
        card_id: CardId,
        position: usize,
    ) -> Result<usize> {
        let column = self.find_column_mut(column_id)?;
        let index = position.min(column.card_ids.len());
        column.card_ids.insert(index, card_id);
        self.touch();
        Ok(index)
    }

    /// Removes a card from whichever column holds it
    pub fn detach_card(&mut self, card_id: CardId) -> Option<ColumnId> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.card_ids.contains(&card_id))?;
        column.card_ids.retain(|id| *id != card_id);
        let column_id = column.id;
        self.touch();
        Some(column_id)
    }

    pub fn relocate_card(&mut self, card_id: CardId, target: ColumnId, position: usize) -> Result<usize> {
        self.find_column_by_id(target)?;
        self.detach_card(card_id);
        self.attach_card(target, card_id, position)
    }

    pub fn start_timer(
        &mut self,
        executor_id: ParticipantId,
        duration_seconds: u32,
        max_seconds: u32,
        events: &mut Events,
    ) -> Result<()> {
        self.require_timer_control(executor_id, "start the timer")?;
        if duration_seconds > max_seconds {
            return Err(RetroError::bad_request(format!(
                "Timer duration must be at most {} seconds",
                max_seconds
            )));
        }
        let event = self.timer.start(duration_seconds, Utc::now())?;
        events.record(event);
        self.touch();
        Ok(())
    }

    pub fn pause_timer(&mut self, executor_id: ParticipantId, events: &mut Events) -> Result<()> {
        self.require_timer_control(executor_id, "pause the timer")?;
        let event = self.timer.pause(Utc::now())?;
        events.record(event);
        self.touch();
        Ok(())
    }

    pub fn resume_timer(&mut self, executor_id: ParticipantId, events: &mut Events) -> Result<()> {
        self.require_timer_control(executor_id, "resume the timer")?;
        let event = self.timer.resume(Utc::now())?;
        events.record(event);
        self.touch();
        Ok(())
    }

    pub fn reset_timer(&mut self, executor_id: ParticipantId, events: &mut Events) -> Result<()> {
        self.require_timer_control(executor_id, "reset the timer")?;
        let event = self.timer.reset()?;
        events.record(event);
        self.touch();
        Ok(())
    }

    fn require_timer_control(&self, executor_id: ParticipantId, action: &str) -> Result<()> {
        let executor = self.find_participant_by_id(executor_id)?;
        authorization::validate_facilitator(executor.is_facilitator, action)?;
        if self.phase.is_closed() {
            return Err(RetroError::bad_request("The board is closed"));
        }
        Ok(())
    }

    pub fn add_action_item(
        &mut self,
        creator_id: ParticipantId,
        content: String,
        assignee_id: Option<ParticipantId>,
        card_id: Option<CardId>,
        events: &mut Events,
    ) -> Result<ActionItemId> {
        if !self.phase.can_create_action_item() {
            return Err(RetroError::bad_request(format!(
                "Action items cannot be created during {}",
                self.phase
            )));
        }
        self.find_participant_by_id(creator_id)?;
        if let Some(assignee) = assignee_id {
            self.find_participant_by_id(assignee)?;
        }
        if let Some(card) = card_id {
            self.column_of(card)
                .ok_or_else(|| RetroError::not_found("Card", card))?;
        }

        let item = ActionItem::new(content, creator_id, assignee_id, card_id);
        let id = item.id;
        events.record(DomainEvent::ActionItemCreated {
            action_item_id: id,
            content: item.content.clone(),
            assignee_id: item.assignee_id,
            card_id: item.card_id,
        });
        self.action_items.push(item);
        self.touch();
        Ok(id)
    }

    pub fn update_action_item(
        &mut self,
        executor_id: ParticipantId,
        action_item_id: ActionItemId,
        change: ActionItemChange,
        events: &mut Events,
    ) -> Result<&ActionItem> {
        self.require_open_for_action_items()?;
        self.find_participant_by_id(executor_id)?;
        if let Some(Some(assignee)) = change.assignee_id {
            self.find_participant_by_id(assignee)?;
        }
        if change.is_empty() {
            return Err(RetroError::bad_request("Nothing to update"));
        }

        let index = self.action_item_index(action_item_id)?;
        let item = &mut self.action_items[index];
        if let Some(content) = change.content {
            item.content = content;
        }
        if let Some(assignee) = change.assignee_id {
            item.assignee_id = assignee;
        }
        if let Some(done) = change.is_completed {
            item.is_completed = done;
        }
        item.updated_at = Utc::now();
        events.record(DomainEvent::ActionItemUpdated {
            action_item_id,
            content: item.content.clone(),
            assignee_id: item.assignee_id,
            is_completed: item.is_completed,
        });
        self.touch();
        Ok(&self.action_items[index])
    }

    pub fn remove_action_item(
        &mut self,
        executor_id: ParticipantId,
        action_item_id: ActionItemId,
        events: &mut Events,
    ) -> Result<()> {
        self.require_open_for_action_items()?;
        let is_facilitator = self.find_participant_by_id(executor_id)?.is_facilitator;
        let index = self.action_item_index(action_item_id)?;
        let is_creator = self.action_items[index].created_by == executor_id;
        authorization::validate_card_deletion(is_creator, is_facilitator)?;

        self.action_items.remove(index);
        events.record(DomainEvent::ActionItemDeleted { action_item_id });
        self.touch();
        Ok(())
    }

    fn require_open_for_action_items(&self) -> Result<()> {
        if self.phase.is_closed() {
            return Err(RetroError::bad_request("The board is closed"));
        }
        Ok(())
    }

    fn action_item_index(&self, id: ActionItemId) -> Result<usize> {
        self.action_items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| RetroError::not_found("Action item", id))
    }
}
