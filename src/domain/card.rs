use crate::{
    domain::{
        authorization,
        board::{Board, Participant},
        event::{DomainEvent, Events},
        ids::{BoardId, CardId, ColumnId, MemoId, ParticipantId, VoteId},
        memo::Memo,
        phase::Phase,
    },
    error::{Result, RetroError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant's vote on one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub card_id: CardId,
    pub participant_id: ParticipantId,
    pub created_at: DateTime<Utc>,
}

/// Card aggregate; refers to its board and column by id only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub content: String,
    pub author_id: Option<ParticipantId>,
    votes: Vec<Vote>,
    #[serde(default)]
    memos: Vec<Memo>,
    pub sort_order: u32,
    pub is_discussed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a card in `column_id`; the board must be in WRITING
    pub fn create(
        board: &Board,
        column_id: ColumnId,
        content: String,
        author: &Participant,
        sort_order: u32,
        events: &mut Events,
    ) -> Result<Self> {
        if !board.phase().can_create_card() {
            return Err(RetroError::bad_request(format!(
                "Cards cannot be created during {}",
                board.phase()
            )));
        }
        board.find_column_by_id(column_id)?;

        let now = Utc::now();
        let card = Self {
            id: CardId::new(),
            board_id: board.id(),
            column_id,
            content,
            author_id: Some(author.id),
            votes: Vec::new(),
            memos: Vec::new(),
            sort_order,
            is_discussed: false,
            created_at: now,
            updated_at: now,
        };

        events.record(DomainEvent::CardCreated {
            card_id: card.id,
            column_id,
            content: card.content.clone(),
            author_id: Some(author.id),
            author_nickname: Some(author.nickname.clone()),
            sort_order,
            created_at: now,
        });
        Ok(card)
    }

    pub fn is_author(&self, participant_id: ParticipantId) -> bool {
        self.author_id == Some(participant_id)
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn votes_from(&self, participant_id: ParticipantId) -> usize {
        self.votes
            .iter()
            .filter(|v| v.participant_id == participant_id)
            .count()
    }

    pub fn memos(&self) -> &[Memo] {
        &self.memos
    }

    /// Replaces the content; only the author may edit
    pub fn update_content(
        &mut self,
        new_content: String,
        executor_id: ParticipantId,
        events: &mut Events,
    ) -> Result<()> {
        if !self.is_author(executor_id) {
            return Err(RetroError::forbidden("Only the author can edit this card"));
        }
        self.content = new_content;
        self.updated_at = Utc::now();
        events.record(DomainEvent::CardUpdated {
            card_id: self.id,
            content: self.content.clone(),
            updated_at: self.updated_at,
        });
        Ok(())
    }

    /// Adds a vote; the board-wide quota is the caller's concern
    pub fn add_vote(&mut self, participant_id: ParticipantId, events: &mut Events) -> Result<VoteId> {
        if self.votes_from(participant_id) > 0 {
            return Err(RetroError::conflict(format!(
                "Participant {} already voted on card {}",
                participant_id, self.id
            )));
        }
        let vote = Vote {
            id: VoteId::new(),
            card_id: self.id,
            participant_id,
            created_at: Utc::now(),
        };
        let vote_id = vote.id;
        self.votes.push(vote);
        events.record(DomainEvent::VoteAdded {
            card_id: self.id,
            vote_id,
            participant_id: Some(participant_id),
            vote_count: self.votes.len(),
        });
        Ok(vote_id)
    }

    pub fn remove_vote(&mut self, participant_id: ParticipantId, events: &mut Events) -> Result<()> {
        let index = self
            .votes
            .iter()
            .position(|v| v.participant_id == participant_id)
            .ok_or_else(|| {
                RetroError::not_found("Vote", format!("{} on card {}", participant_id, self.id))
            })?;
        let vote = self.votes.remove(index);
        events.record(DomainEvent::VoteRemoved {
            card_id: self.id,
            vote_id: vote.id,
            participant_id: Some(participant_id),
            vote_count: self.votes.len(),
        });
        Ok(())
    }

    /// Moves the card; authorization must already have been checked
    pub fn move_to(&mut self, target_column_id: ColumnId, sort_order: u32, events: &mut Events) {
        let source_column_id = self.column_id;
        self.column_id = target_column_id;
        self.sort_order = sort_order;
        self.updated_at = Utc::now();
        events.record(DomainEvent::CardMoved {
            card_id: self.id,
            source_column_id,
            target_column_id,
            sort_order,
        });
    }

    pub fn is_cross_column_move(&self, target_column_id: ColumnId) -> bool {
        self.column_id != target_column_id
    }

    pub fn mark_as_discussed(&mut self, phase: Phase, events: &mut Events) -> Result<()> {
        self.set_discussed(true, phase, events)
    }

    pub fn unmark_as_discussed(&mut self, phase: Phase, events: &mut Events) -> Result<()> {
        self.set_discussed(false, phase, events)
    }

    fn set_discussed(&mut self, is_discussed: bool, phase: Phase, events: &mut Events) -> Result<()> {
        if !phase.can_mark_discussed() {
            return Err(RetroError::bad_request(format!(
                "Cards cannot be marked as discussed during {}",
                phase
            )));
        }
        self.is_discussed = is_discussed;
        self.updated_at = Utc::now();
        events.record(DomainEvent::CardDiscussionChanged {
            card_id: self.id,
            is_discussed,
        });
        Ok(())
    }

    /// Records the deletion; the caller removes the card from storage
    pub fn delete(
        &self,
        executor_id: ParticipantId,
        is_facilitator: bool,
        events: &mut Events,
    ) -> Result<()> {
        authorization::validate_card_deletion(self.is_author(executor_id), is_facilitator)?;
        events.record(DomainEvent::CardDeleted {
            card_id: self.id,
            column_id: self.column_id,
        });
        Ok(())
    }

    pub fn add_memo(
        &mut self,
        phase: Phase,
        author_id: ParticipantId,
        content: String,
        events: &mut Events,
    ) -> Result<MemoId> {
        if !phase.can_write_memo() {
            return Err(RetroError::bad_request(format!(
                "Memos cannot be written during {}",
                phase
            )));
        }
        let memo = Memo::new(content, author_id);
        let memo_id = memo.id;
        events.record(DomainEvent::MemoCreated {
            card_id: self.id,
            memo_id,
            content: memo.content.clone(),
            author_id: Some(author_id),
        });
        self.memos.push(memo);
        Ok(memo_id)
    }

    pub fn update_memo(
        &mut self,
        phase: Phase,
        memo_id: MemoId,
        executor_id: ParticipantId,
        content: String,
        events: &mut Events,
    ) -> Result<()> {
        if !phase.can_write_memo() {
            return Err(RetroError::bad_request(format!(
                "Memos cannot be edited during {}",
                phase
            )));
        }
        let card_id = self.id;
        let memo = self.find_memo_mut(memo_id)?;
        if memo.author_id != executor_id {
            return Err(RetroError::forbidden("Only the author can edit this memo"));
        }
        memo.set_content(content);
        events.record(DomainEvent::MemoUpdated {
            card_id,
            memo_id,
            content: memo.content.clone(),
        });
        Ok(())
    }

    pub fn remove_memo(
        &mut self,
        memo_id: MemoId,
        executor_id: ParticipantId,
        is_facilitator: bool,
        events: &mut Events,
    ) -> Result<()> {
        let index = self
            .memos
            .iter()
            .position(|m| m.id == memo_id)
            .ok_or_else(|| RetroError::not_found("Memo", memo_id))?;
        let is_author = self.memos[index].author_id == executor_id;
        authorization::validate_card_deletion(is_author, is_facilitator)?;
        self.memos.remove(index);
        events.record(DomainEvent::MemoDeleted {
            card_id: self.id,
            memo_id,
        });
        Ok(())
    }

    fn find_memo_mut(&mut self, memo_id: MemoId) -> Result<&mut Memo> {
        self.memos
            .iter_mut()
            .find(|m| m.id == memo_id)
            .ok_or_else(|| RetroError::not_found("Memo", memo_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Limits,
        domain::{board::BoardDraft, framework::Framework, slug::Slug},
        error::ErrorKind,
    };

    struct Fixture {
        board: Board,
        alice: ParticipantId,
        bob: ParticipantId,
        events: Events,
    }

    fn fixture(is_anonymous: bool) -> Fixture {
        let draft = BoardDraft {
            title: "Retro".to_string(),
            framework: Framework::Kpt,
            max_votes_per_person: 3,
            is_anonymous,
            team_name: None,
        };
        let (mut board, mut events) =
            Board::create(Slug::parse("retro001").unwrap(), draft, &Limits::default()).unwrap();
        let alice = board.add_participant("alice".to_string(), None, &mut events);
        let bob = board.add_participant("bob".to_string(), None, &mut events);
        events.drain();
        Fixture {
            board,
            alice,
            bob,
            events,
        }
    }

    fn card_by(f: &mut Fixture, author: ParticipantId) -> Card {
        let column = f.board.columns()[0].id;
        let author = f.board.find_participant_by_id(author).unwrap().clone();
        Card::create(&f.board, column, "Flaky tests".to_string(), &author, 0, &mut f.events).unwrap()
    }

    #[test]
    fn test_create_records_event() {
        let mut f = fixture(false);
        let author = f.alice;
        let card = card_by(&mut f, author);
        assert!(card.is_author(f.alice));

        let drained = f.events.drain();
        match &drained[0].event {
            DomainEvent::CardCreated {
                author_id,
                author_nickname,
                content,
                ..
            } => {
                assert_eq!(*author_id, Some(f.alice));
                assert_eq!(author_nickname.as_deref(), Some("alice"));
                assert_eq!(content, "Flaky tests");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_board_hides_author_in_event() {
        let mut f = fixture(true);
        let author = f.bob;
        let mut card = card_by(&mut f, author);
        assert!(card.is_author(f.bob));
        card.add_vote(f.alice, &mut f.events).unwrap();

        let drained = f.events.drain();
        assert!(matches!(
            drained[0].event,
            DomainEvent::CardCreated {
                author_id: None,
                author_nickname: None,
                ..
            }
        ));
        assert!(matches!(
            drained[1].event,
            DomainEvent::VoteAdded {
                participant_id: None,
                ..
            }
        ));
        // stored identity still drives the author rules
        assert_eq!(card.votes_from(f.alice), 1);
    }

    #[test]
    fn test_create_outside_writing_fails() {
        let mut f = fixture(false);
        f.board
            .transition_phase(Phase::Voting, f.alice, &mut f.events)
            .unwrap();
        let column = f.board.columns()[0].id;
        let author = f.board.find_participant_by_id(f.alice).unwrap().clone();
        let err = Card::create(&f.board, column, "late".to_string(), &author, 0, &mut f.events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_create_in_unknown_column_fails() {
        let mut f = fixture(false);
        let author = f.board.find_participant_by_id(f.alice).unwrap().clone();
        let err = Card::create(&f.board, ColumnId::new(), "x".to_string(), &author, 0, &mut f.events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_only_author_updates_content() {
        let mut f = fixture(false);
        let author = f.alice;
        let mut card = card_by(&mut f, author);
        f.events.drain();

        let err = card
            .update_content("hijack".to_string(), f.bob, &mut f.events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(f.events.is_empty());

        let before = card.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        card.update_content("x".to_string(), f.alice, &mut f.events)
            .unwrap();
        assert_eq!(card.content, "x");
        assert!(card.updated_at > before);
        assert_eq!(f.events.iter().next().unwrap().tag(), "CARD_UPDATED");
    }

    #[test]
    fn test_one_vote_per_participant() {
        let mut f = fixture(false);
        let author = f.alice;
        let mut card = card_by(&mut f, author);

        card.add_vote(f.bob, &mut f.events).unwrap();
        let err = card.add_vote(f.bob, &mut f.events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        card.add_vote(f.alice, &mut f.events).unwrap();
        assert_eq!(card.vote_count(), 2);

        card.remove_vote(f.bob, &mut f.events).unwrap();
        assert_eq!(card.vote_count(), 1);
        let err = card.remove_vote(f.bob, &mut f.events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_move_records_source_and_target() {
        let mut f = fixture(false);
        let author = f.alice;
        let mut card = card_by(&mut f, author);
        f.events.drain();
        let source = card.column_id;
        let target = f.board.columns()[1].id;

        assert!(card.is_cross_column_move(target));
        card.move_to(target, 2, &mut f.events);
        assert_eq!(card.column_id, target);
        assert_eq!(card.sort_order, 2);

        let drained = f.events.drain();
        assert_eq!(
            drained[0].event,
            DomainEvent::CardMoved {
                card_id: card.id,
                source_column_id: source,
                target_column_id: target,
                sort_order: 2,
            }
        );
    }

    #[test]
    fn test_discussion_flag_follows_phase() {
        let mut f = fixture(false);
        let author = f.alice;
        let mut card = card_by(&mut f, author);
        assert!(card.mark_as_discussed(Phase::Voting, &mut f.events).is_err());

        card.mark_as_discussed(Phase::Discussion, &mut f.events)
            .unwrap();
        assert!(card.is_discussed);
        card.unmark_as_discussed(Phase::ActionItems, &mut f.events)
            .unwrap();
        assert!(!card.is_discussed);

        let flags: Vec<_> = f
            .events
            .iter()
            .filter_map(|e| match e {
                DomainEvent::CardDiscussionChanged { is_discussed, .. } => Some(*is_discussed),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_delete_rights() {
        let mut f = fixture(false);
        let author = f.bob;
        let card = card_by(&mut f, author);
        let carol = f
            .board
            .add_participant("carol".to_string(), None, &mut f.events);

        assert_eq!(
            card.delete(carol, false, &mut f.events).unwrap_err().kind(),
            ErrorKind::Forbidden
        );
        assert!(card.delete(f.bob, false, &mut f.events).is_ok());
        assert!(card.delete(f.alice, true, &mut f.events).is_ok());
    }

    #[test]
    fn test_memos() {
        let mut f = fixture(false);
        let author = f.alice;
        let mut card = card_by(&mut f, author);
        assert!(card
            .add_memo(Phase::Writing, f.bob, "note".to_string(), &mut f.events)
            .is_err());

        let memo = card
            .add_memo(Phase::Discussion, f.bob, "note".to_string(), &mut f.events)
            .unwrap();
        let err = card
            .update_memo(Phase::Discussion, memo, f.alice, "edit".to_string(), &mut f.events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        card.update_memo(Phase::Discussion, memo, f.bob, "edited".to_string(), &mut f.events)
            .unwrap();
        assert_eq!(card.memos()[0].content, "edited");

        card.remove_memo(memo, f.alice, true, &mut f.events).unwrap();
        assert!(card.memos().is_empty());
        assert_eq!(
            card.remove_memo(memo, f.alice, true, &mut f.events)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }
}
