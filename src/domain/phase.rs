use crate::error::{Result, RetroError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Stage of a retrospective; boards pass through each phase exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Writing,
    Voting,
    Discussion,
    ActionItems,
    Closed,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Writing,
        Phase::Voting,
        Phase::Discussion,
        Phase::ActionItems,
        Phase::Closed,
    ];

    /// The only phase reachable from this one, if any
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Writing => Some(Self::Voting),
            Self::Voting => Some(Self::Discussion),
            Self::Discussion => Some(Self::ActionItems),
            Self::ActionItems => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Checks if a phase transition is valid
    pub fn can_transition_to(self, target: Phase) -> bool {
        matches!(
            (self, target),
            (Self::Writing, Self::Voting)
                | (Self::Voting, Self::Discussion)
                | (Self::Discussion, Self::ActionItems)
                | (Self::ActionItems, Self::Closed)
        )
    }

    /// Returns `target` when the transition is allowed
    pub fn transition_to(self, target: Phase) -> Result<Phase> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(RetroError::InvalidPhaseTransition {
                from: self,
                to: target,
            })
        }
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }

    pub fn can_create_card(self) -> bool {
        self == Self::Writing
    }

    pub fn can_vote(self) -> bool {
        self == Self::Voting
    }

    pub fn can_move_card(self) -> bool {
        matches!(self, Self::Writing | Self::Discussion | Self::ActionItems)
    }

    pub fn can_move_card_cross_column(self) -> bool {
        self == Self::Writing
    }

    pub fn requires_author_for_move(self) -> bool {
        self == Self::Writing
    }

    pub fn requires_facilitator_for_move(self) -> bool {
        matches!(self, Self::Discussion | Self::ActionItems)
    }

    pub fn can_mark_discussed(self) -> bool {
        matches!(self, Self::Discussion | Self::ActionItems)
    }

    pub fn can_create_action_item(self) -> bool {
        self == Self::ActionItems
    }

    pub fn can_write_memo(self) -> bool {
        matches!(self, Self::Discussion | Self::ActionItems)
    }

    /// Card edits and deletions stop once the board is closed
    pub fn accepts_card_changes(self) -> bool {
        !self.is_closed()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "WRITING",
            Self::Voting => "VOTING",
            Self::Discussion => "DISCUSSION",
            Self::ActionItems => "ACTION_ITEMS",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase();
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == normalized)
            .ok_or_else(|| RetroError::bad_request(format!("Invalid phase '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn any_phase() -> impl Strategy<Value = Phase> {
        prop::sample::select(Phase::ALL.to_vec())
    }

    #[test]
    fn test_forward_chain() {
        let mut phase = Phase::Writing;
        let mut visited = vec![phase];
        while let Some(next) = phase.next() {
            phase = phase.transition_to(next).unwrap();
            visited.push(phase);
        }
        assert_eq!(visited, Phase::ALL.to_vec());
        assert!(phase.is_closed());
    }

    #[test]
    fn test_same_and_backward_transitions_rejected() {
        assert!(!Phase::Writing.can_transition_to(Phase::Writing));
        assert!(!Phase::Voting.can_transition_to(Phase::Writing));
        assert!(!Phase::Closed.can_transition_to(Phase::Writing));

        let err = Phase::Writing.transition_to(Phase::Discussion).unwrap_err();
        assert!(matches!(
            err,
            RetroError::InvalidPhaseTransition {
                from: Phase::Writing,
                to: Phase::Discussion
            }
        ));
    }

    #[test]
    fn test_predicates() {
        assert!(Phase::Writing.can_create_card());
        assert!(!Phase::Voting.can_create_card());
        assert!(Phase::Voting.can_vote());
        assert!(!Phase::Discussion.can_vote());
        assert!(!Phase::Voting.can_move_card());
        assert!(!Phase::Closed.can_move_card());
        assert!(Phase::ActionItems.can_move_card());
        assert!(!Phase::Discussion.can_move_card_cross_column());
        assert!(Phase::Writing.requires_author_for_move());
        assert!(Phase::Discussion.requires_facilitator_for_move());
        assert!(!Phase::Writing.requires_facilitator_for_move());
        assert!(Phase::Discussion.can_mark_discussed());
        assert!(!Phase::Voting.can_mark_discussed());
        assert!(Phase::ActionItems.can_create_action_item());
        assert!(!Phase::Discussion.can_create_action_item());
        assert!(!Phase::Closed.accepts_card_changes());
    }

    #[test]
    fn test_parse() {
        assert_eq!("action_items".parse::<Phase>().unwrap(), Phase::ActionItems);
        assert_eq!("VOTING".parse::<Phase>().unwrap(), Phase::Voting);
        assert_eq!(
            "LUNCH".parse::<Phase>().unwrap_err().kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Phase::ActionItems).unwrap();
        assert_eq!(json, "\"ACTION_ITEMS\"");
    }

    proptest! {
        #[test]
        fn prop_only_adjacent_forward_pairs(from in any_phase(), to in any_phase()) {
            let expected = from.next() == Some(to);
            prop_assert_eq!(from.can_transition_to(to), expected);
            prop_assert_eq!(from.transition_to(to).is_ok(), expected);
        }
    }
}
