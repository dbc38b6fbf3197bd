//! Stateless rules deciding who may do what in each phase.

use crate::{
    domain::phase::Phase,
    error::{Result, RetroError},
};

/// Checks whether a card move is allowed
///
/// Rules are evaluated in order: the phase must allow moves at all, the
/// executor must hold the role the phase requires, and only WRITING accepts
/// moves across columns.
pub fn validate_card_move(
    phase: Phase,
    is_author: bool,
    is_facilitator: bool,
    is_cross_column_move: bool,
) -> Result<()> {
    if !phase.can_move_card() {
        return Err(RetroError::bad_request(format!(
            "Cards cannot be moved during {}",
            phase
        )));
    }
    if phase.requires_author_for_move() && !is_author {
        return Err(RetroError::forbidden(format!(
            "Only the author can move a card during {}",
            phase
        )));
    }
    if phase.requires_facilitator_for_move() && !is_facilitator {
        return Err(RetroError::forbidden(format!(
            "Only the facilitator can move cards during {}",
            phase
        )));
    }
    if is_cross_column_move && !phase.can_move_card_cross_column() {
        return Err(RetroError::bad_request(format!(
            "Cards cannot change columns during {}",
            phase
        )));
    }
    Ok(())
}

pub fn validate_card_deletion(is_author: bool, is_facilitator: bool) -> Result<()> {
    if is_author || is_facilitator {
        Ok(())
    } else {
        Err(RetroError::forbidden(
            "Only the author or the facilitator can delete this",
        ))
    }
}

pub fn validate_facilitator(is_facilitator: bool, action: &str) -> Result<()> {
    if is_facilitator {
        Ok(())
    } else {
        Err(RetroError::forbidden(format!(
            "Only the facilitator can {}",
            action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn kind(result: Result<()>) -> Option<ErrorKind> {
        result.err().map(|err| err.kind())
    }

    #[test]
    fn test_writing_admits_author_any_column() {
        assert!(validate_card_move(Phase::Writing, true, false, false).is_ok());
        assert!(validate_card_move(Phase::Writing, true, false, true).is_ok());
        assert_eq!(
            kind(validate_card_move(Phase::Writing, false, true, false)),
            Some(ErrorKind::Forbidden)
        );
    }

    #[test]
    fn test_discussion_admits_facilitator_same_column() {
        assert!(validate_card_move(Phase::Discussion, false, true, false).is_ok());
        assert_eq!(
            kind(validate_card_move(Phase::Discussion, true, false, false)),
            Some(ErrorKind::Forbidden)
        );
        assert_eq!(
            kind(validate_card_move(Phase::ActionItems, false, true, true)),
            Some(ErrorKind::BadRequest)
        );
    }

    #[test]
    fn test_voting_and_closed_reject_everyone() {
        for phase in [Phase::Voting, Phase::Closed] {
            assert_eq!(
                kind(validate_card_move(phase, true, true, false)),
                Some(ErrorKind::BadRequest)
            );
        }
    }

    #[test]
    fn test_deletion() {
        assert!(validate_card_deletion(true, false).is_ok());
        assert!(validate_card_deletion(false, true).is_ok());
        assert_eq!(
            kind(validate_card_deletion(false, false)),
            Some(ErrorKind::Forbidden)
        );
    }

    #[test]
    fn test_facilitator_check() {
        assert!(validate_facilitator(true, "start the timer").is_ok());
        let err = validate_facilitator(false, "start the timer").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: Only the facilitator can start the timer");
    }

    proptest! {
        #[test]
        fn prop_move_matrix(
            phase in prop::sample::select(Phase::ALL.to_vec()),
            is_author in any::<bool>(),
            is_facilitator in any::<bool>(),
            cross in any::<bool>(),
        ) {
            let allowed = match phase {
                Phase::Writing => is_author,
                Phase::Discussion | Phase::ActionItems => is_facilitator && !cross,
                Phase::Voting | Phase::Closed => false,
            };
            let result = validate_card_move(phase, is_author, is_facilitator, cross);
            prop_assert_eq!(result.is_ok(), allowed);
        }
    }
}
