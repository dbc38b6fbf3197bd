//! Strongly typed identifiers for board entities.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::RetroError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
                    crate::error::RetroError::bad_request(format!(
                        "Invalid {} id '{}'",
                        $entity, s
                    ))
                })
            }
        }
    };
}

entity_id!(BoardId, "board");
entity_id!(ParticipantId, "participant");
entity_id!(ColumnId, "column");
entity_id!(CardId, "card");
entity_id!(VoteId, "vote");
entity_id!(MemoId, "memo");
entity_id!(ActionItemId, "action item");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(CardId::new(), CardId::new());
    }

    #[test]
    fn test_parse_round_trip() {
        let id = ParticipantId::new();
        let parsed: ParticipantId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<ParticipantId>().is_err());
    }
}
