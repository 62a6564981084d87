//! Strongly typed identifier wrappers, following the teacher's newtype
//! pattern but keyed on [`uuid::Uuid`] rather than a raw integer, since the
//! store and wire format use UUIDs throughout.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing raw [`Uuid`].
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the raw [`Uuid`] backing this identifier.
            #[must_use]
            pub const fn get(self) -> Uuid {
                self.0
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

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(CardId, "Identifies a card, scoped to its owning user.");
uuid_id!(UserId, "Identifies the learner who owns decks, cards, and tasks.");
uuid_id!(DeckId, "Identifies a deck of cards.");
uuid_id!(ReviewId, "Identifies a single immutable review history row.");
uuid_id!(TaskId, "Identifies a generated follow-up exercise.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(CardId::new(), CardId::new());
    }

    #[test]
    fn round_trips_through_uuid() {
        let raw = Uuid::new_v4();
        let id = CardId::from_uuid(raw);
        assert_eq!(id.get(), raw);
        assert_eq!(Uuid::from(id), raw);
    }

    #[test]
    fn display_matches_uuid_string() {
        let raw = Uuid::new_v4();
        let id = DeckId::from(raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = TaskId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
