use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiers are opaque strings assigned by the backend (`narrator`,
/// `char1`, `conv_20250101_120000`, ...). The client never mints one.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(ConversationId);
define_id!(CharacterId);
define_id!(MessageId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_id_round_trips_through_serde_as_plain_string() {
        let id = CharacterId::new("char1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"char1\"");

        let back: CharacterId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner_value() {
        let id = ConversationId::new("conv_20250101_120000");
        assert_eq!(id.to_string(), "conv_20250101_120000");
    }
}
