//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases so signatures say which
//! table they point into:
//!
//! - [`AccountId`]: login account identifier (the session subject)
//! - [`ProfileId`]: personal profile attached to an account
//! - [`UserLevelId`]: role / position in the DSWD hierarchy
//! - [`SessionId`]: per-login session identifier embedded in the token
//! - [`LogId`]: activity log entry

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

pub type AccountId = Uuid;
pub type ProfileId = Uuid;
pub type UserLevelId = Uuid;
pub type SessionId = Uuid;
pub type LogId = Uuid;
pub type IncidentId = Uuid;
pub type EvacuationCenterId = Uuid;
pub type AssistanceRecordId = Uuid;
pub type NotificationId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Mutations a repository may refuse to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Declares a string-backed status enum stored in a `VARCHAR` column guarded by a
/// `CHECK` constraint. Rows decode through `TryFrom<String>` and binds use `as_str`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, String> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} value: {other}", stringify!($name))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, String> {
                value.parse()
            }
        }
    };
}

pub(crate) use string_enum;

#[cfg(test)]
mod tests {
    use super::*;

    string_enum!(Colour { Red => "red", DarkBlue => "Dark Blue", Error => "error" });

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_string_enum_parses_and_prints() {
        assert_eq!("Dark Blue".parse::<Colour>().unwrap(), Colour::DarkBlue);
        assert_eq!(Colour::Red.to_string(), "red");
        assert!(Colour::try_from("green".to_string()).is_err());
        assert_eq!(serde_json::to_string(&Colour::DarkBlue).unwrap(), "\"Dark Blue\"");
    }

    #[test]
    fn test_string_enum_with_error_variant() {
        assert_eq!("error".parse::<Colour>().unwrap(), Colour::Error);
        assert_eq!(Colour::try_from("error".to_string()).unwrap(), Colour::Error);
        assert_eq!(Colour::Error.as_str(), "error");
    }
}
