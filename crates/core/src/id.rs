//! Strongly-typed identifiers.
//!
//! The entity store hands out opaque string ids, so these wrap `String`
//! rather than a UUID.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Identifier of a record in the remote entity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

/// Opaque tournament identifier (participant records point at it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw id. Rejects the empty string.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
                let raw = raw.into();
                if raw.is_empty() {
                    return Err(IdError::Empty($name));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(RecordId, "RecordId");
impl_string_newtype!(TournamentId, "TournamentId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert!(RecordId::new("").is_err());
        assert_eq!("".parse::<TournamentId>(), Err(IdError::Empty("TournamentId")));
    }

    #[test]
    fn ids_display_their_raw_value() {
        let id: TournamentId = "t-42".parse().unwrap();
        assert_eq!(id.to_string(), "t-42");
        assert_eq!(id.as_str(), "t-42");
    }
}
