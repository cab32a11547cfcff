//! Participant identity
//!
//! This module defines the unique identifier shared by every participant
//! in a battle or war, and the small profile record that travels with
//! invitations and progress broadcasts. Profiles are fetched from the
//! account backend and treated as read-only here.

use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};
use uuid::Uuid;

/// A unique identifier for a participant
///
/// Every account has exactly one id; it identifies the sender of progress
/// broadcasts and the addressee of invitations. Serialized as a UUID string
/// on the wire.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random participant id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random participant id (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the id as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A participant's public profile
///
/// The subset of an account that other participants see: the id, the
/// display name rendered in lobbies and leaderboards, and an optional
/// avatar location. Owned by the account backend; this client never
/// mutates it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Profile {
    /// The participant's unique identifier
    #[garde(skip)]
    pub id: Id,
    /// The display name shown to other participants
    #[garde(length(min = 1, max = crate::constants::participant::MAX_NAME_LENGTH))]
    pub name: String,
    /// Optional avatar image location
    #[garde(skip)]
    pub image: Option<String>,
}

impl Profile {
    /// Creates a profile with the given name and a fresh id, without avatar
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            image: None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = Id::new();
        let parsed = Id::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = Id::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_from_str_invalid() {
        assert!(Id::from_str("not-a-uuid").is_err());
        assert!(Id::from_str("").is_err());
    }

    #[test]
    fn test_profile_validation() {
        let profile = Profile::new("Rafi");
        assert!(profile.validate().is_ok());

        let unnamed = Profile::new("");
        assert!(unnamed.validate().is_err());

        let long = Profile::new("a".repeat(crate::constants::participant::MAX_NAME_LENGTH + 1));
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_profile_image_skipped_when_absent() {
        let profile = Profile::new("Rafi");
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("image"));
    }
}
