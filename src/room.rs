//! Battle room identifiers
//!
//! This module provides generation and parsing of the room ids that scope
//! a 1v1 battle on the event channel. Room ids are minted by the accepting
//! client when an invitation is taken, and are displayed in octal format
//! so they are easy to communicate verbally.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Minimum value for generated room ids (in octal: 10000)
const MIN_VALUE: u16 = 0o10_000;
/// Maximum value for generated room ids (in octal: 100000)
const MAX_VALUE: u16 = 0o100_000;

/// A unique identifier for a 1v1 battle room
///
/// Room ids are generated randomly within a range that always displays as
/// a 5-digit octal number. Every event of one battle is addressed to its
/// room id, and both lobby clients adopt the id minted at acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(u16);

impl RoomId {
    /// Mints a new random room id
    pub fn new() -> Self {
        Self(fastrand::u16(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for RoomId {
    /// Mints a new random room id (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoomId {
    /// Formats the room id as a 5-digit octal number
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05o}", self.0)
    }
}

impl Serialize for RoomId {
    /// Serializes the room id as an octal string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomId {
    /// Deserializes a room id from an octal string
    fn deserialize<D>(deserializer: D) -> Result<RoomId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RoomId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for RoomId {
    type Err = ParseIntError;

    /// Parses a room id from an octal string representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string cannot be parsed as a valid
    /// octal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(u16::from_str_radix(s, 8)?))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_new_in_range() {
        for _ in 0..100 {
            let id = RoomId::new();
            assert!(id.0 >= MIN_VALUE);
            assert!(id.0 < MAX_VALUE);
        }
    }

    #[test]
    fn test_room_id_display_format() {
        assert_eq!(RoomId(MIN_VALUE).to_string(), "10000");
        assert_eq!(RoomId(MIN_VALUE + 1).to_string(), "10001");
        assert_eq!(RoomId(MAX_VALUE - 1).to_string(), "77777");
    }

    #[test]
    fn test_room_id_from_str() {
        assert_eq!(RoomId::from_str("10000").unwrap().0, MIN_VALUE);
        assert_eq!(RoomId::from_str("12345").unwrap().0, 0o12345);
        assert_eq!(RoomId::from_str("77777").unwrap().0, 0o77777);
    }

    #[test]
    fn test_room_id_from_str_invalid() {
        assert!(RoomId::from_str("invalid").is_err());
        assert!(RoomId::from_str("888").is_err()); // Invalid octal digit
        assert!(RoomId::from_str("").is_err());
    }

    #[test]
    fn test_room_id_serialization() {
        let id = RoomId(0o12345);
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"12345\"");

        let deserialized: RoomId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn test_minted_id_round_trips_as_room_key() {
        // the displayed octal string addresses progress broadcasts, so a
        // mint must survive the string trip unchanged
        for _ in 0..20 {
            let id = RoomId::new();
            let key = id.to_string();
            assert_eq!(key.len(), 5);
            assert_eq!(key.parse::<RoomId>().unwrap(), id);
        }
    }

    #[test]
    fn test_room_id_in_event_payload() {
        let id = RoomId(0o23456);
        let event = crate::events::OutgoingEvent::BattleStart { room_id: id };
        let json = event.to_message();

        assert!(json.contains("\"roomId\":\"23456\""));
    }

    #[test]
    fn test_room_id_deserialization_parse_error() {
        let invalid_octal = "\"999\""; // Invalid octal digit
        let result: Result<RoomId, _> = serde_json::from_str(invalid_octal);
        assert!(result.is_err());
    }
}
