//! Wire events for the real-time channel
//!
//! The original client pushed loosely-shaped payloads through a shared
//! socket handle; here the whole vocabulary is a closed set of tagged
//! variants, serialized as `{"event": <name>, "data": <payload>}` and
//! validated at the channel boundary before anything reaches the
//! reconciler or the lobby. The channel itself guarantees neither ordering
//! nor delivery; every payload is therefore an absolute snapshot, never a
//! delta.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    arena::ArenaRef,
    participant::{Id, Profile},
    progress::ProgressSummary,
    room::RoomId,
};

/// A peer's progress broadcast, as received
///
/// Carries the sender's absolute [`ProgressSummary`]; applying these out
/// of order is safe because nothing is incremental.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PeerUpdate {
    /// Id of the participant this progress belongs to
    #[garde(skip)]
    pub participant_id: Id,
    /// Sender's display name (wars send it, 1v1 battles may not)
    #[garde(inner(length(max = crate::constants::participant::MAX_NAME_LENGTH)))]
    pub display_name: Option<String>,
    /// The sender's current progress snapshot
    #[garde(custom(validate_summary))]
    pub progress: ProgressSummary,
}

/// Garde adapter for [`ProgressSummary::is_consistent`]
fn validate_summary(summary: &ProgressSummary, _ctx: &()) -> garde::Result {
    if summary.is_consistent() {
        Ok(())
    } else {
        Err(garde::Error::new(
            "progress summary violates its invariants",
        ))
    }
}

/// The payload of an incoming battle invitation
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPayload {
    /// Who is challenging
    #[garde(dive)]
    pub sender: Profile,
    /// The arena the challenger proposes, if already chosen
    #[garde(dive)]
    pub selected_arena: Option<ArenaRef>,
}

/// The shared lobby state both 1v1 clients mirror
///
/// Pushed whole on acceptance (`join_lobby`) and whenever either party
/// changes the arena (`arena_updated`).
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    /// The battle room both clients will play in
    #[garde(skip)]
    pub room_id: RoomId,
    /// The challenger
    #[garde(dive)]
    pub initiator: Profile,
    /// The challenged party
    #[garde(dive)]
    pub invitee: Profile,
    /// The currently selected arena, if any
    #[garde(dive)]
    pub selected_arena: Option<ArenaRef>,
}

/// Events this client publishes on the channel
///
/// Fire-and-forget: no acknowledgment is expected and nothing is resent
/// on failure.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutgoingEvent {
    /// Subscribe the logged-in user to their personal channel so
    /// invitations can reach them
    JoinSelf {
        /// The local participant's id
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Challenge a specific participant to a 1v1 battle
    Invitation {
        /// Personal channel of the invited participant
        #[serde(rename = "receiverId")]
        receiver_id: Id,
        /// The challenger's profile
        #[serde(rename = "senderInfo")]
        sender: Profile,
        /// The proposed arena, if chosen
        #[serde(rename = "selectedArena")]
        selected_arena: Option<ArenaRef>,
    },
    /// Accept a received invitation; mints the battle room id
    Accepted {
        /// The freshly minted battle room
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The accepting participant's profile
        #[serde(rename = "acceptedUserInfo")]
        accepted: Profile,
        /// The original challenger's profile
        #[serde(rename = "senderInfo")]
        sender: Profile,
        /// The proposed arena carried over from the invitation
        #[serde(rename = "selectedArena")]
        selected_arena: Option<ArenaRef>,
    },
    /// Subscribe to a 1v1 battle room
    JoinBattle {
        /// The battle room to join
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The joining participant
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Unsubscribe from a 1v1 battle room and signal departure
    LeaveBattle {
        /// The battle room being left
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The departing participant
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Subscribe to a war room (war rooms use server-issued ids)
    JoinRoom {
        /// The war room to join
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// Broadcast the local progress snapshot to the competition room
    #[from]
    SubmitAnswer(ProgressBroadcast),
    /// Announce that the local party is ready to start
    PlayerReady {
        /// The lobby's battle room
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The participant toggling ready
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Withdraw the local party's readiness
    PlayerUnready {
        /// The lobby's battle room
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The participant toggling unready
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Signal that both parties are ready and the battle begins
    BattleStart {
        /// The battle room that is starting
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Flag both players as in-battle for presence purposes
    MarkInBattle {
        /// First player
        player1: Id,
        /// Second player
        player2: Id,
    },
    /// Leave the lobby before the battle starts, disbanding it
    LeaveLobby {
        /// The lobby's battle room
        #[serde(rename = "roomId")]
        room_id: RoomId,
        /// The departing participant
        #[serde(rename = "participantId")]
        participant_id: Id,
    },
    /// Replace the lobby's selected arena (full lobby state is sent)
    UpdateArena(LobbySnapshot),
}

/// The progress broadcast published after every accepted answer
///
/// The room id is a string because battles use octal [`RoomId`]s while
/// wars reuse their server-issued war id as the room address.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBroadcast {
    /// The competition room to address
    pub room_id: String,
    /// The sender's id (peers use it for the self-echo guard)
    pub participant_id: Id,
    /// The sender's display name for leaderboard rendering
    pub display_name: Option<String>,
    /// The sender's absolute progress snapshot
    pub progress: ProgressSummary,
}

/// Events this client receives from the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum IncomingEvent {
    /// A peer's progress snapshot for the current competition room
    #[from]
    OpponentProgress(PeerUpdate),
    /// An invitation has arrived on the personal channel
    #[serde(rename = "acceptInvitation")]
    #[from]
    AcceptInvitation(InvitationPayload),
    /// Both clients materialize the lobby from this snapshot
    JoinLobby(LobbySnapshot),
    /// The other party toggled ready (room-scoped, no payload)
    OpponentReady,
    /// The other party withdrew readiness (room-scoped, no payload)
    OpponentUnready,
    /// Both parties are ready; enter the competition
    BattleStart {
        /// The battle room that is starting
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// The other party left; discard the lobby
    LobbyDisbanded {
        /// The lobby that was disbanded
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Either party changed the arena; adopt the new lobby state
    ArenaUpdated(LobbySnapshot),
}

/// Errors raised when decoding an inbound channel message
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The message was not a recognized event shape
    #[error("malformed event: {0}")]
    Parse(#[from] serde_json::Error),
    /// The event parsed but its payload violates its schema
    #[error("invalid event payload: {0}")]
    Invalid(#[from] garde::Report),
}

impl IncomingEvent {
    /// Decodes and validates an inbound channel message
    ///
    /// Payload-carrying variants are validated here so that nothing
    /// malformed reaches the reconciler or the lobby state machine.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the message does not parse as a known
    /// event or its payload fails validation.
    pub fn from_message(message: &str) -> Result<Self, DecodeError> {
        let event: Self = serde_json::from_str(message)?;

        match &event {
            Self::OpponentProgress(update) => update.validate()?,
            Self::AcceptInvitation(invitation) => invitation.validate()?,
            Self::JoinLobby(snapshot) | Self::ArenaUpdated(snapshot) => snapshot.validate()?,
            Self::OpponentReady
            | Self::OpponentUnready
            | Self::BattleStart { .. }
            | Self::LobbyDisbanded { .. } => {}
        }

        Ok(event)
    }
}

impl OutgoingEvent {
    /// Converts the event to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_event_names() {
        let event = OutgoingEvent::JoinBattle {
            room_id: RoomId::new(),
            participant_id: Id::new(),
        };
        let json = event.to_message();
        assert!(json.contains("\"event\":\"join_battle\""));

        let ready = OutgoingEvent::PlayerReady {
            room_id: RoomId::new(),
            participant_id: Id::new(),
        };
        assert!(ready.to_message().contains("\"event\":\"player_ready\""));
    }

    #[test]
    fn test_progress_broadcast_shape() {
        let broadcast = OutgoingEvent::SubmitAnswer(ProgressBroadcast {
            room_id: "12345".to_string(),
            participant_id: Id::new(),
            display_name: Some("Rafi".to_string()),
            progress: ProgressSummary::zero(10),
        });
        let json = broadcast.to_message();

        assert!(json.contains("\"event\":\"submit_answer\""));
        assert!(json.contains("\"roomId\":\"12345\""));
        assert!(json.contains("\"left\":10"));
    }

    #[test]
    fn test_incoming_progress_round_trip() {
        let update = PeerUpdate {
            participant_id: Id::new(),
            display_name: None,
            progress: ProgressSummary {
                correct: 3,
                wrong: 1,
                remaining: 2,
                total_answered: 4,
                accuracy_percent: 75,
            },
        };
        let json = serde_json::to_string(&IncomingEvent::OpponentProgress(update.clone())).unwrap();
        let decoded = IncomingEvent::from_message(&json).unwrap();

        assert_eq!(decoded, IncomingEvent::OpponentProgress(update));
    }

    #[test]
    fn test_inconsistent_progress_rejected_at_boundary() {
        let json = r#"{
            "event": "opponent_progress",
            "data": {
                "participantId": "7f8a1f64-1b7e-4b63-9d35-9c0a55e3a111",
                "progress": {
                    "correct": 5,
                    "wrong": 5,
                    "left": 0,
                    "totalAnswered": 3,
                    "accuracy": 50
                }
            }
        }"#;

        assert!(matches!(
            IncomingEvent::from_message(json),
            Err(DecodeError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"event": "teleport", "data": {}}"#;
        assert!(matches!(
            IncomingEvent::from_message(json),
            Err(DecodeError::Parse(_))
        ));
    }

    #[test]
    fn test_unit_events_decode_without_payload() {
        let ready = IncomingEvent::from_message(r#"{"event": "opponent_ready"}"#).unwrap();
        assert_eq!(ready, IncomingEvent::OpponentReady);

        let unready = IncomingEvent::from_message(r#"{"event": "opponent_unready"}"#).unwrap();
        assert_eq!(unready, IncomingEvent::OpponentUnready);
    }

    #[test]
    fn test_accept_invitation_uses_original_camel_case_name() {
        let invitation = IncomingEvent::AcceptInvitation(InvitationPayload {
            sender: Profile::new("Challenger"),
            selected_arena: None,
        });
        let json = serde_json::to_string(&invitation).unwrap();

        assert!(json.contains("\"event\":\"acceptInvitation\""));
        assert_eq!(IncomingEvent::from_message(&json).unwrap(), invitation);
    }
}
