//! The 1v1 pre-battle lobby
//!
//! Two clients negotiate a battle without a server-side referee: the
//! challenger sends an invitation over the receiver's personal channel,
//! the receiver mints the battle room on acceptance, and both sides then
//! mirror one shared [`LobbySnapshot`] while toggling readiness. Whichever
//! readiness change completes the pair on a client, a local toggle or a
//! received `opponent_ready`, that client emits `battle_start` at most
//! once; duplicate signals from a toggle race are absorbed on receipt.

use serde::{Deserialize, Serialize};

use crate::{
    arena::ArenaRef,
    channel::Channel,
    events::{IncomingEvent, InvitationPayload, LobbySnapshot, OutgoingEvent},
    participant::{Id, Profile},
    room::RoomId,
};

/// Where the lobby negotiation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Invitation sent, no answer yet
    Invited,
    /// Invitation accepted, waiting for the lobby snapshot
    Accepted,
    /// Both parties present, toggling readiness
    ReadyWait,
    /// Both ready, start signal emitted, waiting for the echo
    Starting,
    /// The battle has started; the lobby's job is done
    Active,
    /// A party left or the lobby was torn down
    Disbanded,
}

/// What a received event means for the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Both parties are ready; hand over to a competition session
    EnterBattle {
        /// The battle room to play in
        room_id: RoomId,
        /// The agreed arena, if one was selected
        arena: Option<ArenaRef>,
    },
    /// The lobby no longer exists; discard it
    Disbanded,
}

/// One client's view of a 1v1 lobby
#[derive(Debug, Clone)]
pub struct Lobby {
    local_id: Id,
    phase: Phase,
    room_id: Option<RoomId>,
    initiator: Profile,
    invitee: Option<Profile>,
    selected_arena: Option<ArenaRef>,
    initiator_ready: bool,
    invitee_ready: bool,
    start_signalled: bool,
}

impl Lobby {
    /// Challenges `receiver` to a battle, opening the lobby on the
    /// challenger's side
    pub fn invite(
        channel: &impl Channel,
        initiator: Profile,
        receiver: Profile,
        selected_arena: Option<ArenaRef>,
    ) -> Self {
        log::info!("[LOBBY] inviting {} to battle", receiver.id);
        channel.publish(&OutgoingEvent::Invitation {
            receiver_id: receiver.id,
            sender: initiator.clone(),
            selected_arena: selected_arena.clone(),
        });
        Self {
            local_id: initiator.id,
            phase: Phase::Invited,
            room_id: None,
            initiator,
            invitee: Some(receiver),
            selected_arena,
            initiator_ready: false,
            invitee_ready: false,
            start_signalled: false,
        }
    }

    /// Accepts a received invitation, minting the battle room
    ///
    /// The minted [`RoomId`] travels back inside `accepted`; the server
    /// then pushes the same `join_lobby` snapshot to both personal
    /// channels.
    pub fn accept(channel: &impl Channel, invitee: Profile, invitation: &InvitationPayload) -> Self {
        let room_id = RoomId::new();
        log::info!(
            "[LOBBY] accepting invitation from {} in room {room_id}",
            invitation.sender.id
        );
        channel.publish(&OutgoingEvent::Accepted {
            room_id,
            accepted: invitee.clone(),
            sender: invitation.sender.clone(),
            selected_arena: invitation.selected_arena.clone(),
        });
        Self {
            local_id: invitee.id,
            phase: Phase::Accepted,
            room_id: Some(room_id),
            initiator: invitation.sender.clone(),
            invitee: Some(invitee),
            selected_arena: invitation.selected_arena.clone(),
            initiator_ready: false,
            invitee_ready: false,
            start_signalled: false,
        }
    }

    /// Toggles the local party's readiness
    ///
    /// Only meaningful while both parties are in the lobby; outside
    /// [`Phase::ReadyWait`] nothing happens. If this toggle completes the
    /// ready pair, the client emits `battle_start` and moves to
    /// [`Phase::Starting`] until the echo arrives.
    pub fn toggle_ready(&mut self, channel: &impl Channel) {
        if self.phase != Phase::ReadyWait {
            return;
        }
        let Some(room_id) = self.room_id else {
            return;
        };

        let now_ready = !self.local_ready();
        self.set_local_ready(now_ready);
        channel.publish(&if now_ready {
            OutgoingEvent::PlayerReady {
                room_id,
                participant_id: self.local_id,
            }
        } else {
            OutgoingEvent::PlayerUnready {
                room_id,
                participant_id: self.local_id,
            }
        });

        self.maybe_signal_start(channel);
    }

    /// Replaces the selected arena
    ///
    /// Pushes the whole lobby state so the other side adopts it, and
    /// withdraws both readiness flags since agreement was about the
    /// previous arena.
    pub fn select_arena(&mut self, channel: &impl Channel, arena: ArenaRef) {
        if self.phase != Phase::ReadyWait {
            return;
        }
        let Some(snapshot) = self.snapshot_with(Some(arena.clone())) else {
            return;
        };

        self.selected_arena = Some(arena);
        self.initiator_ready = false;
        self.invitee_ready = false;
        channel.publish(&OutgoingEvent::UpdateArena(snapshot));
    }

    /// Leaves the lobby before the battle starts, disbanding it
    ///
    /// Safe to call repeatedly; only the first call publishes.
    pub fn leave(&mut self, channel: &impl Channel) {
        if matches!(self.phase, Phase::Active | Phase::Disbanded) {
            return;
        }
        if let Some(room_id) = self.room_id {
            channel.publish(&OutgoingEvent::LeaveLobby {
                room_id,
                participant_id: self.local_id,
            });
        }
        self.phase = Phase::Disbanded;
    }

    /// Feeds one received event into the lobby state machine
    pub fn receive_event(
        &mut self,
        channel: &impl Channel,
        event: IncomingEvent,
    ) -> Option<Signal> {
        match event {
            IncomingEvent::JoinLobby(snapshot) => {
                // only the handshake phases may enter the lobby; a
                // straggling duplicate must not resurrect a torn-down or
                // already-active one
                if matches!(self.phase, Phase::Invited | Phase::Accepted) {
                    log::info!("[LOBBY] joined lobby of room {}", snapshot.room_id);
                    self.adopt(snapshot);
                    self.phase = Phase::ReadyWait;
                }
                None
            }
            IncomingEvent::OpponentReady => {
                self.set_remote_ready(true);
                self.maybe_signal_start(channel);
                None
            }
            IncomingEvent::OpponentUnready => {
                self.set_remote_ready(false);
                None
            }
            IncomingEvent::ArenaUpdated(snapshot) => {
                if self.phase == Phase::ReadyWait {
                    self.adopt(snapshot);
                    self.initiator_ready = false;
                    self.invitee_ready = false;
                }
                None
            }
            IncomingEvent::BattleStart { room_id } => {
                if self.room_id != Some(room_id)
                    || !matches!(self.phase, Phase::ReadyWait | Phase::Starting)
                {
                    return None;
                }
                self.phase = Phase::Active;
                if let Some(invitee) = &self.invitee {
                    channel.publish(&OutgoingEvent::MarkInBattle {
                        player1: self.initiator.id,
                        player2: invitee.id,
                    });
                }
                Some(Signal::EnterBattle {
                    room_id,
                    arena: self.selected_arena.clone(),
                })
            }
            IncomingEvent::LobbyDisbanded { room_id } => {
                if self.room_id != Some(room_id) || self.phase == Phase::Disbanded {
                    return None;
                }
                log::info!("[LOBBY] lobby of room {room_id} was disbanded");
                self.phase = Phase::Disbanded;
                Some(Signal::Disbanded)
            }
            IncomingEvent::OpponentProgress(_) | IncomingEvent::AcceptInvitation(_) => None,
        }
    }

    /// The lobby's current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The battle room, once minted
    pub fn room_id(&self) -> Option<RoomId> {
        self.room_id
    }

    /// The currently selected arena, if any
    pub fn selected_arena(&self) -> Option<&ArenaRef> {
        self.selected_arena.as_ref()
    }

    /// Whether the local party is flagged ready
    pub fn local_ready(&self) -> bool {
        if self.local_is_initiator() {
            self.initiator_ready
        } else {
            self.invitee_ready
        }
    }

    /// Whether the other party is flagged ready
    pub fn remote_ready(&self) -> bool {
        if self.local_is_initiator() {
            self.invitee_ready
        } else {
            self.initiator_ready
        }
    }

    /// Emits `battle_start` once both flags are observed true
    ///
    /// Runs after every readiness change, local or remote, so the pair
    /// is detected no matter which flag arrived last. When toggles cross
    /// on the wire both clients may signal; `start_signalled` keeps each
    /// client to at most one emission, and the transition to
    /// [`Phase::Active`] is idempotent on receipt.
    fn maybe_signal_start(&mut self, channel: &impl Channel) {
        if self.phase != Phase::ReadyWait
            || !self.initiator_ready
            || !self.invitee_ready
            || self.start_signalled
        {
            return;
        }
        let Some(room_id) = self.room_id else {
            return;
        };

        log::info!("[LOBBY] both ready, signalling start of room {room_id}");
        self.start_signalled = true;
        self.phase = Phase::Starting;
        channel.publish(&OutgoingEvent::BattleStart { room_id });
    }

    fn local_is_initiator(&self) -> bool {
        self.initiator.id == self.local_id
    }

    fn set_local_ready(&mut self, ready: bool) {
        if self.local_is_initiator() {
            self.initiator_ready = ready;
        } else {
            self.invitee_ready = ready;
        }
    }

    fn set_remote_ready(&mut self, ready: bool) {
        if self.local_is_initiator() {
            self.invitee_ready = ready;
        } else {
            self.initiator_ready = ready;
        }
    }

    fn adopt(&mut self, snapshot: LobbySnapshot) {
        self.room_id = Some(snapshot.room_id);
        self.initiator = snapshot.initiator;
        self.invitee = Some(snapshot.invitee);
        self.selected_arena = snapshot.selected_arena;
    }

    fn snapshot_with(&self, selected_arena: Option<ArenaRef>) -> Option<LobbySnapshot> {
        Some(LobbySnapshot {
            room_id: self.room_id?,
            initiator: self.initiator.clone(),
            invitee: self.invitee.clone()?,
            selected_arena,
        })
    }
}
