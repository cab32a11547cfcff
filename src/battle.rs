//! A live competition session
//!
//! [`CompetitionSession`] ties together the local [`AnswerSheet`], the
//! reconciled [`PeerTable`] and the channel: answers go in locally, the
//! resulting snapshot is broadcast, peer snapshots come back in, and the
//! current [`Resolution`] can be read off at any moment. The same session
//! drives both a 1v1 battle room and an N-way war room; only the join and
//! leave traffic differs.

use thiserror::Error;

use crate::{
    arena::{Arena, ArenaError},
    backend::{ArenaSource, FetchError},
    channel::Channel,
    events::{IncomingEvent, OutgoingEvent, ProgressBroadcast},
    participant::Profile,
    progress::{AnswerSheet, ProgressSummary},
    ranking::{self, Contender, Mode, Resolution},
    reconcile::{Outcome, PeerTable},
    room::RoomId,
};

/// Which room this session plays in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Competition {
    /// A 1v1 battle room minted at invitation acceptance
    Battle {
        /// The battle room
        room_id: RoomId,
    },
    /// A war room addressed by its server-issued war id
    War {
        /// The war id, which doubles as the room address
        war_id: String,
    },
}

impl Competition {
    /// The resolution mode this competition uses
    pub fn mode(&self) -> Mode {
        match self {
            Self::Battle { .. } => Mode::OneVsOne,
            Self::War { .. } => Mode::War,
        }
    }

    /// The string address progress broadcasts are sent to
    pub fn room_key(&self) -> String {
        match self {
            Self::Battle { room_id } => room_id.to_string(),
            Self::War { war_id } => war_id.clone(),
        }
    }
}

/// Errors raised while setting up a session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The arena could not be fetched
    #[error("failed to fetch arena: {0}")]
    Fetch(#[from] FetchError),
    /// The fetched arena content is unplayable
    #[error("unplayable arena: {0}")]
    Arena(#[from] ArenaError),
}

/// A running battle or war from the local participant's side
#[derive(Debug, Clone)]
pub struct CompetitionSession {
    competition: Competition,
    local: Profile,
    arena: Arena,
    sheet: AnswerSheet,
    peers: PeerTable,
}

impl CompetitionSession {
    /// Creates a session over an already-fetched arena
    ///
    /// # Errors
    ///
    /// Returns an [`ArenaError`] if the arena content is unplayable.
    pub fn new(competition: Competition, local: Profile, arena: Arena) -> Result<Self, ArenaError> {
        arena.check()?;
        let peers = PeerTable::new(local.id);
        Ok(Self {
            competition,
            local,
            arena,
            sheet: AnswerSheet::new(),
            peers,
        })
    }

    /// Fetches the arena fresh and creates the session
    ///
    /// Arena content is always re-fetched at competition start so that
    /// all participants play the same revision.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the fetch fails or the arena is
    /// unplayable.
    pub fn load(
        source: &impl ArenaSource,
        competition: Competition,
        local: Profile,
        arena_id: &str,
    ) -> Result<Self, SessionError> {
        let arena = source.arena(arena_id)?;
        Ok(Self::new(competition, local, arena)?)
    }

    /// Joins the competition room and announces presence
    ///
    /// Battles subscribe with `join_battle`; wars subscribe with
    /// `join_room`. Both then broadcast a zero-progress snapshot so
    /// peers discover this participant before any answer lands.
    pub fn join(&self, channel: &impl Channel) {
        match &self.competition {
            Competition::Battle { room_id } => {
                log::info!("[SYNC] joining battle room {room_id}");
                channel.publish(&OutgoingEvent::JoinBattle {
                    room_id: *room_id,
                    participant_id: self.local.id,
                });
            }
            Competition::War { war_id } => {
                log::info!("[WAR] joining war room {war_id}");
                channel.publish(&OutgoingEvent::JoinRoom {
                    room_id: war_id.clone(),
                });
            }
        }
        self.broadcast(channel);
    }

    /// Records an answer and, if it was accepted, broadcasts the new
    /// snapshot
    ///
    /// Answers are final: re-answering a question or referencing an
    /// out-of-range question or option is silently ignored and nothing
    /// is published.
    pub fn submit_answer(
        &mut self,
        channel: &impl Channel,
        question_index: usize,
        option_index: usize,
    ) -> Option<ProgressSummary> {
        let summary = self
            .sheet
            .submit_answer(&self.arena, question_index, option_index)?;
        self.broadcast(channel);
        Some(summary)
    }

    /// Feeds one received event into the session
    ///
    /// Only `opponent_progress` matters here; lobby-phase events that
    /// straggle in after the battle started are ignored. Returns what the
    /// reconciler did with the update, if one was carried.
    pub fn receive_event(&mut self, event: IncomingEvent) -> Option<Outcome> {
        match event {
            IncomingEvent::OpponentProgress(update) => Some(self.peers.apply(update)),
            _ => None,
        }
    }

    /// The current locally-computed resolution
    ///
    /// Recomputed synchronously from the sheet and the peer table; it
    /// can flip from provisional to resolved purely by a peer update
    /// arriving.
    pub fn resolution(&self) -> Resolution {
        ranking::resolve(
            self.competition.mode(),
            Contender {
                participant_id: self.local.id,
                display_name: Some(self.local.name.clone()),
                progress: self.local_summary(),
            },
            &self.peers,
        )
    }

    /// Leaves the competition room
    ///
    /// Wars have no leave event; abandoning a war simply stops the
    /// broadcasts.
    pub fn leave(&self, channel: &impl Channel) {
        if let Competition::Battle { room_id } = &self.competition {
            log::info!("[SYNC] leaving battle room {room_id}");
            channel.publish(&OutgoingEvent::LeaveBattle {
                room_id: *room_id,
                participant_id: self.local.id,
            });
        }
    }

    /// The local participant's current snapshot
    pub fn local_summary(&self) -> ProgressSummary {
        self.sheet.summary(&self.arena)
    }

    /// The arena being played
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The local participant's profile
    pub fn local(&self) -> &Profile {
        &self.local
    }

    /// The competition this session plays in
    pub fn competition(&self) -> &Competition {
        &self.competition
    }

    /// The reconciled peer view
    pub fn peers(&self) -> &PeerTable {
        &self.peers
    }

    fn broadcast(&self, channel: &impl Channel) {
        channel.publish(&OutgoingEvent::SubmitAnswer(ProgressBroadcast {
            room_id: self.competition.room_key(),
            participant_id: self.local.id,
            display_name: Some(self.local.name.clone()),
            progress: self.local_summary(),
        }));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        arena::tests::arena_with,
        channel::tests::RecordingChannel,
        events::PeerUpdate,
        participant::Id,
        ranking::{CompetitionState, Winner},
    };

    fn battle_session() -> CompetitionSession {
        CompetitionSession::new(
            Competition::Battle {
                room_id: RoomId::new(),
            },
            Profile::new("Local"),
            arena_with(3),
        )
        .unwrap()
    }

    fn peer_update(id: Id, correct: usize, total: usize, remaining: usize) -> PeerUpdate {
        PeerUpdate {
            participant_id: id,
            display_name: Some("Opponent".to_string()),
            progress: ProgressSummary {
                correct,
                wrong: total - correct,
                remaining,
                total_answered: total,
                accuracy_percent: if total == 0 {
                    0
                } else {
                    ((correct as f64 / total as f64) * 100.0).round() as usize
                },
            },
        }
    }

    #[test]
    fn test_join_announces_zero_progress() {
        let session = battle_session();
        let channel = RecordingChannel::default();

        session.join(&channel);

        assert_eq!(channel.published_count(), 2);
        let Some(OutgoingEvent::SubmitAnswer(broadcast)) = channel.last() else {
            panic!("expected a progress broadcast");
        };
        assert_eq!(broadcast.progress, ProgressSummary::zero(3));
    }

    #[test]
    fn test_accepted_answer_publishes_exactly_once() {
        let mut session = battle_session();
        let channel = RecordingChannel::default();

        assert!(session.submit_answer(&channel, 0, 0).is_some());
        assert_eq!(channel.published_count(), 1);
    }

    #[test]
    fn test_rejected_answer_publishes_nothing() {
        let mut session = battle_session();
        let channel = RecordingChannel::default();

        session.submit_answer(&channel, 0, 0);
        assert!(session.submit_answer(&channel, 0, 1).is_none());
        assert!(session.submit_answer(&channel, 7, 0).is_none());
        assert_eq!(channel.published_count(), 1);
    }

    #[test]
    fn test_battle_resolves_when_both_sides_finish() {
        let mut session = battle_session();
        let channel = RecordingChannel::default();
        let opponent = Id::new();

        for question in 0..3 {
            session.submit_answer(&channel, question, 0);
        }
        assert_eq!(
            session.resolution().state,
            CompetitionState::WaitingForPeers
        );

        session.receive_event(IncomingEvent::OpponentProgress(peer_update(
            opponent, 1, 3, 0,
        )));

        let resolution = session.resolution();
        assert_eq!(resolution.state, CompetitionState::Resolved);
        assert_eq!(
            resolution.winner,
            Some(Winner::Participant(session.local().id))
        );
    }

    #[test]
    fn test_own_echo_does_not_count_as_opponent() {
        let mut session = battle_session();
        let local_id = session.local().id;

        let outcome = session.receive_event(IncomingEvent::OpponentProgress(peer_update(
            local_id, 3, 3, 0,
        )));

        assert_eq!(outcome, Some(Outcome::SelfEcho));
        assert!(session.peers().is_empty());
    }

    #[test]
    fn test_lobby_stragglers_are_ignored() {
        let mut session = battle_session();

        assert_eq!(session.receive_event(IncomingEvent::OpponentReady), None);
        assert_eq!(
            session.receive_event(IncomingEvent::LobbyDisbanded {
                room_id: RoomId::new()
            }),
            None
        );
    }

    #[test]
    fn test_war_session_joins_by_war_id() {
        let session = CompetitionSession::new(
            Competition::War {
                war_id: "war-42".to_string(),
            },
            Profile::new("Warrior"),
            arena_with(2),
        )
        .unwrap();
        let channel = RecordingChannel::default();

        session.join(&channel);

        assert!(matches!(
            channel.published().first(),
            Some(OutgoingEvent::JoinRoom { room_id }) if room_id == "war-42"
        ));
    }

    #[test]
    fn test_war_leave_is_silent() {
        let session = CompetitionSession::new(
            Competition::War {
                war_id: "war-42".to_string(),
            },
            Profile::new("Warrior"),
            arena_with(2),
        )
        .unwrap();
        let channel = RecordingChannel::default();

        session.leave(&channel);

        assert_eq!(channel.published_count(), 0);
    }
}
