//! War lobbies
//!
//! Unlike 1v1 lobbies, wars are server-owned: the creator schedules one,
//! warriors join through the backend, and every client discovers status
//! changes by polling the [`WarDirectory`] rather than through pushed
//! events. [`WarLobby`] wraps that polling loop's state and turns raw
//! snapshots into at-most-once transitions the host can act on.

use garde::Validate;
use serde::{Deserialize, Serialize};
use web_time::{Duration, SystemTime};

use crate::{
    arena::ArenaRef,
    backend::{FetchError, WarDirectory},
    constants::war,
    participant::{Id, Profile},
};

/// Server-side lifecycle state of a war
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarStatus {
    /// Accepting warriors, not yet begun
    Waiting,
    /// Underway; the lobby redirects into the war room
    Started,
    /// All done; results are history
    Finished,
    /// Called off by the creator before starting
    Cancelled,
}

impl WarStatus {
    /// Whether no further status change can occur
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// One warrior enrolled in a war
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarParticipant {
    /// The warrior's profile
    pub profile: Profile,
    /// When the warrior joined
    pub joined_at: SystemTime,
}

/// An authoritative war snapshot as fetched from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct War {
    /// The server-issued war id; also the war room's channel address
    #[garde(length(min = 1))]
    pub war_id: String,
    /// Who scheduled the war
    #[garde(dive)]
    pub creator: Profile,
    /// The arena every warrior plays
    #[garde(dive)]
    pub arena: ArenaRef,
    /// Room capacity
    #[garde(range(min = war::MIN_PARTICIPANTS, max = war::MAX_PARTICIPANTS))]
    pub max_participants: usize,
    /// When the creator intends to start
    #[garde(skip)]
    pub scheduled_start: SystemTime,
    /// Current lifecycle state
    #[garde(skip)]
    pub status: WarStatus,
    /// Enrolled warriors, in join order
    #[garde(skip)]
    pub participants: Vec<WarParticipant>,
}

impl War {
    /// Whether no more warriors can join
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants
    }

    /// Whether the given participant is enrolled
    pub fn contains(&self, participant_id: Id) -> bool {
        self.participants
            .iter()
            .any(|warrior| warrior.profile.id == participant_id)
    }
}

/// A status change observed between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarTransition {
    /// The war began; enter the war room
    Started,
    /// The war was called off; leave the lobby
    Cancelled,
}

/// One client's polling view of a waiting war
#[derive(Debug, Clone)]
pub struct WarLobby {
    war: War,
    local_id: Id,
}

impl WarLobby {
    /// Wraps an initial snapshot for the given local participant
    pub fn new(war: War, local_id: Id) -> Self {
        Self { war, local_id }
    }

    /// Absorbs a freshly fetched snapshot
    ///
    /// The authoritative snapshot always replaces the stored one wholesale
    /// (roster included), but a transition is reported at most once: only
    /// when a waiting war is observed as started or cancelled. Snapshots
    /// for a different war id can only be a programming error upstream
    /// and are dropped.
    pub fn refresh(&mut self, authoritative: War) -> Option<WarTransition> {
        if authoritative.war_id != self.war.war_id {
            log::warn!(
                "[WAR] dropping snapshot for {} while polling {}",
                authoritative.war_id,
                self.war.war_id
            );
            return None;
        }

        let was_waiting = self.war.status == WarStatus::Waiting;
        let transition = match (was_waiting, authoritative.status) {
            (true, WarStatus::Started) => Some(WarTransition::Started),
            (true, WarStatus::Cancelled) => Some(WarTransition::Cancelled),
            _ => None,
        };
        if let Some(transition) = transition {
            log::info!("[WAR] war {} is now {transition:?}", self.war.war_id);
        }

        self.war = authoritative;
        transition
    }

    /// Polls the directory once and absorbs the result
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the poll fails; the stored snapshot is
    /// left untouched so the next tick can retry.
    pub fn refresh_from(
        &mut self,
        directory: &impl WarDirectory,
    ) -> Result<Option<WarTransition>, FetchError> {
        let authoritative = directory.war(&self.war.war_id)?;
        Ok(self.refresh(authoritative))
    }

    /// Whether the local participant scheduled this war
    pub fn is_creator(&self) -> bool {
        self.war.creator.id == self.local_id
    }

    /// Time left until the scheduled start, zero once it has passed
    pub fn time_until_start(&self, now: SystemTime) -> Duration {
        self.war
            .scheduled_start
            .duration_since(now)
            .unwrap_or(Duration::ZERO)
    }

    /// How long to wait between polls
    pub fn poll_interval() -> Duration {
        Duration::from_secs(war::POLL_INTERVAL_SECS)
    }

    /// The latest absorbed snapshot
    pub fn war(&self) -> &War {
        &self.war
    }

    /// The local participant this lobby polls for
    pub fn local_id(&self) -> Id {
        self.local_id
    }
}
