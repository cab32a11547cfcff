//! Traits over the host application's request/response backend
//!
//! Arenas, profiles, friends, war records and battle history live behind
//! an HTTP API the engine does not own. The host implements these traits
//! with its actual client; the engine only ever sees the typed results.
//! Arena content is fetched fresh for every competition, never cached.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    arena::{Arena, ArenaRef},
    participant::{Id, Profile},
    progress::ProgressSummary,
    ranking,
    war::War,
};

/// Errors surfaced by backend fetches
#[derive(Error, Debug)]
pub enum FetchError {
    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The request itself failed (transport, auth, server error)
    #[error("request failed: {0}")]
    Request(String),
}

/// Source of arena content
pub trait ArenaSource {
    /// Fetches the full arena, questions included
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the arena does not exist or the
    /// request fails.
    fn arena(&self, arena_id: &str) -> Result<Arena, FetchError>;

    /// Lists the arenas the local participant owns, for selection UIs
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn own_arenas(&self) -> Result<Vec<ArenaRef>, FetchError>;
}

/// The authoritative record of wars
///
/// War lifecycle is server-owned; clients only observe it through
/// [`WarDirectory::war`] and nudge it through the creator operations.
pub trait WarDirectory {
    /// Fetches the current authoritative snapshot of a war
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the war does not exist or the request
    /// fails.
    fn war(&self, war_id: &str) -> Result<War, FetchError>;

    /// Creates a new war owned by the local participant
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn create_war(&self, request: CreateWar) -> Result<War, FetchError>;

    /// Starts a waiting war; creator only
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the war does not exist or the request
    /// fails.
    fn start_war(&self, war_id: &str) -> Result<War, FetchError>;

    /// Cancels a waiting war; creator only
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the war does not exist or the request
    /// fails.
    fn cancel_war(&self, war_id: &str) -> Result<War, FetchError>;

    /// Removes a participant from a waiting war; creator only
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the war does not exist or the request
    /// fails.
    fn remove_participant(&self, war_id: &str, participant_id: Id) -> Result<War, FetchError>;
}

/// Source of the logged-in participant's own profile
pub trait ProfileSource {
    /// Fetches the local participant's profile
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn me(&self) -> Result<Profile, FetchError>;
}

/// Source of the friend list used for issuing invitations
pub trait FriendSource {
    /// Lists the local participant's friends
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn friends(&self) -> Result<Vec<Profile>, FetchError>;

    /// Presence per friend id; absent means offline
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn online(&self) -> Result<HashMap<Id, bool>, FetchError>;
}

/// Source of past 1v1 results
pub trait HistorySource {
    /// Lists the local participant's finished battles, newest first
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails.
    fn battle_history(&self) -> Result<Vec<BattleRecord>, FetchError>;
}

/// Parameters for creating a war
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWar {
    /// The arena every warrior will play
    pub arena_id: String,
    /// Room capacity, bounds enforced server-side as well
    pub max_participants: usize,
    /// When the creator intends to start
    pub scheduled_start: SystemTime,
}

/// How a stored battle ended for the local participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// Local side scored strictly better
    Won,
    /// Opponent scored strictly better
    Lost,
    /// Identical correct count and accuracy
    Draw,
}

/// One finished 1v1 battle as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    /// Who the local participant played against
    pub opponent: Profile,
    /// The local participant's final summary
    pub local: ProgressSummary,
    /// The opponent's final summary
    pub peer: ProgressSummary,
    /// When the battle finished
    pub played_at: SystemTime,
}

impl BattleRecord {
    /// Replays the stored summaries into an outcome
    ///
    /// Uses the same comparison as live resolution, so history and live
    /// results never disagree.
    pub fn outcome(&self) -> BattleOutcome {
        match ranking::duel(&self.local, &self.peer) {
            std::cmp::Ordering::Less => BattleOutcome::Won,
            std::cmp::Ordering::Greater => BattleOutcome::Lost,
            std::cmp::Ordering::Equal => BattleOutcome::Draw,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn summary(correct: usize, accuracy: usize) -> ProgressSummary {
        ProgressSummary {
            correct,
            wrong: 10 - correct,
            remaining: 0,
            total_answered: 10,
            accuracy_percent: accuracy,
        }
    }

    fn record(local: ProgressSummary, peer: ProgressSummary) -> BattleRecord {
        BattleRecord {
            opponent: Profile::new("Rival"),
            local,
            peer,
            played_at: SystemTime::now(),
        }
    }

    #[test]
    fn test_outcome_won_on_more_correct() {
        assert_eq!(
            record(summary(7, 70), summary(5, 50)).outcome(),
            BattleOutcome::Won
        );
    }

    #[test]
    fn test_outcome_lost_on_accuracy_tiebreak() {
        assert_eq!(
            record(summary(6, 60), summary(6, 75)).outcome(),
            BattleOutcome::Lost
        );
    }

    #[test]
    fn test_outcome_draw_on_identical_keys() {
        assert_eq!(
            record(summary(6, 80), summary(6, 80)).outcome(),
            BattleOutcome::Draw
        );
    }
}
