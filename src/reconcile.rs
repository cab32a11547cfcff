//! Peer progress reconciliation
//!
//! Every competition room is a shared broadcast address, so each client
//! also receives its own progress echoes and, on a slow connection,
//! duplicated or reordered peer snapshots. The [`PeerTable`] absorbs the
//! raw stream of [`PeerUpdate`]s into one consistent view per peer.

use std::collections::HashMap;

use crate::{events::PeerUpdate, participant::Id, progress::ProgressSummary};

/// What applying a peer update did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The update changed the stored view of the peer
    Applied,
    /// The update was this client's own broadcast echoed back
    SelfEcho,
    /// The update repeated what was already stored
    Unchanged,
    /// The update was older than the stored snapshot and was rejected
    Stale,
}

/// The stored view of a single peer
#[derive(Debug, Clone, PartialEq)]
pub struct PeerProgressEntry {
    /// The peer's id
    pub participant_id: Id,
    /// The peer's display name, if any broadcast carried one
    pub display_name: Option<String>,
    /// The latest accepted progress snapshot
    pub progress: ProgressSummary,
    /// Value of the table clock when this entry was last changed
    pub last_updated: u64,
    /// Value of the table clock when this peer first appeared
    pub seq: u64,
}

/// Reconciled progress of every peer in the current competition room
///
/// Peers are discovered implicitly through their first broadcast; there
/// is no roster handshake. [`PeerTable::in_join_order`] therefore yields
/// peers in first-seen order, which downstream ranking relies on for
/// stable tie-breaking.
#[derive(Debug, Clone)]
pub struct PeerTable {
    local_id: Id,
    entries: HashMap<Id, PeerProgressEntry>,
    clock: u64,
}

impl PeerTable {
    /// Creates an empty table for the given local participant
    pub fn new(local_id: Id) -> Self {
        Self {
            local_id,
            entries: HashMap::new(),
            clock: 0,
        }
    }

    /// Applies one received peer update
    ///
    /// Self-echoes are dropped without touching the table. Updates that
    /// repeat the stored `correct`, `accuracy` and `totalAnswered` values
    /// are treated as duplicates. An update whose `totalAnswered` is lower
    /// than the stored one can only be a reordered older snapshot and is
    /// rejected.
    pub fn apply(&mut self, update: PeerUpdate) -> Outcome {
        if update.participant_id == self.local_id {
            return Outcome::SelfEcho;
        }

        match self.entries.get_mut(&update.participant_id) {
            Some(entry) => {
                if update.progress.total_answered < entry.progress.total_answered {
                    log::warn!(
                        "[SYNC] rejecting stale snapshot from {}: totalAnswered {} < {}",
                        update.participant_id,
                        update.progress.total_answered,
                        entry.progress.total_answered
                    );
                    return Outcome::Stale;
                }

                if update.progress.correct == entry.progress.correct
                    && update.progress.accuracy_percent == entry.progress.accuracy_percent
                    && update.progress.total_answered == entry.progress.total_answered
                {
                    return Outcome::Unchanged;
                }

                self.clock += 1;
                entry.progress = update.progress;
                entry.last_updated = self.clock;
                if update.display_name.is_some() {
                    entry.display_name = update.display_name;
                }
                Outcome::Applied
            }
            None => {
                self.clock += 1;
                log::info!("[SYNC] peer {} joined the room", update.participant_id);
                self.entries.insert(
                    update.participant_id,
                    PeerProgressEntry {
                        participant_id: update.participant_id,
                        display_name: update.display_name,
                        progress: update.progress,
                        last_updated: self.clock,
                        seq: self.clock,
                    },
                );
                Outcome::Applied
            }
        }
    }

    /// Returns the stored view of one peer, if seen
    pub fn get(&self, participant_id: Id) -> Option<&PeerProgressEntry> {
        self.entries.get(&participant_id)
    }

    /// All peers, ordered by when each was first seen
    pub fn in_join_order(&self) -> Vec<&PeerProgressEntry> {
        let mut peers: Vec<_> = self.entries.values().collect();
        peers.sort_by_key(|entry| entry.seq);
        peers
    }

    /// Number of distinct peers seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no peer has broadcast yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The local participant the table filters echoes for
    pub fn local_id(&self) -> Id {
        self.local_id
    }
}
