//! Ranking and outcome resolution
//!
//! Every client resolves the outcome locally from its own [`AnswerSheet`]
//! and the reconciled [`PeerTable`]; no authority hands down a result.
//! Because every snapshot is absolute, all clients that have seen the
//! same broadcasts compute the same ranking.
//!
//! [`AnswerSheet`]: crate::progress::AnswerSheet

use serde::{Deserialize, Serialize};

use crate::{
    participant::Id, progress::ProgressSummary, reconcile::PeerTable, TruncatedVec,
};

/// Which kind of competition is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A 1v1 battle: resolves only when both sides finish
    OneVsOne,
    /// An N-way war: resolves when the local participant finishes
    War,
}

/// Where the competition stands from this client's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionState {
    /// The local participant still has questions left
    InProgress,
    /// The local participant finished but some peer has not
    WaitingForPeers,
    /// The outcome is final
    Resolved,
}

/// The resolved winner of a 1v1 battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// One side scored strictly better
    Participant(Id),
    /// Both sides ended with identical correct count and accuracy
    Draw,
}

/// One participant's entry into the ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Contender {
    /// The participant being ranked
    pub participant_id: Id,
    /// Display name for leaderboard rendering, if known
    pub display_name: Option<String>,
    /// The participant's latest progress snapshot
    pub progress: ProgressSummary,
}

/// A contender together with its 1-based rank
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// The ranked contender
    pub contender: Contender,
    /// 1-based position; contenders with equal keys still get distinct
    /// consecutive ranks, earlier joiner first
    pub rank: usize,
}

/// The full locally-computed outcome of a competition
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Whether the outcome is provisional or final
    pub state: CompetitionState,
    /// All contenders ordered best to worst
    pub ranking: Vec<Standing>,
    /// The 1v1 winner, present only for a resolved [`Mode::OneVsOne`]
    pub winner: Option<Winner>,
}

impl Resolution {
    /// The best `limit` standings, for leaderboard display
    pub fn top(&self, limit: usize) -> TruncatedVec<Standing> {
        TruncatedVec::new(self.ranking.iter().cloned(), limit, self.ranking.len())
    }

    /// The standings shown on the live leaderboard, capped at the
    /// default display limit
    pub fn leaderboard(&self) -> TruncatedVec<Standing> {
        self.top(crate::constants::leaderboard::TOP_LIMIT)
    }
}

/// Sort key ordering: more correct first, accuracy breaks ties
fn better(a: &ProgressSummary, b: &ProgressSummary) -> std::cmp::Ordering {
    b.correct
        .cmp(&a.correct)
        .then(b.accuracy_percent.cmp(&a.accuracy_percent))
}

/// Compares two finished summaries head to head
///
/// `Less` means `local` ranks ahead of `peer`. Used both for live 1v1
/// resolution and for replaying stored battle records.
pub fn duel(local: &ProgressSummary, peer: &ProgressSummary) -> std::cmp::Ordering {
    better(local, peer)
}

/// Computes the current [`Resolution`] for the local participant
///
/// The field is assembled local-first, then peers in first-seen order;
/// the sort is stable, so contenders with identical keys keep that
/// order. In [`Mode::OneVsOne`] the outcome is final only once the local
/// side has finished, at least one peer has been seen, and every seen
/// peer has finished. In [`Mode::War`] the local participant's run is
/// final as soon as it finishes; peers keep reshuffling the board as
/// their snapshots arrive.
pub fn resolve(mode: Mode, local: Contender, peers: &PeerTable) -> Resolution {
    let mut field = vec![local.clone()];
    field.extend(peers.in_join_order().into_iter().map(|entry| Contender {
        participant_id: entry.participant_id,
        display_name: entry.display_name.clone(),
        progress: entry.progress,
    }));
    field.sort_by(|a, b| better(&a.progress, &b.progress));

    let ranking: Vec<Standing> = field
        .into_iter()
        .enumerate()
        .map(|(index, contender)| Standing {
            contender,
            rank: index + 1,
        })
        .collect();

    let all_peers_finished = peers
        .in_join_order()
        .iter()
        .all(|entry| entry.progress.finished());

    let state = match mode {
        Mode::OneVsOne => {
            if !local.progress.finished() {
                CompetitionState::InProgress
            } else if peers.is_empty() || !all_peers_finished {
                CompetitionState::WaitingForPeers
            } else {
                CompetitionState::Resolved
            }
        }
        Mode::War => {
            if local.progress.finished() {
                CompetitionState::Resolved
            } else {
                CompetitionState::InProgress
            }
        }
    };

    let winner = match (mode, state) {
        (Mode::OneVsOne, CompetitionState::Resolved) => {
            let first = &ranking[0].contender;
            let second = &ranking[1].contender;
            if first.progress.correct == second.progress.correct
                && first.progress.accuracy_percent == second.progress.accuracy_percent
            {
                Some(Winner::Draw)
            } else {
                Some(Winner::Participant(first.participant_id))
            }
        }
        _ => None,
    };

    if state == CompetitionState::Resolved {
        log::info!(
            "[SYNC] competition resolved with {} contenders",
            ranking.len()
        );
    }

    Resolution {
        state,
        ranking,
        winner,
    }
}
