//! Election lifecycle stage and per-action enablement.
//!
//! Stages are derived from the snapshot only; every transition is an admin
//! action against the ledger. No timers, no internal transitions.

use crate::types::ElectionSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NoCandidates,
    CandidatesReady,
    ElectionActive,
}

/// Which state-changing actions are currently enabled.
///
/// `reset_election` is a destructive action: it clears all candidates and
/// invalidates the current token distribution, so callers must require an
/// explicit confirmation before dispatching it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionGates {
    pub add_candidate: bool,
    pub start_election: bool,
    pub end_election: bool,
    pub reset_election: bool,
}

pub fn stage(snapshot: &ElectionSnapshot) -> Stage {
    if snapshot.voting_active {
        Stage::ElectionActive
    } else if snapshot.results.is_empty() {
        Stage::NoCandidates
    } else {
        Stage::CandidatesReady
    }
}

pub fn gates(snapshot: &ElectionSnapshot, is_admin: bool) -> ActionGates {
    let stage = stage(snapshot);
    let has_candidates = !snapshot.results.is_empty();
    ActionGates {
        add_candidate: is_admin && matches!(stage, Stage::NoCandidates | Stage::CandidatesReady),
        start_election: is_admin && stage == Stage::CandidatesReady,
        end_election: is_admin && stage == Stage::ElectionActive,
        reset_election: is_admin && (has_candidates || snapshot.voting_active),
    }
}

/// One-line stage description for status reporting.
pub fn summary(snapshot: &ElectionSnapshot) -> String {
    let count = snapshot.results.len();
    match stage(snapshot) {
        Stage::ElectionActive => format!("Election active ({count} candidates)."),
        Stage::CandidatesReady => format!("Candidates ready ({count} total)."),
        Stage::NoCandidates => "Add candidates to define the election.".to_string(),
    }
}
