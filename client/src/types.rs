//! Data model shared across the client.

use ethers::types::{Address, U256};
use serde::Serialize;

/// Point-in-time, best-effort-consistent view of the authoritative state.
///
/// Reads are issued concurrently against "latest", so no two fields are
/// guaranteed to come from the same block; callers must tolerate transient
/// mismatches (e.g. a vote count one voter stale). Replaced wholesale on
/// every refresh, never mutated.
#[derive(Clone, Debug)]
pub struct ElectionSnapshot {
    pub admin: Address,
    pub voting_active: bool,
    pub election_id: u64,
    pub election_name: String,
    pub caller: Address,
    pub has_voted: bool,
    /// Token balance in minor units (18 decimals).
    pub token_balance: U256,
    pub results: Vec<Candidate>,
    pub archives: Vec<ArchiveRecord>,
    /// The archive list read failed and degraded to empty. Surfaced rather
    /// than hidden so callers can report the degraded state.
    pub archives_unavailable: bool,
}

impl ElectionSnapshot {
    /// Election title, matching the ledger's metadata when set.
    pub fn title(&self) -> String {
        if self.election_name.trim().is_empty() {
            format!("Election #{}", self.election_id)
        } else {
            format!("{} (#{})", self.election_name, self.election_id)
        }
    }
}

/// A registered candidate. Ids are assigned by the ledger in registration
/// order; only the ledger mutates `vote_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    pub vote_count: u64,
}

impl From<(U256, String, U256)> for Candidate {
    fn from((id, name, vote_count): (U256, String, U256)) -> Self {
        Self {
            id: id.low_u64(),
            name,
            vote_count: vote_count.low_u64(),
        }
    }
}

/// An entry of the ledger's append-only archive list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub cid: String,
    pub name: String,
    /// Unix seconds, as recorded by the ledger at commit time.
    pub timestamp: u64,
}

impl From<(String, String, U256)> for ArchiveRecord {
    fn from((cid, name, timestamp): (String, String, U256)) -> Self {
        Self {
            cid,
            name,
            timestamp: timestamp.low_u64(),
        }
    }
}

/// One historical vote, reconstructed from the event log. The voter address
/// only ever appears as a one-way digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub voter_hash: String,
    pub candidate_id: u64,
    pub tx_hash: String,
    pub block_number: u64,
}

/// Candidate entry as serialized into the archive document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveCandidate {
    pub id: u64,
    pub name: String,
    pub votes: u64,
}

/// The document uploaded to the content store. Fully deterministic given its
/// inputs apart from `date`; its content id is a pure function of the
/// serialized bytes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePayload {
    pub election_id: u64,
    pub name: String,
    /// RFC 3339 generation timestamp. The only non-deterministic field.
    pub date: String,
    pub candidates: Vec<ArchiveCandidate>,
    pub votes_count: u64,
    pub vote_receipts: Vec<VoteReceipt>,
}
