//! Validation and submission of state-changing actions.
//!
//! Each user-triggerable action is a request object validated against the
//! current snapshot before anything touches the network. Submission is a
//! single signed transaction awaited to inclusion; on success nothing local
//! is mutated, callers re-read a fresh snapshot to observe the effect. On
//! failure the underlying rejection reason is surfaced verbatim and the
//! action is never retried automatically.

use ethers::contract::ContractCall;
use ethers::types::{U256, U64};
use tracing::info;

use crate::contracts::EthClient;
use crate::error::ClientError;
use crate::{eligibility, pipeline};
use crate::session::Session;
use crate::types::ElectionSnapshot;

/// A state-changing request against the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    AddCandidate { name: String },
    StartElection,
    EndElection,
    ResetElection,
    Vote { candidate_id: u64 },
    SetElectionMeta { id: u64, name: String },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddCandidate { .. } => "add-candidate",
            Action::StartElection => "start-election",
            Action::EndElection => "end-election",
            Action::ResetElection => "reset-election",
            Action::Vote { .. } => "vote",
            Action::SetElectionMeta { .. } => "set-election-meta",
        }
    }
}

/// Outcome of a confirmed transaction.
#[derive(Clone, Debug)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Check local preconditions against the current snapshot. Rejections here
/// never reach the network layer.
pub fn validate(action: &Action, snapshot: &ElectionSnapshot) -> Result<(), ClientError> {
    let is_admin = eligibility::evaluate(snapshot).is_admin;
    let gates = pipeline::gates(snapshot, is_admin);

    match action {
        Action::AddCandidate { name } => {
            if name.trim().is_empty() {
                return Err(ClientError::Validation("candidate name required".into()));
            }
            if !gates.add_candidate {
                return Err(ClientError::Validation(
                    "add-candidate requires the admin account and an inactive election".into(),
                ));
            }
        }
        Action::StartElection => {
            if !gates.start_election {
                return Err(ClientError::Validation(
                    "start-election requires the admin account, at least one candidate, and no active election".into(),
                ));
            }
        }
        Action::EndElection => {
            if !gates.end_election {
                return Err(ClientError::Validation(
                    "end-election requires the admin account and an active election".into(),
                ));
            }
        }
        Action::ResetElection => {
            if !gates.reset_election {
                return Err(ClientError::Validation(
                    "reset-election requires the admin account and an election to clear".into(),
                ));
            }
        }
        Action::Vote { candidate_id } => {
            if *candidate_id == 0 {
                return Err(ClientError::Validation(
                    "candidate id must be a positive integer".into(),
                ));
            }
            if !snapshot.results.iter().any(|c| c.id == *candidate_id) {
                return Err(ClientError::Validation(format!(
                    "unknown candidate id {candidate_id}"
                )));
            }
        }
        Action::SetElectionMeta { id, name } => {
            if *id == 0 {
                return Err(ClientError::Validation(
                    "election id must be a positive integer".into(),
                ));
            }
            if name.trim().is_empty() {
                return Err(ClientError::Validation("election name required".into()));
            }
        }
    }
    Ok(())
}

/// Validate, then submit one signed transaction and await inclusion.
///
/// `Vote` queries the required payment amount immediately before submission
/// and attaches it with the same call; staleness between query and send is
/// accepted since both hit the same "latest" view in quick succession.
pub async fn dispatch(
    session: &Session,
    snapshot: &ElectionSnapshot,
    action: &Action,
) -> Result<TxOutcome, ClientError> {
    validate(action, snapshot)?;
    info!("dispatching {}", action.name());

    let outcome = match action {
        Action::AddCandidate { name } => {
            send_and_confirm(session.election.add_candidate(name.trim().to_string())).await?
        }
        Action::StartElection => send_and_confirm(session.election.start_election()).await?,
        Action::EndElection => send_and_confirm(session.election.end_election()).await?,
        Action::ResetElection => send_and_confirm(session.election.reset_election()).await?,
        Action::Vote { candidate_id } => {
            let required = session
                .election
                .required_eth()
                .call()
                .await
                .map_err(|e| ClientError::Unavailable(e.to_string()))?;
            send_and_confirm(
                session
                    .election
                    .vote(U256::from(*candidate_id))
                    .value(required),
            )
            .await?
        }
        Action::SetElectionMeta { id, name } => {
            send_and_confirm(
                session
                    .election
                    .set_election_meta(U256::from(*id), name.trim().to_string()),
            )
            .await?
        }
    };

    info!("{} confirmed in tx {}", action.name(), outcome.tx_hash);
    Ok(outcome)
}

/// Send a call and wait for its receipt. A dropped transaction or a receipt
/// with status 0 both surface as [`ClientError::TransactionRejected`].
pub(crate) async fn send_and_confirm(
    call: ContractCall<EthClient, ()>,
) -> Result<TxOutcome, ClientError> {
    let pending = call
        .send()
        .await
        .map_err(|e| ClientError::TransactionRejected(e.to_string()))?;
    let receipt = pending
        .await
        .map_err(|e| ClientError::TransactionRejected(e.to_string()))?
        .ok_or_else(|| {
            ClientError::TransactionRejected("transaction was dropped before inclusion".into())
        })?;

    if receipt.status == Some(U64::zero()) {
        return Err(ClientError::TransactionRejected(format!(
            "transaction {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    Ok(TxOutcome {
        tx_hash: format!("{:#x}", receipt.transaction_hash),
        block_number: receipt.block_number.map(|b| b.as_u64()),
    })
}
