//! Results archival: deterministic payload build, idempotent upload with a
//! single retry, and the on-chain commit that makes the archive durable.

use tracing::{error, info, warn};

use crate::dispatch::{send_and_confirm, TxOutcome};
use crate::error::ClientError;
use crate::events;
use crate::session::Session;
use crate::store::IpfsStore;
use crate::types::{ArchiveCandidate, ArchivePayload, Candidate, VoteReceipt};

/// Result of a completed archival run.
#[derive(Clone, Debug)]
pub struct ArchiveOutcome {
    pub cid: String,
    pub gateway_url: String,
    /// Browsable path inside the store, when mirroring succeeded.
    pub mirrored_path: Option<String>,
    pub registered_tx: String,
}

/// Assemble the archive document. Deterministic given its inputs apart from
/// the generation timestamp. A blank election name makes the archive
/// unusable, so it is rejected before anything is uploaded.
pub fn build_payload(
    election_id: u64,
    election_name: &str,
    candidates: &[Candidate],
    vote_receipts: Vec<VoteReceipt>,
) -> Result<ArchivePayload, ClientError> {
    if election_name.trim().is_empty() {
        return Err(ClientError::EmptyMetadata);
    }

    Ok(ArchivePayload {
        election_id,
        name: election_name.to_string(),
        date: chrono::Utc::now().to_rfc3339(),
        candidates: candidates
            .iter()
            .map(|c| ArchiveCandidate {
                id: c.id,
                name: c.name.clone(),
                votes: c.vote_count,
            })
            .collect(),
        votes_count: vote_receipts.len() as u64,
        vote_receipts,
    })
}

/// Canonical byte form of the payload, as uploaded to the store.
pub fn payload_bytes(payload: &ArchivePayload) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec_pretty(payload)
        .map_err(|e| ClientError::Validation(format!("failed to serialize archive payload: {e}")))
}

/// Probe and upload, with exactly one retry on any store failure.
///
/// Two attempts total, never a third: a single retry resolves the common
/// daemon-mid-restart case without risking a retry storm.
pub async fn upload_with_retry(store: &IpfsStore, bytes: &[u8]) -> Result<String, ClientError> {
    match attempt_upload(store, bytes).await {
        Ok(cid) => Ok(cid),
        Err(first) => {
            warn!("store upload failed, retrying once: {first}");
            attempt_upload(store, bytes).await
        }
    }
}

async fn attempt_upload(store: &IpfsStore, bytes: &[u8]) -> Result<String, ClientError> {
    store.probe().await?;
    store.add(bytes.to_vec()).await
}

/// Commit a content identifier into the ledger's append-only archive list.
/// Once this confirms, the archive stays discoverable through the ledger
/// regardless of the store's availability.
pub async fn register_archive(session: &Session, cid: &str) -> Result<TxOutcome, ClientError> {
    send_and_confirm(session.election.archive_results(cid.to_string())).await
}

/// Full archival pipeline: gather current results plus the reconstructed
/// vote history, build the payload, upload it, mirror it best-effort, and
/// register the content id on-chain.
pub async fn run_archival(
    session: &Session,
    store: &IpfsStore,
) -> Result<ArchiveOutcome, ClientError> {
    let id_call = session.election.current_election_id();
    let name_call = session.election.current_election_name();
    let results_call = session.election.get_results();

    let ((election_id, election_name, results), receipts) = tokio::try_join!(
        async {
            tokio::try_join!(id_call.call(), name_call.call(), results_call.call())
                .map_err(|e| ClientError::Unavailable(e.to_string()))
        },
        events::reconstruct_votes(session),
    )?;

    let candidates: Vec<Candidate> = results.into_iter().map(Candidate::from).collect();
    let payload = build_payload(election_id.low_u64(), &election_name, &candidates, receipts)?;
    let bytes = payload_bytes(&payload)?;

    info!(
        "archiving \"{}\" ({} candidates, {} votes)",
        payload.name,
        payload.candidates.len(),
        payload.votes_count
    );
    let cid = upload_with_retry(store, &bytes).await?;
    info!("results uploaded to content store: {cid}");

    // Mirroring is cosmetic; its failure is logged and never propagated.
    let mirrored_path = match store.mirror(&cid, &payload.name, payload.election_id).await {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("archive uploaded but not mirrored: {err}");
            None
        }
    };

    let registered_tx = match register_archive(session, &cid).await {
        Ok(outcome) => outcome.tx_hash,
        Err(err) => {
            // The uploaded object stays fetchable by identifier but is not
            // linked from the ledger; no reconciliation sweep exists, so the
            // cid is reported for manual follow-up.
            error!("uploaded archive {cid} could not be registered on-chain (orphaned)");
            return Err(err);
        }
    };

    Ok(ArchiveOutcome {
        gateway_url: store.gateway_url(&cid),
        cid,
        mirrored_path,
        registered_tx,
    })
}
