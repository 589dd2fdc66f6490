//! Batch reads of the authoritative state into one snapshot.

use tracing::warn;

use crate::error::ClientError;
use crate::session::Session;
use crate::types::{ArchiveRecord, Candidate, ElectionSnapshot};

/// Issue all reads concurrently and join them into an [`ElectionSnapshot`].
///
/// Partial results are never exposed: any core read failing fails the whole
/// snapshot with [`ClientError::Unavailable`]. The archive list is the one
/// exception: it degrades to an empty list with `archives_unavailable` set,
/// keeping the rest of the view usable.
pub async fn read_snapshot(session: &Session) -> Result<ElectionSnapshot, ClientError> {
    let caller = session.caller;

    // Calls are bound first so the joined futures borrow live values.
    let admin_call = session.election.admin();
    let active_call = session.election.voting_active();
    let voted_call = session.election.has_voted(caller);
    let balance_call = session.token.balance_of(caller);
    let results_call = session.election.get_results();
    let id_call = session.election.current_election_id();
    let name_call = session.election.current_election_name();

    let (admin, voting_active, has_voted, token_balance, results, election_id, election_name) =
        tokio::try_join!(
            admin_call.call(),
            active_call.call(),
            voted_call.call(),
            balance_call.call(),
            results_call.call(),
            id_call.call(),
            name_call.call(),
        )
        .map_err(|e| ClientError::Unavailable(e.to_string()))?;

    let (archives, archives_unavailable) = match session.election.get_archives().call().await {
        Ok(items) => (
            items.into_iter().map(ArchiveRecord::from).collect(),
            false,
        ),
        Err(err) => {
            warn!("archive list unavailable, degrading to empty: {err}");
            (Vec::new(), true)
        }
    };

    Ok(ElectionSnapshot {
        admin,
        voting_active,
        election_id: election_id.low_u64(),
        election_name,
        caller,
        has_voted,
        token_balance,
        results: results.into_iter().map(Candidate::from).collect(),
        archives,
        archives_unavailable,
    })
}
