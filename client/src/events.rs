//! Vote history reconstruction from the append-only event log.
//!
//! The aggregate state only exposes tallies; replaying `VoteCasted` events
//! from genesis is the one reliable way to recover per-voter history.

use ethers::contract::LogMeta;
use ethers::providers::Middleware;
use ethers::types::Address;
use ethers::utils::keccak256;
use tracing::info;

use crate::contracts::VoteCastedFilter;
use crate::error::ClientError;
use crate::session::Session;
use crate::types::VoteReceipt;

/// Replay the full block range (genesis to latest at call time) and rebuild
/// the ordered set of cast votes. Fails with [`ClientError::LogUnavailable`],
/// which callers should treat as retryable.
pub async fn reconstruct_votes(session: &Session) -> Result<Vec<VoteReceipt>, ClientError> {
    let latest = session
        .client
        .get_block_number()
        .await
        .map_err(|e| ClientError::LogUnavailable(e.to_string()))?;

    let logs = session
        .election
        .vote_casted_filter()
        .from_block(0u64)
        .to_block(latest)
        .query_with_meta()
        .await
        .map_err(|e| ClientError::LogUnavailable(e.to_string()))?;

    let receipts = receipts_from_logs(logs);
    info!(
        "reconstructed {} vote(s) from blocks 0..={latest}",
        receipts.len()
    );
    Ok(receipts)
}

/// Map raw event logs to receipts, preserving log order. Pure, so replaying
/// an unchanged log slice yields an identical sequence.
pub fn receipts_from_logs(logs: Vec<(VoteCastedFilter, LogMeta)>) -> Vec<VoteReceipt> {
    logs.into_iter()
        .map(|(event, meta)| VoteReceipt {
            voter_hash: hash_voter_address(event.voter),
            candidate_id: event.candidate_id.low_u64(),
            tx_hash: format!("{:#x}", meta.transaction_hash),
            block_number: meta.block_number.as_u64(),
        })
        .collect()
}

/// One-way digest of a voter address: keccak-256 over the 20 raw address
/// bytes. Raw addresses must never appear in an archive.
pub fn hash_voter_address(voter: Address) -> String {
    format!("0x{}", hex::encode(keccak256(voter.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{H256, U256, U64};

    fn meta(block: u64, tx_byte: u8) -> LogMeta {
        LogMeta {
            address: Address::zero(),
            block_number: U64::from(block),
            block_hash: H256::zero(),
            transaction_hash: H256::from_low_u64_be(tx_byte as u64),
            transaction_index: U64::zero(),
            log_index: U256::zero(),
        }
    }

    #[test]
    fn mapping_preserves_log_order_and_is_idempotent() {
        let logs = vec![
            (
                VoteCastedFilter {
                    voter: Address::from_low_u64_be(1),
                    candidate_id: U256::from(2u64),
                },
                meta(10, 1),
            ),
            (
                VoteCastedFilter {
                    voter: Address::from_low_u64_be(2),
                    candidate_id: U256::from(1u64),
                },
                meta(11, 2),
            ),
        ];

        let first = receipts_from_logs(logs.clone());
        let second = receipts_from_logs(logs);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].candidate_id, 2);
        assert_eq!(first[0].block_number, 10);
        assert_eq!(first[1].candidate_id, 1);
        assert_eq!(first[1].block_number, 11);
    }

    #[test]
    fn voter_hash_is_deterministic_and_opaque() {
        let voter = Address::from_low_u64_be(0xABCD);
        let hash = hash_voter_address(voter);
        assert_eq!(hash, hash_voter_address(voter));
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
        assert_ne!(hash, format!("{voter:#x}"));
        assert_ne!(hash, hash_voter_address(Address::from_low_u64_be(0xABCE)));
    }

    #[test]
    fn voter_hash_digests_raw_address_bytes() {
        let voter = Address::from_low_u64_be(0xABCD);
        let hash = hash_voter_address(voter);
        assert_eq!(hash, format!("0x{}", hex::encode(keccak256(voter.as_bytes()))));
        // Hashing the hex string form would give a different digest.
        let string_digest = keccak256(format!("{voter:#x}").as_bytes());
        assert_ne!(hash, format!("0x{}", hex::encode(string_digest)));
    }
}
