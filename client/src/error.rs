use thiserror::Error;

/// Failure taxonomy for every user-initiated operation.
///
/// Validation and metadata errors are raised before any network call.
/// Transaction and store errors carry the underlying message verbatim so the
/// reported status line is usable for diagnosis.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable connection, or the contracts are not resolvable for the
    /// active network. Non-fatal: block actions and re-attempt after
    /// reconnection.
    #[error("ledger state unavailable: {0}")]
    Unavailable(String),

    /// Missing or invalid local input, rejected before submission.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A signed call failed or was reverted. Never retried automatically;
    /// transactions are not idempotent.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    /// The event log could not serve the requested block range. Retryable.
    #[error("event log unavailable: {0}")]
    LogUnavailable(String),

    /// The content store failed its liveness probe or the request never
    /// reached it.
    #[error("content store unreachable: {0}")]
    StoreUnreachable(String),

    /// The content store answered with a non-success status. The response
    /// body is kept for diagnosis.
    #[error("content store rejected request ({status}): {body}")]
    StoreRejected { status: u16, body: String },

    /// Archival was attempted without an election name. An anonymous archive
    /// is unusable and must not be produced.
    #[error("election name is empty: set election metadata before archiving")]
    EmptyMetadata,
}
