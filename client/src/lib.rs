//! Client-side orchestration for a token-gated election whose authoritative
//! state lives in an on-chain contract.
//!
//! The library keeps a local view consistent with the ledger (one immutable
//! [`ElectionSnapshot`](types::ElectionSnapshot) per refresh), derives who may
//! act and when, submits signed transactions for state changes, and, once an
//! election ends, rebuilds the full vote history from the event log and
//! archives it to a content-addressed store before committing the content id
//! back on-chain.

pub mod archive;
pub mod contracts;
pub mod dispatch;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod reader;
pub mod session;
pub mod store;
pub mod types;

pub use archive::{run_archival, ArchiveOutcome};
pub use dispatch::{dispatch, Action, TxOutcome};
pub use error::ClientError;
pub use session::{Session, SessionConfig};
pub use store::IpfsStore;
pub use types::ElectionSnapshot;
