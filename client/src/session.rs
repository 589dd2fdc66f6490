//! Explicit session object owning the connection handles.
//!
//! Nothing in this crate is process-global: a [`Session`] is built per
//! invocation from [`SessionConfig`] and passed to each component. An
//! account or network change means building a new session.

use std::path::PathBuf;
use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;

use crate::contracts::{Election, EthClient, VotingToken};
use crate::error::ClientError;

/// Connection parameters, typically sourced from CLI args or environment.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub rpc_url: String,
    /// File containing the caller's hex-encoded private key.
    pub key_path: PathBuf,
    pub election_address: Address,
    pub token_address: Address,
}

/// A connected session: signing client, caller address, contract handles.
pub struct Session {
    pub client: Arc<EthClient>,
    pub caller: Address,
    pub election: Election<EthClient>,
    pub token: VotingToken<EthClient>,
}

impl Session {
    /// Connect to the ledger and bind the contract handles.
    ///
    /// Fails with [`ClientError::Unavailable`]: callers treat that as "not
    /// ready" and re-attempt after reconnection, not as fatal.
    pub async fn connect(config: &SessionConfig) -> Result<Self, ClientError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| {
            ClientError::Unavailable(format!("invalid rpc url {}: {e}", config.rpc_url))
        })?;

        let raw = std::fs::read_to_string(&config.key_path).map_err(|e| {
            ClientError::Unavailable(format!(
                "failed to read key file {}: {e}",
                config.key_path.display()
            ))
        })?;
        let wallet: LocalWallet = raw
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| ClientError::Unavailable(format!("invalid private key: {e}")))?;

        // Fetches the chain id from the node so signatures match the network.
        let client = SignerMiddleware::new_with_provider_chain(provider, wallet)
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;
        let caller = client.signer().address();
        let client = Arc::new(client);

        let election = Election::new(config.election_address, Arc::clone(&client));
        let token = VotingToken::new(config.token_address, Arc::clone(&client));

        Ok(Self {
            client,
            caller,
            election,
            token,
        })
    }
}
