//! Snapshot reads against a stubbed JSON-RPC node.

use std::sync::Arc;

use ethers::abi::Token;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use election_client::contracts::{Election, VotingToken};
use election_client::reader;
use election_client::session::Session;

fn selector(signature: &str) -> String {
    hex::encode(&keccak256(signature.as_bytes())[..4])
}

fn rpc_result(id: serde_json::Value, result: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    }))
}

fn rpc_error(id: serde_json::Value, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": -32000, "message": message },
    }))
}

/// Answers every read with a fixed healthy state, except the archive list
/// which reverts.
struct LedgerStub;

impl Respond for LedgerStub {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(v) => v,
            Err(_) => return ResponseTemplate::new(400),
        };
        let id = body["id"].clone();

        match body["method"].as_str() {
            Some("eth_chainId") => rpc_result(id, "0x539".to_string()),
            Some("eth_call") => {
                let data = body["params"][0]["data"].as_str().unwrap_or_default();
                let sel = data
                    .trim_start_matches("0x")
                    .get(..8)
                    .unwrap_or_default()
                    .to_string();

                if sel == selector("getArchives()") {
                    return rpc_error(id, "execution reverted");
                }

                let tokens = if sel == selector("admin()") {
                    vec![Token::Address(Address::from_low_u64_be(0xA))]
                } else if sel == selector("votingActive()") {
                    vec![Token::Bool(true)]
                } else if sel == selector("hasVoted(address)") {
                    vec![Token::Bool(false)]
                } else if sel == selector("balanceOf(address)") {
                    vec![Token::Uint(U256::exp10(18))]
                } else if sel == selector("getResults()") {
                    vec![Token::Array(Vec::new())]
                } else if sel == selector("currentElectionId()") {
                    vec![Token::Uint(U256::from(7u64))]
                } else if sel == selector("currentElectionName()") {
                    vec![Token::String("Board 2026".to_string())]
                } else {
                    return rpc_error(id, "unexpected call");
                };

                let encoded = ethers::abi::encode(&tokens);
                rpc_result(id, format!("0x{}", hex::encode(encoded)))
            }
            _ => rpc_error(id, "unexpected method"),
        }
    }
}

fn stub_session(server: &MockServer) -> Session {
    let provider = Provider::<Http>::try_from(server.uri()).unwrap();
    let wallet: LocalWallet =
        "0000000000000000000000000000000000000000000000000000000000000001"
            .parse::<LocalWallet>()
            .unwrap()
            .with_chain_id(0x539u64);
    let caller = wallet.address();
    let client = Arc::new(SignerMiddleware::new(provider, wallet));

    Session {
        caller,
        election: Election::new(Address::zero(), Arc::clone(&client)),
        token: VotingToken::new(Address::from_low_u64_be(1), Arc::clone(&client)),
        client,
    }
}

#[tokio::test]
async fn failing_archive_read_degrades_to_empty_list_with_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(LedgerStub)
        .mount(&server)
        .await;

    let session = stub_session(&server);
    let snapshot = reader::read_snapshot(&session).await.unwrap();

    assert!(snapshot.archives.is_empty());
    assert!(snapshot.archives_unavailable);

    // The rest of the view stays usable.
    assert!(snapshot.voting_active);
    assert!(!snapshot.has_voted);
    assert_eq!(snapshot.election_id, 7);
    assert_eq!(snapshot.election_name, "Board 2026");
    assert_eq!(snapshot.token_balance, U256::exp10(18));
}
