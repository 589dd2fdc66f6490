//! Contract bindings for the election ledger.

use ethers::middleware::SignerMiddleware;
use ethers::prelude::abigen;
use ethers::providers::{Http, Provider};
use ethers::signers::LocalWallet;

/// Signing HTTP client every contract handle is bound to.
pub type EthClient = SignerMiddleware<Provider<Http>, LocalWallet>;

abigen!(
    Election,
    r#"[
        struct CandidateResult { uint256 id; string name; uint256 voteCount; }
        struct ArchiveEntry { string cid; string name; uint256 timestamp; }
        function admin() external view returns (address)
        function votingActive() external view returns (bool)
        function hasVoted(address voter) external view returns (bool)
        function getResults() external view returns (CandidateResult[])
        function currentElectionId() external view returns (uint256)
        function currentElectionName() external view returns (string)
        function getArchives() external view returns (ArchiveEntry[])
        function requiredEth() external view returns (uint256)
        function addCandidate(string name) external
        function startElection() external
        function endElection() external
        function resetElection() external
        function vote(uint256 candidateId) external payable
        function setElectionMeta(uint256 electionId, string name) external
        function archiveResults(string cid) external
        event VoteCasted(address indexed voter, uint256 candidateId)
    ]"#
);

abigen!(
    VotingToken,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
    ]"#
);
