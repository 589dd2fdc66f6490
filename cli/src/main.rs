mod parsers;

use anyhow::{Context, Result};
use clap::Parser;
use ethers::types::Address;
use ethers::utils::format_units;
use std::path::PathBuf;
use tracing::info;

use election_client::{
    archive, dispatch::dispatch, eligibility, pipeline, reader, Action, ElectionSnapshot,
    IpfsStore, Session, SessionConfig,
};
use parsers::parse_address;

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, env, default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    #[arg(long, env, help = "File containing the caller's hex private key")]
    pub key_path: PathBuf,

    #[arg(long, env, value_parser = parse_address)]
    pub election_address: Address,

    #[arg(long, env, value_parser = parse_address)]
    pub token_address: Address,

    #[arg(long, env, default_value = "http://127.0.0.1:5001")]
    pub ipfs_api: String,

    #[arg(long, env, default_value = "http://127.0.0.1:8080")]
    pub ipfs_gateway: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    /// Show the current snapshot: eligibility, pipeline stage, results, archives.
    Status,
    /// Show the current candidate list with vote counts.
    Results,
    /// List archived results, newest first, with gateway links.
    Archives,
    /// Register a new candidate (admin, inactive election only).
    AddCandidate {
        #[arg(long)]
        name: String,
    },
    /// Open voting (admin, requires at least one candidate).
    StartElection,
    /// Close voting and archive the results to the content store.
    EndElection {
        #[arg(long, help = "Skip the archival pipeline after ending")]
        no_archive: bool,
    },
    /// Clear all candidates and invalidate the current token distribution.
    ResetElection {
        #[arg(long, help = "Required: reset is destructive")]
        yes: bool,
    },
    /// Cast a vote. The required payment is queried and attached automatically.
    Vote {
        #[arg(long)]
        candidate_id: u64,
    },
    /// Set the election id and name used for display and archives (admin).
    SetElectionMeta {
        #[arg(long)]
        id: u64,

        #[arg(long)]
        name: String,
    },
    /// Build, upload, and register a results archive for the current election.
    ArchiveResults,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SessionConfig {
        rpc_url: cli.rpc_url.clone(),
        key_path: cli.key_path.clone(),
        election_address: cli.election_address,
        token_address: cli.token_address,
    };
    let store = IpfsStore::new(cli.ipfs_api.clone(), cli.ipfs_gateway.clone());

    let session = Session::connect(&config).await?;
    info!("connected as {:#x}", session.caller);

    match cli.command {
        Commands::Status => {
            let snapshot = reader::read_snapshot(&session).await?;
            print_status(&snapshot, &store);
        }
        Commands::Results => {
            let snapshot = reader::read_snapshot(&session).await?;
            print_candidates(&snapshot);
        }
        Commands::Archives => {
            let snapshot = reader::read_snapshot(&session).await?;
            print_archives(&snapshot, &store);
        }
        Commands::AddCandidate { name } => {
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(&session, &snapshot, &Action::AddCandidate { name: name.clone() }).await?;
            println!("Candidate added: {name}");
            let snapshot = reader::read_snapshot(&session).await?;
            print_candidates(&snapshot);
        }
        Commands::StartElection => {
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(&session, &snapshot, &Action::StartElection).await?;
            println!("Election started.");
            let snapshot = reader::read_snapshot(&session).await?;
            print_status(&snapshot, &store);
        }
        Commands::EndElection { no_archive } => {
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(&session, &snapshot, &Action::EndElection).await?;
            println!("Election ended.");

            if !no_archive {
                let outcome = archive::run_archival(&session, &store)
                    .await
                    .context("auto-archive failed after the election was ended")?;
                println!("Results archived: {}", outcome.cid);
                println!("Gateway: {}", outcome.gateway_url);
                if let Some(path) = outcome.mirrored_path {
                    println!("Mirrored in store files: {path}");
                }
            }

            let snapshot = reader::read_snapshot(&session).await?;
            print_archives(&snapshot, &store);
        }
        Commands::ResetElection { yes } => {
            if !yes {
                anyhow::bail!(
                    "reset clears all candidates, ends any active election, and issues new voting tokens; pass --yes to confirm"
                );
            }
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(&session, &snapshot, &Action::ResetElection).await?;
            println!("Election reset. Add candidates to begin a new one.");
        }
        Commands::Vote { candidate_id } => {
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(&session, &snapshot, &Action::Vote { candidate_id }).await?;
            println!("Vote cast for candidate ID: {candidate_id}. (fee paid)");
            let snapshot = reader::read_snapshot(&session).await?;
            print_candidates(&snapshot);
        }
        Commands::SetElectionMeta { id, name } => {
            let snapshot = reader::read_snapshot(&session).await?;
            dispatch(
                &session,
                &snapshot,
                &Action::SetElectionMeta {
                    id,
                    name: name.clone(),
                },
            )
            .await?;
            println!("Election meta set: #{id} - {name}");
        }
        Commands::ArchiveResults => {
            let outcome = archive::run_archival(&session, &store).await?;
            println!("Results archived: {}", outcome.cid);
            println!("Gateway: {}", outcome.gateway_url);
            if let Some(path) = outcome.mirrored_path {
                println!("Mirrored in store files: {path}");
            }
        }
    }

    Ok(())
}

fn print_status(snapshot: &ElectionSnapshot, store: &IpfsStore) {
    let elig = eligibility::evaluate(snapshot);
    let gates = pipeline::gates(snapshot, elig.is_admin);

    let balance = format_units(snapshot.token_balance, 18)
        .unwrap_or_else(|_| snapshot.token_balance.to_string());

    println!("Account:       {:#x}", snapshot.caller);
    println!(
        "Admin:         {:#x} (you: {})",
        snapshot.admin,
        if elig.is_admin { "yes" } else { "no" }
    );
    println!(
        "Election:      {} - {}",
        if snapshot.voting_active { "Active" } else { "Inactive" },
        snapshot.title()
    );
    println!("Token balance: {balance}");
    println!(
        "Has voted:     {}",
        if snapshot.has_voted { "yes" } else { "no" }
    );
    println!("Pipeline:      {}", pipeline::summary(snapshot));

    match elig.ineligibility_message() {
        None => println!("Voting:        eligible ({})", eligibility::FEE_NOTICE),
        Some(message) => println!("Voting:        unavailable ({message})"),
    }

    if elig.is_admin {
        let mut enabled = Vec::new();
        if gates.add_candidate {
            enabled.push("add-candidate");
        }
        if gates.start_election {
            enabled.push("start-election");
        }
        if gates.end_election {
            enabled.push("end-election");
        }
        if gates.reset_election {
            enabled.push("reset-election");
        }
        println!(
            "Admin actions: {}",
            if enabled.is_empty() {
                "none".to_string()
            } else {
                enabled.join(", ")
            }
        );
    }

    print_candidates(snapshot);
    print_archives(snapshot, store);
}

fn print_candidates(snapshot: &ElectionSnapshot) {
    if snapshot.results.is_empty() {
        println!("No candidates yet.");
        return;
    }
    println!("Candidates:");
    for candidate in &snapshot.results {
        println!(
            "  ID: {}, Name: {}, Votes: {}",
            candidate.id, candidate.name, candidate.vote_count
        );
    }
}

fn print_archives(snapshot: &ElectionSnapshot, store: &IpfsStore) {
    if snapshot.archives_unavailable {
        println!("Archive list is currently unavailable.");
        return;
    }
    if snapshot.archives.is_empty() {
        println!("No archives yet.");
        return;
    }
    println!("Archives (newest first):");
    for record in snapshot.archives.iter().rev() {
        let date = chrono::DateTime::from_timestamp(record.timestamp as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        println!(
            "  {} | {} | {}",
            record.name,
            date,
            store.gateway_url(&record.cid)
        );
    }
}
