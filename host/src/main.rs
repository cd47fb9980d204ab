//! pong-prover CLI: prove a match log inside the zkVM, or verify a
//! previously saved proof.
//!
//! Usage:
//!   pong-prover prove <log.json> [--format composite|succinct|groth16] [--out proof.json]
//!   pong-prover verify <proof.json>
//!
//! Exits non-zero when the log is rejected or a proof fails verification.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use host::{generate_pong_proof, load_log_file, verify_pong_proof, PongProof, ReceiptKind};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pong-prover")]
#[command(about = "Prove and verify pong match logs with RISC Zero")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a match log inside the zkVM and emit a proof
    Prove {
        /// Path to the CompactLog JSON file
        log: PathBuf,
        /// Receipt format
        #[arg(long, default_value_t)]
        format: ReceiptKind,
        /// Write the full proof (receipt included) to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Verify a previously generated proof file
    Verify {
        /// Path to the proof JSON file
        proof: PathBuf,
    },
}

/// Shell-friendly summary printed to stdout; the receipt itself is only
/// written with `--out`.
#[derive(Serialize)]
struct ProofSummary {
    receipt_size_bytes: usize,
    journal: String,
    image_id: String,
    left_score: u32,
    right_score: u32,
    log_hash: String,
    events_len: u32,
    fair: bool,
    reason: Option<String>,
    game_id: u32,
    receipt_kind: String,
}

fn summarize(proof: &PongProof) -> Result<ProofSummary> {
    let receipt_bytes = bincode::serialize(&proof.receipt)?;
    Ok(ProofSummary {
        receipt_size_bytes: receipt_bytes.len(),
        journal: hex::encode(bincode::serialize(&proof.receipt.journal)?),
        image_id: host::image_id_hex(),
        left_score: proof.left_score,
        right_score: proof.right_score,
        log_hash: hex::encode(proof.log_hash),
        events_len: proof.events_len,
        fair: proof.fair,
        reason: proof.reason.clone(),
        game_id: proof.game_id,
        receipt_kind: proof.receipt_kind.to_string(),
    })
}

fn prove(log_path: &PathBuf, format: ReceiptKind, out: Option<&PathBuf>) -> Result<bool> {
    let log = load_log_file(log_path)?;
    eprintln!(
        "Loaded {} events from {} (game {})",
        log.events.len(),
        log_path.display(),
        log.game_id
    );

    let proof = generate_pong_proof(&log, format)?;
    verify_pong_proof(&proof).context("self-check of the fresh proof failed")?;

    if let Some(path) = out {
        fs::write(path, serde_json::to_vec(&proof)?)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Proof written to {}", path.display());
    }

    let summary = summarize(&proof)?;
    if proof.fair {
        eprintln!(
            "FAIR match: {}-{} over {} events",
            proof.left_score, proof.right_score, proof.events_len
        );
    } else {
        eprintln!(
            "UNFAIR match: {}",
            proof.reason.as_deref().unwrap_or("unknown")
        );
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(proof.fair)
}

fn verify(proof_path: &PathBuf) -> Result<bool> {
    let raw = fs::read_to_string(proof_path)
        .with_context(|| format!("reading {}", proof_path.display()))?;
    let proof: PongProof =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", proof_path.display()))?;

    verify_pong_proof(&proof)?;

    if proof.fair {
        eprintln!(
            "Receipt valid. FAIR match: {}-{} (game {})",
            proof.left_score, proof.right_score, proof.game_id
        );
    } else {
        eprintln!(
            "Receipt valid. UNFAIR match: {}",
            proof.reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(proof.fair)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Prove { log, format, out } => prove(log, *format, out.as_ref()),
        Command::Verify { proof } => verify(proof),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
