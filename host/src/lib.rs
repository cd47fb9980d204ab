//! Proving library for pong match logs.
//!
//! Wraps the RISC Zero prover around the shared validator: the guest replays
//! the log and commits a `ValidateLogOutput`; this crate turns that into a
//! portable proof object and checks receipts against the guest image.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use methods::{VALIDATE_LOG_ELF, VALIDATE_LOG_ID};
use pong_core::{CompactLog, ValidateLogOutput};
use risc0_zkvm::{default_prover, ExecutorEnv, ProverOpts, Receipt};
use serde::{Deserialize, Serialize};

/// Logs above this size are refused before any JSON parsing happens.
pub const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// The guest image id as 64 lowercase hex chars (words little-endian,
/// matching RISC Zero's digest byte order).
pub fn image_id_hex() -> String {
    VALIDATE_LOG_ID
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Receipt type for proof generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptKind {
    /// Fastest to generate, largest size (multiple MB)
    Composite,
    /// STARK proof, medium size (~200 KB)
    #[default]
    Succinct,
    /// SNARK proof, smallest size (~200-300 bytes)
    Groth16,
}

impl ReceiptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Composite => "composite",
            Self::Succinct => "succinct",
            Self::Groth16 => "groth16",
        }
    }

    fn prover_opts(self) -> ProverOpts {
        match self {
            Self::Composite => ProverOpts::composite(),
            Self::Succinct => ProverOpts::succinct(),
            Self::Groth16 => ProverOpts::groth16(),
        }
    }
}

impl std::str::FromStr for ReceiptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "composite" => Ok(Self::Composite),
            "succinct" => Ok(Self::Succinct),
            "groth16" => Ok(Self::Groth16),
            _ => Err(format!(
                "invalid receipt kind '{s}': must be composite, succinct, or groth16"
            )),
        }
    }
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proven match verdict with its ZK receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongProof {
    pub receipt: Receipt,
    pub receipt_kind: ReceiptKind,
    pub left_score: u32,
    pub right_score: u32,
    pub log_hash: [u8; 32],
    pub events_len: u32,
    pub fair: bool,
    pub reason: Option<String>,
    pub game_id: u32,
}

/// Read a CompactLog from disk, enforcing the size cap before parsing.
pub fn load_log_file(path: &Path) -> Result<CompactLog> {
    let metadata =
        fs::metadata(path).with_context(|| format!("accessing {}", path.display()))?;
    if metadata.len() > MAX_LOG_FILE_BYTES {
        bail!(
            "log file too large: {} bytes (max {MAX_LOG_FILE_BYTES})",
            metadata.len()
        );
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Prove that the log validates (or provably fails) under the shared rules.
pub fn generate_pong_proof(log: &CompactLog, receipt_kind: ReceiptKind) -> Result<PongProof> {
    tracing::info!(
        game_id = log.game_id,
        events = log.events.len(),
        %receipt_kind,
        "generating match proof"
    );

    let input = log
        .to_validate_input()
        .map_err(|e| anyhow!("invalid log payload: {e}"))?;

    let env = ExecutorEnv::builder().write(&input)?.build()?;

    let prover = default_prover();
    let prove_info = prover
        .prove_with_opts(env, VALIDATE_LOG_ELF, &receipt_kind.prover_opts())
        .map_err(|e| anyhow!("proof generation failed: {e}"))?;
    let receipt = prove_info.receipt;

    let out: ValidateLogOutput = receipt.journal.decode()?;

    tracing::info!(fair = out.fair, left = out.left_score, right = out.right_score, "proof generated");

    Ok(PongProof {
        receipt,
        receipt_kind,
        left_score: out.left_score,
        right_score: out.right_score,
        log_hash: out.log_hash_sha256,
        events_len: out.events_len,
        fair: out.fair,
        reason: out.reason,
        game_id: out.game_id,
    })
}

/// Verify a proof: the receipt must check out against the guest image, and
/// the claimed summary fields must match the committed journal.
pub fn verify_pong_proof(proof: &PongProof) -> Result<()> {
    proof
        .receipt
        .verify(VALIDATE_LOG_ID)
        .map_err(|e| anyhow!("receipt verification failed: {e}"))?;

    let out: ValidateLogOutput = proof.receipt.journal.decode()?;
    if out.fair != proof.fair
        || out.left_score != proof.left_score
        || out.right_score != proof.right_score
        || out.events_len != proof.events_len
        || out.log_hash_sha256 != proof.log_hash
        || out.game_id != proof.game_id
    {
        bail!("proof summary does not match the committed journal");
    }

    Ok(())
}
