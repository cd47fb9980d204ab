//! SHA-256 binding primitives: per-event paddle commitments and the log hash.

extern crate alloc;
use alloc::vec::Vec;

use sha2::{Digest, Sha256};

use crate::fixed::Fx;

/// Domain-separation tag for the log hash.
pub const LOG_HASH_TAG: &[u8; 9] = b"PONGLOGv1";

/// Commit to a paddle position: `SHA-256(seed ‖ LE32(index) ‖ LE64(y))`.
///
/// `index` is the GLOBAL interleaved event index — left paddle on even
/// indices, right on odd. A peer that commits with its own local counter
/// produces commitments the validator will reject.
pub fn compute_commitment(seed: &[u8; 32], index: u32, paddle_y: Fx) -> [u8; 32] {
    let mut buf = [0u8; 44];
    buf[..32].copy_from_slice(seed);
    buf[32..36].copy_from_slice(&index.to_le_bytes());
    buf[36..44].copy_from_slice(&paddle_y.to_le_bytes());

    let mut h = Sha256::new();
    h.update(buf);

    let out = h.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

/// Hash binding a proof to one specific match:
/// `SHA-256(b"PONGLOGv1" ‖ LE32(game_id) ‖ LE64(y) for each event)`.
///
/// The buffer is assembled first and hashed with a single update — the
/// guest's SHA-256 accelerator works in whole-buffer batches.
pub fn compute_log_hash(game_id: u32, events: &[Fx]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(LOG_HASH_TAG.len() + 4 + events.len() * 8);
    buf.extend_from_slice(LOG_HASH_TAG);
    buf.extend_from_slice(&game_id.to_le_bytes());
    for y in events {
        buf.extend_from_slice(&y.to_le_bytes());
    }

    let mut h = Sha256::new();
    h.update(&buf);

    let out = h.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}
