//! Guest/host boundary types.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::fixed::Fx;

/// SHA-256 commitment to one paddle position.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Commitment32(pub [u8; 32]);

impl Commitment32 {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Validation input as the guest consumes it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ValidateLogInput {
    /// Interleaved `[leftY, rightY, …]` in Q16.16.
    pub events: Vec<Fx>,
    /// Match identifier; feeds serve-angle entropy and replay protection.
    pub game_id: u32,
    /// One commitment per event, global interleaved indexing.
    pub commitments: Vec<Commitment32>,
    /// Revealed left-player seed.
    pub player_left_seed: [u8; 32],
    /// Revealed right-player seed.
    pub player_right_seed: [u8; 32],
}

/// Validation verdict; committed verbatim to the guest journal.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ValidateLogOutput {
    pub fair: bool,
    pub reason: Option<String>,
    pub left_score: u32,
    pub right_score: u32,
    pub events_len: u32,
    pub log_hash_sha256: [u8; 32],
    /// Echoed for replay protection.
    pub game_id: u32,
}

impl ValidateLogOutput {
    pub fn ok(left: u32, right: u32, events_len: u32, hash: [u8; 32], game_id: u32) -> Self {
        Self {
            fair: true,
            reason: None,
            left_score: left,
            right_score: right,
            events_len,
            log_hash_sha256: hash,
            game_id,
        }
    }

    pub fn invalid(reason: String) -> Self {
        Self {
            fair: false,
            reason: Some(reason),
            left_score: 0,
            right_score: 0,
            events_len: 0,
            log_hash_sha256: [0u8; 32],
            game_id: 0,
        }
    }
}
