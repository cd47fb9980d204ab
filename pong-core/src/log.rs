//! CompactLog — the on-disk JSON interchange format.
//!
//! All numeric payloads are decimal strings of the Q16.16 integers; binary
//! values are fixed-width lowercase hex. Floating point never appears in a
//! log.

use serde::{Deserialize, Serialize};

use crate::constants::{LOG_VERSION, MAX_EVENTS};
use crate::error::LogParseError;
use crate::fixed::Fx;
use crate::types::{Commitment32, ValidateLogInput};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CompactLog {
    pub v: u32,
    pub game_id: u32,
    /// Interleaved `[L0, R0, L1, R1, …]`, decimal Q16.16 strings.
    pub events: Vec<String>,
    /// 64-char lowercase hex, one per event.
    pub commitments: Vec<String>,
    pub player_left_seed: String,
    pub player_right_seed: String,
}

impl CompactLog {
    pub fn assemble(
        game_id: u32,
        events: &[Fx],
        commitments: &[Commitment32],
        player_left_seed: &[u8; 32],
        player_right_seed: &[u8; 32],
    ) -> Self {
        Self {
            v: LOG_VERSION,
            game_id,
            events: events.iter().map(|y| y.to_string()).collect(),
            commitments: commitments.iter().map(|c| hex::encode(c.0)).collect(),
            player_left_seed: hex::encode(player_left_seed),
            player_right_seed: hex::encode(player_right_seed),
        }
    }

    /// Decode the string payloads into the guest-bound input.
    ///
    /// Shape problems surface here as typed errors; invariant violations are
    /// the validator's business and are NOT checked here.
    pub fn to_validate_input(&self) -> Result<ValidateLogInput, LogParseError> {
        if self.v != LOG_VERSION {
            return Err(LogParseError::UnsupportedVersion { found: self.v });
        }
        if self.events.len() > MAX_EVENTS as usize {
            return Err(LogParseError::TooManyEvents {
                count: self.events.len(),
                max: MAX_EVENTS,
            });
        }

        let mut events = Vec::with_capacity(self.events.len());
        for (index, s) in self.events.iter().enumerate() {
            let y: Fx = s
                .parse()
                .map_err(|_| LogParseError::BadEventNumber { index })?;
            events.push(y);
        }

        let mut commitments = Vec::with_capacity(self.commitments.len());
        for (index, s) in self.commitments.iter().enumerate() {
            let bytes =
                hex::decode(s).map_err(|_| LogParseError::BadCommitmentHex { index })?;
            let arr: [u8; 32] = bytes
                .try_into()
                .map_err(|_| LogParseError::BadCommitmentHex { index })?;
            commitments.push(Commitment32(arr));
        }

        Ok(ValidateLogInput {
            events,
            game_id: self.game_id,
            commitments,
            player_left_seed: decode_seed(&self.player_left_seed, "left")?,
            player_right_seed: decode_seed(&self.player_right_seed, "right")?,
        })
    }
}

fn decode_seed(s: &str, side: &'static str) -> Result<[u8; 32], LogParseError> {
    let bytes = hex::decode(s).map_err(|_| LogParseError::BadSeedHex { side })?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| LogParseError::WrongSeedLength { side, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::to_fx;

    fn sample() -> CompactLog {
        CompactLog::assemble(
            1373791838,
            &[to_fx(240), to_fx(240)],
            &[Commitment32([0xAAu8; 32]), Commitment32([0xBBu8; 32])],
            &[0x11u8; 32],
            &[0x22u8; 32],
        )
    }

    #[test]
    fn json_roundtrip_is_lossless() {
        let log = sample();
        let text = serde_json::to_string(&log).unwrap();
        let back: CompactLog = serde_json::from_str(&text).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn events_serialise_as_decimal_strings() {
        let log = sample();
        assert_eq!(log.events[0], "15728640"); // 240 << 16
        assert_eq!(log.commitments[0].len(), 64);
        assert_eq!(log.player_left_seed.len(), 64);
    }

    #[test]
    fn negative_event_strings_parse() {
        let mut log = sample();
        log.events[0] = "-65536".to_string();
        let input = log.to_validate_input().unwrap();
        assert_eq!(input.events[0], to_fx(-1));
    }

    #[test]
    fn wrong_version_is_refused() {
        let mut log = sample();
        log.v = 2;
        assert_eq!(
            log.to_validate_input().unwrap_err(),
            LogParseError::UnsupportedVersion { found: 2 }
        );
    }

    #[test]
    fn non_numeric_event_is_refused() {
        let mut log = sample();
        log.events[1] = "12.5".to_string();
        assert_eq!(
            log.to_validate_input().unwrap_err(),
            LogParseError::BadEventNumber { index: 1 }
        );
    }

    #[test]
    fn short_seed_is_refused() {
        let mut log = sample();
        log.player_right_seed = "22".repeat(16);
        assert_eq!(
            log.to_validate_input().unwrap_err(),
            LogParseError::WrongSeedLength {
                side: "right",
                len: 16
            }
        );
    }
}
