//! Parse-layer errors for the on-disk log format.
//!
//! These cover malformed JSON payloads only. A log that parses but breaks a
//! match invariant is not an error — the validator reports it through
//! `ValidateLogOutput { fair: false, .. }`.

use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogParseError {
    UnsupportedVersion { found: u32 },
    TooManyEvents { count: usize, max: u32 },
    BadEventNumber { index: usize },
    BadCommitmentHex { index: usize },
    BadSeedHex { side: &'static str },
    WrongSeedLength { side: &'static str, len: usize },
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported log version: {found}")
            }
            Self::TooManyEvents { count, max } => {
                write!(f, "too many events: {count} (max {max})")
            }
            Self::BadEventNumber { index } => {
                write!(f, "event {index} is not a signed 64-bit decimal")
            }
            Self::BadCommitmentHex { index } => {
                write!(f, "commitment {index} is not 32 bytes of hex")
            }
            Self::BadSeedHex { side } => {
                write!(f, "{side} player seed is not valid hex")
            }
            Self::WrongSeedLength { side, len } => {
                write!(f, "{side} player seed must be 32 bytes, got {len}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LogParseError {}
