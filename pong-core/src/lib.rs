//! Deterministic match-log core for provable two-player pong.
//!
//! Everything in this crate is pure integer math over Q16.16 fixed point, so
//! producer, validator, replay driver, and the zkVM guest reach bit-identical
//! results. The crate builds without `std` (guest side); the JSON codec,
//! producer, and replay driver need the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod commit;
pub mod constants;
pub mod cordic;
pub mod engine;
pub mod error;
pub mod fixed;
pub mod planner;
pub mod types;
pub mod validate;

#[cfg(feature = "std")]
pub mod log;
#[cfg(feature = "std")]
pub mod producer;
#[cfg(feature = "std")]
pub mod replay;

pub use engine::{Match, Side};
pub use fixed::Fx;
pub use types::{Commitment32, ValidateLogInput, ValidateLogOutput};
pub use validate::validate_log;

#[cfg(feature = "std")]
pub use log::CompactLog;
#[cfg(feature = "std")]
pub use producer::produce_log;
#[cfg(feature = "std")]
pub use replay::Replay;
