//! ZK guest program: validates a pong match log inside the RISC Zero zkVM.
//!
//! INPUT (private, from host via env::read):
//!   - `ValidateLogInput`: interleaved Q16.16 events, game id, per-event
//!     commitments, and both revealed player seeds
//!
//! VERIFICATION (inside guest):
//!   - Shape checks, commitment recomputation, and a full deterministic
//!     replay of the match — the same `validate_log` the host runs
//!
//! OUTPUT (public, committed to journal):
//!   - `ValidateLogOutput`: fairness verdict, final scores, event count,
//!     log hash, and game id. Nothing else leaves the guest.

use pong_core::{validate_log, ValidateLogInput, ValidateLogOutput};
use risc0_zkvm::guest::env;

fn main() {
    let input: ValidateLogInput = env::read();

    let out: ValidateLogOutput = validate_log(&input);

    env::commit(&out);
}
