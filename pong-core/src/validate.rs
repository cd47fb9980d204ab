//! Full log validation: shape checks, commitment verification, and
//! deterministic replay.
//!
//! The validator never panics on untrusted input. Every failure path returns
//! `fair = false` with a one-line reason whose prefix is stable enough to
//! match on; structured details follow as inline JSON where an index or side
//! matters.

extern crate alloc;
use alloc::format;
use alloc::string::ToString;

use crate::commit::{compute_commitment, compute_log_hash};
use crate::constants::{HEIGHT, MAX_EVENTS, PADDLE_MAX_SPEED, POINTS_TO_WIN};
use crate::engine::{Match, Side, PADDLE_HALF};
use crate::fixed::{clamp_paddle_y, fx_abs, fx_mul, to_fx};
use crate::types::{ValidateLogInput, ValidateLogOutput};

/// A seed with 29 or more zero bytes is rejected; exactly 28 still passes.
const MIN_NONZERO_SEED_BYTES: usize = 4;

fn seed_is_weak(seed: &[u8; 32]) -> bool {
    seed.iter().filter(|b| **b != 0).count() < MIN_NONZERO_SEED_BYTES
}

/// Replay the log against the hardcoded constants and report the verdict.
pub fn validate_log(inp: &ValidateLogInput) -> ValidateLogOutput {
    let events = &inp.events;

    // Pre-flight shape checks, in order. Each is fatal on its own.
    if events.is_empty() {
        return ValidateLogOutput::invalid("No events provided".to_string());
    }
    if events.len() % 2 != 0 {
        return ValidateLogOutput::invalid(format!(
            "Malformed events length {{\"len\":{}}}",
            events.len()
        ));
    }
    if events.len() > MAX_EVENTS as usize {
        return ValidateLogOutput::invalid(format!(
            "Too many events {{\"len\":{},\"max\":{}}}",
            events.len(),
            MAX_EVENTS
        ));
    }
    if inp.commitments.len() != events.len() {
        return ValidateLogOutput::invalid(format!(
            "Commitment count mismatch {{\"commitments\":{},\"events\":{}}}",
            inp.commitments.len(),
            events.len()
        ));
    }
    if inp.player_left_seed == inp.player_right_seed {
        return ValidateLogOutput::invalid(
            "Players must use unique commitment seeds".to_string(),
        );
    }
    for (side, seed) in [
        (Side::Left, &inp.player_left_seed),
        (Side::Right, &inp.player_right_seed),
    ] {
        if seed_is_weak(seed) {
            return ValidateLogOutput::invalid(format!(
                "Player seed has insufficient entropy {{\"side\":\"{}\"}}",
                side.as_str()
            ));
        }
    }

    // Every commitment binds (seed, global index, logged position). Left
    // committed on even indices, right on odd.
    for (i, commitment) in inp.commitments.iter().enumerate() {
        let seed = if i % 2 == 0 {
            &inp.player_left_seed
        } else {
            &inp.player_right_seed
        };
        let expected = compute_commitment(seed, i as u32, events[i]);
        if expected != commitment.0 {
            return ValidateLogOutput::invalid(format!(
                "Commitment verification failed at index {i}"
            ));
        }
    }

    // Replay with the same serve schedule as the producer (k = events
    // appended so far, starting at 0).
    let mut m = Match::new(inp.game_id);
    let height = to_fx(HEIGHT);

    for (pair_idx, pair) in events.chunks_exact(2).enumerate() {
        if m.ended() {
            let (l, r) = m.scores();
            return ValidateLogOutput::invalid(format!(
                "Invalid final score {{\"left\":{l},\"right\":{r},\"trailing_pairs\":{}}}",
                events.len() / 2 - pair_idx
            ));
        }

        let (logged_l, logged_r) = (pair[0], pair[1]);

        let pending = match m.next_event() {
            Ok(p) => p,
            Err(fault) => return ValidateLogOutput::invalid(fault.to_string()),
        };

        // Reachability: neither paddle may outrun its speed cap.
        let max_delta = fx_mul(to_fx(PADDLE_MAX_SPEED), pending.dt);
        let state = m.state();
        for (side, logged, prev) in [
            (Side::Left, logged_l, state.left_y),
            (Side::Right, logged_r, state.right_y),
        ] {
            let delta = fx_abs(logged - prev);
            if delta > max_delta {
                return ValidateLogOutput::invalid(format!(
                    "Paddle moved too fast {{\"side\":\"{}\",\"pair\":{pair_idx},\"delta\":\"{delta}\",\"max\":\"{max_delta}\"}}",
                    side.as_str()
                ));
            }
        }

        // Bounds: logged positions must already be clamped.
        for (side, logged) in [(Side::Left, logged_l), (Side::Right, logged_r)] {
            if clamp_paddle_y(logged, PADDLE_HALF, height) != logged {
                return ValidateLogOutput::invalid(format!(
                    "Paddle out of bounds {{\"side\":\"{}\",\"pair\":{pair_idx},\"y\":\"{logged}\"}}",
                    side.as_str()
                ));
            }
        }

        m.apply(&pending, logged_l, logged_r);
    }

    let (left_score, right_score) = m.scores();
    let left_won = left_score == POINTS_TO_WIN;
    let right_won = right_score == POINTS_TO_WIN;
    if left_score > POINTS_TO_WIN || right_score > POINTS_TO_WIN || left_won == right_won {
        return ValidateLogOutput::invalid(format!(
            "Invalid final score {{\"left\":{left_score},\"right\":{right_score}}}"
        ));
    }

    let hash = compute_log_hash(inp.game_id, events);
    ValidateLogOutput::ok(
        left_score,
        right_score,
        events.len() as u32,
        hash,
        inp.game_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn seeds() -> ([u8; 32], [u8; 32]) {
        ([0x11u8; 32], [0x22u8; 32])
    }

    #[test]
    fn empty_log_is_rejected() {
        let (l, r) = seeds();
        let out = validate_log(&ValidateLogInput {
            events: vec![],
            game_id: 0,
            commitments: vec![],
            player_left_seed: l,
            player_right_seed: r,
        });
        assert!(!out.fair);
        assert!(out.reason.unwrap().contains("No events provided"));
    }

    #[test]
    fn odd_event_count_is_malformed() {
        let (l, r) = seeds();
        let out = validate_log(&ValidateLogInput {
            events: vec![1030792151040],
            game_id: 0,
            commitments: vec![crate::types::Commitment32([0u8; 32])],
            player_left_seed: l,
            player_right_seed: r,
        });
        assert!(!out.fair);
        assert!(out.reason.unwrap().contains("Malformed"));
    }

    #[test]
    fn identical_seeds_are_rejected() {
        let out = validate_log(&ValidateLogInput {
            events: vec![0, 0],
            game_id: 0,
            commitments: vec![
                crate::types::Commitment32([0u8; 32]),
                crate::types::Commitment32([0u8; 32]),
            ],
            player_left_seed: [9u8; 32],
            player_right_seed: [9u8; 32],
        });
        assert!(!out.fair);
        assert!(out
            .reason
            .unwrap()
            .contains("Players must use unique commitment seeds"));
    }

    #[test]
    fn weak_seed_boundary_is_28_zero_bytes() {
        // 29 zero bytes: rejected
        let mut weak = [0u8; 32];
        weak[0] = 1;
        weak[1] = 2;
        weak[2] = 3;
        assert!(seed_is_weak(&weak));

        // exactly 28 zero bytes (4 nonzero): accepted
        let mut ok = weak;
        ok[3] = 4;
        assert!(!seed_is_weak(&ok));
    }
}
