//! Deterministic aim planning.
//!
//! The planner is not part of the verifier's contract — only the logged
//! positions are validated. It still must be identical on every producer
//! sharing a `game_id`: two peers predict each other's paddles with it
//! instead of waiting for the network.

use crate::constants::PADDLE_HEIGHT;
use crate::engine::{Side, BOARD_CENTER_Y};
use crate::fixed::{to_fx, Fx};

/// 32-bit mixer over (event pair, game id): LCG step, then a
/// multiply-xorshift finalizer.
pub fn mix32(event_pair: u32, game_id: u32) -> u32 {
    let mut h = event_pair
        .wrapping_mul(1664525)
        .wrapping_add(1013904223);
    h ^= game_id;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h
}

/// Aim perturbation in pixels, uniform on `[-PADDLE_HEIGHT/2, +PADDLE_HEIGHT/2)`.
pub fn aim_offset(event_pair: u32, game_id: u32) -> Fx {
    let span = PADDLE_HEIGHT as u32;
    let off = (mix32(event_pair, game_id) % span) as i32 - PADDLE_HEIGHT / 2;
    to_fx(off)
}

/// Targets for the upcoming event: the receiver chases the predicted
/// intercept plus its perturbation, the other side recentres.
pub fn plan_targets(
    receiver: Side,
    predicted_y: Fx,
    event_pair: u32,
    game_id: u32,
) -> (Fx, Fx) {
    let aimed = predicted_y + aim_offset(event_pair, game_id);
    match receiver {
        Side::Left => (aimed, BOARD_CENTER_Y),
        Side::Right => (BOARD_CENTER_Y, aimed),
    }
}
