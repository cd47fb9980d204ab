//! Match log producer.
//!
//! Drives the engine from serve to terminal score, planning both paddles
//! with the shared deterministic planner, committing each position under the
//! global interleaved index, and appending the pair. The log it emits is the
//! exact stream the validator replays.

use crate::commit::compute_commitment;
use crate::constants::MAX_EVENTS;
use crate::engine::{KinematicFault, Match, PaddleMotion};
use crate::fixed::Fx;
use crate::log::CompactLog;
use crate::planner::plan_targets;
use crate::types::Commitment32;

/// Paddle ramps for the upcoming event, identical on every producer of the
/// same `game_id` — this is what lets a peer predict its opponent.
pub fn planned_motions(m: &Match) -> Result<(PaddleMotion, PaddleMotion), KinematicFault> {
    let pending = m.next_event()?;
    let pair = m.processed_events() / 2;
    let (left_target, right_target) =
        plan_targets(m.receiver(), pending.y_at_hit, pair, m.game_id());
    let s = m.state();
    Ok((
        PaddleMotion::toward(s.left_y, s.t0, left_target),
        PaddleMotion::toward(s.right_y, s.t0, right_target),
    ))
}

/// Play out a full match and emit its CompactLog.
///
/// An `Err` here means the engine itself produced impossible physics, which
/// is a bug, not a property of the inputs.
pub fn produce_log(
    game_id: u32,
    player_left_seed: [u8; 32],
    player_right_seed: [u8; 32],
) -> Result<CompactLog, KinematicFault> {
    let mut m = Match::new(game_id);
    let mut events: Vec<Fx> = Vec::new();
    let mut commitments: Vec<Commitment32> = Vec::new();
    let (mut left_motion, mut right_motion) = planned_motions(&m)?;

    while !m.ended() {
        // Cap check happens before emission: hitting it ends the match
        // without appending a partial pair.
        if events.len() as u32 + 2 > MAX_EVENTS {
            break;
        }

        let pending = m.next_event()?;
        let left_y = left_motion.y_at(pending.t_hit);
        let right_y = right_motion.y_at(pending.t_hit);

        let index = events.len() as u32;
        commitments.push(Commitment32(compute_commitment(
            &player_left_seed,
            index,
            left_y,
        )));
        commitments.push(Commitment32(compute_commitment(
            &player_right_seed,
            index + 1,
            right_y,
        )));
        events.push(left_y);
        events.push(right_y);

        m.apply(&pending, left_y, right_y);

        if !m.ended() {
            (left_motion, right_motion) = planned_motions(&m)?;
        }
    }

    Ok(CompactLog::assemble(
        game_id,
        &events,
        &commitments,
        &player_left_seed,
        &player_right_seed,
    ))
}
