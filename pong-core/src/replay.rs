//! Replay driver: deterministic playback of a log for inspection.
//!
//! Replays the validator's own state machine over an already-validated
//! event stream. The log is read-only here; any divergence from the
//! validator's scores is a replay bug.

use std::time::Duration;

use crate::engine::{EventOutcome, FixState, KinematicFault, Match};
use crate::fixed::{Fx, FRAC_BITS};

/// One paddle-plane event as seen by an observer.
#[derive(Clone, Copy, Debug)]
pub struct ReplayFrame {
    pub pair_index: u32,
    pub t_hit: Fx,
    pub ball_y: Fx,
    pub left_y: Fx,
    pub right_y: Fx,
    pub outcome: EventOutcome,
    pub left_score: u32,
    pub right_score: u32,
}

pub struct Replay<'a> {
    m: Match,
    events: &'a [Fx],
    next_pair: usize,
}

impl<'a> Replay<'a> {
    pub fn new(game_id: u32, events: &'a [Fx]) -> Self {
        Self {
            m: Match::new(game_id),
            events,
            next_pair: 0,
        }
    }

    /// Current rally state, for analytic display queries between events.
    pub fn state(&self) -> &FixState {
        self.m.state()
    }

    pub fn scores(&self) -> (u32, u32) {
        self.m.scores()
    }

    fn step(&mut self) -> Option<Result<ReplayFrame, KinematicFault>> {
        if self.m.ended() || self.next_pair * 2 + 1 >= self.events.len() {
            return None;
        }
        let left_y = self.events[self.next_pair * 2];
        let right_y = self.events[self.next_pair * 2 + 1];

        let pending = match self.m.next_event() {
            Ok(p) => p,
            Err(fault) => return Some(Err(fault)),
        };
        let outcome = self.m.apply(&pending, left_y, right_y);
        let (left_score, right_score) = self.m.scores();

        let frame = ReplayFrame {
            pair_index: self.next_pair as u32,
            t_hit: pending.t_hit,
            ball_y: pending.y_at_hit,
            left_y,
            right_y,
            outcome,
            left_score,
            right_score,
        };
        self.next_pair += 1;
        Some(Ok(frame))
    }
}

impl Iterator for Replay<'_> {
    type Item = Result<ReplayFrame, KinematicFault>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

/// Q16.16 seconds to wall-clock duration, integer arithmetic only.
pub fn q16_to_duration(dt: Fx) -> Duration {
    debug_assert!(dt >= 0);
    let nanos = ((dt as i128) * 1_000_000_000i128) >> FRAC_BITS;
    Duration::from_nanos(nanos as u64)
}

/// Play the log wall-clock-aligned, sleeping out each between-event gap
/// through `pace` and handing every frame to `on_frame`.
pub fn run_paced(
    game_id: u32,
    events: &[Fx],
    mut on_frame: impl FnMut(&ReplayFrame),
    mut pace: impl FnMut(Duration),
) -> Result<(u32, u32), KinematicFault> {
    let mut replay = Replay::new(game_id, events);
    let mut last_t = 0;
    while let Some(frame) = replay.next() {
        let frame = frame?;
        pace(q16_to_duration(frame.t_hit - last_t));
        last_t = frame.t_hit;
        on_frame(&frame);
    }
    Ok(replay.scores())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{to_fx, FX_ONE};

    #[test]
    fn duration_conversion_is_exact_for_whole_seconds() {
        assert_eq!(q16_to_duration(FX_ONE), Duration::from_secs(1));
        assert_eq!(q16_to_duration(FX_ONE / 4), Duration::from_millis(250));
        assert_eq!(q16_to_duration(0), Duration::ZERO);
    }

    #[test]
    fn replay_times_are_monotonic() {
        let log = crate::producer::produce_log(99, [0x31; 32], [0x57; 32]).unwrap();
        let input = log.to_validate_input().unwrap();

        let mut last = to_fx(0);
        for frame in Replay::new(input.game_id, &input.events) {
            let frame = frame.unwrap();
            assert!(frame.t_hit > last);
            last = frame.t_hit;
        }
    }
}
