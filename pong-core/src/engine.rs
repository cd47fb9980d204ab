//! Event-driven match kinematics.
//!
//! Between paddle-plane events the ball moves analytically: `reflect1d`
//! collapses any number of wall bounces into a closed form, so the engine
//! advances straight from one paddle plane to the next. State mutates only
//! at those events, which is exactly what the log records.

use crate::constants::*;
use crate::cordic::{deg_to_rad_q16, sin_cos};
use crate::fixed::{clamp_paddle_y, fx_abs, fx_div, fx_max, fx_min, fx_mul, reflect1d, to_fx, Fx};

pub const PADDLE_HALF: Fx = to_fx(PADDLE_HEIGHT / 2);
pub const HIT_WINDOW: Fx = PADDLE_HALF + to_fx(BALL_RADIUS);
pub const BALL_Y_MIN: Fx = to_fx(BALL_RADIUS);
pub const BALL_Y_MAX: Fx = to_fx(HEIGHT - BALL_RADIUS);
pub const LEFT_CONTACT_X: Fx = to_fx(PADDLE_MARGIN + PADDLE_WIDTH + BALL_RADIUS);
pub const RIGHT_CONTACT_X: Fx = to_fx(WIDTH - (PADDLE_MARGIN + PADDLE_WIDTH) - BALL_RADIUS);
pub const BOARD_CENTER_Y: Fx = to_fx(HEIGHT / 2);
pub const MAX_BOUNCE_ANGLE_Q16: Fx = deg_to_rad_q16(MAX_BOUNCE_ANGLE_DEG);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Impossible-physics conditions. The validator reports these as rejection
/// reasons; reaching one from the producer's own engine is a bug.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KinematicFault {
    ZeroVelocity,
    NonPositiveDt,
}

impl core::fmt::Display for KinematicFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KinematicFault::ZeroVelocity => write!(f, "Invalid velocity: vx is zero"),
            KinematicFault::NonPositiveDt => write!(f, "Invalid kinematics"),
        }
    }
}

/// Kinematic snapshot of one rally. Created at each serve, mutated only at
/// paddle-plane events.
#[derive(Clone, Copy, Debug)]
pub struct FixState {
    pub t0: Fx,
    pub x: Fx,
    pub y: Fx,
    pub vx: Fx,
    pub vy: Fx,
    pub speed: Fx,
    pub left_y: Fx,
    pub right_y: Fx,
    pub dir: i32, // -1 toward left paddle, +1 toward right
}

/// Linear ramp of one paddle toward a target at `PADDLE_MAX_SPEED`.
#[derive(Clone, Copy, Debug)]
pub struct PaddleMotion {
    pub y0: Fx,
    pub t0: Fx,
    pub target: Fx,
}

impl PaddleMotion {
    pub fn hold(y: Fx, t0: Fx) -> Self {
        Self { y0: y, t0, target: y }
    }

    pub fn toward(y0: Fx, t0: Fx, target: Fx) -> Self {
        Self { y0, t0, target }
    }

    /// Analytic position for any `t >= t0`, clamped to the playable band.
    pub fn y_at(&self, t: Fx) -> Fx {
        debug_assert!(t >= self.t0);
        let gap = self.target - self.y0;
        let travel = fx_min(fx_abs(gap), fx_mul(to_fx(PADDLE_MAX_SPEED), t - self.t0));
        let moved = if gap < 0 { self.y0 - travel } else { self.y0 + travel };
        clamp_paddle_y(moved, PADDLE_HALF, to_fx(HEIGHT))
    }
}

/// X of the ball centre when it reaches the receiving paddle's plane.
#[inline]
pub fn contact_x(dir: i32) -> Fx {
    if dir < 0 {
        LEFT_CONTACT_X
    } else {
        RIGHT_CONTACT_X
    }
}

/// Deterministic serve angle in degrees, in `[-60, +60]`.
///
/// `rem_euclid` is load-bearing: the entropy word goes negative for large
/// game ids, and a truncating `%` would land outside the lattice.
pub fn serve_angle_deg(serve_index: u32, game_id: u32) -> i32 {
    let entropy = serve_index.wrapping_add(game_id) as i32;
    let lattice =
        (entropy as i64 * SERVE_ANGLE_MULTIPLIER as i64).rem_euclid(ANGLE_RANGE as i64);
    lattice as i32 - MAX_BOUNCE_ANGLE_DEG
}

/// Fresh rally state: ball at board centre heading toward `receiver_dir`,
/// both paddles centred.
pub fn serve_state(receiver_dir: i32, t0: Fx, serve_index: u32, game_id: u32) -> FixState {
    let angle = deg_to_rad_q16(serve_angle_deg(serve_index, game_id));
    let (sinv, cosv) = sin_cos(angle);
    let speed = to_fx(SERVE_SPEED);
    FixState {
        t0,
        x: to_fx(WIDTH / 2),
        y: BOARD_CENTER_Y,
        vx: fx_mul(speed, fx_mul(cosv, to_fx(receiver_dir))),
        vy: fx_mul(speed, sinv),
        speed,
        left_y: BOARD_CENTER_Y,
        right_y: BOARD_CENTER_Y,
        dir: receiver_dir,
    }
}

/// Rebound off a paddle. Angle and speed are functions of impact geometry
/// and prior speed only — no jitter.
pub fn bounce(s: &FixState, paddle_y: Fx) -> (Fx, Fx, Fx, i32) {
    let limit = HIT_WINDOW;
    assert!(limit > 0, "bounce: non-positive hit window");

    let offset = fx_max(-limit, fx_min(limit, s.y - paddle_y));
    let norm = fx_div(offset, limit);
    let angle = fx_max(
        -MAX_BOUNCE_ANGLE_Q16,
        fx_min(MAX_BOUNCE_ANGLE_Q16, fx_mul(norm, MAX_BOUNCE_ANGLE_Q16)),
    );

    let new_speed = s.speed + to_fx(SPEED_INCREMENT);
    let new_dir = if s.dir < 0 { 1 } else { -1 };

    let (sinv, cosv) = sin_cos(angle);
    let vx = fx_mul(new_speed, fx_mul(cosv, to_fx(new_dir)));
    let vy = fx_mul(new_speed, sinv);
    (vx, vy, new_speed, new_dir)
}

/// Analytic ball position for display at any `t >= t0`. Read-only; display
/// code must never feed the result back into the engine.
pub fn ball_at(s: &FixState, t: Fx) -> (Fx, Fx) {
    let dt = t - s.t0;
    (
        s.x + fx_mul(s.vx, dt),
        reflect1d(s.y, s.vy, dt, BALL_Y_MIN, BALL_Y_MAX),
    )
}

/// The next paddle-plane crossing, computed before paddle positions are
/// known so the caller can run reachability checks against `dt`.
#[derive(Clone, Copy, Debug)]
pub struct PendingEvent {
    pub dt: Fx,
    pub t_hit: Fx,
    pub y_at_hit: Fx,
}

/// What one applied event did to the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Hit,
    Miss { scorer: Side, ended: bool },
}

/// Whole-match state machine: SERVING → IN_FLIGHT → (HIT | MISS) → … → ENDED.
///
/// Shared verbatim by producer, validator, and replay driver — the three must
/// transition identically or logs stop being reproducible.
#[derive(Clone, Debug)]
pub struct Match {
    state: FixState,
    left_score: u32,
    right_score: u32,
    processed_events: u32,
    game_id: u32,
    ended: bool,
}

impl Match {
    pub fn new(game_id: u32) -> Self {
        Self {
            state: serve_state(INITIAL_SERVE_DIRECTION, 0, 0, game_id),
            left_score: 0,
            right_score: 0,
            processed_events: 0,
            game_id,
            ended: false,
        }
    }

    pub fn state(&self) -> &FixState {
        &self.state
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.left_score, self.right_score)
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn processed_events(&self) -> u32 {
        self.processed_events
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    /// The side the ball is travelling toward.
    pub fn receiver(&self) -> Side {
        if self.state.dir < 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Time and geometry of the next paddle-plane crossing.
    pub fn next_event(&self) -> Result<PendingEvent, KinematicFault> {
        if self.state.vx == 0 {
            return Err(KinematicFault::ZeroVelocity);
        }
        let dt = fx_div(contact_x(self.state.dir) - self.state.x, self.state.vx);
        if dt <= 0 {
            return Err(KinematicFault::NonPositiveDt);
        }
        Ok(PendingEvent {
            dt,
            t_hit: self.state.t0 + dt,
            y_at_hit: reflect1d(self.state.y, self.state.vy, dt, BALL_Y_MIN, BALL_Y_MAX),
        })
    }

    /// Advance through one event with both logged paddle positions.
    ///
    /// On a miss the opponent scores; unless that ends the match, the next
    /// serve goes toward the scorer with serve index = events logged so far
    /// (the producer appends the pair before serving, so both sides count
    /// identically).
    pub fn apply(&mut self, pending: &PendingEvent, left_y: Fx, right_y: Fx) -> EventOutcome {
        debug_assert!(!self.ended);

        let receiver = self.receiver();
        self.state.x = contact_x(self.state.dir);
        self.state.y = pending.y_at_hit;
        self.state.t0 = pending.t_hit;
        self.state.left_y = left_y;
        self.state.right_y = right_y;
        self.processed_events += 2;

        let contact = match receiver {
            Side::Left => left_y,
            Side::Right => right_y,
        };

        if fx_abs(contact - pending.y_at_hit) <= HIT_WINDOW {
            let (vx, vy, speed, dir) = bounce(&self.state, contact);
            self.state.vx = vx;
            self.state.vy = vy;
            self.state.speed = speed;
            self.state.dir = dir;
            return EventOutcome::Hit;
        }

        let scorer = receiver.opposite();
        match scorer {
            Side::Left => self.left_score += 1,
            Side::Right => self.right_score += 1,
        }

        if self.left_score >= POINTS_TO_WIN || self.right_score >= POINTS_TO_WIN {
            self.ended = true;
        } else {
            let dir = match scorer {
                Side::Left => -1,
                Side::Right => 1,
            };
            let mut next = serve_state(dir, self.state.t0, self.processed_events, self.game_id);
            next.left_y = left_y;
            next.right_y = right_y;
            self.state = next;
        }

        EventOutcome::Miss {
            scorer,
            ended: self.ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FX_ONE;

    #[test]
    fn serve_angle_stays_on_lattice() {
        for k in 0..200u32 {
            for game_id in [0u32, 1, 1373791838, u32::MAX] {
                let deg = serve_angle_deg(k, game_id);
                assert!((-60..=60).contains(&deg), "angle {deg} for k={k}");
            }
        }
    }

    #[test]
    fn serve_angle_handles_negative_entropy() {
        // k + game_id wraps to -1 as i32: (-37).rem_euclid(121) = 84
        assert_eq!(serve_angle_deg(0, u32::MAX), 84 - 60);
    }

    #[test]
    fn serve_starts_centred_toward_receiver() {
        let s = serve_state(1, 0, 0, 0);
        assert_eq!(s.x, to_fx(400));
        assert_eq!(s.y, BOARD_CENTER_Y);
        assert_eq!(s.left_y, BOARD_CENTER_Y);
        assert_eq!(s.right_y, BOARD_CENTER_Y);
        assert_eq!(s.speed, to_fx(SERVE_SPEED));
        assert!(s.vx > 0);

        let s = serve_state(-1, 0, 0, 0);
        assert!(s.vx < 0);
    }

    #[test]
    fn paddle_ramp_is_linear_then_parks() {
        let m = PaddleMotion::toward(to_fx(240), 0, to_fx(300));
        // quarter second at 200 px/s = 50 px
        assert_eq!(m.y_at(FX_ONE / 4), to_fx(290));
        assert_eq!(m.y_at(FX_ONE), to_fx(300));
        assert_eq!(m.y_at(FX_ONE * 10), to_fx(300));
    }

    #[test]
    fn paddle_ramp_clamps_to_band() {
        let m = PaddleMotion::toward(to_fx(60), 0, to_fx(-100));
        assert_eq!(m.y_at(FX_ONE * 5), PADDLE_HALF);
    }

    #[test]
    fn held_paddle_never_moves() {
        let m = PaddleMotion::hold(to_fx(100), 0);
        assert_eq!(m.y_at(FX_ONE * 3), to_fx(100));
    }

    #[test]
    fn display_query_matches_the_event_geometry() {
        let m = Match::new(0);
        let pending = m.next_event().unwrap();
        let (x, y) = ball_at(m.state(), pending.t_hit);
        // dt came out of a truncating division, so x lands within one unit
        // of the contact plane; y reuses the same reflection exactly.
        assert!((x - contact_x(m.state().dir)).abs() < FX_ONE);
        assert_eq!(y, pending.y_at_hit);
    }

    #[test]
    fn bounce_reverses_and_speeds_up() {
        let s = serve_state(1, 0, 0, 0);
        let (vx, _, speed, dir) = bounce(&s, s.y);
        assert_eq!(dir, -1);
        assert!(vx < 0);
        assert_eq!(speed, to_fx(SERVE_SPEED + SPEED_INCREMENT));
    }

    #[test]
    fn bounce_angle_clamps_at_edge_contact() {
        let mut s = serve_state(1, 0, 0, 0);
        s.y = BOARD_CENTER_Y + HIT_WINDOW * 4; // far below the paddle centre
        let (_, vy_edge, _, _) = bounce(&s, BOARD_CENTER_Y);
        s.y = BOARD_CENTER_Y + HIT_WINDOW;
        let (_, vy_limit, _, _) = bounce(&s, BOARD_CENTER_Y);
        assert_eq!(vy_edge, vy_limit);
        assert!(vy_edge > 0);
    }

    #[test]
    fn perfect_returns_never_score() {
        let mut m = Match::new(7);
        for _ in 0..20 {
            let pending = m.next_event().unwrap();
            // both paddles teleport-free: they simply already sit on the ball
            let outcome = m.apply(&pending, pending.y_at_hit, pending.y_at_hit);
            assert_eq!(outcome, EventOutcome::Hit);
        }
        assert_eq!(m.scores(), (0, 0));
        assert!(!m.ended());
    }

    #[test]
    fn five_misses_end_the_match() {
        let mut m = Match::new(7);
        let mut outcomes = 0;
        while !m.ended() {
            let pending = m.next_event().unwrap();
            // receiver parks at the far edge from the ball
            let miss_y = if pending.y_at_hit > BOARD_CENTER_Y {
                PADDLE_HALF
            } else {
                to_fx(HEIGHT) - PADDLE_HALF
            };
            let (l, r) = match m.receiver() {
                Side::Left => (miss_y, BOARD_CENTER_Y),
                Side::Right => (BOARD_CENTER_Y, miss_y),
            };
            m.apply(&pending, l, r);
            outcomes += 1;
            assert!(outcomes < 100, "match failed to terminate");
        }
        let (ls, rs) = m.scores();
        assert_eq!(ls.max(rs), POINTS_TO_WIN);
        assert!(ls.min(rs) < POINTS_TO_WIN);
    }

    #[test]
    fn serve_preserves_paddles_after_miss() {
        let mut m = Match::new(1);
        let pending = m.next_event().unwrap();
        let edge = PADDLE_HALF;
        let far = to_fx(HEIGHT) - PADDLE_HALF;
        let miss_y = if pending.y_at_hit > BOARD_CENTER_Y { edge } else { far };
        let (l, r) = match m.receiver() {
            Side::Left => (miss_y, to_fx(300)),
            Side::Right => (to_fx(300), miss_y),
        };
        m.apply(&pending, l, r);
        assert_eq!(m.state().left_y, l);
        assert_eq!(m.state().right_y, r);
        assert_eq!(m.processed_events(), 2);
    }
}
