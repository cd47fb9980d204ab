//! Relay session state: authoritative assembly of one match's event stream.
//!
//! Pure state transitions — sockets and tasks live in `server`. The session
//! is the sole writer of the authoritative `events` buffer; peers only ever
//! read what it broadcasts.

use core::fmt;

use pong_core::constants::{LOG_VERSION, MAX_EVENTS};
use pong_core::{CompactLog, Fx};

use crate::protocol::{Message, Role};

/// Protocol violations that terminate a session. None of these ever mutate
/// an already-assembled log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionFault {
    UnexpectedRole { claimed: Role, actual: Role },
    EventIndexMismatch { expected: u32, got: u32 },
    BadPaddleNumber { event_index: u32 },
    DuplicateHalf { event_index: u32, role: Role },
    EventOverflow,
    CommitmentCountSkew { left: usize, right: usize, pairs: usize },
}

impl fmt::Display for SessionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedRole { claimed, actual } => write!(
                f,
                "peer {} sent a message claiming role {}",
                actual.as_str(),
                claimed.as_str()
            ),
            Self::EventIndexMismatch { expected, got } => {
                write!(f, "event index desync: expected {expected}, got {got}")
            }
            Self::BadPaddleNumber { event_index } => {
                write!(f, "paddle position at event {event_index} is not a Q16.16 decimal")
            }
            Self::DuplicateHalf { event_index, role } => write!(
                f,
                "duplicate {} half for event {event_index}",
                role.as_str()
            ),
            Self::EventOverflow => write!(f, "event cap reached"),
            Self::CommitmentCountSkew { left, right, pairs } => write!(
                f,
                "commitment lists out of step: left={left}, right={right}, pairs={pairs}"
            ),
        }
    }
}

impl std::error::Error for SessionFault {}

/// Something the session wants the transport layer to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Send(Role, Message),
    Broadcast(Message),
}

/// At most one half-assembled pair exists at a time; both halves must agree
/// on the pair ordinal before the pair is committed to `events`.
#[derive(Clone, Copy, Debug)]
struct PendingPair {
    event_index: u32,
    left: Option<Fx>,
    right: Option<Fx>,
}

pub struct Session {
    game_id: u32,
    ready: [bool; 2],
    events: Vec<Fx>,
    pending: Option<PendingPair>,
    commitments: [Vec<String>; 2],
    seeds: [Option<String>; 2],
    finished: bool,
}

impl Session {
    pub fn new(game_id: u32) -> Self {
        Self {
            game_id,
            ready: [false; 2],
            events: Vec::new(),
            pending: None,
            commitments: [Vec::new(), Vec::new()],
            seeds: [None, None],
            finished: false,
        }
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn events(&self) -> &[Fx] {
        &self.events
    }

    pub fn on_ready(&mut self, role: Role) -> Vec<Effect> {
        self.ready[role.index()] = true;
        if self.ready == [true, true] {
            vec![Effect::Broadcast(Message::GameReady)]
        } else {
            Vec::new()
        }
    }

    /// Handle one `paddle_position`: record the commitment, fill the pending
    /// pair, forward the position to the opponent.
    pub fn on_paddle(
        &mut self,
        from: Role,
        claimed: Role,
        event_index: u32,
        paddle_y: &str,
    ) -> Result<Vec<Effect>, SessionFault> {
        if claimed != from {
            return Err(SessionFault::UnexpectedRole {
                claimed,
                actual: from,
            });
        }

        let y: Fx = paddle_y
            .parse()
            .map_err(|_| SessionFault::BadPaddleNumber { event_index })?;

        let mut pair = match self.pending.take() {
            Some(pair) if pair.event_index == event_index => pair,
            Some(pair) => {
                return Err(SessionFault::EventIndexMismatch {
                    expected: pair.event_index,
                    got: event_index,
                })
            }
            None => {
                let expected = (self.events.len() / 2) as u32;
                if event_index != expected {
                    return Err(SessionFault::EventIndexMismatch {
                        expected,
                        got: event_index,
                    });
                }
                if self.events.len() as u32 + 2 > MAX_EVENTS {
                    return Err(SessionFault::EventOverflow);
                }
                PendingPair {
                    event_index,
                    left: None,
                    right: None,
                }
            }
        };

        let slot = match from {
            Role::Left => &mut pair.left,
            Role::Right => &mut pair.right,
        };
        if slot.is_some() {
            return Err(SessionFault::DuplicateHalf {
                event_index,
                role: from,
            });
        }
        *slot = Some(y);

        if let (Some(l), Some(r)) = (pair.left, pair.right) {
            self.events.push(l);
            self.events.push(r);
        } else {
            self.pending = Some(pair);
        }

        Ok(vec![Effect::Send(
            from.other(),
            Message::OpponentPaddle {
                event_index,
                paddle_y: paddle_y.to_string(),
            },
        )])
    }

    /// Record a commitment as it arrives; per-peer lists keep insertion
    /// order and are interleaved only at end-of-match.
    pub fn on_commitment(&mut self, from: Role, commitment: String) {
        self.commitments[from.index()].push(commitment);
    }

    /// A peer revealed its seed. Once both are in, assemble and broadcast
    /// the canonical log.
    pub fn on_seed(
        &mut self,
        from: Role,
        seed: String,
    ) -> Result<Vec<Effect>, SessionFault> {
        self.seeds[from.index()] = Some(seed);
        if self.seeds.iter().any(|s| s.is_none()) {
            return Ok(Vec::new());
        }

        let pairs = self.events.len() / 2;
        let (left_n, right_n) = (self.commitments[0].len(), self.commitments[1].len());
        if left_n != pairs || right_n != pairs || self.pending.is_some() {
            return Err(SessionFault::CommitmentCountSkew {
                left: left_n,
                right: right_n,
                pairs,
            });
        }

        let log = self.assemble();
        self.finished = true;
        Ok(vec![Effect::Broadcast(Message::GameEnd { log })])
    }

    /// Canonical CompactLog: relay-ordered events, commitments interleaved
    /// `2i` from left's list and `2i+1` from right's.
    fn assemble(&self) -> CompactLog {
        let pairs = self.events.len() / 2;
        let mut commitments = Vec::with_capacity(self.events.len());
        for i in 0..pairs {
            commitments.push(self.commitments[0][i].clone());
            commitments.push(self.commitments[1][i].clone());
        }

        CompactLog {
            v: LOG_VERSION,
            game_id: self.game_id,
            events: self.events.iter().map(|y| y.to_string()).collect(),
            commitments,
            player_left_seed: self.seeds[0].clone().unwrap_or_default(),
            player_right_seed: self.seeds[1].clone().unwrap_or_default(),
        }
    }
}
