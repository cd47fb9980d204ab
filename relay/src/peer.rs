//! Peer session driver.
//!
//! A peer runs the full engine locally and sends only its own paddle's
//! position per event. The opponent's position comes from the shared
//! deterministic planner, consumed immediately — the simulation never waits
//! on the network. The wire exchange is sequenced separately: the message
//! for event N+1 goes out only after the relay echoes the opponent's half
//! of event N, which keeps the relay's single pending pair intact. Echoes
//! are compared against the prediction; a mismatch is a warning, never a
//! log mutation.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use pong_core::commit::compute_commitment;
use pong_core::constants::MAX_EVENTS;
use pong_core::producer::planned_motions;
use pong_core::{CompactLog, Fx, Match};
use rand::RngCore;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;

use crate::protocol::{framed, recv, send, Message, Role, Wire};

/// Fresh 32-byte commitment seed from OS randomness. Boundary-only: nothing
/// in the validated path draws randomness.
pub fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    seed
}

/// What a finished peer hands back to its caller.
#[derive(Debug)]
pub struct PeerReport {
    /// The relay-assembled authoritative log.
    pub log: CompactLog,
    /// Echoes that disagreed with the local prediction (diagnostic only).
    pub desyncs: u32,
}

/// One event's worth of outbound traffic, precomputed by the simulation.
struct PlannedSend {
    pair: u32,
    own_y: Fx,
    own_index: u32,
    predicted_opponent: Fx,
}

/// Play one match through the relay on `io`, committing under `seed`.
///
/// `opponent_timeout` bounds each wait on the opponent's echo and the final
/// wait for the assembled log; expiry is a connectivity fault, the local
/// simulation has already advanced.
pub async fn run_peer<T: AsyncRead + AsyncWrite + Unpin>(
    io: T,
    seed: [u8; 32],
    opponent_timeout: Duration,
) -> Result<PeerReport> {
    let mut wire = framed(io);

    // Handshake: learn role + game id, signal ready, wait for both sides.
    let (role, game_id) = loop {
        match recv(&mut wire)
            .await?
            .ok_or_else(|| anyhow!("relay closed before game_start"))?
        {
            Message::GameStart { role, game_id } => break (role, game_id),
            Message::OpponentConnected => continue,
            other => bail!("unexpected message before game_start: {other:?}"),
        }
    };
    tracing::info!(role = role.as_str(), game_id, "joined session");

    send(&mut wire, &Message::PlayerReady).await?;
    loop {
        match recv(&mut wire)
            .await?
            .ok_or_else(|| anyhow!("relay closed before game_ready"))?
        {
            Message::GameReady => break,
            Message::OpponentConnected => continue,
            Message::OpponentDisconnected => bail!("opponent left before the match started"),
            other => bail!("unexpected message before game_ready: {other:?}"),
        }
    }

    let (outgoing, events) = simulate(role, game_id)?;

    // Exchange phase: lockstep on the wire, one event at a time.
    let mut desyncs = 0u32;
    for planned in &outgoing {
        send(
            &mut wire,
            &Message::PaddlePosition {
                role,
                event_index: planned.pair,
                paddle_y: planned.own_y.to_string(),
                commitment: hex::encode(compute_commitment(&seed, planned.own_index, planned.own_y)),
            },
        )
        .await?;

        await_echo(&mut wire, planned, &mut desyncs, opponent_timeout).await?;
    }

    // Reveal the seed, then wait for the authoritative log.
    send(
        &mut wire,
        &Message::PlayerLog {
            seed: hex::encode(seed),
        },
    )
    .await?;

    let log = loop {
        let msg = timeout(opponent_timeout, recv(&mut wire))
            .await
            .map_err(|_| anyhow!("timed out waiting for the assembled log"))??
            .ok_or_else(|| anyhow!("relay closed before game_end"))?;
        match msg {
            Message::GameEnd { log } => break log,
            Message::OpponentDisconnected => bail!("opponent disconnected before end of match"),
            Message::OpponentPaddle { .. } => continue,
            other => bail!("unexpected message after seed reveal: {other:?}"),
        }
    };

    // The relay's authoritative stream must equal the local simulation.
    let local: Vec<String> = events.iter().map(|y| y.to_string()).collect();
    if log.events != local {
        bail!("authoritative events diverge from the local simulation");
    }

    if desyncs > 0 {
        tracing::warn!(desyncs, game_id, "opponent echoes diverged from predictions");
    }
    Ok(PeerReport { log, desyncs })
}

/// Run the whole match locally. Deterministic: both peers compute the same
/// streams from `game_id` alone.
fn simulate(role: Role, game_id: u32) -> Result<(Vec<PlannedSend>, Vec<Fx>)> {
    let mut m = Match::new(game_id);
    let mut events: Vec<Fx> = Vec::new();
    let mut outgoing: Vec<PlannedSend> = Vec::new();
    let (mut left_motion, mut right_motion) =
        planned_motions(&m).map_err(|f| anyhow!("engine fault: {f}"))?;

    while !m.ended() {
        if events.len() as u32 + 2 > MAX_EVENTS {
            break;
        }
        let pending = m.next_event().map_err(|f| anyhow!("engine fault: {f}"))?;
        let left_y = left_motion.y_at(pending.t_hit);
        let right_y = right_motion.y_at(pending.t_hit);

        let pair = (events.len() / 2) as u32;
        let (own_y, own_index, predicted_opponent) = match role {
            Role::Left => (left_y, 2 * pair, right_y),
            Role::Right => (right_y, 2 * pair + 1, left_y),
        };
        outgoing.push(PlannedSend {
            pair,
            own_y,
            own_index,
            predicted_opponent,
        });

        events.push(left_y);
        events.push(right_y);
        m.apply(&pending, left_y, right_y);
        if !m.ended() {
            (left_motion, right_motion) =
                planned_motions(&m).map_err(|f| anyhow!("engine fault: {f}"))?;
        }
    }

    Ok((outgoing, events))
}

/// Wait for the opponent's half of the given event and compare it to the
/// prediction.
async fn await_echo<T: AsyncRead + AsyncWrite + Unpin>(
    wire: &mut Wire<T>,
    planned: &PlannedSend,
    desyncs: &mut u32,
    opponent_timeout: Duration,
) -> Result<()> {
    loop {
        let msg = timeout(opponent_timeout, recv(wire))
            .await
            .map_err(|_| anyhow!("timed out waiting for opponent paddle {}", planned.pair))??
            .ok_or_else(|| anyhow!("relay closed mid-match"))?;

        match msg {
            Message::OpponentPaddle {
                event_index,
                paddle_y,
            } if event_index == planned.pair => {
                let actual: Fx = paddle_y
                    .parse()
                    .map_err(|_| anyhow!("opponent paddle is not a Q16.16 decimal"))?;
                if actual != planned.predicted_opponent {
                    *desyncs += 1;
                    tracing::warn!(
                        event_index,
                        predicted = planned.predicted_opponent,
                        actual,
                        "opponent paddle diverged from prediction"
                    );
                }
                return Ok(());
            }
            Message::OpponentPaddle { event_index, .. } => {
                bail!(
                    "echo out of order: expected event {}, got {event_index}",
                    planned.pair
                )
            }
            Message::OpponentDisconnected => bail!("opponent disconnected mid-match"),
            Message::OpponentConnected | Message::GameReady => continue,
            other => bail!("unexpected message mid-match: {other:?}"),
        }
    }
}
