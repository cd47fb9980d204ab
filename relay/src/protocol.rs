//! Line-delimited JSON envelope for the peer relay.
//!
//! One JSON object per line; the codec caps line length so an oversize
//! payload surfaces as a transport fault instead of unbounded buffering.

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use pong_core::CompactLog;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec};

pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Left,
    Right,
}

impl Role {
    pub fn index(self) -> usize {
        match self {
            Role::Left => 0,
            Role::Right => 1,
        }
    }

    pub fn other(self) -> Role {
        match self {
            Role::Left => Role::Right,
            Role::Right => Role::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Left => "left",
            Role::Right => "right",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Message {
    /// Relay → peer on join: assigned role and the shared game id.
    GameStart { role: Role, game_id: u32 },
    /// Relay → first peer when the second arrives.
    OpponentConnected,
    /// Peer → relay: ready to play.
    PlayerReady,
    /// Relay → both peers once both are ready.
    GameReady,
    /// Peer → relay: own paddle at one event, with its commitment.
    ///
    /// `event_index` is the pair ordinal; `paddle_y` is the decimal Q16.16
    /// string; `commitment` was computed under the GLOBAL interleaved index.
    PaddlePosition {
        role: Role,
        event_index: u32,
        paddle_y: String,
        commitment: String,
    },
    /// Relay → opposite peer: echo for late verification of its prediction.
    OpponentPaddle { event_index: u32, paddle_y: String },
    /// Peer → relay: revealed commitment seed once its local match ended.
    PlayerLog { seed: String },
    /// Relay → both peers: the assembled authoritative log.
    GameEnd { log: CompactLog },
    /// Relay → remaining peer when the other drops before the end.
    OpponentDisconnected,
}

pub type Wire<T> = Framed<T, LinesCodec>;

pub fn framed<T: AsyncRead + AsyncWrite>(io: T) -> Wire<T> {
    Framed::new(io, LinesCodec::new_with_max_length(MAX_LINE_BYTES))
}

pub async fn send<T: AsyncRead + AsyncWrite + Unpin>(
    wire: &mut Wire<T>,
    msg: &Message,
) -> Result<()> {
    wire.send(serde_json::to_string(msg)?).await?;
    Ok(())
}

/// Next message, `None` on clean EOF. A malformed or oversize line is an
/// error — the peer is not speaking the protocol.
pub async fn recv<T: AsyncRead + AsyncWrite + Unpin>(
    wire: &mut Wire<T>,
) -> Result<Option<Message>> {
    match wire.next().await {
        None => Ok(None),
        Some(line) => {
            let line = line.map_err(|e| anyhow!("transport fault: {e}"))?;
            Ok(Some(serde_json::from_str(&line)?))
        }
    }
}
