//! Relay server runtime.
//!
//! Trivial pairing: the first unpaired connection opens a session as `left`,
//! the next joins it as `right`. Each session runs in its own task and
//! processes messages strictly in arrival order; different sessions are
//! independent.

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::protocol::{framed, Message, Role};
use crate::session::{Effect, Session, SessionFault};

enum Command {
    Incoming { from: Role, msg: Message },
    Gone { role: Role },
}

struct WaitingSlot {
    game_id: u32,
    cmd_tx: mpsc::Sender<Command>,
    left_tx: mpsc::Sender<Message>,
    right_tx: mpsc::Sender<Message>,
    right_rx: mpsc::Receiver<Message>,
}

/// Accept loop. Runs until the listener fails.
pub async fn run_relay(listener: TcpListener) -> Result<()> {
    let mut waiting: Option<WaitingSlot> = None;

    loop {
        let (socket, addr) = listener.accept().await?;
        tracing::info!(%addr, "peer connected");

        // A dead waiting session (its task exited) must not swallow peers.
        let slot = match waiting.take() {
            Some(slot) if !slot.cmd_tx.is_closed() => Some(slot),
            _ => None,
        };

        match slot {
            None => {
                let game_id = rand::random::<u32>();
                let (cmd_tx, cmd_rx) = mpsc::channel(256);
                let (left_tx, left_rx) = mpsc::channel(256);
                let (right_tx, right_rx) = mpsc::channel(256);

                tokio::spawn(session_task(
                    game_id,
                    cmd_rx,
                    [left_tx.clone(), right_tx.clone()],
                ));
                attach_peer(socket, Role::Left, cmd_tx.clone(), left_rx);
                let _ = left_tx
                    .send(Message::GameStart {
                        role: Role::Left,
                        game_id,
                    })
                    .await;

                waiting = Some(WaitingSlot {
                    game_id,
                    cmd_tx,
                    left_tx,
                    right_tx,
                    right_rx,
                });
            }
            Some(slot) => {
                attach_peer(socket, Role::Right, slot.cmd_tx, slot.right_rx);
                let _ = slot
                    .right_tx
                    .send(Message::GameStart {
                        role: Role::Right,
                        game_id: slot.game_id,
                    })
                    .await;
                let _ = slot.left_tx.send(Message::OpponentConnected).await;
            }
        }
    }
}

/// Wire a socket to its session: one writer task draining the outbound
/// queue, one reader task feeding the session's command queue.
fn attach_peer(
    socket: TcpStream,
    role: Role,
    cmd_tx: mpsc::Sender<Command>,
    mut writer_rx: mpsc::Receiver<Message>,
) {
    let (mut sink, mut stream) = framed(socket).split();

    tokio::spawn(async move {
        while let Some(msg) = writer_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(peer = role.as_str(), "encoding outbound message: {e}");
                    break;
                }
            };
            if sink.send(text).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            match stream.next().await {
                Some(Ok(line)) => match serde_json::from_str::<Message>(&line) {
                    Ok(msg) => {
                        if cmd_tx.send(Command::Incoming { from: role, msg }).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(peer = role.as_str(), "malformed message: {e}");
                        let _ = cmd_tx.send(Command::Gone { role }).await;
                        break;
                    }
                },
                Some(Err(e)) => {
                    tracing::warn!(peer = role.as_str(), "transport fault: {e}");
                    let _ = cmd_tx.send(Command::Gone { role }).await;
                    break;
                }
                None => {
                    let _ = cmd_tx.send(Command::Gone { role }).await;
                    break;
                }
            }
        }
    });
}

async fn session_task(
    game_id: u32,
    mut rx: mpsc::Receiver<Command>,
    writers: [mpsc::Sender<Message>; 2],
) {
    let mut session = Session::new(game_id);

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Incoming { from, msg } => {
                match dispatch(&mut session, from, msg) {
                    Ok(effects) => {
                        for effect in effects {
                            deliver(&writers, effect).await;
                        }
                    }
                    Err(fault) => {
                        tracing::error!(game_id, %fault, "session fault; terminating");
                        break;
                    }
                }
                if session.finished() {
                    tracing::info!(game_id, events = session.events().len(), "match log broadcast");
                    break;
                }
            }
            Command::Gone { role } => {
                // Disconnection before end-of-match: session fault, no
                // partial log leaves the relay.
                tracing::warn!(game_id, peer = role.as_str(), "peer disconnected");
                let _ = writers[role.other().index()]
                    .send(Message::OpponentDisconnected)
                    .await;
                break;
            }
        }
    }
}

fn dispatch(
    session: &mut Session,
    from: Role,
    msg: Message,
) -> Result<Vec<Effect>, SessionFault> {
    match msg {
        Message::PlayerReady => Ok(session.on_ready(from)),
        Message::PaddlePosition {
            role,
            event_index,
            paddle_y,
            commitment,
        } => {
            session.on_commitment(from, commitment);
            session.on_paddle(from, role, event_index, &paddle_y)
        }
        Message::PlayerLog { seed } => session.on_seed(from, seed),
        other => {
            tracing::debug!(peer = from.as_str(), ?other, "ignoring relay-bound message");
            Ok(Vec::new())
        }
    }
}

async fn deliver(writers: &[mpsc::Sender<Message>; 2], effect: Effect) {
    match effect {
        Effect::Send(role, msg) => {
            let _ = writers[role.index()].send(msg).await;
        }
        Effect::Broadcast(msg) => {
            for writer in writers {
                let _ = writer.send(msg.clone()).await;
            }
        }
    }
}
