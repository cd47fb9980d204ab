// End-to-end relay runs: two live peers over TCP, one authoritative log.

use std::time::Duration;

use pong_core::{produce_log, validate_log};
use relay::peer::run_peer;
use relay::run_relay;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const LEFT_SEED: [u8; 32] = [0x41; 32];
const RIGHT_SEED: [u8; 32] = [0x42; 32];

async fn start_relay() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = run_relay(listener).await;
    });
    addr
}

#[tokio::test]
async fn two_peers_assemble_one_fair_log() {
    let addr = start_relay().await;

    // Connection order decides roles: first in is left.
    let a = TcpStream::connect(addr).await.unwrap();
    let b = TcpStream::connect(addr).await.unwrap();

    let (left, right) = tokio::join!(
        run_peer(a, LEFT_SEED, Duration::from_secs(10)),
        run_peer(b, RIGHT_SEED, Duration::from_secs(10)),
    );
    let left = left.unwrap();
    let right = right.unwrap();

    // Both peers hold the identical authoritative log, with no desyncs
    // between prediction and echo.
    assert_eq!(left.log, right.log);
    assert_eq!(left.desyncs, 0);
    assert_eq!(right.desyncs, 0);

    let out = validate_log(&left.log.to_validate_input().unwrap());
    assert!(out.fair, "relay log rejected: {:?}", out.reason);

    // The relay-assembled stream equals a single-producer run of the same
    // game id, commitments included.
    let solo = produce_log(left.log.game_id, LEFT_SEED, RIGHT_SEED).unwrap();
    assert_eq!(solo.events, left.log.events);
    assert_eq!(solo.commitments, left.log.commitments);
}

#[tokio::test]
async fn sessions_are_independent() {
    let addr = start_relay().await;

    let a1 = TcpStream::connect(addr).await.unwrap();
    let a2 = TcpStream::connect(addr).await.unwrap();
    let b1 = TcpStream::connect(addr).await.unwrap();
    let b2 = TcpStream::connect(addr).await.unwrap();

    let (r1, r2, r3, r4) = tokio::join!(
        run_peer(a1, relay::peer::random_seed(), Duration::from_secs(10)),
        run_peer(a2, relay::peer::random_seed(), Duration::from_secs(10)),
        run_peer(b1, relay::peer::random_seed(), Duration::from_secs(10)),
        run_peer(b2, relay::peer::random_seed(), Duration::from_secs(10)),
    );

    let first = r1.unwrap().log;
    assert_eq!(first, r2.unwrap().log);
    let second = r3.unwrap().log;
    assert_eq!(second, r4.unwrap().log);
    assert_ne!(first.game_id, second.game_id);
}

#[tokio::test]
async fn malformed_peer_terminates_the_session() {
    let addr = start_relay().await;

    let rogue = TcpStream::connect(addr).await.unwrap();
    let honest = TcpStream::connect(addr).await.unwrap();
    let honest_task = tokio::spawn(run_peer(honest, RIGHT_SEED, Duration::from_secs(10)));

    // Speak just enough protocol to be paired, then break it.
    let (read_half, mut write_half) = rogue.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let first = lines.next_line().await.unwrap().unwrap();
    assert!(first.contains("game_start"));
    write_half.write_all(b"this is not json\n").await.unwrap();

    let err = honest_task.await.unwrap().unwrap_err();
    let text = format!("{err:#}").to_lowercase();
    assert!(text.contains("opponent"), "unexpected error: {text}");
}
