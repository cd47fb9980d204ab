// End-to-end validator scenarios over hand-built and tampered logs.

use pong_core::commit::compute_commitment;
use pong_core::constants::POINTS_TO_WIN;
use pong_core::fixed::to_fx;
use pong_core::{validate_log, Commitment32, CompactLog, ValidateLogInput};

const LEFT_SEED: [u8; 32] = [0x11; 32];
const RIGHT_SEED: [u8; 32] = [0x22; 32];

/// Build a commitments vector that matches `events` under the global
/// interleaved indexing.
fn commit_all(events: &[i64]) -> Vec<Commitment32> {
    events
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let seed = if i % 2 == 0 { &LEFT_SEED } else { &RIGHT_SEED };
            Commitment32(compute_commitment(seed, i as u32, y))
        })
        .collect()
}

fn input_for(game_id: u32, events: Vec<i64>) -> ValidateLogInput {
    let commitments = commit_all(&events);
    ValidateLogInput {
        events,
        game_id,
        commitments,
        player_left_seed: LEFT_SEED,
        player_right_seed: RIGHT_SEED,
    }
}

#[test]
fn empty_log_from_json_is_rejected() {
    let raw = format!(
        r#"{{"v":1,"game_id":0,"events":[],"commitments":[],"player_left_seed":"{}","player_right_seed":"{}"}}"#,
        "00".repeat(32),
        "ff".repeat(32)
    );
    let log: CompactLog = serde_json::from_str(&raw).unwrap();
    let out = validate_log(&log.to_validate_input().unwrap());
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("No events provided"));
}

#[test]
fn single_entry_log_is_malformed() {
    let raw = format!(
        r#"{{"v":1,"game_id":0,"events":["1030792151040"],"commitments":["{}"],"player_left_seed":"{}","player_right_seed":"{}"}}"#,
        "00".repeat(32),
        "00".repeat(32),
        "ff".repeat(32)
    );
    let log: CompactLog = serde_json::from_str(&raw).unwrap();
    let out = validate_log(&log.to_validate_input().unwrap());
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("Malformed"));
}

#[test]
fn game_id_must_fit_u32() {
    let raw = format!(
        r#"{{"v":1,"game_id":4294967296,"events":[],"commitments":[],"player_left_seed":"{}","player_right_seed":"{}"}}"#,
        "00".repeat(32),
        "ff".repeat(32)
    );
    assert!(serde_json::from_str::<CompactLog>(&raw).is_err());
}

#[test]
fn teleporting_paddle_is_too_fast() {
    // Positions light-years outside the board: reachability trips before
    // the bounds check ever runs.
    let input = input_for(
        0,
        vec![1030792151040, 1030792151040, 1030792151040, 2000000000000],
    );
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("too fast"));
}

#[test]
fn reachable_but_out_of_band_paddle_is_rejected() {
    // game_id 121 serves at -60°, so dt is long enough that a 210 px move is
    // legal — but y = 30 sits outside [half, height - half].
    let input = input_for(121, vec![to_fx(30), to_fx(240)]);
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("Paddle out of bounds"));
}

#[test]
fn commitment_tamper_reports_its_index() {
    let log = pong_core::produce_log(1373791838, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();
    assert!(input.commitments.len() > 5, "fixture too short");

    input.commitments[5].0[0] ^= 0x01;
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out
        .reason
        .unwrap()
        .contains("Commitment verification failed at index 5"));
}

#[test]
fn event_value_tamper_breaks_its_commitment() {
    let log = pong_core::produce_log(42, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();
    input.events[0] += 1;
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out
        .reason
        .unwrap()
        .contains("Commitment verification failed at index 0"));
}

#[test]
fn truncated_match_has_invalid_final_score() {
    let log = pong_core::produce_log(7, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();
    // Dropping the final pair leaves commitments valid but nobody at
    // POINTS_TO_WIN.
    input.events.truncate(input.events.len() - 2);
    input.commitments.truncate(input.commitments.len() - 2);
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("Invalid final score"));
}

#[test]
fn events_after_match_end_are_rejected() {
    let log = pong_core::produce_log(7, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();

    let n = input.events.len();
    let (l, r) = (input.events[n - 2], input.events[n - 1]);
    input.events.push(l);
    input.events.push(r);
    input
        .commitments
        .push(Commitment32(compute_commitment(&LEFT_SEED, n as u32, l)));
    input.commitments.push(Commitment32(compute_commitment(
        &RIGHT_SEED,
        n as u32 + 1,
        r,
    )));

    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("Invalid final score"));
}

#[test]
fn commitment_count_mismatch_is_fatal() {
    let log = pong_core::produce_log(9, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();
    input.commitments.pop();
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("Commitment count mismatch"));
}

#[test]
fn weak_seed_is_rejected_with_entropy_reason() {
    let log = pong_core::produce_log(3, LEFT_SEED, RIGHT_SEED).unwrap();
    let mut input = log.to_validate_input().unwrap();
    let mut weak = [0u8; 32];
    weak[..3].copy_from_slice(&[1, 2, 3]); // 29 zero bytes
    input.player_right_seed = weak;
    let out = validate_log(&input);
    assert!(!out.fair);
    assert!(out.reason.unwrap().contains("insufficient entropy"));
}

#[test]
fn validation_is_deterministic() {
    let log = pong_core::produce_log(555, LEFT_SEED, RIGHT_SEED).unwrap();
    let input = log.to_validate_input().unwrap();
    let a = validate_log(&input);
    let b = validate_log(&input);
    assert_eq!(a, b);
    assert!(a.fair);
    assert_eq!(a.left_score.max(a.right_score), POINTS_TO_WIN);
}
