use crate::*;
use carrom_core::{PlayerNumber, ShotEvent};
use glam::Vec2;
use proto::{player_prefix, session_prefix, GameSession, SessionStatus};
use std::sync::{Arc, Mutex};

struct MockEnv {
    time_ms: u64,
}

impl MockEnv {
    fn new() -> Self {
        Self { time_ms: 1000 }
    }
}

impl Environment for MockEnv {
    fn now_ms(&self) -> u64 {
        self.time_ms
    }
}

fn setup_store() -> InMemoryStore {
    InMemoryStore::new()
}

fn channel(store: &InMemoryStore) -> SyncChannel {
    SyncChannel::new(Arc::new(store.clone()), Arc::new(MockEnv::new()))
}

/// Host and guest in one playing session
fn setup_match(store: &InMemoryStore) -> (SyncChannel, SyncChannel, String) {
    let mut host = channel(store);
    let mut guest = channel(store);
    let code = host.create_session("Asha").unwrap();
    guest.join_session(&code, "Ben").unwrap();
    (host, guest, code)
}

fn shot(player: PlayerNumber) -> ShotEvent {
    ShotEvent {
        player,
        force: Vec2::new(-0.006, -0.009),
        position: Vec2::new(300.0, 550.0),
        timestamp_ms: 2000,
    }
}

#[test]
fn test_create_session() {
    let store = setup_store();
    let mut host = channel(&store);

    let code = host.create_session("Asha").unwrap();

    assert_eq!(code.len(), SESSION_CODE_LEN);
    assert_eq!(host.player(), Some(PlayerNumber::One));
    let session = host.session().unwrap();
    assert_eq!(session.status, SessionStatus::Waiting);
    assert_eq!(session.current_turn, 1);
    assert_eq!(session.created_at, 1000);
    assert_eq!(session.host_id, host.client_id().unwrap());
    assert_eq!(session.player(1).unwrap().name, "Asha");
    assert_eq!(session.player(2), None);
}

#[test]
fn test_join_session() {
    let store = setup_store();
    let (host, guest, code) = setup_match(&store);

    assert_eq!(guest.player(), Some(PlayerNumber::Two));
    assert_eq!(guest.session_id(), Some(code.as_str()));
    let session = host.session().unwrap();
    assert_eq!(session.status, SessionStatus::Playing);
    let record = session.player(2).expect("player 2 should be present");
    assert_eq!(record.name, "Ben");
    assert_eq!(record.score, 0);
}

#[test]
fn test_join_accepts_lowercase_code() {
    let store = setup_store();
    let mut host = channel(&store);
    let mut guest = channel(&store);
    let code = host.create_session("Asha").unwrap();

    guest
        .join_session(&format!("  {}\n", code.to_lowercase()), "Ben")
        .unwrap();

    assert_eq!(guest.session_id(), Some(code.as_str()));
}

#[test]
fn test_join_full_session_mutates_nothing() {
    let store = setup_store();
    let (_host, _guest, code) = setup_match(&store);
    let before = store.read_prefix(&session_prefix(&code)).unwrap();
    let mut third = channel(&store);

    let result = third.join_session(&code, "Cleo");

    assert!(matches!(result, Err(SyncError::SessionFull(ref id)) if *id == code));
    assert_eq!(store.read_prefix(&session_prefix(&code)).unwrap(), before);
    assert_eq!(third.player(), None);
}

#[test]
fn test_join_missing_session() {
    let store = setup_store();
    let mut guest = channel(&store);

    let result = guest.join_session("NOPE42", "Ben");

    assert!(matches!(result, Err(SyncError::SessionNotFound(_))));
    assert_eq!(store.key_count(), 0);
}

#[test]
fn test_connection_failure() {
    let store = setup_store();
    store.set_offline(true);
    let mut host = channel(&store);

    let result = host.create_session("Asha");

    assert!(matches!(
        result,
        Err(SyncError::ConnectionFailure(StoreError::Offline))
    ));
    assert_eq!(host.session_id(), None);
}

#[test]
fn test_publish_rejected_out_of_turn() {
    let store = setup_store();
    let (_host, guest, _code) = setup_match(&store);

    assert!(matches!(
        guest.publish_turn(PlayerNumber::One),
        Err(SyncError::OutOfTurn {
            current: 1,
            local: 2
        })
    ));
    assert!(matches!(
        guest.publish_score(PlayerNumber::Two, 3),
        Err(SyncError::OutOfTurn { .. })
    ));
    assert!(matches!(
        guest.publish_shot(&shot(PlayerNumber::Two)),
        Err(SyncError::OutOfTurn { .. })
    ));
    assert_eq!(guest.session().unwrap().score(2), 0);
}

#[test]
fn test_turn_alternates() {
    let store = setup_store();
    let (host, guest, _code) = setup_match(&store);

    assert!(matches!(
        host.publish_turn(PlayerNumber::One),
        Err(SyncError::InvalidTurn {
            expected: 2,
            requested: 1
        })
    ));
    host.publish_turn(PlayerNumber::Two).unwrap();
    assert_eq!(guest.session().unwrap().current_turn, 2);
    assert!(
        host.publish_turn(PlayerNumber::Two).is_err(),
        "Host no longer owns the turn"
    );
    guest.publish_turn(PlayerNumber::One).unwrap();
    assert_eq!(host.session().unwrap().current_turn, 1);
}

#[test]
fn test_score_never_decreases() {
    let store = setup_store();
    let (host, _guest, _code) = setup_match(&store);

    host.publish_score(PlayerNumber::One, 7).unwrap();
    let result = host.publish_score(PlayerNumber::One, 5);

    assert!(matches!(
        result,
        Err(SyncError::ScoreRegression {
            player: 1,
            stored: 7,
            requested: 5
        })
    ));
    assert_eq!(host.session().unwrap().score(1), 7);
}

#[test]
fn test_publish_shot() {
    let store = setup_store();
    let (host, guest, _code) = setup_match(&store);

    assert!(host.publish_shot(&shot(PlayerNumber::Two)).is_err());
    host.publish_shot(&shot(PlayerNumber::One)).unwrap();

    let record = guest.session().unwrap().last_shot.unwrap();
    let replayed = shot_event(&record).unwrap();
    assert_eq!(replayed, shot(PlayerNumber::One));
}

#[test]
fn test_subscribe_replays_and_follows() {
    let store = setup_store();
    let (host, mut guest, _code) = setup_match(&store);
    let seen: Arc<Mutex<Vec<GameSession>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    guest
        .subscribe(move |session| sink.lock().unwrap().push(session))
        .unwrap();
    host.publish_turn(PlayerNumber::Two).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2, "Replay plus the turn update");
    assert_eq!(seen[0].current_turn, 1);
    assert_eq!(seen[1].current_turn, 2);
}

#[test]
fn test_finish_session() {
    let store = setup_store();
    let (host, guest, _code) = setup_match(&store);

    host.finish_session(Some(PlayerNumber::One)).unwrap();

    let session = guest.session().unwrap();
    assert_eq!(session.status, SessionStatus::Finished);
    assert_eq!(session.winner, Some(1));
    assert_eq!(session.ended_at, Some(1000));
}

#[test]
fn test_leave_session_cleans_up() {
    let store = setup_store();
    let (host, mut guest, code) = setup_match(&store);
    guest.subscribe(|_| {}).unwrap();
    assert_eq!(store.listener_count(), 1);

    guest.leave_session().unwrap();

    assert_eq!(store.listener_count(), 0);
    assert!(store
        .read_prefix(&player_prefix(&code, 2))
        .unwrap()
        .is_empty());
    assert_eq!(host.session().unwrap().player(2), None);
    assert_eq!(guest.session_id(), None);
    assert!(matches!(
        guest.publish_turn(PlayerNumber::One),
        Err(SyncError::NotInSession)
    ));
}

#[test]
fn test_leave_runs_every_step_when_offline() {
    let store = setup_store();
    let (_host, mut guest, _code) = setup_match(&store);
    guest.subscribe(|_| {}).unwrap();
    store.set_offline(true);

    let result = guest.leave_session();

    assert!(matches!(result, Err(SyncError::Store(StoreError::Offline))));
    assert_eq!(store.listener_count(), 0, "Listeners dropped despite failure");
    assert_eq!(guest.session_id(), None);
}

#[test]
fn test_drop_cleans_up() {
    let store = setup_store();
    let (host, mut guest, _code) = setup_match(&store);
    guest.subscribe(|_| {}).unwrap();

    drop(guest);

    assert_eq!(store.listener_count(), 0);
    assert_eq!(host.session().unwrap().player(2), None);
}

#[test]
fn test_disconnect_removes_presence() {
    let store = setup_store();
    let (host, guest, _code) = setup_match(&store);
    let client = guest.client_id().unwrap().to_string();

    store.disconnect(&client).unwrap();

    let session = host.session().unwrap();
    assert_eq!(session.player(2), None);
    assert!(session.player(1).is_some());
}

#[test]
fn test_session_codes_use_alphabet() {
    let code = generate_session_code();
    assert_eq!(code.len(), SESSION_CODE_LEN);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn test_code_generation_skips_taken_codes() {
    let store = setup_store();
    let (host, _guest, taken) = setup_match(&store);
    let mut draws = vec![taken.clone(), "FRESH1".to_string()].into_iter();

    let code = host
        .unused_code(|| draws.next().unwrap_or_default())
        .unwrap();

    assert_eq!(code, "FRESH1");
}

#[test]
fn test_code_generation_gives_up_when_all_taken() {
    let store = setup_store();
    let (host, _guest, taken) = setup_match(&store);

    let result = host.unused_code(|| taken.clone());

    assert!(matches!(result, Err(SyncError::NoFreeCode(_))));
}
