use rusqlite::Connection;
use skirmish_core::{
    apply_outcome, default_thresholds, BattleAction, BattleOutcome, BattleResult, BattleRules,
    GameError, LevelTable, LevelThreshold, Player, PlayerId, ProgressEngine, ProgressStore,
    SessionId, TerminationReason, XorShiftRng,
};
use tempfile::tempdir;

use crate::{SqliteStore, StoreConfig};

const PLAYER: PlayerId = 42;

fn memory_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory(&default_thresholds()).unwrap();
    store.create_player(PLAYER).unwrap();
    store
}

fn fled(session: SessionId, battle_points: u32) -> BattleOutcome {
    BattleOutcome {
        session,
        player: PLAYER,
        battle_points,
        reason: TerminationReason::Fled,
    }
}

#[test]
fn test_levels_are_seeded() {
    let store = SqliteStore::open_in_memory(&default_thresholds()).unwrap();
    assert_eq!(store.load_levels().unwrap(), default_thresholds());
    assert!(store.path().is_none());
}

#[test]
fn test_seeding_never_overwrites_existing_levels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.db");
    drop(SqliteStore::open(&path, &default_thresholds()).unwrap());

    let edited = vec![LevelThreshold::new(1, 0), LevelThreshold::new(2, 5)];
    let reopened = SqliteStore::open(&path, &edited).unwrap();
    assert_eq!(reopened.load_levels().unwrap(), default_thresholds());
}

#[test]
fn test_player_registration() {
    let store = memory_store();
    assert_eq!(store.load_player(PLAYER).unwrap(), Some(Player::new(PLAYER)));
    assert_eq!(store.load_player(PLAYER + 1).unwrap(), None);
    assert_eq!(store.create_player(PLAYER), Err(GameError::PlayerAlreadyExists));
}

#[test]
fn test_commit_updates_player_and_history() {
    let store = memory_store();
    let levels = LevelTable::default();

    let session = store.open_session(PLAYER).unwrap();
    let first = store
        .commit_progress(PLAYER, |p| apply_outcome(p, &fled(session, 90), &levels))
        .unwrap();
    assert_eq!(first.player.level, 1);

    let session = store.open_session(PLAYER).unwrap();
    let second = store
        .commit_progress(PLAYER, |p| apply_outcome(p, &fled(session, 20), &levels))
        .unwrap();
    assert_eq!(second.player.xp, 110);
    assert_eq!(second.player.level, 2);
    assert_eq!(second.player.games_played, 2);
    assert!(second.record.id > first.record.id);

    assert_eq!(store.load_player(PLAYER).unwrap(), Some(second.player));
    assert_eq!(
        store.load_history(PLAYER).unwrap(),
        vec![first.record, second.record]
    );
}

#[test]
fn test_failed_apply_rolls_back() {
    let store = memory_store();
    let result = store.commit_progress(PLAYER, |_| Err(GameError::PersistenceFailure));
    assert_eq!(result, Err(GameError::PersistenceFailure));

    assert_eq!(store.load_player(PLAYER).unwrap(), Some(Player::new(PLAYER)));
    assert!(store.load_history(PLAYER).unwrap().is_empty());
}

#[test]
fn test_write_failure_after_game_insert_rolls_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.db");
    let store = SqliteStore::open(&path, &default_thresholds()).unwrap();
    store.create_player(PLAYER).unwrap();
    let session = store.open_session(PLAYER).unwrap();

    // The game row goes in first; make the player update that follows it fail
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER freeze_players BEFORE UPDATE ON players \
             BEGIN SELECT RAISE(ABORT, 'players are frozen'); END;",
        )
        .unwrap();

    let levels = LevelTable::default();
    assert_eq!(
        store.commit_progress(PLAYER, |p| apply_outcome(p, &fled(session, 70), &levels)),
        Err(GameError::PersistenceFailure)
    );
    assert!(store.load_history(PLAYER).unwrap().is_empty());
    assert_eq!(store.load_player(PLAYER).unwrap(), Some(Player::new(PLAYER)));
}

#[test]
fn test_session_is_credited_once() {
    let store = memory_store();
    let levels = LevelTable::default();
    let session = store.open_session(PLAYER).unwrap();
    let credit = |p: &Player| apply_outcome(p, &fled(session, 45), &levels);

    store.commit_progress(PLAYER, credit).unwrap();
    assert_eq!(
        store.commit_progress(PLAYER, credit),
        Err(GameError::InvalidState)
    );
    assert_eq!(store.load_player(PLAYER).unwrap().unwrap().xp, 45);
    assert_eq!(store.load_history(PLAYER).unwrap().len(), 1);
}

#[test]
fn test_session_must_be_issued_to_the_player() {
    let store = memory_store();
    let levels = LevelTable::default();
    let other = PLAYER + 1;
    store.create_player(other).unwrap();
    let theirs = store.open_session(other).unwrap();

    for session in [theirs, theirs + 100] {
        assert_eq!(
            store.commit_progress(PLAYER, |p| apply_outcome(p, &fled(session, 10), &levels)),
            Err(GameError::InvalidState)
        );
    }
    assert!(store.load_history(PLAYER).unwrap().is_empty());
    assert_eq!(store.open_session(PLAYER + 2), Err(GameError::Unauthenticated));
}

#[test]
fn test_commit_for_unknown_player() {
    let store = memory_store();
    let levels = LevelTable::default();
    let stranger = PLAYER + 1;
    let outcome = BattleOutcome {
        player: stranger,
        ..fled(1, 10)
    };

    assert_eq!(
        store.commit_progress(stranger, |p| apply_outcome(p, &outcome, &levels)),
        Err(GameError::Unauthenticated)
    );
    assert!(store.load_history(stranger).unwrap().is_empty());
}

#[test]
fn test_progress_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("progress.db");

    let recorded = {
        let engine = ProgressEngine::new(
            SqliteStore::open(&path, &default_thresholds()).unwrap(),
            BattleRules::default(),
        )
        .unwrap();
        engine.register_player(PLAYER).unwrap();

        let mut session = engine.start_battle(Some(PLAYER), None).unwrap().session;
        let mut rng = XorShiftRng::seed_from_u64(2024);
        while session.is_active() {
            engine
                .apply_action(Some(&mut session), BattleAction::Fight, &mut rng)
                .unwrap();
        }
        let mut copy = session.clone();
        let receipt = engine.commit_outcome(PLAYER, &mut session).unwrap();
        assert_eq!(receipt.record.result, BattleResult::Lost);
        assert_eq!(u64::from(session.battle_points()), receipt.player.xp);
        assert_eq!(
            engine.commit_outcome(PLAYER, &mut copy),
            Err(GameError::InvalidState)
        );
        receipt
    };

    let reopened = SqliteStore::open(&path, &default_thresholds()).unwrap();
    assert_eq!(reopened.path(), Some(path.as_path()));
    assert_eq!(reopened.load_player(PLAYER).unwrap(), Some(recorded.player));
    assert_eq!(reopened.load_history(PLAYER).unwrap(), vec![recorded.record]);
}

#[test]
fn test_config_defaults_and_overrides() {
    let defaults = StoreConfig::from_json("{}").unwrap();
    assert_eq!(defaults, StoreConfig::default());

    let config = StoreConfig::from_json(
        r#"{ "databasePath": "/tmp/arena.db", "game": { "battle": { "startingHealth": 50 } } }"#,
    )
    .unwrap();
    assert_eq!(config.database_path.to_str(), Some("/tmp/arena.db"));
    assert_eq!(config.game.battle.starting_health, 50);
    assert_eq!(config.game.levels, default_thresholds());

    assert_eq!(
        StoreConfig::from_json("{ not json"),
        Err(GameError::InvalidConfig)
    );
    assert_eq!(
        StoreConfig::load("/definitely/not/here.json"),
        Err(GameError::InvalidConfig)
    );
}

#[test]
fn test_config_opens_engine() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("skirmish.json");
    let db_path = dir.path().join("skirmish.db");
    let json = format!(
        r#"{{ "databasePath": {:?}, "game": {{ "battle": {{ "startingHealth": 30 }} }} }}"#,
        db_path.to_str().unwrap()
    );
    std::fs::write(&config_path, json).unwrap();

    let engine = StoreConfig::load(&config_path)
        .unwrap()
        .open_engine()
        .unwrap();
    engine.register_player(PLAYER).unwrap();

    let session = engine.start_battle(Some(PLAYER), None).unwrap().session;
    assert_eq!(session.health(), 30);
    assert_eq!(engine.levels().max_level(), 10);
    assert!(db_path.exists());
}
