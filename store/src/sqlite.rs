//! SQLite-backed progress store
//!
//! A single connection behind a mutex. Commits run in an IMMEDIATE
//! transaction so the player row is write-locked from the read through to
//! the final update.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use skirmish_core::log;
use skirmish_core::{
    BattleResult, CommitReceipt, GameError, GameRecord, GameResult, LevelThreshold, Player,
    PlayerId, ProgressStore, ProgressUpdate, SessionId,
};

use crate::schema::*;

/// Progress store backed by a SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database at `path`, seeding any missing levels
    pub fn open(path: impl AsRef<Path>, levels: &[LevelThreshold]) -> GameResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                log::error(&format!("failed to create {}: {}", parent.display(), e));
                GameError::PersistenceFailure
            })?;
        }

        let conn = Connection::open(path).map_err(persistence)?;
        let store = Self::init(conn, Some(path.to_path_buf()), levels)?;
        log::info(&format!("opened progress database at {}", path.display()));
        Ok(store)
    }

    /// A private in-memory database, mostly for tests
    pub fn open_in_memory(levels: &[LevelThreshold]) -> GameResult<Self> {
        let conn = Connection::open_in_memory().map_err(persistence)?;
        Self::init(conn, None, levels)
    }

    /// Location on disk, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init(mut conn: Connection, db_path: Option<PathBuf>, levels: &[LevelThreshold]) -> GameResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(persistence)?;
        conn.execute_batch(SCHEMA).map_err(persistence)?;

        let tx = conn.transaction().map_err(persistence)?;
        for threshold in levels {
            tx.execute(
                SEED_LEVEL,
                params![i64::from(threshold.level), to_sql(threshold.xp_required)?],
            )
            .map_err(persistence)?;
        }
        tx.commit().map_err(persistence)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    fn lock(&self) -> GameResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            log::error("sqlite connection lock poisoned");
            GameError::PersistenceFailure
        })
    }
}

impl ProgressStore for SqliteStore {
    fn load_player(&self, id: PlayerId) -> GameResult<Option<Player>> {
        let conn = self.lock()?;
        conn.query_row(SELECT_PLAYER, params![to_sql(id)?], PlayerRow::read)
            .optional()
            .map_err(persistence)?
            .map(PlayerRow::into_player)
            .transpose()
    }

    fn create_player(&self, id: PlayerId) -> GameResult<Player> {
        let player = Player::new(id);
        let conn = self.lock()?;
        let inserted = conn.execute(
            INSERT_PLAYER,
            params![
                to_sql(player.id)?,
                i64::from(player.level),
                to_sql(player.xp)?,
                i64::from(player.games_played)
            ],
        );

        match inserted {
            Ok(_) => Ok(player),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(GameError::PlayerAlreadyExists)
            }
            Err(e) => Err(persistence(e)),
        }
    }

    fn load_levels(&self) -> GameResult<Vec<LevelThreshold>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_LEVELS).map_err(persistence)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .map_err(persistence)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(persistence)?;

        rows.into_iter()
            .map(|(level, xp_required)| {
                Ok(LevelThreshold::new(from_sql(level)?, from_sql(xp_required)?))
            })
            .collect()
    }

    fn open_session(&self, player: PlayerId) -> GameResult<SessionId> {
        let conn = self.lock()?;
        match conn.execute(INSERT_SESSION, params![to_sql(player)?]) {
            Ok(_) => from_sql(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(GameError::Unauthenticated)
            }
            Err(e) => Err(persistence(e)),
        }
    }

    fn load_history(&self, id: PlayerId) -> GameResult<Vec<GameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_GAMES).map_err(persistence)?;
        let rows = stmt
            .query_map(params![to_sql(id)?], GameRow::read)
            .map_err(persistence)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(persistence)?;

        rows.into_iter().map(GameRow::into_record).collect()
    }

    fn commit_progress<F>(&self, id: PlayerId, apply: F) -> GameResult<CommitReceipt>
    where
        F: FnOnce(&Player) -> GameResult<ProgressUpdate>,
    {
        let sql_id = to_sql(id)?;
        let mut conn = self.lock()?;

        // Dropping `tx` on any early return rolls everything back
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(persistence)?;

        let current = tx
            .query_row(SELECT_PLAYER, params![sql_id], PlayerRow::read)
            .optional()
            .map_err(persistence)?
            .ok_or(GameError::Unauthenticated)?
            .into_player()?;

        let ProgressUpdate {
            session,
            player,
            xp_earned,
            result,
        } = apply(&current)?;

        let sql_session = to_sql(session)?;
        let state: Option<(i64, Option<i64>)> = tx
            .query_row(SELECT_SESSION_STATE, params![sql_session], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(persistence)?;
        match state {
            Some((owner, None)) if owner == sql_id => {}
            Some((_, Some(game))) => {
                log::warn(&format!("session {} was already credited as game {}", session, game));
                return Err(GameError::InvalidState);
            }
            _ => {
                log::warn(&format!("session {} was never issued to player {}", session, id));
                return Err(GameError::InvalidState);
            }
        }

        tx.execute(
            INSERT_GAME,
            params![sql_session, sql_id, i64::from(xp_earned), result.label()],
        )
        .map_err(persistence)?;
        let game_id = from_sql(tx.last_insert_rowid())?;

        tx.execute(
            UPDATE_PLAYER,
            params![
                sql_id,
                i64::from(player.level),
                to_sql(player.xp)?,
                i64::from(player.games_played)
            ],
        )
        .map_err(persistence)?;

        tx.commit().map_err(persistence)?;

        Ok(CommitReceipt {
            record: GameRecord {
                id: game_id,
                player_id: id,
                xp_earned,
                result,
            },
            player,
        })
    }
}

struct PlayerRow {
    id: i64,
    level: i64,
    xp: i64,
    games_played: i64,
}

impl PlayerRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            level: row.get(1)?,
            xp: row.get(2)?,
            games_played: row.get(3)?,
        })
    }

    fn into_player(self) -> GameResult<Player> {
        Ok(Player {
            id: from_sql(self.id)?,
            level: from_sql(self.level)?,
            xp: from_sql(self.xp)?,
            games_played: from_sql(self.games_played)?,
        })
    }
}

struct GameRow {
    id: i64,
    player_id: i64,
    xp_earned: i64,
    result: String,
}

impl GameRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            player_id: row.get(1)?,
            xp_earned: row.get(2)?,
            result: row.get(3)?,
        })
    }

    fn into_record(self) -> GameResult<GameRecord> {
        let result = BattleResult::from_label(&self.result).ok_or_else(|| {
            log::error(&format!("game {} has unknown result {:?}", self.id, self.result));
            GameError::PersistenceFailure
        })?;

        Ok(GameRecord {
            id: from_sql(self.id)?,
            player_id: from_sql(self.player_id)?,
            xp_earned: from_sql(self.xp_earned)?,
            result,
        })
    }
}

fn persistence(err: rusqlite::Error) -> GameError {
    log::error(&format!("sqlite: {}", err));
    GameError::PersistenceFailure
}

/// SQLite integers are signed 64-bit
fn to_sql(value: u64) -> GameResult<i64> {
    i64::try_from(value).map_err(|_| {
        log::error(&format!("value {} does not fit in a sqlite integer", value));
        GameError::PersistenceFailure
    })
}

fn from_sql<T: TryFrom<i64>>(value: i64) -> GameResult<T> {
    T::try_from(value).map_err(|_| {
        log::error(&format!("stored value {} is out of range", value));
        GameError::PersistenceFailure
    })
}
