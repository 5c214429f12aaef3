//! In-memory progress store
//!
//! Backs the browser client and tests. A commit builds the new rows first
//! and only then swaps them in, all under one lock.
//!
//! Session ids are not checked against the ones this store issued, so a
//! session exported from another instance can still be credited once.

use std::collections::{BTreeMap, BTreeSet};
use std::format;
use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use crate::commit::{CommitReceipt, ProgressStore, ProgressUpdate};
use crate::error::{GameError, GameResult};
use crate::levels::{default_thresholds, LevelThreshold};
use crate::log;
use crate::types::{GameId, GameRecord, Player, PlayerId, SessionId};

#[derive(Debug, Default)]
struct MemoryState {
    players: BTreeMap<PlayerId, Player>,
    games: Vec<GameRecord>,
    levels: Vec<LevelThreshold>,
    next_game_id: GameId,
    next_session_id: SessionId,
    credited_sessions: BTreeSet<SessionId>,
}

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create a store seeded with the given level thresholds
    pub fn new(levels: Vec<LevelThreshold>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                levels,
                next_game_id: 1,
                next_session_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    fn lock(&self) -> GameResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| {
            log::error("memory store lock poisoned");
            GameError::PersistenceFailure
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(default_thresholds())
    }
}

impl ProgressStore for MemoryStore {
    fn load_player(&self, id: PlayerId) -> GameResult<Option<Player>> {
        Ok(self.lock()?.players.get(&id).cloned())
    }

    fn create_player(&self, id: PlayerId) -> GameResult<Player> {
        let mut state = self.lock()?;
        if state.players.contains_key(&id) {
            return Err(GameError::PlayerAlreadyExists);
        }
        let player = Player::new(id);
        state.players.insert(id, player.clone());
        Ok(player)
    }

    fn load_levels(&self) -> GameResult<Vec<LevelThreshold>> {
        Ok(self.lock()?.levels.clone())
    }

    fn open_session(&self, player: PlayerId) -> GameResult<SessionId> {
        let mut state = self.lock()?;
        if !state.players.contains_key(&player) {
            return Err(GameError::Unauthenticated);
        }
        let id = state.next_session_id;
        state.next_session_id += 1;
        Ok(id)
    }

    fn load_history(&self, id: PlayerId) -> GameResult<Vec<GameRecord>> {
        Ok(self
            .lock()?
            .games
            .iter()
            .filter(|game| game.player_id == id)
            .cloned()
            .collect())
    }

    fn commit_progress<F>(&self, id: PlayerId, apply: F) -> GameResult<CommitReceipt>
    where
        F: FnOnce(&Player) -> GameResult<ProgressUpdate>,
    {
        let mut state = self.lock()?;
        let current = state
            .players
            .get(&id)
            .cloned()
            .ok_or(GameError::Unauthenticated)?;

        let ProgressUpdate {
            session,
            player,
            xp_earned,
            result,
        } = apply(&current)?;

        if state.credited_sessions.contains(&session) {
            log::warn(&format!("session {} was already credited", session));
            return Err(GameError::InvalidState);
        }

        let record = GameRecord {
            id: state.next_game_id,
            player_id: id,
            xp_earned,
            result,
        };
        state.next_game_id += 1;
        state.credited_sessions.insert(session);
        state.next_session_id = state.next_session_id.max(session.saturating_add(1));
        state.games.push(record.clone());
        state.players.insert(id, player.clone());

        Ok(CommitReceipt { player, record })
    }
}
