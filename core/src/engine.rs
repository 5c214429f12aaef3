//! Progress engine
//!
//! The surface the request layer talks to. It owns the store, the level
//! table loaded at startup and the battle rules. Sessions are never stored
//! here: callers hold them and pass them back in.

use std::collections::BTreeMap;
use std::format;
use std::sync::{Arc, Mutex, PoisonError};
use std::vec::Vec;

use crate::battle::{ActionOutcome, BattleAction, BattleSession};
use crate::commit::{apply_outcome, CommitReceipt, ProgressStore};
use crate::config::BattleRules;
use crate::error::{GameError, GameResult};
use crate::levels::LevelTable;
use crate::log;
use crate::rng::BattleRng;
use crate::types::{GameRecord, Player, PlayerId};
use crate::view::ProgressView;

/// A newly started battle, plus whatever session it displaced
#[derive(Debug)]
pub struct BattleStart {
    pub session: BattleSession,
    /// The caller's previous session, discarded without any durable effect
    pub replaced: Option<BattleSession>,
}

pub struct ProgressEngine<S> {
    store: S,
    levels: LevelTable,
    rules: BattleRules,
    commit_locks: Mutex<BTreeMap<PlayerId, Arc<Mutex<()>>>>,
}

impl<S: ProgressStore> ProgressEngine<S> {
    /// Build an engine over a seeded store.
    ///
    /// The level table is read once here and treated as read-only after.
    pub fn new(store: S, rules: BattleRules) -> GameResult<Self> {
        rules.validate()?;
        let levels = LevelTable::new(store.load_levels()?)?;
        log::info(&format!(
            "progress engine ready: {} levels, max level {}",
            levels.thresholds().len(),
            levels.max_level()
        ));

        Ok(Self {
            store,
            levels,
            rules,
            commit_locks: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    /// Create the progression record for a newly registered player
    pub fn register_player(&self, id: PlayerId) -> GameResult<Player> {
        let player = self.store.create_player(id)?;
        log::info(&format!("registered player {}", id));
        Ok(player)
    }

    /// Start a fresh battle for an authenticated player.
    ///
    /// A previous session, if the caller still holds one, is handed back in
    /// `replaced`. Its points are forfeited; nothing is written.
    pub fn start_battle(
        &self,
        player: Option<PlayerId>,
        previous: Option<BattleSession>,
    ) -> GameResult<BattleStart> {
        let player = self.authenticate(player)?.id;

        if let Some(old) = &previous {
            if !old.is_committed() {
                log::warn(&format!(
                    "player {} abandoned a battle with {} points",
                    player,
                    old.battle_points()
                ));
            }
        }

        let id = self.store.open_session(player)?;
        log::action("start_battle", &format!("player={} session={}", player, id));
        Ok(BattleStart {
            session: BattleSession::new(id, player, &self.rules),
            replaced: previous,
        })
    }

    /// Apply one action to the caller's session
    pub fn apply_action<R: BattleRng>(
        &self,
        session: Option<&mut BattleSession>,
        action: BattleAction,
        rng: &mut R,
    ) -> GameResult<ActionOutcome> {
        let session = session.ok_or(GameError::SessionNotFound)?;
        session.apply(action, &self.rules, rng)
    }

    /// Durably credit a terminated session to its player.
    ///
    /// Runs at most once per session id. A session the store already
    /// credited, including a copy of one, is rejected with `InvalidState`,
    /// as is an active session. If the store fails, the session is left
    /// uncommitted and the error is returned for the caller to retry or
    /// report.
    pub fn commit_outcome(
        &self,
        player: PlayerId,
        session: &mut BattleSession,
    ) -> GameResult<CommitReceipt> {
        if session.player() != player {
            return Err(GameError::Unauthenticated);
        }

        let lock = self.commit_lock(player);
        let committed = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.commit_serialized(player, session)
        };
        self.release_commit_lock(player, lock);
        committed
    }

    fn commit_serialized(
        &self,
        player: PlayerId,
        session: &mut BattleSession,
    ) -> GameResult<CommitReceipt> {
        if session.is_committed() {
            return Err(GameError::InvalidState);
        }
        let outcome = session.outcome().ok_or(GameError::InvalidState)?;

        let receipt = self
            .store
            .commit_progress(player, |current| apply_outcome(current, &outcome, &self.levels))
            .map_err(|err| {
                log::error(&format!(
                    "commit of session {} for player {} failed: {}",
                    outcome.session, player, err
                ));
                err
            })?;
        session.mark_committed();

        log::result(
            true,
            &format!(
                "player {} {} with {} xp, now level {} ({} xp)",
                player,
                receipt.record.result.label(),
                receipt.record.xp_earned,
                receipt.player.level,
                receipt.player.xp
            ),
        );
        Ok(receipt)
    }

    pub fn get_progress(&self, player: Option<PlayerId>) -> GameResult<ProgressView> {
        let player = self.authenticate(player)?;
        Ok(ProgressView::from_player(&player, &self.levels))
    }

    /// The player's finished games, oldest first
    pub fn history(&self, player: Option<PlayerId>) -> GameResult<Vec<GameRecord>> {
        let player = self.authenticate(player)?;
        self.store.load_history(player.id)
    }

    fn authenticate(&self, player: Option<PlayerId>) -> GameResult<Player> {
        let id = player.ok_or(GameError::Unauthenticated)?;
        self.store.load_player(id)?.ok_or(GameError::Unauthenticated)
    }

    fn commit_lock(&self, player: PlayerId) -> Arc<Mutex<()>> {
        let mut locks = self
            .commit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(player).or_default().clone()
    }

    /// Drop the player's lock entry once no other commit holds it
    fn release_commit_lock(&self, player: PlayerId, lock: Arc<Mutex<()>>) {
        let mut locks = self
            .commit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(&player).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(&player);
        }
    }

    #[cfg(test)]
    pub(crate) fn commit_lock_count(&self) -> usize {
        self.commit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
