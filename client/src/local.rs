//! Single-player game loop for browser builds
//!
//! Everything lives in memory: one registered player, the in-memory store,
//! and at most one battle session. Terminated battles are committed as soon
//! as the action that ended them returns.

use std::format;
use std::vec::Vec;

use parity_scale_codec::{DecodeAll, Encode};
use serde::{Deserialize, Serialize};
use skirmish_core::log;
use skirmish_core::{
    ActionOutcome, BattleAction, BattleRules, BattleSession, CommitReceipt, GameError, GameRecord,
    GameResult, MemoryStore, PlayerId, ProgressEngine, ProgressView, XorShiftRng,
};

/// The only player a local game knows about
pub const LOCAL_PLAYER: PlayerId = 1;

/// Result of one fight or flee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    pub outcome: ActionOutcome,
    /// Present once the battle has ended and been credited
    pub receipt: Option<CommitReceipt>,
}

pub struct LocalGame {
    engine: ProgressEngine<MemoryStore>,
    session: Option<BattleSession>,
    rng: XorShiftRng,
}

impl LocalGame {
    pub fn new(seed: u64) -> GameResult<Self> {
        let engine = ProgressEngine::new(MemoryStore::default(), BattleRules::default())?;
        engine.register_player(LOCAL_PLAYER)?;

        Ok(Self {
            engine,
            session: None,
            rng: XorShiftRng::seed_from_u64(seed),
        })
    }

    /// Begin a new battle, forfeiting any battle still in progress
    pub fn start_battle(&mut self) -> GameResult<ActionOutcome> {
        let start = self
            .engine
            .start_battle(Some(LOCAL_PLAYER), self.session.take())?;
        let snapshot = start.session.snapshot();
        self.session = Some(start.session);
        Ok(snapshot)
    }

    pub fn act(&mut self, action: BattleAction) -> GameResult<TurnView> {
        let outcome = self
            .engine
            .apply_action(self.session.as_mut(), action, &mut self.rng)?;

        let receipt = if outcome.terminated {
            Some(self.commit()?)
        } else {
            None
        };
        Ok(TurnView { outcome, receipt })
    }

    /// Snapshot of the battle in progress, if any
    pub fn session(&self) -> Option<ActionOutcome> {
        self.session.as_ref().map(BattleSession::snapshot)
    }

    pub fn progress(&self) -> GameResult<ProgressView> {
        self.engine.get_progress(Some(LOCAL_PLAYER))
    }

    pub fn history(&self) -> GameResult<Vec<GameRecord>> {
        self.engine.history(Some(LOCAL_PLAYER))
    }

    /// SCALE-encoded session slot, suitable for page storage
    pub fn export_session(&self) -> Vec<u8> {
        self.session.encode()
    }

    /// Replace the session slot with a previously exported one.
    ///
    /// A restored battle that had already ended but was never credited is
    /// committed right away and its receipt returned.
    pub fn restore_session(&mut self, bytes: &[u8]) -> GameResult<Option<CommitReceipt>> {
        let restored = Option::<BattleSession>::decode_all(&mut &bytes[..]).map_err(|e| {
            log::warn(&format!("discarding undecodable session: {:?}", e));
            GameError::SessionNotFound
        })?;

        let Some(session) = restored else {
            self.session = None;
            return Ok(None);
        };
        if session.player() != LOCAL_PLAYER {
            return Err(GameError::Unauthenticated);
        }
        if session.is_committed() {
            return Err(GameError::InvalidState);
        }

        log::debug(
            "restore_session",
            &format!(
                "health={} battle_points={}",
                session.health(),
                session.battle_points()
            ),
        );
        let pending = !session.is_active();
        self.session = Some(session);

        if pending {
            self.commit().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Credit the finished session; it is kept only if the store may retry
    fn commit(&mut self) -> GameResult<CommitReceipt> {
        let session = self.session.as_mut().ok_or(GameError::SessionNotFound)?;
        let committed = self.engine.commit_outcome(LOCAL_PLAYER, session);
        if committed != Err(GameError::PersistenceFailure) {
            self.session = None;
        }
        committed
    }
}
