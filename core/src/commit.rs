//! Progress commit
//!
//! Merging a terminated battle into a player's durable record is split in
//! two: `apply_outcome` computes the next player row and history entry
//! without side effects, and a `ProgressStore` persists both inside one
//! transaction. Both the SQLite store and the in-memory store run the same
//! computation, so they cannot disagree about XP or level.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::battle::BattleOutcome;
use crate::error::{GameError, GameResult};
use crate::levels::{LevelTable, LevelThreshold};
use crate::types::{BattleResult, GameRecord, Player, PlayerId, SessionId};

/// Everything a store must write for one finished battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Session being credited; a store records each one at most once
    pub session: SessionId,
    /// The player row after the battle
    pub player: Player,
    pub xp_earned: u32,
    pub result: BattleResult,
}

/// What a successful commit wrote
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub player: Player,
    pub record: GameRecord,
}

/// Compute the player row and history entry for a finished battle.
///
/// The level is recomputed from the new cumulative XP, never incremented.
pub fn apply_outcome(
    player: &Player,
    outcome: &BattleOutcome,
    levels: &LevelTable,
) -> GameResult<ProgressUpdate> {
    if player.id != outcome.player {
        return Err(GameError::Unauthenticated);
    }

    let xp = player.xp.saturating_add(u64::from(outcome.battle_points));
    let next = Player {
        id: player.id,
        level: levels.level_for(xp),
        xp,
        games_played: player.games_played.saturating_add(1),
    };

    Ok(ProgressUpdate {
        session: outcome.session,
        player: next,
        xp_earned: outcome.battle_points,
        result: outcome.reason.into(),
    })
}

/// Durable storage for players, level thresholds and game history
pub trait ProgressStore {
    /// Fetch a player, `None` if the id was never registered
    fn load_player(&self, id: PlayerId) -> GameResult<Option<Player>>;

    /// Insert a fresh player row at level 1 with no XP
    fn create_player(&self, id: PlayerId) -> GameResult<Player>;

    /// All seeded level thresholds
    fn load_levels(&self) -> GameResult<Vec<LevelThreshold>>;

    /// Issue a fresh session id for a battle the player is starting
    fn open_session(&self, player: PlayerId) -> GameResult<SessionId>;

    /// A player's finished games in the order they were recorded
    fn load_history(&self, id: PlayerId) -> GameResult<Vec<GameRecord>>;

    /// Run `apply` against the stored player and persist its result.
    ///
    /// The history row and the player row are written as one unit: if
    /// `apply` or any write fails, nothing is stored. Unknown players fail
    /// with `Unauthenticated`; a session that was already credited fails
    /// with `InvalidState`. Implementations never retry.
    fn commit_progress<F>(&self, id: PlayerId, apply: F) -> GameResult<CommitReceipt>
    where
        F: FnOnce(&Player) -> GameResult<ProgressUpdate>;
}
