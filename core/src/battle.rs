//! Battle session state machine
//!
//! A session is `Active` until the player's health runs out or they flee.
//! Termination is one-way: a terminated session only waits for its outcome
//! to be committed, after which it accepts nothing at all.

use alloc::format;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::config::BattleRules;
use crate::error::{GameError, GameResult};
use crate::log;
use crate::rng::BattleRng;
use crate::types::{BattleResult, PlayerId, SessionId};

/// Player input for one battle step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleAction {
    Fight,
    Flee,
}

/// Why a session stopped accepting actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    Defeated,
    Fled,
}

impl From<TerminationReason> for BattleResult {
    fn from(reason: TerminationReason) -> Self {
        match reason {
            TerminationReason::Defeated => BattleResult::Lost,
            TerminationReason::Fled => BattleResult::Fled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum SessionPhase {
    Active,
    Terminated(TerminationReason),
}

/// Session snapshot returned after every action
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub health: i32,
    pub battle_points: u32,
    pub terminated: bool,
    pub reason: Option<TerminationReason>,
}

/// Final result of a terminated session, ready for a progress commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleOutcome {
    pub session: SessionId,
    pub player: PlayerId,
    pub battle_points: u32,
    pub reason: TerminationReason,
}

/// Ephemeral battle state owned by one player
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSession {
    id: SessionId,
    player: PlayerId,
    health: i32,
    battle_points: u32,
    phase: SessionPhase,
    committed: bool,
}

impl BattleSession {
    pub fn new(id: SessionId, player: PlayerId, rules: &BattleRules) -> Self {
        Self {
            id,
            player,
            health: rules.starting_health,
            battle_points: 0,
            phase: SessionPhase::Active,
            committed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn battle_points(&self) -> u32 {
        self.battle_points
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Whether this session's outcome already reached the store
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The final result, once the session has terminated
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            SessionPhase::Active => None,
            SessionPhase::Terminated(reason) => Some(BattleOutcome {
                session: self.id,
                player: self.player,
                battle_points: self.battle_points,
                reason,
            }),
        }
    }

    pub fn snapshot(&self) -> ActionOutcome {
        let reason = match self.phase {
            SessionPhase::Active => None,
            SessionPhase::Terminated(reason) => Some(reason),
        };
        ActionOutcome {
            health: self.health,
            battle_points: self.battle_points,
            terminated: reason.is_some(),
            reason,
        }
    }

    /// Advance the session by one action.
    ///
    /// Rejected with `InvalidState`, without touching the session, unless
    /// the session is active.
    pub fn apply<R: BattleRng>(
        &mut self,
        action: BattleAction,
        rules: &BattleRules,
        rng: &mut R,
    ) -> GameResult<ActionOutcome> {
        if !self.is_active() || self.committed {
            log::result(false, "action on inactive battle");
            return Err(GameError::InvalidState);
        }

        match action {
            BattleAction::Fight => {
                let damage = rng.gen_inclusive(rules.damage.min, rules.damage.max);
                let points = rng.gen_inclusive(rules.points.min, rules.points.max);
                log::action(
                    "fight",
                    &format!("player={} damage={} points={}", self.player, damage, points),
                );

                self.health = self.health.saturating_sub_unsigned(damage);
                self.battle_points = self.battle_points.saturating_add(points);

                if self.health <= 0 {
                    self.health = 0;
                    self.phase = SessionPhase::Terminated(TerminationReason::Defeated);
                }
            }
            BattleAction::Flee => {
                log::action("flee", &format!("player={}", self.player));
                self.phase = SessionPhase::Terminated(TerminationReason::Fled);
            }
        }

        log::session_summary(self.player, self.health, self.battle_points, self.phase_label());
        Ok(self.snapshot())
    }

    /// Record that the outcome has been durably applied
    #[cfg(feature = "std")]
    pub(crate) fn mark_committed(&mut self) {
        self.committed = true;
    }

    fn phase_label(&self) -> &'static str {
        match self.phase {
            SessionPhase::Active => "active",
            SessionPhase::Terminated(TerminationReason::Defeated) => "defeated",
            SessionPhase::Terminated(TerminationReason::Fled) => "fled",
        }
    }
}
