//! Tunable game rules
//!
//! Defaults reproduce the shipped game. Every field has a serde default so a
//! config file only needs to name what it overrides.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::levels::{default_thresholds, LevelThreshold};

/// Health every battle starts with
pub const STARTING_HEALTH: i32 = 100;
/// Damage taken per fight, closed range
pub const DAMAGE_RANGE: DrawRange = DrawRange::new(12, 26);
/// Battle points earned per fight, closed range
pub const POINTS_RANGE: DrawRange = DrawRange::new(10, 30);

/// Closed integer range a roll is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct DrawRange {
    pub min: u32,
    pub max: u32,
}

impl DrawRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Rules applied to every battle session
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleRules {
    pub starting_health: i32,
    pub damage: DrawRange,
    pub points: DrawRange,
}

impl BattleRules {
    pub fn validate(&self) -> GameResult<()> {
        if self.starting_health <= 0
            || self.damage.min > self.damage.max
            || self.points.min > self.points.max
        {
            return Err(GameError::InvalidRules);
        }
        Ok(())
    }
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            starting_health: STARTING_HEALTH,
            damage: DAMAGE_RANGE,
            points: POINTS_RANGE,
        }
    }
}

/// Complete game configuration: battle rules plus the level thresholds to
/// seed into a fresh store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub battle: BattleRules,
    pub levels: Vec<LevelThreshold>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            battle: BattleRules::default(),
            levels: default_thresholds(),
        }
    }
}
