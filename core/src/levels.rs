//! Level thresholds and the XP → level mapping
//!
//! A level is always derived from cumulative XP: the highest level whose
//! requirement is met. Nothing increments levels directly.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::types::STARTING_LEVEL;

/// XP required for levels 1 through 10
pub const DEFAULT_XP_REQUIREMENTS: [u64; 10] = [0, 100, 250, 450, 700, 1000, 1350, 1750, 2200, 2700];

/// Minimum cumulative XP needed to hold a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelThreshold {
    pub level: u32,
    pub xp_required: u64,
}

impl LevelThreshold {
    pub const fn new(level: u32, xp_required: u64) -> Self {
        Self { level, xp_required }
    }
}

/// The default thresholds seeded into a fresh store
pub fn default_thresholds() -> Vec<LevelThreshold> {
    DEFAULT_XP_REQUIREMENTS
        .iter()
        .zip(STARTING_LEVEL..)
        .map(|(&xp, level)| LevelThreshold::new(level, xp))
        .collect()
}

/// Validated, ordered set of level thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    thresholds: Vec<LevelThreshold>,
}

impl LevelTable {
    /// Build a table from thresholds in any order.
    ///
    /// Levels must run contiguously from 1, level 1 must require 0 XP, and
    /// requirements must strictly increase with level.
    pub fn new(mut thresholds: Vec<LevelThreshold>) -> GameResult<Self> {
        thresholds.sort_by_key(|t| t.level);

        match thresholds.first() {
            Some(first) if first.level == STARTING_LEVEL && first.xp_required == 0 => {}
            _ => return Err(GameError::InvalidLevelTable),
        }

        let well_ordered = thresholds
            .windows(2)
            .all(|pair| pair[1].level == pair[0].level + 1 && pair[1].xp_required > pair[0].xp_required);
        if !well_ordered {
            return Err(GameError::InvalidLevelTable);
        }

        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[LevelThreshold] {
        &self.thresholds
    }

    /// Highest level whose requirement is met by `xp`.
    ///
    /// Total over all inputs: level 1 requires 0 XP, and XP beyond the last
    /// threshold stays at the last level.
    pub fn level_for(&self, xp: u64) -> u32 {
        self.thresholds
            .iter()
            .rev()
            .find(|t| t.xp_required <= xp)
            .map(|t| t.level)
            .unwrap_or(STARTING_LEVEL)
    }

    /// XP required for `level`, if the table defines it
    pub fn threshold(&self, level: u32) -> Option<u64> {
        self.thresholds
            .iter()
            .find(|t| t.level == level)
            .map(|t| t.xp_required)
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds
            .last()
            .map(|t| t.level)
            .unwrap_or(STARTING_LEVEL)
    }

    /// XP still missing for `level + 1`, or 0 at the top of the table
    pub fn xp_to_next_level(&self, level: u32, xp: u64) -> u64 {
        level
            .checked_add(1)
            .and_then(|next| self.threshold(next))
            .map(|required| required.saturating_sub(xp))
            .unwrap_or(0)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
        }
    }
}
