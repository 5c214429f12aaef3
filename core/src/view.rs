//! View types for UI serialization
//!
//! Flat structs the boundary layer renders or hands to JavaScript.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::levels::LevelTable;
use crate::types::Player;

/// Dashboard view of a player's progression
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub level: u32,
    pub xp: u64,
    pub games_played: u32,
    /// XP missing for the next level; 0 at the top of the table
    pub xp_to_next_level: u64,
}

impl ProgressView {
    pub fn from_player(player: &Player, levels: &LevelTable) -> Self {
        Self {
            level: player.level,
            xp: player.xp,
            games_played: player.games_played,
            xp_to_next_level: levels.xp_to_next_level(player.level, player.xp),
        }
    }
}
