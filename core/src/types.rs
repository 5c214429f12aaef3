use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Stable player identifier issued by the authentication layer
pub type PlayerId = u64;

/// Unique identifier for a stored game record
pub type GameId = u64;

/// Issued by the store when a battle starts; at most one game per session
pub type SessionId = u64;

/// Level every player starts at
pub const STARTING_LEVEL: u32 = 1;

/// Durable progression state of a player
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Cached `level_for(xp)`; only progress commits refresh it
    pub level: u32,
    /// Cumulative experience, never decreases
    pub xp: u64,
    pub games_played: u32,
}

impl Player {
    /// A freshly registered player
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            level: STARTING_LEVEL,
            xp: 0,
            games_played: 0,
        }
    }
}

/// Result label stored with each finished game
///
/// `Won` is part of the stored taxonomy but no battle currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleResult {
    Won,
    Lost,
    Fled,
}

impl BattleResult {
    /// Storage label, matching the serde representation
    pub fn label(&self) -> &'static str {
        match self {
            BattleResult::Won => "won",
            BattleResult::Lost => "lost",
            BattleResult::Fled => "fled",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "won" => Some(BattleResult::Won),
            "lost" => Some(BattleResult::Lost),
            "fled" => Some(BattleResult::Fled),
            _ => None,
        }
    }
}

/// Historical record of one finished battle
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: GameId,
    pub player_id: PlayerId,
    pub xp_earned: u32,
    pub result: BattleResult,
}
