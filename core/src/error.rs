//! Error types for battle and progression operations
//!
//! Plain enums rather than String-based errors so the same values can cross
//! the SCALE and JSON boundaries unchanged.

use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Errors surfaced by the battle and progression core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameError {
    /// No valid player identity was supplied
    Unauthenticated,
    /// An action was submitted with no battle in progress
    SessionNotFound,
    /// An action was submitted on a terminated or already committed battle
    InvalidState,
    /// The progress store could not durably apply a change
    PersistenceFailure,
    /// Level thresholds are empty, not contiguous, or not strictly increasing
    InvalidLevelTable,
    /// Battle rules have an empty draw range or non-positive starting health
    InvalidRules,
    /// A configuration file could not be read or parsed
    InvalidConfig,
    /// A player with this id is already registered
    PlayerAlreadyExists,
}

impl GameError {
    /// Whether the caller should send the player back to a fresh flow.
    ///
    /// These errors are raised before anything is mutated.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            GameError::Unauthenticated | GameError::SessionNotFound | GameError::InvalidState
        )
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GameError::Unauthenticated => "no authenticated player",
            GameError::SessionNotFound => "no battle in progress",
            GameError::InvalidState => "battle is no longer active",
            GameError::PersistenceFailure => "progress could not be saved",
            GameError::InvalidLevelTable => "level table is malformed",
            GameError::InvalidRules => "battle rules are malformed",
            GameError::InvalidConfig => "configuration could not be loaded",
            GameError::PlayerAlreadyExists => "player already exists",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
